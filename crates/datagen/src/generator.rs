//! Dataset generator: fixed channel mix, per-channel draws, post-hoc jitter,
//! and a handful of deliberate data-quality defects.

use crate::profile::ChannelProfile;
use campaign_core::{CampaignError, CampaignRecord, CampaignResult, Channel};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_SEED: u64 = 42;
pub const NUM_CAMPAIGNS: usize = 50;
pub const CAMPAIGN_YEAR: i32 = 2024;

/// Row counts per channel. Order is shuffled, composition is not.
pub const CHANNEL_SPLIT: [(Channel, usize); 3] = [
    (Channel::PaidAds, 18),
    (Channel::SocialMedia, 22),
    (Channel::Email, 10),
];

/// Share of rows whose `Conversions` is blanked out.
pub const NULL_FRACTION: f64 = 0.1;

const DEVICES: [&str; 2] = ["Mobile", "Desktop"];
const REGIONS: [&str; 5] = ["Sudeste", "Nordeste", "Sul", "Nacional", "Centro-Oeste"];

/// Latest start leaves this many days before year end.
const START_MARGIN_DAYS: i64 = 30;
const MIN_DURATION_DAYS: i64 = 7;
const MAX_DURATION_DAYS: i64 = 45;

// Hand-placed outliers.
const EXTREME_SPEND_ROW: usize = 5;
const LOW_SPEND_HIGH_CONVERSION_ROW: usize = 25;
const RECOMPUTED_CLICKS_ROW: usize = 45;
const RECOMPUTED_CTR: f64 = 0.15;

/// Outcome of a generator run.
#[derive(Debug, Clone)]
pub struct GeneratorSummary {
    pub rows: usize,
    pub per_channel: BTreeMap<Channel, usize>,
    pub null_conversions: usize,
    pub output: PathBuf,
}

impl GeneratorSummary {
    fn from_records(records: &[CampaignRecord], output: &Path) -> Self {
        let mut per_channel = BTreeMap::new();
        for record in records {
            *per_channel.entry(record.channel).or_insert(0) += 1;
        }
        Self {
            rows: records.len(),
            per_channel,
            null_conversions: records.iter().filter(|r| r.conversions.is_none()).count(),
            output: output.to_path_buf(),
        }
    }
}

/// Deterministic generator of the synthetic campaign table.
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    seed: u64,
}

impl DatasetGenerator {
    pub fn new() -> Self {
        Self { seed: DEFAULT_SEED }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Produce every row in memory, defects included.
    pub fn generate(&self) -> Vec<CampaignRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut channels: Vec<Channel> = CHANNEL_SPLIT
            .iter()
            .flat_map(|(channel, count)| std::iter::repeat(*channel).take(*count))
            .collect();
        channels.shuffle(&mut rng);

        let (year_start, span_days) = calendar_year();
        let mut records: Vec<CampaignRecord> = channels
            .into_iter()
            .enumerate()
            .map(|(i, channel)| draw_record(&mut rng, i, channel, year_start, span_days))
            .collect();

        inject_defects(&mut records, self.seed);
        records
    }

    /// Generate and write the interchange file, creating parent directories
    /// and replacing any previous file.
    pub fn write_csv(&self, path: &Path) -> CampaignResult<GeneratorSummary> {
        let records = self.generate();
        let bytes = encode_csv(&records)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;

        let summary = GeneratorSummary::from_records(&records, path);
        info!(
            path = %path.display(),
            rows = summary.rows,
            null_conversions = summary.null_conversions,
            bytes = bytes.len(),
            "Dataset written"
        );
        Ok(summary)
    }
}

impl Default for DatasetGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize rows to CSV with the interchange header.
pub fn encode_csv(records: &[CampaignRecord]) -> CampaignResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| CampaignError::Io(e.into_error()))
}

fn calendar_year() -> (NaiveDate, i64) {
    let start = NaiveDate::from_ymd_opt(CAMPAIGN_YEAR, 1, 1).expect("January 1st is a valid date");
    let end = NaiveDate::from_ymd_opt(CAMPAIGN_YEAR, 12, 31).expect("December 31st is a valid date");
    (start, (end - start).num_days())
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn draw_record(
    rng: &mut StdRng,
    index: usize,
    channel: Channel,
    year_start: NaiveDate,
    span_days: i64,
) -> CampaignRecord {
    let profile = ChannelProfile::for_channel(channel);

    let budget = round_cents(rng.gen_range(profile.budget.clone()));
    let impressions = (budget * rng.gen_range(profile.impressions_per_brl.clone())) as u64;
    let ctr = rng.gen_range(profile.ctr.clone());
    let clicks = (impressions as f64 * ctr) as u64;
    let conversion_rate = rng.gen_range(profile.conversion_rate.clone());
    let conversions = (clicks as f64 * conversion_rate) as u64;

    let start_date = year_start + Duration::days(rng.gen_range(0..=span_days - START_MARGIN_DAYS));
    let end_date = start_date + Duration::days(rng.gen_range(MIN_DURATION_DAYS..=MAX_DURATION_DAYS));

    let ad_group = profile.ad_groups.choose(rng).copied().unwrap_or_default();
    let device = DEVICES.choose(rng).copied().unwrap_or_default();
    let region = REGIONS.choose(rng).copied().unwrap_or_default();

    // Independent jitter: funnel ordering is no longer guaranteed.
    let impressions = (impressions as f64 * rng.gen_range(0.9..=1.1)) as u64;
    let clicks = (clicks as f64 * rng.gen_range(0.85..=1.15)) as u64;
    let conversions = (conversions as f64 * rng.gen_range(0.8..=1.2)) as u64;

    CampaignRecord {
        campaign_id: format!("CAMP{:03}", index + 1),
        channel,
        start_date,
        end_date,
        budget_brl: budget,
        impressions,
        clicks,
        conversions: Some(conversions),
        ad_group: ad_group.to_string(),
        device: device.to_string(),
        region: region.to_string(),
    }
}

/// Blank a seeded sample of `Conversions`, then apply the hand-placed
/// outliers. Outliers are applied last and win over the blanking.
fn inject_defects(records: &mut [CampaignRecord], seed: u64) {
    let mut sampler = StdRng::seed_from_u64(seed);
    let null_count = (records.len() as f64 * NULL_FRACTION).round() as usize;
    for idx in rand::seq::index::sample(&mut sampler, records.len(), null_count) {
        records[idx].conversions = None;
    }

    if let Some(row) = records.get_mut(EXTREME_SPEND_ROW) {
        row.budget_brl = 9500.0;
        row.clicks = 15_000;
        row.conversions = Some(150);
    }
    if let Some(row) = records.get_mut(LOW_SPEND_HIGH_CONVERSION_ROW) {
        row.budget_brl = 300.0;
        row.conversions = Some(400);
    }
    if let Some(row) = records.get_mut(RECOMPUTED_CLICKS_ROW) {
        row.clicks = (row.impressions as f64 * RECOMPUTED_CTR) as u64;
    }

    debug!(null_count, "Injected data-quality defects");
}
