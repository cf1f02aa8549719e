use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column order of the interchange file.
pub const CAMPAIGN_COLUMNS: [&str; 11] = [
    "CampaignID",
    "Channel",
    "StartDate",
    "EndDate",
    "Budget_BRL",
    "Impressions",
    "Clicks",
    "Conversions",
    "Ad_Group",
    "Device",
    "Region",
];

/// Top-level campaign category. Variants are declared in name order so the
/// derived `Ord` matches alphabetical grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "Email")]
    Email,
    #[serde(rename = "Paid Ads")]
    PaidAds,
    #[serde(rename = "Social Media")]
    SocialMedia,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::PaidAds, Channel::SocialMedia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "Email",
            Channel::PaidAds => "Paid Ads",
            Channel::SocialMedia => "Social Media",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    /// Accepts the display name as well as kebab/snake variants
    /// (`paid-ads`, `social_media`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "email" => Ok(Channel::Email),
            "paidads" => Ok(Channel::PaidAds),
            "socialmedia" => Ok(Channel::SocialMedia),
            _ => Err(format!("unknown channel '{s}'")),
        }
    }
}

/// One row of the interchange file as written by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    #[serde(rename = "CampaignID")]
    pub campaign_id: String,
    #[serde(rename = "Channel")]
    pub channel: Channel,
    #[serde(rename = "StartDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "EndDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "Budget_BRL")]
    pub budget_brl: f64,
    #[serde(rename = "Impressions")]
    pub impressions: u64,
    #[serde(rename = "Clicks")]
    pub clicks: u64,
    /// Empty cell in the file. The only nullable column.
    #[serde(rename = "Conversions")]
    pub conversions: Option<u64>,
    #[serde(rename = "Ad_Group")]
    pub ad_group: String,
    #[serde(rename = "Device")]
    pub device: String,
    #[serde(rename = "Region")]
    pub region: String,
}

/// A campaign row after null repair, carrying the derived business metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(rename = "CampaignID")]
    pub campaign_id: String,
    #[serde(rename = "Channel")]
    pub channel: Channel,
    #[serde(rename = "StartDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "EndDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "Budget_BRL")]
    pub budget_brl: f64,
    #[serde(rename = "Impressions")]
    pub impressions: u64,
    #[serde(rename = "Clicks")]
    pub clicks: u64,
    #[serde(rename = "Conversions")]
    pub conversions: u64,
    #[serde(rename = "Ad_Group")]
    pub ad_group: String,
    #[serde(rename = "Device")]
    pub device: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "CTR (%)")]
    pub ctr_pct: f64,
    #[serde(rename = "CPC")]
    pub cpc: f64,
    #[serde(rename = "ConversionRate (%)")]
    pub conversion_rate_pct: f64,
    #[serde(rename = "CPA")]
    pub cpa: f64,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "ROI (%)")]
    pub roi_pct: f64,
}

/// Ordered collection of enriched rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTable {
    /// SHA-256 (hex) of the file the rows were loaded from.
    pub source_digest: Option<String>,
    pub records: Vec<EnrichedRecord>,
}

impl EnrichedTable {
    pub fn new(source_digest: Option<String>, records: Vec<EnrichedRecord>) -> Self {
        Self {
            source_digest,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedRecord> {
        self.records.iter()
    }

    /// Distinct channels in order of first appearance.
    pub fn distinct_channels(&self) -> Vec<Channel> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.channel) {
                seen.push(record.channel);
            }
        }
        seen
    }

    /// Distinct regions in order of first appearance.
    pub fn distinct_regions(&self) -> Vec<String> {
        distinct_in_order(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Distinct devices in order of first appearance.
    pub fn distinct_devices(&self) -> Vec<String> {
        distinct_in_order(self.records.iter().map(|r| r.device.as_str()))
    }
}

impl<'a> IntoIterator for &'a EnrichedTable {
    type Item = &'a EnrichedRecord;
    type IntoIter = std::slice::Iter<'a, EnrichedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}
