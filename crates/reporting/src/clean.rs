//! Null repair for `Conversions`: each missing value takes the median of the
//! non-null values in the same channel, truncated to an integer.

use campaign_core::{CampaignRecord, Channel};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Median of the values, averaging the middle pair for even counts.
pub fn median(values: &mut [u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    let m = if values.len() % 2 == 0 {
        (values[mid - 1] as f64 + values[mid] as f64) / 2.0
    } else {
        values[mid] as f64
    };
    Some(m)
}

/// Per-channel median over non-null `Conversions`. Channels with no
/// observed value are absent.
pub fn channel_medians(records: &[CampaignRecord]) -> BTreeMap<Channel, f64> {
    let mut groups: BTreeMap<Channel, Vec<u64>> = BTreeMap::new();
    for record in records {
        if let Some(conversions) = record.conversions {
            groups.entry(record.channel).or_default().push(conversions);
        }
    }
    groups
        .into_iter()
        .filter_map(|(channel, mut values)| median(&mut values).map(|m| (channel, m)))
        .collect()
}

/// Repaired conversion counts, aligned with `records`.
pub fn repair_conversions(records: &[CampaignRecord]) -> Vec<u64> {
    let medians = channel_medians(records);
    let mut filled = 0usize;

    let repaired = records
        .iter()
        .map(|record| match record.conversions {
            Some(conversions) => conversions,
            None => {
                filled += 1;
                match medians.get(&record.channel) {
                    Some(m) => *m as u64,
                    None => {
                        warn!(
                            campaign_id = %record.campaign_id,
                            channel = %record.channel,
                            "Channel has no observed conversions, filling with 0"
                        );
                        0
                    }
                }
            }
        })
        .collect();

    debug!(filled, "Repaired missing conversions");
    repaired
}
