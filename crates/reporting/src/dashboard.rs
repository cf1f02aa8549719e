//! Campaign performance dashboard — headline KPIs and per-channel rollups
//! over a (possibly filtered) enriched table.

use campaign_core::{Channel, EnrichedTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAmount {
    pub channel: Channel,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCount {
    pub channel: Channel,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAggregates {
    pub campaigns: usize,
    pub total_budget: f64,
    pub total_conversions: u64,
    pub mean_roi: f64,
    /// Sum of budget per channel, in channel-name order.
    pub per_channel_budget: Vec<ChannelAmount>,
    /// Mean CPA per channel, cheapest first.
    pub per_channel_cpa: Vec<ChannelAmount>,
    /// Conversions per channel, most first.
    pub per_channel_conversions: Vec<ChannelCount>,
    /// Mean ROI per channel, best first.
    pub per_channel_roi: Vec<ChannelAmount>,
}

impl DashboardAggregates {
    /// Share of the total budget spent by each channel, in percent.
    pub fn budget_share(&self) -> Vec<ChannelAmount> {
        let total = if self.total_budget == 0.0 {
            1.0
        } else {
            self.total_budget
        };
        self.per_channel_budget
            .iter()
            .map(|c| ChannelAmount {
                channel: c.channel,
                value: c.value / total * 100.0,
            })
            .collect()
    }
}

/// Result of aggregating a selection. An empty selection is reported as
/// `NoData` instead of producing undefined means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregateOutcome {
    NoData,
    Summary(DashboardAggregates),
}

impl AggregateOutcome {
    pub fn summary(&self) -> Option<&DashboardAggregates> {
        match self {
            Self::Summary(aggregates) => Some(aggregates),
            Self::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

#[derive(Default)]
struct ChannelAccumulator {
    rows: usize,
    budget: f64,
    conversions: u64,
    cpa_sum: f64,
    roi_sum: f64,
}

/// Compute headline figures and per-channel rollups for `table`.
pub fn aggregate(table: &EnrichedTable) -> AggregateOutcome {
    if table.is_empty() {
        return AggregateOutcome::NoData;
    }

    let mut groups: BTreeMap<Channel, ChannelAccumulator> = BTreeMap::new();
    let mut total_budget = 0.0;
    let mut total_conversions = 0u64;
    let mut roi_sum = 0.0;

    for record in table {
        total_budget += record.budget_brl;
        // Counts saturate instead of wrapping on extreme inputs.
        total_conversions = total_conversions.saturating_add(record.conversions);
        roi_sum += record.roi_pct;

        let acc = groups.entry(record.channel).or_default();
        acc.rows += 1;
        acc.budget += record.budget_brl;
        acc.conversions = acc.conversions.saturating_add(record.conversions);
        acc.cpa_sum += record.cpa;
        acc.roi_sum += record.roi_pct;
    }

    let per_channel_budget: Vec<ChannelAmount> = groups
        .iter()
        .map(|(channel, acc)| ChannelAmount {
            channel: *channel,
            value: acc.budget,
        })
        .collect();

    // Stable sorts: ties keep channel-name order.
    let mut per_channel_cpa: Vec<ChannelAmount> = groups
        .iter()
        .map(|(channel, acc)| ChannelAmount {
            channel: *channel,
            value: acc.cpa_sum / acc.rows as f64,
        })
        .collect();
    per_channel_cpa.sort_by(|a, b| a.value.total_cmp(&b.value));

    let mut per_channel_conversions: Vec<ChannelCount> = groups
        .iter()
        .map(|(channel, acc)| ChannelCount {
            channel: *channel,
            value: acc.conversions,
        })
        .collect();
    per_channel_conversions.sort_by(|a, b| b.value.cmp(&a.value));

    let mut per_channel_roi: Vec<ChannelAmount> = groups
        .iter()
        .map(|(channel, acc)| ChannelAmount {
            channel: *channel,
            value: acc.roi_sum / acc.rows as f64,
        })
        .collect();
    per_channel_roi.sort_by(|a, b| b.value.total_cmp(&a.value));

    AggregateOutcome::Summary(DashboardAggregates {
        campaigns: table.len(),
        total_budget,
        total_conversions,
        mean_roi: roi_sum / table.len() as f64,
        per_channel_budget,
        per_channel_cpa,
        per_channel_conversions,
        per_channel_roi,
    })
}
