//! Per-row business metrics: CTR, CPC, conversion rate, CPA, revenue, ROI.
//!
//! Zero denominators are replaced by 1 rather than producing NaN or
//! infinity. This is a reporting convention, not a true rate, and keeps
//! figures comparable with historical dashboards.

use campaign_core::{CampaignRecord, EnrichedRecord};

/// Average order value in BRL used to turn conversions into revenue.
pub const AVERAGE_ORDER_VALUE: f64 = 250.0;

fn guard_count(value: u64) -> f64 {
    if value == 0 {
        1.0
    } else {
        value as f64
    }
}

fn guard_amount(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value
    }
}

/// Derive the metric columns for one row, given its repaired conversions.
pub fn enrich(record: CampaignRecord, conversions: u64) -> EnrichedRecord {
    let budget = record.budget_brl;
    let impressions_safe = guard_count(record.impressions);
    let clicks_safe = guard_count(record.clicks);
    let conversions_safe = guard_count(conversions);
    let budget_safe = guard_amount(budget);

    let revenue = conversions as f64 * AVERAGE_ORDER_VALUE;

    EnrichedRecord {
        ctr_pct: (record.clicks as f64 / impressions_safe) * 100.0,
        cpc: budget / clicks_safe,
        conversion_rate_pct: (conversions as f64 / clicks_safe) * 100.0,
        cpa: budget / conversions_safe,
        revenue,
        roi_pct: ((revenue - budget) / budget_safe) * 100.0,
        campaign_id: record.campaign_id,
        channel: record.channel,
        start_date: record.start_date,
        end_date: record.end_date,
        budget_brl: budget,
        impressions: record.impressions,
        clicks: record.clicks,
        conversions,
        ad_group: record.ad_group,
        device: record.device,
        region: record.region,
    }
}
