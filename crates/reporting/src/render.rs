//! Plain-text dashboard: headline KPIs, the four per-channel breakdowns,
//! and the filtered detail rows.

use crate::dashboard::{AggregateOutcome, DashboardAggregates};
use campaign_core::EnrichedTable;
use std::fmt::Write;

pub const NO_DATA_NOTICE: &str =
    "No data available for the selected filters. Please adjust your selection.";

/// Group the integer part of a plain decimal string with commas.
fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `R$ 1,234.56`
pub fn format_brl(amount: f64) -> String {
    format!("R$ {}", group_thousands(&format!("{amount:.2}")))
}

/// `12,345`
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// `12.34%`
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

/// Render the full dashboard for a filtered table and its aggregates.
pub fn render_dashboard(table: &EnrichedTable, outcome: &AggregateOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Marketing Campaign Dashboard");
    let _ = writeln!(out, "============================");

    match outcome {
        AggregateOutcome::NoData => {
            let _ = writeln!(out);
            let _ = writeln!(out, "{NO_DATA_NOTICE}");
        }
        AggregateOutcome::Summary(summary) => {
            render_summary(&mut out, summary);
            render_details(&mut out, table);
        }
    }
    out
}

fn render_summary(out: &mut String, summary: &DashboardAggregates) {
    let _ = writeln!(out);
    let _ = writeln!(out, "Overview ({} campaigns)", summary.campaigns);
    let _ = writeln!(out, "  Total investment   {}", format_brl(summary.total_budget));
    let _ = writeln!(out, "  Total conversions  {}", format_count(summary.total_conversions));
    let _ = writeln!(out, "  Mean ROI           {}", format_percent(summary.mean_roi, 2));

    let _ = writeln!(out);
    let _ = writeln!(out, "Budget by channel");
    for (budget, share) in summary.per_channel_budget.iter().zip(summary.budget_share()) {
        let _ = writeln!(
            out,
            "  {:<14}{:>18}  {:>7}",
            budget.channel.as_str(),
            format_brl(budget.value),
            format_percent(share.value, 1)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Cost per acquisition (CPA)");
    for cpa in &summary.per_channel_cpa {
        let _ = writeln!(out, "  {:<14}{:>18}", cpa.channel.as_str(), format_brl(cpa.value));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Conversions by channel");
    for conversions in &summary.per_channel_conversions {
        let _ = writeln!(
            out,
            "  {:<14}{:>18}",
            conversions.channel.as_str(),
            format_count(conversions.value)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Return on investment (ROI) by channel");
    for roi in &summary.per_channel_roi {
        let _ = writeln!(
            out,
            "  {:<14}{:>18}",
            roi.channel.as_str(),
            format_percent(roi.value, 0)
        );
    }
}

fn render_details(out: &mut String, table: &EnrichedTable) {
    let _ = writeln!(out);
    let _ = writeln!(out, "Campaign details");
    let _ = writeln!(
        out,
        "  {:<8} {:<13} {:<13} {:<8} {:<10} {:<10} {:>14} {:>11} {:>7} {:>12} {:>9}",
        "ID", "Channel", "Region", "Device", "Start", "End", "Budget", "Conversions", "CTR", "CPA", "ROI"
    );
    for r in table {
        let _ = writeln!(
            out,
            "  {:<8} {:<13} {:<13} {:<8} {:<10} {:<10} {:>14} {:>11} {:>7} {:>12} {:>9}",
            r.campaign_id,
            r.channel.as_str(),
            r.region,
            r.device,
            r.start_date.to_string(),
            r.end_date.to_string(),
            format_brl(r.budget_brl),
            format_count(r.conversions),
            format_percent(r.ctr_pct, 2),
            format_brl(r.cpa),
            format_percent(r.roi_pct, 0),
        );
    }
}
