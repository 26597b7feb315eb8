//! Dataset-wide KPIs. Every rate here is a ratio of sums, never a mean of
//! per-record ratios.

use campaign_core::types::{CampaignRecord, DerivedRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::derive::{percentage, ratio};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub record_count: usize,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_conversions: u64,
    pub total_spend: f64,
    pub total_revenue: f64,
    /// total_clicks / total_impressions × 100
    pub average_ctr: Option<f64>,
    /// total_revenue / total_spend
    pub overall_roas: Option<f64>,
    /// total_conversions / total_clicks × 100
    pub overall_conversion_rate: Option<f64>,
    /// total_spend / total_clicks
    pub overall_cpc: Option<f64>,
    /// total_spend / total_conversions
    pub overall_cpa: Option<f64>,
}

/// Sum of present counts, saturating at `u64::MAX`.
fn count_total(records: &[DerivedRecord], count: impl Fn(&CampaignRecord) -> Option<u64>) -> u64 {
    records
        .iter()
        .filter_map(|d| count(&d.record))
        .fold(0u64, u64::saturating_add)
}

pub fn summarize(records: &[DerivedRecord]) -> KpiSummary {
    let total_impressions = count_total(records, |r| r.impressions);
    let total_clicks = count_total(records, |r| r.clicks);
    let total_conversions = count_total(records, |r| r.conversions);
    // f64 sums of nothing are -0.0
    let total_spend = records.iter().filter_map(|d| d.record.total_spend).sum::<f64>() + 0.0;
    let total_revenue = records.iter().filter_map(|d| d.record.revenue_generated).sum::<f64>() + 0.0;

    let impressions = Some(total_impressions as f64);
    let clicks = Some(total_clicks as f64);
    let conversions = Some(total_conversions as f64);

    let summary = KpiSummary {
        record_count: records.len(),
        total_impressions,
        total_clicks,
        total_conversions,
        total_spend,
        total_revenue,
        average_ctr: percentage(clicks, impressions),
        overall_roas: ratio(Some(total_revenue), Some(total_spend)),
        overall_conversion_rate: percentage(conversions, clicks),
        overall_cpc: ratio(Some(total_spend), clicks),
        overall_cpa: ratio(Some(total_spend), conversions),
    };

    debug!(
        records = summary.record_count,
        total_spend = summary.total_spend,
        total_revenue = summary.total_revenue,
        "Computed KPI summary"
    );
    summary
}
