//! Per-record ratios.

use campaign_core::types::{CampaignRecord, DerivedRecord, MonthPeriod};

/// `numerator / denominator`, or missing when either side is missing or the
/// denominator is zero.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Like [`ratio`], scaled to a percentage.
pub fn percentage(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    ratio(numerator, denominator).map(|r| r * 100.0)
}

pub fn derive(record: CampaignRecord) -> DerivedRecord {
    let clicks = record.clicks.map(|v| v as f64);
    let conversions = record.conversions.map(|v| v as f64);

    DerivedRecord {
        conversion_rate: percentage(conversions, clicks),
        cpc: ratio(record.total_spend, clicks),
        cpa: ratio(record.total_spend, conversions),
        roas: ratio(record.revenue_generated, record.total_spend),
        month_period: record.end_date.map(MonthPeriod::from_date),
        record,
    }
}

pub fn derive_all(records: impl IntoIterator<Item = CampaignRecord>) -> Vec<DerivedRecord> {
    records.into_iter().map(derive).collect()
}
