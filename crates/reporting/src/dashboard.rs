//! Campaign performance dashboard — bundles engine output into one
//! serializable report for a presentation layer to render.

use campaign_core::types::RawCampaignRow;
use campaign_core::CampaignResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{AggregateRow, GroupBy, Metric};
use crate::clean::FieldIssue;
use crate::derive::percentage;
use crate::distribution::{BoxStats, Histogram, RoasMatrix, SpendRevenuePoint};
use crate::engine::MetricsEngine;
use crate::summary::KpiSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[default]
    All,
    Kpis,
    Channels,
    Months,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelShare {
    pub channel: String,
    pub spend: Option<f64>,
    /// Percentage of total channel spend.
    pub share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub issue_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpis: Option<KpiSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<AggregateRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<Vec<AggregateRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend_share: Option<Vec<ChannelShare>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roas_matrix: Option<RoasMatrix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpa_distribution: Option<Vec<BoxStats>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spend_revenue: Option<Vec<SpendRevenuePoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions_histogram: Option<Histogram>,
}

/// Share of summed spend per channel row.
pub fn spend_share(channels: &[AggregateRow]) -> Vec<ChannelShare> {
    let total: f64 = channels.iter().filter_map(|r| r.get(Metric::TotalSpend)).sum();
    channels
        .iter()
        .map(|row| {
            let spend = row.get(Metric::TotalSpend);
            ChannelShare {
                channel: row.key.clone(),
                spend,
                share: percentage(spend, Some(total)),
            }
        })
        .collect()
}

pub struct DashboardBuilder<'a> {
    engine: &'a MetricsEngine,
    section: Section,
    include_issues: bool,
}

impl<'a> DashboardBuilder<'a> {
    pub fn new(engine: &'a MetricsEngine) -> Self {
        Self {
            engine,
            section: Section::All,
            include_issues: false,
        }
    }

    pub fn section(mut self, section: Section) -> Self {
        self.section = section;
        self
    }

    /// List every coercion issue in the report, not just the count.
    pub fn include_issues(mut self, include: bool) -> Self {
        self.include_issues = include;
        self
    }

    pub fn build(&self, rows: &[RawCampaignRow]) -> CampaignResult<DashboardReport> {
        let cleaned = self.engine.clean_with_report(rows)?;
        let issue_count = cleaned.issues.len();
        let records = crate::derive::derive_all(cleaned.records);

        let wants = |section: Section| self.section == Section::All || self.section == section;
        let everything = self.section == Section::All;

        let channels = wants(Section::Channels).then(|| self.engine.aggregate_by(&records, GroupBy::Channel));
        let impressions_histogram = if everything {
            Some(self.engine.impressions_histogram(&records)?)
        } else {
            None
        };

        let report = DashboardReport {
            generated_at: Utc::now(),
            record_count: records.len(),
            issue_count,
            issues: if self.include_issues { cleaned.issues } else { Vec::new() },
            kpis: wants(Section::Kpis).then(|| self.engine.summarize(&records)),
            spend_share: channels.as_deref().map(spend_share),
            cpa_distribution: wants(Section::Channels).then(|| self.engine.cpa_distribution(&records)),
            spend_revenue: wants(Section::Channels).then(|| self.engine.spend_revenue(&records)),
            channels,
            months: wants(Section::Months).then(|| self.engine.aggregate_by(&records, GroupBy::Month)),
            roas_matrix: wants(Section::Months).then(|| self.engine.roas_matrix(&records)),
            impressions_histogram,
        };

        info!(
            section = ?self.section,
            records = report.record_count,
            issues = report.issue_count,
            "Dashboard report built"
        );
        Ok(report)
    }
}
