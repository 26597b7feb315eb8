//! Metrics engine: the entry point tying cleaning, derivation and the
//! reductions together under one configuration.

use campaign_core::types::{CampaignRecord, DerivedRecord, RawCampaignRow};
use campaign_core::{CampaignResult, EngineConfig};
use tracing::info;

use crate::aggregate::{self, AggregateRow, GroupBy};
use crate::clean::{self, CleanReport};
use crate::derive;
use crate::distribution::{self, BoxStats, Histogram, RoasMatrix, SpendRevenuePoint};
use crate::summary::{self, KpiSummary};

/// Stateless apart from its configuration; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: EngineConfig,
}

impl MetricsEngine {
    pub fn new(config: EngineConfig) -> Self {
        info!(
            date_formats = config.date_formats.len(),
            histogram_bins = config.histogram_bins,
            "Metrics engine initialized"
        );
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clean(&self, rows: &[RawCampaignRow]) -> CampaignResult<Vec<CampaignRecord>> {
        clean::clean(rows, &self.config)
    }

    pub fn clean_with_report(&self, rows: &[RawCampaignRow]) -> CampaignResult<CleanReport> {
        clean::clean_with_report(rows, &self.config)
    }

    pub fn derive(&self, record: CampaignRecord) -> DerivedRecord {
        derive::derive(record)
    }

    /// Clean then derive every row.
    pub fn prepare(&self, rows: &[RawCampaignRow]) -> CampaignResult<Vec<DerivedRecord>> {
        Ok(derive::derive_all(self.clean(rows)?))
    }

    pub fn summarize(&self, records: &[DerivedRecord]) -> KpiSummary {
        summary::summarize(records)
    }

    pub fn aggregate_by(&self, records: &[DerivedRecord], group_by: GroupBy) -> Vec<AggregateRow> {
        aggregate::aggregate_by(records, group_by)
    }

    pub fn roas_matrix(&self, records: &[DerivedRecord]) -> RoasMatrix {
        distribution::roas_matrix(records)
    }

    pub fn cpa_distribution(&self, records: &[DerivedRecord]) -> Vec<BoxStats> {
        distribution::cpa_distribution(records)
    }

    pub fn spend_revenue(&self, records: &[DerivedRecord]) -> Vec<SpendRevenuePoint> {
        distribution::spend_revenue(records)
    }

    /// Uses the configured bin count.
    pub fn impressions_histogram(&self, records: &[DerivedRecord]) -> CampaignResult<Histogram> {
        distribution::impressions_histogram(records, self.config.histogram_bins)
    }
}
