//! Campaign metrics engine: field coercion, per-record ratios, KPI summary,
//! channel and monthly aggregation, distribution views and the dashboard
//! report handed to a presentation layer.

pub mod aggregate;
pub mod clean;
pub mod dashboard;
pub mod derive;
pub mod distribution;
pub mod engine;
pub mod summary;

pub use aggregate::{aggregate_by, AggregateRow, GroupBy, Metric};
pub use clean::{clean, clean_with_report, CleanReport, FieldIssue};
pub use dashboard::{DashboardBuilder, DashboardReport, Section};
pub use derive::{derive, derive_all};
pub use distribution::{BoxStats, Histogram, HistogramBin, RoasMatrix, SpendRevenuePoint};
pub use engine::MetricsEngine;
pub use summary::{summarize, KpiSummary};
