//! Shared types for the campaign metrics workspace: raw and cleaned campaign
//! rows, derived records, the error type and application configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, EngineConfig};
pub use error::{CampaignError, CampaignResult};
pub use types::{CampaignRecord, CellValue, DerivedRecord, Field, MonthPeriod, RawCampaignRow};
