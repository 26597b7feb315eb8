use thiserror::Error;

use crate::types::Field;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    /// A required column is absent from every record of the input.
    #[error("Schema violation: required column `{}` is absent from every record", .field.column_name())]
    SchemaViolation { field: Field },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
