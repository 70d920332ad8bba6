use connectors::error::AdapterError;
use engine_core::error::ConfigError;
use engine_processing::error::BackfillError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read or write a file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid mode '{0}': expected 'web' or 'offline'")]
    InvalidMode(String),

    #[error(transparent)]
    InvalidSettings(#[from] ConfigError),

    #[error("Failed to open the row source: {0}")]
    Source(#[from] AdapterError),

    #[error("Backfill failed: {0}")]
    Backfill(#[from] BackfillError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
