use connectors::error::AdapterError;
use engine_core::error::{ConfigError, DeliveryError};
use thiserror::Error;

/// Errors that abort a run.
///
/// Per-row ineligibility and per-batch delivery failures are counted, not
/// raised; only configuration, source and client construction errors end
/// up here.
#[derive(Error, Debug)]
pub enum BackfillError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Row source failed: {0}")]
    Source(#[from] AdapterError),

    #[error("Delivery setup failed: {0}")]
    Delivery(#[from] DeliveryError),
}
