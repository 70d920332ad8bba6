use thiserror::Error;

/// Problems with the run configuration. Always fatal, raised before any row
/// is read.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing access token (pass --access-token or set ACCESS_TOKEN)")]
    MissingAccessToken,

    #[error("Missing {label} for {mode} mode")]
    MissingNamespace { mode: String, label: String },

    #[error("Missing API version")]
    MissingApiVersion,

    #[error("Invalid batch size {size}: must be between 1 and {max}")]
    InvalidBatchSize { size: usize, max: usize },

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("No data source specified (pass --csv or --pg-url with --query)")]
    MissingSource,

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Why a batch was not accepted by the remote API.
///
/// Every variant fails the whole batch; nothing is retried.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP client could not be built: {0}")]
    Client(reqwest::Error),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API rejected batch: {message} (code {code:?})")]
    Api {
        message: String,
        code: Option<i64>,
        fbtrace_id: Option<String>,
    },

    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unreadable API response (HTTP {status}): {message}")]
    InvalidResponse { status: u16, message: String },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DeliveryError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeliveryError::Transport(e) if e.is_timeout())
    }
}
