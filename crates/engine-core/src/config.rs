use crate::error::ConfigError;
use model::core::mode::EventMode;
use std::{fmt, time::Duration};
use tracing::warn;

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v19.0";
pub const DEFAULT_BATCH_SIZE: usize = 400;
/// The API refuses requests carrying more events than this.
pub const MAX_BATCH_SIZE: usize = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BATCH_PAUSE_MS: u64 = 250;
pub const DEFAULT_UPLOAD_TAG: &str = "purchase_backfill";

/// Access credential for the Conversions API.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
}

impl Credentials {
    pub fn new(access_token: &str) -> Self {
        Credentials {
            access_token: access_token.trim().to_string(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub version: String,
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: DEFAULT_API_BASE.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Everything a backfill run needs apart from its row source.
#[derive(Debug, Clone)]
pub struct BackfillConfig {
    pub mode: EventMode,
    /// Pixel id (web) or offline dataset id (offline).
    pub namespace: String,
    pub credentials: Credentials,
    pub api: ApiSettings,
    pub batch_size: usize,
    /// Web only: tag requests so the API treats them as test traffic.
    pub test_mode: bool,
    pub test_event_code: Option<String>,
    /// Offline only: label attached to every upload.
    pub upload_tag: String,
    /// Web only: require a click/browser id or UTM source on every row.
    pub strict_attribution: bool,
    /// Pause after every flush attempt.
    pub batch_pause: Duration,
    /// Build and count events but never call the API.
    pub dry_run: bool,
}

impl BackfillConfig {
    pub fn new(mode: EventMode, namespace: &str, credentials: Credentials) -> Self {
        BackfillConfig {
            mode,
            namespace: namespace.trim().to_string(),
            credentials,
            api: ApiSettings::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            test_mode: false,
            test_event_code: None,
            upload_tag: DEFAULT_UPLOAD_TAG.to_string(),
            strict_attribution: true,
            batch_pause: Duration::from_millis(DEFAULT_BATCH_PAUSE_MS),
            dry_run: false,
        }
    }

    /// Rejects configurations that cannot possibly run. Called before any
    /// source is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials.is_empty() && !self.dry_run {
            return Err(ConfigError::MissingAccessToken);
        }
        if self.namespace.is_empty() {
            return Err(ConfigError::MissingNamespace {
                mode: self.mode.to_string(),
                label: self.mode.namespace_label().to_string(),
            });
        }
        if self.api.version.trim().is_empty() {
            return Err(ConfigError::MissingApiVersion);
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidBaseUrl(self.api.base_url.clone()));
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize {
                size: self.batch_size,
                max: MAX_BATCH_SIZE,
            });
        }
        if self.test_mode && self.mode == EventMode::Offline {
            warn!("Test mode only applies to web events; ignoring it for offline mode");
        }
        Ok(())
    }

    /// Endpoint batches are posted to.
    pub fn events_url(&self) -> String {
        format!(
            "{}/{}/{}/events",
            self.api.base_url.trim_end_matches('/'),
            self.api.version.trim_matches('/'),
            self.namespace
        )
    }

    /// Test marker for web runs in test mode. Without an explicit code one is
    /// derived from the namespace so repeated test runs land in the same bucket.
    pub fn test_event_code(&self) -> Option<String> {
        if self.mode != EventMode::Web || !self.test_mode {
            return None;
        }
        if let Some(code) = self.test_event_code.as_deref().map(str::trim)
            && !code.is_empty()
        {
            return Some(code.to_string());
        }
        let tail_start = self
            .namespace
            .char_indices()
            .rev()
            .nth(4)
            .map(|(i, _)| i)
            .unwrap_or(0);
        Some(format!("TEST{}", &self.namespace[tail_start..]))
    }

    pub fn upload_tag(&self) -> Option<&str> {
        match self.mode {
            EventMode::Offline => Some(self.upload_tag.as_str()),
            EventMode::Web => None,
        }
    }
}
