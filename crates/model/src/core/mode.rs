use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Which flavour of conversion event a run produces.
///
/// Chosen once when the run starts; everything downstream branches on this
/// value instead of inspecting events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMode {
    /// Browser purchases sent against a pixel.
    Web,
    /// Store or back-office purchases sent against an offline dataset.
    Offline,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown event mode: {0} (expected 'web' or 'offline')")]
pub struct UnknownModeError(pub String);

impl EventMode {
    /// Trailing window, relative to "now", in which an event may still be sent.
    pub fn window(&self) -> Duration {
        match self {
            EventMode::Web => Duration::days(7),
            EventMode::Offline => Duration::days(62),
        }
    }

    pub fn action_source(&self) -> &'static str {
        match self {
            EventMode::Web => "website",
            EventMode::Offline => "other",
        }
    }

    /// Human label for the namespace the mode routes to.
    pub fn namespace_label(&self) -> &'static str {
        match self {
            EventMode::Web => "pixel id",
            EventMode::Offline => "dataset id",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventMode::Web => "web",
            EventMode::Offline => "offline",
        }
    }
}

impl FromStr for EventMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "web" | "website" | "pixel" => Ok(EventMode::Web),
            "offline" | "dataset" => Ok(EventMode::Offline),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
