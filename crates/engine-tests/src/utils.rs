#![allow(dead_code)]

use chrono::{Duration, Utc};
use engine_core::config::{BackfillConfig, Credentials};
use httpmock::MockServer;
use model::core::mode::EventMode;
use std::{io::Write, time::Duration as StdDuration};
use tempfile::NamedTempFile;

pub const PIXEL_ID: &str = "1234567890";
pub const DATASET_ID: &str = "9876543210";
pub const ACCESS_TOKEN: &str = "test-token";
pub const API_VERSION: &str = "v19.0";

/// sha256 of "a@b.com".
pub const EMAIL_HASH: &str = "fb98d44ad7501a959f3f4f4a3f004fe2d9e581ea6207e218c4b02c08a4d75adf";

pub const PURCHASES_HEADER: &str = "Order ID,Value,Event Time,Email,Phone,UTM Source,fbp";

/// Writes `lines` (header first) to a temporary CSV file.
pub fn csv_file(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp csv");
    for line in lines {
        writeln!(file, "{line}").expect("write csv line");
    }
    file.flush().expect("flush csv");
    file
}

pub fn csv_file_bytes(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp csv");
    file.write_all(bytes).expect("write csv bytes");
    file.flush().expect("flush csv");
    file
}

pub fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339()
}

pub fn hours_ago(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours)).to_rfc3339()
}

/// A config pointed at `server`, with pacing disabled.
pub fn config_for(server: &MockServer, mode: EventMode) -> BackfillConfig {
    let namespace = match mode {
        EventMode::Web => PIXEL_ID,
        EventMode::Offline => DATASET_ID,
    };
    let mut config = BackfillConfig::new(mode, namespace, Credentials::new(ACCESS_TOKEN));
    config.api.base_url = server.base_url();
    config.api.version = API_VERSION.to_string();
    config.batch_pause = StdDuration::ZERO;
    config
}

pub fn events_path(namespace: &str) -> String {
    format!("/{API_VERSION}/{namespace}/events")
}
