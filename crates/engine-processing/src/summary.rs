use engine_core::metrics::CountersSnapshot;
use model::core::mode::EventMode;
use serde::Serialize;
use std::{collections::BTreeMap, time::Duration};
use uuid::Uuid;

/// End-of-run report, printed as JSON.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub mode: EventMode,
    pub processed: u64,
    pub kept: u64,
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
    /// True when events were tagged with a test event code.
    pub test: bool,
    pub dry_run: bool,
    /// Wall-clock seconds from start of processing to the end of the last flush.
    pub duration: f64,
    pub success: bool,
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub skipped_by_reason: BTreeMap<String, u64>,
}

impl RunSummary {
    pub fn new(
        run_id: Uuid,
        mode: EventMode,
        counters: CountersSnapshot,
        test: bool,
        dry_run: bool,
        elapsed: Duration,
    ) -> Self {
        RunSummary {
            run_id,
            mode,
            processed: counters.processed,
            kept: counters.kept,
            sent: counters.sent,
            skipped: counters.skipped,
            failed: counters.failed,
            test,
            dry_run,
            duration: elapsed.as_secs_f64(),
            success: counters.failed == 0,
            batches_sent: counters.batches_sent,
            batches_failed: counters.batches_failed,
            skipped_by_reason: counters.skipped_by_reason,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
