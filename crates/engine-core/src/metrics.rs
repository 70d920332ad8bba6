use serde::Serialize;
use std::collections::BTreeMap;

/// Counters for a single backfill run.
///
/// Owned by the run coordinator and only ever incremented. Read once at the
/// end of the run through [`RunCounters::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct RunCounters {
    processed: u64,
    kept: u64,
    skipped: u64,
    sent: u64,
    failed: u64,
    batches_sent: u64,
    batches_failed: u64,
    skipped_by_reason: BTreeMap<&'static str, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    pub processed: u64,
    pub kept: u64,
    pub skipped: u64,
    pub sent: u64,
    pub failed: u64,
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub skipped_by_reason: BTreeMap<String, u64>,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_processed(&mut self) {
        self.processed += 1;
    }

    pub fn increment_kept(&mut self) {
        self.kept += 1;
    }

    pub fn increment_skipped(&mut self, reason: &'static str) {
        self.skipped += 1;
        *self.skipped_by_reason.entry(reason).or_default() += 1;
    }

    pub fn record_batch_sent(&mut self, events: usize) {
        self.sent += events as u64;
        self.batches_sent += 1;
    }

    pub fn record_batch_failed(&mut self, events: usize) {
        self.failed += events as u64;
        self.batches_failed += 1;
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            processed: self.processed,
            kept: self.kept,
            skipped: self.skipped,
            sent: self.sent,
            failed: self.failed,
            batches_sent: self.batches_sent,
            batches_failed: self.batches_failed,
            skipped_by_reason: self
                .skipped_by_reason
                .iter()
                .map(|(reason, count)| (reason.to_string(), *count))
                .collect(),
        }
    }
}
