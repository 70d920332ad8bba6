use crate::{
    coordinator::{RunCoordinator, inspect},
    error::BackfillError,
    transform::BuildContext,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use connectors::{
    error::AdapterError,
    file::csv::error::FileError,
    source::{RowSource, VecSource},
};
use engine_core::{
    config::{BackfillConfig, Credentials},
    connectors::sink::{DeliveryOutcome, DeliveryReport, EventSink, dry_run::DryRunSink},
    error::DeliveryError,
};
use model::{core::mode::EventMode, records::batch::Batch, records::row::RowData};
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

// Records every batch it sees and rejects the ones listed in `fail_on`.
#[derive(Clone, Default)]
struct MockSink {
    seen: Arc<Mutex<Vec<(u64, usize)>>>,
    fail_on: Vec<u64>,
}

impl MockSink {
    fn failing(fail_on: &[u64]) -> Self {
        Self {
            fail_on: fail_on.to_vec(),
            ..Default::default()
        }
    }

    fn seen(&self) -> Vec<(u64, usize)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for MockSink {
    async fn send(&self, batch: &Batch) -> Result<DeliveryOutcome, DeliveryError> {
        self.seen.lock().unwrap().push((batch.seq, batch.len()));
        if self.fail_on.contains(&batch.seq) {
            return Err(DeliveryError::Status {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(DeliveryOutcome::Accepted(DeliveryReport {
            events_received: Some(batch.len() as u64),
            ..Default::default()
        }))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// Yields its rows, then fails instead of ending.
struct BrokenSource {
    rows: Vec<RowData>,
}

#[async_trait]
impl RowSource for BrokenSource {
    async fn next_row(&mut self) -> Result<Option<RowData>, AdapterError> {
        match self.rows.pop() {
            Some(row) => Ok(Some(row)),
            None => Err(FileError::ReadError {
                record: 4,
                message: "unequal lengths".into(),
            }
            .into()),
        }
    }

    fn describe(&self) -> String {
        "broken".into()
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn config(batch_size: usize) -> BackfillConfig {
    let mut config = BackfillConfig::new(EventMode::Web, "1234567890", Credentials::new("token"));
    config.batch_size = batch_size;
    config.batch_pause = Duration::ZERO;
    config
}

fn good_row(order_id: &str) -> RowData {
    let event_time = (now() - ChronoDuration::days(1)).timestamp().to_string();
    RowData::from_pairs(
        "test",
        [
            ("order_id", Some(order_id.to_string())),
            ("value", Some("10.00".to_string())),
            ("event_time", Some(event_time)),
            ("utm_source", Some("newsletter".to_string())),
        ],
    )
}

fn stale_row(order_id: &str) -> RowData {
    let event_time = (now() - ChronoDuration::days(10)).timestamp().to_string();
    RowData::from_pairs(
        "test",
        [
            ("order_id", Some(order_id.to_string())),
            ("value", Some("10.00".to_string())),
            ("event_time", Some(event_time)),
            ("utm_source", Some("newsletter".to_string())),
        ],
    )
}

fn coordinator(config: BackfillConfig, sink: impl EventSink + 'static) -> RunCoordinator {
    let ctx = BuildContext::new(&config.namespace, config.strict_attribution).at(now());
    RunCoordinator::new(config, Box::new(sink)).with_context(ctx)
}

#[tokio::test]
async fn test_counts_and_flushes() {
    let sink = MockSink::default();
    let mut rows: Vec<RowData> = (0..5).map(|i| good_row(&format!("A{i}"))).collect();
    rows.push(stale_row("OLD"));
    rows.push(RowData::from_pairs("test", [("value", Some("1".to_string()))]));

    let mut source = VecSource::new(rows);
    let summary = coordinator(config(2), sink.clone())
        .run(&mut source)
        .await
        .unwrap();

    assert_eq!(summary.processed, 7);
    assert_eq!(summary.kept, 5);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.sent, 5);
    assert_eq!(summary.failed, 0);
    assert!(summary.success);
    assert_eq!(summary.processed, summary.kept + summary.skipped);
    assert_eq!(summary.skipped_by_reason.get("outside_window"), Some(&1));
    assert_eq!(summary.skipped_by_reason.get("missing_order_id"), Some(&1));

    // ceil(5 / 2) flushes, the last one short
    assert_eq!(sink.seen(), vec![(1, 2), (2, 2), (3, 1)]);
    assert_eq!(summary.batches_sent, 3);
}

#[tokio::test]
async fn test_failed_batch_is_isolated() {
    let sink = MockSink::failing(&[2]);
    let rows: Vec<RowData> = (0..6).map(|i| good_row(&format!("A{i}"))).collect();

    let mut source = VecSource::new(rows);
    let summary = coordinator(config(2), sink.clone())
        .run(&mut source)
        .await
        .unwrap();

    assert_eq!(sink.seen().len(), 3);
    assert_eq!(summary.sent, 4);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.batches_failed, 1);
    assert!(!summary.success);
}

#[tokio::test]
async fn test_empty_source() {
    let sink = MockSink::default();
    let mut source = VecSource::new(Vec::new());
    let summary = coordinator(config(400), sink.clone())
        .run(&mut source)
        .await
        .unwrap();

    assert!(sink.seen().is_empty());
    assert_eq!(summary.processed, 0);
    assert!(summary.success);
}

#[tokio::test]
async fn test_source_error_flushes_residual_then_fails() {
    let sink = MockSink::default();
    let mut source = BrokenSource {
        rows: vec![good_row("A1"), good_row("A2"), good_row("A3")],
    };

    let mut run = coordinator(config(2), sink.clone());
    let result = run.run(&mut source).await;

    assert!(matches!(result, Err(BackfillError::Source(_))));
    assert_eq!(sink.seen(), vec![(1, 2), (2, 1)]);
    assert_eq!(run.counters().processed(), 3);
}

#[tokio::test]
async fn test_pause_applies_per_flush() {
    let sink = MockSink::failing(&[1]);
    let mut config = config(1);
    config.batch_pause = Duration::from_millis(20);
    let rows: Vec<RowData> = (0..3).map(|i| good_row(&format!("A{i}"))).collect();

    let started = Instant::now();
    let mut source = VecSource::new(rows);
    coordinator(config, sink.clone())
        .run(&mut source)
        .await
        .unwrap();

    assert_eq!(sink.seen().len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_dry_run_counts_nothing_as_sent() {
    let mut config = config(2);
    config.dry_run = true;
    let rows: Vec<RowData> = (0..3).map(|i| good_row(&format!("A{i}"))).collect();

    let mut source = VecSource::new(rows);
    let summary = coordinator(config, DryRunSink)
        .run(&mut source)
        .await
        .unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.kept, 3);
    assert_eq!(summary.sent, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.batches_sent, 0);
}

#[tokio::test]
async fn test_inspect_stops_at_limit() {
    let mut config = config(400);
    config.strict_attribution = false;
    // inspect measures the window against the wall clock
    let recent = (Utc::now() - ChronoDuration::hours(1)).to_rfc3339();
    let rows = vec![
        RowData::from_pairs(
            "test",
            [
                ("order_id", Some("A1".to_string())),
                ("value", Some("5".to_string())),
                ("event_time", Some(recent)),
            ],
        ),
        RowData::from_pairs("test", [("order_id", Some("A2".to_string()))]),
        good_row("A3"),
    ];

    let mut source = VecSource::new(rows);
    let inspected = inspect(&config, &mut source, 2).await.unwrap();

    assert_eq!(inspected.len(), 2);
    assert!(inspected[0].event.is_some());
    assert_eq!(inspected[1].skipped, Some("invalid_value"));
    assert_eq!(inspected[1].row, 2);
}
