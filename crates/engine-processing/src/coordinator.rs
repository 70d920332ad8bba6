use crate::{
    batch::Batcher,
    error::BackfillError,
    summary::RunSummary,
    transform::{BuildContext, build_event},
};
use connectors::{adapter::SourceSpec, source::RowSource};
use engine_core::{
    config::BackfillConfig,
    connectors::sink::{
        DeliveryOutcome, EventSink, conversions_api::ConversionsApiClient, dry_run::DryRunSink,
    },
    metrics::RunCounters,
};
use model::{events::ConversionEvent, records::batch::Batch};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const PROGRESS_EVERY: u64 = 10_000;

/// Drives one backfill: rows in, batches out, counters updated along the way.
///
/// Everything runs on a single task and each step is awaited in turn, so
/// events leave in input order and batches in the order they filled.
pub struct RunCoordinator {
    run_id: Uuid,
    config: BackfillConfig,
    sink: Box<dyn EventSink>,
    ctx: BuildContext,
    batcher: Batcher,
    counters: RunCounters,
}

impl RunCoordinator {
    pub fn new(config: BackfillConfig, sink: Box<dyn EventSink>) -> Self {
        let ctx = BuildContext::new(&config.namespace, config.strict_attribution);
        let batcher = Batcher::new(config.batch_size);
        Self {
            run_id: Uuid::new_v4(),
            config,
            sink,
            ctx,
            batcher,
            counters: RunCounters::new(),
        }
    }

    /// Replaces the build context, e.g. to pin "now" in tests.
    pub fn with_context(mut self, ctx: BuildContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    /// Drains `source` and returns the run summary.
    ///
    /// A source error stops the run after the events already built have been
    /// flushed. Delivery failures never stop it.
    pub async fn run(&mut self, source: &mut dyn RowSource) -> Result<RunSummary, BackfillError> {
        let started = Instant::now();
        info!(
            run_id = %self.run_id,
            mode = %self.config.mode,
            source = %source.describe(),
            sink = self.sink.name(),
            batch_size = self.config.batch_size,
            "Starting backfill"
        );

        let drained = self.drain(source).await;

        if let Some(batch) = self.batcher.finish() {
            self.flush(batch).await;
        }

        if let Err(err) = drained {
            error!(run_id = %self.run_id, error = %err, "Row source failed; stopping run");
            return Err(err);
        }

        let summary = RunSummary::new(
            self.run_id,
            self.config.mode,
            self.counters.snapshot(),
            self.config.test_event_code().is_some(),
            self.config.dry_run,
            started.elapsed(),
        );

        info!(
            run_id = %self.run_id,
            processed = summary.processed,
            kept = summary.kept,
            sent = summary.sent,
            skipped = summary.skipped,
            failed = summary.failed,
            duration_secs = summary.duration,
            "Backfill finished"
        );
        Ok(summary)
    }

    async fn drain(&mut self, source: &mut dyn RowSource) -> Result<(), BackfillError> {
        while let Some(row) = source.next_row().await? {
            self.counters.increment_processed();

            match build_event(&row, self.config.mode, &self.ctx) {
                Ok(event) => {
                    self.counters.increment_kept();
                    if let Some(batch) = self.batcher.push(event) {
                        self.flush(batch).await;
                    }
                }
                Err(reason) => {
                    debug!(row = self.counters.processed(), reason = reason.label(), "Row skipped");
                    self.counters.increment_skipped(reason.label());
                }
            }

            if self.counters.processed() % PROGRESS_EVERY == 0 {
                info!(
                    run_id = %self.run_id,
                    processed = self.counters.processed(),
                    "Progress"
                );
            }
        }
        Ok(())
    }

    async fn flush(&mut self, batch: Batch) {
        let events = batch.len();
        let started = Instant::now();

        match self.sink.send(&batch).await {
            Ok(DeliveryOutcome::Discarded) => {}
            Ok(outcome) => {
                self.counters.record_batch_sent(events);
                if let DeliveryOutcome::AcceptedWithWarnings(report) = &outcome {
                    warn!(
                        batch = batch.seq,
                        warnings = report.warnings.len(),
                        "Batch accepted with warnings"
                    );
                }
                info!(
                    batch = batch.seq,
                    events,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Batch sent"
                );
            }
            Err(err) => {
                self.counters.record_batch_failed(events);
                error!(
                    batch = batch.seq,
                    events,
                    timeout = err.is_timeout(),
                    error = %err,
                    "Batch failed"
                );
            }
        }

        if !self.config.batch_pause.is_zero() {
            tokio::time::sleep(self.config.batch_pause).await;
        }
    }
}

/// Picks the sink for a validated configuration.
pub fn sink_for(config: &BackfillConfig) -> Result<Box<dyn EventSink>, BackfillError> {
    if config.dry_run {
        return Ok(Box::new(DryRunSink));
    }
    Ok(Box::new(ConversionsApiClient::new(config)?))
}

/// Validates the config, opens the source and runs the backfill end to end.
pub async fn execute(config: BackfillConfig, spec: &SourceSpec) -> Result<RunSummary, BackfillError> {
    config.validate()?;
    let sink = sink_for(&config)?;
    let mut source = spec.open().await?;
    let mut coordinator = RunCoordinator::new(config, sink);
    coordinator.run(source.as_mut()).await
}

/// Outcome of building a single row, for eyeballing payloads.
#[derive(Debug, Serialize)]
pub struct InspectedRow {
    pub row: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<ConversionEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<&'static str>,
}

/// Builds events for at most `limit` rows without sending anything.
pub async fn inspect(
    config: &BackfillConfig,
    source: &mut dyn RowSource,
    limit: usize,
) -> Result<Vec<InspectedRow>, BackfillError> {
    let ctx = BuildContext::new(&config.namespace, config.strict_attribution);
    let mut inspected = Vec::with_capacity(limit);

    while inspected.len() < limit {
        let Some(row) = source.next_row().await? else {
            break;
        };
        let position = inspected.len() as u64 + 1;
        inspected.push(match build_event(&row, config.mode, &ctx) {
            Ok(event) => InspectedRow {
                row: position,
                event: Some(event),
                skipped: None,
            },
            Err(reason) => InspectedRow {
                row: position,
                event: None,
                skipped: Some(reason.label()),
            },
        });
    }
    Ok(inspected)
}
