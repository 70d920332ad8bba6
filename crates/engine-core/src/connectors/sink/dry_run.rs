use super::{DeliveryOutcome, EventSink};
use crate::error::DeliveryError;
use async_trait::async_trait;
use model::records::batch::Batch;
use tracing::info;

/// Logs batches instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunSink;

#[async_trait]
impl EventSink for DryRunSink {
    async fn send(&self, batch: &Batch) -> Result<DeliveryOutcome, DeliveryError> {
        let (first, last) = batch.time_range().unwrap_or_default();
        info!(
            batch = batch.seq,
            events = batch.len(),
            first_event_time = first,
            last_event_time = last,
            "Dry run: batch built but not sent"
        );
        Ok(DeliveryOutcome::Discarded)
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_discards() {
        let sink = DryRunSink;
        let outcome = sink.send(&Batch::new(1, Vec::new())).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::Discarded);
        assert!(!outcome.is_delivered());
    }
}
