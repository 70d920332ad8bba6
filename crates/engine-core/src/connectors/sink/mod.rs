pub mod conversions_api;
pub mod dry_run;

use crate::error::DeliveryError;
use async_trait::async_trait;
use model::records::batch::Batch;

/// How the remote side took a batch that it did not reject.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// Accepted without remarks.
    Accepted(DeliveryReport),
    /// Accepted, but the API attached warnings. Still counts as sent.
    AcceptedWithWarnings(DeliveryReport),
    /// Nothing was sent (dry run).
    Discarded,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        !matches!(self, DeliveryOutcome::Discarded)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryReport {
    pub events_received: Option<u64>,
    pub warnings: Vec<String>,
    pub trace_id: Option<String>,
}

/// Destination for built batches.
///
/// A call either accepts or rejects the whole batch; implementations never
/// retry.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, batch: &Batch) -> Result<DeliveryOutcome, DeliveryError>;

    fn name(&self) -> &'static str;
}
