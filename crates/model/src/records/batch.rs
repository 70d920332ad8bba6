use crate::events::ConversionEvent;

/// A run of built events handed to the sink in one request.
#[derive(Debug, Clone)]
pub struct Batch {
    /// 1-based position of this batch within the run.
    pub seq: u64,
    pub events: Vec<ConversionEvent>,
    pub ts: chrono::DateTime<chrono::Utc>,
}

impl Batch {
    pub fn new(seq: u64, events: Vec<ConversionEvent>) -> Self {
        Batch {
            seq,
            events,
            ts: chrono::Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Span of event times covered, as epoch seconds.
    pub fn time_range(&self) -> Option<(i64, i64)> {
        let mut times = self.events.iter().map(|e| e.event_time());
        let first = times.next()?;
        Some(times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}
