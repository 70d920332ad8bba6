use model::{events::ConversionEvent, records::batch::Batch};
use std::mem;

/// Accumulates events and cuts them into batches of a fixed capacity.
///
/// Batches carry a monotonically increasing sequence number starting at 1,
/// used only for logging.
pub struct Batcher {
    capacity: usize,
    pending: Vec<ConversionEvent>,
    next_seq: u64,
}

impl Batcher {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            pending: Vec::with_capacity(capacity),
            next_seq: 1,
        }
    }

    /// Adds an event and returns a full batch once capacity is reached.
    pub fn push(&mut self, event: ConversionEvent) -> Option<Batch> {
        self.pending.push(event);
        if self.pending.len() >= self.capacity {
            Some(self.cut())
        } else {
            None
        }
    }

    /// Returns whatever is left over, if anything.
    pub fn finish(&mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.cut())
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn cut(&mut self) -> Batch {
        let events = mem::replace(&mut self.pending, Vec::with_capacity(self.capacity));
        let batch = Batch::new(self.next_seq, events);
        self.next_seq += 1;
        batch
    }
}
