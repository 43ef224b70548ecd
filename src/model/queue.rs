//! Directional message queues
//!
//! One queue exists per direction (master to viewer, viewer to master). The
//! inbound handler of the sending role appends, the dispatcher drains.

use parking_lot::Mutex;

use crate::model::payload::Payload;

/// Unbounded FIFO of pending messages for one direction.
///
/// A single lock covers both the read and the clear of a drain, so a
/// concurrent `enqueue` lands either in the current drain or the next one.
#[derive(Debug, Default)]
pub struct DirectionalQueue {
    pending: Mutex<Vec<Payload>>,
}

impl DirectionalQueue {
    pub fn new() -> DirectionalQueue {
        DirectionalQueue::default()
    }

    /// Append a message to the tail of the queue.
    pub fn enqueue(&self, payload: Payload) {
        self.pending.lock().push(payload);
    }

    /// Remove and return everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<Payload> {
        std::mem::take(&mut *self.pending.lock())
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
