//! Signal Queue & Backpressure (C8).
//!
//! A bounded FIFO with an explicit capacity and two named
//! observability events for the two ways it can reject work.

use agentrt_core::{signal_types, CoreError, Signal};
use std::collections::VecDeque;

/// An observability event a queue mutation produces, independent of
/// whether the mutation itself succeeded.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    /// `enqueue` was rejected because the queue was already at capacity.
    Overflow {
        /// Queue length at the time of the rejected enqueue.
        queue_size: usize,
        /// The queue's configured cap.
        max_size: usize,
    },
    /// `clear` discarded `queue_size` queued signals.
    Cleared {
        /// Number of signals discarded.
        queue_size: usize,
    },
}

impl QueueEvent {
    /// Build the wire signal this event publishes as.
    pub fn into_signal(&self) -> Signal {
        match self {
            QueueEvent::Overflow { queue_size, max_size } => Signal::new(
                signal_types::QUEUE_OVERFLOW,
                serde_json::json!({ "queue_size": queue_size, "max_size": max_size }),
            ),
            QueueEvent::Cleared { queue_size } => Signal::new(
                signal_types::QUEUE_CLEARED,
                serde_json::json!({ "queue_size": queue_size }),
            ),
        }
    }
}

/// A bounded FIFO queue of pending [`Signal`]s.
pub struct SignalQueue {
    items: VecDeque<Signal>,
    max_size: usize,
}

impl SignalQueue {
    /// Build an empty queue capped at `max_size`. A cap of `0` rejects
    /// every enqueue.
    pub fn new(max_size: usize) -> Self {
        Self {
            items: VecDeque::new(),
            max_size,
        }
    }

    /// Current number of queued signals.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue holds no signals.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The configured capacity.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Append a signal to the back of the queue.
    pub fn enqueue(&mut self, signal: Signal) -> Result<(), (CoreError, QueueEvent)> {
        if self.items.len() >= self.max_size {
            return Err(self.overflow());
        }
        self.items.push_back(signal);
        Ok(())
    }

    /// Push a signal to the front of the queue, ahead of everything
    /// already pending. Used for directive-cascaded signals so causally
    /// dependent work runs before unrelated traffic.
    pub fn enqueue_front(&mut self, signal: Signal) -> Result<(), (CoreError, QueueEvent)> {
        if self.items.len() >= self.max_size {
            return Err(self.overflow());
        }
        self.items.push_front(signal);
        Ok(())
    }

    fn overflow(&self) -> (CoreError, QueueEvent) {
        let queue_size = self.items.len();
        let max_size = self.max_size;
        (
            CoreError::QueueOverflow {
                queue_size,
                max_size,
            },
            QueueEvent::Overflow {
                queue_size,
                max_size,
            },
        )
    }

    /// Pop the next signal, if any.
    pub fn dequeue(&mut self) -> Option<Signal> {
        self.items.pop_front()
    }

    /// Discard all queued signals, returning a `Cleared` event.
    pub fn clear(&mut self) -> QueueEvent {
        let queue_size = self.items.len();
        self.items.clear();
        QueueEvent::Cleared { queue_size }
    }
}
