//! Dispatch adapters — the output side of the signal envelope.
//!
//! An adapter is a single-method trait (`dispatch`), composed as an
//! ordered list. Failures in one adapter do not abort the others; the
//! caller (the scheduler) logs them via `tracing` and continues.

use crate::error::CoreError;
use crate::signal::Signal;
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::{broadcast, mpsc};

/// An output adapter through which signals are emitted.
#[async_trait]
pub trait DispatchAdapter: Send + Sync {
    /// Deliver `signal`. Implementations should not panic; return an
    /// error instead so the caller can log and move on to the next
    /// adapter in the list.
    async fn dispatch(&self, signal: &Signal) -> Result<(), CoreError>;
}

/// Writes signals to the process logger via `tracing`, at a level
/// derived from `jido.agent.log.<level>` types (default `info`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerAdapter;

#[async_trait]
impl DispatchAdapter for LoggerAdapter {
    async fn dispatch(&self, signal: &Signal) -> Result<(), CoreError> {
        tracing::info!(signal.id = %signal.id, signal.kind = %signal.kind, "signal dispatched");
        Ok(())
    }
}

/// Writes signals to the process logger at `warn` level. Typically
/// used as the default `err` dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleAdapter;

#[async_trait]
impl DispatchAdapter for ConsoleAdapter {
    async fn dispatch(&self, signal: &Signal) -> Result<(), CoreError> {
        tracing::warn!(signal.id = %signal.id, signal.kind = %signal.kind, data = %signal.data, "signal dispatched to console");
        Ok(())
    }
}

/// Swallows every signal. Useful for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAdapter;

#[async_trait]
impl DispatchAdapter for NoopAdapter {
    async fn dispatch(&self, _signal: &Signal) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Delivers signals to a single target via an `mpsc` channel. Concrete
/// process registries are out of scope; this is the minimal "deliver
/// to a target process reference" primitive.
pub struct PidAdapter {
    sender: mpsc::Sender<Signal>,
}

impl PidAdapter {
    /// Build an adapter that forwards onto `sender`.
    pub fn new(sender: mpsc::Sender<Signal>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl DispatchAdapter for PidAdapter {
    async fn dispatch(&self, signal: &Signal) -> Result<(), CoreError> {
        self.sender
            .send(signal.clone())
            .await
            .map_err(|e| CoreError::Execution(format!("pid dispatch failed: {e}")))
    }
}

/// Publishes signals on a named broadcast stream.
pub struct BusAdapter {
    sender: broadcast::Sender<Signal>,
}

impl BusAdapter {
    /// Build an adapter around a broadcast channel.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<Signal>) {
        let (sender, receiver) = broadcast::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Subscribe another receiver to this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl DispatchAdapter for BusAdapter {
    async fn dispatch(&self, signal: &Signal) -> Result<(), CoreError> {
        // No active subscribers is not an error — matches a `logger`-style
        // adapter that's allowed to have nobody listening.
        let _ = self.sender.send(signal.clone());
        Ok(())
    }
}

/// An in-memory recording adapter for tests: swallows signals but
/// remembers them for inspection.
#[derive(Default)]
pub struct RecordingAdapter {
    recorded: Mutex<Vec<Signal>>,
}

impl RecordingAdapter {
    /// Build an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the signals recorded so far, in dispatch order.
    pub fn recorded(&self) -> Vec<Signal> {
        self.recorded.lock().expect("recorder mutex poisoned").clone()
    }
}

#[async_trait]
impl DispatchAdapter for RecordingAdapter {
    async fn dispatch(&self, signal: &Signal) -> Result<(), CoreError> {
        self.recorded
            .lock()
            .expect("recorder mutex poisoned")
            .push(signal.clone());
        Ok(())
    }
}
