//! Server State (C7) — mutable runtime state owned exclusively by one
//! agent's single-threaded message loop.
//!
//! A small wiring struct holding protocol implementations (`Arc<dyn
//! Router>`, dispatch adapters) *and* the mutable run state: the
//! queue, status, mode, and pending-reply table that a resident
//! per-agent process needs.

use crate::queue::SignalQueue;
use crate::supervisor::{ChildSupervisor, TimerRegistry};
use agentrt_core::{
    signal_types, Agent, ConsoleAdapter, CorrelationId, CoreError, DispatchAdapter, DispatchSpec,
    LoggerAdapter, NoopAdapter, Router, Signal, SignalId,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Where the server sits in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `mount` has not yet succeeded.
    Initializing,
    /// No signal is being processed.
    Idle,
    /// A `plan` is in progress.
    Planning,
    /// A signal is being processed end-to-end.
    Running,
    /// Processing is suspended pending `resume`.
    Paused,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Initializing => "initializing",
            Status::Idle => "idle",
            Status::Planning => "planning",
            Status::Running => "running",
            Status::Paused => "paused",
        };
        f.write_str(s)
    }
}

/// Scheduler drive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Drain the queue until empty or an execution error occurs.
    Auto,
    /// Process exactly one signal, then return to idle.
    Step,
    /// Process exactly one signal, emit debugger events, and break.
    Debug,
}

fn is_valid_transition(from: Status, to: Status) -> bool {
    use Status::*;
    matches!(
        (from, to),
        (Initializing, Idle)
            | (Idle, Running)
            | (Idle, Planning)
            | (Planning, Running)
            | (Running, Idle)
            | (Running, Paused)
            | (Paused, Running)
    )
}

/// A pending synchronous caller awaiting the result of a signal it
/// enqueued via `call`.
pub type ReplySender = oneshot::Sender<Result<Value, CoreError>>;

/// Mutable per-agent runtime state. Owned exclusively by one server's
/// message loop — nothing outside that loop may mutate it directly.
pub struct ServerState {
    /// The current Agent Value. Functionally replaced on every step.
    pub agent: Agent,
    /// State-machine status.
    pub status: Status,
    /// Scheduler drive mode.
    pub mode: Mode,
    /// Pending signals awaiting processing.
    pub queue: SignalQueue,
    /// Ordered output adapters signals are published through.
    pub dispatch: Vec<Arc<dyn DispatchAdapter>>,
    /// Compiled routing table.
    pub router: Arc<dyn Router>,
    /// Handle to the dynamic supervisor owning this agent's children.
    pub child_supervisor: ChildSupervisor,
    /// Registered `Schedule`/`Cron` jobs.
    pub timers: TimerRegistry,
    /// Callers awaiting a synchronous reply, keyed by the signal id
    /// they enqueued.
    pub reply_refs: HashMap<SignalId, ReplySender>,
    /// The signal currently being processed, if any.
    pub current_signal: Option<Signal>,
    /// Correlation id in effect for the duration of the current signal.
    pub current_correlation_id: Option<CorrelationId>,
    /// Causation id in effect for the duration of the current signal.
    pub current_causation_id: Option<CorrelationId>,
    /// Floor for emitted log signals, e.g. `"info"`.
    pub log_level: String,
    /// Verbose observability toggle.
    pub verbose: bool,
}

impl ServerState {
    /// Build a freshly initializing server state.
    pub fn new(
        agent: Agent,
        router: Arc<dyn Router>,
        dispatch: Vec<Arc<dyn DispatchAdapter>>,
        max_queue_size: usize,
    ) -> Self {
        Self {
            agent,
            status: Status::Initializing,
            mode: Mode::Auto,
            queue: SignalQueue::new(max_queue_size),
            dispatch,
            router,
            child_supervisor: ChildSupervisor::new(),
            timers: TimerRegistry::new(),
            reply_refs: HashMap::new(),
            current_signal: None,
            current_correlation_id: None,
            current_causation_id: None,
            log_level: "info".into(),
            verbose: false,
        }
    }

    /// Attempt a state-machine transition. Leaves `status` unchanged on
    /// failure. Publishes `transition.succeeded` or `transition.failed`
    /// with `{from, to}` data either way.
    pub async fn transition(&mut self, to: Status) -> Result<(), CoreError> {
        let from = self.status;
        if is_valid_transition(from, to) {
            self.status = to;
            let signal = Signal::new(
                signal_types::TRANSITION_SUCCEEDED,
                serde_json::json!({ "from": from.to_string(), "to": to.to_string() }),
            );
            self.publish(&signal).await;
            Ok(())
        } else {
            let signal = Signal::new(
                signal_types::TRANSITION_FAILED,
                serde_json::json!({ "from": from.to_string(), "to": to.to_string() }),
            );
            self.publish(&signal).await;
            Err(CoreError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Publish a signal. A `dispatch` override on the signal routes it
    /// through a single matching adapter instead of the server's full
    /// configured list. Failures in one adapter do not prevent others
    /// from running.
    pub async fn publish(&self, signal: &Signal) {
        match &signal.dispatch {
            Some(spec) => {
                let _ = one_shot_adapter(spec).dispatch(signal).await;
            }
            None => {
                for adapter in &self.dispatch {
                    let _ = adapter.dispatch(signal).await;
                }
            }
        }
    }

    /// Register a reply sender for a signal id, fulfilled when its
    /// matching `signal_result` is produced.
    pub fn register_reply(&mut self, id: SignalId, sender: ReplySender) {
        self.reply_refs.insert(id, sender);
    }

    /// Remove and return a pending reply sender, if one is registered.
    pub fn take_reply(&mut self, id: &SignalId) -> Option<ReplySender> {
        self.reply_refs.remove(id)
    }
}

/// Resolve a per-signal dispatch override to a concrete adapter.
/// `Pid`/`Bus` targets require a live registry this struct doesn't own
/// (a process table, a named stream table), so they fall back to a
/// no-op with a warning rather than silently picking an arbitrary
/// configured adapter.
fn one_shot_adapter(spec: &DispatchSpec) -> Arc<dyn DispatchAdapter> {
    match spec {
        DispatchSpec::Logger => Arc::new(LoggerAdapter),
        DispatchSpec::Console => Arc::new(ConsoleAdapter),
        DispatchSpec::Noop => Arc::new(NoopAdapter),
        DispatchSpec::Pid { target } => {
            tracing::warn!(target, "pid dispatch override has no resolvable registry here");
            Arc::new(NoopAdapter)
        }
        DispatchSpec::Bus { stream } => {
            tracing::warn!(stream, "bus dispatch override has no resolvable registry here");
            Arc::new(NoopAdapter)
        }
        // `DispatchSpec` is `#[non_exhaustive]`; an unrecognized future
        // variant still gets logged rather than silently dropped.
        _ => Arc::new(LoggerAdapter),
    }
}
