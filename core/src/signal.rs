//! Signals — typed event envelopes consumed and emitted by agents.

use crate::id::{CorrelationId, SignalId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a signal should be delivered once emitted. Concrete transports
/// (HTTP, a message bus, a process registry) are out of scope for this
/// crate; adapters only need to agree on this wire-neutral shape.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchSpec {
    /// Format and write through the process logger.
    Logger,
    /// Deliver to a target process reference (opaque string handle).
    Pid {
        /// The target's opaque handle.
        target: String,
    },
    /// Publish on a named stream.
    Bus {
        /// The stream name.
        stream: String,
    },
    /// Swallow the signal. Useful for tests.
    Noop,
    /// Write to stderr/console, typically used for the error dispatch.
    Console,
}

/// A typed event envelope. Created externally; immutable once built.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Unique identifier, assigned on creation if not supplied.
    pub id: SignalId,
    /// Dotted type string, e.g. `jido.agent.event.queue.overflow`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional origin identifier.
    pub source: Option<String>,
    /// Arbitrary payload.
    #[serde(default)]
    pub data: Value,
    /// Trace id carried across hops; overrides the server's prior value
    /// if present when a signal enters processing.
    pub correlation_id: Option<CorrelationId>,
    /// Id of the signal that caused this one to be emitted.
    pub causation_id: Option<CorrelationId>,
    /// Override for output routing. `None` uses the server's configured
    /// dispatch list.
    pub dispatch: Option<DispatchSpec>,
}

impl Signal {
    /// Build a signal with a generated id and no trace/dispatch overrides.
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            id: SignalId::generate(),
            kind: kind.into(),
            source: None,
            data,
            correlation_id: None,
            causation_id: None,
            dispatch: None,
        }
    }

    /// Set the origin identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the correlation id.
    pub fn with_correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Set the causation id.
    pub fn with_causation_id(mut self, id: CorrelationId) -> Self {
        self.causation_id = Some(id);
        self
    }

    /// Set a dispatch override.
    pub fn with_dispatch(mut self, dispatch: DispatchSpec) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Build a signal that inherits the correlation id of its cause,
    /// and is causally linked to it via a fresh causation id.
    pub fn caused_by(kind: impl Into<String>, data: Value, cause: &Signal) -> Self {
        let mut s = Self::new(kind, data);
        s.correlation_id = cause.correlation_id.clone();
        s.causation_id = Some(CorrelationId::new(cause.id.as_str().to_owned()));
        s
    }
}

/// The exact dotted identifiers this crate emits. Implementers MUST use
/// these strings for compatibility — they are part of the wire contract,
/// not an implementation detail.
pub mod signal_types {
    /// A valid state-machine move completed.
    pub const TRANSITION_SUCCEEDED: &str = "jido.agent.event.transition.succeeded";
    /// An illegal state-machine move was rejected.
    pub const TRANSITION_FAILED: &str = "jido.agent.event.transition.failed";
    /// The signal queue rejected an enqueue at capacity.
    pub const QUEUE_OVERFLOW: &str = "jido.agent.event.queue.overflow";
    /// The signal queue was cleared.
    pub const QUEUE_CLEARED: &str = "jido.agent.event.queue.cleared";
    /// `plan` failed.
    pub const PLAN_FAILED: &str = "jido.agent.event.plan.failed";
    /// Result of a single instruction within a `cmd` batch.
    pub const INSTRUCTION_RESULT: &str = "jido.agent.out.instruction_result";
    /// Result of a whole signal's processing.
    pub const SIGNAL_RESULT: &str = "jido.agent.out.signal_result";
    /// A non-fatal runtime error.
    pub const ERROR: &str = "jido.agent.error";
    /// A supervised child was spawned.
    pub const PROCESS_STARTED: &str = "jido.agent.event.process.started";
    /// A supervised child was terminated.
    pub const PROCESS_TERMINATED: &str = "jido.agent.event.process.terminated";
    /// Emitted just before a debug-mode signal is processed.
    pub const DEBUGGER_PRE_SIGNAL: &str = "jido.agent.event.debugger.pre.signal";
    /// Emitted just after a debug-mode signal is processed.
    pub const DEBUGGER_POST_SIGNAL: &str = "jido.agent.event.debugger.post.signal";
    /// Internal-only kind: wraps an `Enqueue` directive's instruction.
    /// Recognized by the scheduler and executed directly, bypassing the
    /// router — this signal's `data` already names the exact action to
    /// run, so routing it by type a second time would be redundant.
    pub const DIRECT_INSTRUCTION: &str = "jido.agent.internal.direct_instruction";

    /// Build a `jido.agent.log.<level>` type string.
    pub fn log(level: &str) -> String {
        format!("jido.agent.log.{level}")
    }
}
