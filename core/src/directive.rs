//! Directives and Effects — the tagged-union vocabulary actions emit.
//!
//! Two families, each a `#[serde(tag = "type")]` sum type rather than
//! a shared base class:
//!
//! - [`Effect`] — internal, applied to the owning agent's `state` only,
//!   never observable outside the `cmd` pipeline that produced it.
//! - [`Directive`] — external, handed to the Directive Executor and
//!   potentially observable (spawns a process, emits a signal, ...).

use crate::duration::DurationMs;
use crate::id::ActionId;
use crate::instruction::InstructionOpts;
use crate::signal::Signal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A state mutation requested by an action. Applied in declared order,
/// strictly before any [`Directive`] in the same batch is handed off.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Deep-merge `attrs` into `state`.
    SetState {
        /// Attributes to merge.
        attrs: Map<String, Value>,
    },
    /// Overwrite `state` wholesale.
    ReplaceState {
        /// The new state.
        state: Map<String, Value>,
    },
    /// Remove top-level keys.
    DeleteKeys {
        /// Keys to remove.
        keys: Vec<String>,
    },
    /// Set a nested value at a path (list of keys).
    SetPath {
        /// Path to the value.
        path: Vec<String>,
        /// Value to set.
        value: Value,
    },
    /// Remove a nested value at a path.
    DeletePath {
        /// Path to remove.
        path: Vec<String>,
    },
}

/// The operation requested by a [`Directive::StateModification`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StateOp {
    /// Set the value at `path`.
    Set,
    /// Apply an update (merge) at `path`.
    Update,
    /// Delete the key at `path`.
    Delete,
    /// Reset the value at `path` to `null`.
    Reset,
}

/// Where an [`Directive::Error`] originated, for downstream triage.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorContext {
    /// Raised while executing a single instruction.
    Instruction,
    /// Raised while normalizing a `plan`/`cmd` spec into instructions.
    Normalize,
    /// Any other origin, named by the emitter.
    Custom(String),
}

/// An externally observable effect requested by an action. Handed to the
/// Directive Executor in declared order; the first error in a batch
/// halts processing of the remaining directives in that batch.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    /// Publish a signal to the dispatch layer.
    Emit {
        /// The signal to publish.
        signal: Box<Signal>,
    },
    /// Post a message to self after a delay.
    Schedule {
        /// Delay before delivery.
        delay_ms: DurationMs,
        /// The message payload to redeliver.
        message: Value,
    },
    /// Register a repeating time-based schedule.
    Cron {
        /// A cron expression.
        expression: String,
        /// The message payload to redeliver on each tick.
        message: Value,
        /// Caller-supplied id for the job; generated if absent.
        job_id: Option<String>,
        /// IANA timezone name; defaults to UTC.
        timezone: Option<String>,
    },
    /// Add a supervised child process under the agent.
    Spawn {
        /// The child's module/implementation identifier.
        module: String,
        /// Arguments passed to the child on start.
        args: Value,
    },
    /// Terminate a supervised child.
    Kill {
        /// The child's process handle.
        pid: String,
    },
    /// Register an action identifier with the agent.
    RegisterAction {
        /// The action to register. Idempotent.
        action: ActionId,
    },
    /// Deregister an action identifier from the agent.
    DeregisterAction {
        /// The action to deregister. Idempotent.
        action: ActionId,
    },
    /// Push a new instruction onto the agent's pending queue (and, when
    /// handled by the Directive Executor, the front of the server's
    /// signal queue).
    Enqueue {
        /// Action to invoke. Must not be empty.
        action: ActionId,
        /// Params for the new instruction.
        #[serde(default)]
        params: Map<String, Value>,
        /// Context for the new instruction.
        #[serde(default)]
        context: Map<String, Value>,
        /// Opts for the new instruction.
        #[serde(default)]
        opts: InstructionOpts,
    },
    /// An externally requested state operation.
    StateModification {
        /// The operation to apply.
        op: StateOp,
        /// Path to the target value.
        path: Vec<String>,
        /// Value for `set`/`update`; ignored for `delete`/`reset`.
        value: Option<Value>,
    },
    /// Request graceful server shutdown.
    Stop {
        /// Human-readable reason, surfaced in shutdown logs.
        reason: Option<String>,
    },
    /// Signal a non-fatal failure.
    Error {
        /// Where the error originated.
        context: ErrorContext,
        /// The error message.
        error: String,
    },
}

impl Directive {
    /// Build an `Error` directive for an instruction-level failure.
    pub fn instruction_error(error: impl Into<String>) -> Self {
        Directive::Error {
            context: ErrorContext::Instruction,
            error: error.into(),
        }
    }

    /// Build an `Error` directive for a normalization failure.
    pub fn normalize_error(error: impl Into<String>) -> Self {
        Directive::Error {
            context: ErrorContext::Normalize,
            error: error.into(),
        }
    }
}
