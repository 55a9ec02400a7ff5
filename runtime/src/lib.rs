#![deny(missing_docs)]
//! Runtime: Server State, Signal Queue, Directive Executor, and the
//! Scheduler that drives them.
//!
//! This crate is intentionally boring glue: it assembles the protocol
//! traits declared in `agentrt-core` into a runnable per-agent message
//! loop without forcing a particular transport or process model.
//! Transports, supervision trees, and timer wheels are treated as
//! external collaborators — `ChildSupervisor` and `TimerRegistry` here
//! are bookkeeping, not a process manager.

mod executor;
mod queue;
mod scheduler;
mod state;
mod supervisor;

pub use executor::{DirectiveBatchOutcome, DirectiveExecutor};
pub use queue::{QueueEvent, SignalQueue};
pub use scheduler::{DebugBreak, ProcessedSignal, Scheduler};
pub use state::{Mode, ReplySender, ServerState, Status};
pub use supervisor::{ChildHandle, ChildSupervisor, ScheduleKind, ScheduledJob, TimerRegistry};
