//! # agentrt-core — pure domain model for the agent execution framework
//!
//! This crate defines the protocol boundaries and pure value types that
//! every other `agentrt-*` crate composes:
//!
//! | Concept | Type | What it does |
//! |---------|------|--------------|
//! | Instruction | [`Instruction`] | A planned invocation of a registered action |
//! | Signal | [`Signal`] | A typed event envelope consumed/emitted by agents |
//! | Effect / Directive | [`Effect`], [`Directive`] | State ops vs. externally observable requests |
//! | Agent Value | [`Agent`] | Pure, immutable agent record |
//! | Strategy | [`Strategy`] | Execution policy: instructions → (agent', directives) |
//! | Router | [`Router`] | Signal type → instructions |
//! | Storage | [`Storage`] | Hibernate/thaw checkpoint backend |
//! | Dispatch | [`DispatchAdapter`] | Output side of the signal envelope |
//!
//! ## Design Principle
//!
//! Every trait here is operation-defined, not mechanism-defined. A
//! [`Strategy`] means "turn instructions into a new agent and
//! directives" — not "call an LLM" or "run a subprocess." This is what
//! keeps implementations swappable.
//!
//! ## Dependency Notes
//!
//! This crate depends on `serde_json::Value` for params/context/state.
//! JSON objects are the universal interchange format here: the
//! alternative (generic `T: Serialize`) would complicate trait object
//! safety (`Arc<dyn Action>`, `Arc<dyn Strategy>`, ...) without
//! practical benefit.
//!
//! ## Future: Native Async Traits
//!
//! Protocol traits currently use `async-trait` (heap-allocated futures).
//! When Rust stabilizes `async fn in dyn Trait` with `Send` bounds,
//! these traits will migrate to native async. This will be a breaking
//! change in a minor version bump before v1.0.

#![deny(missing_docs)]

pub mod action;
pub mod agent;
pub mod directive;
pub mod dispatch;
pub mod duration;
pub mod error;
pub mod hooks;
pub mod id;
pub mod instruction;
pub mod merge;
pub mod router;
pub mod schema;
pub mod signal;
pub mod storage;
pub mod strategy;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use action::{Action, ActionContext, ActionEffect, ActionOutcome, ActionRegistry};
pub use agent::{Agent, AgentOpts, CmdResult};
pub use directive::{Directive, Effect, ErrorContext, StateOp};
pub use dispatch::{
    BusAdapter, ConsoleAdapter, DispatchAdapter, LoggerAdapter, NoopAdapter, PidAdapter,
    RecordingAdapter,
};
pub use duration::DurationMs;
pub use error::CoreError;
pub use hooks::{AgentHooks, NoopHooks};
pub use id::{ActionId, AgentId, CorrelationId, SignalId};
pub use instruction::{Instruction, InstructionOpts, InstructionSpec};
pub use router::Router;
pub use schema::{NoSchema, Schema};
pub use signal::{signal_types, DispatchSpec, Signal};
pub use storage::Storage;
pub use strategy::{Strategy, StrategyContext};
