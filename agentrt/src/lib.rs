#![deny(missing_docs)]
//! # agentrt — umbrella crate
//!
//! Provides a single import surface for the agent execution framework.
//! Re-exports the protocol crate and its implementations behind feature
//! flags, plus a `prelude` for the happy path.

#[cfg(feature = "core")]
pub use agentrt_core;
#[cfg(feature = "manager")]
pub use agentrt_manager;
#[cfg(feature = "router")]
pub use agentrt_router;
#[cfg(feature = "runtime")]
pub use agentrt_runtime;
#[cfg(feature = "server")]
pub use agentrt_server;
#[cfg(feature = "storage-memory")]
pub use agentrt_storage_memory;
#[cfg(feature = "strategy-direct")]
pub use agentrt_strategy_direct;

/// Happy-path imports for composing agent systems.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use agentrt_core::{
        Action, ActionContext, ActionEffect, ActionOutcome, ActionId, ActionRegistry, Agent,
        AgentId, AgentOpts, CoreError, Directive, Effect, Instruction, InstructionSpec, Router,
        Signal, SignalId, Storage, Strategy, StrategyContext,
    };

    #[cfg(feature = "router")]
    pub use agentrt_router::{Rule, RuleTarget, RoutingTable};

    #[cfg(feature = "runtime")]
    pub use agentrt_runtime::{
        DirectiveExecutor, Mode, Scheduler, ServerState, SignalQueue, Status,
    };

    #[cfg(feature = "server")]
    pub use agentrt_server::{AgentServer, ServerError, ServerOpts, ServerSnapshot};

    #[cfg(feature = "manager")]
    pub use agentrt_manager::{InstanceManager, ManagerError, ManagerStats, ServerFactory};

    #[cfg(feature = "storage-memory")]
    pub use agentrt_storage_memory::MemoryStorage;

    #[cfg(feature = "strategy-direct")]
    pub use agentrt_strategy_direct::DirectStrategy;
}
