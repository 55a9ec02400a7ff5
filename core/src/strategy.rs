//! Protocol — The Strategy
//!
//! A pluggable execution policy that turns a list of instructions into
//! `(new_agent, directives)`: one object-safe trait, swappable
//! implementations, no mechanism assumed.

use crate::action::ActionRegistry;
use crate::agent::Agent;
use crate::directive::Directive;
use crate::instruction::Instruction;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Context passed to every `Strategy` method. Carries the action
/// registry the strategy resolves instructions against, plus opaque
/// metadata passed through unchanged.
pub struct StrategyContext<'a> {
    /// Registered action implementations.
    pub registry: &'a ActionRegistry,
    /// Opaque metadata (tracing ids, routing hints, ...).
    pub metadata: Map<String, Value>,
}

impl<'a> StrategyContext<'a> {
    /// Build a context with no metadata.
    pub fn new(registry: &'a ActionRegistry) -> Self {
        Self {
            registry,
            metadata: Map::new(),
        }
    }
}

/// A pluggable execution policy. Implementations are free to reorder,
/// short-circuit, or batch instructions, but must uphold the
/// "at-most-once state mutation per successful instruction" rule.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Invoked once on server start.
    async fn init(&self, agent: Agent, ctx: &StrategyContext<'_>) -> (Agent, Vec<Directive>) {
        let _ = ctx;
        (agent, Vec::new())
    }

    /// Invoked on scheduler ticks. May be a no-op.
    async fn tick(&self, agent: Agent, ctx: &StrategyContext<'_>) -> (Agent, Vec<Directive>) {
        let _ = ctx;
        (agent, Vec::new())
    }

    /// The execution policy: run `instructions` against `agent`,
    /// returning the updated agent and any external directives.
    async fn cmd(
        &self,
        agent: Agent,
        instructions: Vec<Instruction>,
        ctx: &StrategyContext<'_>,
    ) -> (Agent, Vec<Directive>);
}
