//! Agent lifecycle hooks.
//!
//! Each hook is optional and defaults to identity, so an agent type
//! that doesn't care about lifecycle can ignore this trait entirely.

use crate::agent::Agent;
use crate::directive::Directive;
use crate::error::CoreError;
use crate::instruction::InstructionSpec;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Lifecycle hooks an agent type may implement. Every method has a
/// default (identity) implementation.
#[async_trait]
pub trait AgentHooks: Send + Sync {
    /// Runs exactly once per `plan` call, before the spec is normalized.
    async fn on_before_plan(
        &self,
        agent: Agent,
        spec: InstructionSpec,
        context: Map<String, Value>,
    ) -> Result<(Agent, InstructionSpec, Map<String, Value>), CoreError> {
        Ok((agent, spec, context))
    }

    /// Runs after a `cmd` batch completes, before the result is returned
    /// to the caller. May append additional directives.
    async fn on_after_cmd(
        &self,
        agent: Agent,
        directives: Vec<Directive>,
    ) -> (Agent, Vec<Directive>) {
        (agent, directives)
    }

    /// Runs once when the owning server starts. Failure aborts `start`
    /// with `mount_failed`.
    async fn mount(&self, agent: Agent) -> Result<Agent, CoreError> {
        Ok(agent)
    }

    /// Runs on termination, even if state is corrupted. Failure is
    /// logged but never blocks termination.
    async fn shutdown(&self, _agent: &Agent) {}
}

/// The default hook set: every method is identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl AgentHooks for NoopHooks {}
