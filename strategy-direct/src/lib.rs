#![deny(missing_docs)]
//! The Direct strategy — sequential, in-process instruction execution.
//!
//! No durability, no concurrency between instructions: a straight
//! loop over the work list that resolves each instruction's action in
//! the registry, applies its effects to `agent.state` in order, and
//! accumulates directives.

use agentrt_core::merge::{deep_merge, delete_path, set_path};
use agentrt_core::{
    Action, ActionContext, ActionEffect, ActionOutcome, Agent, Directive, Effect, Instruction,
    Strategy, StrategyContext,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Sequential execution policy: run instructions one at a time, in
/// declared order, against a single `Agent` value.
///
/// A failing instruction does not halt the batch — it produces an
/// `Error` directive and execution continues with the next
/// instruction. State mutations from a failed instruction are
/// discarded; state mutations from instructions before and after it
/// are kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectStrategy;

impl DirectStrategy {
    /// Build a new Direct strategy. Stateless — any number of these
    /// can be shared across agents.
    pub fn new() -> Self {
        Self
    }
}

fn apply_effect(state: &mut serde_json::Map<String, serde_json::Value>, effect: Effect) {
    match effect {
        Effect::SetState { attrs } => deep_merge(state, attrs),
        Effect::ReplaceState { state: new_state } => *state = new_state,
        Effect::DeleteKeys { keys } => {
            for key in keys {
                state.remove(&key);
            }
        }
        Effect::SetPath { path, value } => set_path(state, &path, value),
        Effect::DeletePath { path } => delete_path(state, &path),
        _ => {}
    }
}

async fn run_one(
    agent: &mut Agent,
    instruction: Instruction,
    action: Arc<dyn Action>,
    directives: &mut Vec<Directive>,
) {
    let action_ctx = ActionContext {
        context: instruction.context,
        state: agent.state.clone(),
        opts: instruction.opts,
    };

    match action.run(instruction.params, action_ctx).await {
        ActionOutcome::Ok { result } => {
            deep_merge(&mut agent.state, result.clone());
            agent.result = Some(result);
        }
        ActionOutcome::OkWithEffects { result, effects } => {
            deep_merge(&mut agent.state, result.clone());
            agent.result = Some(result);
            for effect in effects {
                match effect {
                    ActionEffect::Internal(e) => apply_effect(&mut agent.state, e),
                    ActionEffect::External(d) => directives.push(d),
                }
            }
        }
        ActionOutcome::Err(error) => {
            directives.push(Directive::instruction_error(error));
        }
    }
}

#[async_trait]
impl Strategy for DirectStrategy {
    async fn cmd(
        &self,
        mut agent: Agent,
        instructions: Vec<Instruction>,
        ctx: &StrategyContext<'_>,
    ) -> (Agent, Vec<Directive>) {
        let mut directives = Vec::new();

        for instruction in instructions {
            match ctx.registry.get(&instruction.action) {
                Some(action) => {
                    let action = Arc::clone(action);
                    run_one(&mut agent, instruction, action, &mut directives).await;
                }
                None => {
                    directives.push(Directive::instruction_error(format!(
                        "action {} has no registered implementation",
                        instruction.action
                    )));
                }
            }
        }

        (agent, directives)
    }
}
