//! Actions — named units of work a Strategy invokes per instruction.

use crate::directive::{Directive, Effect};
use crate::id::ActionId;
use crate::instruction::InstructionOpts;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Context passed to an action alongside its params: the owning agent's
/// current state, the instruction's execution-scoped context, and its
/// opts. Mirrors the source's `context ∪ {state: agent.state, ...opts}`.
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    /// Execution-scoped data from the instruction (e.g. caller ids).
    pub context: Map<String, Value>,
    /// The owning agent's state at the time of invocation.
    pub state: Map<String, Value>,
    /// The instruction's opts.
    pub opts: InstructionOpts,
}

/// A side-effect produced alongside a successful action result: either
/// an internal [`Effect`] (state-only) or an external [`Directive`].
#[derive(Debug, Clone)]
pub enum ActionEffect {
    /// A state-only mutation.
    Internal(Effect),
    /// An externally observable directive.
    External(Directive),
}

/// Outcome of running an action.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// Succeeded with a result to deep-merge into agent state.
    Ok {
        /// The result mapping, merged into `agent.state`.
        result: Map<String, Value>,
    },
    /// Succeeded with a result and declared effects/directives.
    OkWithEffects {
        /// The result mapping, merged into `agent.state`.
        result: Map<String, Value>,
        /// Effects and directives, applied/forwarded in declared order.
        effects: Vec<ActionEffect>,
    },
    /// Failed. Agent state is not modified for this instruction.
    Err(String),
}

/// A named unit of work: `run(params, context) -> {ok, result} | {ok,
/// result, effects} | {error, e}`.
#[async_trait]
pub trait Action: Send + Sync {
    /// The identifier this action is registered under.
    fn id(&self) -> ActionId;

    /// Execute the action.
    async fn run(&self, params: Map<String, Value>, ctx: ActionContext) -> ActionOutcome;
}

/// An injected lookup from action identifier to implementation. Never
/// resolves identifiers through reflection — always an explicit table.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<ActionId, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action implementation, keyed by its own id.
    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.id(), action);
    }

    /// Look up an action implementation by id.
    pub fn get(&self, id: &ActionId) -> Option<&Arc<dyn Action>> {
        self.actions.get(id)
    }

    /// Whether an action id has a registered implementation.
    pub fn contains(&self, id: &ActionId) -> bool {
        self.actions.contains_key(id)
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
