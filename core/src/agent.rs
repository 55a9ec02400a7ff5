//! The Agent Value — a pure, immutable domain record.
//!
//! Keep a strict separation between this value and the server that owns
//! it (see `agentrt-runtime::ServerState` / `agentrt-server::AgentServer`):
//! every method here takes `self` by value and returns a new `Agent`. No
//! hidden global state, no interior mutability.

use crate::action::ActionRegistry;
use crate::directive::Directive;
use crate::error::CoreError;
use crate::hooks::{AgentHooks, NoopHooks};
use crate::id::{ActionId, AgentId};
use crate::instruction::{Instruction, InstructionOpts, InstructionSpec};
use crate::merge::deep_merge;
use crate::schema::{NoSchema, Schema};
use crate::strategy::{Strategy, StrategyContext};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Static metadata plus initial wiring for a new [`Agent`].
pub struct AgentOpts {
    /// Stable instance id. Generated if absent.
    pub id: Option<AgentId>,
    /// The agent type's name, e.g. `"order_processor"`. Used by the
    /// type-safety contract: operations declared against type `A`
    /// reject an `Agent` whose `type_name` is not `A`.
    pub type_name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Grouping category.
    pub category: Option<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Agent type version.
    pub vsn: Option<String>,
    /// Caller-provided initial state, merged over schema defaults.
    pub initial_state: Map<String, Value>,
    /// The declared state schema. `None` is treated as [`NoSchema`].
    pub schema: Option<Arc<dyn Schema>>,
    /// Actions registered with the agent at construction.
    pub actions: Vec<ActionId>,
    /// Lifecycle hooks. `None` is treated as [`NoopHooks`].
    pub hooks: Option<Arc<dyn AgentHooks>>,
}

impl Default for AgentOpts {
    fn default() -> Self {
        Self {
            id: None,
            type_name: String::new(),
            description: None,
            category: None,
            tags: Vec::new(),
            vsn: None,
            initial_state: Map::new(),
            schema: None,
            actions: Vec::new(),
            hooks: None,
        }
    }
}

/// The pure domain object: identity, validated state, registered
/// actions, and the instructions planned but not yet executed.
#[derive(Clone)]
pub struct Agent {
    /// Stable instance id.
    pub id: AgentId,
    /// The agent type's name (for the type-safety contract).
    pub type_name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Grouping category.
    pub category: Option<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Agent type version.
    pub vsn: Option<String>,
    /// State validated against the declared schema.
    pub state: Map<String, Value>,
    /// Ordered set of registered action identifiers. Duplicates are
    /// ignored on insertion.
    pub actions: Vec<ActionId>,
    /// Instructions planned but not yet executed by the strategy.
    pub pending_instructions: Vec<Instruction>,
    /// Whether `state` has mutated since the last successful `validate`.
    pub dirty_state: bool,
    /// The last successful run's result, if any.
    pub result: Option<Map<String, Value>>,
    /// The declared schema, retained for later `validate` calls.
    pub(crate) schema: Arc<dyn Schema>,
    /// Lifecycle hooks.
    pub(crate) hooks: Arc<dyn AgentHooks>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("state", &self.state)
            .field("actions", &self.actions)
            .field("pending_instructions", &self.pending_instructions.len())
            .field("dirty_state", &self.dirty_state)
            .finish()
    }
}

fn register_action_id(actions: &mut Vec<ActionId>, action: ActionId) {
    if !actions.contains(&action) {
        actions.push(action);
    }
}

impl Agent {
    /// Populate metadata, apply schema defaults, merge caller-provided
    /// initial state over them.
    pub fn new(opts: AgentOpts) -> Self {
        let schema = opts.schema.unwrap_or_else(|| Arc::new(NoSchema));
        let mut state = schema.defaults();
        deep_merge(&mut state, opts.initial_state);

        let mut actions = Vec::new();
        for action in opts.actions {
            register_action_id(&mut actions, action);
        }

        Self {
            id: opts.id.unwrap_or_else(AgentId::generate),
            type_name: opts.type_name,
            description: opts.description,
            category: opts.category,
            tags: opts.tags,
            vsn: opts.vsn,
            state,
            actions,
            pending_instructions: Vec::new(),
            dirty_state: false,
            result: None,
            schema,
            hooks: opts.hooks.unwrap_or_else(|| Arc::new(NoopHooks)),
        }
    }

    /// Type-safety contract: fail unless this agent's declared type
    /// matches `expected`.
    pub fn ensure_type(&self, expected: &str) -> Result<(), CoreError> {
        if self.type_name != expected {
            return Err(CoreError::Validation(format!(
                "Invalid agent type. Expected {expected}, got {}",
                self.type_name
            )));
        }
        Ok(())
    }

    /// Deep-merge `updates` into `state`; marks `dirty_state`.
    pub fn set(mut self, updates: Map<String, Value>) -> Result<Agent, CoreError> {
        deep_merge(&mut self.state, updates);
        self.dirty_state = true;
        Ok(self)
    }

    /// Run the declared schema over `state`. In strict mode, unknown
    /// top-level keys are dropped rather than rejected.
    pub fn validate(mut self, strict: bool) -> Result<Agent, CoreError> {
        let validated = self.schema.validate(&self.state, strict)?;
        self.state = validated;
        self.dirty_state = false;
        Ok(self)
    }

    /// Register an action id idempotently.
    pub fn register_action(mut self, action: ActionId) -> Agent {
        register_action_id(&mut self.actions, action);
        self
    }

    /// Deregister an action id idempotently.
    pub fn deregister_action(mut self, action: &ActionId) -> Agent {
        self.actions.retain(|a| a != action);
        self
    }

    /// Normalize a spec into instructions without mutating `actions` or
    /// appending to `pending_instructions`. Shared by `plan` and `cmd`.
    ///
    /// `spec == null`-equivalent (an empty `InstructionSpec::List`) is
    /// accepted and yields an empty instruction list.
    pub fn normalize_spec(
        &self,
        spec: InstructionSpec,
        context: Map<String, Value>,
    ) -> Result<Vec<Instruction>, CoreError> {
        let flat = flatten_spec(spec, 0)?;
        let mut instructions = Vec::with_capacity(flat.len());
        for (action, params) in flat {
            if !self.actions.contains(&action) {
                return Err(CoreError::Config(format!(
                    "Action {action} not registered with agent {}",
                    self.id
                )));
            }
            instructions.push(Instruction {
                action,
                params,
                context: context.clone(),
                opts: InstructionOpts::default(),
            });
        }
        Ok(instructions)
    }

    /// Append one or more instructions to `pending_instructions`.
    /// Runs `on_before_plan` exactly once. `dirty_state` is set even
    /// when the resulting instruction list is empty.
    pub async fn plan(
        mut self,
        spec: InstructionSpec,
        context: Option<Map<String, Value>>,
    ) -> Result<Agent, CoreError> {
        let context = context.unwrap_or_default();
        let hooks = Arc::clone(&self.hooks);
        let (mut agent, spec, context) = hooks.on_before_plan(self, spec, context).await?;
        let instructions = agent.normalize_spec(spec, context)?;
        agent.pending_instructions.extend(instructions);
        agent.dirty_state = true;
        self = agent;
        Ok(self)
    }

    /// Normalize `spec` and hand the resulting instructions straight to
    /// `strategy`, rather than queuing them on `pending_instructions`
    /// the way `plan` does. Used for a direct, non-Signal invocation.
    ///
    /// A normalization failure never reaches the caller as a `Result::Err`
    /// here: it is converted into an `Error{context: Normalize}` directive
    /// and the agent is returned unchanged, mirroring how an instruction
    /// failure surfaces as a directive rather than aborting the batch.
    pub async fn cmd(
        self,
        spec: InstructionSpec,
        opts: Map<String, Value>,
        strategy: &dyn Strategy,
        ctx: &StrategyContext<'_>,
    ) -> CmdResult {
        match self.normalize_spec(spec, opts) {
            Ok(instructions) => strategy.cmd(self, instructions, ctx).await,
            Err(e) => (self, vec![Directive::normalize_error(e.to_string())]),
        }
    }
}

/// Flatten an [`InstructionSpec`] into `(action, params)` pairs in
/// order. A `List` nested inside another `List`'s items is rejected —
/// the source allows exactly one level of list nesting.
fn flatten_spec(
    spec: InstructionSpec,
    depth: usize,
) -> Result<Vec<(ActionId, Map<String, Value>)>, CoreError> {
    match spec {
        InstructionSpec::Action(action) => Ok(vec![(action, Map::new())]),
        InstructionSpec::WithParams(action, params) => Ok(vec![(action, params)]),
        InstructionSpec::List(items) => {
            if depth >= 1 {
                return Err(CoreError::Execution("Invalid instruction format".into()));
            }
            let mut out = Vec::new();
            for item in items {
                out.extend(flatten_spec(item, depth + 1)?);
            }
            Ok(out)
        }
    }
}

/// The result of running a `cmd` pipeline: the (possibly updated) agent
/// plus any external directives accumulated along the way.
pub type CmdResult = (Agent, Vec<Directive>);

/// Registry handle bundled with an agent for code that needs to resolve
/// instructions to implementations (the Direct strategy and the
/// scheduler both take this pair rather than a bare `Agent`).
pub struct AgentWithRegistry<'a> {
    /// The agent value.
    pub agent: Agent,
    /// The action registry used to resolve `Instruction::action`.
    pub registry: &'a ActionRegistry,
}
