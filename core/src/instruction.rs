//! Instructions — immutable, planned invocations of a registered action.

use crate::id::ActionId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-instruction execution options. Every field is optional — `None`
/// means "use the strategy's/action's default."
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstructionOpts {
    /// Caller-supplied id for this instruction (used to correlate
    /// `instruction_result` signals). Generated if absent.
    pub id: Option<String>,

    /// Maximum wall-clock time the action is expected to honor
    /// cooperatively. Not enforced by the runtime itself.
    pub timeout_ms: Option<u64>,

    /// Maximum retry attempts. Not enforced by the runtime itself —
    /// honored cooperatively by the action implementation.
    pub max_retries: Option<u32>,

    /// Relative ordering hint used by the router when multiple rules
    /// tie on declaration order. Does not affect instruction execution
    /// order within a single `cmd` batch, which is always sequential.
    pub priority: Option<i32>,
}

/// An immutable, planned invocation of a registered action.
///
/// Invariant: `params` and `context` are always JSON objects, never
/// arrays or scalars — enforced at construction and by normalization.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    /// Identifier resolving to a registered action implementation.
    pub action: ActionId,
    /// Mapping from keys to values. May be empty.
    pub params: Map<String, Value>,
    /// Execution-scoped data such as caller ids. May be empty.
    pub context: Map<String, Value>,
    /// Per-instruction options.
    pub opts: InstructionOpts,
}

impl Instruction {
    /// Build an instruction with empty params, context, and default opts.
    pub fn new(action: impl Into<ActionId>) -> Self {
        Self {
            action: action.into(),
            params: Map::new(),
            context: Map::new(),
            opts: InstructionOpts::default(),
        }
    }

    /// Attach params to the instruction.
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Attach context to the instruction.
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Attach opts to the instruction.
    pub fn with_opts(mut self, opts: InstructionOpts) -> Self {
        self.opts = opts;
        self
    }
}

/// A caller-facing shorthand for describing one or more instructions to
/// plan. Mirrors the source language's loose "spec" argument: an action
/// identifier by itself, an `(action, params)` pair, or an ordered list
/// of either.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstructionSpec {
    /// A bare action identifier; params default to `{}`.
    Action(ActionId),
    /// An action identifier paired with params.
    WithParams(ActionId, Map<String, Value>),
    /// An ordered list of specs. Nesting beyond one level is rejected
    /// during normalization.
    List(Vec<InstructionSpec>),
}

impl From<ActionId> for InstructionSpec {
    fn from(action: ActionId) -> Self {
        InstructionSpec::Action(action)
    }
}

impl From<&str> for InstructionSpec {
    fn from(action: &str) -> Self {
        InstructionSpec::Action(ActionId::new(action))
    }
}
