//! FailingAction — always fails, used to exercise instruction-level
//! error recovery (state untouched, subsequent instructions still run).

use crate::action::{Action, ActionContext, ActionOutcome};
use crate::id::ActionId;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// An action that always fails with a fixed message.
pub struct FailingAction;

#[async_trait]
impl Action for FailingAction {
    fn id(&self) -> ActionId {
        ActionId::new("FailingAction")
    }

    async fn run(&self, _params: Map<String, Value>, _ctx: ActionContext) -> ActionOutcome {
        ActionOutcome::Err("always fails".into())
    }
}
