//! NoSchemaAction — an action with no declared result shape, used to
//! exercise agents whose schema is empty.

use crate::action::{Action, ActionContext, ActionOutcome};
use crate::id::ActionId;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// An action that returns `{result: value * 1.5}` when `value` is a
/// number, and an empty result otherwise.
pub struct NoSchemaAction;

#[async_trait]
impl Action for NoSchemaAction {
    fn id(&self) -> ActionId {
        ActionId::new("NoSchema")
    }

    async fn run(&self, params: Map<String, Value>, _ctx: ActionContext) -> ActionOutcome {
        let mut result = Map::new();
        if let Some(Value::Number(n)) = params.get("value") {
            if let Some(v) = n.as_f64() {
                result.insert("result".into(), Value::from(v * 1.5));
            }
        }
        ActionOutcome::Ok { result }
    }
}
