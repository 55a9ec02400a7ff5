//! BasicAction — deep-merges its params into the result, doubling any
//! numeric `value` field. Used across the plan/cmd scenario tests.

use crate::action::{Action, ActionContext, ActionOutcome};
use crate::id::ActionId;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// An action implementation that echoes its params back as its result,
/// doubling a numeric `value` key if present.
pub struct BasicAction;

#[async_trait]
impl Action for BasicAction {
    fn id(&self) -> ActionId {
        ActionId::new("BasicAction")
    }

    async fn run(&self, params: Map<String, Value>, _ctx: ActionContext) -> ActionOutcome {
        let mut result = params.clone();
        if let Some(Value::Number(n)) = params.get("value") {
            if let Some(v) = n.as_i64() {
                result.insert("result".into(), Value::from(v * 2));
            }
        }
        ActionOutcome::Ok { result }
    }
}
