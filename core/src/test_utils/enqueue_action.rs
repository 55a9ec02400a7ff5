//! EnqueueAction — demonstrates the directive cascade: it returns an
//! `Enqueue` directive for `NoSchema` rather than mutating state
//! directly.

use crate::action::{Action, ActionContext, ActionEffect, ActionOutcome};
use crate::directive::Directive;
use crate::id::ActionId;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

/// An action that always cascades into a follow-up `NoSchema`
/// instruction via an `Enqueue` directive.
pub struct EnqueueAction;

#[async_trait]
impl Action for EnqueueAction {
    fn id(&self) -> ActionId {
        ActionId::new("EnqueueAction")
    }

    async fn run(&self, _params: Map<String, Value>, _ctx: ActionContext) -> ActionOutcome {
        let mut params = Map::new();
        params.insert("value".into(), json!(4));
        ActionOutcome::OkWithEffects {
            result: Map::new(),
            effects: vec![ActionEffect::External(Directive::Enqueue {
                action: ActionId::new("NoSchema"),
                params,
                context: Map::new(),
                opts: Default::default(),
            })],
        }
    }
}
