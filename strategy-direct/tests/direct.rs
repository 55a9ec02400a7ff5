use agentrt_core::test_utils::{BasicAction, EnqueueAction, FailingAction, NoSchemaAction};
use agentrt_core::{
    Action, ActionRegistry, Agent, AgentOpts, Directive, Instruction, Strategy, StrategyContext,
};
use agentrt_strategy_direct::DirectStrategy;
use serde_json::json;
use std::sync::Arc;

fn registry(actions: Vec<Arc<dyn Action>>) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    for action in actions {
        registry.register(action);
    }
    registry
}

fn agent(actions: &[&str]) -> Agent {
    Agent::new(AgentOpts {
        type_name: "test_agent".into(),
        actions: actions.iter().map(|a| agentrt_core::ActionId::new(*a)).collect(),
        ..Default::default()
    })
}

#[tokio::test]
async fn single_instruction_result_merges_into_state() {
    let agent = agent(&["BasicAction"]);
    let registry = registry(vec![Arc::new(BasicAction)]);
    let ctx = StrategyContext::new(&registry);

    let mut params = serde_json::Map::new();
    params.insert("value".into(), json!(21));
    let instructions = vec![Instruction::new(agentrt_core::ActionId::new("BasicAction"))
        .with_params(params)];

    let (agent, directives) = DirectStrategy::new().cmd(agent, instructions, &ctx).await;
    assert!(directives.is_empty());
    assert_eq!(agent.state.get("result").unwrap(), &json!(42));
}

// Scenario C — directive cascade from one action to the next.
#[tokio::test]
async fn ok_with_effects_forwards_external_directives() {
    let agent = agent(&["EnqueueAction", "NoSchema"]);
    let registry = registry(vec![Arc::new(EnqueueAction), Arc::new(NoSchemaAction)]);
    let ctx = StrategyContext::new(&registry);

    let instructions = vec![Instruction::new(agentrt_core::ActionId::new("EnqueueAction"))];
    let (agent, directives) = DirectStrategy::new().cmd(agent, instructions, &ctx).await;

    assert_eq!(directives.len(), 1);
    match &directives[0] {
        Directive::Enqueue { action, params, .. } => {
            assert_eq!(action, &agentrt_core::ActionId::new("NoSchema"));
            assert_eq!(params.get("value").unwrap(), &json!(4));
        }
        other => panic!("expected Enqueue directive, got {other:?}"),
    }
    assert!(agent.result.unwrap().is_empty());
}

#[tokio::test]
async fn failing_instruction_does_not_halt_the_batch() {
    let agent = agent(&["FailingAction", "BasicAction"]);
    let registry = registry(vec![Arc::new(FailingAction), Arc::new(BasicAction)]);
    let ctx = StrategyContext::new(&registry);

    let mut params = serde_json::Map::new();
    params.insert("value".into(), json!(5));
    let instructions = vec![
        Instruction::new(agentrt_core::ActionId::new("FailingAction")),
        Instruction::new(agentrt_core::ActionId::new("BasicAction")).with_params(params),
    ];

    let (agent, directives) = DirectStrategy::new().cmd(agent, instructions, &ctx).await;
    assert_eq!(directives.len(), 1);
    match &directives[0] {
        Directive::Error { error, .. } => assert_eq!(error, "always fails"),
        other => panic!("expected Error directive, got {other:?}"),
    }
    assert_eq!(agent.state.get("result").unwrap(), &json!(10));
}

#[tokio::test]
async fn unregistered_action_emits_error_directive() {
    let agent = agent(&["BasicAction"]);
    let registry = registry(vec![]);
    let ctx = StrategyContext::new(&registry);

    let instructions = vec![Instruction::new(agentrt_core::ActionId::new("BasicAction"))];
    let (_, directives) = DirectStrategy::new().cmd(agent, instructions, &ctx).await;

    assert_eq!(directives.len(), 1);
    assert!(matches!(directives[0], Directive::Error { .. }));
}

#[tokio::test]
async fn empty_instruction_list_is_a_no_op() {
    let agent = agent(&[]);
    let registry = registry(vec![]);
    let ctx = StrategyContext::new(&registry);

    let (_, directives) = DirectStrategy::new().cmd(agent, vec![], &ctx).await;
    assert!(directives.is_empty());
}
