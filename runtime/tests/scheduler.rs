use agentrt_core::test_utils::{BasicAction, EnqueueAction, FailingAction, NoSchemaAction};
use agentrt_core::{
    Agent, AgentOpts, ActionId, ActionRegistry, CoreError, DispatchSpec, NoopAdapter,
    RecordingAdapter, Signal,
};
use agentrt_router::{Rule, RuleTarget, RoutingTable};
use agentrt_runtime::{Mode, Scheduler, ServerState, Status};
use agentrt_strategy_direct::DirectStrategy;
use serde_json::json;
use std::sync::Arc;

fn registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register(Arc::new(BasicAction));
    registry.register(Arc::new(EnqueueAction));
    registry.register(Arc::new(FailingAction));
    registry.register(Arc::new(NoSchemaAction));
    registry
}

fn routes() -> RoutingTable {
    let mut table = RoutingTable::new();
    table.add(Rule::new(
        "basic.run",
        RuleTarget::One(agentrt_core::Instruction::new(ActionId::new("BasicAction"))),
    ));
    table.add(Rule::new(
        "enqueue.run",
        RuleTarget::One(agentrt_core::Instruction::new(ActionId::new(
            "EnqueueAction",
        ))),
    ));
    table.add(Rule::new(
        "failing.run",
        RuleTarget::Many(vec![
            agentrt_core::Instruction::new(ActionId::new("FailingAction")),
            agentrt_core::Instruction::new(ActionId::new("BasicAction"))
                .with_params(serde_json::json!({ "value": 2 }).as_object().unwrap().clone()),
        ]),
    ));
    table
}

fn agent() -> Agent {
    Agent::new(AgentOpts {
        type_name: "tester".into(),
        actions: vec![
            ActionId::new("BasicAction"),
            ActionId::new("EnqueueAction"),
            ActionId::new("FailingAction"),
            ActionId::new("NoSchema"),
        ],
        ..Default::default()
    })
}

fn state(max_queue_size: usize) -> (ServerState, Arc<RecordingAdapter>) {
    let recorder = Arc::new(RecordingAdapter::new());
    let state = ServerState::new(
        agent(),
        Arc::new(routes()),
        vec![recorder.clone(), Arc::new(NoopAdapter)],
        max_queue_size,
    );
    (state, recorder)
}

#[tokio::test]
async fn process_one_routes_and_merges_result() {
    let (mut state, recorder) = state(10);
    state
        .queue
        .enqueue(Signal::new("basic.run", json!({ "value": 3 })))
        .unwrap();

    let scheduler = Scheduler::new(Arc::new(DirectStrategy::new()), registry());
    let processed = scheduler.process_one(&mut state).await.unwrap().unwrap();

    assert_eq!(state.status, Status::Idle);
    assert_eq!(
        processed.result.unwrap()["result"],
        json!(6)
    );
    let recorded = recorder.recorded();
    let kinds: Vec<&str> = recorded
        .iter()
        .map(|s| s.kind.as_str())
        .collect();
    assert!(kinds.contains(&"jido.agent.out.instruction_result"));
    assert!(kinds.contains(&"jido.agent.out.signal_result"));
}

#[tokio::test]
async fn directive_cascade_runs_before_other_queued_signals() {
    let (mut state, _recorder) = state(10);
    state
        .queue
        .enqueue(Signal::new("enqueue.run", json!({})))
        .unwrap();
    state
        .queue
        .enqueue(Signal::new("basic.run", json!({ "value": 1 })))
        .unwrap();

    let scheduler = Scheduler::new(Arc::new(DirectStrategy::new()), registry());

    // First tick processes `enqueue.run`, which cascades a direct
    // instruction to the front of the queue ahead of `basic.run`.
    let first = scheduler.process_one(&mut state).await.unwrap().unwrap();
    assert_eq!(first.signal.kind, "enqueue.run");
    assert_eq!(state.queue.len(), 2);

    let second = scheduler.process_one(&mut state).await.unwrap().unwrap();
    assert_eq!(second.signal.kind, agentrt_core::signal_types::DIRECT_INSTRUCTION);
    assert_eq!(second.result.unwrap()["result"], json!(6.0));
    assert_eq!(state.queue.len(), 1);

    let third = scheduler.process_one(&mut state).await.unwrap().unwrap();
    assert_eq!(third.signal.kind, "basic.run");
}

#[tokio::test]
async fn failing_instruction_does_not_halt_its_batch() {
    let (mut state, _recorder) = state(10);
    state
        .queue
        .enqueue(Signal::new("failing.run", json!({ "value": 2 })))
        .unwrap();

    let scheduler = Scheduler::new(Arc::new(DirectStrategy::new()), registry());
    let processed = scheduler.process_one(&mut state).await.unwrap().unwrap();

    // FailingAction contributes nothing; BasicAction still runs and its
    // result is what's merged.
    assert_eq!(processed.result.unwrap()["result"], json!(4));
}

#[tokio::test]
async fn invalid_transition_surfaces_as_an_error() {
    let (mut state, _recorder) = state(10);
    // Force the server out of its normal initializing->idle path into
    // a state with no legal route to `Running`.
    state.transition(Status::Idle).await.unwrap();
    state.transition(Status::Running).await.unwrap();
    state.transition(Status::Paused).await.unwrap();

    let err = state.transition(Status::Idle).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_transition");
}

#[tokio::test]
async fn invalid_transition_publishes_a_failed_signal_with_from_and_to() {
    let (mut state, recorder) = state(10);
    state.transition(Status::Idle).await.unwrap();
    state.transition(Status::Running).await.unwrap();
    state.transition(Status::Paused).await.unwrap();

    state.transition(Status::Idle).await.unwrap_err();

    let failed = recorder
        .recorded()
        .into_iter()
        .find(|s| s.kind == agentrt_core::signal_types::TRANSITION_FAILED)
        .expect("transition.failed should be published");
    assert_eq!(failed.data["from"], json!("paused"));
    assert_eq!(failed.data["to"], json!("idle"));
}

#[tokio::test]
async fn valid_transition_publishes_a_succeeded_signal() {
    let (mut state, recorder) = state(10);
    state.transition(Status::Idle).await.unwrap();

    let succeeded = recorder
        .recorded()
        .into_iter()
        .find(|s| s.kind == agentrt_core::signal_types::TRANSITION_SUCCEEDED)
        .expect("transition.succeeded should be published");
    assert_eq!(succeeded.data["from"], json!("initializing"));
    assert_eq!(succeeded.data["to"], json!("idle"));
}

#[tokio::test]
async fn routing_error_discards_the_signal_and_advances() {
    let (mut state, recorder) = state(10);
    state
        .queue
        .enqueue(Signal::new("unrouted.kind", json!({})))
        .unwrap();
    state
        .queue
        .enqueue(Signal::new("basic.run", json!({ "value": 5 })))
        .unwrap();

    let scheduler = Scheduler::new(Arc::new(DirectStrategy::new()), registry());
    let first = scheduler.process_one(&mut state).await;
    assert!(matches!(first, Err(CoreError::Routing(_))));
    assert_eq!(state.status, Status::Idle);
    assert_eq!(state.queue.len(), 1);
    assert!(recorder
        .recorded()
        .iter()
        .any(|s| s.kind == agentrt_core::signal_types::ERROR));

    let second = scheduler.process_one(&mut state).await.unwrap().unwrap();
    assert_eq!(second.signal.kind, "basic.run");
}

#[tokio::test]
async fn queue_overflow_is_rejected_without_mutating_state() {
    let (mut state, _recorder) = state(1);
    state
        .queue
        .enqueue(Signal::new("basic.run", json!({})))
        .unwrap();

    let err = state
        .queue
        .enqueue(Signal::new("basic.run", json!({})))
        .unwrap_err()
        .0;
    assert_eq!(err.kind(), "queue_overflow");
    assert_eq!(state.queue.len(), 1);
}

#[tokio::test]
async fn zero_capacity_queue_rejects_every_enqueue() {
    let (mut state, _recorder) = state(0);
    let err = state
        .queue
        .enqueue(Signal::new("basic.run", json!({})))
        .unwrap_err()
        .0;
    assert_eq!(err.kind(), "queue_overflow");
}

#[tokio::test]
async fn step_mode_processes_exactly_one_signal() {
    let (mut state, _recorder) = state(10);
    state.mode = Mode::Step;
    state
        .queue
        .enqueue(Signal::new("basic.run", json!({ "value": 1 })))
        .unwrap();
    state
        .queue
        .enqueue(Signal::new("basic.run", json!({ "value": 2 })))
        .unwrap();

    let scheduler = Scheduler::new(Arc::new(DirectStrategy::new()), registry());
    scheduler.tick(&mut state).await.unwrap();

    assert_eq!(state.queue.len(), 1);
}

#[tokio::test]
async fn auto_mode_drains_the_queue() {
    let (mut state, _recorder) = state(10);
    state
        .queue
        .enqueue(Signal::new("basic.run", json!({ "value": 1 })))
        .unwrap();
    state
        .queue
        .enqueue(Signal::new("basic.run", json!({ "value": 2 })))
        .unwrap();

    let scheduler = Scheduler::new(Arc::new(DirectStrategy::new()), registry());
    scheduler.tick(&mut state).await.unwrap();

    assert!(state.queue.is_empty());
    assert_eq!(state.status, Status::Idle);
}

#[tokio::test]
async fn debug_mode_breaks_after_one_signal_and_emits_debugger_events() {
    let (mut state, recorder) = state(10);
    state.mode = Mode::Debug;
    for value in [1, 2, 3] {
        state
            .queue
            .enqueue(Signal::new("basic.run", json!({ "value": value })))
            .unwrap();
    }

    let scheduler = Scheduler::new(Arc::new(DirectStrategy::new()), registry());
    let brk = scheduler.tick(&mut state).await.unwrap().unwrap();

    assert_eq!(brk.processed.signal.kind, "basic.run");
    assert_eq!(state.queue.len(), 2);
    let recorded = recorder.recorded();
    let kinds: Vec<&str> = recorded
        .iter()
        .map(|s| s.kind.as_str())
        .collect();
    assert!(kinds.contains(&agentrt_core::signal_types::DEBUGGER_PRE_SIGNAL));
    assert!(kinds.contains(&agentrt_core::signal_types::DEBUGGER_POST_SIGNAL));
}

#[tokio::test]
async fn process_one_on_an_empty_queue_returns_none() {
    let (mut state, _recorder) = state(10);
    let scheduler = Scheduler::new(Arc::new(DirectStrategy::new()), registry());
    assert!(scheduler.process_one(&mut state).await.unwrap().is_none());
}

#[tokio::test]
async fn correlation_id_propagates_to_emitted_signals() {
    let (mut state, recorder) = state(10);
    let mut signal = Signal::new("basic.run", json!({ "value": 1 }));
    signal.correlation_id = Some(agentrt_core::CorrelationId::new("trace-1"));
    state.queue.enqueue(signal).unwrap();

    let scheduler = Scheduler::new(Arc::new(DirectStrategy::new()), registry());
    scheduler.process_one(&mut state).await.unwrap();

    let result_signal = recorder
        .recorded()
        .into_iter()
        .find(|s| s.kind == "jido.agent.out.signal_result")
        .unwrap();
    assert_eq!(
        result_signal.correlation_id.unwrap().as_str(),
        "trace-1"
    );
}

#[tokio::test]
async fn a_per_signal_dispatch_override_bypasses_the_configured_list() {
    let (state, recorder) = state(10);

    let routed = Signal::new("no.override", json!({}));
    state.publish(&routed).await;
    assert!(recorder.recorded().iter().any(|s| s.kind == "no.override"));

    let overridden = Signal::new("overridden", json!({})).with_dispatch(DispatchSpec::Noop);
    state.publish(&overridden).await;
    assert!(!recorder.recorded().iter().any(|s| s.kind == "overridden"));
}
