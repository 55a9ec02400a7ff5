use agentrt_core::test_utils::BasicAction;
use agentrt_core::{Agent, AgentOpts, ActionId, CoreError, RecordingAdapter, Signal};
use agentrt_router::{Rule, RuleTarget, RoutingTable};
use agentrt_server::{AgentServer, ServerError, ServerOpts};
use agentrt_strategy_direct::DirectStrategy;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn routes() -> RoutingTable {
    let mut table = RoutingTable::new();
    table.add(Rule::new(
        "basic.run",
        RuleTarget::One(agentrt_core::Instruction::new(ActionId::new("BasicAction"))),
    ));
    table
}

fn agent() -> Agent {
    Agent::new(AgentOpts {
        type_name: "tester".into(),
        actions: vec![ActionId::new("BasicAction")],
        ..Default::default()
    })
}

fn opts() -> ServerOpts {
    ServerOpts {
        agent: Some(agent()),
        actions: vec![Arc::new(BasicAction)],
        router: Arc::new(routes()),
        strategy: Arc::new(DirectStrategy::new()),
        dispatch: Vec::new(),
        max_queue_size: 16,
        ..Default::default()
    }
}

#[tokio::test]
async fn start_rejects_a_missing_agent() {
    let err = AgentServer::start(ServerOpts {
        agent: None,
        ..Default::default()
    })
    .await
    .unwrap_err();
    match err {
        ServerError::Core(CoreError::InvalidAgent(_)) => {}
        other => panic!("expected invalid_agent, got {other:?}"),
    }
}

#[tokio::test]
async fn call_returns_the_instruction_result() {
    let server = AgentServer::start(opts()).await.unwrap();
    let signal = Signal::new("basic.run", json!({ "value": 3 }));
    let result = server
        .call(signal, Duration::from_secs(1))
        .await
        .expect("call should succeed");
    assert_eq!(result["result"], json!(6));
}

#[tokio::test]
async fn cast_does_not_block_and_still_runs() {
    let server = AgentServer::start(opts()).await.unwrap();
    let signal = Signal::new("basic.run", json!({ "value": 5 }));
    let id = server.cast(signal).await.unwrap();
    assert!(!id.as_str().is_empty());

    // give the actor a turn to process the cast
    tokio::time::sleep(Duration::from_millis(20)).await;
    let snapshot = server.state().await.unwrap();
    assert_eq!(snapshot.queue_len, 0);
}

#[tokio::test]
async fn state_reports_a_running_snapshot() {
    let server = AgentServer::start(opts()).await.unwrap();
    let snapshot = server.state().await.unwrap();
    assert_eq!(snapshot.queue_len, 0);
    assert!(!snapshot.agent_id.is_empty());
}

#[tokio::test]
async fn call_surfaces_a_routing_error() {
    let server = AgentServer::start(opts()).await.unwrap();
    let signal = Signal::new("no.such.route", json!({}));
    let err = server
        .call(signal, Duration::from_secs(1))
        .await
        .unwrap_err();
    match err {
        ServerError::Core(CoreError::Routing(_)) => {}
        other => panic!("expected a routing error, got {other:?}"),
    }
}

#[tokio::test]
async fn queue_overflow_surfaces_through_call() {
    let mut o = opts();
    o.max_queue_size = 0;
    let server = AgentServer::start(o).await.unwrap();
    let signal = Signal::new("basic.run", json!({ "value": 1 }));
    let err = server
        .call(signal, Duration::from_secs(1))
        .await
        .unwrap_err();
    match err {
        ServerError::Core(CoreError::QueueOverflow { .. }) => {}
        other => panic!("expected queue_overflow, got {other:?}"),
    }
}

#[tokio::test]
async fn queue_overflow_publishes_a_signal_with_sizes() {
    let recorder = Arc::new(RecordingAdapter::new());
    let mut o = opts();
    o.max_queue_size = 0;
    o.dispatch = vec![recorder.clone()];
    let server = AgentServer::start(o).await.unwrap();

    let _ = server
        .call(Signal::new("basic.run", json!({ "value": 1 })), Duration::from_millis(50))
        .await;

    let overflow = recorder
        .recorded()
        .into_iter()
        .find(|s| s.kind == agentrt_core::signal_types::QUEUE_OVERFLOW)
        .expect("queue.overflow should be published");
    assert_eq!(overflow.data["queue_size"], json!(0));
    assert_eq!(overflow.data["max_size"], json!(0));
}

#[tokio::test]
async fn clear_discards_the_queue_and_publishes_cleared() {
    let recorder = Arc::new(RecordingAdapter::new());
    let mut o = opts();
    o.mode = agentrt_runtime::Mode::Step;
    o.dispatch = vec![recorder.clone()];
    let server = AgentServer::start(o).await.unwrap();

    server
        .cast(Signal::new("basic.run", json!({ "value": 1 })))
        .await
        .unwrap();
    server.clear().await.unwrap();

    let snapshot = server.state().await.unwrap();
    assert_eq!(snapshot.queue_len, 0);
    assert!(recorder
        .recorded()
        .iter()
        .any(|s| s.kind == agentrt_core::signal_types::QUEUE_CLEARED));
}

#[tokio::test]
async fn shutdown_stops_the_actor() {
    let server = AgentServer::start(opts()).await.unwrap();
    server.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let err = server.state().await.unwrap_err();
    assert!(matches!(err, ServerError::Closed));
}

#[tokio::test]
async fn idle_timeout_shuts_the_server_down_when_unattached() {
    let mut o = opts();
    o.idle_timeout = Some(Duration::from_millis(30));
    let server = AgentServer::start(o).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let err = server.state().await.unwrap_err();
    assert!(matches!(err, ServerError::Closed));
}

#[tokio::test]
async fn an_attachment_suspends_the_idle_timer() {
    let mut o = opts();
    o.idle_timeout = Some(Duration::from_millis(30));
    let server = AgentServer::start(o).await.unwrap();
    server.attach().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    // still alive because an attachment is held
    server.state().await.expect("server should still be running");
    server.detach().await.unwrap();
}

#[tokio::test]
async fn step_processes_exactly_one_signal() {
    let server = AgentServer::start(opts()).await.unwrap();
    server
        .cast(Signal::new("basic.run", json!({ "value": 1 })))
        .await
        .unwrap();
    server
        .cast(Signal::new("basic.run", json!({ "value": 2 })))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    // both casts already auto-drained in Mode::Auto; queue is empty
    let snapshot = server.state().await.unwrap();
    assert_eq!(snapshot.queue_len, 0);
}
