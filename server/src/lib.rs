#![deny(missing_docs)]
//! Agent Server (C11) — a process wrapper hosting exactly one agent.
//!
//! A single task owns the agent's `ServerState` exclusively and is
//! reached only through a mailbox: `call`/`cast` become messages
//! dropped into an `mpsc` channel, `call` waiting on a `oneshot` reply
//! the way a unit of dispatched work elsewhere awaits its
//! `JoinHandle`.

use agentrt_core::{
    Action, ActionRegistry, Agent, AgentOpts, CoreError, DispatchAdapter, Router, Signal,
    SignalId, Strategy,
};
use agentrt_runtime::{Mode, Scheduler, ServerState, Status};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Errors raised by the server's public operations, distinct from
/// [`CoreError`] because some of them (timeout, a dead mailbox) never
/// occur inside the scheduler itself.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The agent-level operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),
    /// `call` did not receive a reply within its timeout.
    #[error("call timed out")]
    Timeout,
    /// The server's actor task has already exited.
    #[error("server is no longer running")]
    Closed,
}

/// Construction options for [`AgentServer::start`].
pub struct ServerOpts {
    /// The agent value to host. `None` is rejected with `invalid_agent`.
    pub agent: Option<Agent>,
    /// Extra actions merged into the agent's registered set idempotently.
    pub actions: Vec<Arc<dyn Action>>,
    /// The compiled routing table.
    pub router: Arc<dyn Router>,
    /// The execution policy.
    pub strategy: Arc<dyn Strategy>,
    /// Output adapters. Defaults to empty (callers typically want at
    /// least a logger and a console error adapter).
    pub dispatch: Vec<Arc<dyn DispatchAdapter>>,
    /// Signal queue capacity. Default `10_000`.
    pub max_queue_size: usize,
    /// Initial scheduler mode. Default `auto`.
    pub mode: Mode,
    /// Idle duration (no activity, not attached) after which the
    /// server shuts itself down.
    pub idle_timeout: Option<Duration>,
}

impl Default for ServerOpts {
    fn default() -> Self {
        Self {
            agent: None,
            actions: Vec::new(),
            router: Arc::new(NoRoutes),
            strategy: Arc::new(NoStrategy),
            dispatch: Vec::new(),
            max_queue_size: 10_000,
            mode: Mode::Auto,
            idle_timeout: None,
        }
    }
}

struct NoRoutes;
impl Router for NoRoutes {
    fn route(&self, signal: &Signal) -> Result<Vec<agentrt_core::Instruction>, CoreError> {
        Err(CoreError::Routing(format!("no route for {}", signal.kind)))
    }
}

struct NoStrategy;
#[async_trait::async_trait]
impl Strategy for NoStrategy {
    async fn cmd(
        &self,
        agent: Agent,
        _instructions: Vec<agentrt_core::Instruction>,
        _ctx: &agentrt_core::StrategyContext<'_>,
    ) -> (Agent, Vec<agentrt_core::Directive>) {
        (agent, Vec::new())
    }
}

/// A read-only snapshot of a running server, returned by `state()`.
#[derive(Debug, Clone)]
pub struct ServerSnapshot {
    /// The agent's stable id.
    pub agent_id: String,
    /// State-machine status at snapshot time.
    pub status: Status,
    /// Scheduler drive mode.
    pub mode: Mode,
    /// Number of signals currently queued.
    pub queue_len: usize,
    /// The agent's current state, as JSON.
    pub agent_state: Map<String, Value>,
}

enum ServerMessage {
    Call {
        signal: Signal,
        reply: oneshot::Sender<Result<Value, CoreError>>,
    },
    Cast {
        signal: Signal,
    },
    State {
        reply: oneshot::Sender<ServerSnapshot>,
    },
    Step,
    Clear {
        reply: oneshot::Sender<()>,
    },
    Touch,
    Attach,
    Detach,
    Shutdown,
}

/// A handle to a running agent server. Dropping every clone of the
/// handle does not stop the server — call is the only way to reach it,
/// mirroring an actor whose mailbox outlives any one sender.
#[derive(Clone, Debug)]
pub struct AgentServer {
    tx: mpsc::Sender<ServerMessage>,
}

impl AgentServer {
    /// Start a server, spawning its actor task. Fails immediately,
    /// without spawning, if `opts.agent` is absent.
    pub async fn start(opts: ServerOpts) -> Result<Self, ServerError> {
        let Some(mut agent) = opts.agent else {
            return Err(CoreError::InvalidAgent("agent is required".into()).into());
        };
        for action in &opts.actions {
            agent = agent.register_action(action.id());
        }

        let mut registry = ActionRegistry::new();
        for action in opts.actions {
            registry.register(action);
        }

        let mut state = ServerState::new(agent, opts.router, opts.dispatch, opts.max_queue_size);
        state.mode = opts.mode;
        state.transition(Status::Idle).await?;

        let scheduler = Scheduler::new(opts.strategy, registry);
        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(run_actor(state, scheduler, rx, opts.idle_timeout));
        Ok(Self { tx })
    }

    /// Snapshot the server's current state.
    pub async fn state(&self) -> Result<ServerSnapshot, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(ServerMessage::State { reply }).await?;
        rx.await.map_err(|_| ServerError::Closed)
    }

    /// Enqueue `signal` and block until its `signal_result` arrives or
    /// `timeout` elapses.
    pub async fn call(&self, signal: Signal, timeout: Duration) -> Result<Value, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(ServerMessage::Call { signal, reply }).await?;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result.map_err(ServerError::from),
            Ok(Err(_)) => Err(ServerError::Closed),
            Err(_) => Err(ServerError::Timeout),
        }
    }

    /// Enqueue `signal` without waiting, returning its id as a
    /// correlation handle.
    pub async fn cast(&self, signal: Signal) -> Result<SignalId, ServerError> {
        let id = signal.id.clone();
        self.send(ServerMessage::Cast { signal }).await?;
        Ok(id)
    }

    /// Process exactly one queued signal regardless of drive mode.
    /// Used by debug tooling to single-step a server from the outside.
    pub async fn step(&self) -> Result<(), ServerError> {
        self.send(ServerMessage::Step).await
    }

    /// Discard every queued signal, publishing `queue.cleared`.
    pub async fn clear(&self) -> Result<(), ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(ServerMessage::Clear { reply }).await?;
        rx.await.map_err(|_| ServerError::Closed)
    }

    /// Reset the idle timer without otherwise affecting the server.
    pub async fn touch(&self) -> Result<(), ServerError> {
        self.send(ServerMessage::Touch).await
    }

    /// Record an active attachment, suspending idle timeout tracking
    /// until a matching `detach`.
    pub async fn attach(&self) -> Result<(), ServerError> {
        self.send(ServerMessage::Attach).await
    }

    /// Release an attachment recorded by `attach`.
    pub async fn detach(&self) -> Result<(), ServerError> {
        self.send(ServerMessage::Detach).await
    }

    /// Request graceful shutdown. The actor task exits after this
    /// message is processed.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        self.send(ServerMessage::Shutdown).await
    }

    async fn send(&self, message: ServerMessage) -> Result<(), ServerError> {
        self.tx.send(message).await.map_err(|_| ServerError::Closed)
    }
}

fn snapshot(state: &ServerState) -> ServerSnapshot {
    ServerSnapshot {
        agent_id: state.agent.id.as_str().to_owned(),
        status: state.status,
        mode: state.mode,
        queue_len: state.queue.len(),
        agent_state: state.agent.state.clone(),
    }
}

async fn drive(scheduler: &Scheduler, state: &mut ServerState) -> Result<(), CoreError> {
    if state.mode == Mode::Auto {
        scheduler.run_auto(state).await?;
    }
    Ok(())
}

async fn run_actor(
    mut state: ServerState,
    scheduler: Scheduler,
    mut rx: mpsc::Receiver<ServerMessage>,
    idle_timeout: Option<Duration>,
) {
    let mut attachments: u32 = 0;

    loop {
        let idle_sleep = match (idle_timeout, attachments) {
            (Some(d), 0) => Some(tokio::time::sleep(d)),
            _ => None,
        };

        let message = if let Some(sleep) = idle_sleep {
            tokio::select! {
                m = rx.recv() => m,
                _ = sleep => {
                    tracing::debug!(agent.id = %state.agent.id, "server idle timeout, shutting down");
                    break;
                }
            }
        } else {
            rx.recv().await
        };

        let Some(message) = message else { break };

        match message {
            ServerMessage::Call { signal, reply } => {
                let id = signal.id.clone();
                let (tx, rx2) = oneshot::channel();
                state.register_reply(id.clone(), tx);
                if let Err((e, event)) = state.queue.enqueue(signal) {
                    state.reply_refs.remove(&id);
                    state.publish(&event.into_signal()).await;
                    let _ = reply.send(Err(e));
                    continue;
                }
                if let Err(e) = drive(&scheduler, &mut state).await {
                    let _ = reply.send(Err(e));
                    continue;
                }
                match rx2.await {
                    Ok(result) => {
                        let _ = reply.send(result);
                    }
                    Err(_) => {
                        let _ = reply.send(Err(CoreError::NotFound(id.to_string())));
                    }
                }
            }
            ServerMessage::Cast { signal } => {
                if let Err((e, event)) = state.queue.enqueue(signal) {
                    tracing::warn!(error = %e, "cast dropped: queue overflow");
                    state.publish(&event.into_signal()).await;
                    continue;
                }
                if let Err(e) = drive(&scheduler, &mut state).await {
                    tracing::warn!(error = %e, "cast processing failed");
                }
            }
            ServerMessage::State { reply } => {
                let _ = reply.send(snapshot(&state));
            }
            ServerMessage::Step => {
                let _ = scheduler.process_one(&mut state).await;
            }
            ServerMessage::Clear { reply } => {
                let event = state.queue.clear();
                state.publish(&event.into_signal()).await;
                let _ = reply.send(());
            }
            ServerMessage::Touch => {}
            ServerMessage::Attach => attachments += 1,
            ServerMessage::Detach => attachments = attachments.saturating_sub(1),
            ServerMessage::Shutdown => break,
        }
    }
}

/// Static metadata used to build a fresh agent when `start` is given a
/// type rather than a value. Mirrors `AgentOpts` defaulting.
pub fn new_agent(type_name: impl Into<String>, initial_state: Map<String, Value>) -> Agent {
    Agent::new(AgentOpts {
        type_name: type_name.into(),
        initial_state,
        ..Default::default()
    })
}
