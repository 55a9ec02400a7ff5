//! Runtime / Scheduler (C9) — the single-threaded cooperative loop that
//! dequeues signals, routes them, invokes the Strategy, applies
//! effects, and emits outputs.
//!
//! A dequeue loop that routes a signal, runs the strategy, interprets
//! the resulting directives into followups, and re-queues them ahead
//! of whatever is already waiting. Three distinct drive modes
//! (`auto`/`step`/`debug`) wrap the same per-signal pipeline.

use crate::executor::DirectiveExecutor;
use crate::state::{Mode, ServerState, Status};
use agentrt_core::{
    signal_types, ActionRegistry, CoreError, Instruction, Signal, Strategy, StrategyContext,
};
use serde_json::Value;
use std::sync::Arc;

/// Outcome of fully processing one signal.
#[derive(Debug, Clone)]
pub struct ProcessedSignal {
    /// The signal that was processed.
    pub signal: Signal,
    /// The final run result, if any instruction produced one.
    pub result: Option<Value>,
}

/// Returned by `debug` mode: the processed signal plus the fact that
/// the remaining queue was left untouched.
#[derive(Debug, Clone)]
pub struct DebugBreak {
    /// The single signal that was processed.
    pub processed: ProcessedSignal,
}

/// Drives a [`ServerState`] through the per-signal processing pipeline.
pub struct Scheduler {
    strategy: Arc<dyn Strategy>,
    registry: ActionRegistry,
    executor: DirectiveExecutor,
}

impl Scheduler {
    /// Build a scheduler around a strategy and the action registry it
    /// resolves instructions against.
    pub fn new(strategy: Arc<dyn Strategy>, registry: ActionRegistry) -> Self {
        Self {
            strategy,
            registry,
            executor: DirectiveExecutor::new(),
        }
    }

    /// Process exactly one queued signal, or `Ok(None)` if the queue is
    /// empty. Leaves `state.status` at `Idle` on return.
    pub async fn process_one(
        &self,
        state: &mut ServerState,
    ) -> Result<Option<ProcessedSignal>, CoreError> {
        let Some(signal) = state.queue.dequeue() else {
            return Ok(None);
        };

        state.current_correlation_id = signal
            .correlation_id
            .clone()
            .or_else(|| state.current_correlation_id.clone());
        state.current_causation_id = signal
            .causation_id
            .clone()
            .or_else(|| state.current_causation_id.clone());
        state.current_signal = Some(signal.clone());

        state.transition(Status::Running).await?;

        let instructions = match self.resolve_instructions(&signal, state) {
            Ok(instructions) => instructions,
            Err(e) => {
                let error_signal = Signal::caused_by(
                    signal_types::ERROR,
                    serde_json::json!({ "message": e.to_string() }),
                    &signal,
                );
                state.publish(&error_signal).await;
                state.current_signal = None;
                state.transition(Status::Idle).await?;
                return Err(e);
            }
        };

        let ctx = StrategyContext::new(&self.registry);
        let agent = state.agent.clone();
        let (agent, directives) = self.strategy.cmd(agent, instructions, &ctx).await;
        let result = agent.result.clone();
        state.agent = agent;

        let batch = self.executor.apply_batch(state, directives).await;
        for emitted in &batch.emitted {
            state.publish(emitted).await;
        }

        let instruction_result = Signal::caused_by(
            signal_types::INSTRUCTION_RESULT,
            result.clone().map(Value::Object).unwrap_or(Value::Null),
            &signal,
        );
        let signal_result = Signal::caused_by(
            signal_types::SIGNAL_RESULT,
            result.clone().map(Value::Object).unwrap_or(Value::Null),
            &signal,
        );
        state.publish(&instruction_result).await;
        state.publish(&signal_result).await;

        if let Some(sender) = state.take_reply(&signal.id) {
            let reply = result.clone().map(Value::Object).unwrap_or(Value::Null);
            let _ = sender.send(Ok(reply));
        }

        state.current_signal = None;
        state.transition(Status::Idle).await?;

        if let Some(e) = batch.error {
            return Err(e);
        }

        Ok(Some(ProcessedSignal { signal, result: result.map(Value::Object) }))
    }

    fn resolve_instructions(
        &self,
        signal: &Signal,
        state: &ServerState,
    ) -> Result<Vec<Instruction>, CoreError> {
        if signal.kind == signal_types::DIRECT_INSTRUCTION {
            let instruction: Instruction = signal
                .data
                .get("instruction")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .ok_or_else(|| {
                    CoreError::Execution("malformed direct-instruction signal".into())
                })?;
            return Ok(vec![instruction]);
        }
        state.router.route(signal)
    }

    /// Drain the queue until empty, stopping immediately on the first
    /// execution error (the queue retains whatever remains).
    pub async fn run_auto(&self, state: &mut ServerState) -> Result<(), CoreError> {
        while !state.queue.is_empty() {
            self.process_one(state).await?;
        }
        Ok(())
    }

    /// Process exactly one signal, then return to idle.
    pub async fn run_step(
        &self,
        state: &mut ServerState,
    ) -> Result<Option<ProcessedSignal>, CoreError> {
        self.process_one(state).await
    }

    /// Process exactly one signal, emitting `debugger.pre.signal` and
    /// `debugger.post.signal` around it. The remaining queue is left
    /// untouched.
    pub async fn run_debug(
        &self,
        state: &mut ServerState,
    ) -> Result<Option<DebugBreak>, CoreError> {
        let Some(next) = state.queue.dequeue() else {
            return Ok(None);
        };
        // Processing re-dequeues internally, so hand the signal back to
        // the front before running the normal pipeline on it.
        state
            .queue
            .enqueue_front(next.clone())
            .map_err(|(e, _)| e)?;

        let pre = Signal::new(
            signal_types::DEBUGGER_PRE_SIGNAL,
            serde_json::json!({ "signal_id": next.id.as_str() }),
        );
        state.publish(&pre).await;

        let processed = self.process_one(state).await?;

        let post = Signal::new(
            signal_types::DEBUGGER_POST_SIGNAL,
            serde_json::json!({ "signal_id": next.id.as_str() }),
        );
        state.publish(&post).await;

        Ok(processed.map(|processed| DebugBreak { processed }))
    }

    /// Drive `state` one cycle according to its configured [`Mode`].
    /// `auto` drains the queue; `step` and `debug` process one signal.
    pub async fn tick(&self, state: &mut ServerState) -> Result<Option<DebugBreak>, CoreError> {
        match state.mode {
            Mode::Auto => {
                self.run_auto(state).await?;
                Ok(None)
            }
            Mode::Step => {
                self.run_step(state).await?;
                Ok(None)
            }
            Mode::Debug => self.run_debug(state).await,
        }
    }
}
