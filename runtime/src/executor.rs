//! Directive Executor (C10) — applies externally observable directives
//! against a [`ServerState`].
//!
//! One `match` over a tagged union, mutating shared collaborators and
//! recording what happened, for all eleven `Directive` variants.

use crate::state::ServerState;
use agentrt_core::merge::{deep_merge, delete_path, set_path};
use agentrt_core::{signal_types, CoreError, Directive, ErrorContext, Instruction, Signal, StateOp};
use serde_json::{json, Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// What applying one directive produced.
struct ApplyResult {
    signals: Vec<Signal>,
    stop_reason: Option<Option<String>>,
}

impl ApplyResult {
    fn none() -> Self {
        Self {
            signals: Vec::new(),
            stop_reason: None,
        }
    }

    fn signals(signals: Vec<Signal>) -> Self {
        Self {
            signals,
            stop_reason: None,
        }
    }

    fn stop(reason: Option<String>) -> Self {
        Self {
            signals: Vec::new(),
            stop_reason: Some(reason),
        }
    }
}

/// Outcome of applying an ordered batch of directives. The first error
/// halts the batch; directives after it are not attempted.
pub struct DirectiveBatchOutcome {
    /// Signals produced by successfully applied directives, in order.
    pub emitted: Vec<Signal>,
    /// Set if a `Stop` directive was applied.
    pub stop_reason: Option<Option<String>>,
    /// Set if a directive failed, halting the remainder of the batch.
    pub error: Option<CoreError>,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn register_action_idempotent(actions: &mut Vec<agentrt_core::ActionId>, action: agentrt_core::ActionId) {
    if !actions.contains(&action) {
        actions.push(action);
    }
}

/// Stateless applier of [`Directive`]s against a [`ServerState`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectiveExecutor;

impl DirectiveExecutor {
    /// Build a new executor. Stateless — shareable across agents.
    pub fn new() -> Self {
        Self
    }

    /// Apply an ordered batch of directives, halting on the first error.
    pub async fn apply_batch(
        &self,
        state: &mut ServerState,
        directives: Vec<Directive>,
    ) -> DirectiveBatchOutcome {
        let mut emitted = Vec::new();
        let mut stop_reason = None;
        let mut error = None;

        for directive in directives {
            match self.apply_one(state, directive).await {
                Ok(result) => {
                    emitted.extend(result.signals);
                    if let Some(reason) = result.stop_reason {
                        stop_reason = Some(reason);
                        break;
                    }
                }
                Err(e) => {
                    error = Some(e);
                    break;
                }
            }
        }

        DirectiveBatchOutcome {
            emitted,
            stop_reason,
            error,
        }
    }

    async fn apply_one(
        &self,
        state: &mut ServerState,
        directive: Directive,
    ) -> Result<ApplyResult, CoreError> {
        match directive {
            Directive::Emit { signal } => Ok(ApplyResult::signals(vec![*signal])),

            Directive::Schedule { delay_ms, message } => {
                state.timers.schedule_once(delay_ms.as_millis(), message);
                Ok(ApplyResult::none())
            }

            Directive::Cron {
                expression,
                message,
                job_id,
                timezone,
            } => {
                state
                    .timers
                    .schedule_cron(job_id, expression, timezone, message);
                Ok(ApplyResult::none())
            }

            Directive::Spawn { module, args } => {
                let pid = state.child_supervisor.spawn(module.clone(), args.clone());
                let signal = Signal::new(
                    signal_types::PROCESS_STARTED,
                    json!({ "pid": pid, "module": module, "args": args }),
                );
                Ok(ApplyResult::signals(vec![signal]))
            }

            Directive::Kill { pid } => {
                if state.child_supervisor.kill(&pid) {
                    let signal =
                        Signal::new(signal_types::PROCESS_TERMINATED, json!({ "pid": pid }));
                    Ok(ApplyResult::signals(vec![signal]))
                } else {
                    Err(CoreError::Execution("Process not found".into()))
                }
            }

            Directive::RegisterAction { action } => {
                register_action_idempotent(&mut state.agent.actions, action);
                Ok(ApplyResult::none())
            }

            Directive::DeregisterAction { action } => {
                state.agent.actions.retain(|a| a != &action);
                Ok(ApplyResult::none())
            }

            Directive::Enqueue {
                action,
                params,
                context,
                opts,
            } => {
                if action.as_str().is_empty() {
                    return Err(CoreError::Validation("Invalid action".into()));
                }
                let instruction = Instruction::new(action.clone())
                    .with_params(params)
                    .with_context(context)
                    .with_opts(opts);
                state.agent.pending_instructions.push(instruction.clone());

                let data = json!({ "instruction": serde_json::to_value(&instruction).unwrap_or(Value::Null) });
                let signal = Signal::new(signal_types::DIRECT_INSTRUCTION, data);
                state
                    .queue
                    .enqueue_front(signal)
                    .map_err(|(e, _)| e)?;
                Ok(ApplyResult::none())
            }

            Directive::StateModification { op, path, value } => {
                apply_state_modification(&mut state.agent.state, op, &path, value)?;
                Ok(ApplyResult::none())
            }

            Directive::Stop { reason } => Ok(ApplyResult::stop(reason)),

            Directive::Error { context, error } => {
                let context_label = match &context {
                    ErrorContext::Instruction => "instruction".to_string(),
                    ErrorContext::Normalize => "normalize".to_string(),
                    ErrorContext::Custom(label) => label.clone(),
                    _ => "unknown".to_string(),
                };
                let signal = Signal::new(
                    signal_types::ERROR,
                    json!({
                        "message": error,
                        "metadata": { "context": context_label },
                        "agent_id": state.agent.id.as_str(),
                        "timestamp": now_millis().to_string(),
                    }),
                );
                Ok(ApplyResult::signals(vec![signal]))
            }

            _ => Err(CoreError::Validation("Invalid directive".into())),
        }
    }
}

fn apply_state_modification(
    agent_state: &mut Map<String, Value>,
    op: StateOp,
    path: &[String],
    value: Option<Value>,
) -> Result<(), CoreError> {
    match op {
        StateOp::Set => {
            let value = value.ok_or_else(|| {
                CoreError::Validation("Invalid state modification operation".into())
            })?;
            set_path(agent_state, path, value);
        }
        StateOp::Update => {
            let Value::Object(patch) = value.ok_or_else(|| {
                CoreError::Validation("Invalid state modification operation".into())
            })?
            else {
                return Err(CoreError::Validation(
                    "Invalid state modification operation".into(),
                ));
            };
            let mut existing = agentrt_core::merge::get_path(agent_state, path)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            match &mut existing {
                Value::Object(existing_map) => deep_merge(existing_map, patch),
                _ => existing = Value::Object(patch),
            }
            set_path(agent_state, path, existing);
        }
        StateOp::Delete => {
            delete_path(agent_state, path);
        }
        StateOp::Reset => {
            set_path(agent_state, path, Value::Null);
        }
        _ => {
            return Err(CoreError::Validation(
                "Invalid state modification operation".into(),
            ));
        }
    }
    Ok(())
}
