//! Child process bookkeeping and timer/cron registration for the
//! Directive Executor's `Spawn`/`Kill`/`Schedule`/`Cron` directives.
//!
//! No actual OS process or timer wheel is modeled here — out of scope
//! per the purpose statement's "treat as external collaborators"
//! clause for transport/scheduling backends. This tracks the handles a
//! real implementation would hang off of.

use agentrt_core::SignalId;
use serde_json::Value;
use std::collections::HashMap;

/// A supervised child registered via a `Spawn` directive.
#[derive(Debug, Clone)]
pub struct ChildHandle {
    /// The child's module/implementation identifier.
    pub module: String,
    /// Arguments it was started with.
    pub args: Value,
}

/// Tracks supervised children for one agent. Every child is started
/// with `restart = temporary`: a killed or crashed child is never
/// automatically restarted by this supervisor.
#[derive(Debug, Default)]
pub struct ChildSupervisor {
    children: HashMap<String, ChildHandle>,
}

impl ChildSupervisor {
    /// Build an empty supervisor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly spawned child under a generated pid, returning it.
    pub fn spawn(&mut self, module: String, args: Value) -> String {
        let pid = SignalId::generate().to_string();
        self.children.insert(
            pid.clone(),
            ChildHandle {
                module,
                args,
            },
        );
        pid
    }

    /// Remove a child by pid. Returns whether it was present.
    pub fn kill(&mut self, pid: &str) -> bool {
        self.children.remove(pid).is_some()
    }

    /// Number of currently supervised children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether there are no supervised children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// What kind of recurrence a [`ScheduledJob`] represents.
#[derive(Debug, Clone)]
pub enum ScheduleKind {
    /// A one-shot delayed redelivery.
    Once {
        /// Delay before redelivery, in milliseconds.
        delay_ms: u64,
    },
    /// A repeating cron-based redelivery.
    Cron {
        /// The cron expression.
        expression: String,
        /// IANA timezone name.
        timezone: String,
    },
}

/// A registered `Schedule`/`Cron` job.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    /// The job's id (caller-supplied or generated).
    pub job_id: String,
    /// One-shot or repeating.
    pub kind: ScheduleKind,
    /// The payload to redeliver.
    pub message: Value,
}

/// Registry of scheduled jobs for one agent.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    jobs: HashMap<String, ScheduledJob>,
}

impl TimerRegistry {
    /// Build an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a one-shot delayed job, generating an id.
    pub fn schedule_once(&mut self, delay_ms: u64, message: Value) -> String {
        let job_id = SignalId::generate().to_string();
        self.jobs.insert(
            job_id.clone(),
            ScheduledJob {
                job_id: job_id.clone(),
                kind: ScheduleKind::Once { delay_ms },
                message,
            },
        );
        job_id
    }

    /// Register a repeating cron job under `job_id`, or a generated one
    /// if absent. `timezone` defaults to `"UTC"`.
    pub fn schedule_cron(
        &mut self,
        job_id: Option<String>,
        expression: String,
        timezone: Option<String>,
        message: Value,
    ) -> String {
        let job_id = job_id.unwrap_or_else(|| SignalId::generate().to_string());
        self.jobs.insert(
            job_id.clone(),
            ScheduledJob {
                job_id: job_id.clone(),
                kind: ScheduleKind::Cron {
                    expression,
                    timezone: timezone.unwrap_or_else(|| "UTC".into()),
                },
                message,
            },
        );
        job_id
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no jobs are registered.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Look up a job by id.
    pub fn get(&self, job_id: &str) -> Option<&ScheduledJob> {
        self.jobs.get(job_id)
    }
}
