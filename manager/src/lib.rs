#![deny(missing_docs)]
//! Instance Manager (C12) — a keyed multiplexer over running
//! [`AgentServer`]s with optional storage-backed hibernate/thaw.
//!
//! Wraps a `RwLock<HashMap<String, AgentServer>>`, the same shape
//! `agentrt-storage-memory` uses for its own checkpoint table. Two
//! managers are independent by construction: each owns its own map
//! and, if given one, its own `Storage` handle.

use agentrt_core::{CoreError, Storage};
use agentrt_server::{AgentServer, ServerOpts};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by the manager's public operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// No running (or hibernated) instance is registered under that key.
    #[error("no instance registered under this key")]
    NotFound,
    /// Starting or reaching a server failed.
    #[error(transparent)]
    Server(#[from] agentrt_server::ServerError),
    /// A core-level operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Aggregate counts returned by [`InstanceManager::stats`].
#[derive(Debug, Clone)]
pub struct ManagerStats {
    /// Number of instances currently registered (running, not hibernated).
    pub count: usize,
    /// Keys of every currently registered instance.
    pub keys: Vec<String>,
}

/// Builds the [`ServerOpts`] for a freshly started instance, given the
/// initial state it should be seeded with (either caller-supplied or
/// thawed from storage).
pub type ServerFactory = Arc<dyn Fn(Map<String, Value>) -> ServerOpts + Send + Sync>;

/// A keyed multiplexer over agent servers under one dynamic pool.
///
/// `get` starts an instance on first reference, `lookup` never starts
/// one, and `stop` hibernates through `storage` (when configured)
/// before tearing the server down.
pub struct InstanceManager {
    instances: RwLock<HashMap<String, AgentServer>>,
    factory: ServerFactory,
    storage: Option<Arc<dyn Storage>>,
}

impl InstanceManager {
    /// Build a manager that starts instances via `factory`, optionally
    /// persisting checkpoints through `storage` on `stop`/idle.
    pub fn new(factory: ServerFactory, storage: Option<Arc<dyn Storage>>) -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            factory,
            storage,
        }
    }

    /// Return the running instance for `key`, starting one (thawed
    /// from storage if a checkpoint exists, else seeded with
    /// `initial_state`) if none is currently registered.
    pub async fn get(
        &self,
        key: &str,
        initial_state: Map<String, Value>,
    ) -> Result<AgentServer, ManagerError> {
        if let Some(server) = self.live_instance(key).await {
            return Ok(server);
        }

        let seed = match &self.storage {
            Some(storage) => match storage.load(key).await? {
                Some(Value::Object(checkpoint)) => checkpoint,
                _ => initial_state,
            },
            None => initial_state,
        };

        let opts = (self.factory)(seed);
        let server = AgentServer::start(opts).await?;

        let mut instances = self.instances.write().await;
        instances.insert(key.to_string(), server.clone());
        Ok(server)
    }

    /// Return the running instance for `key` without starting one.
    pub async fn lookup(&self, key: &str) -> Result<AgentServer, ManagerError> {
        self.live_instance(key).await.ok_or(ManagerError::NotFound)
    }

    /// Stop the instance registered under `key`. If storage is
    /// configured, its state is checkpointed first so a later `get`
    /// can thaw it.
    pub async fn stop(&self, key: &str) -> Result<(), ManagerError> {
        let server = {
            let mut instances = self.instances.write().await;
            instances.remove(key).ok_or(ManagerError::NotFound)?
        };

        if let Some(storage) = &self.storage {
            if let Ok(snapshot) = server.state().await {
                storage
                    .save(key, Value::Object(snapshot.agent_state))
                    .await?;
            }
        }

        let _ = server.shutdown().await;
        Ok(())
    }

    /// Counts and keys of every currently registered instance. Does
    /// not prune instances that have self-terminated (e.g. via idle
    /// timeout) without going through `stop` — call `lookup` or `get`
    /// to reconcile an individual key.
    pub async fn stats(&self) -> ManagerStats {
        let instances = self.instances.read().await;
        ManagerStats {
            count: instances.len(),
            keys: instances.keys().cloned().collect(),
        }
    }

    /// Look up a registered instance, pruning it from the map first if
    /// it has already self-terminated (idle timeout, panic, shutdown).
    async fn live_instance(&self, key: &str) -> Option<AgentServer> {
        let existing = {
            let instances = self.instances.read().await;
            instances.get(key).cloned()
        };
        let server = existing?;
        if server.state().await.is_ok() {
            return Some(server);
        }
        let mut instances = self.instances.write().await;
        instances.remove(key);
        None
    }
}
