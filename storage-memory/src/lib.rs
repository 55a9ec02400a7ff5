#![deny(missing_docs)]
//! In-memory implementation of `agentrt-core`'s [`Storage`] trait.
//!
//! Uses a `HashMap` behind a `RwLock` for concurrent access. Stores
//! whole-agent checkpoint blobs keyed by a single opaque string — the
//! Instance Manager writes one checkpoint per hibernated agent
//! instance rather than many scoped keys.

use agentrt_core::{CoreError, Storage};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory checkpoint store backed by a `HashMap` behind a `RwLock`.
///
/// Suitable for testing, prototyping, and single-process deployments
/// where persistence across restarts is not required. Checkpoints do
/// not survive process exit.
pub struct MemoryStorage {
    data: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStorage {
    /// Create a new empty in-memory storage backend.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Number of checkpoints currently held.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Whether any checkpoints are currently held.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save(&self, key: &str, checkpoint: serde_json::Value) -> Result<(), CoreError> {
        let mut data = self.data.write().await;
        data.insert(key.to_string(), checkpoint);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, CoreError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        let mut data = self.data.write().await;
        data.remove(key);
        Ok(())
    }
}
