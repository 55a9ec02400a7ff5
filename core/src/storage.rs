//! Protocol — Storage (hibernate/thaw)
//!
//! A checkpoint backend for idle agents. Stores whole-agent checkpoint
//! blobs: the Instance Manager writes one checkpoint per `(agent type,
//! key)` pair rather than many scoped keys.

use crate::error::CoreError;
use async_trait::async_trait;
use serde_json::Value;

/// Hibernate/thaw backend. Concrete persistence (a file, a database, a
/// remote KV store) is out of scope for this crate.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a checkpoint under `key`, overwriting any prior value.
    async fn save(&self, key: &str, checkpoint: Value) -> Result<(), CoreError>;

    /// Load a checkpoint, if one is present under `key`.
    async fn load(&self, key: &str) -> Result<Option<Value>, CoreError>;

    /// Remove a checkpoint.
    async fn delete(&self, key: &str) -> Result<(), CoreError>;
}
