//! Schema validation as a black box.
//!
//! The core must not depend on a specific validator. Callers provide an
//! `Arc<dyn Schema>`; the default [`NoSchema`] accepts anything and
//! contributes no defaults, matching an agent declared with an empty
//! schema.

use crate::error::CoreError;
use serde_json::{Map, Value};

/// A schema validator boundary. Concrete validation engines (JSON
/// Schema, a hand-rolled struct validator, ...) are out of scope for
/// this crate — implement this trait to plug one in.
pub trait Schema: Send + Sync {
    /// Validate (and possibly coerce) `value`. In strict mode, drop
    /// unknown top-level keys instead of failing on them.
    fn validate(&self, value: &Map<String, Value>, strict: bool) -> Result<Map<String, Value>, CoreError>;

    /// The set of keys this schema declares, in declaration order.
    fn known_keys(&self) -> Vec<String>;

    /// Default values for declared keys, used to seed new agent state.
    fn defaults(&self) -> Map<String, Value>;
}

/// The empty schema: validation is a no-op, there are no known keys,
/// and there are no defaults. Used by agents with no declared schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSchema;

impl Schema for NoSchema {
    fn validate(&self, value: &Map<String, Value>, _strict: bool) -> Result<Map<String, Value>, CoreError> {
        Ok(value.clone())
    }

    fn known_keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn defaults(&self) -> Map<String, Value> {
        Map::new()
    }
}
