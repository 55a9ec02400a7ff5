//! Protocol — The Router
//!
//! Maps a signal's type to one or more instructions. The trait lives
//! here, split from its implementation; the compiled routing table and
//! its pattern/priority matching live in `agentrt-router`.

use crate::error::CoreError;
use crate::instruction::Instruction;
use crate::signal::Signal;

/// Compiles `(pattern, target, priority?)` rules and resolves a signal
/// to the instructions it should dispatch.
pub trait Router: Send + Sync {
    /// Resolve `signal.type` to instructions via pattern match. Ties
    /// are broken by priority, then declaration order. `signal.data`
    /// is merged into the first routed instruction's `params` by the
    /// implementation (caller-provided params win).
    fn route(&self, signal: &Signal) -> Result<Vec<Instruction>, CoreError>;
}
