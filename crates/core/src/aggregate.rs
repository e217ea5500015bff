//! Aggregate traits: decide first, mutate second.

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Number of changes applied since the aggregate was (re)loaded.
    fn version(&self) -> u64;
}

/// Aggregate execution semantics (pure, deterministic).
///
/// - **Decision logic**: `handle(&self, cmd)` validates a command and returns the
///   changes it implies, without touching state.
/// - **State mutation**: `apply(&mut self, change)` evolves state.
///
/// Splitting the two lets a caller persist every change remotely before any of
/// them is applied in memory.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Change: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single change.
    fn apply(&mut self, change: &Self::Change);

    /// Decide which changes a command produces given the current state.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Change>, Self::Error>;
}
