//! Shared primitive types used across the entire tracker.

/// A simulation tick. One tick = one timer-driven mutation pass.
pub type Tick = u64;

/// Roster-local identifier of a tracked entity. Starts at 1.
pub type EntityId = u32;

/// The canonical run identifier. A new one is minted on every reset.
pub type RunId = String;

/// Monotonic counter identifying a roster snapshot.
pub type SnapshotVersion = u64;
