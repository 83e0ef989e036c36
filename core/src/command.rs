use serde::{Deserialize, Serialize};

/// Operator commands accepted by the hosting process.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlCommand {
    // ── Simulation lifecycle ──────────────────────
    Start,
    Stop,
    Toggle,
    Reset,

    // ── Relay ─────────────────────────────────────
    /// Push the current roster snapshot to the relay.
    Send,

    // ── Session ───────────────────────────────────
    GetState,
    Quit,
}
