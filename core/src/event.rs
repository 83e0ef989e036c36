//! Lifecycle and tick events emitted by the controller.
//!
//! Events are informational: the runner logs them, tests inspect them.
//! Nothing in the tracker reacts to an event.

use crate::{
    location::Location,
    types::{EntityId, RunId, Tick},
};
use serde::{Deserialize, Serialize};

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackerEvent {
    SimulationStarted {
        run_id: RunId,
        tick:   Tick,
    },
    SimulationStopped {
        run_id: RunId,
        tick:   Tick,
    },
    RosterReset {
        run_id:   RunId,
        entities: usize,
    },
    LocationChanged {
        tick: Tick,
        id:   EntityId,
        from: Location,
        to:   Location,
    },
    TickCompleted {
        tick:    Tick,
        draws:   usize,
        changed: usize,
    },
}

/// Stable string name of an event variant, for log lines.
pub fn event_type_name(event: &TrackerEvent) -> &'static str {
    match event {
        TrackerEvent::SimulationStarted { .. } => "simulation_started",
        TrackerEvent::SimulationStopped { .. } => "simulation_stopped",
        TrackerEvent::RosterReset { .. }       => "roster_reset",
        TrackerEvent::LocationChanged { .. }   => "location_changed",
        TrackerEvent::TickCompleted { .. }     => "tick_completed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_matches_type_name() {
        let event = TrackerEvent::LocationChanged {
            tick: 4,
            id:   2,
            from: Location::Toilet,
            to:   Location::SchoolBus,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event_type_name(&event));
        assert_eq!(json["to"], "School Bus");
    }
}
