//! One tick of simulated reader traffic over a roster.

use crate::{
    location::{Location, LOCATION_CATALOG},
    rng::TrackerRng,
    roster::{Roster, TrackedEntity},
    types::EntityId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MOVE_PROBABILITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationChange {
    pub id:   EntityId,
    pub from: Location,
    pub to:   Location,
}

/// What a single tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Entities that rolled a move and drew a location (possibly the same one).
    pub draws:   usize,
    /// Entities whose location actually differs afterwards.
    pub changes: Vec<LocationChange>,
}

#[derive(Debug, Clone, Copy)]
pub struct LocationMutator {
    move_probability: f64,
}

impl LocationMutator {
    pub fn new(move_probability: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&move_probability));
        Self { move_probability }
    }

    pub fn move_probability(&self) -> f64 {
        self.move_probability
    }

    /// Produce the next snapshot. Each entity independently redraws its
    /// location with `move_probability`; every entity's `last_update`
    /// becomes `now` (clamped so it never moves backwards). The input
    /// snapshot is left untouched.
    pub fn tick(
        &self,
        roster: &Roster,
        now: DateTime<Utc>,
        rng: &mut TrackerRng,
    ) -> (Roster, TickReport) {
        let mut report = TickReport::default();

        let next: Vec<TrackedEntity> = roster
            .entities()
            .iter()
            .map(|entity| {
                let location = if rng.chance(self.move_probability) {
                    report.draws += 1;
                    *rng.pick(&LOCATION_CATALOG)
                } else {
                    entity.location
                };

                if location != entity.location {
                    report.changes.push(LocationChange {
                        id:   entity.id,
                        from: entity.location,
                        to:   location,
                    });
                }

                TrackedEntity {
                    location,
                    last_update: entity.last_update.max(now),
                    ..entity.clone()
                }
            })
            .collect();

        (roster.successor(next), report)
    }
}

impl Default for LocationMutator {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_PROBABILITY)
    }
}
