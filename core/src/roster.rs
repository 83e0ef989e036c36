//! Tracked entities and immutable roster snapshots.
//!
//! A Roster is copy-on-write: cloning shares storage, and every tick builds
//! a fresh snapshot. Holders of an older snapshot never observe a mutation,
//! so consumers detect change with `Roster::same_snapshot`.

use crate::{
    location::{Location, LocationCounts, LOCATION_CATALOG},
    name_pool::NamePool,
    rng::TrackerRng,
    types::{EntityId, SnapshotVersion},
};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// One student as seen by the tag readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntity {
    pub id:          EntityId,
    pub name:        String,
    pub location:    Location,
    #[serde(serialize_with = "time_of_day")]
    pub last_update: DateTime<Utc>,
}

impl TrackedEntity {
    /// Badge label shown on cards, e.g. `ST007`.
    pub fn badge(&self) -> String {
        format!("ST{:03}", self.id)
    }
}

/// Wire form of `lastUpdate`: `HH:MM:SS` in UTC.
fn time_of_day<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&at.format("%H:%M:%S"))
}

#[derive(Debug, Clone)]
pub struct Roster {
    version:  SnapshotVersion,
    entities: Arc<[TrackedEntity]>,
}

impl Roster {
    /// Build a fresh roster: one entity per pool name, ids 1..=n in pool
    /// order, each at a uniformly drawn catalog location.
    pub fn generate(pool: &NamePool, rng: &mut TrackerRng, now: DateTime<Utc>) -> Self {
        let entities: Vec<TrackedEntity> = pool
            .iter()
            .enumerate()
            .map(|(i, name)| TrackedEntity {
                id:          i as EntityId + 1,
                name:        name.to_string(),
                location:    *rng.pick(&LOCATION_CATALOG),
                last_update: now,
            })
            .collect();

        log::debug!("generated roster of {} entities", entities.len());
        Self::from_entities(entities)
    }

    /// Wrap pre-built entities as a version-0 snapshot.
    pub fn from_entities(entities: Vec<TrackedEntity>) -> Self {
        Self { version: 0, entities: entities.into() }
    }

    /// The next snapshot in this roster's history. Size and order are the
    /// caller's responsibility; `LocationMutator` maps one-to-one.
    pub(crate) fn successor(&self, entities: Vec<TrackedEntity>) -> Self {
        debug_assert_eq!(entities.len(), self.entities.len());
        Self { version: self.version + 1, entities: entities.into() }
    }

    /// Number of mutations applied since generation.
    pub fn version(&self) -> SnapshotVersion {
        self.version
    }

    pub fn entities(&self) -> &[TrackedEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&TrackedEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn counts(&self) -> LocationCounts {
        LocationCounts::tally(self.entities.iter().map(|e| e.location))
    }

    /// True when both handles point at the same snapshot.
    pub fn same_snapshot(a: &Roster, b: &Roster) -> bool {
        Arc::ptr_eq(&a.entities, &b.entities)
    }
}

impl Serialize for Roster {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entities.iter())
    }
}
