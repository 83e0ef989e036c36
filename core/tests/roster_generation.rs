//! Roster generation properties across many seeds.

use chrono::{TimeZone, Utc};
use rfid_tracker_core::{
    name_pool::NamePool,
    rng::{RngBank, StreamSlot},
    Location, Roster, LOCATION_CATALOG,
};
use std::collections::HashSet;

#[test]
fn generated_rosters_satisfy_invariants() {
    let now = Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap();

    for seed in 0..200u64 {
        let bank = RngBank::new(seed);
        let pools = [
            NamePool::default(),
            NamePool::synthetic(&mut bank.for_stream(StreamSlot::Names), 37),
        ];

        for pool in &pools {
            let roster = Roster::generate(pool, &mut bank.for_stream(StreamSlot::Roster), now);

            assert_eq!(roster.len(), pool.len(), "seed {seed}: wrong roster size");

            let ids: HashSet<u32> = roster.entities().iter().map(|e| e.id).collect();
            assert_eq!(ids.len(), roster.len(), "seed {seed}: duplicate ids");
            assert!(
                ids.iter().all(|id| (1..=pool.len() as u32).contains(id)),
                "seed {seed}: id out of range"
            );
            assert!(roster
                .entities()
                .iter()
                .all(|e| LOCATION_CATALOG.contains(&e.location) && e.last_update == now));
        }
    }
}

#[test]
fn starting_locations_are_roughly_uniform() {
    let now = Utc::now();
    let mut seen = [0usize; 5];

    for seed in 0..200u64 {
        let mut rng = RngBank::new(seed).for_stream(StreamSlot::Roster);
        let roster = Roster::generate(&NamePool::default(), &mut rng, now);
        for entity in roster.entities() {
            seen[entity.location.index()] += 1;
        }
    }

    // 2000 draws, expected 400 per location, sd ~18.
    for location in LOCATION_CATALOG {
        let n = seen[location.index()];
        assert!(
            (300..=500).contains(&n),
            "{location} drawn {n} times out of 2000"
        );
    }
}

#[test]
fn first_entity_is_alice() {
    let mut rng = RngBank::new(1).for_stream(StreamSlot::Roster);
    let roster = Roster::generate(&NamePool::default(), &mut rng, Utc::now());
    let alice = roster.get(1).expect("id 1 exists");
    assert_eq!(alice.name, "Alice Johnson");
    assert_eq!(alice.badge(), "ST001");
    assert!(Location::from_label(alice.location.label()).is_some());
}
