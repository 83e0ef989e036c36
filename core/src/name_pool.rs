//! The fixed pool of display names a roster is built from.
//!
//! The pool's order is the roster's order: entity `i` (1-based) always
//! carries the pool's `i-1`th name.

use crate::rng::TrackerRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Largest pool `NamePool::synthetic` can fill with distinct names.
pub const SYNTHETIC_NAME_CAPACITY: usize = FIRST_NAMES.len() * LAST_NAMES.len();

/// Ordered, non-empty list of display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamePool {
    names: Vec<String>,
}

impl NamePool {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { names: names.into_iter().map(Into::into).collect() }
    }

    /// `n` distinct synthetic full names, deterministic for a given stream.
    /// Backs `synthetic_students` for rosters larger than the default class.
    /// Panics past `SYNTHETIC_NAME_CAPACITY`; config validation rejects that.
    pub fn synthetic(rng: &mut TrackerRng, n: usize) -> Self {
        assert!(
            n <= SYNTHETIC_NAME_CAPACITY,
            "at most {SYNTHETIC_NAME_CAPACITY} distinct synthetic names"
        );

        let mut seen = HashSet::with_capacity(n);
        let mut names = Vec::with_capacity(n);
        while names.len() < n {
            let name = format!("{} {}", rng.pick(FIRST_NAMES), rng.pick(LAST_NAMES));
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// First name that appears more than once, if any.
    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.iter().find(|name| !seen.insert(*name))
    }
}

impl Default for NamePool {
    /// The demo class of ten students.
    fn default() -> Self {
        Self::new([
            "Alice Johnson",
            "Bob Smith",
            "Carol Davis",
            "David Wilson",
            "Emma Brown",
            "Frank Garcia",
            "Grace Lee",
            "Henry Martinez",
            "Ivy Chen",
            "Jack Thompson",
        ])
    }
}

const FIRST_NAMES: &[&str] = &[
    "Amara", "Ben", "Chloe", "Dev", "Elena", "Felix", "Gita", "Hugo",
    "Isla", "Jonah", "Keiko", "Liam", "Maya", "Nico", "Olive", "Priya",
    "Quinn", "Rosa", "Sami", "Theo",
];

const LAST_NAMES: &[&str] = &[
    "Adams", "Baker", "Cruz", "Dubois", "Evans", "Fischer", "Gupta", "Hall",
    "Ito", "Jensen", "Khan", "Lopez", "Moreau", "Nakamura", "Okafor", "Park",
    "Quispe", "Reyes", "Silva", "Tanaka",
];
