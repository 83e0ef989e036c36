//! The closed location catalog and per-location aggregates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every place a tag reader can report. Closed set; order is display order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Location {
    #[serde(rename = "Outside Area")]
    OutsideArea,
    #[serde(rename = "School Bus")]
    SchoolBus,
    Classroom,
    Toilet,
    Canteen,
}

pub const LOCATION_COUNT: usize = 5;

/// The LocationCatalog, in display order.
pub const LOCATION_CATALOG: [Location; LOCATION_COUNT] = [
    Location::OutsideArea,
    Location::SchoolBus,
    Location::Classroom,
    Location::Toilet,
    Location::Canteen,
];

impl Location {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OutsideArea => "Outside Area",
            Self::SchoolBus   => "School Bus",
            Self::Classroom   => "Classroom",
            Self::Toilet      => "Toilet",
            Self::Canteen     => "Canteen",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::OutsideArea => "🌳",
            Self::SchoolBus   => "🚌",
            Self::Classroom   => "📚",
            Self::Toilet      => "🚻",
            Self::Canteen     => "🍽️",
        }
    }

    /// Position in LOCATION_CATALOG.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_label(label: &str) -> Option<Self> {
        LOCATION_CATALOG.iter().copied().find(|l| l.label() == label)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Headcount per catalog location. Empty locations count zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationCounts {
    counts: [usize; LOCATION_COUNT],
}

impl LocationCounts {
    pub fn tally<I>(locations: I) -> Self
    where
        I: IntoIterator<Item = Location>,
    {
        let mut counts = [0usize; LOCATION_COUNT];
        for location in locations {
            counts[location.index()] += 1;
        }
        Self { counts }
    }

    pub fn get(&self, location: Location) -> usize {
        self.counts[location.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// (location, count) pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (Location, usize)> + '_ {
        LOCATION_CATALOG.iter().map(move |l| (*l, self.counts[l.index()]))
    }
}

impl Serialize for LocationCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(LOCATION_COUNT))?;
        for (location, count) in self.iter() {
            map.serialize_entry(location.label(), &count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_index_matches_position() {
        for (i, location) in LOCATION_CATALOG.iter().enumerate() {
            assert_eq!(location.index(), i);
        }
    }

    #[test]
    fn serde_uses_display_labels() {
        for location in LOCATION_CATALOG {
            let json = serde_json::to_string(&location).unwrap();
            assert_eq!(json, format!("\"{}\"", location.label()));
            let back: Location = serde_json::from_str(&json).unwrap();
            assert_eq!(back, location);
        }
    }

    #[test]
    fn from_label_rejects_unknown() {
        assert_eq!(Location::from_label("School Bus"), Some(Location::SchoolBus));
        assert_eq!(Location::from_label("Gym"), None);
    }

    #[test]
    fn counts_include_empty_locations() {
        let counts = LocationCounts::tally([Location::Canteen, Location::Canteen, Location::Toilet]);
        assert_eq!(counts.get(Location::Canteen), 2);
        assert_eq!(counts.get(Location::Toilet), 1);
        assert_eq!(counts.get(Location::Classroom), 0);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.iter().count(), 5);

        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["Outside Area"], 0);
        assert_eq!(json["Canteen"], 2);
    }
}
