//! Simulated RFID presence tracking for a school: a roster of students
//! whose locations drift on a timer, plus a WebSocket relay for snapshots.

pub mod clock;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod location;
pub mod mutator;
pub mod name_pool;
pub mod relay;
pub mod rng;
pub mod roster;
pub mod types;

pub use command::ControlCommand;
pub use config::TrackerConfig;
pub use controller::SimulationController;
pub use error::{TrackerError, TrackerResult};
pub use location::{Location, LocationCounts, LOCATION_CATALOG};
pub use relay::{ChannelState, RelayChannel, SendOutcome};
pub use roster::{Roster, TrackedEntity};
