//! Simulation clock: tick counter, running state, and the wall-clock source.

use crate::types::{RunId, Tick};
use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// Source of wall-clock time. Injected so tests control `lastUpdate`.
pub trait WallClock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    instant: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { instant: Rc::new(Cell::new(start)) }
    }

    pub fn advance(&self, by: Duration) {
        self.instant.set(self.instant.get() + by);
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant.get()
    }
}

/// `HH:MM:SS` in the host's local zone, for operator-facing output.
/// Wire snapshots stay UTC so peers see the same string on any host.
pub fn local_time_of_day(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
    pub state:        SimState,
    /// Time of the last roster generation or tick.
    pub last_update:  DateTime<Utc>,
}

impl SimClock {
    pub fn new(run_id: RunId, now: DateTime<Utc>) -> Self {
        Self {
            run_id,
            current_tick: 0,
            state: SimState::Stopped,
            last_update: now,
        }
    }

    /// Advance one tick. Returns the new tick number.
    /// Panics if called while stopped; callers must check.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Tick {
        assert!(self.is_running(), "advance() called on stopped clock");
        self.current_tick += 1;
        self.last_update = self.last_update.max(now);
        self.current_tick
    }

    pub fn is_running(&self) -> bool {
        self.state == SimState::Running
    }

    pub fn stop(&mut self)  { self.state = SimState::Stopped; }
    pub fn start(&mut self) { self.state = SimState::Running; }
}
