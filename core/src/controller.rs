//! The simulation controller: owns the roster, its RNG streams, and the
//! recurring tick schedule.
//!
//! LIFECYCLE:
//!   - Construction generates a roster immediately and leaves the
//!     controller Stopped.
//!   - start() arms one fixed-period schedule; a second start() is a no-op.
//!   - stop() drops the schedule, which cancels it synchronously.
//!   - reset() stops and replaces the roster wholesale under a new run id.
//!
//! RULES:
//!   - Ticks are applied synchronously; nothing awaits mid-mutation.
//!   - All randomness flows through the RngBank.
//!   - A tick always produces a new roster snapshot.

use crate::{
    clock::{SimClock, SimState, SystemClock, WallClock},
    config::TrackerConfig,
    error::TrackerResult,
    event::TrackerEvent,
    location::LocationCounts,
    mutator::LocationMutator,
    name_pool::NamePool,
    rng::{RngBank, StreamSlot, TrackerRng},
    roster::Roster,
    types::{RunId, Tick},
};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

pub struct SimulationController {
    clock:        SimClock,
    rng_bank:     RngBank,
    roster_rng:   TrackerRng,
    mutation_rng: TrackerRng,
    wall:         Box<dyn WallClock>,
    names:        NamePool,
    mutator:      LocationMutator,
    period:       Duration,
    roster:       Roster,
    schedule:     Option<Interval>,
}

impl SimulationController {
    /// Expects a validated config; see `build`.
    pub fn new(config: &TrackerConfig, rng_bank: RngBank, wall: Box<dyn WallClock>) -> Self {
        let names = match config.synthetic_students {
            Some(n) => NamePool::synthetic(&mut rng_bank.for_stream(StreamSlot::Names), n),
            None => config.names.clone(),
        };
        let mut roster_rng = rng_bank.for_stream(StreamSlot::Roster);
        let now = wall.now();
        let roster = Roster::generate(&names, &mut roster_rng, now);
        let run_id = new_run_id();

        log::info!(
            "controller created: run={run_id} seed={} entities={}",
            rng_bank.master_seed(),
            roster.len()
        );

        Self {
            clock:        SimClock::new(run_id, now),
            mutation_rng: rng_bank.for_stream(StreamSlot::Mutation),
            rng_bank,
            roster_rng,
            wall,
            names,
            mutator:      LocationMutator::new(config.move_probability),
            period:       config.tick_period(),
            roster,
            schedule:     None,
        }
    }

    /// Validate the config and wire a controller against the system clock.
    pub fn build(config: &TrackerConfig) -> TrackerResult<Self> {
        config.validate()?;
        let bank = match config.seed {
            Some(seed) => RngBank::new(seed),
            None => RngBank::from_entropy(),
        };
        Ok(Self::new(config, bank, Box::new(SystemClock)))
    }

    /// Begin ticking every period. Must be called within a Tokio runtime.
    /// Returns None when already running.
    pub fn start(&mut self) -> Option<TrackerEvent> {
        if self.clock.is_running() {
            log::debug!("start() ignored: already running");
            return None;
        }

        let mut schedule = interval_at(Instant::now() + self.period, self.period);
        schedule.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.schedule = Some(schedule);
        self.clock.start();

        log::info!("simulation started at tick {}", self.clock.current_tick);
        Some(TrackerEvent::SimulationStarted {
            run_id: self.clock.run_id.clone(),
            tick:   self.clock.current_tick,
        })
    }

    /// Cancel the schedule. Returns None when already stopped.
    pub fn stop(&mut self) -> Option<TrackerEvent> {
        if !self.clock.is_running() {
            return None;
        }

        self.schedule = None;
        self.clock.stop();

        log::info!("simulation stopped at tick {}", self.clock.current_tick);
        Some(TrackerEvent::SimulationStopped {
            run_id: self.clock.run_id.clone(),
            tick:   self.clock.current_tick,
        })
    }

    /// Flip between Running and Stopped.
    pub fn toggle(&mut self) -> Option<TrackerEvent> {
        if self.clock.is_running() {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Stop, then replace the roster with a freshly generated one.
    pub fn reset(&mut self) -> Vec<TrackerEvent> {
        let mut events: Vec<TrackerEvent> = self.stop().into_iter().collect();

        let now = self.wall.now();
        self.roster = Roster::generate(&self.names, &mut self.roster_rng, now);
        self.clock = SimClock::new(new_run_id(), now);

        log::info!("roster reset: run={} entities={}", self.clock.run_id, self.roster.len());
        events.push(TrackerEvent::RosterReset {
            run_id:   self.clock.run_id.clone(),
            entities: self.roster.len(),
        });
        events
    }

    /// Wait for the next scheduled tick and apply it.
    /// Never resolves while stopped. Cancel-safe.
    pub async fn next_tick(&mut self) -> Vec<TrackerEvent> {
        match self.schedule.as_mut() {
            Some(schedule) => {
                schedule.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
        self.tick()
    }

    /// Apply n ticks back to back without waiting on the schedule.
    /// Used for batch runs and tests. The running state is restored after.
    pub fn run_ticks(&mut self, n: u64) -> Vec<TrackerEvent> {
        let was_running = self.clock.is_running();
        self.clock.start();

        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(self.tick());
        }

        if !was_running {
            self.clock.stop();
        }
        events
    }

    /// One mutation pass. Panics if called while stopped.
    fn tick(&mut self) -> Vec<TrackerEvent> {
        let now = self.wall.now();
        let current_tick = self.clock.advance(now);

        let (next, report) = self.mutator.tick(&self.roster, now, &mut self.mutation_rng);
        self.roster = next;

        log::debug!(
            "tick={current_tick} draws={} changed={}",
            report.draws,
            report.changes.len()
        );

        let mut events: Vec<TrackerEvent> = report
            .changes
            .iter()
            .map(|change| TrackerEvent::LocationChanged {
                tick: current_tick,
                id:   change.id,
                from: change.from,
                to:   change.to,
            })
            .collect();
        events.push(TrackerEvent::TickCompleted {
            tick:    current_tick,
            draws:   report.draws,
            changed: report.changes.len(),
        });
        events
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Cheap handle to the current snapshot.
    pub fn snapshot(&self) -> Roster {
        self.roster.clone()
    }

    pub fn counts(&self) -> LocationCounts {
        self.roster.counts()
    }

    pub fn state(&self) -> SimState {
        self.clock.state
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn run_id(&self) -> &RunId {
        &self.clock.run_id
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.clock.last_update
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }
}

fn new_run_id() -> RunId {
    format!("run-{}", uuid::Uuid::new_v4())
}
