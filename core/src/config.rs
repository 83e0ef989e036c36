use crate::{
    error::{TrackerError, TrackerResult},
    mutator::DEFAULT_MOVE_PROBABILITY,
    name_pool::{NamePool, SYNTHETIC_NAME_CAPACITY},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TICK_PERIOD_MS: u64 = 3000;
pub const DEFAULT_RELAY_URL: &str = "ws://localhost:8081";

/// Tracker settings. Every field has a default, so a config file may name
/// only what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Per-entity, per-tick probability of redrawing a location.
    pub move_probability: f64,
    pub tick_period_ms:   u64,
    pub relay_url:        String,
    /// Master seed. `None` seeds from OS entropy.
    pub seed:             Option<u64>,
    pub names:            NamePool,
    /// Generate this many synthetic names instead of using `names`.
    pub synthetic_students: Option<usize>,
    /// Push the roster to the relay after every tick.
    pub relay_on_tick:    bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            move_probability: DEFAULT_MOVE_PROBABILITY,
            tick_period_ms:   DEFAULT_TICK_PERIOD_MS,
            relay_url:        DEFAULT_RELAY_URL.to_string(),
            seed:             None,
            names:            NamePool::default(),
            synthetic_students: None,
            relay_on_tick:    false,
        }
    }
}

impl TrackerConfig {
    /// Load a JSON config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> TrackerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TrackerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TrackerConfig =
            serde_json::from_str(&content).map_err(|source| TrackerError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with a fixed seed, for tests.
    pub fn default_test() -> Self {
        Self { seed: Some(42), ..Self::default() }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        if !(0.0..=1.0).contains(&self.move_probability) {
            return Err(TrackerError::InvalidConfig {
                field:  "move_probability",
                reason: format!("{} is outside [0, 1]", self.move_probability),
            });
        }
        if self.tick_period_ms == 0 {
            return Err(TrackerError::InvalidConfig {
                field:  "tick_period_ms",
                reason: "must be positive".into(),
            });
        }
        if let Some(n) = self.synthetic_students {
            if n == 0 || n > SYNTHETIC_NAME_CAPACITY {
                return Err(TrackerError::InvalidConfig {
                    field:  "synthetic_students",
                    reason: format!("{n} is outside 1..={SYNTHETIC_NAME_CAPACITY}"),
                });
            }
        }
        if self.names.is_empty() {
            return Err(TrackerError::InvalidConfig {
                field:  "names",
                reason: "name pool is empty".into(),
            });
        }
        if let Some(name) = self.names.first_duplicate() {
            return Err(TrackerError::InvalidConfig {
                field:  "names",
                reason: format!("duplicate name '{name}'"),
            });
        }
        Ok(())
    }
}
