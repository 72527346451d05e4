//! Operator-facing simulation configuration.
//!
//! Every field defaults to the corresponding [`crate::constants`] value;
//! an operator overrides only what they need to change, typically by
//! deserializing a partial JSON/TOML document over `SimConfig::default()`.

use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub tick_rate_hz: f64,
    pub snapshot_rate_hz: f64,
    pub map_bounds: f64,
    pub terrain_resolution: f64,
    pub squad_radius: f64,
    pub formation_spacing: f64,
    pub order_timeout_s: f64,
    /// Radius within which an elimination shifts the morale of nearby
    /// units. Not pinned down by the source material; kept tunable.
    pub morale_proximity_radius: f64,
    pub swarm_max_force: f64,
    pub replay_max_frames: usize,
    /// Deterministic PRNG seed; two engines built with the same seed
    /// and the same command stream produce identical snapshots.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: constants::TICK_RATE_HZ,
            snapshot_rate_hz: constants::SNAPSHOT_RATE_HZ,
            map_bounds: constants::MAP_BOUNDS,
            terrain_resolution: constants::TERRAIN_RESOLUTION,
            squad_radius: constants::SQUAD_RADIUS,
            formation_spacing: constants::FORMATION_SPACING,
            order_timeout_s: constants::ORDER_TIMEOUT_S,
            morale_proximity_radius: constants::MORALE_PROXIMITY_RADIUS,
            swarm_max_force: constants::SWARM_MAX_FORCE,
            replay_max_frames: constants::REPLAY_MAX_FRAMES,
            seed: 0,
        }
    }
}

impl SimConfig {
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }
}
