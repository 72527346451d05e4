//! The `Unit` ECS component and the markers attached alongside it.
//!
//! A `Unit` is a `hecs` component, not a free-standing struct managed
//! outside the world: the engine spawns one entity per unit and stores
//! its full state in a single `Unit` component, queried and mutated by
//! each tick system in turn.

use serde::{Deserialize, Serialize};

use crate::enums::{Alliance, AssetType, UnitStatus};
use crate::types::Point;

/// The central simulated entity: a turret, rover, drone, hostile
/// person, swarm drone, tank, or APC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,

    pub alliance: Alliance,
    pub asset_type: AssetType,
    pub is_combatant: bool,

    pub position: Point,
    /// Degrees, 0 = north, clockwise.
    pub heading: f64,
    /// Scalar speed in m/s along `heading`.
    pub speed: f64,
    pub waypoints: Vec<Point>,
    pub waypoint_index: usize,

    pub max_health: f64,
    pub health: f64,
    pub weapon_range: f64,
    pub weapon_cooldown: f64,
    pub weapon_damage: f64,
    /// Simulation time (seconds) this unit last fired.
    pub last_fired: f64,
    pub kills: u32,

    pub fsm_state: String,
    pub status: UnitStatus,

    pub squad_id: Option<String>,
    pub detected: bool,
    pub morale: f64,
    pub degradation: f64,
    /// Transient per-tick speed multiplier set by the behavior
    /// coordinator (group rush, detected boost); consumed by the
    /// movement system and not itself persisted across ticks.
    pub speed_multiplier: f64,
}

impl Unit {
    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn current_waypoint(&self) -> Option<Point> {
        self.waypoints.get(self.waypoint_index).copied()
    }

    /// Apply flat damage, clamping health to `[0, max_health]`. Returns
    /// true the first time health crosses zero (the caller is
    /// responsible for the resulting status transition).
    pub fn apply_damage(&mut self, amount: f64) -> bool {
        let was_alive = self.health > 0.0;
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        was_alive && self.health <= 0.0
    }
}
