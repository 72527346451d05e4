//! Events published on the engine's event bus.

use serde::{Deserialize, Serialize};

use crate::enums::Alliance;
use crate::enums::AssetType;
use crate::types::Point;

/// All event payloads the engine publishes. Replay recording filters
/// this set down to the subset it archives (see
/// `tritium_sim::replay::REPLAY_EVENT_TYPES`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    ProjectileFired {
        shooter_id: String,
        target_id: String,
        hit: bool,
        damage: f64,
        aim: Point,
    },
    ProjectileHit {
        shooter_id: String,
        target_id: String,
        damage: f64,
    },
    TargetEliminated {
        target_id: String,
        by_id: String,
        alliance: Alliance,
        asset_type: AssetType,
        position: Point,
    },
    UnitDestroyed {
        target_id: String,
    },
    WeaponJam {
        target_id: String,
        name: String,
        degradation: f64,
    },
    StateChange {
        target_id: String,
        fsm_state: String,
    },
    WaveStart {
        wave_number: u32,
    },
    WaveComplete {
        wave_number: u32,
    },
    GameOver {
        victory: bool,
    },
}

impl SimEvent {
    /// The `type` discriminant serde would emit, useful for filtering
    /// without round-tripping through JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::ProjectileFired { .. } => "projectile_fired",
            SimEvent::ProjectileHit { .. } => "projectile_hit",
            SimEvent::TargetEliminated { .. } => "target_eliminated",
            SimEvent::UnitDestroyed { .. } => "unit_destroyed",
            SimEvent::WeaponJam { .. } => "weapon_jam",
            SimEvent::StateChange { .. } => "state_change",
            SimEvent::WaveStart { .. } => "wave_start",
            SimEvent::WaveComplete { .. } => "wave_complete",
            SimEvent::GameOver { .. } => "game_over",
        }
    }
}
