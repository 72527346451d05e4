//! Commands sent into the simulation from outside.
//!
//! Commands are validated and applied at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::{Alliance, AssetType, SquadOrder};
use crate::types::Point;

/// Parameters for spawning a new unit. Fields left at their `Default`
/// match a sensible unarmed stationary placeholder; callers normally
/// override `alliance`/`asset_type`/`position` at minimum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpawn {
    /// Caller-supplied id; the engine generates one if omitted.
    pub id: Option<String>,
    pub name: String,
    pub alliance: Alliance,
    pub asset_type: AssetType,
    pub position: Point,
    #[serde(default)]
    pub heading: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub waypoints: Vec<Point>,
    pub max_health: f64,
    #[serde(default)]
    pub weapon_range: f64,
    #[serde(default)]
    pub weapon_cooldown: f64,
    #[serde(default)]
    pub weapon_damage: f64,
    #[serde(default)]
    pub squad_id: Option<String>,
}

/// A wave of hostile reinforcements queued to spawn together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveSpec {
    pub wave_number: u32,
    pub spawns: Vec<UnitSpawn>,
}

/// All inbound commands the engine accepts, applied before the tick's
/// systems run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Spawn { definition: UnitSpawn },
    Despawn { unit_id: String },
    ApplyUpgrade { unit_id: String, upgrade_id: String },
    UseAbility { unit_id: String, ability_id: String },
    IssueOrder { squad_id: String, order: SquadOrder },
    SetWaypoints { unit_id: String, waypoints: Vec<Point> },
    BeginWave { spec: WaveSpec },
    Reset,
    Start,
    Stop,
}
