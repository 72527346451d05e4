//! Snapshot types: the complete visible state emitted after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::{Alliance, AssetType, Formation, GamePhase, SquadOrder, UnitStatus};
use crate::types::{Point, SimTime};

/// Complete simulation state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub wave_number: u32,
    pub units: Vec<UnitView>,
    pub squads: Vec<SquadView>,
    pub score: ScoreView,
}

/// A single unit's externally visible state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitView {
    pub id: String,
    pub name: String,
    pub alliance: Alliance,
    pub asset_type: AssetType,
    pub position: Point,
    pub heading: f64,
    pub speed: f64,
    pub health: f64,
    pub max_health: f64,
    pub health_fraction: f64,
    pub status: UnitStatus,
    pub fsm_state: String,
    pub squad_id: Option<String>,
    pub detected: bool,
    pub morale: f64,
    pub degradation: f64,
    pub kills: u32,
}

/// A squad's externally visible state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadView {
    pub id: String,
    pub member_ids: Vec<String>,
    pub leader_id: Option<String>,
    pub formation: Formation,
    pub cohesion: f64,
    pub shared_target_id: Option<String>,
    pub last_order: Option<SquadOrder>,
}

/// Running tally for display and end-of-wave bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub friendlies_remaining: u32,
    pub hostiles_remaining: u32,
    pub hostiles_eliminated: u32,
    pub friendlies_lost: u32,
    pub waves_completed: u32,
}
