//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Affiliation tag controlling hostility relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alliance {
    Friendly,
    Hostile,
    Neutral,
}

/// Unit archetype. Determines default stats, behavior dispatch, and
/// terrain/flight overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Turret,
    Rover,
    Drone,
    Person,
    SwarmDrone,
    Tank,
    Apc,
}

impl AssetType {
    /// Movement category used to route an active combatant to exactly
    /// one behavior each tick.
    pub fn category(self) -> MovementCategory {
        match self {
            AssetType::Turret => MovementCategory::Stationary,
            AssetType::Rover | AssetType::Tank | AssetType::Apc => MovementCategory::Ground,
            AssetType::Drone | AssetType::SwarmDrone => MovementCategory::Air,
            AssetType::Person => MovementCategory::Foot,
        }
    }

    /// Flying types ignore terrain movement cost entirely.
    pub fn is_flying(self) -> bool {
        matches!(self.category(), MovementCategory::Air)
    }
}

/// The category `Unit::asset_type` maps to for behavior dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementCategory {
    Stationary,
    Ground,
    Air,
    Foot,
}

/// Unit lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Active,
    Idle,
    Stationary,
    Eliminated,
    Destroyed,
    Neutralized,
    Spawning,
}

impl UnitStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UnitStatus::Eliminated | UnitStatus::Destroyed | UnitStatus::Neutralized
        )
    }
}

/// Squad formation shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formation {
    Wedge,
    Line,
    Column,
    Circle,
}

/// Order a squad leader issues to its followers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SquadOrder {
    Advance,
    Hold,
    FlankLeft,
    FlankRight,
    Retreat,
}

/// Terrain cell type. Drives movement cost, cover, and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    Road,
    Building,
    Yard,
    Open,
    Water,
}

impl TerrainType {
    /// `(movement_cost, cover_value, visibility)`. `movement_cost` of
    /// `f64::INFINITY` marks the cell impassable to ground units.
    pub fn properties(self) -> (f64, f64, f64) {
        match self {
            TerrainType::Road => (0.7, 0.0, 1.0),
            TerrainType::Building => (f64::INFINITY, 0.5, 0.0),
            TerrainType::Yard => (1.0, 0.1, 0.8),
            TerrainType::Open => (1.0, 0.0, 1.0),
            TerrainType::Water => (f64::INFINITY, 0.0, 1.0),
        }
    }
}

/// Engine top-level run phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Idle,
    Active,
    Paused,
    Complete,
}

/// Ability effect kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    SpeedBoost,
    Repair,
    Shield,
    Emp,
    Overclock,
}
