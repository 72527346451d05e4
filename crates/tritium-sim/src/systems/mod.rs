//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are pure functions that take `&mut World` (or `&World` for read-only).
//! They do not own state — all state lives in components, or in the small
//! per-system managers (`SquadManager`, `WaveSchedule`, `UpgradeSystem`) owned
//! by the engine and threaded through explicitly.

pub mod behavior;
pub mod cleanup;
pub mod combat;
pub mod cover;
pub mod degradation;
pub mod morale;
pub mod movement;
pub mod pursuit;
pub mod snapshot;
pub mod spatial;
pub mod squads;
pub mod swarm_controller;
pub mod upgrades;
pub mod wave_spawner;
