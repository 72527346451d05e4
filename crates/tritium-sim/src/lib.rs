//! Simulation engine for TRITIUM-SC.
//!
//! Owns the hecs ECS world, runs systems at a fixed 10 Hz tick rate,
//! and produces `Snapshot`s for the frontend or a headless demo loop.

pub mod engine;
pub mod event_bus;
pub mod replay;
pub mod spectator;
pub mod systems;
pub mod world_setup;

pub use tritium_core as core;
pub use engine::SimulationEngine;
