//! Behavior AI for TRITIUM-SC.
//!
//! Per-asset-type combat behaviors, pursuit target selection, and
//! swarm-drone flocking. Every function here is pure: it takes a
//! context struct and returns a decision, with no ECS dependency.

pub mod behavior;
pub mod pursuit;
pub mod swarm;

pub use tritium_core as core;
