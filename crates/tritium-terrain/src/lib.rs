//! Terrain system for TRITIUM-SC.
//!
//! A synthetic cell grid over the battlespace, painted from building
//! footprints and road centerlines, driving movement cost, cover, and
//! line-of-sight.

pub use tritium_core as core;

pub mod grid;
pub mod los;

pub use grid::{Building, RoadSegment, TerrainMap};
pub use los::has_line_of_sight;
