//! Headless demo harness for the simulation engine.
//!
//! Wires together the core types and the simulation crate behind a
//! worker thread so a caller (the demo binary, or an embedding
//! application) can drive the engine through a command channel and
//! poll its latest snapshot without touching `hecs` or the tick loop
//! directly.

pub mod game_loop;
pub mod state;

pub use tritium_core as core;
