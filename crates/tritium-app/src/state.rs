//! Shared state between the demo binary and the game loop thread.

use std::sync::{Arc, Mutex};

use tritium_core::commands::Command;
use tritium_core::state::Snapshot;

/// Messages sent from the caller into the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A command to forward to the simulation engine.
    Sim(Command),
    /// Shut down the loop thread gracefully.
    Shutdown,
}

/// State shared between the thread that owns the engine and whoever is
/// polling it for the latest tick. `latest_snapshot` is the synchronous
/// read path; subscribing to the engine's event bus is the push path.
pub struct AppState {
    pub latest_snapshot: Arc<Mutex<Option<Snapshot>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self { latest_snapshot: Arc::new(Mutex::new(None)) }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.latest_snapshot.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_starts_empty() {
        let state = AppState::new();
        assert!(state.snapshot().is_none());
    }
}
