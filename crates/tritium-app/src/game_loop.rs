//! Game loop thread — owns the simulation engine and ticks it at
//! `TICK_RATE_HZ`, publishing each snapshot and forwarding bus events
//! to the tracing log.
//!
//! The engine is created inside this thread because it's cleaner for
//! ownership. Commands arrive via an `mpsc` channel.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tritium_core::config::SimConfig;
use tritium_core::constants::TICK_RATE_HZ;
use tritium_core::state::Snapshot;
use tritium_sim::SimulationEngine;

use crate::state::GameLoopCommand;

/// Nominal duration of one tick.
const TICK_DURATION: Duration = Duration::from_nanos((1_000_000_000.0 / TICK_RATE_HZ) as u64);

/// Spawns the game loop in a new thread. Returns the command sender
/// the caller uses to drive the simulation.
pub fn spawn_game_loop(latest_snapshot: Arc<Mutex<Option<Snapshot>>>) -> mpsc::Sender<GameLoopCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    std::thread::Builder::new()
        .name("tritium-game-loop".into())
        .spawn(move || {
            run_game_loop(cmd_rx, &latest_snapshot);
        })
        .expect("failed to spawn game loop thread");

    cmd_tx
}

/// The game loop. Runs until a `Shutdown` command or channel disconnect.
fn run_game_loop(cmd_rx: mpsc::Receiver<GameLoopCommand>, latest_snapshot: &Mutex<Option<Snapshot>>) {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let events = engine.subscribe();
    let mut next_tick_time = Instant::now();

    loop {
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Sim(command)) => engine.queue_command(command),
                Ok(GameLoopCommand::Shutdown) => return,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        let snapshot = engine.tick();

        while let Ok(event) = events.try_recv() {
            tracing::debug!(kind = event.kind(), "event published");
        }

        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tritium_core::commands::Command;
    use tritium_core::enums::GamePhase;

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::Sim(Command::Start)).unwrap();
        tx.send(GameLoopCommand::Sim(Command::Stop)).unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], GameLoopCommand::Sim(Command::Start)));
        assert!(matches!(commands[1], GameLoopCommand::Sim(Command::Stop)));
        assert!(matches!(commands[2], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_snapshot_serializes_quickly() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        engine.queue_command(Command::Start);
        for _ in 0..50 {
            engine.tick();
        }
        let snapshot = engine.tick();
        let start = std::time::Instant::now();
        let json = serde_json::to_string(&snapshot).unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed < Duration::from_millis(10), "serialization took {elapsed:?}");
        assert!(!json.is_empty());
    }

    #[test]
    fn test_stop_halts_tick_advance() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        engine.queue_command(Command::Start);
        let snap = engine.tick();
        assert_eq!(snap.phase, GamePhase::Active);

        engine.queue_command(Command::Stop);
        let snap = engine.tick();
        assert_eq!(snap.phase, GamePhase::Paused);
        let paused_tick = snap.time.tick;

        let snap = engine.tick();
        assert_eq!(snap.time.tick, paused_tick);

        engine.queue_command(Command::Start);
        let snap = engine.tick();
        assert_eq!(snap.phase, GamePhase::Active);
        assert!(snap.time.tick > paused_tick);
    }

    #[test]
    fn test_tick_duration_matches_configured_rate() {
        let expected_nanos = (1_000_000_000.0 / TICK_RATE_HZ) as u64;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }
}
