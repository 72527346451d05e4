//! Headless demo: stands up a simulation engine on its own thread,
//! queues a couple of friendlies and a wave of hostiles, then drives
//! the loop for a fixed number of ticks, logging each snapshot.

use std::time::Duration;

use tritium_app::game_loop;
use tritium_app::state::{AppState, GameLoopCommand};
use tritium_core::commands::{Command, UnitSpawn, WaveSpec};
use tritium_core::enums::{Alliance, AssetType};
use tritium_core::types::Point;

const DEMO_TICKS: u32 = 100;

fn main() {
    tracing_subscriber::fmt::init();

    let state = AppState::new();
    let cmd_tx = game_loop::spawn_game_loop(state.latest_snapshot.clone());

    cmd_tx.send(GameLoopCommand::Sim(Command::Start)).expect("game loop thread gone");
    cmd_tx
        .send(GameLoopCommand::Sim(Command::Spawn {
            definition: UnitSpawn {
                id: Some("turret-1".into()),
                name: "North Turret".into(),
                alliance: Alliance::Friendly,
                asset_type: AssetType::Turret,
                position: Point::new(0.0, 0.0),
                heading: 0.0,
                speed: 0.0,
                waypoints: Vec::new(),
                max_health: 150.0,
                weapon_range: 40.0,
                weapon_cooldown: 0.8,
                weapon_damage: 12.0,
                squad_id: None,
            },
        }))
        .unwrap();
    cmd_tx
        .send(GameLoopCommand::Sim(Command::BeginWave {
            spec: WaveSpec {
                wave_number: 1,
                spawns: vec![UnitSpawn {
                    id: Some("hostile-1".into()),
                    name: "Approaching Squad".into(),
                    alliance: Alliance::Hostile,
                    asset_type: AssetType::Person,
                    position: Point::new(-120.0, 60.0),
                    heading: 180.0,
                    speed: 1.4,
                    waypoints: vec![Point::new(0.0, 0.0)],
                    max_health: 30.0,
                    weapon_range: 15.0,
                    weapon_cooldown: 1.5,
                    weapon_damage: 6.0,
                    squad_id: None,
                }],
            },
        }))
        .unwrap();

    for tick in 0..DEMO_TICKS {
        std::thread::sleep(Duration::from_millis(5));
        if let Some(snapshot) = state.snapshot() {
            tracing::info!(
                tick,
                sim_tick = snapshot.time.tick,
                units = snapshot.units.len(),
                hostiles_eliminated = snapshot.score.hostiles_eliminated,
                "snapshot"
            );
        }
    }

    cmd_tx.send(GameLoopCommand::Shutdown).ok();
}
