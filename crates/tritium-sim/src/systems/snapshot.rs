//! Snapshot system: queries the ECS world and builds a complete
//! [`Snapshot`]. Read-only — never modifies the world.

use hecs::World;

use tritium_core::components::Unit;
use tritium_core::enums::{Alliance, GamePhase};
use tritium_core::state::{ScoreView, Snapshot, SquadView, UnitView};
use tritium_core::types::SimTime;

use crate::engine::ScoreState;
use crate::systems::squads::SquadManager;

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    wave_number: u32,
    squads: &SquadManager,
    score: &ScoreState,
) -> Snapshot {
    let units = build_units(world);
    let friendlies_remaining = units.iter().filter(|u| u.alliance == Alliance::Friendly).count() as u32;
    let hostiles_remaining = units.iter().filter(|u| u.alliance == Alliance::Hostile).count() as u32;

    Snapshot {
        time: *time,
        phase,
        wave_number,
        units,
        squads: build_squads(squads),
        score: ScoreView {
            friendlies_remaining,
            hostiles_remaining,
            hostiles_eliminated: score.hostiles_eliminated,
            friendlies_lost: score.friendlies_lost,
            waves_completed: score.waves_completed,
        },
    }
}

fn build_units(world: &World) -> Vec<UnitView> {
    let mut units: Vec<UnitView> = world
        .query::<&Unit>()
        .iter()
        .map(|(_, u)| UnitView {
            id: u.id.clone(),
            name: u.name.clone(),
            alliance: u.alliance,
            asset_type: u.asset_type,
            position: u.position,
            heading: u.heading,
            speed: u.speed,
            health: u.health,
            max_health: u.max_health,
            health_fraction: u.health_fraction(),
            status: u.status,
            fsm_state: u.fsm_state.clone(),
            squad_id: u.squad_id.clone(),
            detected: u.detected,
            morale: u.morale,
            degradation: u.degradation,
            kills: u.kills,
        })
        .collect();
    units.sort_by(|a, b| a.id.cmp(&b.id));
    units
}

fn build_squads(squads: &SquadManager) -> Vec<SquadView> {
    let mut views: Vec<SquadView> = squads
        .squads()
        .map(|s| SquadView {
            id: s.id.clone(),
            member_ids: s.member_ids.clone(),
            leader_id: s.leader_id.clone(),
            formation: s.formation,
            cohesion: s.cohesion,
            shared_target_id: s.shared_target_id.clone(),
            last_order: s.last_order,
        })
        .collect();
    views.sort_by(|a, b| a.id.cmp(&b.id));
    views
}
