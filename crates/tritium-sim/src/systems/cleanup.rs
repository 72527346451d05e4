//! Corpse collection: a unit that reached a terminal status stays in
//! the world for one more tick (so event observers see its final
//! state), then is despawned here.

use hecs::{Entity, World};

use tritium_core::components::Unit;
use tritium_core::enums::{Alliance, UnitStatus};

/// Marker attached the tick a unit goes terminal; despawn happens on
/// the following tick.
pub struct Corpse;

/// Despawn last tick's corpses, then flag this tick's fresh terminal
/// units. Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();
    for (entity, unit) in world.query_mut::<&Unit>() {
        if unit.status.is_terminal() {
            despawn_buffer.push(entity);
        }
    }
    for entity in despawn_buffer.drain(..) {
        if world.get::<&Corpse>(entity).is_ok() {
            let _ = world.despawn(entity);
        } else {
            let _ = world.insert_one(entity, Corpse);
        }
    }
}

/// Terminal status by alliance: hostile kills report `eliminated`,
/// friendly losses report `destroyed`.
pub fn terminal_status_for(alliance: Alliance) -> UnitStatus {
    match alliance {
        Alliance::Hostile => UnitStatus::Eliminated,
        _ => UnitStatus::Destroyed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tritium_core::enums::AssetType;
    use tritium_core::types::Point;

    fn unit(status: UnitStatus, alliance: Alliance) -> Unit {
        Unit {
            id: "u1".into(),
            name: "u1".into(),
            alliance,
            asset_type: AssetType::Rover,
            is_combatant: true,
            position: Point::ZERO,
            heading: 0.0,
            speed: 1.0,
            waypoints: Vec::new(),
            waypoint_index: 0,
            max_health: 10.0,
            health: 0.0,
            weapon_range: 10.0,
            weapon_cooldown: 1.0,
            weapon_damage: 1.0,
            last_fired: 0.0,
            kills: 0,
            fsm_state: String::new(),
            status,
            squad_id: None,
            detected: false,
            morale: 0.5,
            degradation: 0.0,
            speed_multiplier: 1.0,
        }
    }

    #[test]
    fn test_terminal_unit_survives_one_tick_then_despawns() {
        let mut world = World::new();
        world.spawn((unit(UnitStatus::Eliminated, Alliance::Hostile),));
        world.spawn((unit(UnitStatus::Active, Alliance::Friendly),));
        let mut buf = Vec::new();

        // First pass flags the corpse but leaves it visible.
        run(&mut world, &mut buf);
        assert_eq!(world.query_mut::<&Unit>().into_iter().count(), 2);

        // Second pass removes it.
        run(&mut world, &mut buf);
        assert_eq!(world.query_mut::<&Unit>().into_iter().count(), 1);
    }

    #[test]
    fn test_terminal_status_for_alliance() {
        assert_eq!(terminal_status_for(Alliance::Hostile), UnitStatus::Eliminated);
        assert_eq!(terminal_status_for(Alliance::Friendly), UnitStatus::Destroyed);
    }
}
