//! Per-unit morale: drains on taking damage or losing a nearby ally,
//! recovers once combat has been quiet for a few seconds.

use std::collections::HashMap;

use hecs::World;
use tritium_core::components::Unit;
use tritium_core::constants::*;
use tritium_core::enums::Alliance;
use tritium_core::types::Point;

/// Apply passive recovery to every living unit, keyed by how long ago
/// (`now - last_damage[id]`) it was last hit. Units with no recorded
/// hit recover freely.
pub fn tick_recovery(world: &mut World, last_damage: &HashMap<String, f64>, now: f64, dt: f64) {
    for (_, unit) in world.query_mut::<&mut Unit>() {
        if !unit.is_alive() {
            continue;
        }
        let secs_since_damage = match last_damage.get(&unit.id) {
            Some(&t) => now - t,
            None => f64::INFINITY,
        };
        unit.morale = recover(unit.morale, dt, secs_since_damage);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum MoraleState {
    Broken,
    Suppressed,
    Normal,
    Emboldened,
}

pub fn classify(morale: f64) -> MoraleState {
    if morale < MORALE_BROKEN_THRESHOLD {
        MoraleState::Broken
    } else if morale < MORALE_SUPPRESSED_THRESHOLD {
        MoraleState::Suppressed
    } else if morale > MORALE_EMBOLDENED_THRESHOLD {
        MoraleState::Emboldened
    } else {
        MoraleState::Normal
    }
}

/// Passive recovery once `secs_since_damage` has passed the recovery
/// delay.
pub fn recover(morale: f64, dt: f64, secs_since_damage: f64) -> f64 {
    if secs_since_damage >= MORALE_RECOVERY_DELAY_SECS {
        (morale + MORALE_RECOVERY_RATE * dt).min(1.0)
    } else {
        morale
    }
}

pub fn on_damage_taken(morale: f64, damage: f64) -> f64 {
    (morale - damage * DAMAGE_MORALE_LOSS_PER_DAMAGE).max(0.0)
}

/// Ripple a kill through everyone close enough to see it: the
/// victim's allies lose heart, its enemies take heart. Neutral
/// bystanders are unmoved.
pub fn propagate_elimination(
    world: &mut World,
    victim_alliance: Alliance,
    victim_position: Point,
    radius: f64,
) {
    for (_, unit) in world.query_mut::<&mut Unit>() {
        if !unit.is_alive() || unit.position.distance(victim_position) > radius {
            continue;
        }
        if unit.alliance == victim_alliance {
            unit.morale = on_ally_eliminated(unit.morale);
        } else if unit.alliance != Alliance::Neutral && victim_alliance != Alliance::Neutral {
            unit.morale = on_enemy_eliminated(unit.morale);
        }
    }
}

pub fn on_ally_eliminated(morale: f64) -> f64 {
    (morale - ALLY_ELIMINATED_LOSS).max(0.0)
}

pub fn on_enemy_eliminated(morale: f64) -> f64 {
    (morale + ENEMY_ELIMINATED_BOOST).min(1.0)
}

/// Emboldened units also move a little faster.
pub fn speed_modifier(morale: f64) -> f64 {
    match classify(morale) {
        MoraleState::Emboldened => 1.0 + EMBOLDENED_SPEED_BONUS,
        _ => 1.0,
    }
}

/// Damage and hit-probability multipliers applicable to a unit's
/// current morale state.
pub fn combat_modifiers(morale: f64) -> (f64, f64) {
    match classify(morale) {
        MoraleState::Emboldened => (1.0 + EMBOLDENED_DAMAGE_BONUS, EMBOLDENED_HIT_BONUS),
        MoraleState::Suppressed => (1.0, -SUPPRESSED_HIT_PENALTY),
        _ => (1.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert!(matches!(classify(0.05), MoraleState::Broken));
        assert!(matches!(classify(0.2), MoraleState::Suppressed));
        assert!(matches!(classify(0.95), MoraleState::Emboldened));
        assert!(matches!(classify(0.5), MoraleState::Normal));
    }

    #[test]
    fn test_recover_only_after_delay() {
        assert_eq!(recover(0.5, 1.0, 1.0), 0.5);
        assert!(recover(0.5, 1.0, 5.0) > 0.5);
    }

    #[test]
    fn test_damage_and_elimination_deltas() {
        assert!(on_damage_taken(0.7, 20.0) < 0.7);
        assert!(on_ally_eliminated(0.7) < 0.7);
        assert!(on_enemy_eliminated(0.7) > 0.7);
    }

    #[test]
    fn test_propagate_elimination_splits_by_alliance() {
        use tritium_core::enums::{AssetType, UnitStatus};

        fn unit(id: &str, alliance: Alliance, x: f64) -> Unit {
            Unit {
                id: id.into(), name: id.into(), alliance, asset_type: AssetType::Person,
                is_combatant: true, position: Point::new(x, 0.0), heading: 0.0, speed: 1.0,
                waypoints: Vec::new(), waypoint_index: 0, max_health: 10.0, health: 10.0,
                weapon_range: 10.0, weapon_cooldown: 1.0, weapon_damage: 1.0, last_fired: 0.0,
                kills: 0, fsm_state: String::new(), status: UnitStatus::Active, squad_id: None,
                detected: false, morale: 0.5, degradation: 0.0, speed_multiplier: 1.0,
            }
        }

        let mut world = World::new();
        world.spawn((unit("ally", Alliance::Hostile, 5.0),));
        world.spawn((unit("enemy", Alliance::Friendly, 5.0),));
        world.spawn((unit("far_ally", Alliance::Hostile, 500.0),));

        propagate_elimination(&mut world, Alliance::Hostile, Point::ZERO, 20.0);

        let morales: HashMap<String, f64> = world.query::<&Unit>().iter().map(|(_, u)| (u.id.clone(), u.morale)).collect();
        assert!((morales["ally"] - (0.5 - ALLY_ELIMINATED_LOSS)).abs() < 1e-9);
        assert!((morales["enemy"] - (0.5 + ENEMY_ELIMINATED_BOOST)).abs() < 1e-9);
        assert!((morales["far_ally"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_tick_recovery_only_for_units_past_delay() {
        use hecs::World;
        use std::collections::HashMap;
        use tritium_core::enums::{Alliance, AssetType, UnitStatus};
        use tritium_core::types::Point;

        fn unit(id: &str, morale: f64) -> Unit {
            Unit {
                id: id.into(), name: id.into(), alliance: Alliance::Friendly, asset_type: AssetType::Rover,
                is_combatant: true, position: Point::ZERO, heading: 0.0, speed: 1.0, waypoints: Vec::new(),
                waypoint_index: 0, max_health: 10.0, health: 10.0, weapon_range: 10.0, weapon_cooldown: 1.0,
                weapon_damage: 1.0, last_fired: 0.0, kills: 0, fsm_state: String::new(), status: UnitStatus::Active,
                squad_id: None, detected: false, morale, degradation: 0.0, speed_multiplier: 1.0,
            }
        }

        let mut world = World::new();
        world.spawn((unit("recent", 0.5),));
        world.spawn((unit("stale", 0.5),));
        let mut last_damage = HashMap::new();
        last_damage.insert("recent".to_string(), 9.9);
        tick_recovery(&mut world, &last_damage, 10.0, 1.0);

        let morales: HashMap<String, f64> = world.query::<&Unit>().iter().map(|(_, u)| (u.id.clone(), u.morale)).collect();
        assert_eq!(morales["recent"], 0.5);
        assert!(morales["stale"] > 0.5);
    }
}
