//! Entity spawn factory: turns a `UnitSpawn` command payload into a
//! fully-initialized `Unit` entity.

use hecs::{Entity, World};

use tritium_core::commands::UnitSpawn;
use tritium_core::components::Unit;
use tritium_core::constants::DEFAULT_MORALE;
use tritium_core::enums::{Alliance, MovementCategory, UnitStatus};

/// Spawn one unit from a fully-specified definition, returning its
/// world entity. Stationary asset types start `Stationary`; everything
/// else starts `Active`.
pub fn spawn_unit(world: &mut World, def: UnitSpawn, id: String) -> Entity {
    let status = match def.asset_type.category() {
        MovementCategory::Stationary => UnitStatus::Stationary,
        _ => UnitStatus::Active,
    };

    world.spawn((Unit {
        id,
        name: def.name,
        alliance: def.alliance,
        asset_type: def.asset_type,
        is_combatant: def.alliance != Alliance::Neutral,
        position: def.position,
        heading: def.heading,
        speed: def.speed,
        waypoints: def.waypoints,
        waypoint_index: 0,
        max_health: def.max_health,
        health: def.max_health,
        weapon_range: def.weapon_range,
        weapon_cooldown: def.weapon_cooldown,
        weapon_damage: def.weapon_damage,
        last_fired: f64::NEG_INFINITY,
        kills: 0,
        fsm_state: String::new(),
        status,
        squad_id: def.squad_id,
        detected: false,
        morale: DEFAULT_MORALE,
        degradation: 0.0,
        speed_multiplier: 1.0,
    },))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tritium_core::enums::AssetType;
    use tritium_core::types::Point;

    fn def(asset_type: AssetType) -> UnitSpawn {
        UnitSpawn {
            id: None,
            name: "test".into(),
            alliance: Alliance::Friendly,
            asset_type,
            position: Point::ZERO,
            heading: 0.0,
            speed: 3.0,
            waypoints: Vec::new(),
            max_health: 100.0,
            weapon_range: 20.0,
            weapon_cooldown: 1.0,
            weapon_damage: 5.0,
            squad_id: None,
        }
    }

    #[test]
    fn test_turret_spawns_stationary() {
        let mut world = World::new();
        let entity = spawn_unit(&mut world, def(AssetType::Turret), "t1".into());
        let unit = world.get::<&Unit>(entity).unwrap();
        assert_eq!(unit.status, UnitStatus::Stationary);
        assert_eq!(unit.health, unit.max_health);
    }

    #[test]
    fn test_rover_spawns_active() {
        let mut world = World::new();
        let entity = spawn_unit(&mut world, def(AssetType::Rover), "r1".into());
        let unit = world.get::<&Unit>(entity).unwrap();
        assert_eq!(unit.status, UnitStatus::Active);
    }
}
