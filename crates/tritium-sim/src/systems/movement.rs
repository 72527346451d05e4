//! Kinematic integration: steer each unit toward its current waypoint
//! and advance position at its terrain- and degradation-adjusted
//! speed.

use hecs::World;

use tritium_core::components::Unit;
use tritium_core::enums::UnitStatus;
use tritium_core::types::heading_from_vector;
use tritium_terrain::TerrainMap;

use super::{degradation, morale};
use super::upgrades::UpgradeSystem;

/// Distance at which a unit is considered to have reached a waypoint
/// and advances to the next one.
const WAYPOINT_ARRIVAL_RADIUS: f64 = 2.0;

pub fn run(world: &mut World, terrain: &TerrainMap, upgrades: &UpgradeSystem, dt: f64) {
    for (_entity, unit) in world.query_mut::<&mut Unit>() {
        if unit.status.is_terminal() || unit.status == UnitStatus::Stationary {
            continue;
        }
        let Some(target) = unit.current_waypoint() else { continue };

        let to_target = target - unit.position;
        if to_target.length() <= WAYPOINT_ARRIVAL_RADIUS {
            unit.waypoint_index += 1;
            continue;
        }
        if let Some(heading) = heading_from_vector(to_target) {
            unit.heading = heading;
        }

        let terrain_modifier = terrain.get_speed_modifier(unit.position, unit.asset_type);
        let speed_factor = degradation::speed_factor(unit.health_fraction());
        let effect_multiplier = upgrades.effect_speed_multiplier(&unit.id);
        let morale_factor = morale::speed_modifier(unit.morale);
        let effective_speed =
            unit.speed * terrain_modifier * speed_factor * unit.speed_multiplier * effect_multiplier * morale_factor;

        let step = to_target.normalize_or_zero() * effective_speed * dt;
        if step.length() >= to_target.length() {
            unit.position = target;
            unit.waypoint_index += 1;
        } else {
            unit.position += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tritium_core::enums::{Alliance, AssetType};
    use tritium_core::types::Point;
    use tritium_terrain::TerrainMap;

    fn unit(position: Point, waypoints: Vec<Point>) -> Unit {
        Unit {
            id: "u1".into(),
            name: "u1".into(),
            alliance: Alliance::Friendly,
            asset_type: AssetType::Rover,
            is_combatant: true,
            position,
            heading: 0.0,
            speed: 5.0,
            waypoints,
            waypoint_index: 0,
            max_health: 100.0,
            health: 100.0,
            weapon_range: 20.0,
            weapon_cooldown: 1.0,
            weapon_damage: 5.0,
            last_fired: -100.0,
            kills: 0,
            fsm_state: String::new(),
            status: UnitStatus::Active,
            squad_id: None,
            detected: false,
            morale: 0.7,
            degradation: 0.0,
            speed_multiplier: 1.0,
        }
    }

    #[test]
    fn test_unit_advances_toward_waypoint() {
        let mut world = World::new();
        world.spawn((unit(Point::ZERO, vec![Point::new(0.0, 100.0)]),));
        let terrain = TerrainMap::new(200.0, 5.0);
        let upgrades = super::super::upgrades::UpgradeSystem::with_defaults();
        run(&mut world, &terrain, &upgrades, 1.0);
        let (_, u) = world.query_mut::<&Unit>().into_iter().next().unwrap();
        assert!(u.position.y > 0.0);
    }

    #[test]
    fn test_unit_snaps_to_waypoint_on_final_step() {
        let mut world = World::new();
        world.spawn((unit(Point::new(0.0, 99.0), vec![Point::new(0.0, 100.0)]),));
        let terrain = TerrainMap::new(200.0, 5.0);
        let upgrades = super::super::upgrades::UpgradeSystem::with_defaults();
        run(&mut world, &terrain, &upgrades, 1.0);
        let (_, u) = world.query_mut::<&Unit>().into_iter().next().unwrap();
        assert_eq!(u.waypoint_index, 1);
    }

    #[test]
    fn test_stationary_unit_does_not_move() {
        let mut world = World::new();
        let mut u = unit(Point::ZERO, vec![Point::new(0.0, 100.0)]);
        u.status = UnitStatus::Stationary;
        world.spawn((u,));
        let terrain = TerrainMap::new(200.0, 5.0);
        let upgrades = super::super::upgrades::UpgradeSystem::with_defaults();
        run(&mut world, &terrain, &upgrades, 1.0);
        let (_, u) = world.query_mut::<&Unit>().into_iter().next().unwrap();
        assert_eq!(u.position, Point::ZERO);
    }
}
