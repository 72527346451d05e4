//! Behavior coordinator: routes each active combatant to exactly one
//! per-type behavior, applies its movement decision, then resolves any
//! fire decision into damage and events.

use rand::Rng;

use tritium_ai::behavior::base::EnemyInfo;
use tritium_ai::behavior::hostile::{HostileContext, HostileState};
use tritium_ai::behavior::{drone, hostile, rover, turret};
use tritium_core::components::Unit;
use tritium_core::constants::{GROUP_RUSH_RADIUS, PURSUIT_LOOKAHEAD_SECS};
use tritium_core::enums::{Alliance, AssetType, MovementCategory};
use tritium_core::events::SimEvent;
use tritium_core::model::CoverObject;
use tritium_core::types::Point;
use tritium_terrain::TerrainMap;

use super::pursuit::PursuitSystem;
use super::upgrades::UpgradeSystem;
use super::{cleanup, combat, cover, degradation, morale};
use hecs::World;

/// Muzzle velocity shared by every direct-fire weapon in the
/// simulation; only lead-point geometry depends on it.
const PROJECTILE_SPEED: f64 = 25.0;

/// Snapshot of one unit used to build `EnemyInfo` lists and look up
/// positions/velocities without holding a live borrow on the world.
struct UnitSnap {
    id: String,
    alliance: Alliance,
    asset_type: AssetType,
    position: Point,
    velocity: Point,
    fsm_state: String,
}

impl UnitSnap {
    fn as_enemy(&self) -> EnemyInfo<'_> {
        EnemyInfo {
            id: &self.id,
            position: self.position,
            velocity: self.velocity,
            stationary: self.asset_type.category() == MovementCategory::Stationary,
        }
    }
}

/// One unit's resolved decision before fire resolution.
struct Applied {
    fire: bool,
    target_id: Option<String>,
    aim_point: Point,
    cooldown_multiplier: f64,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    terrain: &TerrainMap,
    cover_objects: &[CoverObject],
    building_cells: &[Point],
    hostile_state: &mut HostileState,
    pursuit: &PursuitSystem,
    upgrades: &UpgradeSystem,
    rng: &mut impl Rng,
    now: f64,
) -> Vec<SimEvent> {
    let snapshots: Vec<UnitSnap> = world
        .query::<&Unit>()
        .iter()
        .filter(|(_, u)| u.is_alive())
        .map(|(_, u)| UnitSnap {
            id: u.id.clone(),
            alliance: u.alliance,
            asset_type: u.asset_type,
            position: u.position,
            velocity: tritium_core::types::velocity_from_heading_speed(u.heading, u.speed),
            fsm_state: u.fsm_state.clone(),
        })
        .collect();

    let mut events = Vec::new();
    let entities: Vec<hecs::Entity> = world.query_mut::<&Unit>().into_iter().map(|(e, _)| e).collect();

    for entity in entities {
        let Some(unit) = world.get::<&Unit>(entity).ok().filter(|u| u.is_alive() && u.is_combatant) else {
            continue;
        };
        // Swarm drones are steered by the flocking controller, not here.
        if unit.asset_type == AssetType::SwarmDrone {
            continue;
        }
        let id = unit.id.clone();
        let alliance = unit.alliance;
        let asset_type = unit.asset_type;
        let position = unit.position;
        let heading = unit.heading;
        let weapon_range = unit.weapon_range;
        let weapon_cooldown = unit.weapon_cooldown;
        let weapon_damage = unit.weapon_damage;
        let fsm_state = unit.fsm_state.clone();
        let health_fraction = unit.health_fraction();
        let morale_value = unit.morale;
        let last_fired = unit.last_fired;
        let detected = unit.detected;
        drop(unit);

        let enemies: Vec<EnemyInfo> = snapshots
            .iter()
            .filter(|s| s.alliance != alliance && s.id != id)
            .map(UnitSnap::as_enemy)
            .collect();

        let applied = match asset_type.category() {
            MovementCategory::Stationary => {
                let ctx = turret::TurretContext {
                    position,
                    heading,
                    weapon_range,
                    projectile_speed: PROJECTILE_SPEED,
                    fsm_state: &fsm_state,
                    can_fire: true,
                    ready_to_fire: true,
                };
                let d = turret::tick(&ctx, &enemies);
                let state = if d.target_id.is_some() { "engaging" } else { "tracking" };
                apply_simple(world, entity, d.new_heading, state, &mut events);
                Applied { fire: d.fire, target_id: d.target_id, aim_point: d.aim_point, cooldown_multiplier: 1.0 }
            }
            MovementCategory::Air if alliance == Alliance::Friendly => {
                let ctx = drone::DroneContext {
                    position,
                    heading,
                    weapon_range,
                    projectile_speed: PROJECTILE_SPEED,
                    fsm_state: &fsm_state,
                    can_fire: true,
                    ready_to_fire: true,
                };
                let d = drone::tick(&ctx, &enemies);
                let state = if d.target_id.is_some() { "engaging" } else { "scouting" };
                apply_simple(world, entity, d.new_heading, state, &mut events);
                Applied { fire: d.fire, target_id: d.target_id, aim_point: d.aim_point, cooldown_multiplier: 1.0 }
            }
            MovementCategory::Ground if alliance == Alliance::Friendly => {
                let assigned_snap = pursuit
                    .get_pursuit_target(&id)
                    .and_then(|target_id| snapshots.iter().find(|s| s.id == target_id));
                let assigned = assigned_snap.map(UnitSnap::as_enemy);
                let assigned_fleeing = assigned_snap.map(|s| s.fsm_state == "fleeing").unwrap_or(false);
                let ctx = rover::RoverContext {
                    position,
                    heading,
                    weapon_range,
                    projectile_speed: PROJECTILE_SPEED,
                    fsm_state: &fsm_state,
                    can_fire: true,
                    ready_to_fire: true,
                    pursuit_lookahead_secs: PURSUIT_LOOKAHEAD_SECS,
                };
                let d = rover::tick(&ctx, assigned, assigned_fleeing, &enemies);
                let state = if d.target_id.is_some() { "engaging" } else { "patrolling" };
                apply_simple(world, entity, d.new_heading, state, &mut events);
                Applied { fire: d.fire, target_id: d.target_id, aim_point: d.aim_point, cooldown_multiplier: 1.0 }
            }
            _ => {
                // Hostile ground/foot combatants (person, tank, apc).
                let nearby_hostile_count = snapshots
                    .iter()
                    .filter(|s| {
                        s.alliance == Alliance::Hostile
                            && s.id != id
                            && s.position.distance(position) <= GROUP_RUSH_RADIUS
                    })
                    .count();
                let ctx = HostileContext {
                    id: &id,
                    position,
                    heading,
                    weapon_range,
                    projectile_speed: PROJECTILE_SPEED,
                    fsm_state: &fsm_state,
                    health_fraction,
                    morale: morale_value,
                    can_fire: true,
                    ready_to_fire: true,
                    now,
                    nearby_hostile_count,
                    nearest_cover: nearest_point(position, cover_objects.iter().map(|c| c.position)),
                    nearest_building: nearest_point(position, building_cells.iter().copied()),
                    detected,
                    map_bounds: terrain.bounds(),
                };
                let d = hostile::tick(hostile_state, &ctx, &enemies, rng);
                if let Ok(mut unit) = world.get::<&mut Unit>(entity) {
                    unit.heading = d.new_heading;
                    unit.speed_multiplier = d.speed_multiplier;
                    if unit.fsm_state != d.new_fsm_state {
                        unit.fsm_state = d.new_fsm_state.to_string();
                        events.push(SimEvent::StateChange { target_id: id.clone(), fsm_state: unit.fsm_state.clone() });
                    }
                    if let Some(waypoint) = d.waypoint {
                        if unit.current_waypoint() != Some(waypoint) {
                            unit.waypoints = vec![waypoint];
                            unit.waypoint_index = 0;
                        }
                    }
                    if let Some(offset) = d.offset {
                        unit.position += offset;
                    }
                }
                Applied {
                    fire: d.fire,
                    target_id: d.target_id,
                    aim_point: d.aim_point,
                    cooldown_multiplier: d.cooldown_multiplier,
                }
            }
        };

        if !applied.fire {
            continue;
        }
        if !degradation::can_fire(health_fraction) {
            events.push(SimEvent::WeaponJam {
                target_id: id.clone(),
                name: "primary".into(),
                degradation: 1.0 - health_fraction,
            });
            continue;
        }
        let effective_cooldown = weapon_cooldown
            * degradation::cooldown_factor(health_fraction)
            * applied.cooldown_multiplier
            * upgrades.effect_cooldown_multiplier(&id);
        if now - last_fired < effective_cooldown {
            continue;
        }
        let Some(target_id) = applied.target_id else { continue };
        let Some(target_snap) = snapshots.iter().find(|s| s.id == target_id) else { continue };

        let range = position.distance(target_snap.position);
        let terrain_cover = terrain.get_cover_value(target_snap.position);
        let cover_bonus = cover::effective_cover(target_snap.position, position, terrain_cover, cover_objects);
        let damage_reduction = upgrades.damage_reduction(&target_id);
        let fire = combat::resolve_fire(rng, range, weapon_range, weapon_damage, cover_bonus, damage_reduction, morale_value);

        events.push(SimEvent::ProjectileFired {
            shooter_id: id.clone(),
            target_id: target_id.clone(),
            hit: fire.hit,
            damage: fire.damage,
            aim: applied.aim_point,
        });
        if let Ok(mut unit) = world.get::<&mut Unit>(entity) {
            unit.last_fired = now;
        }
        if !fire.hit {
            continue;
        }

        events.push(SimEvent::ProjectileHit { shooter_id: id.clone(), target_id: target_id.clone(), damage: fire.damage });
        let target_entity = world.query::<&Unit>().iter().find(|(_, u)| u.id == target_id).map(|(e, _)| e);
        if let Some(target_entity) = target_entity {
            let mut eliminated = None;
            if let Ok(mut target_unit) = world.get::<&mut Unit>(target_entity) {
                let crossed_zero = target_unit.apply_damage(fire.damage);
                target_unit.morale = morale::on_damage_taken(target_unit.morale, fire.damage);
                if crossed_zero {
                    target_unit.status = cleanup::terminal_status_for(target_unit.alliance);
                    eliminated =
                        Some((target_unit.alliance, target_unit.asset_type, target_unit.position));
                }
            }
            if let Some((target_alliance, target_asset, target_position)) = eliminated {
                if let Ok(mut shooter) = world.get::<&mut Unit>(entity) {
                    shooter.kills += 1;
                }
                match target_alliance {
                    Alliance::Friendly => events.push(SimEvent::UnitDestroyed { target_id: target_id.clone() }),
                    _ => events.push(SimEvent::TargetEliminated {
                        target_id: target_id.clone(),
                        by_id: id.clone(),
                        alliance: target_alliance,
                        asset_type: target_asset,
                        position: target_position,
                    }),
                }
            }
        }
    }

    events
}

/// Shared tail for the friendly behaviors: turn, retag the FSM, and
/// report the transition.
fn apply_simple(world: &mut World, entity: hecs::Entity, new_heading: f64, state: &str, events: &mut Vec<SimEvent>) {
    if let Ok(mut unit) = world.get::<&mut Unit>(entity) {
        unit.heading = new_heading;
        if unit.fsm_state != state {
            unit.fsm_state = state.to_string();
            events.push(SimEvent::StateChange { target_id: unit.id.clone(), fsm_state: unit.fsm_state.clone() });
        }
    }
}

fn nearest_point(from: Point, candidates: impl Iterator<Item = Point>) -> Option<Point> {
    candidates.min_by(|a, b| from.distance_squared(*a).total_cmp(&from.distance_squared(*b)))
}
