//! Drives hostile swarm drones with boids flocking instead of the
//! waypoint/pursuit behaviors the other asset types use, and applies
//! area-of-effect damage for anti-drone defenses.

use hecs::World;

use tritium_ai::swarm::{steer, steering_heading, Neighbour};
use tritium_core::enums::{Alliance, AssetType};
use tritium_core::types::{velocity_from_heading_speed, Point};

use tritium_core::components::Unit;

/// Steer every hostile swarm drone toward the nearest friendly unit,
/// flocking with its fellow swarm members, and integrate position by
/// the resulting velocity.
pub fn run(world: &mut World, dt: f64) {
    let snapshot: Vec<(hecs::Entity, Point, Point)> = world
        .query::<&Unit>()
        .iter()
        .filter(|(_, u)| u.asset_type == AssetType::SwarmDrone && u.is_alive())
        .map(|(e, u)| (e, u.position, velocity_from_heading_speed(u.heading, u.speed)))
        .collect();

    let friendlies: Vec<Point> = world
        .query::<&Unit>()
        .iter()
        .filter(|(_, u)| u.alliance == Alliance::Friendly && u.is_alive())
        .map(|(_, u)| u.position)
        .collect();

    for (entity, position, _) in &snapshot {
        let neighbours: Vec<Neighbour> = snapshot
            .iter()
            .filter(|(e, ..)| e != entity)
            .map(|(_, p, v)| Neighbour { position: *p, velocity: *v })
            .collect();

        let target = nearest(*position, &friendlies).unwrap_or(*position);
        let force = steer(*position, &neighbours, target);

        if let Ok(mut unit) = world.get::<&mut Unit>(*entity) {
            if let Some(heading) = steering_heading(force) {
                unit.heading = heading;
            }
            let speed = unit.speed;
            unit.position += force * speed * dt;
        }
    }
}

fn nearest(from: Point, candidates: &[Point]) -> Option<Point> {
    candidates.iter().copied().min_by(|a, b| from.distance_squared(*a).total_cmp(&from.distance_squared(*b)))
}

/// One drone struck by an anti-drone burst.
#[derive(Debug, Clone)]
pub struct AoeHit {
    pub id: String,
    pub eliminated: bool,
    pub position: Point,
}

/// Flat damage to every swarm drone within `radius` of `center`
/// (anti-drone defense burst). Drones knocked to zero transition to
/// their terminal status here; the engine announces them.
pub fn apply_aoe_damage(world: &mut World, center: Point, radius: f64, damage: f64) -> Vec<AoeHit> {
    let mut hits = Vec::new();
    for (_, unit) in world.query_mut::<&mut Unit>() {
        if unit.asset_type == AssetType::SwarmDrone && unit.is_alive() && unit.position.distance(center) <= radius {
            let eliminated = unit.apply_damage(damage);
            if eliminated {
                unit.status = super::cleanup::terminal_status_for(unit.alliance);
            }
            hits.push(AoeHit { id: unit.id.clone(), eliminated, position: unit.position });
        }
    }
    hits
}
