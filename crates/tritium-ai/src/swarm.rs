//! Boids flocking for swarm drones: separation, alignment, cohesion,
//! and target-seeking combine into one steering force per tick,
//! clamped to a maximum magnitude. Attack-formation helpers compute
//! target waypoints for coordinated strike patterns.

use tritium_core::constants::*;
use tritium_core::types::{heading_from_vector, Point};

/// A neighbouring swarm member's position and heading-unit-vector,
/// used by the three flocking rules.
#[derive(Debug, Clone, Copy)]
pub struct Neighbour {
    pub position: Point,
    pub velocity: Point,
}

fn separation(position: Point, neighbours: &[Neighbour]) -> Point {
    let mut force = Point::ZERO;
    for n in neighbours {
        let delta = position - n.position;
        let dist = delta.length();
        if dist > 1e-6 && dist < SWARM_SEPARATION_RADIUS {
            force += delta.normalize() / dist;
        }
    }
    force
}

fn alignment(position: Point, neighbours: &[Neighbour]) -> Point {
    let mut sin_sum = 0.0;
    let mut cos_sum = 0.0;
    let mut count = 0usize;
    for n in neighbours {
        if position.distance(n.position) <= SWARM_ALIGNMENT_RADIUS && n.velocity.length_squared() > 1e-9 {
            let heading = n.velocity.normalize();
            sin_sum += heading.x;
            cos_sum += heading.y;
            count += 1;
        }
    }
    if count == 0 {
        return Point::ZERO;
    }
    let avg = Point::new(sin_sum / count as f64, cos_sum / count as f64);
    if avg.length_squared() > 1e-9 {
        avg.normalize()
    } else {
        Point::ZERO
    }
}

fn cohesion(position: Point, neighbours: &[Neighbour]) -> Point {
    let mut centroid = Point::ZERO;
    let mut count = 0usize;
    for n in neighbours {
        if position.distance(n.position) <= SWARM_COHESION_RADIUS {
            centroid += n.position;
            count += 1;
        }
    }
    if count == 0 {
        return Point::ZERO;
    }
    let centroid = centroid / count as f64;
    let to_centroid = centroid - position;
    if to_centroid.length_squared() > 1e-9 {
        to_centroid.normalize()
    } else {
        Point::ZERO
    }
}

/// Combined steering force for one swarm drone this tick, clamped to
/// [`SWARM_MAX_FORCE`].
pub fn steer(position: Point, neighbours: &[Neighbour], target: Point) -> Point {
    let sep = separation(position, neighbours) * SWARM_SEPARATION_WEIGHT;
    let align = alignment(position, neighbours) * SWARM_ALIGNMENT_WEIGHT;
    let coh = cohesion(position, neighbours) * SWARM_COHESION_WEIGHT;

    let to_target = target - position;
    let seek = if to_target.length_squared() > 1e-9 {
        to_target.normalize() * SWARM_TARGET_WEIGHT
    } else {
        Point::ZERO
    };

    let combined = sep + align + coh + seek;
    if combined.length() > SWARM_MAX_FORCE {
        combined.normalize() * SWARM_MAX_FORCE
    } else {
        combined
    }
}

/// New heading for a drone steered by `force`, or `None` when the
/// force is below [`SWARM_HEADING_UPDATE_THRESHOLD`] and the drone
/// should hold its current facing.
pub fn steering_heading(force: Point) -> Option<f64> {
    if force.length() <= SWARM_HEADING_UPDATE_THRESHOLD {
        return None;
    }
    heading_from_vector(force)
}

/// Evenly spaced positions around `target` at `radius`, for a
/// coordinated strafing orbit.
pub fn circle_strafe_positions(target: Point, radius: f64, count: usize) -> Vec<Point> {
    (0..count)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / count.max(1) as f64;
            target + Point::new(radius * angle.sin(), radius * angle.cos())
        })
        .collect()
}

/// Every drone converges straight on the target.
pub fn dive_bomb_positions(target: Point, start_positions: &[Point]) -> Vec<Point> {
    vec![target; start_positions.len()]
}

/// A line perpendicular to the approach heading, `spacing` apart, 30 m
/// back from the target.
pub fn wave_assault_positions(target: Point, approach_heading_deg: f64, count: usize, spacing: f64) -> Vec<Point> {
    let forward = tritium_core::types::heading_to_unit(approach_heading_deg);
    let perpendicular = Point::new(-forward.y, forward.x);
    let back = target - forward * 30.0;
    let half = (count as f64 - 1.0) / 2.0;
    (0..count)
        .map(|i| back + perpendicular * ((i as f64 - half) * spacing))
        .collect()
}

/// Two flanking groups offset from the approach line by `flank_distance`.
pub fn split_pincer_positions(target: Point, approach_heading_deg: f64, count: usize, flank_distance: f64) -> Vec<Point> {
    let forward = tritium_core::types::heading_to_unit(approach_heading_deg);
    let perpendicular = Point::new(-forward.y, forward.x);
    let back = target - forward * 20.0;
    (0..count)
        .map(|i| {
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            back + perpendicular * (flank_distance * side)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separation_pushes_apart_when_crowded() {
        let neighbours = vec![Neighbour { position: Point::new(1.0, 0.0), velocity: Point::ZERO }];
        let force = separation(Point::ZERO, &neighbours);
        assert!(force.x < 0.0, "should push away from the crowding neighbour");
    }

    #[test]
    fn test_steer_is_clamped_to_max_force() {
        let neighbours: Vec<Neighbour> = vec![];
        let force = steer(Point::ZERO, &neighbours, Point::new(1000.0, 0.0));
        assert!(force.length() <= SWARM_MAX_FORCE + 1e-9);
    }

    #[test]
    fn test_steering_heading_ignores_weak_force() {
        // Below the threshold the drone holds its facing, even for
        // forces well above floating-point noise.
        assert!(steering_heading(Point::new(0.005, 0.0)).is_none());
        assert!(steering_heading(Point::new(0.0, 0.01)).is_none());
        let heading = steering_heading(Point::new(0.02, 0.0)).unwrap();
        assert!((heading - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_strafe_positions_equidistant() {
        let positions = circle_strafe_positions(Point::ZERO, 10.0, 4);
        assert_eq!(positions.len(), 4);
        for p in &positions {
            assert!((p.length() - 10.0).abs() < 1e-9);
        }
    }
}
