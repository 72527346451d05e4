//! Pursuit system: predicts where each hostile will be a few seconds
//! out and assigns mobile friendlies to chase them, spreading pursuers
//! so no hostile soaks up the whole defense.

use std::collections::HashMap;

use tritium_ai::pursuit::{select_pursuit_target, PursuitCandidate};
use tritium_core::constants::{PURSUIT_LOOKAHEAD_SECS, PURSUIT_MAX_ASSIGNEES_PER_TARGET};
use tritium_core::types::{velocity_from_heading_speed, Point};

/// A hostile's kinematic state snapshotted for this tick.
#[derive(Debug, Clone)]
pub struct PursuitTarget {
    pub id: String,
    pub position: Point,
    pub heading: f64,
    pub speed: f64,
    pub fleeing: bool,
}

/// Sticky pursuer-to-hostile assignments plus the per-tick intercept
/// prediction map.
#[derive(Debug, Default)]
pub struct PursuitSystem {
    intercept_points: HashMap<String, Point>,
    assignments: HashMap<String, String>,
}

impl PursuitSystem {
    /// Refresh predictions and assignments. `pursuers` are the mobile
    /// friendlies eligible to chase.
    pub fn tick(&mut self, hostiles: &[PursuitTarget], pursuers: &[(String, Point)]) {
        self.intercept_points.clear();
        for hostile in hostiles {
            let velocity = velocity_from_heading_speed(hostile.heading, hostile.speed);
            self.intercept_points
                .insert(hostile.id.clone(), hostile.position + velocity * PURSUIT_LOOKAHEAD_SECS);
        }

        // Drop assignments whose pursuer or target is gone.
        let live_pursuers: HashMap<&str, Point> = pursuers.iter().map(|(id, p)| (id.as_str(), *p)).collect();
        self.assignments.retain(|pursuer, target| {
            live_pursuers.contains_key(pursuer.as_str()) && self.intercept_points.contains_key(target)
        });

        let mut counts: HashMap<String, usize> = HashMap::new();
        for target in self.assignments.values() {
            *counts.entry(target.clone()).or_insert(0) += 1;
        }

        let candidates: Vec<PursuitCandidate> = hostiles
            .iter()
            .map(|h| PursuitCandidate { id: &h.id, position: h.position, fleeing: h.fleeing })
            .collect();

        for (pursuer_id, pursuer_pos) in pursuers {
            if self.assignments.contains_key(pursuer_id) {
                continue;
            }
            if let Some(target) = select_pursuit_target(
                *pursuer_pos,
                &candidates,
                &counts,
                PURSUIT_MAX_ASSIGNEES_PER_TARGET,
            ) {
                *counts.entry(target.id.to_string()).or_insert(0) += 1;
                self.assignments.insert(pursuer_id.clone(), target.id.to_string());
            }
        }
    }

    pub fn get_pursuit_target(&self, pursuer_id: &str) -> Option<&str> {
        self.assignments.get(pursuer_id).map(String::as_str)
    }

    /// Predicted position of a hostile a few seconds out, if tracked.
    pub fn intercept_point(&self, target_id: &str) -> Option<Point> {
        self.intercept_points.get(target_id).copied()
    }

    /// Release every assignment chasing `target_id` (it died or left
    /// the field).
    pub fn clear_target(&mut self, target_id: &str) {
        self.assignments.retain(|_, target| target != target_id);
        self.intercept_points.remove(target_id);
    }

    pub fn clear(&mut self) {
        self.intercept_points.clear();
        self.assignments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hostile(id: &str, x: f64) -> PursuitTarget {
        PursuitTarget { id: id.into(), position: Point::new(x, 0.0), heading: 90.0, speed: 2.0, fleeing: false }
    }

    #[test]
    fn test_predicts_position_along_heading() {
        let mut system = PursuitSystem::default();
        system.tick(&[hostile("h1", 0.0)], &[]);
        let predicted = system.intercept_point("h1").unwrap();
        // Heading 90 = due east at 2 m/s over the 3 s horizon.
        assert!((predicted.x - 6.0).abs() < 1e-9);
        assert!(predicted.y.abs() < 1e-9);
    }

    #[test]
    fn test_assignments_spread_across_targets() {
        let mut system = PursuitSystem::default();
        let hostiles = vec![hostile("h1", 10.0), hostile("h2", 12.0)];
        let pursuers = vec![
            ("r1".to_string(), Point::ZERO),
            ("r2".to_string(), Point::ZERO),
            ("r3".to_string(), Point::ZERO),
        ];
        system.tick(&hostiles, &pursuers);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for pursuer in ["r1", "r2", "r3"] {
            *counts.entry(system.get_pursuit_target(pursuer).unwrap()).or_insert(0) += 1;
        }
        assert!(counts.values().all(|&c| c <= PURSUIT_MAX_ASSIGNEES_PER_TARGET));
    }

    #[test]
    fn test_assignment_released_when_target_gone() {
        let mut system = PursuitSystem::default();
        let pursuers = vec![("r1".to_string(), Point::ZERO)];
        system.tick(&[hostile("h1", 10.0)], &pursuers);
        assert_eq!(system.get_pursuit_target("r1"), Some("h1"));

        system.tick(&[], &pursuers);
        assert_eq!(system.get_pursuit_target("r1"), None);
    }

    #[test]
    fn test_clear_target_releases_pursuers() {
        let mut system = PursuitSystem::default();
        system.tick(&[hostile("h1", 10.0)], &[("r1".to_string(), Point::ZERO)]);
        system.clear_target("h1");
        assert_eq!(system.get_pursuit_target("r1"), None);
    }
}
