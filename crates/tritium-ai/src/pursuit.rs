//! Pursuit target selection and lead-waypoint math. The stateful
//! per-tick assignment bookkeeping lives with the engine; this module
//! is the pure decision core.

use std::collections::HashMap;

use tritium_core::intercept::lead_target;
use tritium_core::types::Point;

/// A hostile as the pursuit assigner sees it.
#[derive(Debug, Clone, Copy)]
pub struct PursuitCandidate<'a> {
    pub id: &'a str,
    pub position: Point,
    pub fleeing: bool,
}

/// Picks a pursuit target for one pursuer: a fleeing hostile beats a
/// closer non-fleeing one, and hostiles already claimed by
/// `max_assignees` other pursuers are passed over, falling back to the
/// plain nearest when every candidate is saturated.
pub fn select_pursuit_target<'a>(
    position: Point,
    candidates: &'a [PursuitCandidate<'a>],
    assignment_counts: &HashMap<String, usize>,
    max_assignees: usize,
) -> Option<PursuitCandidate<'a>> {
    let pick_nearest = |pool: &mut dyn Iterator<Item = PursuitCandidate<'a>>| {
        pool.min_by(|a, b| {
            position
                .distance_squared(a.position)
                .total_cmp(&position.distance_squared(b.position))
        })
    };

    let unsaturated: Vec<PursuitCandidate<'a>> = candidates
        .iter()
        .copied()
        .filter(|c| assignment_counts.get(c.id).copied().unwrap_or(0) < max_assignees)
        .collect();

    pick_nearest(&mut unsaturated.iter().copied().filter(|c| c.fleeing))
        .or_else(|| pick_nearest(&mut unsaturated.iter().copied()))
        .or_else(|| pick_nearest(&mut candidates.iter().copied()))
}

/// Lead waypoint for a fleeing target: project its position forward by
/// the pursuit lookahead horizon, then lead that point as if it were
/// stationary there.
pub fn calculate_intercept_waypoint(
    pursuer_pos: Point,
    pursuer_speed: f64,
    target_pos: Point,
    target_vel: Point,
    lookahead_secs: f64,
) -> Point {
    let projected = target_pos + target_vel * lookahead_secs;
    lead_target(pursuer_pos, projected, target_vel, pursuer_speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, x: f64, fleeing: bool) -> PursuitCandidate {
        PursuitCandidate { id, position: Point::new(x, 0.0), fleeing }
    }

    #[test]
    fn test_select_pursuit_avoids_saturated_target() {
        let candidates = vec![candidate("a", 10.0, false), candidate("b", 20.0, false)];
        let mut counts = HashMap::new();
        counts.insert("a".to_string(), 2);
        let picked = select_pursuit_target(Point::ZERO, &candidates, &counts, 2).unwrap();
        assert_eq!(picked.id, "b");
    }

    #[test]
    fn test_select_pursuit_prefers_fleeing_over_closer() {
        let candidates = vec![candidate("close", 10.0, false), candidate("runner", 40.0, true)];
        let picked = select_pursuit_target(Point::ZERO, &candidates, &HashMap::new(), 2).unwrap();
        assert_eq!(picked.id, "runner");
    }

    #[test]
    fn test_select_pursuit_falls_back_when_all_saturated() {
        let candidates = vec![candidate("a", 10.0, false)];
        let mut counts = HashMap::new();
        counts.insert("a".to_string(), 5);
        let picked = select_pursuit_target(Point::ZERO, &candidates, &counts, 2).unwrap();
        assert_eq!(picked.id, "a");
    }
}
