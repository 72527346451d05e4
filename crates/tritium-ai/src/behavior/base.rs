//! Shared target-selection helper used by every per-type behavior.

use tritium_core::types::Point;

/// The subset of an enemy unit's state a behavior needs to pick a
/// target. Callers build this from whatever component storage they use.
#[derive(Debug, Clone, Copy)]
pub struct EnemyInfo<'a> {
    pub id: &'a str,
    pub position: Point,
    pub velocity: Point,
    /// True for emplaced defenders (turrets); flanking logic singles
    /// these out.
    pub stationary: bool,
}

/// The nearest enemy strictly within `weapon_range`, or `None` if the
/// weapon can't reach anything.
pub fn nearest_in_range<'a>(
    position: Point,
    weapon_range: f64,
    enemies: &'a [EnemyInfo<'a>],
) -> Option<EnemyInfo<'a>> {
    enemies
        .iter()
        .copied()
        .filter(|e| position.distance(e.position) <= weapon_range)
        .min_by(|a, b| {
            position
                .distance_squared(a.position)
                .total_cmp(&position.distance_squared(b.position))
        })
}

/// The nearest enemy regardless of range.
pub fn nearest<'a>(position: Point, enemies: &'a [EnemyInfo<'a>]) -> Option<EnemyInfo<'a>> {
    enemies.iter().copied().min_by(|a, b| {
        position
            .distance_squared(a.position)
            .total_cmp(&position.distance_squared(b.position))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn enemy(id: &str, x: f64, y: f64) -> EnemyInfo {
        EnemyInfo { id, position: Point::new(x, y), velocity: Point::ZERO, stationary: false }
    }

    #[test]
    fn test_nearest_in_range_picks_closest() {
        let enemies = vec![enemy("far", 90.0, 0.0), enemy("near", 10.0, 0.0)];
        let target = nearest_in_range(Point::ZERO, 100.0, &enemies).unwrap();
        assert_eq!(target.id, "near");
    }

    #[test]
    fn test_nearest_in_range_excludes_out_of_range() {
        let enemies = vec![enemy("far", 500.0, 0.0)];
        assert!(nearest_in_range(Point::ZERO, 50.0, &enemies).is_none());
        assert!(nearest(Point::ZERO, &enemies).is_some());
    }
}
