//! Cover bonus: a unit's best nearby cover object, scaled by proximity,
//! counts only when it sits between the unit and its attacker.

use tritium_core::constants::COVER_BONUS_CAP;
use tritium_core::model::CoverObject;
use tritium_core::types::Point;

/// Best cover value among objects within range of `position`,
/// regardless of direction — used for passive per-unit bookkeeping.
pub fn best_cover(position: Point, objects: &[CoverObject]) -> f64 {
    objects
        .iter()
        .filter_map(|o| {
            let dist = position.distance(o.position);
            (dist <= o.radius).then(|| o.cover_value * (1.0 - dist / o.radius))
        })
        .fold(0.0, f64::max)
        .min(COVER_BONUS_CAP)
}

/// Effective cover against a shot from `attacker`: terrain cover always
/// applies; an object's cover only counts when it lies roughly between
/// `target` and `attacker`.
pub fn effective_cover(target: Point, attacker: Point, terrain_cover: f64, objects: &[CoverObject]) -> f64 {
    let to_attacker = (attacker - target).normalize_or_zero();
    let object_cover = objects
        .iter()
        .filter_map(|o| {
            let dist = target.distance(o.position);
            if dist > o.radius {
                return None;
            }
            let to_obj = (o.position - target).normalize_or_zero();
            (to_attacker.dot(to_obj) > 0.3).then(|| o.cover_value * (1.0 - dist / o.radius))
        })
        .fold(0.0, f64::max);
    (terrain_cover + object_cover).min(COVER_BONUS_CAP)
}
