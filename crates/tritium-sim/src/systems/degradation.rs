//! Health-driven performance degradation: a damaged unit moves
//! slower, reloads slower, and eventually can't fire at all.

use tritium_core::constants::*;

/// Effective speed multiplier for a unit at `health_fraction`.
pub fn speed_factor(health_fraction: f64) -> f64 {
    if health_fraction >= DEGRADATION_THRESHOLD {
        1.0
    } else {
        let t = health_fraction / DEGRADATION_THRESHOLD;
        MIN_SPEED_FACTOR + (1.0 - MIN_SPEED_FACTOR) * t
    }
}

/// Effective cooldown multiplier (>= 1.0, slower) for a unit at
/// `health_fraction`.
pub fn cooldown_factor(health_fraction: f64) -> f64 {
    if health_fraction >= DEGRADATION_THRESHOLD {
        1.0
    } else {
        let t = health_fraction / DEGRADATION_THRESHOLD;
        MAX_COOLDOWN_FACTOR - (MAX_COOLDOWN_FACTOR - 1.0) * t
    }
}

pub fn can_fire(health_fraction: f64) -> bool {
    health_fraction > FIRE_DISABLED_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_health_no_degradation() {
        assert_eq!(speed_factor(1.0), 1.0);
        assert_eq!(cooldown_factor(1.0), 1.0);
    }

    #[test]
    fn test_near_death_hits_floor() {
        assert!((speed_factor(0.0) - MIN_SPEED_FACTOR).abs() < 1e-9);
        assert!((cooldown_factor(0.0) - MAX_COOLDOWN_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn test_fire_disabled_below_threshold() {
        assert!(!can_fire(0.05));
        assert!(can_fire(0.5));
    }
}
