//! Fire resolution: a weapon discharge rolls a hit probability that
//! falls off with range, then on a hit applies damage scaled by
//! morale, cover, and damage reduction.

use rand::Rng;
use tritium_core::constants::MIN_HIT_PROBABILITY;

use super::morale;

pub struct FireResult {
    pub hit: bool,
    pub damage: f64,
}

/// Range-falloff hit chance: 1.0 inside 30% of `weapon_range`, decaying
/// linearly to [`MIN_HIT_PROBABILITY`] at max range, then shifted by
/// the shooter's morale state.
pub fn hit_probability(range: f64, weapon_range: f64, shooter_morale: f64) -> f64 {
    if weapon_range <= 0.0 {
        return 0.0;
    }
    let near = weapon_range * 0.3;
    let falloff = if range <= near {
        1.0
    } else {
        let t = ((range - near) / (weapon_range - near).max(1e-9)).clamp(0.0, 1.0);
        1.0 - t * (1.0 - MIN_HIT_PROBABILITY)
    };
    let (_, hit_modifier) = morale::combat_modifiers(shooter_morale);
    (falloff + hit_modifier).clamp(MIN_HIT_PROBABILITY, 1.0)
}

/// Resolves one shot: rolls to hit, then on a hit applies the morale
/// damage bonus and subtracts cover and damage-reduction fractions.
pub fn resolve_fire(
    rng: &mut impl Rng,
    range: f64,
    weapon_range: f64,
    weapon_damage: f64,
    cover_bonus: f64,
    damage_reduction: f64,
    shooter_morale: f64,
) -> FireResult {
    let p_hit = hit_probability(range, weapon_range, shooter_morale);
    let hit = rng.gen_bool(p_hit);
    let (damage_modifier, _) = morale::combat_modifiers(shooter_morale);
    let damage = if hit {
        weapon_damage * damage_modifier * (1.0 - cover_bonus) * (1.0 - damage_reduction)
    } else {
        0.0
    };
    FireResult { hit, damage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_hit_probability_decays_with_range() {
        let close = hit_probability(1.0, 100.0, 0.7);
        let far = hit_probability(99.0, 100.0, 0.7);
        assert!(close > far);
    }

    #[test]
    fn test_hit_probability_floors_at_minimum() {
        let p = hit_probability(100.0, 100.0, 0.1);
        assert!((p - MIN_HIT_PROBABILITY).abs() < 1e-9);
    }

    #[test]
    fn test_cover_and_reduction_shrink_damage() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let full = resolve_fire(&mut rng.clone(), 5.0, 50.0, 10.0, 0.0, 0.0, 0.7);
        let reduced = resolve_fire(&mut rng, 5.0, 50.0, 10.0, 0.5, 0.2, 0.7);
        if full.hit && reduced.hit {
            assert!(reduced.damage < full.damage);
        }
    }

    #[test]
    fn test_resolve_fire_deterministic_with_seed() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = resolve_fire(&mut rng, 5.0, 50.0, 10.0, 0.0, 0.0, 0.7);
        if result.hit {
            assert!(result.damage > 0.0);
        } else {
            assert_eq!(result.damage, 0.0);
        }
    }
}
