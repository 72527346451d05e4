//! Stationary turret behavior: rotate to track, fire when able.

use tritium_core::intercept::lead_target;
use tritium_core::types::{bearing_to, Point};

use super::base::{nearest_in_range, EnemyInfo};

/// Everything a turret needs to decide on one tick, independent of
/// how the caller stores component data.
pub struct TurretContext<'a> {
    pub position: Point,
    pub heading: f64,
    pub weapon_range: f64,
    pub projectile_speed: f64,
    pub fsm_state: &'a str,
    pub can_fire: bool,
    pub ready_to_fire: bool,
}

/// The turret's decision for this tick.
pub struct TurretDecision {
    pub new_heading: f64,
    pub fire: bool,
    pub target_id: Option<String>,
    pub aim_point: Point,
}

const FIRING_STATES: [&str; 3] = ["", "engaging", "tracking"];

pub fn tick<'a>(ctx: &TurretContext, enemies: &'a [EnemyInfo<'a>]) -> TurretDecision {
    let Some(target) = nearest_in_range(ctx.position, ctx.weapon_range, enemies) else {
        return TurretDecision {
            new_heading: ctx.heading,
            fire: false,
            target_id: None,
            aim_point: ctx.position,
        };
    };

    let aim_point = lead_target(ctx.position, target.position, target.velocity, ctx.projectile_speed);
    let new_heading = bearing_to(ctx.position, aim_point);

    let fire = ctx.can_fire
        && ctx.ready_to_fire
        && FIRING_STATES.contains(&ctx.fsm_state);

    TurretDecision {
        new_heading,
        fire,
        target_id: Some(target.id.to_string()),
        aim_point,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turret_holds_fire_when_out_of_range() {
        let ctx = TurretContext {
            position: Point::ZERO,
            heading: 0.0,
            weapon_range: 10.0,
            projectile_speed: 25.0,
            fsm_state: "",
            can_fire: true,
            ready_to_fire: true,
        };
        let enemies = vec![EnemyInfo { id: "far", position: Point::new(50.0, 0.0), velocity: Point::ZERO, stationary: false }];
        let decision = tick(&ctx, &enemies);
        assert!(!decision.fire);
        assert!(decision.target_id.is_none());
    }

    #[test]
    fn test_turret_fires_on_stationary_target_in_range() {
        let ctx = TurretContext {
            position: Point::ZERO,
            heading: 0.0,
            weapon_range: 100.0,
            projectile_speed: 25.0,
            fsm_state: "engaging",
            can_fire: true,
            ready_to_fire: true,
        };
        let enemies = vec![EnemyInfo { id: "near", position: Point::new(0.0, 30.0), velocity: Point::ZERO, stationary: false }];
        let decision = tick(&ctx, &enemies);
        assert!(decision.fire);
        assert_eq!(decision.target_id.as_deref(), Some("near"));
    }

    #[test]
    fn test_turret_does_not_fire_in_rtb_state() {
        let ctx = TurretContext {
            position: Point::ZERO,
            heading: 0.0,
            weapon_range: 100.0,
            projectile_speed: 25.0,
            fsm_state: "rtb",
            can_fire: true,
            ready_to_fire: true,
        };
        let enemies = vec![EnemyInfo { id: "near", position: Point::new(0.0, 30.0), velocity: Point::ZERO, stationary: false }];
        assert!(!tick(&ctx, &enemies).fire);
    }
}
