//! Ground rover behavior: engages the target the pursuit system
//! assigned it, leading fleeing targets along a projected waypoint
//! rather than a straight intercept.

use tritium_core::intercept::lead_target;
use tritium_core::types::{bearing_to, Point};

use super::base::{nearest_in_range, EnemyInfo};
use crate::pursuit::calculate_intercept_waypoint;

pub struct RoverContext<'a> {
    pub position: Point,
    pub heading: f64,
    pub weapon_range: f64,
    pub projectile_speed: f64,
    pub fsm_state: &'a str,
    pub can_fire: bool,
    pub ready_to_fire: bool,
    pub pursuit_lookahead_secs: f64,
}

pub struct RoverDecision {
    pub new_heading: f64,
    pub fire: bool,
    pub target_id: Option<String>,
    pub aim_point: Point,
}

const FIRING_STATES: [&str; 5] = ["", "engaging", "pursuing", "patrolling", "idle"];

pub fn tick<'a>(
    ctx: &RoverContext,
    assigned: Option<EnemyInfo<'a>>,
    assigned_fleeing: bool,
    enemies: &'a [EnemyInfo<'a>],
) -> RoverDecision {
    let hold = RoverDecision {
        new_heading: ctx.heading,
        fire: false,
        target_id: None,
        aim_point: ctx.position,
    };
    if matches!(ctx.fsm_state, "retreating" | "rtb") {
        return hold;
    }

    let Some(target) = assigned.or_else(|| nearest_in_range(ctx.position, ctx.weapon_range, enemies))
    else {
        return hold;
    };

    // A fleeing target is chased via its projected escape route; a
    // closing one just gets a lead point.
    let aim_point = if assigned_fleeing {
        calculate_intercept_waypoint(
            ctx.position,
            ctx.projectile_speed,
            target.position,
            target.velocity,
            ctx.pursuit_lookahead_secs,
        )
    } else {
        lead_target(ctx.position, target.position, target.velocity, ctx.projectile_speed)
    };
    let in_range = ctx.position.distance(target.position) <= ctx.weapon_range;
    let fire = ctx.can_fire && ctx.ready_to_fire && in_range && FIRING_STATES.contains(&ctx.fsm_state);

    RoverDecision {
        new_heading: bearing_to(ctx.position, aim_point),
        fire,
        target_id: Some(target.id.to_string()),
        aim_point,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(fsm_state: &str) -> RoverContext {
        RoverContext {
            position: Point::ZERO,
            heading: 0.0,
            weapon_range: 100.0,
            projectile_speed: 25.0,
            fsm_state,
            can_fire: true,
            ready_to_fire: true,
            pursuit_lookahead_secs: 3.0,
        }
    }

    fn enemy(id: &str, x: f64, y: f64) -> EnemyInfo {
        EnemyInfo { id, position: Point::new(x, y), velocity: Point::ZERO, stationary: false }
    }

    #[test]
    fn test_rover_holds_fire_while_retreating() {
        let enemies = vec![enemy("near", 0.0, 10.0)];
        let decision = tick(&ctx("retreating"), Some(enemies[0]), false, &enemies);
        assert!(!decision.fire);
        assert!(decision.target_id.is_none());
    }

    #[test]
    fn test_rover_engages_assigned_target() {
        let enemies = vec![enemy("near", 0.0, 10.0), enemy("other", 0.0, 20.0)];
        let decision = tick(&ctx("patrolling"), Some(enemies[1]), false, &enemies);
        assert!(decision.fire);
        assert_eq!(decision.target_id.as_deref(), Some("other"));
    }

    #[test]
    fn test_rover_falls_back_to_nearest_without_assignment() {
        let enemies = vec![enemy("near", 0.0, 10.0)];
        let decision = tick(&ctx("idle"), None, false, &enemies);
        assert_eq!(decision.target_id.as_deref(), Some("near"));
    }

    #[test]
    fn test_rover_leads_fleeing_target_along_projection() {
        let fleeing = EnemyInfo {
            id: "runner",
            position: Point::new(0.0, 30.0),
            velocity: Point::new(0.0, 3.0),
            stationary: false,
        };
        let decision = tick(&ctx("pursuing"), Some(fleeing), true, &[fleeing]);
        // Aim well ahead of the runner's current position.
        assert!(decision.aim_point.y > 30.0);
    }
}
