//! Airborne friendly drone behavior: orbit/scout states additionally
//! permit firing, but `rtb` always holds fire.

use tritium_core::intercept::lead_target;
use tritium_core::types::{bearing_to, Point};

use super::base::{nearest_in_range, EnemyInfo};

pub struct DroneContext<'a> {
    pub position: Point,
    pub heading: f64,
    pub weapon_range: f64,
    pub projectile_speed: f64,
    pub fsm_state: &'a str,
    pub can_fire: bool,
    pub ready_to_fire: bool,
}

pub struct DroneDecision {
    pub new_heading: f64,
    pub fire: bool,
    pub target_id: Option<String>,
    pub aim_point: Point,
}

const FIRING_STATES: [&str; 5] = ["", "engaging", "orbiting", "scouting", "idle"];

pub fn tick<'a>(ctx: &DroneContext, enemies: &'a [EnemyInfo<'a>]) -> DroneDecision {
    if ctx.fsm_state == "rtb" {
        return DroneDecision {
            new_heading: ctx.heading,
            fire: false,
            target_id: None,
            aim_point: ctx.position,
        };
    }

    let Some(target) = nearest_in_range(ctx.position, ctx.weapon_range, enemies) else {
        return DroneDecision {
            new_heading: ctx.heading,
            fire: false,
            target_id: None,
            aim_point: ctx.position,
        };
    };

    let aim_point = lead_target(ctx.position, target.position, target.velocity, ctx.projectile_speed);
    let new_heading = bearing_to(ctx.position, aim_point);
    let fire = ctx.can_fire && ctx.ready_to_fire && FIRING_STATES.contains(&ctx.fsm_state);

    DroneDecision {
        new_heading,
        fire,
        target_id: Some(target.id.to_string()),
        aim_point,
    }
}
