//! Lead/intercept math shared by pursuit, combat aiming, and rover chase
//! logic. All three reduce to the same quadratic: given a pursuer at
//! `pursuer_pos` moving at scalar speed `pursuer_speed`, and a target at
//! `target_pos` moving at constant velocity `target_vel`, find the
//! smallest positive `t` such that the pursuer can reach the target's
//! position at time `t`.

use crate::types::{velocity_from_heading_speed, Point};

/// Sentinel intercept time for targets that cannot be caught.
pub const UNCATCHABLE_TIME: f64 = 9999.0;

/// Velocity vector implied by a target's heading (degrees, 0=north CW)
/// and scalar speed. Thin alias kept at the call sites that think in
/// terms of "target velocity" rather than "heading to unit vector".
pub fn target_velocity(heading_deg: f64, speed: f64) -> Point {
    velocity_from_heading_speed(heading_deg, speed)
}

/// Solve `(|v|^2 - s^2) t^2 + 2<d, v> t + |d|^2 = 0` for the smallest
/// positive root, where `d = target_pos - pursuer_pos`.
///
/// Degenerate cases: a stationary target collapses to straight-line
/// time; a discriminant below zero, or no positive root, returns
/// [`UNCATCHABLE_TIME`].
fn solve_intercept_time(
    pursuer_pos: Point,
    pursuer_speed: f64,
    target_pos: Point,
    target_vel: Point,
) -> f64 {
    let d = target_pos - pursuer_pos;

    if target_vel.length_squared() < 1e-12 {
        let dist = d.length();
        return if pursuer_speed > 1e-9 {
            dist / pursuer_speed
        } else if dist < 1e-9 {
            0.0
        } else {
            UNCATCHABLE_TIME
        };
    }

    if pursuer_speed <= 1e-9 {
        return UNCATCHABLE_TIME;
    }

    let a = target_vel.length_squared() - pursuer_speed * pursuer_speed;
    let b = 2.0 * d.dot(target_vel);
    let c = d.length_squared();

    if a.abs() < 1e-9 {
        // Speeds are effectively equal: the quadratic term vanishes and
        // the equation is linear, b*t + c = 0.
        if b.abs() < 1e-9 {
            return if c < 1e-9 { 0.0 } else { UNCATCHABLE_TIME };
        }
        let t = -c / b;
        return if t > 0.0 { t } else { UNCATCHABLE_TIME };
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return UNCATCHABLE_TIME;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    let t2 = (-b - sqrt_disc) / (2.0 * a);

    let mut best = UNCATCHABLE_TIME;
    for t in [t1, t2] {
        if t > 1e-9 && t < best {
            best = t;
        }
    }
    best
}

/// Predicted intercept point: where the pursuer should head to meet the
/// target, assuming the target holds its current velocity.
pub fn predict_intercept(
    pursuer_pos: Point,
    pursuer_speed: f64,
    target_pos: Point,
    target_vel: Point,
) -> Point {
    let t = solve_intercept_time(pursuer_pos, pursuer_speed, target_pos, target_vel);
    if t >= UNCATCHABLE_TIME {
        return target_pos;
    }
    target_pos + target_vel * t
}

/// Aim point for a projectile of `projectile_speed` fired from
/// `shooter_pos` at a target moving with `target_vel`, so the round and
/// target arrive at the same place at the same time.
pub fn lead_target(
    shooter_pos: Point,
    target_pos: Point,
    target_vel: Point,
    projectile_speed: f64,
) -> Point {
    predict_intercept(shooter_pos, projectile_speed, target_pos, target_vel)
}

/// Elapsed time to the `lead_target` aim point, for tests that want to
/// verify the closing-speed identity directly.
pub fn time_to_intercept(
    pursuer_pos: Point,
    pursuer_speed: f64,
    target_pos: Point,
    target_vel: Point,
) -> f64 {
    solve_intercept_time(pursuer_pos, pursuer_speed, target_pos, target_vel)
}
