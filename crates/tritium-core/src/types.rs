//! Fundamental geometric and simulation types.
//!
//! The battlespace is a flat 2D plane: `Point` is `(x, y)` in metres.
//! Heading is degrees, 0 = north, increasing clockwise, which is the
//! convention every behavior and the intercept solver share.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A position or displacement on the battlespace plane, in metres.
pub type Point = DVec2;

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the configured tick rate.
    pub fn dt(&self, tick_rate_hz: f64) -> f64 {
        1.0 / tick_rate_hz
    }

    /// Advance by one tick.
    pub fn advance(&mut self, tick_rate_hz: f64) {
        self.tick += 1;
        self.elapsed_secs += self.dt(tick_rate_hz);
    }
}

/// Convert a heading in degrees (0 = north, clockwise) to a unit vector.
pub fn heading_to_unit(heading_deg: f64) -> Point {
    let rad = heading_deg.to_radians();
    Point::new(rad.sin(), rad.cos())
}

/// Velocity vector implied by a heading and scalar speed.
pub fn velocity_from_heading_speed(heading_deg: f64, speed: f64) -> Point {
    heading_to_unit(heading_deg) * speed
}

/// Heading in degrees (0 = north, clockwise) pointing along `v`.
/// Returns `None` for a near-zero vector, since heading is undefined.
pub fn heading_from_vector(v: Point) -> Option<f64> {
    if v.length_squared() < 1e-12 {
        return None;
    }
    Some(v.x.atan2(v.y).to_degrees().rem_euclid(360.0))
}

/// Bearing in degrees (0 = north, clockwise) from `from` to `to`.
pub fn bearing_to(from: Point, to: Point) -> f64 {
    let d = to - from;
    d.x.atan2(d.y).to_degrees().rem_euclid(360.0)
}
