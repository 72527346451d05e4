//! Hostile behavior: a layered priority cascade over a single hostile
//! foot/vehicle unit. Later steps only run if an earlier one already
//! decided the tick.
//!
//! Priority order: spawning > fleeing > broken (start fleeing) >
//! suppressed (dodge only) > fire > run for a building / creep to
//! cover > flank a stationary defender > routine dodge jink.
//!
//! Distress/contact/retreat signaling over a comms mesh is out of
//! scope; this cascade only reads morale, health, and nearby geometry.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use tritium_core::constants::*;
use tritium_core::intercept::lead_target;
use tritium_core::types::{bearing_to, heading_to_unit, Point};

use super::base::{nearest, nearest_in_range, EnemyInfo};

pub struct HostileContext<'a> {
    pub id: &'a str,
    pub position: Point,
    pub heading: f64,
    pub weapon_range: f64,
    pub projectile_speed: f64,
    pub fsm_state: &'a str,
    pub health_fraction: f64,
    pub morale: f64,
    pub can_fire: bool,
    pub ready_to_fire: bool,
    pub now: f64,
    /// Other hostiles within [`GROUP_RUSH_RADIUS`].
    pub nearby_hostile_count: usize,
    pub nearest_cover: Option<Point>,
    pub nearest_building: Option<Point>,
    pub detected: bool,
    pub map_bounds: f64,
}

#[derive(Debug)]
pub struct HostileDecision {
    pub new_heading: f64,
    pub speed_multiplier: f64,
    /// Cooldown scale this tick (< 1.0 while suppressing fire).
    pub cooldown_multiplier: f64,
    pub fire: bool,
    pub target_id: Option<String>,
    pub aim_point: Point,
    pub new_fsm_state: &'static str,
    /// Replaces the unit's waypoint list when set (flee routes, runs
    /// for a building).
    pub waypoint: Option<Point>,
    /// Lateral positional nudge applied this tick (dodges, flanks,
    /// zigzags, creeping toward cover).
    pub offset: Option<Point>,
}

impl HostileDecision {
    fn passive(ctx: &HostileContext, fsm: &'static str) -> Self {
        Self {
            new_heading: ctx.heading,
            speed_multiplier: 1.0,
            cooldown_multiplier: 1.0,
            fire: false,
            target_id: None,
            aim_point: ctx.position,
            new_fsm_state: fsm,
            waypoint: None,
            offset: None,
        }
    }
}

/// FSM states in which a hostile's weapon is live.
const FIRING_STATES: [&str; 6] = ["", "advancing", "flanking", "engaging", "suppressing", "retreating_under_fire"];

/// Per-unit scratch state carried across ticks: randomized dodge,
/// flank, and zigzag schedules plus current rush membership.
#[derive(Debug, Default)]
pub struct HostileState {
    next_dodge: HashMap<String, f64>,
    next_flank: HashMap<String, f64>,
    next_zigzag: HashMap<String, f64>,
    rush: HashSet<String>,
}

impl HostileState {
    pub fn clear_unit(&mut self, id: &str) {
        self.next_dodge.remove(id);
        self.next_flank.remove(id);
        self.next_zigzag.remove(id);
        self.rush.remove(id);
    }

    pub fn clear(&mut self) {
        self.next_dodge.clear();
        self.next_flank.clear();
        self.next_zigzag.clear();
        self.rush.clear();
    }

    pub fn is_rushing(&self, id: &str) -> bool {
        self.rush.contains(id)
    }

    pub fn rush_members(&self) -> impl Iterator<Item = &str> {
        self.rush.iter().map(String::as_str)
    }
}

/// Fires when `now` passes the unit's scheduled time, then reschedules
/// a fresh random delay in `interval`. The first call only schedules,
/// so an action never triggers before its minimum interval.
fn due(
    schedule: &mut HashMap<String, f64>,
    id: &str,
    now: f64,
    interval: (f64, f64),
    rng: &mut impl Rng,
) -> bool {
    let (lo, hi) = interval;
    match schedule.get(id) {
        Some(&at) if now >= at => {
            schedule.insert(id.to_string(), now + rng.gen_range(lo..hi));
            true
        }
        Some(_) => false,
        None => {
            schedule.insert(id.to_string(), now + rng.gen_range(lo..hi));
            false
        }
    }
}

fn perpendicular(direction: Point) -> Point {
    Point::new(-direction.y, direction.x)
}

/// Escape route: the point on the map boundary farthest from the
/// averaged defender position, keeping the unit's off-axis coordinate.
fn escape_waypoint(position: Point, enemies: &[EnemyInfo], map_bounds: f64) -> Point {
    let centroid = if enemies.is_empty() {
        Point::ZERO
    } else {
        enemies.iter().map(|e| e.position).sum::<Point>() / enemies.len() as f64
    };
    [
        Point::new(-map_bounds, position.y),
        Point::new(map_bounds, position.y),
        Point::new(position.x, -map_bounds),
        Point::new(position.x, map_bounds),
    ]
    .into_iter()
    .max_by(|a, b| centroid.distance_squared(*a).total_cmp(&centroid.distance_squared(*b)))
    .unwrap_or(position)
}

fn flee(
    state: &mut HostileState,
    ctx: &HostileContext,
    enemies: &[EnemyInfo],
    rng: &mut impl Rng,
) -> HostileDecision {
    let waypoint = escape_waypoint(ctx.position, enemies, ctx.map_bounds);
    let offset = if due(&mut state.next_zigzag, ctx.id, ctx.now, FLEE_ZIGZAG_INTERVAL, rng) {
        let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let away = (waypoint - ctx.position).normalize_or_zero();
        Some(perpendicular(away) * (FLEE_ZIGZAG_OFFSET * side))
    } else {
        None
    };
    HostileDecision {
        new_heading: bearing_to(ctx.position, waypoint),
        speed_multiplier: FLEE_SPEED_BOOST,
        waypoint: Some(waypoint),
        offset,
        ..HostileDecision::passive(ctx, "fleeing")
    }
}

pub fn tick<'a>(
    state: &mut HostileState,
    ctx: &HostileContext,
    enemies: &'a [EnemyInfo<'a>],
    rng: &mut impl Rng,
) -> HostileDecision {
    // Freshly spawned units are inert for their first moments.
    if ctx.fsm_state == "spawning" {
        state.rush.remove(ctx.id);
        return HostileDecision::passive(ctx, "spawning");
    }

    // Already routed, or morale just collapsed: run for the far edge.
    if ctx.fsm_state == "fleeing" || ctx.morale < MORALE_BROKEN_THRESHOLD {
        state.rush.remove(ctx.id);
        return flee(state, ctx, enemies, rng);
    }

    let group_rush = ctx.nearby_hostile_count >= GROUP_RUSH_MIN_NEIGHBOURS;
    if group_rush {
        state.rush.insert(ctx.id.to_string());
    } else {
        state.rush.remove(ctx.id);
    }

    let mut speed_multiplier = if group_rush { GROUP_RUSH_SPEED_BOOST } else { 1.0 };
    let mut cooldown_multiplier = 1.0;
    if ctx.fsm_state == "reconning" {
        speed_multiplier *= RECON_SPEED_FACTOR;
    }
    if ctx.fsm_state == "suppressing" {
        cooldown_multiplier = SUPPRESS_COOLDOWN_FACTOR;
    }
    if ctx.detected {
        speed_multiplier *= DETECTED_SPEED_BOOST;
    }

    // Suppressed: no offensive action, only the dodge step below.
    let suppressed = ctx.morale < MORALE_SUPPRESSED_THRESHOLD;

    if !suppressed {
        if let Some(target) = nearest_in_range(ctx.position, ctx.weapon_range, enemies) {
            if FIRING_STATES.contains(&ctx.fsm_state) {
                let aim_point =
                    lead_target(ctx.position, target.position, target.velocity, ctx.projectile_speed);
                return HostileDecision {
                    new_heading: bearing_to(ctx.position, aim_point),
                    speed_multiplier,
                    cooldown_multiplier,
                    fire: ctx.can_fire && ctx.ready_to_fire,
                    target_id: Some(target.id.to_string()),
                    aim_point,
                    ..HostileDecision::passive(ctx, "engaging")
                };
            }
        }
    }

    // Badly hurt: sprint for the nearest building if one is close,
    // otherwise creep toward loose cover.
    if ctx.health_fraction < COVER_SEEK_HEALTH_THRESHOLD {
        if let Some(building) = ctx.nearest_building {
            if ctx.position.distance(building) <= BUILDING_SEEK_RANGE {
                return HostileDecision {
                    new_heading: bearing_to(ctx.position, building),
                    speed_multiplier: speed_multiplier * BUILDING_SEEK_SPEED_BOOST,
                    cooldown_multiplier,
                    waypoint: Some(building),
                    ..HostileDecision::passive(ctx, "seeking_cover")
                };
            }
        }
        if let Some(cover) = ctx.nearest_cover {
            let to_cover = cover - ctx.position;
            if to_cover.length() > 1e-6 {
                let step = to_cover.normalize() * COVER_SEEK_STEP;
                return HostileDecision {
                    new_heading: bearing_to(ctx.position, cover),
                    speed_multiplier,
                    cooldown_multiplier,
                    offset: Some(step),
                    ..HostileDecision::passive(ctx, "seeking_cover")
                };
            }
        }
    }

    // Flank an emplaced defender holding at range.
    if let Some(enemy) = nearest(ctx.position, enemies) {
        if enemy.stationary
            && ctx.position.distance(enemy.position) <= HOSTILE_FLANK_TRIGGER_RANGE
            && !suppressed
            && due(&mut state.next_flank, ctx.id, ctx.now, HOSTILE_FLANK_INTERVAL, rng)
        {
            let step = if ctx.detected { HOSTILE_DETECTED_FLANK_STEP } else { HOSTILE_FLANK_STEP };
            let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let to_enemy = (enemy.position - ctx.position).normalize_or_zero();
            return HostileDecision {
                speed_multiplier,
                cooldown_multiplier,
                offset: Some(perpendicular(to_enemy) * (step * side)),
                ..HostileDecision::passive(ctx, "flanking")
            };
        }
    }

    // Routine jink dodge, lowest priority. Rushing groups charge in
    // straighter lines.
    let interval = if group_rush { GROUP_RUSH_DODGE_INTERVAL } else { HOSTILE_DODGE_INTERVAL };
    if due(&mut state.next_dodge, ctx.id, ctx.now, interval, rng) {
        let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let forward = heading_to_unit(ctx.heading);
        return HostileDecision {
            speed_multiplier,
            cooldown_multiplier,
            offset: Some(perpendicular(forward) * (HOSTILE_DODGE_OFFSET * side)),
            ..HostileDecision::passive(ctx, "advancing")
        };
    }

    HostileDecision {
        speed_multiplier,
        cooldown_multiplier,
        ..HostileDecision::passive(ctx, "advancing")
    }
}
