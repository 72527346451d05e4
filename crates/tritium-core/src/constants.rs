//! Simulation constants and tuning parameters.
//!
//! Most of these double as [`crate::config::SimConfig`] defaults — see
//! that module for the subset an operator can override at construction
//! time.

// --- Tick timing ---

/// Default simulation tick rate (Hz).
pub const TICK_RATE_HZ: f64 = 10.0;

/// Default replay snapshot rate (Hz).
pub const SNAPSHOT_RATE_HZ: f64 = 2.0;

// --- World bounds ---

/// Default world half-extent in meters; the battlespace covers
/// `[-bounds, +bounds]^2`.
pub const MAP_BOUNDS: f64 = 200.0;

/// Default terrain grid cell size in meters.
pub const TERRAIN_RESOLUTION: f64 = 5.0;

// --- Spatial index ---

/// Spatial grid cell size in meters, tuned so weapon/vision ranges
/// (25-100 m) touch at most a 3x3 neighbourhood of cells.
pub const SPATIAL_CELL_SIZE: f64 = 50.0;

// --- Event bus ---

/// Per-subscriber bounded queue capacity.
pub const EVENT_QUEUE_CAPACITY: usize = 100;

// --- Engine limits ---

/// Hard cap on concurrently live units; spawn requests past it are
/// rejected with a capacity error.
pub const MAX_LIVE_UNITS: usize = 256;

// --- Cover ---

/// Cap on the cover bonus a unit can accrue from nearby cover objects.
pub const COVER_BONUS_CAP: f64 = 0.8;

// --- Degradation ---

/// Health fraction below which degradation begins to reduce speed and
/// fire rate.
pub const DEGRADATION_THRESHOLD: f64 = 0.5;

/// Effective speed never falls below this fraction of base speed, no
/// matter how damaged the unit is.
pub const MIN_SPEED_FACTOR: f64 = 0.4;

/// Effective cooldown never exceeds this multiple of base cooldown.
pub const MAX_COOLDOWN_FACTOR: f64 = 2.0;

/// Health fraction below which a unit's weapon jams outright.
pub const FIRE_DISABLED_THRESHOLD: f64 = 0.1;

// --- Morale ---

/// Starting morale for a newly spawned unit.
pub const DEFAULT_MORALE: f64 = 0.7;

/// Morale recovery rate (per second) once 3 s have passed since the
/// last hit taken.
pub const MORALE_RECOVERY_RATE: f64 = 0.02;

/// Seconds since last damage before morale begins recovering.
pub const MORALE_RECOVERY_DELAY_SECS: f64 = 3.0;

/// Morale lost per point of damage taken.
pub const DAMAGE_MORALE_LOSS_PER_DAMAGE: f64 = 0.005;

/// Morale lost when an ally is eliminated nearby.
pub const ALLY_ELIMINATED_LOSS: f64 = 0.15;

/// Morale gained when an enemy is eliminated nearby.
pub const ENEMY_ELIMINATED_BOOST: f64 = 0.10;

/// Radius within which an elimination affects a unit's morale. Not
/// pinned down by the source material; fixed here as a conservative
/// default (see DESIGN.md).
pub const MORALE_PROXIMITY_RADIUS: f64 = 20.0;

/// Below this, a unit is broken: it stops fighting and flees.
pub const MORALE_BROKEN_THRESHOLD: f64 = 0.1;

/// Below this, a unit is suppressed: it skips offensive actions.
pub const MORALE_SUPPRESSED_THRESHOLD: f64 = 0.3;

/// Above this, a unit is emboldened: +20% damage, faster.
pub const MORALE_EMBOLDENED_THRESHOLD: f64 = 0.9;

/// Damage multiplier bonus for an emboldened unit.
pub const EMBOLDENED_DAMAGE_BONUS: f64 = 0.2;

/// Speed bonus for an emboldened unit. The source material says only
/// "faster"; the damage bonus is reused as the concrete figure.
pub const EMBOLDENED_SPEED_BONUS: f64 = 0.2;

// --- Combat ---

/// Floor on hit probability regardless of range.
pub const MIN_HIT_PROBABILITY: f64 = 0.25;

/// Hit-probability bonus applied while emboldened.
pub const EMBOLDENED_HIT_BONUS: f64 = 0.1;

/// Hit-probability penalty applied while suppressed.
pub const SUPPRESSED_HIT_PENALTY: f64 = 0.2;

// --- Pursuit ---

/// Lookahead horizon used to predict a hostile's future position.
pub const PURSUIT_LOOKAHEAD_SECS: f64 = 3.0;

/// Maximum number of friendlies auto-assigned to pursue the same
/// hostile target (anti-dogpile).
pub const PURSUIT_MAX_ASSIGNEES_PER_TARGET: usize = 2;

// --- Squad manager ---

/// Single-link connectivity radius for squad membership.
pub const SQUAD_RADIUS: f64 = 15.0;

/// Rank spacing between formation ranks.
pub const FORMATION_SPACING: f64 = 4.0;

/// Per-tick convergence factor for followers moving into formation.
pub const FORMATION_CONVERGENCE: f64 = 0.15;

/// Seconds before an unacknowledged squad order expires.
pub const ORDER_TIMEOUT_S: f64 = 10.0;

/// Range within which a stationary defender triggers a flank order.
pub const LEADER_SAFE_RANGE: f64 = 30.0;

/// Average squad health fraction below which the leader orders retreat.
pub const RETREAT_HEALTH_THRESHOLD: f64 = 0.3;

/// Cohesion value a squad drops to when its leader is eliminated.
pub const COHESION_DROP_ON_LEADER_DEATH: f64 = 0.3;

/// Cohesion recovery rate (per second) while a leader is active.
pub const COHESION_RECOVERY_RATE: f64 = 0.01;

/// Per-tick lateral offset magnitude for a flanking follower.
pub const FLANK_OFFSET_STEP: f64 = 2.0;

/// Radial distance of the retreat waypoint from the origin, or along
/// current heading when already at the origin.
pub const RETREAT_WAYPOINT_MAGNITUDE: f64 = 100.0;

// --- Swarm controller (boids) ---

/// Separation rule radius in meters.
pub const SWARM_SEPARATION_RADIUS: f64 = 5.0;
/// Separation rule weight.
pub const SWARM_SEPARATION_WEIGHT: f64 = 2.5;

/// Alignment rule radius in meters.
pub const SWARM_ALIGNMENT_RADIUS: f64 = 15.0;
/// Alignment rule weight.
pub const SWARM_ALIGNMENT_WEIGHT: f64 = 1.0;

/// Cohesion rule radius in meters.
pub const SWARM_COHESION_RADIUS: f64 = 20.0;
/// Cohesion rule weight.
pub const SWARM_COHESION_WEIGHT: f64 = 0.8;

/// Target-seeking rule weight.
pub const SWARM_TARGET_WEIGHT: f64 = 1.5;

/// Clamp on the combined steering force magnitude, in m/tick.
pub const SWARM_MAX_FORCE: f64 = 3.0;

/// A drone only turns to face its steering force when the magnitude
/// exceeds this; weaker forces nudge position without changing heading.
pub const SWARM_HEADING_UPDATE_THRESHOLD: f64 = 0.01;

// --- Hostile behavior ---

/// Lateral offset applied per flank event.
pub const HOSTILE_FLANK_STEP: f64 = 1.5;
/// Flank step while sensor-detected (doubled).
pub const HOSTILE_DETECTED_FLANK_STEP: f64 = HOSTILE_FLANK_STEP * 2.0;
/// Minimum/maximum seconds between flank offsets.
pub const HOSTILE_FLANK_INTERVAL: (f64, f64) = (3.0, 5.0);
/// Range within which a stationary turret triggers flanking.
pub const HOSTILE_FLANK_TRIGGER_RANGE: f64 = 50.0;

/// Radius within which hostiles count each other toward a rush.
pub const GROUP_RUSH_RADIUS: f64 = 30.0;
/// A hostile joins a rush when at least this many others are within
/// [`GROUP_RUSH_RADIUS`].
pub const GROUP_RUSH_MIN_NEIGHBOURS: usize = 2;
/// Speed multiplier applied to rushing hostiles.
pub const GROUP_RUSH_SPEED_BOOST: f64 = 1.2;
/// Dodge interval while rushing (wider, charging together).
pub const GROUP_RUSH_DODGE_INTERVAL: (f64, f64) = (6.0, 10.0);

/// Normal dodge interval bounds in seconds.
pub const HOSTILE_DODGE_INTERVAL: (f64, f64) = (2.0, 4.0);
/// Dodge lateral offset bound in meters.
pub const HOSTILE_DODGE_OFFSET: f64 = 1.5;

/// Health fraction below which a hostile seeks cover.
pub const COVER_SEEK_HEALTH_THRESHOLD: f64 = 0.5;
/// Per-tick step toward cover, in meters.
pub const COVER_SEEK_STEP: f64 = 2.0;
/// Range within which a wounded hostile breaks for the nearest
/// building instead of inching toward loose cover.
pub const BUILDING_SEEK_RANGE: f64 = 50.0;
/// Speed bonus applied while running for a building.
pub const BUILDING_SEEK_SPEED_BOOST: f64 = 1.3;

/// Speed multiplier applied to a fleeing hostile.
pub const FLEE_SPEED_BOOST: f64 = 1.5;
/// Minimum/maximum seconds between zigzag jinks while fleeing.
pub const FLEE_ZIGZAG_INTERVAL: (f64, f64) = (1.0, 2.0);
/// Lateral zigzag offset while fleeing, in meters.
pub const FLEE_ZIGZAG_OFFSET: f64 = 2.0;

/// Speed factor applied while reconning.
pub const RECON_SPEED_FACTOR: f64 = 0.5;
/// Cooldown factor applied while suppressing.
pub const SUPPRESS_COOLDOWN_FACTOR: f64 = 0.5;
/// Speed bonus applied while sensor-detected.
pub const DETECTED_SPEED_BOOST: f64 = 1.2;

/// Radius within which an `emp` ability hits enemies with a slow effect.
pub const EMP_RADIUS: f64 = 15.0;

// --- Replay ---

/// Default bound on stored snapshot frames (~25 min at 2 Hz).
pub const REPLAY_MAX_FRAMES: usize = 3000;

/// Heatmap quantization grid size in meters.
pub const HEATMAP_GRID_SIZE: f64 = 2.0;

// --- Spectator playback ---

/// Minimum/maximum playback speed multipliers.
pub const SPECTATOR_MIN_SPEED: f64 = 0.25;
pub const SPECTATOR_MAX_SPEED: f64 = 4.0;
