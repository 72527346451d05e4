//! Engine-owned records that are not ECS components: squads, cover
//! objects, and the upgrade/ability catalog. These are stored in plain
//! maps keyed by id rather than as `hecs` entities, since they outlive
//! (and reference, by id only) the units that belong to them.

use serde::{Deserialize, Serialize};

use crate::enums::{EffectKind, Formation, SquadOrder};
use crate::types::Point;

/// A coordinated cluster of hostile units, auto-formed and dissolved
/// by the squad manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Squad {
    pub id: String,
    pub member_ids: Vec<String>,
    pub leader_id: Option<String>,
    pub formation: Formation,
    pub shared_target_id: Option<String>,
    pub officer_rank: u8,
    pub cohesion: f64,
    pub last_order: Option<SquadOrder>,
    pub order_timestamp: f64,
}

impl Squad {
    pub fn new(id: String, member_ids: Vec<String>) -> Self {
        Self {
            id,
            member_ids,
            leader_id: None,
            formation: Formation::Wedge,
            shared_target_id: None,
            officer_rank: 0,
            cohesion: 1.0,
            last_order: None,
            order_timestamp: 0.0,
        }
    }

    /// Per-member offset (in the leader's local frame, +y forward) for
    /// the squad's current formation.
    pub fn formation_offsets(&self, formation_spacing: f64) -> Vec<(String, Point)> {
        let followers: Vec<&String> = self
            .member_ids
            .iter()
            .filter(|id| Some(id.as_str()) != self.leader_id.as_deref())
            .collect();

        let mut offsets = Vec::with_capacity(followers.len());
        match self.formation {
            Formation::Wedge => {
                for (i, id) in followers.iter().enumerate() {
                    let rank = (i / 2 + 1) as f64;
                    let side = if i % 2 == 0 { -1.0 } else { 1.0 };
                    let angle = 45f64.to_radians();
                    let depth = rank * formation_spacing * angle.cos();
                    let lateral = rank * formation_spacing * angle.sin() * side;
                    offsets.push(((*id).clone(), Point::new(lateral, -depth)));
                }
            }
            Formation::Line => {
                let half = (followers.len() as f64 - 1.0) / 2.0;
                for (i, id) in followers.iter().enumerate() {
                    let lateral = (i as f64 - half) * formation_spacing;
                    offsets.push(((*id).clone(), Point::new(lateral, 0.0)));
                }
            }
            Formation::Column => {
                for (i, id) in followers.iter().enumerate() {
                    let depth = (i + 1) as f64 * formation_spacing;
                    offsets.push(((*id).clone(), Point::new(0.0, -depth)));
                }
            }
            Formation::Circle => {
                let n = followers.len().max(1) as f64;
                let radius = formation_spacing * n / std::f64::consts::TAU;
                for (i, id) in followers.iter().enumerate() {
                    let angle = std::f64::consts::TAU * (i as f64) / n;
                    offsets.push(((*id).clone(), Point::new(radius * angle.sin(), radius * angle.cos())));
                }
            }
        }
        offsets
    }
}

/// A static cover-granting object (sandbag wall, vehicle hulk, ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoverObject {
    pub position: Point,
    pub radius: f64,
    pub cover_value: f64,
}

/// A passive, stackable stat modifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Per-stat multipliers, e.g. `{"speed": 1.2}`. `"damage_reduction"`
    /// is additive rather than multiplicative.
    pub stat_modifiers: std::collections::HashMap<String, f64>,
    pub max_stacks: u32,
    pub eligible_types: Option<Vec<String>>,
}

/// An active, cooldown-gated ability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ability {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cooldown: f64,
    /// Zero for an instant ability; otherwise seconds the effect lasts.
    pub duration: f64,
    pub effect: EffectKind,
    pub magnitude: f64,
    pub eligible_types: Option<Vec<String>>,
}

/// An ability in flight: a duration effect currently modifying a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub target_id: String,
    pub ability_id: String,
    pub effect: EffectKind,
    pub magnitude: f64,
    pub remaining: f64,
}
