//! The upgrade/ability catalog and the registry tracking which units
//! hold which upgrades and which abilities are on cooldown.

use std::collections::HashMap;

use tritium_core::enums::EffectKind;
use tritium_core::model::{Ability, ActiveEffect, Upgrade};

pub fn default_upgrades() -> Vec<Upgrade> {
    let pct = |stat: &str, mult: f64| {
        let mut m = HashMap::new();
        m.insert(stat.to_string(), mult);
        m
    };
    vec![
        Upgrade {
            id: "armor_plating".into(),
            name: "Armor Plating".into(),
            description: "+25% max health".into(),
            stat_modifiers: pct("max_health", 1.25),
            max_stacks: 3,
            eligible_types: None,
        },
        Upgrade {
            id: "enhanced_optics".into(),
            name: "Enhanced Optics".into(),
            description: "+20% weapon range".into(),
            stat_modifiers: pct("weapon_range", 1.20),
            max_stacks: 3,
            eligible_types: None,
        },
        Upgrade {
            id: "rapid_fire".into(),
            name: "Rapid Fire".into(),
            description: "-30% weapon cooldown".into(),
            stat_modifiers: pct("weapon_cooldown", 0.70),
            max_stacks: 3,
            eligible_types: None,
        },
        Upgrade {
            id: "reinforced_chassis".into(),
            name: "Reinforced Chassis".into(),
            description: "+15% damage reduction".into(),
            stat_modifiers: pct("damage_reduction", 0.15),
            max_stacks: 3,
            eligible_types: None,
        },
        Upgrade {
            id: "turbo_motor".into(),
            name: "Turbo Motor".into(),
            description: "+20% speed".into(),
            stat_modifiers: pct("speed", 1.20),
            max_stacks: 3,
            eligible_types: Some(vec!["rover".into(), "drone".into(), "tank".into(), "apc".into()]),
        },
        Upgrade {
            id: "precision_targeting".into(),
            name: "Precision Targeting".into(),
            description: "+15% weapon damage".into(),
            stat_modifiers: pct("weapon_damage", 1.15),
            max_stacks: 3,
            eligible_types: None,
        },
    ]
}

pub fn default_abilities() -> Vec<Ability> {
    vec![
        Ability {
            id: "speed_boost".into(),
            name: "Speed Boost".into(),
            description: "Double speed for 5s".into(),
            cooldown: 30.0,
            duration: 5.0,
            effect: EffectKind::SpeedBoost,
            magnitude: 2.0,
            eligible_types: Some(vec!["rover".into(), "drone".into()]),
        },
        Ability {
            id: "emergency_repair".into(),
            name: "Emergency Repair".into(),
            description: "+30% health instantly".into(),
            cooldown: 60.0,
            duration: 0.0,
            effect: EffectKind::Repair,
            magnitude: 0.30,
            eligible_types: Some(vec!["rover".into(), "turret".into(), "tank".into(), "apc".into()]),
        },
        Ability {
            id: "shield".into(),
            name: "Shield".into(),
            description: "Block 50% damage for 8s".into(),
            cooldown: 45.0,
            duration: 8.0,
            effect: EffectKind::Shield,
            magnitude: 0.50,
            eligible_types: None,
        },
        Ability {
            id: "emp".into(),
            name: "EMP".into(),
            description: "Slow nearby enemies".into(),
            cooldown: 40.0,
            duration: 6.0,
            effect: EffectKind::Emp,
            magnitude: 0.5,
            eligible_types: None,
        },
        Ability {
            id: "overclock".into(),
            name: "Overclock".into(),
            description: "Triple fire rate for 3s".into(),
            cooldown: 50.0,
            duration: 3.0,
            effect: EffectKind::Overclock,
            magnitude: 3.0,
            eligible_types: Some(vec!["turret".into(), "apc".into()]),
        },
    ]
}

/// Tracks which units own which upgrade stacks, which abilities are on
/// cooldown, and which timed effects are currently active.
#[derive(Debug, Default)]
pub struct UpgradeSystem {
    catalog: HashMap<String, Upgrade>,
    abilities: HashMap<String, Ability>,
    owned: HashMap<String, HashMap<String, u32>>,
    cooldowns: HashMap<(String, String), f64>,
    active_effects: Vec<ActiveEffect>,
}

impl UpgradeSystem {
    pub fn with_defaults() -> Self {
        let mut system = Self::default();
        for upgrade in default_upgrades() {
            system.catalog.insert(upgrade.id.clone(), upgrade);
        }
        for ability in default_abilities() {
            system.abilities.insert(ability.id.clone(), ability);
        }
        system
    }

    /// Add or replace a catalog entry, for scenario-specific kit.
    pub fn register_upgrade(&mut self, upgrade: Upgrade) {
        self.catalog.insert(upgrade.id.clone(), upgrade);
    }

    pub fn register_ability(&mut self, ability: Ability) {
        self.abilities.insert(ability.id.clone(), ability);
    }

    pub fn apply_upgrade(&mut self, unit_id: &str, upgrade_id: &str) -> bool {
        let Some(upgrade) = self.catalog.get(upgrade_id) else { return false };
        let stacks = self.owned.entry(unit_id.to_string()).or_default();
        let count = stacks.entry(upgrade_id.to_string()).or_insert(0);
        if *count >= upgrade.max_stacks {
            return false;
        }
        *count += 1;
        true
    }

    /// Combined multiplier for `stat` across all of a unit's owned
    /// upgrade stacks (multiplicative).
    pub fn get_multiplier(&self, unit_id: &str, stat: &str) -> f64 {
        let mut multiplier = 1.0;
        if let Some(stacks) = self.owned.get(unit_id) {
            for (upgrade_id, count) in stacks {
                if let Some(upgrade) = self.catalog.get(upgrade_id) {
                    if let Some(&per_stack) = upgrade.stat_modifiers.get(stat) {
                        for _ in 0..*count {
                            multiplier *= per_stack;
                        }
                    }
                }
            }
        }
        multiplier
    }

    /// Additive damage reduction fraction from all owned upgrades plus
    /// any active `Shield` effect.
    pub fn damage_reduction(&self, unit_id: &str) -> f64 {
        let mut reduction = 0.0;
        if let Some(stacks) = self.owned.get(unit_id) {
            for (upgrade_id, count) in stacks {
                if let Some(upgrade) = self.catalog.get(upgrade_id) {
                    if let Some(&per_stack) = upgrade.stat_modifiers.get("damage_reduction") {
                        reduction += per_stack * *count as f64;
                    }
                }
            }
        }
        for effect in self.active_effects_for(unit_id) {
            if effect.effect == EffectKind::Shield {
                reduction += effect.magnitude;
            }
        }
        reduction.min(1.0)
    }

    /// Whether `asset_type` may take `upgrade_id` at all.
    pub fn upgrade_eligible(&self, upgrade_id: &str, asset_type: &str) -> bool {
        match self.catalog.get(upgrade_id).and_then(|u| u.eligible_types.as_ref()) {
            Some(types) => types.iter().any(|t| t == asset_type),
            None => true,
        }
    }

    /// Whether `asset_type` may use `ability_id` at all.
    pub fn ability_eligible(&self, ability_id: &str, asset_type: &str) -> bool {
        match self.abilities.get(ability_id).and_then(|a| a.eligible_types.as_ref()) {
            Some(types) => types.iter().any(|t| t == asset_type),
            None => true,
        }
    }

    pub fn clear_runtime_state(&mut self) {
        self.owned.clear();
        self.cooldowns.clear();
        self.active_effects.clear();
    }

    /// Speed multiplier from an active `SpeedBoost` effect on this unit
    /// or an `Emp` slow effect an enemy has landed on it, 1.0 if
    /// neither is active (abilities stack additively with upgrades,
    /// applied on top of `get_multiplier(unit, "speed")`).
    pub fn effect_speed_multiplier(&self, unit_id: &str) -> f64 {
        let mut multiplier = 1.0;
        for effect in self.active_effects_for(unit_id) {
            match effect.effect {
                EffectKind::SpeedBoost | EffectKind::Emp => multiplier *= effect.magnitude,
                _ => {}
            }
        }
        multiplier
    }

    /// Weapon-cooldown scale from an active `Overclock` effect.
    /// Magnitude is a fire-rate multiple, so 3.0 means one third the
    /// cooldown.
    pub fn effect_cooldown_multiplier(&self, unit_id: &str) -> f64 {
        let mut multiplier = 1.0;
        for effect in self.active_effects_for(unit_id) {
            if effect.effect == EffectKind::Overclock && effect.magnitude > 0.0 {
                multiplier *= 1.0 / effect.magnitude;
            }
        }
        multiplier
    }

    pub fn get_ability(&self, ability_id: &str) -> Option<&Ability> {
        self.abilities.get(ability_id)
    }

    /// Record that `unit_id` used `ability_id` at `now`, gating future
    /// `can_use_ability` checks. Does not push an effect: callers
    /// decide whether and where (self or area-of-effect) to apply one.
    pub fn set_cooldown(&mut self, unit_id: &str, ability_id: &str, now: f64) {
        self.cooldowns.insert((unit_id.to_string(), ability_id.to_string()), now);
    }

    /// Append an externally-constructed effect, e.g. an `emp` burst
    /// landing a slow on an enemy rather than the caster.
    pub fn push_effect(&mut self, effect: ActiveEffect) {
        if effect.remaining > 0.0 {
            self.active_effects.push(effect);
        }
    }

    pub fn can_use_ability(&self, unit_id: &str, ability_id: &str, now: f64) -> bool {
        if !self.abilities.contains_key(ability_id) {
            return false;
        }
        match self.cooldowns.get(&(unit_id.to_string(), ability_id.to_string())) {
            Some(&last) => {
                let cooldown = self.abilities[ability_id].cooldown;
                now - last >= cooldown
            }
            None => true,
        }
    }

    /// Decrement all active effect timers, dropping those that expire.
    pub fn tick(&mut self, dt: f64) {
        self.active_effects.retain_mut(|effect| {
            effect.remaining -= dt;
            effect.remaining > 0.0
        });
    }

    pub fn active_effects_for(&self, unit_id: &str) -> Vec<&ActiveEffect> {
        self.active_effects.iter().filter(|e| e.target_id == unit_id).collect()
    }

    pub fn upgrade_catalog(&self) -> impl Iterator<Item = &Upgrade> {
        self.catalog.values()
    }

    pub fn get_upgrade(&self, upgrade_id: &str) -> Option<&Upgrade> {
        self.catalog.get(upgrade_id)
    }

    pub fn stack_count(&self, unit_id: &str, upgrade_id: &str) -> u32 {
        self.owned.get(unit_id).and_then(|stacks| stacks.get(upgrade_id)).copied().unwrap_or(0)
    }
}
