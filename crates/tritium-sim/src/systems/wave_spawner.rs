//! Wave spawning: `begin_wave` spawns every unit in a `WaveSpec`
//! immediately and tracks the wave until every spawned hostile has
//! been eliminated, at which point it reports completion.

use std::collections::HashSet;

use hecs::World;

use tritium_core::commands::WaveSpec;
use tritium_core::components::Unit;

use crate::world_setup::spawn_unit;

/// Tracks the hostiles spawned for the active wave so completion can
/// be detected once they are all gone.
#[derive(Debug, Default)]
pub struct WaveSchedule {
    pub current_wave: u32,
    pending_hostiles: HashSet<String>,
    pub active: bool,
}

impl WaveSchedule {
    /// Spawn every unit in `spec`, returning the freshly assigned ids.
    pub fn begin_wave(&mut self, world: &mut World, spec: WaveSpec, next_id: &mut u64) -> Vec<String> {
        self.current_wave = spec.wave_number;
        self.pending_hostiles.clear();
        self.active = true;

        let mut ids = Vec::with_capacity(spec.spawns.len());
        for def in spec.spawns {
            let id = def.id.clone().unwrap_or_else(|| {
                let id = format!("unit-{}", *next_id);
                *next_id += 1;
                id
            });
            let alliance = def.alliance;
            spawn_unit(world, def, id.clone());
            if alliance == tritium_core::enums::Alliance::Hostile {
                self.pending_hostiles.insert(id.clone());
            }
            ids.push(id);
        }
        ids
    }

    /// Call once per tick after eliminations are processed. Returns
    /// true the first time every tracked hostile has died, so the
    /// caller can emit a single `wave_complete` event.
    pub fn check_complete(&mut self, world: &World) -> bool {
        if !self.active || self.pending_hostiles.is_empty() {
            return false;
        }
        let alive: HashSet<String> = world
            .query::<&Unit>()
            .iter()
            .filter(|(_, u)| u.is_alive())
            .map(|(_, u)| u.id.clone())
            .collect();
        self.pending_hostiles.retain(|id| alive.contains(id));
        if self.pending_hostiles.is_empty() {
            self.active = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tritium_core::commands::UnitSpawn;
    use tritium_core::enums::{Alliance, AssetType};
    use tritium_core::enums::UnitStatus;
    use tritium_core::types::Point;

    fn spawn_def(alliance: Alliance) -> UnitSpawn {
        UnitSpawn {
            id: None,
            name: "x".into(),
            alliance,
            asset_type: AssetType::Person,
            position: Point::ZERO,
            heading: 0.0,
            speed: 2.0,
            waypoints: Vec::new(),
            max_health: 30.0,
            weapon_range: 10.0,
            weapon_cooldown: 1.0,
            weapon_damage: 5.0,
            squad_id: None,
        }
    }

    #[test]
    fn test_begin_wave_spawns_all_units() {
        let mut world = World::new();
        let mut schedule = WaveSchedule::default();
        let mut next_id = 0;
        let spec = WaveSpec { wave_number: 1, spawns: vec![spawn_def(Alliance::Hostile), spawn_def(Alliance::Friendly)] };
        let ids = schedule.begin_wave(&mut world, spec, &mut next_id);
        assert_eq!(ids.len(), 2);
        assert_eq!(world.query_mut::<&Unit>().into_iter().count(), 2);
    }

    #[test]
    fn test_wave_completes_when_hostiles_eliminated() {
        let mut world = World::new();
        let mut schedule = WaveSchedule::default();
        let mut next_id = 0;
        let spec = WaveSpec { wave_number: 1, spawns: vec![spawn_def(Alliance::Hostile)] };
        schedule.begin_wave(&mut world, spec, &mut next_id);
        assert!(!schedule.check_complete(&world));

        for (_, unit) in world.query_mut::<&mut Unit>() {
            unit.status = UnitStatus::Eliminated;
        }
        assert!(schedule.check_complete(&world));
    }
}
