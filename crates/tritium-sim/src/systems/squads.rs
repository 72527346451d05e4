//! Squad manager: clusters hostiles that get close to each other into
//! coordinated squads, keeps a leader assigned, steers followers into
//! formation, and runs the leader's order loop (advance / hold /
//! flank / retreat).

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::Rng;

use tritium_core::constants::{
    COHESION_DROP_ON_LEADER_DEATH, COHESION_RECOVERY_RATE, FLANK_OFFSET_STEP, LEADER_SAFE_RANGE,
    RETREAT_HEALTH_THRESHOLD, RETREAT_WAYPOINT_MAGNITUDE,
};
use tritium_core::enums::SquadOrder;
use tritium_core::model::Squad;
use tritium_core::types::{heading_to_unit, Point};

/// A hostile's state relevant to squad formation, snapshotted once per
/// tick by the caller.
#[derive(Debug, Clone)]
pub struct SquadMember {
    pub id: String,
    pub position: Point,
    pub heading: f64,
    pub health: f64,
    pub health_fraction: f64,
    pub speed: f64,
    pub alive: bool,
}

/// A defender as the leader AI sees it.
#[derive(Debug, Clone)]
pub struct DefenderInfo {
    pub id: String,
    pub position: Point,
    pub stationary: bool,
}

/// A follower-level mutation the order loop wants applied to the
/// world. The manager never touches units directly.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    SetSpeed { unit_id: String, speed: f64 },
    Offset { unit_id: String, delta: Point },
    SetWaypoint { unit_id: String, waypoint: Point },
}

#[derive(Default)]
pub struct SquadManager {
    /// Ordered so per-squad PRNG draws happen in a stable sequence,
    /// keeping seeded runs reproducible.
    squads: BTreeMap<String, Squad>,
    next_id: u64,
    /// Original speeds of followers frozen by a `hold` order.
    held_speeds: HashMap<String, f64>,
    /// Last known position of each squad's leader, for promotion.
    last_leader_pos: HashMap<String, Point>,
}

impl SquadManager {
    pub fn squads(&self) -> impl Iterator<Item = &Squad> {
        self.squads.values()
    }

    pub fn get_squad(&self, squad_id: &str) -> Option<&Squad> {
        self.squads.get(squad_id)
    }

    pub fn squad_of(&self, unit_id: &str) -> Option<&Squad> {
        self.squads.values().find(|s| s.member_ids.iter().any(|m| m == unit_id))
    }

    pub fn reset(&mut self) {
        self.squads.clear();
        self.held_speeds.clear();
        self.last_leader_pos.clear();
    }

    /// Runs the per-tick membership sequence: prune stale members,
    /// dissolve broken squads, cluster new ones, refresh leaders and
    /// shared targets, then return each follower's formation slot for
    /// the engine to interpolate toward.
    pub fn tick(
        &mut self,
        dt: f64,
        now: f64,
        members: &[SquadMember],
        defenders: &[DefenderInfo],
        squad_radius: f64,
        formation_spacing: f64,
    ) -> Vec<(String, Point)> {
        let by_id: HashMap<&str, &SquadMember> = members.iter().map(|m| (m.id.as_str(), m)).collect();

        self.prune_squads(&by_id, squad_radius);
        self.form_new_squads(members, squad_radius);

        for squad in self.squads.values_mut() {
            let leader_alive = squad
                .leader_id
                .as_deref()
                .is_some_and(|id| squad.member_ids.iter().any(|m| m == id) && by_id.contains_key(id));
            if !leader_alive {
                let had_leader = squad.leader_id.take().is_some();
                if had_leader {
                    // Leader fell without the combat path telling us.
                    promote_leader(squad, &by_id, self.last_leader_pos.get(&squad.id).copied(), now);
                } else {
                    assign_initial_leader(squad, &by_id);
                }
            }

            if let Some(leader) = squad.leader_id.as_deref().and_then(|id| by_id.get(id)) {
                self.last_leader_pos.insert(squad.id.clone(), leader.position);
                squad.shared_target_id = nearest_defender_id(leader.position, defenders);
                squad.cohesion = (squad.cohesion + COHESION_RECOVERY_RATE * dt).min(1.0);
            }
        }

        let mut slots = Vec::new();
        for squad in self.squads.values() {
            let Some(leader_id) = &squad.leader_id else { continue };
            let Some(&leader) = by_id.get(leader_id.as_str()) else { continue };
            let rotation = heading_to_unit(leader.heading);
            for (follower_id, local_offset) in squad.formation_offsets(formation_spacing) {
                let world_offset = Point::new(
                    local_offset.x * rotation.y + local_offset.y * rotation.x,
                    -local_offset.x * rotation.x + local_offset.y * rotation.y,
                );
                slots.push((follower_id, leader.position + world_offset));
            }
        }
        slots
    }

    /// Record an externally issued order; returns false for an unknown
    /// squad. Reissuing the active order only refreshes its timestamp.
    pub fn issue_order(&mut self, squad_id: &str, order: SquadOrder, now: f64) -> bool {
        match self.squads.get_mut(squad_id) {
            Some(squad) => {
                squad.last_order = Some(order);
                squad.order_timestamp = now;
                true
            }
            None => false,
        }
    }

    /// The combat path reporting a leader kill directly: cohesion
    /// collapses, the squad falls back, and the member nearest the
    /// leader's last position takes over.
    pub fn on_leader_eliminated(&mut self, squad_id: &str, members: &[SquadMember], now: f64) {
        let by_id: HashMap<&str, &SquadMember> = members.iter().map(|m| (m.id.as_str(), m)).collect();
        let last_pos = self.last_leader_pos.get(squad_id).copied();
        if let Some(squad) = self.squads.get_mut(squad_id) {
            squad.leader_id = None;
            promote_leader(squad, &by_id, last_pos, now);
        }
    }

    /// Order loop: expire the stale order, let an idle leader decide,
    /// then translate the active order into per-follower actions.
    pub fn tick_orders(
        &mut self,
        dt: f64,
        now: f64,
        members: &[SquadMember],
        defenders: &[DefenderInfo],
        order_timeout: f64,
        rng: &mut impl Rng,
    ) -> Vec<OrderAction> {
        let by_id: HashMap<&str, &SquadMember> = members.iter().map(|m| (m.id.as_str(), m)).collect();
        let mut actions = Vec::new();

        for squad in self.squads.values_mut() {
            if squad.last_order.is_some() && now - squad.order_timestamp > order_timeout {
                squad.last_order = None;
            }

            if squad.last_order.is_none() {
                if let Some(order) = leader_decision(squad, &by_id, defenders, rng) {
                    squad.last_order = Some(order);
                    squad.order_timestamp = now;
                }
            }

            let Some(order) = squad.last_order else { continue };
            for member_id in &squad.member_ids {
                // Orders steer followers around the leader, except a
                // retreat, which pulls the whole squad out.
                if Some(member_id.as_str()) == squad.leader_id.as_deref() && order != SquadOrder::Retreat {
                    continue;
                }
                let Some(&member) = by_id.get(member_id.as_str()) else { continue };
                match order {
                    SquadOrder::Advance => {
                        release_hold(&mut self.held_speeds, member_id, &mut actions);
                    }
                    SquadOrder::Hold => {
                        if !self.held_speeds.contains_key(member_id) {
                            self.held_speeds.insert(member_id.clone(), member.speed);
                            actions.push(OrderAction::SetSpeed { unit_id: member_id.clone(), speed: 0.0 });
                        }
                    }
                    SquadOrder::FlankLeft | SquadOrder::FlankRight => {
                        release_hold(&mut self.held_speeds, member_id, &mut actions);
                        let side = if order == SquadOrder::FlankLeft { -1.0 } else { 1.0 };
                        let forward = heading_to_unit(member.heading);
                        let right = Point::new(forward.y, -forward.x);
                        actions.push(OrderAction::Offset {
                            unit_id: member_id.clone(),
                            delta: right * (FLANK_OFFSET_STEP * dt * side),
                        });
                    }
                    SquadOrder::Retreat => {
                        release_hold(&mut self.held_speeds, member_id, &mut actions);
                        let outward = if member.position.length() > 1e-6 {
                            member.position.normalize()
                        } else {
                            heading_to_unit(member.heading)
                        };
                        actions.push(OrderAction::SetWaypoint {
                            unit_id: member_id.clone(),
                            waypoint: member.position + outward * RETREAT_WAYPOINT_MAGNITUDE,
                        });
                    }
                }
            }
        }
        actions
    }

    fn prune_squads(&mut self, by_id: &HashMap<&str, &SquadMember>, squad_radius: f64) {
        let mut dissolved = Vec::new();
        for (squad_id, squad) in self.squads.iter_mut() {
            let alive: Vec<String> = squad
                .member_ids
                .iter()
                .filter(|id| by_id.get(id.as_str()).map(|m| m.alive).unwrap_or(false))
                .cloned()
                .collect();
            // A member stays only while within squad radius of at
            // least one other member.
            squad.member_ids = alive
                .iter()
                .filter(|id| {
                    let pos = by_id[id.as_str()].position;
                    alive.iter().any(|other| {
                        other != *id && by_id[other.as_str()].position.distance(pos) <= squad_radius
                    })
                })
                .cloned()
                .collect();
            if squad.member_ids.len() < 2 {
                dissolved.push(squad_id.clone());
            }
        }
        for id in dissolved {
            self.squads.remove(&id);
            self.last_leader_pos.remove(&id);
        }
    }

    fn form_new_squads(&mut self, members: &[SquadMember], squad_radius: f64) {
        let assigned: HashSet<&str> = self
            .squads
            .values()
            .flat_map(|s| s.member_ids.iter().map(|id| id.as_str()))
            .collect();

        let unassigned: Vec<&SquadMember> = members
            .iter()
            .filter(|m| m.alive && !assigned.contains(m.id.as_str()))
            .collect();

        let mut clustered: HashSet<&str> = HashSet::new();
        for member in &unassigned {
            if clustered.contains(member.id.as_str()) {
                continue;
            }
            let cluster: Vec<&SquadMember> = unassigned
                .iter()
                .copied()
                .filter(|m| !clustered.contains(m.id.as_str()) && m.position.distance(member.position) <= squad_radius)
                .collect();
            if cluster.len() >= 2 {
                for m in &cluster {
                    clustered.insert(m.id.as_str());
                }
                let id = format!("squad-{}", self.next_id);
                self.next_id += 1;
                self.squads.insert(id.clone(), Squad::new(id, cluster.iter().map(|m| m.id.clone()).collect()));
            }
        }
    }
}

fn release_hold(held: &mut HashMap<String, f64>, member_id: &str, actions: &mut Vec<OrderAction>) {
    if let Some(speed) = held.remove(member_id) {
        actions.push(OrderAction::SetSpeed { unit_id: member_id.to_string(), speed });
    }
}

/// A fresh squad takes its healthiest member as leader.
fn assign_initial_leader(squad: &mut Squad, by_id: &HashMap<&str, &SquadMember>) {
    squad.leader_id = squad
        .member_ids
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).map(|m| (id.clone(), m.health)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id);
}

/// Succession after a leader death: cohesion collapses, the squad is
/// ordered back, and whoever stood closest to the fallen leader steps
/// up.
fn promote_leader(
    squad: &mut Squad,
    by_id: &HashMap<&str, &SquadMember>,
    last_pos: Option<Point>,
    now: f64,
) {
    squad.cohesion = COHESION_DROP_ON_LEADER_DEATH;
    squad.last_order = Some(SquadOrder::Retreat);
    squad.order_timestamp = now;
    squad.leader_id = match last_pos {
        Some(pos) => squad
            .member_ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|m| (id.clone(), pos.distance_squared(m.position))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id),
        None => None,
    };
    if squad.leader_id.is_none() {
        assign_initial_leader(squad, by_id);
    }
}

/// Leader AI when no order is active: fall back when mauled, flank a
/// nearby emplacement, otherwise keep advancing.
fn leader_decision(
    squad: &Squad,
    by_id: &HashMap<&str, &SquadMember>,
    defenders: &[DefenderInfo],
    rng: &mut impl Rng,
) -> Option<SquadOrder> {
    let leader = squad.leader_id.as_deref().and_then(|id| by_id.get(id))?;

    let live: Vec<&&SquadMember> = squad.member_ids.iter().filter_map(|id| by_id.get(id.as_str())).collect();
    if !live.is_empty() {
        let avg_health = live.iter().map(|m| m.health_fraction).sum::<f64>() / live.len() as f64;
        if avg_health < RETREAT_HEALTH_THRESHOLD {
            return Some(SquadOrder::Retreat);
        }
    }

    let nearest = defenders.iter().min_by(|a, b| {
        leader
            .position
            .distance_squared(a.position)
            .total_cmp(&leader.position.distance_squared(b.position))
    });
    if let Some(defender) = nearest {
        if leader.position.distance(defender.position) <= LEADER_SAFE_RANGE && defender.stationary {
            return Some(if rng.gen_bool(0.5) { SquadOrder::FlankLeft } else { SquadOrder::FlankRight });
        }
    }
    Some(SquadOrder::Advance)
}

fn nearest_defender_id(from: Point, defenders: &[DefenderInfo]) -> Option<String> {
    defenders
        .iter()
        .min_by(|a, b| from.distance_squared(a.position).total_cmp(&from.distance_squared(b.position)))
        .map(|d| d.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tritium_core::constants::SQUAD_RADIUS;

    fn member(id: &str, x: f64, y: f64) -> SquadMember {
        SquadMember {
            id: id.into(),
            position: Point::new(x, y),
            heading: 0.0,
            health: 30.0,
            health_fraction: 1.0,
            speed: 3.0,
            alive: true,
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(3)
    }

    #[test]
    fn test_forms_squad_from_clustered_hostiles() {
        let mut manager = SquadManager::default();
        let members = vec![member("a", 0.0, 0.0), member("b", 2.0, 0.0), member("c", 500.0, 0.0)];
        manager.tick(0.1, 0.0, &members, &[], SQUAD_RADIUS, 4.0);
        assert_eq!(manager.squads().count(), 1);
        let squad = manager.squads().next().unwrap();
        assert_eq!(squad.member_ids.len(), 2);
    }

    #[test]
    fn test_lone_hostile_forms_no_squad() {
        let mut manager = SquadManager::default();
        let members = vec![member("a", 0.0, 0.0)];
        manager.tick(0.1, 0.0, &members, &[], SQUAD_RADIUS, 4.0);
        assert_eq!(manager.squads().count(), 0);
    }

    #[test]
    fn test_squad_dissolves_when_members_scatter() {
        let mut manager = SquadManager::default();
        let close = vec![member("a", 0.0, 0.0), member("b", 2.0, 0.0)];
        manager.tick(0.1, 0.0, &close, &[], SQUAD_RADIUS, 4.0);
        assert_eq!(manager.squads().count(), 1);

        let scattered = vec![member("a", 0.0, 0.0), member("b", 500.0, 0.0)];
        manager.tick(0.1, 0.1, &scattered, &[], SQUAD_RADIUS, 4.0);
        assert_eq!(manager.squads().count(), 0);
    }

    #[test]
    fn test_leader_is_healthiest_and_sticky() {
        let mut manager = SquadManager::default();
        let mut members = vec![member("a", 0.0, 0.0), member("b", 2.0, 0.0)];
        members[0].health = 15.0;
        manager.tick(0.1, 0.0, &members, &[], SQUAD_RADIUS, 4.0);
        assert_eq!(manager.squads().next().unwrap().leader_id.as_deref(), Some("b"));

        // Health changes do not depose a live leader.
        members[0].health = 30.0;
        members[1].health = 12.0;
        manager.tick(0.1, 0.1, &members, &[], SQUAD_RADIUS, 4.0);
        assert_eq!(manager.squads().next().unwrap().leader_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_leader_death_drops_cohesion_and_orders_retreat() {
        let mut manager = SquadManager::default();
        let members = vec![member("a", 0.0, 0.0), member("b", 2.0, 0.0), member("c", 1.0, 2.0)];
        manager.tick(0.1, 0.0, &members, &[], SQUAD_RADIUS, 4.0);
        let squad_id = manager.squads().next().unwrap().id.clone();
        let leader = manager.squads().next().unwrap().leader_id.clone().unwrap();

        let survivors: Vec<SquadMember> = members.iter().filter(|m| m.id != leader).cloned().collect();
        manager.on_leader_eliminated(&squad_id, &survivors, 1.0);

        let squad = manager.get_squad(&squad_id).unwrap();
        assert!((squad.cohesion - COHESION_DROP_ON_LEADER_DEATH).abs() < 1e-9);
        assert_eq!(squad.last_order, Some(SquadOrder::Retreat));
        let new_leader = squad.leader_id.as_deref().unwrap();
        assert_ne!(new_leader, leader);
    }

    #[test]
    fn test_retreat_order_sends_followers_outward() {
        let mut manager = SquadManager::default();
        let members = vec![member("a", 0.0, 30.0), member("b", 3.0, 32.0)];
        manager.tick(0.1, 0.0, &members, &[], SQUAD_RADIUS, 4.0);
        let squad_id = manager.squads().next().unwrap().id.clone();
        assert!(manager.issue_order(&squad_id, SquadOrder::Retreat, 0.0));

        let actions = manager.tick_orders(0.1, 0.1, &members, &[], 10.0, &mut rng());
        let waypoint = actions
            .iter()
            .find_map(|a| match a {
                OrderAction::SetWaypoint { waypoint, .. } => Some(*waypoint),
                _ => None,
            })
            .unwrap();
        assert!(waypoint.length() > 100.0);
    }

    #[test]
    fn test_hold_freezes_then_advance_restores_speed() {
        let mut manager = SquadManager::default();
        let members = vec![member("a", 0.0, 0.0), member("b", 2.0, 0.0)];
        manager.tick(0.1, 0.0, &members, &[], SQUAD_RADIUS, 4.0);
        let squad_id = manager.squads().next().unwrap().id.clone();
        let leader = manager.squads().next().unwrap().leader_id.clone().unwrap();
        let follower = members.iter().find(|m| m.id != leader).unwrap().id.clone();

        manager.issue_order(&squad_id, SquadOrder::Hold, 0.0);
        let actions = manager.tick_orders(0.1, 0.1, &members, &[], 10.0, &mut rng());
        assert!(actions.contains(&OrderAction::SetSpeed { unit_id: follower.clone(), speed: 0.0 }));

        manager.issue_order(&squad_id, SquadOrder::Advance, 0.2);
        let actions = manager.tick_orders(0.1, 0.3, &members, &[], 10.0, &mut rng());
        assert!(actions.contains(&OrderAction::SetSpeed { unit_id: follower, speed: 3.0 }));
    }

    #[test]
    fn test_orders_expire_after_timeout() {
        let mut manager = SquadManager::default();
        let members = vec![member("a", 0.0, 200.0), member("b", 2.0, 200.0)];
        manager.tick(0.1, 0.0, &members, &[], SQUAD_RADIUS, 4.0);
        let squad_id = manager.squads().next().unwrap().id.clone();
        manager.issue_order(&squad_id, SquadOrder::Hold, 0.0);

        // Past the timeout the hold lapses and the leader (safe, no
        // defenders anywhere) falls back to advance.
        manager.tick_orders(0.1, 11.0, &members, &[], 10.0, &mut rng());
        assert_eq!(manager.get_squad(&squad_id).unwrap().last_order, Some(SquadOrder::Advance));
    }

    #[test]
    fn test_leader_orders_retreat_when_squad_mauled() {
        let mut manager = SquadManager::default();
        let mut members = vec![member("a", 0.0, 0.0), member("b", 2.0, 0.0)];
        manager.tick(0.1, 0.0, &members, &[], SQUAD_RADIUS, 4.0);
        for m in &mut members {
            m.health_fraction = 0.2;
        }
        manager.tick_orders(0.1, 0.1, &members, &[], 10.0, &mut rng());
        let squad = manager.squads().next().unwrap();
        assert_eq!(squad.last_order, Some(SquadOrder::Retreat));
    }

    #[test]
    fn test_leader_flanks_nearby_turret() {
        let mut manager = SquadManager::default();
        let members = vec![member("a", 0.0, 0.0), member("b", 2.0, 0.0)];
        manager.tick(0.1, 0.0, &members, &[], SQUAD_RADIUS, 4.0);
        let defenders = vec![DefenderInfo { id: "t1".into(), position: Point::new(10.0, 0.0), stationary: true }];
        manager.tick_orders(0.1, 0.1, &members, &defenders, 10.0, &mut rng());
        let order = manager.squads().next().unwrap().last_order.unwrap();
        assert!(matches!(order, SquadOrder::FlankLeft | SquadOrder::FlankRight));
    }
}
