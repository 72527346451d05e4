//! Simulation engine — the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, processes external
//! commands, runs all systems in a fixed order, and produces
//! `Snapshot`s. Completely headless, enabling deterministic testing.

use std::collections::HashMap;
use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tritium_ai::behavior::hostile::HostileState;
use tritium_core::commands::Command;
use tritium_core::components::Unit;
use tritium_core::config::SimConfig;
use tritium_core::constants::{EMP_RADIUS, FORMATION_CONVERGENCE, MAX_LIVE_UNITS};
use tritium_core::enums::{Alliance, EffectKind, GamePhase, MovementCategory, TerrainType};
use tritium_core::error::{SimError, SimResult};
use tritium_core::events::SimEvent;
use tritium_core::model::{ActiveEffect, CoverObject};
use tritium_core::state::{Snapshot, UnitView};
use tritium_core::types::{Point, SimTime};
use tritium_terrain::{Building, RoadSegment, TerrainMap};

use crate::event_bus::EventBus;
use crate::replay::ReplayRecorder;
use crate::spectator::SpectatorMode;
use crate::systems::pursuit::{PursuitSystem, PursuitTarget};
use crate::systems::squads::{DefenderInfo, OrderAction, SquadManager, SquadMember};
use crate::systems::upgrades::UpgradeSystem;
use crate::systems::wave_spawner::WaveSchedule;
use crate::systems::{behavior, cleanup, cover, morale, movement, snapshot, spatial, swarm_controller};
use crate::world_setup::spawn_unit;

/// Running score tallies that outlive any single wave.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoreState {
    pub hostiles_eliminated: u32,
    pub friendlies_lost: u32,
    pub waves_completed: u32,
}

/// Owns the ECS world, the terrain, and every per-tick manager, and
/// drives the fixed-order 10 Hz tick loop.
pub struct SimulationEngine {
    world: World,
    terrain: TerrainMap,
    time: SimTime,
    phase: GamePhase,
    config: SimConfig,
    rng: ChaCha8Rng,
    next_unit_id: u64,

    command_queue: VecDeque<Command>,
    despawn_buffer: Vec<Entity>,

    event_bus: EventBus,
    spatial_grid: spatial::SpatialGrid,
    squad_manager: SquadManager,
    pursuit: PursuitSystem,
    hostile_state: HostileState,
    wave_schedule: WaveSchedule,
    upgrades: UpgradeSystem,
    cover_objects: Vec<CoverObject>,
    /// Cell centers of every building cell, for hostiles looking for
    /// hard cover. Refreshed when buildings load.
    building_cells: Vec<Point>,
    /// Passive per-unit cover from nearby objects, refreshed each tick.
    unit_cover: HashMap<String, f64>,
    /// Sim-time of the last hit landed on each unit id, feeding
    /// [`morale::tick_recovery`]'s recovery-delay gate.
    last_damage: HashMap<String, f64>,
    score: ScoreState,
    /// Set once a friendly has been fielded; arms the defeat check.
    had_friendlies: bool,
    game_over: bool,

    replay: ReplayRecorder,
    spectator: SpectatorMode,

    last_snapshot_time: f64,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        let terrain = TerrainMap::new(config.map_bounds, config.terrain_resolution);
        Self {
            world: World::new(),
            terrain,
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            next_unit_id: 0,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            event_bus: EventBus::default(),
            spatial_grid: spatial::SpatialGrid::default(),
            squad_manager: SquadManager::default(),
            pursuit: PursuitSystem::default(),
            hostile_state: HostileState::default(),
            wave_schedule: WaveSchedule::default(),
            upgrades: UpgradeSystem::with_defaults(),
            cover_objects: Vec::new(),
            building_cells: Vec::new(),
            unit_cover: HashMap::new(),
            last_damage: HashMap::new(),
            score: ScoreState::default(),
            had_friendlies: false,
            game_over: false,
            replay: ReplayRecorder::new(),
            spectator: SpectatorMode::new(),
            last_snapshot_time: f64::NEG_INFINITY,
        }
    }

    pub fn queue_command(&mut self, command: Command) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.command_queue.extend(commands);
    }

    pub fn load_buildings(&mut self, buildings: &[Building]) {
        self.terrain.load_buildings(buildings);
        self.building_cells = self.terrain.find_terrain_of_type(TerrainType::Building);
    }

    pub fn load_roads(&mut self, roads: &[RoadSegment]) {
        self.terrain.load_roads(roads);
    }

    pub fn set_cover_objects(&mut self, objects: Vec<CoverObject>) {
        self.cover_objects = objects;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for scenario setup and test harnesses; the
    /// tick pipeline itself never goes through this.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn terrain(&self) -> &TerrainMap {
        &self.terrain
    }

    pub fn replay(&self) -> &ReplayRecorder {
        &self.replay
    }

    pub fn replay_mut(&mut self) -> &mut ReplayRecorder {
        &mut self.replay
    }

    pub fn spectator_mut(&mut self) -> &mut SpectatorMode {
        &mut self.spectator
    }

    pub fn subscribe(&mut self) -> crossbeam_channel::Receiver<SimEvent> {
        self.event_bus.subscribe()
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    /// Live units within `radius` of `point`, from the index rebuilt
    /// last tick.
    pub fn spatial_query(&self, point: Point, radius: f64) -> Vec<(String, Point)> {
        self.spatial_grid.query_radius(point, radius)
    }

    /// Passive cover value assigned to a unit last tick.
    pub fn get_unit_cover(&self, unit_id: &str) -> f64 {
        self.unit_cover.get(unit_id).copied().unwrap_or(0.0)
    }

    pub fn get_unit(&self, unit_id: &str) -> Option<UnitView> {
        self.build_snapshot().units.into_iter().find(|u| u.id == unit_id)
    }

    pub fn is_rushing(&self, unit_id: &str) -> bool {
        self.hostile_state.is_rushing(unit_id)
    }

    /// Advance the simulation by one tick and return the resulting
    /// snapshot: apply queued commands, then if the phase is `Active`
    /// run the full system pipeline and advance time.
    pub fn tick(&mut self) -> Snapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance(self.config.tick_rate_hz);
        }

        self.build_snapshot()
    }

    fn build_snapshot(&self) -> Snapshot {
        snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            self.wave_schedule.current_wave,
            &self.squad_manager,
            &self.score,
        )
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command) {
                tracing::warn!(%err, "command rejected");
            }
        }
    }

    fn handle_command(&mut self, command: Command) -> SimResult<()> {
        match command {
            Command::Start => {
                self.phase = GamePhase::Active;
            }
            Command::Stop => {
                self.phase = GamePhase::Paused;
            }
            Command::Reset => {
                // Subscribers survive a reset; everything else is rebuilt.
                let config = self.config.clone();
                let bus = std::mem::take(&mut self.event_bus);
                *self = Self::new(config);
                self.event_bus = bus;
            }
            Command::Spawn { definition } => {
                self.spawn(definition)?;
            }
            Command::Despawn { unit_id } => {
                let entity = self.find_entity(&unit_id).ok_or_else(|| SimError::InvalidTarget(unit_id.clone()))?;
                let _ = self.world.despawn(entity);
                self.hostile_state.clear_unit(&unit_id);
                self.pursuit.clear_target(&unit_id);
            }
            Command::SetWaypoints { unit_id, waypoints } => {
                let entity = self.find_entity(&unit_id).ok_or_else(|| SimError::InvalidTarget(unit_id.clone()))?;
                let snapped: Vec<Point> = waypoints.iter().map(|p| self.terrain.snap_to_passable(*p)).collect();
                let mut unit = self.world.get::<&mut Unit>(entity).map_err(|_| SimError::InvalidTarget(unit_id))?;
                unit.waypoints = snapped;
                unit.waypoint_index = 0;
            }
            Command::BeginWave { spec } => {
                let wave_number = spec.wave_number;
                self.wave_schedule.begin_wave(&mut self.world, spec, &mut self.next_unit_id);
                self.publish_all(vec![SimEvent::WaveStart { wave_number }]);
            }
            Command::ApplyUpgrade { unit_id, upgrade_id } => self.apply_upgrade(&unit_id, &upgrade_id)?,
            Command::UseAbility { unit_id, ability_id } => self.use_ability(&unit_id, &ability_id)?,
            Command::IssueOrder { squad_id, order } => {
                if !self.squad_manager.issue_order(&squad_id, order, self.time.elapsed_secs) {
                    return Err(SimError::InvalidTarget(squad_id));
                }
                tracing::debug!(squad_id = %squad_id, ?order, "squad order issued");
            }
        }
        Ok(())
    }

    /// Validated spawn path: enforces the live-unit cap and id
    /// uniqueness before the unit enters the world.
    pub fn spawn(&mut self, definition: tritium_core::commands::UnitSpawn) -> SimResult<String> {
        let live = self.world.query::<&Unit>().iter().count();
        if live >= MAX_LIVE_UNITS {
            return Err(SimError::Capacity(format!("unit cap of {MAX_LIVE_UNITS} reached")));
        }
        let id = definition.id.clone().unwrap_or_else(|| self.generate_unit_id());
        if self.find_entity(&id).is_some() {
            return Err(SimError::Precondition(format!("unit id {id} already live")));
        }
        tracing::debug!(id = %id, alliance = ?definition.alliance, asset_type = ?definition.asset_type, "unit spawned");
        spawn_unit(&mut self.world, definition, id.clone());
        Ok(id)
    }

    fn generate_unit_id(&mut self) -> String {
        self.next_unit_id += 1;
        format!("unit-{}", self.next_unit_id)
    }

    fn find_entity(&self, unit_id: &str) -> Option<Entity> {
        self.world.query::<&Unit>().iter().find(|(_, u)| u.id == unit_id).map(|(e, _)| e)
    }

    /// Scales `max_health`/`weapon_range`/`weapon_cooldown`/`weapon_damage`/`speed`
    /// by the upgrade's per-stack modifiers, if the unit has stacks
    /// remaining. Health is rescaled to preserve the health fraction
    /// across a `max_health` change.
    pub fn apply_upgrade(&mut self, unit_id: &str, upgrade_id: &str) -> SimResult<()> {
        let entity = self.find_entity(unit_id).ok_or_else(|| SimError::InvalidTarget(unit_id.to_string()))?;
        let Some(upgrade) = self.upgrades.get_upgrade(upgrade_id).cloned() else {
            return Err(SimError::InvalidTarget(upgrade_id.to_string()));
        };
        {
            let unit = self.world.get::<&Unit>(entity).map_err(|_| SimError::InvalidTarget(unit_id.to_string()))?;
            if !unit.is_alive() {
                return Err(SimError::Precondition(format!("{unit_id} is no longer alive")));
            }
            let asset_type = serde_type_name(unit.asset_type);
            if !self.upgrades.upgrade_eligible(upgrade_id, &asset_type) {
                return Err(SimError::Precondition(format!("{asset_type} cannot take {upgrade_id}")));
            }
        }
        if !self.upgrades.apply_upgrade(unit_id, upgrade_id) {
            return Err(SimError::Capacity(format!("{unit_id} already holds max stacks of {upgrade_id}")));
        }

        let mut unit = self.world.get::<&mut Unit>(entity).map_err(|_| SimError::InvalidTarget(unit_id.to_string()))?;
        let health_fraction = unit.health_fraction();
        for (stat, &multiplier) in &upgrade.stat_modifiers {
            match stat.as_str() {
                "max_health" => unit.max_health *= multiplier,
                "weapon_range" => unit.weapon_range *= multiplier,
                "weapon_cooldown" => unit.weapon_cooldown *= multiplier,
                "weapon_damage" => unit.weapon_damage *= multiplier,
                "speed" => unit.speed *= multiplier,
                _ => {}
            }
        }
        unit.health = unit.max_health * health_fraction;
        Ok(())
    }

    /// Dispatches an ability by its effect kind: `Repair` heals the
    /// caster instantly, `Emp` pushes a slow onto every living enemy
    /// within [`EMP_RADIUS`], everything else pushes a self-targeted
    /// effect.
    pub fn use_ability(&mut self, unit_id: &str, ability_id: &str) -> SimResult<()> {
        let now = self.time.elapsed_secs;
        let entity = self.find_entity(unit_id).ok_or_else(|| SimError::InvalidTarget(unit_id.to_string()))?;
        let Some(ability) = self.upgrades.get_ability(ability_id).cloned() else {
            return Err(SimError::InvalidTarget(ability_id.to_string()));
        };
        {
            let unit = self.world.get::<&Unit>(entity).map_err(|_| SimError::InvalidTarget(unit_id.to_string()))?;
            if !unit.is_alive() {
                return Err(SimError::Precondition(format!("{unit_id} is no longer alive")));
            }
            let asset_type = serde_type_name(unit.asset_type);
            if !self.upgrades.ability_eligible(ability_id, &asset_type) {
                return Err(SimError::Precondition(format!("{asset_type} cannot use {ability_id}")));
            }
        }
        if !self.upgrades.can_use_ability(unit_id, ability_id, now) {
            return Err(SimError::Precondition(format!("{ability_id} is on cooldown for {unit_id}")));
        }
        self.upgrades.set_cooldown(unit_id, ability_id, now);

        match ability.effect {
            EffectKind::Repair => {
                let mut unit = self.world.get::<&mut Unit>(entity).map_err(|_| SimError::InvalidTarget(unit_id.to_string()))?;
                unit.health = (unit.health + unit.max_health * ability.magnitude).min(unit.max_health);
            }
            EffectKind::Emp => {
                let caster = self.world.get::<&Unit>(entity).map_err(|_| SimError::InvalidTarget(unit_id.to_string()))?;
                let (position, alliance) = (caster.position, caster.alliance);
                drop(caster);
                let targets: Vec<String> = self
                    .world
                    .query::<&Unit>()
                    .iter()
                    .filter(|(_, u)| u.alliance != alliance && u.is_alive() && u.position.distance(position) <= EMP_RADIUS)
                    .map(|(_, u)| u.id.clone())
                    .collect();
                for target_id in targets {
                    self.upgrades.push_effect(ActiveEffect {
                        target_id,
                        ability_id: ability_id.to_string(),
                        effect: ability.effect,
                        magnitude: ability.magnitude,
                        remaining: ability.duration,
                    });
                }
            }
            // Timed self-effects: the boost (or the overclocked fire
            // rate) lives as an active effect the relevant system
            // queries until it expires.
            EffectKind::SpeedBoost | EffectKind::Shield | EffectKind::Overclock => {
                self.upgrades.push_effect(ActiveEffect {
                    target_id: unit_id.to_string(),
                    ability_id: ability_id.to_string(),
                    effect: ability.effect,
                    magnitude: ability.magnitude,
                    remaining: ability.duration,
                });
            }
        }
        Ok(())
    }

    /// Anti-drone burst at `center`: flat damage to every swarm drone
    /// in radius, with eliminations announced like any other kill.
    pub fn apply_aoe_damage(&mut self, center: Point, radius: f64, damage: f64) {
        let now = self.time.elapsed_secs;
        let hits = swarm_controller::apply_aoe_damage(&mut self.world, center, radius, damage);
        let mut events = Vec::new();
        for hit in hits {
            self.last_damage.insert(hit.id.clone(), now);
            if hit.eliminated {
                events.push(SimEvent::TargetEliminated {
                    target_id: hit.id,
                    by_id: String::new(),
                    alliance: Alliance::Hostile,
                    asset_type: tritium_core::enums::AssetType::SwarmDrone,
                    position: hit.position,
                });
            }
        }
        self.react_to_eliminations(&events);
        self.publish_all(events);
    }

    /// Run all systems in the fixed per-tick order: movement, spatial
    /// rebuild, modifier systems, pursuit, squads and their orders,
    /// swarm steering, behavior and fire resolution, elimination
    /// bookkeeping, corpse cleanup, wave completion, then a throttled
    /// replay snapshot.
    fn run_systems(&mut self) {
        let _span = tracing::debug_span!("tick", tick = self.time.tick).entered();
        let dt = self.config.dt();
        let now = self.time.elapsed_secs;

        movement::run(&mut self.world, &self.terrain, &self.upgrades, dt);

        let entries: Vec<(String, Point)> = self
            .world
            .query::<&Unit>()
            .iter()
            .filter(|(_, u)| u.is_alive())
            .map(|(_, u)| (u.id.clone(), u.position))
            .collect();
        self.spatial_grid.rebuild(entries.iter().map(|(id, p)| (id.as_str(), *p)));

        self.tick_cover();
        self.tick_degradation();
        morale::tick_recovery(&mut self.world, &self.last_damage, now, dt);

        self.tick_pursuit();
        self.tick_squads(dt, now);
        self.tick_squad_orders(dt, now);

        swarm_controller::run(&mut self.world, dt);

        let events = behavior::run(
            &mut self.world,
            &self.terrain,
            &self.cover_objects,
            &self.building_cells,
            &mut self.hostile_state,
            &self.pursuit,
            &self.upgrades,
            &mut self.rng,
            now,
        );
        for event in &events {
            if let SimEvent::ProjectileHit { target_id, .. } = event {
                self.last_damage.insert(target_id.clone(), now);
            }
        }
        self.react_to_eliminations(&events);
        self.publish_all(events);

        cleanup::run(&mut self.world, &mut self.despawn_buffer);

        if self.wave_schedule.check_complete(&self.world) {
            self.score.waves_completed += 1;
            let wave_number = self.wave_schedule.current_wave;
            self.publish_all(vec![SimEvent::WaveComplete { wave_number }]);
        }
        self.check_defeat();

        self.upgrades.tick(dt);

        if self.should_snapshot(now) {
            self.last_snapshot_time = now;
            let units = self.build_snapshot().units;
            self.replay.record_snapshot(now, units);
        }
    }

    /// Refresh the passive best-cover value for every living unit.
    fn tick_cover(&mut self) {
        self.unit_cover.clear();
        for (_, unit) in self.world.query_mut::<&Unit>() {
            if unit.is_alive() {
                self.unit_cover
                    .insert(unit.id.clone(), cover::best_cover(unit.position, &self.cover_objects));
            }
        }
    }

    /// Degradation factors are computed on demand elsewhere (combat,
    /// movement); this only refreshes the `Unit.degradation` field so
    /// it reads correctly in the next snapshot even for units that
    /// didn't fire or move this tick (e.g. stationary turrets between
    /// engagements).
    fn tick_degradation(&mut self) {
        for (_, unit) in self.world.query_mut::<&mut Unit>() {
            if unit.is_alive() {
                unit.degradation = 1.0 - unit.health_fraction();
            }
        }
    }

    fn tick_pursuit(&mut self) {
        let hostiles: Vec<PursuitTarget> = self
            .world
            .query::<&Unit>()
            .iter()
            .filter(|(_, u)| u.alliance == Alliance::Hostile && u.is_alive())
            .map(|(_, u)| PursuitTarget {
                id: u.id.clone(),
                position: u.position,
                heading: u.heading,
                speed: u.speed,
                fleeing: u.fsm_state == "fleeing",
            })
            .collect();
        let pursuers: Vec<(String, Point)> = self
            .world
            .query::<&Unit>()
            .iter()
            .filter(|(_, u)| {
                u.alliance == Alliance::Friendly
                    && u.is_alive()
                    && matches!(u.asset_type.category(), MovementCategory::Ground | MovementCategory::Air)
            })
            .map(|(_, u)| (u.id.clone(), u.position))
            .collect();
        self.pursuit.tick(&hostiles, &pursuers);
    }

    fn squad_members(&self) -> Vec<SquadMember> {
        // Swarm drones flock under the swarm controller and never
        // join squads.
        self.world
            .query::<&Unit>()
            .iter()
            .filter(|(_, u)| {
                u.alliance == Alliance::Hostile && u.asset_type != tritium_core::enums::AssetType::SwarmDrone
            })
            .map(|(_, u)| SquadMember {
                id: u.id.clone(),
                position: u.position,
                heading: u.heading,
                health: u.health,
                health_fraction: u.health_fraction(),
                speed: u.speed,
                alive: u.is_alive(),
            })
            .collect()
    }

    fn defenders(&self) -> Vec<DefenderInfo> {
        self.world
            .query::<&Unit>()
            .iter()
            .filter(|(_, u)| u.alliance == Alliance::Friendly && u.is_alive())
            .map(|(_, u)| DefenderInfo {
                id: u.id.clone(),
                position: u.position,
                stationary: u.asset_type.category() == MovementCategory::Stationary,
            })
            .collect()
    }

    /// Membership, leadership, and formation-keeping. Followers ease
    /// toward their formation slot at the convergence rate, capped by
    /// what they could physically cover this tick.
    fn tick_squads(&mut self, dt: f64, now: f64) {
        let members = self.squad_members();
        let defenders = self.defenders();
        let slots = self
            .squad_manager
            .tick(dt, now, &members, &defenders, self.config.squad_radius, self.config.formation_spacing);

        for (unit_id, slot) in slots {
            if let Some(entity) = self.find_entity(&unit_id) {
                if let Ok(mut unit) = self.world.get::<&mut Unit>(entity) {
                    let to_slot = slot - unit.position;
                    let step = to_slot * FORMATION_CONVERGENCE;
                    let max_step = unit.speed * dt;
                    let step = if step.length() > max_step {
                        to_slot.normalize_or_zero() * max_step
                    } else {
                        step
                    };
                    unit.position += step;
                }
            }
        }

        for (_, unit) in self.world.query_mut::<&mut Unit>() {
            if unit.alliance == Alliance::Hostile {
                unit.squad_id = self.squad_manager.squad_of(&unit.id).map(|s| s.id.clone());
            }
        }
    }

    fn tick_squad_orders(&mut self, dt: f64, now: f64) {
        let members = self.squad_members();
        let defenders = self.defenders();
        let actions =
            self.squad_manager
                .tick_orders(dt, now, &members, &defenders, self.config.order_timeout_s, &mut self.rng);
        for action in actions {
            match action {
                OrderAction::SetSpeed { unit_id, speed } => {
                    if let Some(entity) = self.find_entity(&unit_id) {
                        if let Ok(mut unit) = self.world.get::<&mut Unit>(entity) {
                            unit.speed = speed;
                        }
                    }
                }
                OrderAction::Offset { unit_id, delta } => {
                    if let Some(entity) = self.find_entity(&unit_id) {
                        if let Ok(mut unit) = self.world.get::<&mut Unit>(entity) {
                            unit.position += delta;
                        }
                    }
                }
                OrderAction::SetWaypoint { unit_id, waypoint } => {
                    if let Some(entity) = self.find_entity(&unit_id) {
                        if let Ok(mut unit) = self.world.get::<&mut Unit>(entity) {
                            unit.waypoints = vec![waypoint];
                            unit.waypoint_index = 0;
                        }
                    }
                }
            }
        }
    }

    /// Elimination side effects: score, morale ripple, squad
    /// succession, pursuit release, and scratchpad cleanup.
    fn react_to_eliminations(&mut self, events: &[SimEvent]) {
        let radius = self.config.morale_proximity_radius;
        for event in events {
            let victim_id = match event {
                SimEvent::TargetEliminated { target_id, alliance, .. } => {
                    if *alliance == Alliance::Hostile {
                        self.score.hostiles_eliminated += 1;
                    }
                    target_id.clone()
                }
                SimEvent::UnitDestroyed { target_id } => {
                    self.score.friendlies_lost += 1;
                    target_id.clone()
                }
                _ => continue,
            };

            // The corpse is still in the world this tick.
            let victim_state = self
                .world
                .query::<&Unit>()
                .iter()
                .find(|(_, u)| u.id == victim_id)
                .map(|(_, u)| (u.alliance, u.position));
            if let Some((alliance, position)) = victim_state {
                morale::propagate_elimination(&mut self.world, alliance, position, radius);
            }

            let led_squad = self
                .squad_manager
                .squads()
                .find(|s| s.leader_id.as_deref() == Some(victim_id.as_str()))
                .map(|s| s.id.clone());
            if let Some(squad_id) = led_squad {
                let members: Vec<SquadMember> =
                    self.squad_members().into_iter().filter(|m| m.alive && m.id != victim_id).collect();
                self.squad_manager.on_leader_eliminated(&squad_id, &members, self.time.elapsed_secs);
            }

            self.pursuit.clear_target(&victim_id);
            self.hostile_state.clear_unit(&victim_id);
        }
    }

    /// Defeat detection: once friendlies have been fielded, losing the
    /// last of them ends the run.
    fn check_defeat(&mut self) {
        let friendlies_alive = self
            .world
            .query::<&Unit>()
            .iter()
            .any(|(_, u)| u.alliance == Alliance::Friendly && u.is_alive());
        if friendlies_alive {
            self.had_friendlies = true;
        } else if self.had_friendlies && !self.game_over {
            self.game_over = true;
            self.phase = GamePhase::Complete;
            self.publish_all(vec![SimEvent::GameOver { victory: false }]);
        }
    }

    fn publish_all(&mut self, events: Vec<SimEvent>) {
        let now = self.time.elapsed_secs;
        for event in events {
            self.replay.record_event(now, event.clone());
            self.event_bus.publish(event);
        }
    }

    fn should_snapshot(&self, now: f64) -> bool {
        now - self.last_snapshot_time >= 1.0 / self.config.snapshot_rate_hz
    }

    #[cfg(test)]
    pub fn spawn_test_unit(&mut self, definition: tritium_core::commands::UnitSpawn) -> Entity {
        let id = definition.id.clone().unwrap_or_else(|| self.generate_unit_id());
        spawn_unit(&mut self.world, definition, id)
    }
}

/// The snake_case tag serde uses for an asset type, matching the
/// strings upgrade/ability eligibility lists carry.
fn serde_type_name(asset_type: tritium_core::enums::AssetType) -> String {
    serde_json::to_value(asset_type)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tritium_core::commands::UnitSpawn;
    use tritium_core::enums::{AssetType, UnitStatus};

    fn def(alliance: Alliance, asset_type: AssetType, position: Point) -> UnitSpawn {
        UnitSpawn {
            id: None,
            name: "test".into(),
            alliance,
            asset_type,
            position,
            heading: 0.0,
            speed: 3.0,
            waypoints: Vec::new(),
            max_health: 100.0,
            weapon_range: 30.0,
            weapon_cooldown: 1.0,
            weapon_damage: 10.0,
            squad_id: None,
        }
    }

    #[test]
    fn test_idle_phase_does_not_advance_time() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        engine.spawn_test_unit(def(Alliance::Friendly, AssetType::Turret, Point::ZERO));
        let snapshot = engine.tick();
        assert_eq!(snapshot.time.tick, 0);
    }

    #[test]
    fn test_start_command_activates_and_ticks() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        engine.queue_command(Command::Start);
        let snapshot = engine.tick();
        assert_eq!(engine.phase(), GamePhase::Active);
        assert_eq!(snapshot.time.tick, 1);
    }

    #[test]
    fn test_spawn_command_adds_unit_to_snapshot() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        engine.queue_command(Command::Start);
        engine.queue_command(Command::Spawn { definition: def(Alliance::Friendly, AssetType::Turret, Point::ZERO) });
        let snapshot = engine.tick();
        assert_eq!(snapshot.units.len(), 1);
    }

    #[test]
    fn test_spawn_rejects_duplicate_id() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        let mut d = def(Alliance::Friendly, AssetType::Turret, Point::ZERO);
        d.id = Some("t1".into());
        engine.spawn(d.clone()).unwrap();
        assert!(matches!(engine.spawn(d), Err(SimError::Precondition(_))));
    }

    #[test]
    fn test_spawn_rejects_over_capacity() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        for _ in 0..MAX_LIVE_UNITS {
            engine.spawn(def(Alliance::Hostile, AssetType::Person, Point::ZERO)).unwrap();
        }
        assert!(matches!(
            engine.spawn(def(Alliance::Hostile, AssetType::Person, Point::ZERO)),
            Err(SimError::Capacity(_))
        ));
    }

    #[test]
    fn test_apply_upgrade_scales_stats_and_preserves_health_fraction() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        let entity = engine.spawn_test_unit(def(Alliance::Friendly, AssetType::Rover, Point::ZERO));
        {
            let mut unit = engine.world.get::<&mut Unit>(entity).unwrap();
            unit.id = "r1".into();
            unit.health = 50.0;
        }
        engine.apply_upgrade("r1", "armor_plating").unwrap();
        let unit = engine.world.get::<&Unit>(entity).unwrap();
        assert!((unit.max_health - 125.0).abs() < 1e-9);
        assert!((unit.health - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_apply_upgrade_rejects_ineligible_type() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        let entity = engine.spawn_test_unit(def(Alliance::Friendly, AssetType::Turret, Point::ZERO));
        engine.world.get::<&mut Unit>(entity).unwrap().id = "t1".into();
        // turbo_motor is restricted to mobile chassis.
        assert!(matches!(engine.apply_upgrade("t1", "turbo_motor"), Err(SimError::Precondition(_))));
    }

    #[test]
    fn test_emp_ability_slows_nearby_enemies_only() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        let caster = engine.spawn_test_unit(def(Alliance::Friendly, AssetType::Rover, Point::ZERO));
        let near = engine.spawn_test_unit(def(Alliance::Hostile, AssetType::Person, Point::new(5.0, 0.0)));
        let far = engine.spawn_test_unit(def(Alliance::Hostile, AssetType::Person, Point::new(500.0, 0.0)));
        engine.world.get::<&mut Unit>(caster).unwrap().id = "caster".into();
        engine.world.get::<&mut Unit>(near).unwrap().id = "near".into();
        engine.world.get::<&mut Unit>(far).unwrap().id = "far".into();

        engine.use_ability("caster", "emp").unwrap();
        assert_eq!(engine.upgrades.active_effects_for("near").len(), 1);
        assert_eq!(engine.upgrades.active_effects_for("far").len(), 0);
        assert_eq!(engine.upgrades.active_effects_for("caster").len(), 0);
    }

    #[test]
    fn test_overclock_ability_scales_cooldown_while_active() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        let entity = engine.spawn_test_unit(def(Alliance::Friendly, AssetType::Turret, Point::ZERO));
        engine.world.get::<&mut Unit>(entity).unwrap().id = "t1".into();

        engine.use_ability("t1", "overclock").unwrap();
        assert!((engine.upgrades.effect_cooldown_multiplier("t1") - 1.0 / 3.0).abs() < 1e-9);

        // Rovers are not overclock-capable kit.
        let rover = engine.spawn_test_unit(def(Alliance::Friendly, AssetType::Rover, Point::ZERO));
        engine.world.get::<&mut Unit>(rover).unwrap().id = "r1".into();
        assert!(matches!(engine.use_ability("r1", "overclock"), Err(SimError::Precondition(_))));
    }

    #[test]
    fn test_repair_ability_heals_caster() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        let entity = engine.spawn_test_unit(def(Alliance::Friendly, AssetType::Rover, Point::ZERO));
        {
            let mut unit = engine.world.get::<&mut Unit>(entity).unwrap();
            unit.id = "r1".into();
            unit.health = 10.0;
        }
        engine.use_ability("r1", "emergency_repair").unwrap();
        let unit = engine.world.get::<&Unit>(entity).unwrap();
        assert!((unit.health - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_command_clears_world_but_keeps_subscribers() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        let rx = engine.subscribe();
        engine.spawn_test_unit(def(Alliance::Friendly, AssetType::Turret, Point::ZERO));
        engine.queue_command(Command::Reset);
        let snapshot = engine.tick();
        assert_eq!(snapshot.units.len(), 0);
        assert_eq!(engine.phase(), GamePhase::Idle);

        engine.queue_command(Command::BeginWave {
            spec: tritium_core::commands::WaveSpec { wave_number: 1, spawns: vec![] },
        });
        engine.tick();
        assert!(rx.try_recv().is_ok(), "subscriber should survive reset");
    }

    #[test]
    fn test_set_waypoints_snaps_out_of_bounds_points() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        let entity = engine.spawn_test_unit(def(Alliance::Friendly, AssetType::Rover, Point::ZERO));
        engine.world.get::<&mut Unit>(entity).unwrap().id = "r1".into();
        engine.queue_command(Command::SetWaypoints {
            unit_id: "r1".into(),
            waypoints: vec![Point::new(10_000.0, 0.0)],
        });
        engine.tick();
        let unit = engine.world.get::<&Unit>(entity).unwrap();
        assert!(unit.waypoints[0].x <= engine.config.map_bounds);
    }

    #[test]
    fn test_losing_all_friendlies_publishes_game_over() {
        let mut engine = SimulationEngine::new(SimConfig::default());
        let rx = engine.subscribe();
        let entity = engine.spawn_test_unit(def(Alliance::Friendly, AssetType::Turret, Point::ZERO));
        engine.queue_command(Command::Start);
        engine.tick();

        {
            let mut unit = engine.world.get::<&mut Unit>(entity).unwrap();
            unit.health = 0.0;
            unit.status = UnitStatus::Destroyed;
        }
        engine.tick();

        let mut saw_game_over = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, SimEvent::GameOver { victory: false }) {
                saw_game_over = true;
            }
        }
        assert!(saw_game_over);
        assert_eq!(engine.phase(), GamePhase::Complete);
    }
}
