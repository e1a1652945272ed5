//! Fixed-step simulation over all characters sharing one physics backend.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use strider_common::{EntityId, GravityProvider, splitmix64};
use strider_input::{AiWander, InputSource};
use strider_movement::{Character, GroundTransition, MovementConfig, SpawnError, TickReport};
use strider_physics::{PhysicsBackend, PhysicsError, SharedBackend, shared};

use crate::world::{DEFAULT_GRAVITY, World};

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("character spawn failed: {0}")]
    Spawn(#[from] SpawnError),
    #[error("physics error: {0}")]
    Physics(#[from] PhysicsError),
    #[error("unknown character {0:?}")]
    UnknownCharacter(EntityId),
}

/// Clock, gravity and seed of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub tick_rate_hz: f32,
    pub gravity: Vec3,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            gravity: DEFAULT_GRAVITY,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Seconds per tick; zero for a non-positive tick rate.
    pub fn dt(&self) -> f32 {
        if self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0 {
            1.0 / self.tick_rate_hz
        } else {
            0.0
        }
    }
}

struct Actor<B: PhysicsBackend> {
    character: Character<B>,
    input: InputSource,
}

/// Owns the world, the shared backend and every character.
///
/// Single-threaded: one [`step`](Self::step) runs each character's input
/// source and `think()` once, then writes its transform into the world.
pub struct Simulation<B: PhysicsBackend> {
    world: World,
    backend: SharedBackend<B>,
    actors: BTreeMap<EntityId, Actor<B>>,
    config: SimConfig,
    paused: bool,
    ai_spawned: u64,
}

impl<B: PhysicsBackend> Simulation<B> {
    pub fn new(backend: B, config: SimConfig) -> Self {
        Self::with_backend(shared(backend), config)
    }

    /// Build on a backend that other code also holds.
    pub fn with_backend(backend: SharedBackend<B>, config: SimConfig) -> Self {
        let mut world = World::with_seed(config.seed);
        world.set_gravity(config.gravity);
        Self {
            world,
            backend,
            actors: BTreeMap::new(),
            config,
            paused: false,
            ai_spawned: 0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn backend(&self) -> &SharedBackend<B> {
        &self.backend
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn character_count(&self) -> usize {
        self.actors.len()
    }

    pub fn character_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.actors.keys().copied()
    }

    /// Spawn a character driven by `input`.
    ///
    /// The control mode follows the input source. An invalid config or a
    /// backend failure aborts the spawn and leaves the world untouched.
    pub fn spawn_character(
        &mut self,
        input: InputSource,
        mut movement: MovementConfig,
        position: Vec3,
    ) -> Result<EntityId, SimError> {
        movement.control_mode = input.control_mode();
        let character = Character::spawn(self.backend.clone(), movement, position)?;
        let id = self.world.spawn(character.transform());
        tracing::debug!(?id, ?position, "spawned character");
        self.actors.insert(id, Actor { character, input });
        Ok(id)
    }

    /// Spawn a wandering AI whose randomness derives from the simulation seed.
    pub fn spawn_ai(
        &mut self,
        movement: MovementConfig,
        position: Vec3,
    ) -> Result<EntityId, SimError> {
        self.ai_spawned += 1;
        let seed = splitmix64(self.config.seed ^ self.ai_spawned.wrapping_mul(0x9e37_79b9));
        self.spawn_character(InputSource::Ai(AiWander::new(seed)), movement, position)
    }

    /// Remove a character and release its controller.
    pub fn despawn_character(&mut self, id: EntityId) -> Result<(), SimError> {
        self.actors
            .remove(&id)
            .ok_or(SimError::UnknownCharacter(id))?;
        self.world.despawn(id);
        tracing::debug!(?id, "despawned character");
        Ok(())
    }

    pub fn character(&self, id: EntityId) -> Option<&Character<B>> {
        self.actors.get(&id).map(|a| &a.character)
    }

    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character<B>> {
        self.actors.get_mut(&id).map(|a| &mut a.character)
    }

    /// The input source of a character, e.g. to press player keys.
    pub fn input_mut(&mut self, id: EntityId) -> Option<&mut InputSource> {
        self.actors.get_mut(&id).map(|a| &mut a.input)
    }

    pub fn teleport(&mut self, id: EntityId, position: Vec3) -> Result<(), SimError> {
        let actor = self
            .actors
            .get_mut(&id)
            .ok_or(SimError::UnknownCharacter(id))?;
        actor.character.teleport(position)?;
        self.world.set_transform(id, actor.character.transform());
        Ok(())
    }

    pub fn set_heading(&mut self, id: EntityId, heading: Vec3) -> Result<(), SimError> {
        self.character_mut(id)
            .ok_or(SimError::UnknownCharacter(id))?
            .set_heading(heading);
        Ok(())
    }

    /// Freeze or resume the simulation. While paused, `step` does nothing.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            tracing::info!(paused, tick = self.world.tick(), "simulation pause toggled");
        }
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Run one fixed tick for every character.
    ///
    /// Returns each character's report in id order; empty while paused.
    pub fn step(&mut self) -> Vec<(EntityId, TickReport)> {
        if self.paused {
            return Vec::new();
        }
        self.world.step();
        let _span = tracing::info_span!("sim_step", tick = self.world.tick()).entered();

        let dt = self.config.dt();
        let gravity = self.world.gravity();
        let mut reports = Vec::with_capacity(self.actors.len());
        for (&id, actor) in self.actors.iter_mut() {
            let packet = actor.input.next_packet(dt);
            let report = actor.character.think(&packet, &gravity, dt);
            if let Some(transition) = report.transition {
                let on_ground = transition == GroundTransition::HitGround;
                self.world
                    .record_ground_change(id, on_ground, actor.character.position());
            }
            self.world.set_transform(id, actor.character.transform());
            reports.push((id, report));
        }
        tracing::trace!(characters = reports.len(), "tick complete");
        reports
    }

    /// Run `ticks` steps, discarding the reports.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    pub fn state_hash(&self) -> u64 {
        self.world.state_hash()
    }
}

impl<B: PhysicsBackend> std::fmt::Debug for Simulation<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.world.tick())
            .field("characters", &self.actors.len())
            .field("paused", &self.paused)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strider_input::{ControlMode, KeyBindings, PlayerInput};
    use strider_physics::{SimpleWorld, StaticGeometry};

    fn sim() -> Simulation<SimpleWorld> {
        Simulation::new(SimpleWorld::new(StaticGeometry::flat(0.0)), SimConfig::default())
    }

    fn player() -> InputSource {
        InputSource::Player(PlayerInput::new(KeyBindings::default()))
    }

    #[test]
    fn dt_from_tick_rate() {
        assert_eq!(SimConfig::default().dt(), 1.0 / 60.0);
        let stopped = SimConfig {
            tick_rate_hz: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(stopped.dt(), 0.0);
    }

    #[test]
    fn spawn_registers_entity_and_controller() {
        let mut sim = sim();
        let id = sim
            .spawn_character(player(), MovementConfig::default(), Vec3::new(0.0, 0.9, 0.0))
            .unwrap();
        assert_eq!(sim.character_count(), 1);
        assert_eq!(sim.world().entity_count(), 1);
        assert_eq!(sim.backend().borrow().controller_count(), 1);
        assert!(sim.character(id).unwrap().is_on_ground());
    }

    #[test]
    fn failed_spawn_leaves_world_untouched() {
        let mut sim = Simulation::new(
            SimpleWorld::new(StaticGeometry::flat(0.0)).with_capacity_limit(0),
            SimConfig::default(),
        );
        let err = sim.spawn_character(player(), MovementConfig::default(), Vec3::Y);
        assert!(matches!(err, Err(SimError::Spawn(_))));
        assert_eq!(sim.world().entity_count(), 0);
        assert_eq!(sim.character_count(), 0);
    }

    #[test]
    fn invalid_movement_config_fails_spawn() {
        let mut sim = sim();
        let movement = MovementConfig {
            jump_velocity: f32::NAN,
            ..MovementConfig::default()
        };
        let err = sim.spawn_character(player(), movement, Vec3::Y);
        assert!(matches!(err, Err(SimError::Spawn(SpawnError::Config(_)))));
        assert_eq!(sim.world().entity_count(), 0);
        assert_eq!(sim.backend().borrow().controller_count(), 0);
    }

    #[test]
    fn despawn_releases_controller() {
        let mut sim = sim();
        let id = sim
            .spawn_character(player(), MovementConfig::default(), Vec3::Y)
            .unwrap();
        sim.despawn_character(id).unwrap();
        assert_eq!(sim.backend().borrow().controller_count(), 0);
        assert_eq!(sim.world().entity_count(), 0);
        assert!(matches!(
            sim.despawn_character(id),
            Err(SimError::UnknownCharacter(_))
        ));
    }

    #[test]
    fn control_mode_follows_input_source() {
        let mut sim = sim();
        let p = sim
            .spawn_character(player(), MovementConfig::default(), Vec3::new(0.0, 0.9, 0.0))
            .unwrap();
        let a = sim
            .spawn_ai(MovementConfig::default(), Vec3::new(5.0, 0.9, 0.0))
            .unwrap();
        assert_eq!(sim.character(p).unwrap().state().control_mode(), ControlMode::Impulse);
        assert_eq!(sim.character(a).unwrap().state().control_mode(), ControlMode::Directional);
    }

    #[test]
    fn step_moves_pressed_player_and_updates_world() {
        let mut sim = sim();
        let id = sim
            .spawn_character(player(), MovementConfig::default(), Vec3::new(0.0, 0.9, 0.0))
            .unwrap();
        sim.input_mut(id).unwrap().as_player_mut().unwrap().press("W");
        for _ in 0..30 {
            sim.step();
        }
        let position = sim.world().get(id).unwrap().transform.position;
        assert!(position.z < -0.5);
        assert_eq!(position, sim.character(id).unwrap().position());
        assert_eq!(sim.world().tick(), 30);
    }

    #[test]
    fn paused_step_is_a_no_op() {
        let mut sim = sim();
        let id = sim
            .spawn_character(player(), MovementConfig::default(), Vec3::new(0.0, 0.9, 0.0))
            .unwrap();
        sim.input_mut(id).unwrap().as_player_mut().unwrap().press("W");
        sim.set_paused(true);
        let hash = sim.state_hash();
        for _ in 0..10 {
            assert!(sim.step().is_empty());
        }
        assert_eq!(sim.state_hash(), hash);
        assert_eq!(sim.world().tick(), 0);

        sim.set_paused(false);
        assert_eq!(sim.step().len(), 1);
        assert_eq!(sim.world().tick(), 1);
    }

    #[test]
    fn teleport_unknown_character_fails() {
        let mut sim = sim();
        assert!(matches!(
            sim.teleport(EntityId::new(), Vec3::ZERO),
            Err(SimError::UnknownCharacter(_))
        ));
    }
}
