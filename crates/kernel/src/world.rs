use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strider_common::{EntityId, GravityProvider, Transform, splitmix64};
use uuid::Uuid;

/// Standard downward gravity in m/s².
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Events retained before the oldest half of the log is dropped.
pub const EVENT_LOG_CAPACITY: usize = 4096;

/// An event record produced by every mutation to the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Entity was spawned with the given transform.
    Spawned { id: EntityId, transform: Transform },
    /// Entity was despawned, with the transform it had.
    Despawned { id: EntityId, transform: Transform },
    /// Entity transform changed.
    TransformUpdated {
        id: EntityId,
        old: Transform,
        new: Transform,
    },
    /// Simulation advanced one tick with the given seed.
    Stepped { tick: u64, seed: u64 },
    /// A character started touching ground.
    HitGround { id: EntityId, tick: u64, position: Vec3 },
    /// A character lost ground contact.
    LeftGround { id: EntityId, tick: u64, position: Vec3 },
}

/// The authoritative world state.
///
/// Renderers and tools derive from it; characters write their transforms
/// back into it once per tick. Uses BTreeMap for deterministic iteration
/// order, and derives entity ids from the seed so that runs are reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    entities: BTreeMap<EntityId, EntityData>,
    tick: u64,
    /// Seed for deterministic RNG. Advanced each step.
    seed: u64,
    gravity: Vec3,
    /// Seed the world was created with; entity ids derive from it.
    id_seed: u64,
    spawned: u64,
    /// Event log of recent mutations, bounded by `event_capacity`.
    #[serde(skip)]
    event_log: Vec<WorldEvent>,
    #[serde(skip, default = "default_event_capacity")]
    event_capacity: usize,
    #[serde(skip)]
    dropped_events: u64,
}

fn default_event_capacity() -> usize {
    EVENT_LOG_CAPACITY
}

/// Per-entity data stored in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    pub transform: Transform,
}

impl Default for World {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl World {
    /// Create an empty world at tick 0 with seed 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a world with a specific seed for deterministic runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            entities: BTreeMap::new(),
            tick: 0,
            seed,
            gravity: DEFAULT_GRAVITY,
            id_seed: seed,
            spawned: 0,
            event_log: Vec::new(),
            event_capacity: EVENT_LOG_CAPACITY,
            dropped_events: 0,
        }
    }

    /// Bound the event log to `capacity` entries (at least one).
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Events discarded because nobody drained the log in time.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    fn record(&mut self, event: WorldEvent) {
        if self.event_log.len() >= self.event_capacity {
            let excess = self.event_log.len() - self.event_capacity / 2;
            self.event_log.drain(..excess);
            self.dropped_events += excess as u64;
            tracing::trace!(excess, "event log full, dropped oldest events");
        }
        self.event_log.push(event);
    }

    /// Read-only access to all entities (BTreeMap for deterministic iteration).
    pub fn entities(&self) -> &BTreeMap<EntityId, EntityData> {
        &self.entities
    }

    /// Next entity id derived from the creation seed and spawn count.
    fn next_id(&mut self) -> EntityId {
        self.spawned += 1;
        let hi = splitmix64(self.id_seed ^ self.spawned.rotate_left(32));
        let lo = splitmix64(hi ^ self.spawned);
        EntityId(Uuid::from_u64_pair(hi, lo))
    }

    /// Spawn a new entity with the given transform. Returns its id.
    pub fn spawn(&mut self, transform: Transform) -> EntityId {
        let mut id = self.next_id();
        while self.entities.contains_key(&id) {
            id = self.next_id();
        }
        self.spawn_with_id(id, transform);
        id
    }

    /// Spawn an entity with a specific id.
    pub fn spawn_with_id(&mut self, id: EntityId, transform: Transform) {
        self.entities.insert(id, EntityData { transform });
        self.record(WorldEvent::Spawned { id, transform });
    }

    /// Remove an entity. Returns the data if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityData> {
        let data = self.entities.remove(&id);
        if let Some(ref d) = data {
            let transform = d.transform;
            self.record(WorldEvent::Despawned { id, transform });
        }
        data
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityData> {
        self.entities.get(&id)
    }

    /// Update an entity's transform, logging it if it changed.
    pub fn set_transform(&mut self, id: EntityId, new: Transform) -> bool {
        if let Some(data) = self.entities.get_mut(&id) {
            let old = data.transform;
            if old != new {
                data.transform = new;
                self.record(WorldEvent::TransformUpdated { id, old, new });
            }
            true
        } else {
            false
        }
    }

    /// Record a character's ground contact change at the current tick.
    pub fn record_ground_change(&mut self, id: EntityId, on_ground: bool, position: Vec3) {
        let tick = self.tick;
        self.record(if on_ground {
            WorldEvent::HitGround { id, tick, position }
        } else {
            WorldEvent::LeftGround { id, tick, position }
        });
    }

    /// Advance the world clock by one tick and mix the seed.
    pub fn step(&mut self) {
        self.tick += 1;
        // splitmix64 keeps the sequence identical across platforms.
        self.seed = splitmix64(self.seed);
        self.record(WorldEvent::Stepped {
            tick: self.tick,
            seed: self.seed,
        });
    }

    /// Compute a deterministic hash of the world state for comparison.
    /// Uses canonical (BTreeMap) iteration order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        let mix_vec = |h: &mut u64, v: &[f32]| {
            for x in v {
                mix(h, &x.to_le_bytes());
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.seed.to_le_bytes());
        mix_vec(&mut h, &self.gravity.to_array());
        for (id, data) in &self.entities {
            let t = &data.transform;
            mix(&mut h, id.0.as_bytes());
            mix_vec(&mut h, &t.position.to_array());
            mix_vec(&mut h, &t.rotation.to_array());
            mix_vec(&mut h, &t.scale.to_array());
        }
        h
    }
}

impl GravityProvider for World {
    fn gravity(&self) -> Vec3 {
        self.gravity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_starts_empty() {
        let w = World::new();
        assert_eq!(w.tick(), 0);
        assert_eq!(w.entity_count(), 0);
        assert_eq!(w.gravity(), DEFAULT_GRAVITY);
    }

    #[test]
    fn spawn_and_despawn() {
        let mut w = World::new();
        let id = w.spawn(Transform::default());
        assert_eq!(w.entity_count(), 1);
        assert!(w.get(id).is_some());

        let data = w.despawn(id);
        assert!(data.is_some());
        assert_eq!(w.entity_count(), 0);
    }

    #[test]
    fn ids_follow_the_seed() {
        let mut w1 = World::with_seed(5);
        let mut w2 = World::with_seed(5);
        let mut w3 = World::with_seed(6);
        let a: Vec<_> = (0..10).map(|_| w1.spawn(Transform::default())).collect();
        let b: Vec<_> = (0..10).map(|_| w2.spawn(Transform::default())).collect();
        let c: Vec<_> = (0..10).map(|_| w3.spawn(Transform::default())).collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(w1.entity_count(), 10);
    }

    #[test]
    fn step_increments_tick_and_mixes_seed() {
        let mut w = World::with_seed(42);
        w.step();
        w.step();
        w.step();
        assert_eq!(w.tick(), 3);
        assert_eq!(w.seed(), splitmix64(splitmix64(splitmix64(42))));
    }

    #[test]
    fn different_seeds_diverge() {
        let mut w1 = World::with_seed(1);
        let mut w2 = World::with_seed(2);
        w1.step();
        w2.step();
        assert_ne!(w1.seed(), w2.seed());
    }

    #[test]
    fn events_are_recorded() {
        let mut w = World::new();
        let id = w.spawn(Transform::default());
        w.step();
        w.record_ground_change(id, false, Vec3::ZERO);
        w.despawn(id);
        assert_eq!(w.events().len(), 4);
        assert!(matches!(
            w.events()[2],
            WorldEvent::LeftGround { tick: 1, .. }
        ));
    }

    #[test]
    fn drain_events_clears_log() {
        let mut w = World::new();
        w.spawn(Transform::default());
        let events = w.drain_events();
        assert_eq!(events.len(), 1);
        assert!(w.events().is_empty());
    }

    #[test]
    fn undrained_log_stays_bounded() {
        let mut w = World::new().with_event_capacity(8);
        for _ in 0..100 {
            w.step();
        }
        assert!(w.events().len() <= 8);
        assert_eq!(w.dropped_events() + w.events().len() as u64, 100);
        assert!(matches!(
            w.events().last(),
            Some(WorldEvent::Stepped { tick: 100, .. })
        ));
    }

    #[test]
    fn set_transform_logs_only_changes() {
        let mut w = World::new();
        let id = w.spawn(Transform::default());
        let new_t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(w.set_transform(id, new_t));
        assert!(w.set_transform(id, new_t));
        assert_eq!(w.get(id).unwrap().transform.position, new_t.position);
        // spawn + one transform update
        assert_eq!(w.events().len(), 2);
        assert!(!w.set_transform(EntityId::new(), new_t));
    }

    #[test]
    fn state_hash_deterministic() {
        let mut w1 = World::with_seed(42);
        let mut w2 = World::with_seed(42);
        w1.spawn(Transform::default());
        w2.spawn(Transform::default());
        w1.step();
        w2.step();
        assert_eq!(w1.state_hash(), w2.state_hash());
    }

    #[test]
    fn state_hash_sees_transforms_and_gravity() {
        let mut w = World::with_seed(3);
        let id = w.spawn(Transform::default());
        let base = w.state_hash();

        w.set_transform(id, Transform::from_position(Vec3::X));
        let moved = w.state_hash();
        assert_ne!(base, moved);

        w.set_gravity(Vec3::new(0.0, -1.62, 0.0));
        assert_ne!(moved, w.state_hash());
    }

    #[test]
    fn btreemap_gives_deterministic_iteration() {
        let mut w = World::with_seed(0);
        for _ in 0..100 {
            w.spawn(Transform::default());
        }
        let entity_keys: Vec<EntityId> = w.entities().keys().copied().collect();
        let mut sorted = entity_keys.clone();
        sorted.sort();
        assert_eq!(entity_keys, sorted);
    }
}
