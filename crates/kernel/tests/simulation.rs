//! Whole-simulation scenarios: determinism, pause, ground events, backends.

use glam::Vec3;
use strider_input::{InputSource, KeyBindings, PlayerInput};
use strider_kernel::{EVENT_LOG_CAPACITY, SimConfig, Simulation, WorldEvent};
use strider_movement::{MoveStatus, MovementConfig};
use strider_physics::{PhysicsBackend, RapierWorld, SimpleWorld, StaticGeometry};

fn arena() -> StaticGeometry {
    StaticGeometry::flat(0.0)
        .with_box(Vec3::new(4.0, 0.5, -4.0), Vec3::new(1.5, 0.5, 1.5))
        .with_box(Vec3::new(-5.0, 0.15, 3.0), Vec3::new(2.0, 0.15, 2.0))
}

fn crowd(seed: u64) -> Simulation<SimpleWorld> {
    let config = SimConfig {
        seed,
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(SimpleWorld::new(arena()), config);
    for i in 0..8 {
        let x = (i % 4) as f32 * 3.0 - 4.5;
        let z = (i / 4) as f32 * 3.0;
        sim.spawn_ai(MovementConfig::default(), Vec3::new(x, 0.9, z))
            .unwrap();
    }
    sim
}

fn player_sim<B: PhysicsBackend>(backend: B) -> (Simulation<B>, strider_common::EntityId) {
    let mut sim = Simulation::new(backend, SimConfig::default());
    let id = sim
        .spawn_character(
            InputSource::Player(PlayerInput::new(KeyBindings::default())),
            MovementConfig::default(),
            Vec3::new(0.0, 0.9, 0.0),
        )
        .unwrap();
    (sim, id)
}

#[test]
fn same_seed_same_trajectory() {
    let mut a = crowd(1234);
    let mut b = crowd(1234);
    for tick in 0..600 {
        a.step();
        b.step();
        assert_eq!(a.state_hash(), b.state_hash(), "diverged at tick {tick}");
    }
}

#[test]
fn different_seed_different_trajectory() {
    let mut a = crowd(1);
    let mut b = crowd(2);
    a.run(300);
    b.run(300);
    assert_ne!(a.state_hash(), b.state_hash());
}

#[test]
fn ai_characters_wander() {
    let mut sim = crowd(77);
    let starts: Vec<Vec3> = sim
        .character_ids()
        .map(|id| sim.character(id).unwrap().position())
        .collect();
    sim.run(600);
    let moved = sim
        .character_ids()
        .zip(starts)
        .filter(|(id, start)| {
            let p = sim.character(*id).unwrap().position();
            Vec3::new(p.x - start.x, 0.0, p.z - start.z).length() > 0.5
        })
        .count();
    assert!(moved >= 4, "only {moved} of 8 characters wandered");
}

#[test]
fn pause_freezes_everything() {
    let mut sim = crowd(9);
    sim.run(30);
    let hash = sim.state_hash();
    let tick = sim.world().tick();

    sim.set_paused(true);
    sim.run(100);
    assert_eq!(sim.state_hash(), hash);
    assert_eq!(sim.world().tick(), tick);

    sim.set_paused(false);
    sim.run(1);
    assert_eq!(sim.world().tick(), tick + 1);
}

#[test]
fn jump_logs_ground_events_once_each() {
    let (mut sim, id) = player_sim(SimpleWorld::new(StaticGeometry::flat(0.0)));
    sim.world_mut().drain_events();

    sim.input_mut(id).unwrap().as_player_mut().unwrap().press("Space");
    sim.step();
    assert_eq!(sim.character(id).unwrap().velocity().y, 5.0);
    sim.input_mut(id).unwrap().as_player_mut().unwrap().release("Space");
    sim.run(120);

    let events = sim.world_mut().drain_events();
    let left: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            WorldEvent::LeftGround { tick, .. } => Some(*tick),
            _ => None,
        })
        .collect();
    let hit: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            WorldEvent::HitGround { tick, .. } => Some(*tick),
            _ => None,
        })
        .collect();
    assert_eq!(left, vec![1]);
    assert_eq!(hit.len(), 1);
    assert!(hit[0] > 50 && hit[0] < 70, "landed at tick {}", hit[0]);
    assert!(sim.character(id).unwrap().is_on_ground());
}

#[test]
fn holding_space_jumps_only_once() {
    let (mut sim, id) = player_sim(SimpleWorld::new(StaticGeometry::flat(0.0)));
    sim.input_mut(id).unwrap().as_player_mut().unwrap().press("Space");
    sim.run(200);
    let jumps = sim
        .world()
        .events()
        .iter()
        .filter(|e| matches!(e, WorldEvent::LeftGround { .. }))
        .count();
    assert_eq!(jumps, 1);
}

#[test]
fn long_run_keeps_event_log_bounded() {
    let (mut sim, id) = player_sim(SimpleWorld::new(StaticGeometry::flat(0.0)));
    sim.input_mut(id).unwrap().as_player_mut().unwrap().press("W");
    sim.run(20_000);
    let world = sim.world();
    assert!(world.events().len() <= EVENT_LOG_CAPACITY);
    assert!(world.dropped_events() > 0);
    assert!(
        world
            .events()
            .iter()
            .any(|e| matches!(e, WorldEvent::Stepped { tick: 20_000, .. }))
    );
}

#[test]
fn rotation_follows_movement() {
    let (mut sim, id) = player_sim(SimpleWorld::new(StaticGeometry::flat(0.0)));
    let player = sim.input_mut(id).unwrap().as_player_mut().unwrap();
    player.press("D");
    sim.run(20);
    let transform = sim.world().get(id).unwrap().transform;
    let facing = transform.rotation * Vec3::NEG_Z;
    assert!((facing - Vec3::X).length() < 1e-4, "facing {facing}");
    assert_eq!(sim.character(id).unwrap().move_status(), MoveStatus::Walking);
}

#[test]
fn rapier_backend_walks_on_floor() {
    let (mut sim, id) = player_sim(RapierWorld::new(&StaticGeometry::flat(0.0)));
    sim.run(60);
    assert!(sim.character(id).unwrap().is_on_ground());

    sim.input_mut(id).unwrap().as_player_mut().unwrap().press("W");
    sim.run(60);
    let c = sim.character(id).unwrap();
    assert!(c.position().z < -1.5, "walked to z = {}", c.position().z);
    assert!((c.position().y - 0.9).abs() < 0.1);
    assert!(c.is_on_ground());
}
