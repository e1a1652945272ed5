use std::hint::black_box;
use std::time::Instant;

use glam::{Vec2, Vec3};
use strider_input::{ActionPacket, ControlMode, KeyEdge};
use strider_movement::{Character, MovementConfig};
use strider_physics::{SharedBackend, SimpleWorld, StaticGeometry, shared};

const DT: f32 = 1.0 / 60.0;
const GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

fn make_characters(
    backend: &SharedBackend<SimpleWorld>,
    count: usize,
    config: &MovementConfig,
) -> Vec<Character<SimpleWorld>> {
    let side = (count as f32).sqrt().ceil() as usize;
    (0..count)
        .map(|i| {
            let x = (i % side) as f32 * 2.0;
            let z = (i / side) as f32 * 2.0;
            Character::spawn(backend.clone(), config.clone(), Vec3::new(x, 0.9, z)).unwrap()
        })
        .collect()
}

fn level() -> StaticGeometry {
    let mut geometry = StaticGeometry::flat(0.0);
    for i in 0..32 {
        let x = (i % 8) as f32 * 6.0 + 3.0;
        let z = (i / 8) as f32 * 6.0 + 3.0;
        geometry = geometry.with_box(Vec3::new(x, 0.15, z), Vec3::new(1.0, 0.15, 1.0));
    }
    geometry
}

fn bench_think(count: usize, ticks: usize, mode: ControlMode) {
    let backend = shared(SimpleWorld::new(level()));
    let config = MovementConfig {
        control_mode: mode,
        ..MovementConfig::default()
    };
    let mut characters = make_characters(&backend, count, &config);

    let start = Instant::now();
    for tick in 0..ticks {
        let packet = match mode {
            ControlMode::Impulse => {
                let jump = if tick % 90 == 0 { KeyEdge::KeyDown } else { KeyEdge::None };
                ActionPacket::forward().with_jump(jump)
            }
            ControlMode::Directional => {
                let angle = tick as f32 * 0.01;
                ActionPacket::towards(Vec2::new(angle.sin(), angle.cos()))
            }
        };
        for c in characters.iter_mut() {
            black_box(c.think(black_box(&packet), &GRAVITY, DT));
        }
    }
    let elapsed = start.elapsed();
    let steps = (count * ticks) as u32;
    let per_step = elapsed / steps.max(1);
    println!(
        "  think {mode:?} ({count} characters, {ticks} ticks): {per_step:?}/character-tick, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Character think() Benchmarks ===");
    for count in [1, 64, 512] {
        bench_think(count, 600, ControlMode::Impulse);
    }
    for count in [64, 512] {
        bench_think(count, 600, ControlMode::Directional);
    }
}
