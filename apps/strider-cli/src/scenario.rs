//! Scripted scenarios: level geometry, spawns and per-tick key presses.

use clap::ValueEnum;
use glam::Vec3;
use strider_common::EntityId;
use strider_input::{InputSource, KeyBindings, PlayerInput};
use strider_kernel::Simulation;
use strider_movement::MovementConfig;
use strider_physics::{PhysicsBackend, StaticGeometry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Walk forward on flat ground, running for the second half.
    Walk,
    /// Jump in place and land.
    Jump,
    /// Walk off a one-meter platform.
    Ledge,
    /// Four wandering AI characters in a small arena.
    Ai,
}

impl Scenario {
    pub fn geometry(self) -> StaticGeometry {
        match self {
            Self::Walk | Self::Jump => StaticGeometry::flat(0.0),
            Self::Ledge => StaticGeometry::flat(0.0)
                .with_box(Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 0.5, 1.0)),
            Self::Ai => StaticGeometry::flat(0.0)
                .with_box(Vec3::new(4.0, 0.5, -4.0), Vec3::new(1.5, 0.5, 1.5))
                .with_box(Vec3::new(-4.0, 0.15, 4.0), Vec3::new(2.0, 0.15, 2.0)),
        }
    }

    /// Spawn this scenario's characters.
    pub fn populate<B: PhysicsBackend>(
        self,
        sim: &mut Simulation<B>,
        movement: &MovementConfig,
    ) -> anyhow::Result<Vec<EntityId>> {
        let standing = movement.capsule.height * 0.5 + movement.capsule.radius;
        let ids = match self {
            Self::Walk | Self::Jump => vec![sim.spawn_character(
                player(),
                movement.clone(),
                Vec3::new(0.0, standing, 0.0),
            )?],
            Self::Ledge => vec![sim.spawn_character(
                player(),
                movement.clone(),
                Vec3::new(0.0, 1.0 + standing, 0.0),
            )?],
            Self::Ai => {
                let mut ids = Vec::new();
                for i in 0..4 {
                    let x = (i % 2) as f32 * 3.0 - 1.5;
                    let z = (i / 2) as f32 * 3.0 - 1.5;
                    ids.push(sim.spawn_ai(movement.clone(), Vec3::new(x, standing, z))?);
                }
                ids
            }
        };
        Ok(ids)
    }

    /// Key presses for `tick` (0-based, applied before the step).
    pub fn drive<B: PhysicsBackend>(
        self,
        sim: &mut Simulation<B>,
        ids: &[EntityId],
        tick: u64,
        ticks: u64,
    ) {
        let Some(player) = ids
            .first()
            .and_then(|id| sim.input_mut(*id))
            .and_then(InputSource::as_player_mut)
        else {
            return;
        };
        match (self, tick) {
            (Self::Walk | Self::Ledge, 0) => player.press("W"),
            (Self::Walk, t) if t == ticks / 2 => player.press("ShiftLeft"),
            (Self::Jump, 0) => player.press("Space"),
            (Self::Jump, 1) => player.release("Space"),
            _ => {}
        }
    }
}

fn player() -> InputSource {
    InputSource::Player(PlayerInput::new(KeyBindings::default()))
}
