//! Rapier-backed kinematic capsules over static colliders.
//!
//! Statics are inserted once as parentless colliders and indexed by a
//! `BroadPhaseBvh`; every query borrows a `QueryPipeline` view over them.
//! Character capsules are not inserted into the collider set, so they never
//! collide with each other.

use std::collections::BTreeMap;

use glam::Vec3;
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;

use crate::backend::{ControllerDesc, ControllerHandle, GroundHit, PhysicsBackend, PhysicsError};
use crate::flags::CollisionFlags;
use crate::geometry::StaticGeometry;

/// Horizontal shortfall (meters) above which a move counts as blocked sideways.
const SIDE_BLOCK_EPS: f32 = 1.0e-4;

struct StaticScene {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
}

impl StaticScene {
    fn build(geometry: &StaticGeometry) -> Self {
        let bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut modified_colliders = Vec::new();

        if let Some(height) = geometry.floor {
            let floor = ColliderBuilder::halfspace(Vector::y_axis())
                .translation(vector![0.0, height, 0.0])
                .build();
            modified_colliders.push(colliders.insert(floor));
        }
        for b in &geometry.boxes {
            let h = b.half_extents;
            let c = b.center;
            let collider = ColliderBuilder::cuboid(h.x, h.y, h.z)
                .translation(vector![c.x, c.y, c.z])
                .build();
            modified_colliders.push(colliders.insert(collider));
        }

        let mut broad_phase = BroadPhaseBvh::new();
        let mut events = Vec::new();
        broad_phase.update(
            &IntegrationParameters::default(),
            &colliders,
            &bodies,
            &modified_colliders,
            &[],
            &mut events,
        );

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase: NarrowPhase::default(),
        }
    }

    fn query_pipeline(&self) -> QueryPipeline<'_> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            QueryFilter::default(),
        )
    }
}

struct RapierCapsule {
    kcc: KinematicCharacterController,
    shape: Capsule,
    position: Vec3,
    last_flags: CollisionFlags,
}

/// Kinematic world driving Rapier's character controller.
pub struct RapierWorld {
    scene: StaticScene,
    controllers: BTreeMap<ControllerHandle, RapierCapsule>,
    next_handle: u32,
}

impl RapierWorld {
    pub fn new(geometry: &StaticGeometry) -> Self {
        tracing::debug!(boxes = geometry.boxes.len(), "building rapier static scene");
        Self {
            scene: StaticScene::build(geometry),
            controllers: BTreeMap::new(),
            next_handle: 0,
        }
    }
}

impl PhysicsBackend for RapierWorld {
    fn create_controller(
        &mut self,
        desc: &ControllerDesc,
    ) -> Result<ControllerHandle, PhysicsError> {
        let kcc = KinematicCharacterController {
            offset: CharacterLength::Absolute(desc.contact_offset),
            autostep: Some(CharacterAutostep {
                max_height: CharacterLength::Absolute(desc.step_offset),
                min_width: CharacterLength::Absolute(desc.radius * 0.5),
                include_dynamic_bodies: false,
            }),
            max_slope_climb_angle: desc.slope_limit_deg.to_radians(),
            // Ground adherence is done by the movement code.
            snap_to_ground: None,
            ..KinematicCharacterController::default()
        };
        let handle = ControllerHandle(self.next_handle);
        self.next_handle += 1;
        self.controllers.insert(
            handle,
            RapierCapsule {
                kcc,
                shape: Capsule::new_y(desc.height * 0.5, desc.radius),
                position: desc.position,
                last_flags: CollisionFlags::EMPTY,
            },
        );
        Ok(handle)
    }

    fn move_controller(
        &mut self,
        handle: ControllerHandle,
        displacement: Vec3,
        min_distance: f32,
        dt: f32,
    ) -> CollisionFlags {
        let Some(capsule) = self.controllers.get_mut(&handle) else {
            tracing::warn!(?handle, "move on unknown controller");
            return CollisionFlags::EMPTY;
        };
        if !displacement.is_finite() || displacement.length() < min_distance {
            return capsule.last_flags;
        }

        let p = capsule.position;
        let desired = vector![displacement.x, displacement.y, displacement.z];
        let query_pipeline = self.scene.query_pipeline();
        let corrected = capsule.kcc.move_shape(
            dt,
            &query_pipeline,
            &capsule.shape,
            &Isometry::translation(p.x, p.y, p.z),
            desired,
            |_| {},
        );
        let applied = Vec3::new(
            corrected.translation.x,
            corrected.translation.y,
            corrected.translation.z,
        );
        capsule.position += applied;

        let mut flags = CollisionFlags::EMPTY;
        if corrected.grounded {
            flags |= CollisionFlags::BELOW;
        }
        let wanted_h = Vec3::new(displacement.x, 0.0, displacement.z).length();
        let got_h = Vec3::new(applied.x, 0.0, applied.z).length();
        if wanted_h - got_h > SIDE_BLOCK_EPS {
            flags |= CollisionFlags::SIDES;
        }
        if displacement.y > 0.0 && applied.y < displacement.y - SIDE_BLOCK_EPS {
            flags |= CollisionFlags::ABOVE;
        }
        capsule.last_flags = flags;
        flags
    }

    fn ground_query(&self, origin: Vec3, max_distance: f32) -> Option<GroundHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![0.0, -1.0, 0.0],
        );
        let query_pipeline = self.scene.query_pipeline();
        let (_collider, hit) =
            query_pipeline.cast_ray_and_get_normal(&ray, max_distance.max(0.0), true)?;
        let point = ray.point_at(hit.time_of_impact);
        Some(GroundHit {
            point: Vec3::new(point.x, point.y, point.z),
            normal: Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z),
        })
    }

    fn position(&self, handle: ControllerHandle) -> Option<Vec3> {
        self.controllers.get(&handle).map(|c| c.position)
    }

    fn set_position(
        &mut self,
        handle: ControllerHandle,
        position: Vec3,
    ) -> Result<(), PhysicsError> {
        let c = self
            .controllers
            .get_mut(&handle)
            .ok_or(PhysicsError::UnknownHandle(handle))?;
        c.position = position;
        c.last_flags = CollisionFlags::EMPTY;
        Ok(())
    }

    fn release_controller(&mut self, handle: ControllerHandle) {
        self.controllers.remove(&handle);
    }

    fn controller_count(&self) -> usize {
        self.controllers.len()
    }
}
