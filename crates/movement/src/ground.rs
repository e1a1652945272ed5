//! Ground-state edges and the observers that listen for them.

use glam::Vec3;
use strider_physics::CollisionFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundTransition {
    HitGround,
    LeftGround,
}

/// Compare "collided below" across one tick boundary.
pub fn detect_transition(
    previous: CollisionFlags,
    current: CollisionFlags,
) -> Option<GroundTransition> {
    match (previous.collided_below(), current.collided_below()) {
        (false, true) => Some(GroundTransition::HitGround),
        (true, false) => Some(GroundTransition::LeftGround),
        _ => None,
    }
}

type GroundCallback = Box<dyn FnMut(Vec3)>;

/// Observers called synchronously when a character lands or leaves the ground.
///
/// Each callback receives the character position after the move.
#[derive(Default)]
pub struct GroundHooks {
    hit_ground: Vec<GroundCallback>,
    leave_ground: Vec<GroundCallback>,
}

impl GroundHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_hit_ground(&mut self, callback: impl FnMut(Vec3) + 'static) {
        self.hit_ground.push(Box::new(callback));
    }

    pub fn on_leave_ground(&mut self, callback: impl FnMut(Vec3) + 'static) {
        self.leave_ground.push(Box::new(callback));
    }

    pub fn len(&self) -> usize {
        self.hit_ground.len() + self.leave_ground.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify(&mut self, transition: GroundTransition, position: Vec3) {
        let callbacks = match transition {
            GroundTransition::HitGround => &mut self.hit_ground,
            GroundTransition::LeftGround => &mut self.leave_ground,
        };
        for callback in callbacks.iter_mut() {
            callback(position);
        }
    }
}

impl std::fmt::Debug for GroundHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroundHooks")
            .field("hit_ground", &self.hit_ground.len())
            .field("leave_ground", &self.leave_ground.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn flags(below: bool) -> CollisionFlags {
        if below {
            CollisionFlags::BELOW
        } else {
            CollisionFlags::EMPTY
        }
    }

    #[test]
    fn one_transition_per_crossing() {
        let sequence = [true, true, false, false, true];
        let transitions: Vec<_> = sequence
            .windows(2)
            .enumerate()
            .filter_map(|(i, w)| detect_transition(flags(w[0]), flags(w[1])).map(|t| (i, t)))
            .collect();
        assert_eq!(
            transitions,
            vec![(1, GroundTransition::LeftGround), (3, GroundTransition::HitGround)]
        );
    }

    #[test]
    fn side_contacts_do_not_count_as_ground() {
        assert_eq!(
            detect_transition(CollisionFlags::EMPTY, CollisionFlags::SIDES),
            None
        );
        assert_eq!(
            detect_transition(
                CollisionFlags::BELOW,
                CollisionFlags::SIDES | CollisionFlags::ABOVE
            ),
            Some(GroundTransition::LeftGround)
        );
    }

    #[test]
    fn hooks_receive_matching_transitions() {
        let hits = Rc::new(Cell::new(0));
        let leaves = Rc::new(Cell::new(0));
        let mut hooks = GroundHooks::new();
        {
            let hits = hits.clone();
            hooks.on_hit_ground(move |_| hits.set(hits.get() + 1));
        }
        {
            let leaves = leaves.clone();
            hooks.on_leave_ground(move |_| leaves.set(leaves.get() + 1));
        }
        assert_eq!(hooks.len(), 2);

        hooks.notify(GroundTransition::HitGround, Vec3::ZERO);
        hooks.notify(GroundTransition::HitGround, Vec3::ZERO);
        hooks.notify(GroundTransition::LeftGround, Vec3::ZERO);
        assert_eq!(hits.get(), 2);
        assert_eq!(leaves.get(), 1);
    }
}
