use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::action::{ActionPacket, KeyEdge, MoveIntent, SidestepIntent};

/// A logical action a physical key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Run,
    Crouch,
}

/// Key name to action table, handed to the player input at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings {
    keys: BTreeMap<String, Binding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut keys = BTreeMap::new();
        keys.insert("W".into(), Binding::Forward);
        keys.insert("S".into(), Binding::Backward);
        keys.insert("A".into(), Binding::Left);
        keys.insert("D".into(), Binding::Right);
        keys.insert("Space".into(), Binding::Jump);
        keys.insert("ShiftLeft".into(), Binding::Run);
        keys.insert("ControlLeft".into(), Binding::Crouch);
        Self { keys }
    }
}

impl KeyBindings {
    /// An empty table with nothing bound.
    pub fn empty() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    /// Bind `key` to `binding`, replacing any earlier binding of that key.
    pub fn bind(&mut self, key: impl Into<String>, binding: Binding) {
        self.keys.insert(key.into(), binding);
    }

    /// Remove the binding for `key`. Returns what it was bound to.
    pub fn unbind(&mut self, key: &str) -> Option<Binding> {
        self.keys.remove(key)
    }

    /// Look up the action bound to `key`.
    pub fn lookup(&self, key: &str) -> Option<Binding> {
        self.keys.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Player key state, sampled once per tick into an [`ActionPacket`].
///
/// Tracks which bindings are held now and which were held at the previous
/// sample so that jump/run/crouch are reported as edges.
#[derive(Debug, Clone, Default)]
pub struct PlayerInput {
    bindings: KeyBindings,
    held: BTreeSet<Binding>,
    previous: BTreeSet<Binding>,
}

impl PlayerInput {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: BTreeSet::new(),
            previous: BTreeSet::new(),
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Physical key went down. Unbound keys are ignored.
    pub fn press(&mut self, key: &str) {
        match self.bindings.lookup(key) {
            Some(binding) => {
                self.held.insert(binding);
            }
            None => tracing::trace!(key, "ignoring unbound key"),
        }
    }

    /// Physical key went up.
    pub fn release(&mut self, key: &str) {
        if let Some(binding) = self.bindings.lookup(key) {
            self.held.remove(&binding);
        }
    }

    /// Release everything (e.g. on focus loss).
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, binding: Binding) -> bool {
        self.held.contains(&binding)
    }

    /// Produce this tick's packet and latch the held set for edge detection.
    pub fn sample(&mut self) -> ActionPacket {
        let forward = self.is_held(Binding::Forward);
        let backward = self.is_held(Binding::Backward);
        let movement = match (forward, backward) {
            (true, false) => MoveIntent::Forward,
            (false, true) => MoveIntent::Backward,
            _ => MoveIntent::None,
        };

        let left = self.is_held(Binding::Left);
        let right = self.is_held(Binding::Right);
        let sidestep = match (left, right) {
            (true, false) => SidestepIntent::Left,
            (false, true) => SidestepIntent::Right,
            _ => SidestepIntent::None,
        };

        let packet = ActionPacket {
            movement,
            sidestep,
            jump: self.edge(Binding::Jump),
            run: self.edge(Binding::Run),
            crouch: self.edge(Binding::Crouch),
            direction: None,
        };
        self.previous = self.held.clone();
        packet
    }

    fn edge(&self, binding: Binding) -> KeyEdge {
        match (self.previous.contains(&binding), self.held.contains(&binding)) {
            (false, true) => KeyEdge::KeyDown,
            (true, false) => KeyEdge::KeyUp,
            _ => KeyEdge::None,
        }
    }
}
