//! Entity registry
//!
//! Gameplay metadata keyed to physics bodies. The registry owns the records;
//! the engine owns the bodies. A record is only ever removed together with
//! its body (`despawn`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::physics::{BodyHandle, PhysicsEngine};

/// Registry key. Pipes are numbered in spawn order: each pair takes an odd
/// (upper) and the following even (lower) number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKey {
    Pug,
    Ground(u8),
    Pipe(u32),
    PipeCap(u32),
}

impl EntityKey {
    /// Lower pipe shafts carry the pair's scoring and recycling checks
    pub fn is_lower_pipe(&self) -> bool {
        matches!(self, EntityKey::Pipe(n) if n % 2 == 0)
    }

    /// Pipe number for shafts and caps
    pub fn pipe_index(&self) -> Option<u32> {
        match *self {
            EntityKey::Pipe(n) | EntityKey::PipeCap(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Pug => write!(f, "pug"),
            EntityKey::Ground(n) => write!(f, "floor{n}"),
            EntityKey::Pipe(n) => write!(f, "pipe{n}"),
            EntityKey::PipeCap(n) => write!(f, "pipe{n}-cap"),
        }
    }
}

/// What an entity is, for gameplay and for picking a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Obstacle,
    ObstacleCap,
    Ground,
}

impl EntityKind {
    pub fn is_obstacle(&self) -> bool {
        matches!(self, EntityKind::Obstacle | EntityKind::ObstacleCap)
    }
}

/// A registered entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub body: BodyHandle,
    /// Set once the pug has passed this pipe
    pub scored: bool,
    pub kind: EntityKind,
}

impl EntityRecord {
    pub fn new(body: BodyHandle, kind: EntityKind) -> Self {
        Self {
            body,
            scored: false,
            kind,
        }
    }
}

/// Key → record map with deterministic (key-ordered) iteration
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<EntityKey, EntityRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Insert a record, returning the one it replaced
    pub fn insert(&mut self, key: EntityKey, record: EntityRecord) -> Option<EntityRecord> {
        self.entries.insert(key, record)
    }

    pub fn get(&self, key: EntityKey) -> Option<&EntityRecord> {
        self.entries.get(&key)
    }

    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut EntityRecord> {
        self.entries.get_mut(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &EntityRecord)> {
        self.entries.iter()
    }

    /// Visit every record matching `predicate`
    pub fn for_each(
        &self,
        mut predicate: impl FnMut(&EntityKey, &EntityRecord) -> bool,
        mut f: impl FnMut(&EntityKey, &EntityRecord),
    ) {
        for (key, record) in &self.entries {
            if predicate(key, record) {
                f(key, record);
            }
        }
    }

    /// Snapshot of matching keys, safe to mutate the registry while walking it
    pub fn keys_where(&self, mut predicate: impl FnMut(&EntityKey, &EntityRecord) -> bool) -> Vec<EntityKey> {
        self.entries
            .iter()
            .filter(|(key, record)| predicate(*key, *record))
            .map(|(key, _)| *key)
            .collect()
    }

    /// Remove a record and its body from the engine in one step
    pub fn despawn(&mut self, key: EntityKey, engine: &mut PhysicsEngine) -> Option<EntityRecord> {
        let record = self.entries.remove(&key)?;
        let removed = engine.remove(record.body);
        debug_assert!(removed.is_some(), "{key} referenced body {:?} missing from the engine", record.body);
        if removed.is_none() {
            log::error!("{key} referenced a body that was already gone");
        }
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::{BodyDesc, EngineOptions};
    use glam::Vec2;

    fn engine_with_pipe() -> (PhysicsEngine, Registry, BodyHandle) {
        let mut engine = PhysicsEngine::new(EngineOptions::default());
        let body = engine.add(BodyDesc::fixed(Vec2::new(100.0, 100.0), Vec2::new(100.0, 200.0)));
        let mut registry = Registry::new();
        registry.insert(EntityKey::Pipe(2), EntityRecord::new(body, EntityKind::Obstacle));
        (engine, registry, body)
    }

    #[test]
    fn test_key_display() {
        assert_eq!(EntityKey::Pug.to_string(), "pug");
        assert_eq!(EntityKey::Ground(2).to_string(), "floor2");
        assert_eq!(EntityKey::Pipe(7).to_string(), "pipe7");
        assert_eq!(EntityKey::PipeCap(8).to_string(), "pipe8-cap");
    }

    #[test]
    fn test_lower_pipe_detection() {
        assert!(EntityKey::Pipe(2).is_lower_pipe());
        assert!(!EntityKey::Pipe(3).is_lower_pipe());
        assert!(!EntityKey::PipeCap(2).is_lower_pipe());
        assert!(!EntityKey::Ground(2).is_lower_pipe());
        assert_eq!(EntityKey::PipeCap(5).pipe_index(), Some(5));
        assert_eq!(EntityKey::Pug.pipe_index(), None);
    }

    #[test]
    fn test_new_record_is_unscored() {
        let (_, registry, _) = engine_with_pipe();
        let record = registry.get(EntityKey::Pipe(2)).unwrap();
        assert!(!record.scored);
        assert_eq!(record.kind, EntityKind::Obstacle);
    }

    #[test]
    fn test_despawn_removes_body_too() {
        let (mut engine, mut registry, body) = engine_with_pipe();
        let record = registry.despawn(EntityKey::Pipe(2), &mut engine).unwrap();
        assert_eq!(record.body, body);
        assert!(registry.is_empty());
        assert!(!engine.contains(body));

        assert!(registry.despawn(EntityKey::Pipe(2), &mut engine).is_none());
    }

    #[test]
    fn test_keys_where_allows_removal_during_walk() {
        let mut engine = PhysicsEngine::new(EngineOptions::default());
        let mut registry = Registry::new();
        for n in 1..=4 {
            let body = engine.add(BodyDesc::fixed(Vec2::ZERO, Vec2::ONE));
            registry.insert(EntityKey::Pipe(n), EntityRecord::new(body, EntityKind::Obstacle));
        }

        for key in registry.keys_where(|key, _| key.is_lower_pipe()) {
            registry.despawn(key, &mut engine);
        }

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(EntityKey::Pipe(1)));
        assert!(registry.contains(EntityKey::Pipe(3)));
        assert_eq!(engine.body_count(), 2);
    }

    #[test]
    fn test_despawn_keeps_registry_and_engine_in_step() {
        let mut engine = PhysicsEngine::new(EngineOptions::default());
        let mut registry = Registry::new();
        for n in 1..=6 {
            let body = engine.add(BodyDesc::fixed(Vec2::ZERO, Vec2::ONE));
            registry.insert(EntityKey::Pipe(n), EntityRecord::new(body, EntityKind::Obstacle));
        }

        for key in registry.keys_where(|key, _| key.pipe_index().is_some_and(|n| n <= 4)) {
            registry.despawn(key, &mut engine);
        }

        assert_eq!(registry.len(), engine.body_count());
        assert!(registry.iter().all(|(_, record)| engine.contains(record.body)));
    }

    #[test]
    fn test_for_each_filters() {
        let (_, mut registry, body) = engine_with_pipe();
        registry.insert(EntityKey::Pug, EntityRecord::new(body, EntityKind::Player));

        let mut seen = Vec::new();
        registry.for_each(|_, record| record.kind.is_obstacle(), |key, _| seen.push(*key));
        assert_eq!(seen, vec![EntityKey::Pipe(2)]);
    }
}
