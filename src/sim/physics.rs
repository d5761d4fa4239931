//! rapier2d adapter
//!
//! The game only needs a narrow slice of a physics engine: unrotated
//! rectangles, gravity, direct velocity/force control and a notification when
//! two bodies start touching. This module wraps rapier2d behind that contract
//! in `glam` types, with its own ordered [`BodyHandle`]s so iteration and event
//! order stay deterministic.
//!
//! rapier2d is compiled with `enhanced-determinism`; with a fixed timestep the
//! same seed replays the same run on the same platform.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;

/// Collider density (mass per square pixel)
pub const DENSITY: f32 = 0.001;
/// Pixels per rapier length unit, scales the solver's internal tolerances
const LENGTH_UNIT: f32 = 100.0;

fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Stable handle to a body owned by [`PhysicsEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(u32);

impl BodyHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// How the engine treats a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Collides but only moves through explicit translate/set_position calls
    Static,
    /// Moved by gravity, velocity and forces
    Dynamic,
}

/// Description of a rectangle to create
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub size: Vec2,
}

impl BodyDesc {
    pub fn fixed(position: Vec2, size: Vec2) -> Self {
        Self {
            kind: BodyKind::Static,
            position,
            size,
        }
    }

    pub fn dynamic(position: Vec2, size: Vec2) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position,
            size,
        }
    }
}

/// A body's state as of the last read (position is the centre)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub handle: BodyHandle,
    pub kind: BodyKind,
    pub position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    mass: f32,
    sleeping: bool,
}

impl Body {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, self.size)
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }
}

/// Engine construction options
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub gravity: Vec2,
    /// Let resting dynamic bodies fall asleep until disturbed
    pub enable_sleeping: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            gravity: Vec2::ZERO,
            enable_sleeping: false,
        }
    }
}

/// Two bodies that started touching during a step (ordered `a < b`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionStart {
    pub a: BodyHandle,
    pub b: BodyHandle,
}

impl CollisionStart {
    fn new(x: BodyHandle, y: BodyHandle) -> Self {
        if x < y { Self { a: x, b: y } } else { Self { a: y, b: x } }
    }

    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.a == handle || self.b == handle
    }
}

/// What the adapter remembers about each rapier body
#[derive(Debug, Clone, Copy)]
struct Slot {
    rigid_body: RigidBodyHandle,
    kind: BodyKind,
    size: Vec2,
}

/// The physics world
pub struct PhysicsEngine {
    gravity: Vector<Real>,
    enable_sleeping: bool,
    pipeline: PhysicsPipeline,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Ordered by handle for deterministic iteration
    slots: BTreeMap<BodyHandle, Slot>,
    /// Collision-start events not yet drained
    pending: Vec<CollisionStart>,
    next_handle: u32,
}

impl fmt::Debug for PhysicsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsEngine")
            .field("gravity", &self.gravity())
            .field("bodies", &self.slots.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl PhysicsEngine {
    pub fn new(options: EngineOptions) -> Self {
        let integration_params = IntegrationParameters {
            length_unit: LENGTH_UNIT,
            ..IntegrationParameters::default()
        };

        Self {
            gravity: to_vector(options.gravity),
            enable_sleeping: options.enable_sleeping,
            pipeline: PhysicsPipeline::new(),
            integration_params,
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            slots: BTreeMap::new(),
            pending: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        to_vec2(&self.gravity)
    }

    /// Change gravity and wake every body so resting ones feel it
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = to_vector(gravity);
        for (_, rb) in self.rigid_body_set.iter_mut() {
            rb.wake_up(true);
        }
    }

    pub fn body_count(&self) -> usize {
        self.slots.len()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.slots.contains_key(&handle)
    }

    /// Current state of a body
    pub fn body(&self, handle: BodyHandle) -> Option<Body> {
        let slot = self.slots.get(&handle)?;
        self.read_body(handle, slot)
    }

    pub fn bodies(&self) -> impl Iterator<Item = Body> + '_ {
        self.slots
            .iter()
            .filter_map(|(handle, slot)| self.read_body(*handle, slot))
    }

    /// Create a body and add it to the world
    pub fn add(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;

        let builder = match desc.kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .lock_rotations()
                .can_sleep(self.enable_sleeping),
        };
        let rb = builder
            .translation(to_vector(desc.position))
            .user_data(handle.0 as u128)
            .build();
        let rigid_body = self.rigid_body_set.insert(rb);

        let collider = ColliderBuilder::cuboid(desc.size.x / 2.0, desc.size.y / 2.0)
            .density(DENSITY)
            .friction(0.0)
            .restitution(0.0)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.collider_set
            .insert_with_parent(collider, rigid_body, &mut self.rigid_body_set);

        self.slots.insert(
            handle,
            Slot {
                rigid_body,
                kind: desc.kind,
                size: desc.size,
            },
        );
        handle
    }

    /// Add several bodies at once, handles returned in input order
    pub fn add_batch(&mut self, descs: impl IntoIterator<Item = BodyDesc>) -> Vec<BodyHandle> {
        descs.into_iter().map(|desc| self.add(desc)).collect()
    }

    /// Remove a body and its collider, dropping any undrained contact it was part of
    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        let slot = self.slots.remove(&handle)?;
        let body = self.read_body(handle, &slot);
        self.rigid_body_set.remove(
            slot.rigid_body,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        self.pending.retain(|pair| !pair.involves(handle));
        body
    }

    /// Move a body by `delta` without touching its velocity
    pub fn translate(&mut self, handle: BodyHandle, delta: Vec2) -> bool {
        self.with_rigid_body(handle, |rb, _| {
            let translation = rb.translation() + to_vector(delta);
            rb.set_translation(translation, true);
        })
    }

    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) -> bool {
        self.with_rigid_body(handle, |rb, _| rb.set_translation(to_vector(position), true))
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> bool {
        self.with_rigid_body(handle, |rb, kind| {
            if kind == BodyKind::Dynamic {
                rb.set_linvel(to_vector(velocity), true);
            }
        })
    }

    /// Queue a force, consumed by the next step
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec2) -> bool {
        self.with_rigid_body(handle, |rb, kind| {
            if kind == BodyKind::Dynamic {
                rb.add_force(to_vector(force), true);
            }
        })
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_params.dt = dt;

        let (collision_send, collision_recv) = rapier2d::crossbeam::channel::unbounded();
        let (force_send, _force_recv) = rapier2d::crossbeam::channel::unbounded();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        // Forces only last one step
        for slot in self.slots.values() {
            if slot.kind == BodyKind::Dynamic {
                if let Some(rb) = self.rigid_body_set.get_mut(slot.rigid_body) {
                    rb.reset_forces(false);
                }
            }
        }

        let mut started = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            if let CollisionEvent::Started(h1, h2, _) = event {
                if let (Some(a), Some(b)) = (self.collider_owner(h1), self.collider_owner(h2)) {
                    started.push(CollisionStart::new(a, b));
                }
            }
        }
        // Channel delivery order is not stable
        started.sort();
        started.dedup();
        self.pending.extend(started);
    }

    /// Take the collision-start events produced since the last drain
    pub fn drain_collisions(&mut self) -> Vec<CollisionStart> {
        std::mem::take(&mut self.pending)
    }

    fn read_body(&self, handle: BodyHandle, slot: &Slot) -> Option<Body> {
        let rb = self.rigid_body_set.get(slot.rigid_body)?;
        Some(Body {
            handle,
            kind: slot.kind,
            position: to_vec2(rb.translation()),
            size: slot.size,
            velocity: to_vec2(rb.linvel()),
            mass: rb.mass(),
            sleeping: rb.is_sleeping(),
        })
    }

    fn with_rigid_body(&mut self, handle: BodyHandle, f: impl FnOnce(&mut RigidBody, BodyKind)) -> bool {
        let rb = self
            .slots
            .get(&handle)
            .and_then(|slot| Some((self.rigid_body_set.get_mut(slot.rigid_body)?, slot.kind)));
        match rb {
            Some((rb, kind)) => {
                f(rb, kind);
                true
            }
            None => {
                debug_assert!(false, "body {handle:?} is not in the physics world");
                false
            }
        }
    }

    fn collider_owner(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        let parent = self.collider_set.get(collider)?.parent()?;
        let rb = self.rigid_body_set.get(parent)?;
        let handle = BodyHandle(u32::try_from(rb.user_data).ok()?);
        self.slots.contains_key(&handle).then_some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn falling_world() -> (PhysicsEngine, BodyHandle, BodyHandle) {
        let mut engine = PhysicsEngine::new(EngineOptions {
            gravity: Vec2::new(0.0, 1200.0),
            enable_sleeping: false,
        });
        let pug = engine.add(BodyDesc::dynamic(Vec2::new(200.0, 400.0), Vec2::new(50.0, 41.0)));
        let ground = engine.add(BodyDesc::fixed(Vec2::new(200.0, 775.0), Vec2::new(404.0, 50.0)));
        (engine, pug, ground)
    }

    #[test]
    fn test_add_and_remove() {
        let (mut engine, pug, ground) = falling_world();
        assert_eq!(engine.body_count(), 2);
        assert!(engine.body(pug).unwrap().mass() > 0.0);

        let removed = engine.remove(ground).unwrap();
        assert_eq!(removed.position, Vec2::new(200.0, 775.0));
        assert_eq!(removed.size, Vec2::new(404.0, 50.0));
        assert_eq!(engine.body_count(), 1);
        assert!(!engine.contains(ground));
        assert!(engine.remove(ground).is_none());
    }

    #[test]
    fn test_batch_handles_in_order() {
        let mut engine = PhysicsEngine::new(EngineOptions::default());
        let handles = engine.add_batch((0..4).map(|i| BodyDesc::fixed(Vec2::new(i as f32 * 10.0, 0.0), Vec2::ONE)));
        assert_eq!(handles.len(), 4);
        assert!(handles.windows(2).all(|w| w[0] < w[1]));
        let xs: Vec<f32> = engine.bodies().map(|b| b.position.x).collect();
        assert_eq!(xs, vec![0.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_gravity_pulls_dynamic_body_down() {
        let (mut engine, pug, _) = falling_world();
        engine.step(DT);
        let body = engine.body(pug).unwrap();
        assert!((body.velocity.y - 1200.0 * DT).abs() < 1e-3);
        assert!(body.position.y > 400.0);
        assert!(body.position.y <= 400.0 + 1200.0 * DT * DT + 1e-3);
        assert_eq!(body.position.x, 200.0);
    }

    #[test]
    fn test_static_bodies_ignore_gravity() {
        let (mut engine, _, ground) = falling_world();
        for _ in 0..10 {
            engine.step(DT);
        }
        assert_eq!(engine.body(ground).unwrap().position, Vec2::new(200.0, 775.0));
    }

    #[test]
    fn test_translate_and_set_position_move_static_bodies() {
        let (mut engine, _, ground) = falling_world();
        assert!(engine.translate(ground, Vec2::new(-2.0, 0.0)));
        engine.step(DT);
        assert_eq!(engine.body(ground).unwrap().position, Vec2::new(198.0, 775.0));

        assert!(engine.set_position(ground, Vec2::new(600.0, 775.0)));
        assert_eq!(engine.body(ground).unwrap().position, Vec2::new(600.0, 775.0));
    }

    #[test]
    fn test_landing_reports_one_collision_start() {
        let (mut engine, pug, ground) = falling_world();

        let mut starts = Vec::new();
        for _ in 0..120 {
            engine.step(DT);
            starts.extend(engine.drain_collisions());
        }

        assert_eq!(starts, vec![CollisionStart::new(pug, ground)]);
        assert!(starts[0].involves(pug));
    }

    #[test]
    fn test_static_pairs_never_collide() {
        let mut engine = PhysicsEngine::new(EngineOptions::default());
        engine.add(BodyDesc::fixed(Vec2::ZERO, Vec2::splat(10.0)));
        engine.add(BodyDesc::fixed(Vec2::ZERO, Vec2::splat(10.0)));
        engine.step(DT);
        assert!(engine.drain_collisions().is_empty());
    }

    #[test]
    fn test_translated_static_body_hits_resting_pug() {
        let mut engine = PhysicsEngine::new(EngineOptions::default());
        let pug = engine.add(BodyDesc::dynamic(Vec2::new(200.0, 400.0), Vec2::new(50.0, 41.0)));
        let pipe = engine.add(BodyDesc::fixed(Vec2::new(285.0, 400.0), Vec2::new(100.0, 300.0)));

        engine.step(DT);
        assert!(engine.drain_collisions().is_empty());

        // Left face of the pipe moves from 235 to 220, past the pug's right edge at 225
        engine.translate(pipe, Vec2::new(-15.0, 0.0));
        engine.step(DT);
        assert_eq!(engine.drain_collisions(), vec![CollisionStart::new(pug, pipe)]);
    }

    #[test]
    fn test_remove_drops_pending_contacts() {
        let mut engine = PhysicsEngine::new(EngineOptions::default());
        engine.add(BodyDesc::dynamic(Vec2::ZERO, Vec2::splat(10.0)));
        let wall = engine.add(BodyDesc::fixed(Vec2::ZERO, Vec2::splat(10.0)));
        engine.step(DT);

        assert!(engine.remove(wall).is_some());
        assert!(engine.drain_collisions().is_empty());
    }

    #[test]
    fn test_set_velocity_keeps_static_still() {
        let mut engine = PhysicsEngine::new(EngineOptions::default());
        let wall = engine.add(BodyDesc::fixed(Vec2::ZERO, Vec2::splat(10.0)));
        assert!(engine.set_velocity(wall, Vec2::new(5.0, 5.0)));
        engine.step(DT);
        assert_eq!(engine.body(wall).unwrap().position, Vec2::ZERO);
        assert_eq!(engine.body(wall).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_apply_force_is_consumed_by_one_step() {
        let mut engine = PhysicsEngine::new(EngineOptions::default());
        let body = engine.add(BodyDesc::dynamic(Vec2::ZERO, Vec2::new(10.0, 10.0)));

        engine.apply_force(body, Vec2::new(0.0, -1.0));
        engine.step(DT);
        let after_push = engine.body(body).unwrap().velocity;
        assert!(after_push.y < 0.0);
        assert_eq!(after_push.x, 0.0);

        engine.step(DT);
        let coasting = engine.body(body).unwrap().velocity;
        assert!((coasting.y - after_push.y).abs() < 1e-5);
    }

    #[test]
    fn test_sleeping_body_wakes_on_velocity_change() {
        let mut engine = PhysicsEngine::new(EngineOptions {
            gravity: Vec2::ZERO,
            enable_sleeping: true,
        });
        let body = engine.add(BodyDesc::dynamic(Vec2::ZERO, Vec2::splat(10.0)));
        for _ in 0..300 {
            engine.step(DT);
        }
        assert!(engine.body(body).unwrap().is_sleeping());

        engine.set_velocity(body, Vec2::new(0.0, -60.0));
        assert!(!engine.body(body).unwrap().is_sleeping());
        engine.step(DT);
        assert!((engine.body(body).unwrap().position.y + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_sleeping_disabled_keeps_body_awake() {
        let mut engine = PhysicsEngine::new(EngineOptions::default());
        let body = engine.add(BodyDesc::dynamic(Vec2::ZERO, Vec2::splat(10.0)));
        for _ in 0..300 {
            engine.step(DT);
        }
        assert!(!engine.body(body).unwrap().is_sleeping());
    }
}
