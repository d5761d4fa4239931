//! World setup
//!
//! A `World` is everything one run needs: the physics engine, the entity
//! registry and the scroll counters. It is never reset in place; a restart
//! builds a new one.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::physics::{Body, BodyDesc, BodyHandle, EngineOptions, PhysicsEngine};
use super::registry::{EntityKey, EntityKind, EntityRecord, Registry};
use crate::config::GameConfig;
use crate::consts::{GROUND_OVERLAP, POSE_COUNT, POSE_FRAMES};

/// Number of ground segments that leapfrog each other
pub const GROUND_SEGMENTS: u8 = 2;

/// One run's simulation state
#[derive(Debug)]
pub struct World {
    pub config: GameConfig,
    pub engine: PhysicsEngine,
    pub registry: Registry,
    /// Player body, created with the world
    pug: BodyHandle,
    /// Frame counter (drives the flap animation only)
    pub tick: u64,
    /// Flap animation pose, 1..=POSE_COUNT
    pub pose: u8,
    /// Last pipe number handed out; the next pair uses +1 and +2
    pub next_pipe_index: u32,
    /// Pipe generation RNG
    pub rng: Pcg32,
    /// Seed this world was built with
    pub seed: u64,
    /// Set by the first flap
    started: bool,
}

impl World {
    /// Build the initial world: pug at screen centre, two ground segments,
    /// no gravity and no pipes until the first flap.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut engine = PhysicsEngine::new(EngineOptions {
            gravity: Vec2::ZERO,
            enable_sleeping: false,
        });
        let mut registry = Registry::new();

        let pug = engine.add(BodyDesc::dynamic(
            config.pug_start(),
            Vec2::new(config.pug_width, config.pug_height),
        ));
        registry.insert(EntityKey::Pug, EntityRecord::new(pug, EntityKind::Player));

        let ground_size = Vec2::new(config.width + GROUND_OVERLAP, config.ground_height);
        let ground_y = config.height - config.ground_height / 2.0;
        let grounds = engine.add_batch((0..GROUND_SEGMENTS).map(|i| {
            let x = config.width / 2.0 + config.width * i as f32;
            BodyDesc::fixed(Vec2::new(x, ground_y), ground_size)
        }));
        for (i, body) in grounds.into_iter().enumerate() {
            registry.insert(
                EntityKey::Ground(i as u8 + 1),
                EntityRecord::new(body, EntityKind::Ground),
            );
        }

        log::info!(
            "World ready: {}x{} screen, seed {}",
            config.width,
            config.height,
            seed
        );

        Self {
            config,
            engine,
            registry,
            pug,
            tick: 0,
            pose: 1,
            next_pipe_index: 0,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            started: false,
        }
    }

    pub fn pug_handle(&self) -> BodyHandle {
        self.pug
    }

    /// The player body. It lives as long as the world.
    pub fn pug(&self) -> Body {
        self.engine
            .body(self.pug)
            .unwrap_or_else(|| unreachable!("pug body is created with the world and never removed"))
    }

    /// Gravity stays off until the first flap
    pub fn is_waiting(&self) -> bool {
        !self.started
    }

    /// Switch gravity on for the run
    pub fn start(&mut self) {
        self.started = true;
        self.engine.set_gravity(Vec2::new(0.0, self.config.gravity));
        log::info!("Run started (seed {})", self.seed);
    }

    /// Position of a registered entity's body
    pub fn position_of(&self, key: EntityKey) -> Option<Vec2> {
        let record = self.registry.get(key)?;
        self.engine.body(record.body).map(|body| body.position)
    }

    /// Number of pipe pairs currently alive
    pub fn pipe_pair_count(&self) -> usize {
        self.registry
            .iter()
            .filter(|(key, _)| key.is_lower_pipe())
            .count()
    }

    /// Advance the frame counter and cycle the flap pose every few frames
    pub fn advance_animation(&mut self) {
        self.tick += 1;
        if self.tick % POSE_FRAMES == 0 {
            self.pose = self.pose % POSE_COUNT + 1;
        }
    }
}
