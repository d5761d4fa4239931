//! Session state machine
//!
//! Owns the current `World`, the phase and the score. The tick reports what
//! happened through [`GameEvent`]s; only the session turns those into state
//! changes.

use serde::{Deserialize, Serialize};

use super::tick::{TickInput, tick};
use super::world::World;
use crate::config::GameConfig;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation ticking (including the pre-flap wait)
    Running,
    /// Pug crashed; ticks are frozen until restart
    GameOver,
}

/// Outcome reported by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Pug passed a pipe pair
    Score,
    /// Pug touched a pipe or the ground
    GameOver,
}

/// A play session: one live world at a time plus score keeping
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    world: World,
    phase: GamePhase,
    score: u32,
    /// Best score since the process started
    best_score: u32,
    /// Number of restarts so far (varies the pipe seed per run)
    restarts: u64,
    /// Events produced by the last tick, drained after it returns
    queue: Vec<GameEvent>,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        let world = World::new(config.clone(), config.seed);
        Self {
            config,
            world,
            phase: GamePhase::Running,
            score: 0,
            best_score: 0,
            restarts: 0,
            queue: Vec::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Run one frame. Returns the events that changed session state.
    ///
    /// Does nothing once the game is over.
    pub fn advance(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        if self.phase != GamePhase::Running {
            return Vec::new();
        }

        tick(&mut self.world, input, dt, &mut self.queue);

        let queued = std::mem::take(&mut self.queue);
        queued
            .into_iter()
            .filter(|event| self.handle_event(*event))
            .collect()
    }

    /// Apply one event. Returns false if it was ignored (late or duplicate).
    pub fn handle_event(&mut self, event: GameEvent) -> bool {
        match (self.phase, event) {
            (GamePhase::Running, GameEvent::Score) => {
                self.score += 1;
                self.best_score = self.best_score.max(self.score);
                true
            }
            (GamePhase::Running, GameEvent::GameOver) => {
                self.phase = GamePhase::GameOver;
                log::info!(
                    "Game over at tick {} with score {} (best {})",
                    self.world.tick,
                    self.score,
                    self.best_score
                );
                true
            }
            (GamePhase::GameOver, _) => {
                log::debug!("Ignoring {event:?} after game over");
                false
            }
        }
    }

    /// Tear the world down and start over. Only valid after game over.
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            log::warn!("Restart requested while running, ignoring");
            return false;
        }

        self.restarts += 1;
        let seed = self.config.seed.wrapping_add(self.restarts);
        self.world = World::new(self.config.clone(), seed);
        self.phase = GamePhase::Running;
        self.score = 0;
        self.queue.clear();

        log::info!("Restarted (run {})", self.restarts + 1);
        true
    }
}
