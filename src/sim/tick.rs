//! Fixed timestep simulation tick
//!
//! One call per rendered frame. Gameplay outcomes are pushed to an event
//! queue; the tick never touches session state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::registry::EntityKind;
use super::spawn::{despawn_pair, spawn_pair};
use super::state::GameEvent;
use super::world::World;

/// Screens ahead of the left edge where the two opening pairs appear
const OPENING_PAIR_SLOTS: [u32; 2] = [2, 3];
/// Screens ahead where recycled pairs reappear
const RECYCLE_SLOT: u32 = 2;

/// A discrete input event from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Press,
    Release,
}

/// Input gathered for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub events: Vec<InputEvent>,
}

impl TickInput {
    /// A frame with a single press
    pub fn press() -> Self {
        Self {
            events: vec![InputEvent::Press],
        }
    }

    /// Any number of presses in one frame count as one flap
    pub fn has_press(&self) -> bool {
        self.events.contains(&InputEvent::Press)
    }
}

/// Advance the world by one frame
pub fn tick(world: &mut World, input: &TickInput, dt: f32, events: &mut Vec<GameEvent>) {
    if input.has_press() {
        flap(world);
    }

    scroll_pipes(world, events);
    scroll_ground(world);

    world.engine.step(dt);
    let pug = world.pug_handle();
    for contact in world.engine.drain_collisions() {
        if contact.involves(pug) {
            events.push(GameEvent::GameOver);
        }
    }

    world.advance_animation();
}

/// First flap of a world starts gravity and brings in the opening pipes
fn flap(world: &mut World) {
    if world.is_waiting() {
        world.start();
        for slot in OPENING_PAIR_SLOTS {
            let x = world.config.pipe_spawn_x(slot);
            spawn_pair(world, x);
        }
    }

    let pug = world.pug_handle();
    let velocity = Vec2::new(world.pug().velocity.x, world.config.flap_velocity);
    world.engine.set_velocity(pug, velocity);
}

/// Move every pipe left; lower pipes also handle scoring and recycling.
///
/// Keys are collected up front and recycling is applied after the walk.
fn scroll_pipes(world: &mut World, events: &mut Vec<GameEvent>) {
    let shift = Vec2::new(-world.config.scroll_speed, 0.0);
    let pug_x = world.pug().position.x;
    let despawn_x = world.config.pipe_despawn_x();

    let pipes = world.registry.keys_where(|_, record| record.kind.is_obstacle());
    let mut recycled = Vec::new();

    for key in pipes {
        let Some(record) = world.registry.get_mut(key) else {
            continue;
        };
        world.engine.translate(record.body, shift);

        if !key.is_lower_pipe() {
            continue;
        }
        let Some(x) = world.engine.body(record.body).map(|body| body.position.x) else {
            continue;
        };

        if x < pug_x && !record.scored {
            record.scored = true;
            events.push(GameEvent::Score);
        }

        if x <= despawn_x {
            if let Some(index) = key.pipe_index() {
                recycled.push(index);
            }
        }
    }

    for lower_index in recycled {
        let x = world.config.pipe_spawn_x(RECYCLE_SLOT);
        spawn_pair(world, x);
        despawn_pair(world, lower_index);
    }
}

/// Leapfrog the two ground segments for an endless floor
fn scroll_ground(world: &mut World) {
    let width = world.config.width;
    let shift = Vec2::new(-world.config.scroll_speed, 0.0);
    let grounds = world
        .registry
        .keys_where(|_, record| record.kind == EntityKind::Ground);

    for key in grounds {
        let Some(record) = world.registry.get(key) else {
            continue;
        };
        let Some(position) = world.engine.body(record.body).map(|body| body.position) else {
            continue;
        };

        if position.x <= -width / 2.0 {
            world
                .engine
                .set_position(record.body, Vec2::new(width + width / 2.0, position.y));
        } else {
            world.engine.translate(record.body, shift);
        }
    }
}
