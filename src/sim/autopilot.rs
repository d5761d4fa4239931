//! Demo/idle autopilot
//!
//! Flaps whenever the pug sinks below the centre of the next gap. Used by the
//! headless runner and for attract-mode style demos.

use super::registry::EntityKey;
use super::tick::TickInput;
use super::world::World;

/// How far below the gap centre the pug may sink before flapping
const AIM_BELOW: f32 = 20.0;
/// Don't flap again while still rising faster than this (pixels/s, negative is up)
const MIN_REFLAP_VELOCITY: f32 = -100.0;

/// Centre of the gap the pug has to fly through next
pub fn next_gap_center(world: &World) -> Option<f32> {
    let pug_left = world.pug().bounds().min.x;

    world
        .registry
        .iter()
        .filter(|(key, _)| key.is_lower_pipe())
        .filter_map(|(key, _)| {
            let index = key.pipe_index()?;
            let parts = [EntityKey::Pipe(index), EntityKey::PipeCap(index)];
            let (right, top) = parts
                .iter()
                .filter_map(|part| world.registry.get(*part))
                .filter_map(|record| world.engine.body(record.body))
                .map(|body| body.bounds())
                .fold((f32::MIN, f32::MAX), |(right, top), b| (right.max(b.max.x), top.min(b.min.y)));
            (right >= pug_left).then_some((right, top))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, gap_bottom)| gap_bottom - world.config.gap_size / 2.0)
}

/// Decide this frame's input
pub fn autopilot(world: &World) -> TickInput {
    if world.is_waiting() {
        return TickInput::press();
    }

    let target = next_gap_center(world).unwrap_or(world.config.playfield_height() / 2.0);
    let pug = world.pug();

    if pug.position.y > target + AIM_BELOW && pug.velocity.y > MIN_REFLAP_VELOCITY {
        TickInput::press()
    } else {
        TickInput::default()
    }
}
