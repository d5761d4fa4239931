//! Pipe pair factory
//!
//! Layout of one pair (screen space, y grows downward):
//!
//! ```text
//!   y = 0            ┌──┐  upper shaft
//!                  ┌─┴──┴─┐ upper cap
//!                      gap
//!                  ┌─┬──┬─┐ lower cap
//!                    │  │  lower shaft
//!   y = playfield  ══╧══╧══ ground
//! ```

use glam::Vec2;

use super::generator::generate_gap;
use super::physics::BodyDesc;
use super::registry::{EntityKey, EntityKind, EntityRecord};
use super::world::World;
use crate::config::GameConfig;

/// One body of a pipe pair, ready to be created
#[derive(Debug, Clone, Copy)]
pub struct PipePart {
    pub key: EntityKey,
    pub kind: EntityKind,
    pub desc: BodyDesc,
}

/// Lay out a pair at `x` whose segments are `upper` and `lower` tall.
///
/// `first_index` is the upper pipe's number; the lower pipe takes the next one.
pub fn pair_layout(config: &GameConfig, x: f32, upper: f32, lower: f32, first_index: u32) -> Vec<PipePart> {
    let floor = config.playfield_height();
    let shaft_width = config.pipe_width;
    let (upper_key, lower_key) = (first_index, first_index + 1);
    let mut parts = Vec::with_capacity(4);

    let (cap_width, cap_height) = if config.pipe_caps {
        config.pipe_cap_size()
    } else {
        (0.0, 0.0)
    };
    // Caps shrink rather than eat into the gap on very short segments
    let upper_cap = cap_height.min(upper);
    let lower_cap = cap_height.min(lower);
    let upper_shaft = upper - upper_cap;
    let lower_shaft = lower - lower_cap;

    parts.push(PipePart {
        key: EntityKey::Pipe(upper_key),
        kind: EntityKind::Obstacle,
        desc: BodyDesc::fixed(
            Vec2::new(x, upper_shaft / 2.0),
            Vec2::new(shaft_width, upper_shaft),
        ),
    });
    parts.push(PipePart {
        key: EntityKey::Pipe(lower_key),
        kind: EntityKind::Obstacle,
        desc: BodyDesc::fixed(
            Vec2::new(x, floor - lower_shaft / 2.0),
            Vec2::new(shaft_width, lower_shaft),
        ),
    });

    if config.pipe_caps {
        parts.push(PipePart {
            key: EntityKey::PipeCap(upper_key),
            kind: EntityKind::ObstacleCap,
            desc: BodyDesc::fixed(
                Vec2::new(x, upper_shaft + upper_cap / 2.0),
                Vec2::new(cap_width, upper_cap),
            ),
        });
        parts.push(PipePart {
            key: EntityKey::PipeCap(lower_key),
            kind: EntityKind::ObstacleCap,
            desc: BodyDesc::fixed(
                Vec2::new(x, floor - lower_shaft - lower_cap / 2.0),
                Vec2::new(cap_width, lower_cap),
            ),
        });
    }

    parts
}

/// Generate a new pair at `x`, add its bodies to the engine in one batch and
/// register them. Returns the lower pipe's key.
pub fn spawn_pair(world: &mut World, x: f32) -> EntityKey {
    let (upper, lower) = generate_gap(
        &mut world.rng,
        world.config.playfield_height(),
        world.config.gap_size,
    );

    let first_index = world.next_pipe_index + 1;
    world.next_pipe_index += 2;

    let parts = pair_layout(&world.config, x, upper, lower, first_index);
    let bodies = world.engine.add_batch(parts.iter().map(|part| part.desc));
    for (part, body) in parts.iter().zip(bodies) {
        world.registry.insert(part.key, EntityRecord::new(body, part.kind));
    }

    log::debug!(
        "Spawned pipes {} and {} at x={} (heights {} / {})",
        first_index,
        first_index + 1,
        x,
        upper,
        lower
    );

    EntityKey::Pipe(first_index + 1)
}

/// Remove both pipes of the pair whose lower pipe is `lower_index`, caps included
pub fn despawn_pair(world: &mut World, lower_index: u32) {
    let upper_index = lower_index - 1;
    for key in [
        EntityKey::Pipe(upper_index),
        EntityKey::PipeCap(upper_index),
        EntityKey::Pipe(lower_index),
        EntityKey::PipeCap(lower_index),
    ] {
        world.registry.despawn(key, &mut world.engine);
    }
    log::debug!("Recycled pipes {upper_index} and {lower_index}");
}
