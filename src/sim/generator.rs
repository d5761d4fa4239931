//! Pipe gap generation
//!
//! A pair of pipes plus its gap exactly tiles the playfield height. Only the
//! split between the two segments is random.

use rand::Rng;

use crate::consts::MIN_SEGMENT_HEIGHT;

/// Split `world_height` into two segment heights around a `gap_size` gap.
///
/// The first segment is drawn uniformly from `[100, world_height/2 - 100]`
/// (whole pixels), then the order is swapped half of the time so either pipe
/// can be the tall one. Screens too short for that range collapse it to a
/// single point; the minimum shrinks only if even that cannot fit.
pub fn generate_gap<R: Rng>(rng: &mut R, world_height: f32, gap_size: f32) -> (f32, f32) {
    let free = (world_height - gap_size).max(0.0);
    let min_segment = MIN_SEGMENT_HEIGHT.min(free / 2.0);
    let max_segment = (world_height / 2.0 - MIN_SEGMENT_HEIGHT).min(free - min_segment);

    let first = if max_segment > min_segment {
        let drawn: f32 = rng.random_range(min_segment..=max_segment);
        drawn.floor().max(min_segment)
    } else {
        min_segment
    };
    let second = world_height - first - gap_size;

    if rng.random_bool(0.5) {
        (second, first)
    } else {
        (first, second)
    }
}
