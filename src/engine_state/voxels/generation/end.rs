//! Floating end stone islands: a solid central island and noisy outer islands past a
//! ring of void, with purpur pillars on the far outer islands.

use cgmath::Point3;

use super::{columns, GenerationContext, Stream};
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::Chunk;

const CENTRAL_ISLAND_RADIUS: f64 = 50.0;
const OUTER_ISLANDS_RADIUS: f64 = 100.0;
const PILLAR_RADIUS: f64 = 120.0;
const ISLAND_SCALE: f64 = 0.05;
const ISLAND_THRESHOLD: f64 = 0.4;
const THICKNESS_SCALE: f64 = 0.1;
const THICKNESS_AMPLITUDE: f64 = 5.0;
const ISLAND_TOP: i32 = 20;
const PILLAR_HEIGHT: i32 = 9;

pub(super) fn generate(context: &GenerationContext, chunk: &mut Chunk) {
    for (x, z) in columns(chunk) {
        let center_distance = ((x as f64).powi(2) + (z as f64).powi(2)).sqrt();
        let is_island = center_distance < CENTRAL_ISLAND_RADIUS
            || (center_distance > OUTER_ISLANDS_RADIUS
                && context.sample(x as f64 * ISLAND_SCALE, z as f64 * ISLAND_SCALE)
                    > ISLAND_THRESHOLD);
        if !is_island {
            continue;
        }

        let variation = (context.sample(x as f64 * THICKNESS_SCALE, z as f64 * THICKNESS_SCALE)
            * THICKNESS_AMPLITUDE)
            .floor() as i32;
        // A negative variation leaves the column empty: the island has a hole there.
        for y in ISLAND_TOP - variation..=ISLAND_TOP {
            chunk.set(Point3::new(x, y, z), BlockType::END_STONE);
        }

        if center_distance > PILLAR_RADIUS {
            let mut rng = context.column_rng(x, z, Stream::Feature);
            if rng.f64() < context.odds.purpur_pillar {
                for py in 1..=PILLAR_HEIGHT {
                    chunk.set(Point3::new(x, ISLAND_TOP + py, z), BlockType::PURPUR);
                }
            }
        }
    }
}
