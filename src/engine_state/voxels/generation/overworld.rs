//! Rolling grassland over stone with buried ores, scattered trees and the odd hut.

use cgmath::Point3;

use super::{columns, place, GenerationContext, Stream};
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::Chunk;

const HEIGHT_SCALE: f64 = 0.05;
const HEIGHT_AMPLITUDE: f64 = 10.0;
const BASE_HEIGHT: i32 = 15;

const DIAMOND_MAX_Y: i32 = 10;
const IRON_MAX_Y: i32 = 15;
const COAL_MAX_Y: i32 = 20;

const TRUNK_HEIGHT: i32 = 5;
const HUT_SIZE: i32 = 4;
const HUT_WALL_HEIGHT: i32 = 3;

/// Surface height of the world column `(x, z)`.
pub(super) fn surface_height(context: &GenerationContext, x: i32, z: i32) -> i32 {
    let sample = context.sample(x as f64 * HEIGHT_SCALE, z as f64 * HEIGHT_SCALE);
    (sample * HEIGHT_AMPLITUDE).floor() as i32 + BASE_HEIGHT
}

pub(super) fn generate(context: &GenerationContext, chunk: &mut Chunk) {
    let odds = context.odds;

    for (x, z) in columns(chunk) {
        let height = surface_height(context, x, z);
        let mut rng = context.column_rng(x, z, Stream::Terrain);

        for y in 0..=height {
            let mut block_type = if y == height {
                BlockType::GRASS
            } else if y > height - 3 {
                BlockType::DIRT
            } else {
                BlockType::STONE
            };

            if y < DIAMOND_MAX_Y && rng.f64() < odds.diamond_ore {
                block_type = BlockType::DIAMOND_ORE;
            } else if y < IRON_MAX_Y && rng.f64() < odds.iron_ore {
                block_type = BlockType::IRON_ORE;
            } else if y < COAL_MAX_Y && rng.f64() < odds.coal_ore {
                block_type = BlockType::COAL_ORE;
            }

            chunk.set(Point3::new(x, y, z), block_type);
        }

        chunk.set(Point3::new(x, 0, z), BlockType::BEDROCK);
    }

    for (x, z) in context.feature_columns(chunk) {
        let mut rng = context.column_rng(x, z, Stream::Feature);
        let grow_tree = rng.f64() < odds.tree;
        let build_hut = rng.f64() < odds.hut;
        if !grow_tree && !build_hut {
            continue;
        }

        let height = surface_height(context, x, z);
        if grow_tree {
            tree(chunk, x, height, z);
        }
        if build_hut {
            hut(chunk, x, height, z);
        }
    }
}

/// A log trunk with a diamond-shaped three-layer leaf canopy.
fn tree(chunk: &mut Chunk, x: i32, height: i32, z: i32) {
    for ty in 1..=TRUNK_HEIGHT {
        place(chunk, Point3::new(x, height + ty, z), BlockType::LOG);
    }
    for lx in -2..=2i32 {
        for ly in 4..=6 {
            for lz in -2..=2i32 {
                if lx.abs() + lz.abs() < 3 {
                    place(chunk, Point3::new(x + lx, height + ly, z + lz), BlockType::LEAVES);
                }
            }
        }
    }
}

/// Cobblestone walls around a 4x4 footprint under a plank roof.
fn hut(chunk: &mut Chunk, x: i32, height: i32, z: i32) {
    for hx in 0..HUT_SIZE {
        for hz in 0..HUT_SIZE {
            let on_perimeter = hx == 0 || hx == HUT_SIZE - 1 || hz == 0 || hz == HUT_SIZE - 1;
            if on_perimeter {
                for hy in 1..=HUT_WALL_HEIGHT {
                    place(chunk, Point3::new(x + hx, height + hy, z + hz), BlockType::COBBLESTONE);
                }
            }
            place(
                chunk,
                Point3::new(x + hx, height + HUT_WALL_HEIGHT + 1, z + hz),
                BlockType::WOOD,
            );
        }
    }
}
