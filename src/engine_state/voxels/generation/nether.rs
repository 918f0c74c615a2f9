//! A netherrack cavern: a noisy floor and a noisy ceiling with glowstone and magma
//! scattered over the floor.

use cgmath::Point3;

use super::{columns, GenerationContext, Stream};
use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::chunk::Chunk;

const NOISE_SCALE: f64 = 0.1;
const CEILING_NOISE_OFFSET: f64 = 100.0;
const AMPLITUDE: f64 = 8.0;
const FLOOR_BASE: i32 = 5;
const CEILING_TOP: i32 = 40;

pub(super) fn generate(context: &GenerationContext, chunk: &mut Chunk) {
    let odds = context.odds;

    for (x, z) in columns(chunk) {
        let sx = x as f64 * NOISE_SCALE;
        let sz = z as f64 * NOISE_SCALE;
        let floor = (context.sample(sx, sz) * AMPLITUDE).floor() as i32 + FLOOR_BASE;
        let ceiling = CEILING_TOP
            - (context.sample(sx + CEILING_NOISE_OFFSET, sz + CEILING_NOISE_OFFSET) * AMPLITUDE)
                .floor() as i32;
        let mut rng = context.column_rng(x, z, Stream::Terrain);

        for y in 0..=floor {
            let block_type = if rng.f64() < odds.soul_sand {
                BlockType::SOUL_SAND
            } else {
                BlockType::NETHERRACK
            };
            chunk.set(Point3::new(x, y, z), block_type);
        }
        for y in ceiling..=CEILING_TOP {
            chunk.set(Point3::new(x, y, z), BlockType::NETHERRACK);
        }

        if rng.f64() < odds.glowstone {
            chunk.set(Point3::new(x, floor + 1, z), BlockType::GLOWSTONE);
        }
        if rng.f64() < odds.magma {
            chunk.set(Point3::new(x, floor, z), BlockType::MAGMA);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cgmath::Point2;

    use super::*;
    use crate::engine_state::dimension::Dimension;
    use crate::engine_state::voxels::generation::{ChunkGenerator, ConstantField, FeatureOdds};

    #[test]
    fn flat_cavern_has_floor_and_ceiling() {
        let generator =
            ChunkGenerator::with_noise(Arc::new(ConstantField(0.0)), 8).with_odds(FeatureOdds::none());
        let chunk = generator.generate(Point2::new(2, 2), Dimension::Nether);

        for y in 0..=5 {
            assert_eq!(chunk.get(Point3::new(32, y, 32)), Some(BlockType::NETHERRACK));
        }
        assert_eq!(chunk.get(Point3::new(32, 6, 32)), None);
        assert_eq!(chunk.get(Point3::new(32, 39, 32)), None);
        assert_eq!(chunk.get(Point3::new(32, 40, 32)), Some(BlockType::NETHERRACK));
        assert_eq!(chunk.len(), 16 * 16 * 7);
    }

    #[test]
    fn high_noise_raises_floor_and_lowers_ceiling() {
        let generator =
            ChunkGenerator::with_noise(Arc::new(ConstantField(0.5)), 8).with_odds(FeatureOdds::none());
        let chunk = generator.generate(Point2::new(0, 0), Dimension::Nether);

        // floor = 4 + 5, ceiling = 40 - 4
        assert_eq!(chunk.get(Point3::new(1, 9, 1)), Some(BlockType::NETHERRACK));
        assert_eq!(chunk.get(Point3::new(1, 10, 1)), None);
        assert_eq!(chunk.get(Point3::new(1, 35, 1)), None);
        assert_eq!(chunk.get(Point3::new(1, 36, 1)), Some(BlockType::NETHERRACK));
    }

    #[test]
    fn certain_features_cover_the_floor() {
        let odds = FeatureOdds {
            soul_sand: 1.0,
            glowstone: 1.0,
            magma: 1.0,
            ..FeatureOdds::none()
        };
        let generator = ChunkGenerator::with_noise(Arc::new(ConstantField(0.0)), 8).with_odds(odds);
        let chunk = generator.generate(Point2::new(0, 0), Dimension::Nether);

        assert_eq!(chunk.get(Point3::new(4, 0, 4)), Some(BlockType::SOUL_SAND));
        assert_eq!(chunk.get(Point3::new(4, 5, 4)), Some(BlockType::MAGMA));
        assert_eq!(chunk.get(Point3::new(4, 6, 4)), Some(BlockType::GLOWSTONE));
        assert_eq!(chunk.get(Point3::new(4, 40, 4)), Some(BlockType::NETHERRACK));
    }
}
