//! # Chunk Generation
//!
//! Produces the voxel contents of one chunk for the active dimension. Each dimension
//! has its own rule set (`overworld`, `nether`, `end`); all of them shape terrain with
//! a `NoiseField` and scatter features (ores, trees, huts, glowstone...) with a
//! per-column random stream.
//!
//! ## Determinism
//!
//! Terrain shape is a pure function of the world column through the noise field.
//! Feature randomness is seeded from (world seed, dimension, column, stream), so by
//! default regenerating a chunk reproduces it exactly. With `reroll_features` the
//! base seed is drawn fresh for every `generate` call instead, so features change on
//! every regeneration.
//!
//! ## Cross-chunk features
//!
//! Trees and huts can reach a few blocks past their origin column. With deterministic
//! seeding the generator also evaluates feature rolls for columns in a margin around
//! the chunk and keeps the voxels that land inside it, so a tree on a chunk border is
//! complete on both sides. The generator never writes a voxel the chunk doesn't own.

use std::sync::Arc;

use cgmath::{Point2, Point3};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use super::block::block_type::BlockType;
use super::chunk::Chunk;
use crate::engine_state::dimension::Dimension;

mod end;
mod nether;
pub mod noise_field;
mod overworld;

pub use noise_field::{ConstantField, NoiseField, PerlinField};

/// Probabilities of every random feature.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureOdds {
    /// Per voxel below y=10.
    pub diamond_ore: f64,
    /// Per voxel below y=15.
    pub iron_ore: f64,
    /// Per voxel below y=20.
    pub coal_ore: f64,
    /// Per overworld column.
    pub tree: f64,
    /// Per overworld column.
    pub hut: f64,
    /// Per nether floor voxel.
    pub soul_sand: f64,
    /// Per nether column.
    pub glowstone: f64,
    /// Per nether column.
    pub magma: f64,
    /// Per outer end island column.
    pub purpur_pillar: f64,
}

impl Default for FeatureOdds {
    fn default() -> Self {
        FeatureOdds {
            diamond_ore: 0.02,
            iron_ore: 0.04,
            coal_ore: 0.08,
            tree: 0.005,
            hut: 0.001,
            soul_sand: 0.1,
            glowstone: 0.02,
            magma: 0.05,
            purpur_pillar: 0.01,
        }
    }
}

impl FeatureOdds {
    /// Every probability zero: pure noise-shaped terrain.
    pub fn none() -> Self {
        FeatureOdds {
            diamond_ore: 0.0,
            iron_ore: 0.0,
            coal_ore: 0.0,
            tree: 0.0,
            hut: 0.0,
            soul_sand: 0.0,
            glowstone: 0.0,
            magma: 0.0,
            purpur_pillar: 0.0,
        }
    }
}

/// Independent random streams drawn for the same column.
#[derive(Copy, Clone, Debug)]
enum Stream {
    Terrain = 1,
    Feature = 2,
}

/// Generates chunks for any dimension.
pub struct ChunkGenerator {
    noise: Arc<dyn NoiseField>,
    seed: u64,
    odds: FeatureOdds,
    reroll_features: bool,
}

impl ChunkGenerator {
    /// A generator shaping terrain with Perlin noise seeded from `seed`.
    pub fn new(seed: u64) -> Self {
        Self::with_noise(Arc::new(PerlinField::new(seed)), seed)
    }

    /// A generator using a caller-supplied noise field.
    pub fn with_noise(noise: Arc<dyn NoiseField>, seed: u64) -> Self {
        ChunkGenerator {
            noise,
            seed,
            odds: FeatureOdds::default(),
            reroll_features: false,
        }
    }

    pub fn with_odds(mut self, odds: FeatureOdds) -> Self {
        self.odds = odds;
        self
    }

    pub fn with_reroll_features(mut self, reroll_features: bool) -> Self {
        self.reroll_features = reroll_features;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn odds(&self) -> &FeatureOdds {
        &self.odds
    }

    /// Builds the full contents of the chunk at `position` in `dimension`.
    ///
    /// Does not touch the world store; the caller decides whether to install the result.
    pub fn generate(&self, position: Point2<i32>, dimension: Dimension) -> Chunk {
        let started = Instant::now();
        let base_seed = if self.reroll_features {
            fastrand::u64(..)
        } else {
            self.seed
        };
        let context = GenerationContext {
            noise: self.noise.as_ref(),
            odds: &self.odds,
            dimension,
            base_seed,
            feature_reach: if self.reroll_features { 0 } else { FEATURE_REACH },
        };

        let mut chunk = Chunk::empty(position);
        match dimension {
            Dimension::Overworld => overworld::generate(&context, &mut chunk),
            Dimension::Nether => nether::generate(&context, &mut chunk),
            Dimension::End => end::generate(&context, &mut chunk),
        }

        log::trace!(
            "Generated {} chunk {:?}: {} voxels in {:?}",
            dimension,
            position,
            chunk.len(),
            started.elapsed()
        );
        chunk
    }
}

/// How far, in columns, a feature can extend from its origin column.
const FEATURE_REACH: i32 = 3;

/// Everything a rule set needs for one `generate` call.
struct GenerationContext<'a> {
    noise: &'a dyn NoiseField,
    odds: &'a FeatureOdds,
    dimension: Dimension,
    base_seed: u64,
    feature_reach: i32,
}

impl GenerationContext<'_> {
    fn sample(&self, x: f64, z: f64) -> f64 {
        self.noise.sample(x, z)
    }

    /// Random stream for one world column.
    fn column_rng(&self, x: i32, z: i32, stream: Stream) -> fastrand::Rng {
        let column = ((x as u32 as u64) << 32) | (z as u32 as u64);
        let mut state = mix(self.base_seed ^ self.dimension.seed_salt());
        state = mix(state ^ column);
        state = mix(state ^ stream as u64);
        fastrand::Rng::with_seed(state)
    }

    /// World columns whose features may reach into `chunk`, in a fixed order.
    fn feature_columns(&self, chunk: &Chunk) -> impl Iterator<Item = (i32, i32)> {
        let (x0, z0) = chunk.origin();
        let reach = self.feature_reach;
        let size = super::chunk::CHUNK_DIMENSION;
        (x0 - reach..x0 + size + reach)
            .flat_map(move |x| (z0 - reach..z0 + size + reach).map(move |z| (x, z)))
    }
}

/// Writes `block_type` if the chunk owns `position`; out-of-chunk feature voxels are
/// produced by the neighbouring chunk instead.
fn place(chunk: &mut Chunk, position: Point3<i32>, block_type: BlockType) {
    if chunk.owns(position) {
        chunk.set(position, block_type);
    }
}

/// SplitMix64 finalizer.
fn mix(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9e37_79b9_7f4a_7c15);
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}

/// Iterates the world columns of a chunk.
fn columns(chunk: &Chunk) -> impl Iterator<Item = (i32, i32)> {
    let (x0, z0) = chunk.origin();
    let size = super::chunk::CHUNK_DIMENSION;
    (0..size).flat_map(move |i| (0..size).map(move |j| (x0 + i, z0 + j)))
}
