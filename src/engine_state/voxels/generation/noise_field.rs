//! # Noise Fields
//!
//! Smooth 2D scalar fields used to shape terrain heights. Every field is a pure
//! function of its inputs, so terrain shape is reproducible for a given seed.

use noise::{NoiseFn, Perlin};

/// A deterministic, continuous 2D noise function with values in `[-1, 1]`.
pub trait NoiseField: Send + Sync {
    fn sample(&self, x: f64, z: f64) -> f64;
}

/// Perlin noise seeded once per world session.
pub struct PerlinField {
    perlin: Perlin,
}

impl PerlinField {
    pub fn new(seed: u64) -> Self {
        // Perlin takes a 32-bit seed; fold the high half in so both halves matter.
        let folded = (seed ^ (seed >> 32)) as u32;
        PerlinField {
            perlin: Perlin::new(folded),
        }
    }
}

impl NoiseField for PerlinField {
    fn sample(&self, x: f64, z: f64) -> f64 {
        self.perlin.get([x, z]).clamp(-1.0, 1.0)
    }
}

/// A flat field returning the same value everywhere. Handy for pinning terrain
/// heights in tests and tools.
#[derive(Copy, Clone, Debug)]
pub struct ConstantField(pub f64);

impl NoiseField for ConstantField {
    fn sample(&self, _x: f64, _z: f64) -> f64 {
        self.0.clamp(-1.0, 1.0)
    }
}
