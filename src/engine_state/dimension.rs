//! # Dimensions
//!
//! The world exists in exactly one of three dimensions at a time. The active dimension
//! selects the terrain rule set used by the chunk generator, and switching dimension
//! wipes every resident chunk: chunks are never cached per dimension, so returning to a
//! dimension regenerates it from scratch.
//!
//! Transitions are only ever triggered externally, by breaking a portal block.

use std::fmt;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::voxels::world::WorldStore;

/// One of the three generation rule sets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    End,
}

impl Dimension {
    /// All dimensions, in declaration order.
    pub const ALL: [Dimension; 3] = [Dimension::Overworld, Dimension::Nether, Dimension::End];

    /// Lowercase identifier, matching the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Overworld => "overworld",
            Dimension::Nether => "nether",
            Dimension::End => "end",
        }
    }

    /// Small stable index, mixed into feature seeds so the same column rolls
    /// differently in each dimension.
    pub(crate) fn seed_salt(self) -> u64 {
        match self {
            Dimension::Overworld => 0x6f76_6572,
            Dimension::Nether => 0x6e65_7468,
            Dimension::End => 0x656e_6421,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Record of a completed transition, handed to the game-state layer so it can move
/// the player and camera.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DimensionTransition {
    pub from: Dimension,
    pub to: Dimension,
    pub spawn: Point3<f32>,
}

/// Owns the active dimension and performs the clear-and-relocate transition.
///
/// Every transition bumps `epoch`. Background generation requests are tagged with the
/// epoch they were issued under, so results computed for a previous dimension can be
/// recognised and dropped.
#[derive(Debug)]
pub struct DimensionController {
    active: Dimension,
    spawn_point: Point3<f32>,
    epoch: u64,
}

impl DimensionController {
    pub fn new(initial: Dimension, spawn_point: Point3<f32>) -> Self {
        DimensionController {
            active: initial,
            spawn_point,
            epoch: 0,
        }
    }

    pub fn active(&self) -> Dimension {
        self.active
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn spawn_point(&self) -> Point3<f32> {
        self.spawn_point
    }

    /// Switches to `target`, clearing the world store.
    ///
    /// Transitioning to the already-active dimension still clears and relocates; a
    /// portal always resets the world.
    ///
    /// # Returns
    /// The transition record. The caller applies `spawn` to the observer.
    pub fn transition(&mut self, target: Dimension, world: &mut WorldStore) -> DimensionTransition {
        let from = self.active;
        let dropped = world.len();

        self.active = target;
        self.epoch += 1;
        world.clear();

        log::info!(
            "Dimension transition {} -> {} (dropped {} chunks, epoch {})",
            from,
            target,
            dropped,
            self.epoch
        );

        DimensionTransition {
            from,
            to: target,
            spawn: self.spawn_point,
        }
    }
}
