//! # Block Mutation
//!
//! Applies a single player interaction (break or place) to the world store.
//!
//! Breaking edits the chunk that owns the clicked voxel. Placing targets the voxel in
//! front of the clicked face, which can belong to a neighbouring chunk; the edit is
//! routed to that chunk, created as a placeholder if it is not resident, and the
//! clicked chunk is left untouched. The placeholder gets its terrain once streaming
//! reaches it.
//!
//! Nothing here fails. Inputs that cannot be applied come back as
//! `InteractionOutcome::Ignored` with the reason.

use cgmath::{Point2, Point3, Vector3};

use super::block::block_side::round_normal;
use super::block::block_type::BlockType;
use super::chunk::chunk_position_of;
use super::world::WorldStore;
use crate::engine_state::dimension::Dimension;

/// What the player did to the clicked voxel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InteractionAction {
    Remove,
    Add,
}

/// Why an interaction changed nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The clicked voxel's chunk is not loaded.
    ChunkNotResident,
    /// Nothing to break at the clicked voxel.
    EmptyVoxel,
    /// A placement without the clicked face's normal.
    MissingFaceNormal,
    /// A placement with an empty hand.
    NoItemSelected,
    /// The selected item is food or a tool.
    NonPlaceable,
    /// The placement target lies outside the addressable world.
    OutOfWorld,
}

/// Result of one interaction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InteractionOutcome {
    Removed {
        position: Point3<i32>,
        block: BlockType,
        /// Set when the removed block was a portal; the caller must transition.
        portal: Option<Dimension>,
    },
    Placed {
        position: Point3<i32>,
        block: BlockType,
        chunk: Point2<i32>,
    },
    Ignored(IgnoreReason),
}

impl InteractionOutcome {
    /// Destination dimension if this interaction broke a portal.
    pub fn portal(&self) -> Option<Dimension> {
        match self {
            InteractionOutcome::Removed { portal, .. } => *portal,
            _ => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, InteractionOutcome::Ignored(_))
    }
}

/// Applies `action` at `position`.
///
/// # Arguments
/// * `world` - The store to edit
/// * `position` - The clicked voxel
/// * `action` - Break or place
/// * `face_normal` - Normal of the clicked face, required to place
/// * `selected_item` - The active inventory item, required to place
pub fn interact(
    world: &mut WorldStore,
    position: Point3<i32>,
    action: InteractionAction,
    face_normal: Option<Vector3<f32>>,
    selected_item: Option<BlockType>,
) -> InteractionOutcome {
    let source_chunk = chunk_position_of(position);
    if !world.contains(source_chunk) {
        return ignore(position, IgnoreReason::ChunkNotResident);
    }

    match action {
        InteractionAction::Remove => remove(world, position, source_chunk),
        InteractionAction::Add => {
            let Some(face_normal) = face_normal else {
                return ignore(position, IgnoreReason::MissingFaceNormal);
            };
            let Some(block) = selected_item else {
                return ignore(position, IgnoreReason::NoItemSelected);
            };
            if !block.is_placeable() {
                return ignore(position, IgnoreReason::NonPlaceable);
            }
            match offset(position, round_normal(face_normal)) {
                Some(target) => add(world, target, block),
                None => ignore(position, IgnoreReason::OutOfWorld),
            }
        }
    }
}

fn remove(world: &mut WorldStore, position: Point3<i32>, chunk: Point2<i32>) -> InteractionOutcome {
    // The chunk is known to be resident, so only the inner option can be empty.
    match world.edit(chunk, |chunk| chunk.remove(position)).flatten() {
        Some(block) => {
            let portal = block.portal_destination();
            if let Some(destination) = portal {
                log::info!("Portal {} broken at {:?}, heading to {}", block, position, destination);
            }
            InteractionOutcome::Removed {
                position,
                block,
                portal,
            }
        }
        None => ignore(position, IgnoreReason::EmptyVoxel),
    }
}

fn add(world: &mut WorldStore, target: Point3<i32>, block: BlockType) -> InteractionOutcome {
    let chunk = chunk_position_of(target);
    world.edit_or_create(chunk, |chunk| chunk.set(target, block));
    log::trace!("Placed {} at {:?} in chunk {:?}", block, target, chunk);
    InteractionOutcome::Placed {
        position: target,
        block,
        chunk,
    }
}

fn offset(position: Point3<i32>, step: Vector3<i32>) -> Option<Point3<i32>> {
    Some(Point3::new(
        position.x.checked_add(step.x)?,
        position.y.checked_add(step.y)?,
        position.z.checked_add(step.z)?,
    ))
}

fn ignore(position: Point3<i32>, reason: IgnoreReason) -> InteractionOutcome {
    log::debug!("Interaction at {:?} ignored: {:?}", position, reason);
    InteractionOutcome::Ignored(reason)
}
