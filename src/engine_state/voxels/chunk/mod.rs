//! # Chunk Module
//!
//! This module provides the `Chunk` struct: the voxels of one 16x16 column footprint
//! of the world, keyed by absolute world coordinates.
//!
//! ## Storage
//!
//! Chunks are sparse. Only occupied voxels are stored and an absent key is air, so a
//! chunk of open sky costs nothing and a chunk has no vertical bound.
//!
//! ## Ownership
//!
//! A voxel belongs to exactly one chunk, determined only by its `x` and `z`
//! (`floor(x / 16)`, `floor(z / 16)`). A chunk refuses writes to voxels it does not
//! own, which keeps the key sets of any two chunks disjoint.

use std::collections::HashMap;

use cgmath::{Point2, Point3};

use super::block::block_type::BlockType;

/// The edge length of a chunk's column footprint, in blocks.
pub const CHUNK_DIMENSION: i32 = 16;

/// Chunk coordinate owning the voxel at `position`.
pub fn chunk_position_of(position: Point3<i32>) -> Point2<i32> {
    Point2::new(
        position.x.div_euclid(CHUNK_DIMENSION),
        position.z.div_euclid(CHUNK_DIMENSION),
    )
}

/// Largest chunk coordinate, on either axis, that streaming will centre on.
///
/// Half of the range whose block coordinates fit an `i32`, leaving room for the
/// neighbourhood and feature margins around it.
pub const CHUNK_COORDINATE_LIMIT: i32 = i32::MAX / CHUNK_DIMENSION / 2;

/// Chunk coordinate containing a real-valued world point, such as the observer.
///
/// Points beyond `CHUNK_COORDINATE_LIMIT` chunks from the origin map to the limit.
pub fn chunk_position_of_point(position: Point3<f32>) -> Point2<i32> {
    let axis = |value: f32| {
        ((value / CHUNK_DIMENSION as f32).floor() as i32)
            .clamp(-CHUNK_COORDINATE_LIMIT, CHUNK_COORDINATE_LIMIT)
    };
    Point2::new(axis(position.x), axis(position.z))
}

/// Chebyshev distance between two chunk coordinates, saturating at `i32::MAX`.
pub fn chunk_distance(a: Point2<i32>, b: Point2<i32>) -> i32 {
    let distance = a.x.abs_diff(b.x).max(a.y.abs_diff(b.y));
    i32::try_from(distance).unwrap_or(i32::MAX)
}

/// The voxel contents of one chunk column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point2<i32>,
    blocks: HashMap<Point3<i32>, BlockType>,
    /// Created by an edit before the chunk's terrain was generated.
    awaiting_terrain: bool,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all air).
    pub fn empty(position: Point2<i32>) -> Self {
        Chunk {
            position,
            blocks: HashMap::new(),
            awaiting_terrain: false,
        }
    }

    /// An empty chunk holding edits until its generated terrain arrives.
    ///
    /// Streaming still treats the position as missing; the generated chunk is merged
    /// under the edits instead of being dropped.
    pub fn placeholder(position: Point2<i32>) -> Self {
        Chunk {
            awaiting_terrain: true,
            ..Chunk::empty(position)
        }
    }

    pub fn awaiting_terrain(&self) -> bool {
        self.awaiting_terrain
    }

    /// Copies every voxel of `edits` over this chunk. Voxels of `edits` win.
    pub fn overlay(&mut self, edits: &Chunk) {
        for (position, block_type) in edits.iter() {
            self.set(position, block_type);
        }
    }

    /// World x/z of the chunk's minimum corner.
    pub fn origin(&self) -> (i32, i32) {
        (
            self.position.x.saturating_mul(CHUNK_DIMENSION),
            self.position.y.saturating_mul(CHUNK_DIMENSION),
        )
    }

    /// Whether `position` projects onto this chunk's footprint.
    pub fn owns(&self, position: Point3<i32>) -> bool {
        chunk_position_of(position) == self.position
    }

    pub fn get(&self, position: Point3<i32>) -> Option<BlockType> {
        self.blocks.get(&position).copied()
    }

    /// Stores `block_type` at `position`, replacing whatever was there.
    ///
    /// # Returns
    /// `false`, leaving the chunk untouched, if `position` belongs to another chunk.
    pub fn set(&mut self, position: Point3<i32>, block_type: BlockType) -> bool {
        if !self.owns(position) {
            log::trace!(
                "Chunk {:?} ignored write to foreign voxel {:?}",
                self.position,
                position
            );
            return false;
        }
        self.blocks.insert(position, block_type);
        true
    }

    /// Clears `position` back to air, returning the block that was there.
    pub fn remove(&mut self, position: Point3<i32>) -> Option<BlockType> {
        self.blocks.remove(&position)
    }

    /// Number of occupied voxels.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates occupied voxels in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, BlockType)> + '_ {
        self.blocks.iter().map(|(position, block)| (*position, *block))
    }

    /// Highest occupied `y` in the world column `(x, z)`, if any.
    pub fn column_height(&self, x: i32, z: i32) -> Option<i32> {
        self.blocks
            .keys()
            .filter(|position| position.x == x && position.z == z)
            .map(|position| position.y)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_position_floors_negative_coordinates() {
        assert_eq!(chunk_position_of(Point3::new(0, 5, 0)), Point2::new(0, 0));
        assert_eq!(chunk_position_of(Point3::new(15, 5, 15)), Point2::new(0, 0));
        assert_eq!(chunk_position_of(Point3::new(16, 5, -1)), Point2::new(1, -1));
        assert_eq!(chunk_position_of(Point3::new(-16, 5, -17)), Point2::new(-1, -2));
        assert_eq!(chunk_position_of_point(Point3::new(-0.5, 35.0, 31.9)), Point2::new(-1, 1));
    }

    #[test]
    fn chunk_rejects_foreign_voxels() {
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        assert!(chunk.set(Point3::new(15, 3, 0), BlockType::DIRT));
        assert!(!chunk.set(Point3::new(16, 3, 0), BlockType::DIRT));
        assert!(!chunk.set(Point3::new(-1, 3, 0), BlockType::DIRT));
        assert_eq!(chunk.len(), 1);
        assert_eq!(chunk.get(Point3::new(15, 3, 0)), Some(BlockType::DIRT));
    }

    #[test]
    fn remove_returns_previous_block() {
        let mut chunk = Chunk::empty(Point2::new(-1, 2));
        let position = Point3::new(-3, 10, 40);
        assert!(chunk.set(position, BlockType::LOG));
        assert_eq!(chunk.column_height(-3, 40), Some(10));
        assert_eq!(chunk.remove(position), Some(BlockType::LOG));
        assert_eq!(chunk.remove(position), None);
        assert!(chunk.is_empty());
    }

    #[test]
    fn chebyshev_distance() {
        assert_eq!(chunk_distance(Point2::new(0, 0), Point2::new(3, -2)), 3);
        assert_eq!(chunk_distance(Point2::new(-4, 1), Point2::new(-4, 1)), 0);
        assert_eq!(
            chunk_distance(Point2::new(i32::MIN, 0), Point2::new(i32::MAX, 0)),
            i32::MAX
        );
    }

    #[test]
    fn far_points_clamp_to_the_coordinate_limit() {
        assert_eq!(
            chunk_position_of_point(Point3::new(3.0e9, 35.0, -3.0e9)),
            Point2::new(CHUNK_COORDINATE_LIMIT, -CHUNK_COORDINATE_LIMIT)
        );
        assert_eq!(
            chunk_position_of_point(Point3::new(f32::MAX, 0.0, f32::MIN)),
            Point2::new(CHUNK_COORDINATE_LIMIT, -CHUNK_COORDINATE_LIMIT)
        );

        let edge = Chunk::empty(Point2::new(i32::MAX, i32::MIN));
        assert_eq!(edge.origin(), (i32::MAX, i32::MIN));
        let limit = Chunk::empty(Point2::new(CHUNK_COORDINATE_LIMIT, 0));
        assert_eq!(limit.origin().0, CHUNK_COORDINATE_LIMIT * CHUNK_DIMENSION);
    }

    #[test]
    fn overlay_keeps_edits_over_terrain() {
        let position = Point2::new(0, 0);
        let mut terrain = Chunk::empty(position);
        terrain.set(Point3::new(1, 15, 1), BlockType::GRASS);
        terrain.set(Point3::new(1, 14, 1), BlockType::DIRT);

        let mut edits = Chunk::placeholder(position);
        assert!(edits.awaiting_terrain());
        edits.set(Point3::new(1, 15, 1), BlockType::GLASS);
        edits.set(Point3::new(1, 16, 1), BlockType::SAND);

        terrain.overlay(&edits);
        assert!(!terrain.awaiting_terrain());
        assert_eq!(terrain.len(), 3);
        assert_eq!(terrain.get(Point3::new(1, 15, 1)), Some(BlockType::GLASS));
        assert_eq!(terrain.get(Point3::new(1, 14, 1)), Some(BlockType::DIRT));
        assert_eq!(terrain.get(Point3::new(1, 16, 1)), Some(BlockType::SAND));
    }
}
