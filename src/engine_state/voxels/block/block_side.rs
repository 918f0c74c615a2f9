//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and their outward normals.
//! Placement uses the clicked face's normal to find the neighbouring voxel.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Unit offset from a block to the neighbour sharing this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Same as `normal`, as the real-valued vector a ray hit reports.
    pub fn normal_f32(self) -> Vector3<f32> {
        let normal = self.normal();
        Vector3::new(normal.x as f32, normal.y as f32, normal.z as f32)
    }

    /// Finds the face whose normal matches `normal` after rounding each component.
    ///
    /// # Returns
    /// `None` when the rounded vector is not one of the six axis directions.
    pub fn from_normal(normal: Vector3<f32>) -> Option<BlockSide> {
        let rounded = round_normal(normal);
        Self::all().into_iter().find(|side| side.normal() == rounded)
    }
}

/// Rounds each component of a face normal to the nearest integer.
///
/// Halves round away from zero.
pub fn round_normal(normal: Vector3<f32>) -> Vector3<i32> {
    Vector3::new(
        normal.x.round() as i32,
        normal.y.round() as i32,
        normal.z.round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normals_are_unit_and_distinct() {
        let normals: Vec<Vector3<i32>> = BlockSide::all().iter().map(|s| s.normal()).collect();
        for (i, a) in normals.iter().enumerate() {
            assert_eq!(a.x.abs() + a.y.abs() + a.z.abs(), 1);
            for b in &normals[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn noisy_normals_snap_to_faces() {
        assert_eq!(BlockSide::from_normal(Vector3::new(0.98, 0.01, -0.02)), Some(BlockSide::RIGHT));
        assert_eq!(BlockSide::from_normal(Vector3::new(0.0, -1.0, 0.0)), Some(BlockSide::BOTTOM));
        assert_eq!(BlockSide::from_normal(Vector3::new(0.0, 0.0, 0.0)), None);
        for side in BlockSide::all() {
            assert_eq!(BlockSide::from_normal(side.normal_f32()), Some(side));
        }
    }
}
