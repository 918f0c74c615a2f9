//! # World Module
//!
//! This module provides the `WorldStore`, the authoritative map from chunk coordinates
//! to resident chunks.
//!
//! ## Architecture
//!
//! The store is sparse: only chunks that have been generated, or created on demand by
//! a placement, are present. Each chunk is held behind an `Arc` and edited
//! copy-on-write, so a reader that cloned a chunk handle keeps an immutable snapshot
//! no matter what the engine does afterwards.
//!
//! Only the streaming path (inserts) and the mutation path (edits) write to the store,
//! both from the engine's main thread.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::{Point2, Point3};

use super::block::block_type::BlockType;
use super::chunk::{chunk_position_of, Chunk};

/// Represents the resident part of the voxel world.
#[derive(Default)]
pub struct WorldStore {
    chunks: HashMap<Point2<i32>, Arc<Chunk>>,
}

impl WorldStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        WorldStore {
            chunks: HashMap::new(),
        }
    }

    /// Snapshot of the chunk at `position`, if resident.
    pub fn get(&self, position: Point2<i32>) -> Option<Arc<Chunk>> {
        self.chunks.get(&position).cloned()
    }

    pub fn contains(&self, position: Point2<i32>) -> bool {
        self.chunks.contains_key(&position)
    }

    /// Inserts or replaces the chunk at `position`.
    ///
    /// Readers holding the previous chunk keep their snapshot.
    ///
    /// # Returns
    /// `false` if the chunk describes a different position than the key; the store is
    /// left unchanged in that case.
    pub fn put(&mut self, position: Point2<i32>, chunk: Chunk) -> bool {
        if chunk.position != position {
            log::warn!(
                "Refusing to store chunk {:?} under key {:?}",
                chunk.position,
                position
            );
            return false;
        }
        self.chunks.insert(position, Arc::new(chunk));
        true
    }

    /// Applies `edit` to a private copy of the chunk at `position` and swaps it in.
    ///
    /// The chunk is only cloned if some reader still holds the current version.
    ///
    /// # Returns
    /// `None` if no chunk is resident at `position`, otherwise the closure's result.
    pub fn edit<R>(&mut self, position: Point2<i32>, edit: impl FnOnce(&mut Chunk) -> R) -> Option<R> {
        let chunk = self.chunks.get_mut(&position)?;
        Some(edit(Arc::make_mut(chunk)))
    }

    /// Like `edit`, but creates a placeholder chunk first if none is resident.
    ///
    /// The placeholder keeps the edit until `install_generated` merges the chunk's
    /// terrain under it.
    pub fn edit_or_create<R>(&mut self, position: Point2<i32>, edit: impl FnOnce(&mut Chunk) -> R) -> R {
        let chunk = self.chunks.entry(position).or_insert_with(|| {
            log::debug!("Creating placeholder chunk {:?} on demand", position);
            Arc::new(Chunk::placeholder(position))
        });
        edit(Arc::make_mut(chunk))
    }

    /// Whether the chunk at `position` still needs its generated terrain: it is
    /// either not resident or only a placeholder.
    pub fn needs_terrain(&self, position: Point2<i32>) -> bool {
        self.chunks
            .get(&position)
            .map_or(true, |chunk| chunk.awaiting_terrain())
    }

    /// Installs a freshly generated chunk.
    ///
    /// A placeholder at `position` is merged on top of the generated terrain, so edits
    /// made before generation finished survive. A fully generated chunk already
    /// resident is kept as is.
    ///
    /// # Returns
    /// `true` if the store changed.
    pub fn install_generated(&mut self, position: Point2<i32>, mut generated: Chunk) -> bool {
        match self.chunks.get(&position).cloned() {
            Some(resident) if !resident.awaiting_terrain() => false,
            Some(placeholder) => {
                log::trace!(
                    "Merging {} edited voxels into generated chunk {:?}",
                    placeholder.len(),
                    position
                );
                generated.overlay(&placeholder);
                self.put(position, generated)
            }
            None => self.put(position, generated),
        }
    }

    /// Drops the chunk at `position`, returning it.
    pub fn remove(&mut self, position: Point2<i32>) -> Option<Arc<Chunk>> {
        self.chunks.remove(&position)
    }

    /// Removes every chunk.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Coordinates of every resident chunk, in arbitrary order.
    pub fn positions(&self) -> impl Iterator<Item = Point2<i32>> + '_ {
        self.chunks.keys().copied()
    }

    /// Every resident chunk, in arbitrary order.
    pub fn chunks(&self) -> impl Iterator<Item = &Arc<Chunk>> + '_ {
        self.chunks.values()
    }

    /// Reads a single voxel. Unloaded chunks read as air.
    pub fn get_block(&self, position: Point3<i32>) -> Option<BlockType> {
        self.chunks
            .get(&chunk_position_of(position))
            .and_then(|chunk| chunk.get(position))
    }
}
