//! # Voxel Engine Core
//!
//! This module contains the core voxel engine functionality, providing the foundation
//! for representing, generating, and editing a voxel-based world.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: The block catalog, per-block properties and face normals
//! * **Chunk**: Sparse 16-wide vertical columns of voxels
//! * **Generation**: Deterministic per-dimension terrain and features
//! * **World**: The store of resident chunks
//! * **Streaming**: Keeps the neighbourhood around the observer resident
//! * **Mutation**: Breaking and placing blocks
//! * **Tasks**: Background chunk generation
//!
//! ## Data Flow
//!
//! 1. The observer moves; streaming works out which chunks are missing
//! 2. Missing chunks are generated, inline or on worker threads
//! 3. Generated chunks are installed in the world on the main thread
//! 4. Interactions edit chunks in place, copy-on-write
//!
//! ## Thread Safety
//!
//! * Generators are immutable and shared between workers
//! * Chunks are handed out as `Arc` snapshots
//! * Only the main thread writes to the world store

pub mod block;
pub mod chunk;
pub mod generation;
pub mod mutation;
pub mod streaming;
pub mod tasks;
pub mod world;
