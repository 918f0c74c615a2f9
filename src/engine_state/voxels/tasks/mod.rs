//! # Voxel Task System
//!
//! This module contains tasks related to voxel world generation.
//! These tasks run on worker threads so that streaming never stalls the engine loop.

pub mod chunk_generation_task;
