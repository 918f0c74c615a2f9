#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Realms
//!
//! A procedural voxel world engine: deterministic terrain for three dimensions,
//! chunk streaming around a moving observer, and block mutation that can reach across
//! chunk borders and open portals between dimensions.
//!
//! ## Key Modules
//!
//! * `core` - Core utilities shared across the engine
//! * `engine_state` - The session context with generation, streaming, mutation,
//!   dimensions and task management
//!
//! ## Architecture
//!
//! Rendering, input, player physics and inventory live outside this crate. They feed
//! the engine the observer position, the selected item and interaction events, and
//! read back chunk snapshots and dimension transitions.
//!
//! ## Usage
//!
//! ```rust
//! use voxel_realms::{EngineState, WorldConfig};
//!
//! let mut engine = EngineState::new(WorldConfig {
//!     worker_count: 0,
//!     render_distance: 1,
//!     ..WorldConfig::default()
//! })
//! .unwrap();
//! engine.update_observer(cgmath::Point3::new(20.0, 35.0, 0.0));
//! assert!(engine.world().get().len() >= 9);
//! ```

use std::path::Path;

use cgmath::Point3;
use log::info;
use web_time::Duration;

use engine_state::voxels::chunk::chunk_position_of;

pub mod core;
pub mod engine_state;

pub use engine_state::{
    config::{ConfigError, WorldConfig},
    dimension::{Dimension, DimensionTransition},
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::Chunk,
        generation::{ChunkGenerator, ConstantField, FeatureOdds, NoiseField, PerlinField},
        mutation::{IgnoreReason, InteractionAction, InteractionOutcome},
        world::WorldStore,
    },
    EngineState,
};

pub const STREAMING_TIMEOUT: Duration = Duration::from_secs(30);

/// Steps of the headless walk, in chunks along +X.
const WALK_STEPS: i32 = 4;

/// Runs a headless session: streams the start area, walks the observer east, then
/// builds and breaks a nether portal where it stopped.
pub fn run(config_path: Option<&Path>) -> Result<(), ConfigError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match config_path {
        Some(path) => WorldConfig::from_path(path)?,
        None => WorldConfig::default(),
    };
    let mut engine = EngineState::new(config)?;
    engine.wait_for_streaming(STREAMING_TIMEOUT);
    info!(
        "Start area ready: {} chunks in {}",
        engine.world().get().len(),
        engine.active_dimension()
    );

    let start = engine.observer_position();
    for step in 1..=WALK_STEPS {
        let position = Point3::new(start.x + (16 * step) as f32, start.y, start.z);
        let requested = engine.update_observer(position);
        engine.wait_for_streaming(STREAMING_TIMEOUT);
        info!(
            "Observer at {:?}: {} new chunks, {} resident",
            position,
            requested,
            engine.world().get().len()
        );
    }

    let observer = engine.observer_position();
    let (x, z) = (observer.x.floor() as i32, observer.z.floor() as i32);
    let surface = engine
        .world()
        .get()
        .get(chunk_position_of(Point3::new(x, 0, z)))
        .and_then(|chunk| chunk.column_height(x, z));

    let Some(height) = surface else {
        info!("No ground under the observer, skipping the portal");
        return Ok(());
    };

    let placed = engine.interact(
        Point3::new(x, height, z),
        InteractionAction::Add,
        Some(BlockSide::TOP.normal_f32()),
        Some(BlockType::PORTAL_NETHER),
    );
    info!("Portal placement: {:?}", placed);

    if let InteractionOutcome::Placed { position, .. } = placed {
        let broken = engine.interact(position, InteractionAction::Remove, None, None);
        info!("Portal break: {:?}", broken);
        engine.wait_for_streaming(STREAMING_TIMEOUT);
    }

    for transition in engine.drain_transitions() {
        info!(
            "Moved from {} to {}, spawned at {:?}",
            transition.from, transition.to, transition.spawn
        );
    }
    info!(
        "Session ends in {} with {} resident chunks",
        engine.active_dimension(),
        engine.world().get().len()
    );

    Ok(())
}
