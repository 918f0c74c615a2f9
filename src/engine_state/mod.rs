//! # Engine State Module
//!
//! The core engine module that owns one world session.
//!
//! ## Key Components
//!
//! * `EngineState` - The session context; the single entry point for the player,
//!   input and renderer layers
//! * `config` - Session configuration
//! * `dimension` - The active dimension and the portal transition protocol
//! * `task_management` - Manages asynchronous tasks and worker threads
//! * `voxels` - Handles voxel data, chunks, world generation and mutation
//!
//! ## Architecture
//!
//! `EngineState` owns every subsystem and is driven from one thread, the main thread.
//! The observer position feeds streaming, interactions feed the mutation path, and a
//! broken portal feeds the dimension controller, which clears the world before
//! streaming starts over around the spawn point.
//!
//! With workers configured, missing chunks are generated on the task manager's threads
//! and installed by `process_tasks`. With zero workers every streaming pass generates
//! inline, so the world is complete as soon as the call returns.

use std::sync::Arc;

use cgmath::{Point3, Vector3};
use web_time::{Duration, Instant};

use config::{ConfigError, WorldConfig};
use dimension::{Dimension, DimensionController, DimensionTransition};
use task_management::{task::TaskContext, TaskManager};
use voxels::{
    block::block_type::BlockType,
    generation::{ChunkGenerator, NoiseField},
    mutation::{self, InteractionAction, InteractionOutcome},
    streaming::StreamingController,
    world::WorldStore,
};

use crate::core::MtResource;

pub mod config;
pub mod dimension;
pub mod task_management;
pub mod voxels;

/// The state of one world session.
///
/// # Examples
///
/// ```
/// use voxel_realms::{EngineState, WorldConfig};
///
/// let config = WorldConfig {
///     seed: Some(7),
///     render_distance: 1,
///     worker_count: 0,
///     ..WorldConfig::default()
/// };
/// let engine = EngineState::new(config).unwrap();
/// assert_eq!(engine.world().get().len(), 9);
/// ```
pub struct EngineState {
    config: WorldConfig,
    /// The resident world, shareable with a renderer thread
    world: MtResource<WorldStore>,
    generator: Arc<ChunkGenerator>,
    streaming: StreamingController,
    dimensions: DimensionController,
    task_manager: TaskManager,
    observer_position: Point3<f32>,
    /// Transitions not yet collected by the game-state layer
    transitions: Vec<DimensionTransition>,
}

impl EngineState {
    /// Starts a session shaped by Perlin noise.
    ///
    /// The neighbourhood around the initial observer is streamed right away.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = Self::session_seed(&config);
        Self::with_generator(config, ChunkGenerator::new(seed))
    }

    /// Starts a session with a caller-supplied noise field.
    pub fn with_noise(config: WorldConfig, noise: Arc<dyn NoiseField>) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = Self::session_seed(&config);
        Self::with_generator(config, ChunkGenerator::with_noise(noise, seed))
    }

    fn session_seed(config: &WorldConfig) -> u64 {
        match config.seed {
            Some(seed) => seed,
            None => {
                let seed = fastrand::u64(..);
                log::info!("No seed configured, drew {seed}");
                seed
            }
        }
    }

    fn with_generator(config: WorldConfig, generator: ChunkGenerator) -> Result<Self, ConfigError> {
        let generator = generator
            .with_odds(config.feature_odds)
            .with_reroll_features(config.reroll_features);

        log::info!(
            "Starting world session: seed {}, {} at {:?}, render distance {}, {} workers",
            generator.seed(),
            config.initial_dimension,
            config.initial_observer,
            config.render_distance,
            config.worker_count
        );

        let mut engine = EngineState {
            world: MtResource::new(WorldStore::new()),
            generator: Arc::new(generator),
            streaming: StreamingController::new(config.render_distance, config.keep_alive_distance),
            dimensions: DimensionController::new(config.initial_dimension, config.spawn_point()),
            task_manager: TaskManager::new(config.worker_count),
            observer_position: config.initial_observer(),
            transitions: Vec::new(),
            config,
        };
        engine.stream();
        Ok(engine)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Handle to the world store; clone it to read chunks from another thread.
    pub fn world(&self) -> &MtResource<WorldStore> {
        &self.world
    }

    pub fn generator(&self) -> &Arc<ChunkGenerator> {
        &self.generator
    }

    pub fn seed(&self) -> u64 {
        self.generator.seed()
    }

    pub fn active_dimension(&self) -> Dimension {
        self.dimensions.active()
    }

    /// Bumped on every dimension transition.
    pub fn epoch(&self) -> u64 {
        self.dimensions.epoch()
    }

    pub fn observer_position(&self) -> Point3<f32> {
        self.observer_position
    }

    pub fn streaming(&self) -> &StreamingController {
        &self.streaming
    }

    pub fn get_block(&self, position: Point3<i32>) -> Option<BlockType> {
        self.world.get().get_block(position)
    }

    /// Moves the observer and streams around the new position.
    ///
    /// # Returns
    /// Chunks generated inline, or requests published to the workers.
    pub fn update_observer(&mut self, position: Point3<f32>) -> usize {
        self.observer_position = position;
        self.stream()
    }

    /// Generates every missing chunk around the observer on the calling thread,
    /// whether or not workers are configured.
    pub fn sync_blocking(&mut self) -> usize {
        let mut world = self.world.get_mut();
        self.streaming.sync(
            self.observer_position,
            self.dimensions.active(),
            &self.generator,
            &mut world,
        )
    }

    fn stream(&mut self) -> usize {
        if self.task_manager.worker_count() == 0 {
            return self.sync_blocking();
        }

        let tasks = {
            let world = self.world.get();
            self.streaming.request_missing(
                self.observer_position,
                self.dimensions.active(),
                self.dimensions.epoch(),
                &self.generator,
                &world,
            )
        };
        let requested = tasks.len();
        for task in tasks {
            self.task_manager.publish_task(Box::new(task));
        }

        self.streaming.evict_out_of_range(&mut self.world.get_mut());
        requested
    }

    /// Installs finished background chunks and hands queued requests to free workers.
    ///
    /// Call once per engine tick.
    ///
    /// # Returns
    /// The number of task results handled.
    pub fn process_tasks(&mut self) -> usize {
        let mut context = TaskContext {
            world: &self.world,
            streaming: &mut self.streaming,
            epoch: self.dimensions.epoch(),
        };
        let handled = self.task_manager.process_completed_tasks(&mut context);
        self.task_manager.process_queued_tasks();
        handled
    }

    /// Whether every streaming request has been resolved.
    pub fn is_streaming_settled(&self) -> bool {
        self.streaming.pending_len() == 0 && self.task_manager.is_idle()
    }

    /// Runs `process_tasks` until streaming settles or `timeout` elapses.
    ///
    /// # Returns
    /// `true` if streaming settled in time.
    pub fn wait_for_streaming(&mut self, timeout: Duration) -> bool {
        let started = Instant::now();
        loop {
            self.process_tasks();
            if self.is_streaming_settled() {
                return true;
            }
            if started.elapsed() >= timeout {
                log::warn!(
                    "Streaming not settled after {:?}: {} pending, {} queued",
                    timeout,
                    self.streaming.pending_len(),
                    self.task_manager.queued_len()
                );
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Applies a player interaction.
    ///
    /// Breaking a portal transitions to its dimension before this returns: the world
    /// is cleared, the observer moves to the spawn point and streaming restarts there.
    pub fn interact(
        &mut self,
        position: Point3<i32>,
        action: InteractionAction,
        face_normal: Option<Vector3<f32>>,
        selected_item: Option<BlockType>,
    ) -> InteractionOutcome {
        let outcome = {
            let mut world = self.world.get_mut();
            mutation::interact(&mut world, position, action, face_normal, selected_item)
        };

        if let Some(destination) = outcome.portal() {
            self.enter_dimension(destination);
        }
        outcome
    }

    /// Runs the transition protocol to `target`.
    pub fn enter_dimension(&mut self, target: Dimension) -> DimensionTransition {
        self.streaming.cancel_all();
        let transition = {
            let mut world = self.world.get_mut();
            self.dimensions.transition(target, &mut world)
        };

        self.observer_position = transition.spawn;
        self.transitions.push(transition);
        self.stream();
        transition
    }

    /// Takes the transitions that happened since the last call, oldest first.
    pub fn drain_transitions(&mut self) -> Vec<DimensionTransition> {
        std::mem::take(&mut self.transitions)
    }
}
