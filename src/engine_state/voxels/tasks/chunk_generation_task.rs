//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which handles asynchronous
//! generation of chunk data. This task is scheduled by the streaming controller
//! when chunks around the observer are missing.
//!
//! The worker only builds the chunk. Installing it happens on the main thread in
//! `handle_result`, after checking that the request is still wanted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cgmath::Point2;

use crate::engine_state::{
    dimension::Dimension,
    task_management::task::{Task, TaskContext, TaskResult},
    voxels::{chunk::Chunk, generation::ChunkGenerator},
};

/// A task that generates chunk data asynchronously.
///
/// This task is responsible for:
/// 1. Generating the chunk data at the specified position, unless cancelled
/// 2. Handing the chunk back to the main thread, tagged with its request ticket
pub struct ChunkGenerationTask {
    /// Shared, immutable generator
    generator: Arc<ChunkGenerator>,
    /// The position of the chunk to generate (in chunk coordinates)
    position: Point2<i32>,
    dimension: Dimension,
    /// Dimension epoch at request time
    epoch: u64,
    ticket: u64,
    cancelled: Arc<AtomicBool>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - The generator to build the chunk with
    /// * `position` - The chunk coordinates where the chunk should be generated
    /// * `dimension` - The dimension the chunk belongs to
    /// * `epoch` - The dimension epoch the request was made in
    /// * `ticket` - Identifies the request in the streaming controller
    /// * `cancelled` - Set by the streaming controller when the chunk is no longer wanted
    pub fn new(
        generator: Arc<ChunkGenerator>,
        position: Point2<i32>,
        dimension: Dimension,
        epoch: u64,
        ticket: u64,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        ChunkGenerationTask {
            generator,
            position,
            dimension,
            epoch,
            ticket,
            cancelled,
        }
    }

    pub fn position(&self) -> Point2<i32> {
        self.position
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Task for ChunkGenerationTask {
    /// Generates the chunk on a worker thread.
    ///
    /// A request cancelled while in flight skips the work and returns an empty result.
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let chunk = if self.is_cancelled() {
            None
        } else {
            Some(self.generator.generate(self.position, self.dimension))
        };

        Box::new(ChunkGenerationTaskResult {
            chunk,
            position: self.position,
            epoch: self.epoch,
            ticket: self.ticket,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    /// The generated chunk; `None` if the task was cancelled before it ran
    chunk: Option<Chunk>,
    position: Point2<i32>,
    epoch: u64,
    ticket: u64,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Installs the chunk on the main thread.
    ///
    /// The chunk is discarded if it belongs to an earlier dimension, if the request
    /// was cancelled or superseded, or if generated terrain is already resident.
    /// Blocks placed into the chunk while it was generating are kept on top.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
        let Some(chunk) = self.chunk else {
            return Vec::new();
        };

        if self.epoch != context.epoch {
            log::trace!(
                "Discarding chunk {:?} from epoch {} (now {})",
                self.position,
                self.epoch,
                context.epoch
            );
            return Vec::new();
        }

        if !context.streaming.accept(self.position, self.ticket, self.epoch) {
            log::trace!("Discarding cancelled chunk {:?}", self.position);
            return Vec::new();
        }

        if !context.world.get_mut().install_generated(self.position, chunk) {
            log::trace!("Chunk {:?} already generated, keeping it", self.position);
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MtResource;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::generation::{ConstantField, FeatureOdds};
    use crate::engine_state::voxels::streaming::StreamingController;
    use crate::engine_state::voxels::world::WorldStore;
    use cgmath::Point3;

    fn generator() -> Arc<ChunkGenerator> {
        Arc::new(ChunkGenerator::with_noise(Arc::new(ConstantField(0.0)), 3).with_odds(FeatureOdds::none()))
    }

    fn single_request(streaming: &mut StreamingController, world: &MtResource<WorldStore>, epoch: u64) -> ChunkGenerationTask {
        let mut tasks = streaming.request_missing(
            Point3::new(0.0, 0.0, 0.0),
            Dimension::Overworld,
            epoch,
            &generator(),
            &world.get(),
        );
        assert_eq!(tasks.len(), 1);
        tasks.remove(0)
    }

    #[test]
    fn accepted_result_is_installed() {
        let world = MtResource::new(WorldStore::new());
        let mut streaming = StreamingController::new(0, None);
        let task = single_request(&mut streaming, &world, 0);

        let result = task.process();
        let mut context = TaskContext {
            world: &world,
            streaming: &mut streaming,
            epoch: 0,
        };
        assert!(result.handle_result(&mut context).is_empty());

        assert!(world.get().contains(Point2::new(0, 0)));
        assert_eq!(streaming.pending_len(), 0);
    }

    #[test]
    fn stale_epoch_is_discarded() {
        let world = MtResource::new(WorldStore::new());
        let mut streaming = StreamingController::new(0, None);
        let task = single_request(&mut streaming, &world, 0);

        let result = task.process();
        let mut context = TaskContext {
            world: &world,
            streaming: &mut streaming,
            epoch: 1,
        };
        result.handle_result(&mut context);
        assert!(world.get().is_empty());
    }

    #[test]
    fn cancelled_task_skips_generation() {
        let world = MtResource::new(WorldStore::new());
        let mut streaming = StreamingController::new(0, None);
        let task = single_request(&mut streaming, &world, 0);
        streaming.cancel_all();
        assert!(task.is_cancelled());

        let result = task.process();
        let mut context = TaskContext {
            world: &world,
            streaming: &mut streaming,
            epoch: 0,
        };
        result.handle_result(&mut context);
        assert!(world.get().is_empty());
    }

    #[test]
    fn placement_made_while_generating_keeps_terrain() {
        let world = MtResource::new(WorldStore::new());
        let mut streaming = StreamingController::new(0, None);
        let task = single_request(&mut streaming, &world, 0);

        // A placement made the chunk resident while the task was in flight.
        world
            .get_mut()
            .edit_or_create(Point2::new(0, 0), |chunk| chunk.set(Point3::new(2, 90, 2), BlockType::GLASS));

        let result = task.process();
        let mut context = TaskContext {
            world: &world,
            streaming: &mut streaming,
            epoch: 0,
        };
        result.handle_result(&mut context);

        let chunk = world.get().get(Point2::new(0, 0)).unwrap();
        assert!(!chunk.awaiting_terrain());
        assert_eq!(chunk.get(Point3::new(2, 90, 2)), Some(BlockType::GLASS));
        assert_eq!(chunk.get(Point3::new(3, 15, 3)), Some(BlockType::GRASS));
        assert_eq!(chunk.get(Point3::new(3, 0, 3)), Some(BlockType::BEDROCK));
        assert_eq!(chunk.len(), 16 * 16 * 16 + 1);
        assert_eq!(streaming.pending_len(), 0);
    }

    #[test]
    fn generated_chunk_is_not_overwritten() {
        let world = MtResource::new(WorldStore::new());
        let mut streaming = StreamingController::new(0, None);
        let task = single_request(&mut streaming, &world, 0);

        // A synchronous pass installed terrain, and the player dug a hole into it.
        let mut generated = generator().generate(Point2::new(0, 0), Dimension::Overworld);
        generated.remove(Point3::new(3, 15, 3));
        world.get_mut().put(Point2::new(0, 0), generated.clone());

        let result = task.process();
        let mut context = TaskContext {
            world: &world,
            streaming: &mut streaming,
            epoch: 0,
        };
        result.handle_result(&mut context);

        assert_eq!(*world.get().get(Point2::new(0, 0)).unwrap(), generated);
    }
}
