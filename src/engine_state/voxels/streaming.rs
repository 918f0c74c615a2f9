//! # Chunk Streaming
//!
//! Keeps the square neighbourhood of chunks around the observer resident.
//!
//! The neighbourhood is every chunk within Chebyshev distance `render_distance` of the
//! observer's chunk, `(2R + 1)²` chunks in total. Missing chunks are generated either
//! inline (`sync`) or as background requests (`request_missing`). Generated chunks are
//! never regenerated. A placeholder left by an early placement still counts as
//! missing, and its edits are merged over the terrain once it arrives.
//!
//! ## Background requests
//!
//! Every outstanding request is tracked with a ticket and a cancellation flag. When
//! the observer moves, requests that fell out of range are cancelled: queued ones are
//! dropped before they run, and results that were already computed are discarded by
//! `accept`. A dimension transition cancels everything.
//!
//! ## Eviction
//!
//! By default nothing is ever evicted. With a keep-alive distance, chunks farther than
//! it from the observer are dropped after each pass.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cgmath::{Point2, Point3};

use super::chunk::{chunk_distance, chunk_position_of_point};
use super::generation::ChunkGenerator;
use super::tasks::chunk_generation_task::ChunkGenerationTask;
use super::world::WorldStore;
use crate::engine_state::dimension::Dimension;

/// Default render distance, in chunks.
pub const DEFAULT_RENDER_DISTANCE: i32 = 3;

/// Largest supported render distance, in chunks.
pub const MAX_RENDER_DISTANCE: i32 = 64;

struct PendingRequest {
    ticket: u64,
    epoch: u64,
    cancelled: Arc<AtomicBool>,
}

/// Decides which chunks must be resident and tracks outstanding generation requests.
pub struct StreamingController {
    render_distance: i32,
    keep_alive_distance: Option<i32>,
    center: Option<Point2<i32>>,
    pending: HashMap<Point2<i32>, PendingRequest>,
    next_ticket: u64,
}

impl StreamingController {
    pub fn new(render_distance: i32, keep_alive_distance: Option<i32>) -> Self {
        StreamingController {
            render_distance: render_distance.clamp(0, MAX_RENDER_DISTANCE),
            keep_alive_distance,
            center: None,
            pending: HashMap::new(),
            next_ticket: 0,
        }
    }

    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    /// The observer chunk of the last streaming pass.
    pub fn center(&self) -> Option<Point2<i32>> {
        self.center
    }

    /// Outstanding background requests.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, position: Point2<i32>) -> bool {
        self.pending.contains_key(&position)
    }

    /// Every chunk coordinate within the render distance of `center`.
    pub fn neighborhood(&self, center: Point2<i32>) -> impl Iterator<Item = Point2<i32>> {
        let radius = self.render_distance;
        (-radius..=radius)
            .flat_map(move |dx| (-radius..=radius).map(move |dz| Point2::new(center.x + dx, center.y + dz)))
    }

    /// Whether `position` is inside the current neighbourhood.
    pub fn in_range(&self, position: Point2<i32>) -> bool {
        self.center
            .is_some_and(|center| chunk_distance(center, position) <= self.render_distance)
    }

    /// Chunks around `center` still lacking generated terrain, nearest first.
    pub fn missing_chunks(&self, center: Point2<i32>, world: &WorldStore) -> Vec<Point2<i32>> {
        let mut missing: Vec<Point2<i32>> = self
            .neighborhood(center)
            .filter(|position| world.needs_terrain(*position))
            .collect();
        missing.sort_by_key(|position| chunk_distance(center, *position));
        missing
    }

    /// Generates every missing chunk around the observer inline.
    ///
    /// Calling this again with the observer in the same chunk does no work.
    ///
    /// # Returns
    /// The number of chunks generated.
    pub fn sync(
        &mut self,
        observer: Point3<f32>,
        dimension: Dimension,
        generator: &ChunkGenerator,
        world: &mut WorldStore,
    ) -> usize {
        let center = chunk_position_of_point(observer);
        self.recenter(center);

        let missing = self.missing_chunks(center, world);
        for position in &missing {
            world.install_generated(*position, generator.generate(*position, dimension));
        }
        if !missing.is_empty() {
            log::debug!(
                "Generated {} {} chunks around {:?}",
                missing.len(),
                dimension,
                center
            );
        }

        self.evict_out_of_range(world);
        missing.len()
    }

    /// Builds background requests for every missing chunk that is not already pending.
    ///
    /// Pending requests that left the neighbourhood are cancelled first.
    pub fn request_missing(
        &mut self,
        observer: Point3<f32>,
        dimension: Dimension,
        epoch: u64,
        generator: &Arc<ChunkGenerator>,
        world: &WorldStore,
    ) -> Vec<ChunkGenerationTask> {
        let center = chunk_position_of_point(observer);
        self.recenter(center);

        let mut tasks = Vec::new();
        for position in self.missing_chunks(center, world) {
            if self.pending.contains_key(&position) {
                continue;
            }
            let ticket = self.next_ticket;
            self.next_ticket += 1;
            let cancelled = Arc::new(AtomicBool::new(false));
            self.pending.insert(
                position,
                PendingRequest {
                    ticket,
                    epoch,
                    cancelled: cancelled.clone(),
                },
            );
            tasks.push(ChunkGenerationTask::new(
                generator.clone(),
                position,
                dimension,
                epoch,
                ticket,
                cancelled,
            ));
        }

        if !tasks.is_empty() {
            log::debug!(
                "Requested {} {} chunks around {:?} ({} pending)",
                tasks.len(),
                dimension,
                center,
                self.pending.len()
            );
        }
        tasks
    }

    /// Claims the pending request for `position` if `ticket` and `epoch` still match it.
    ///
    /// # Returns
    /// `true` if the result should be installed.
    pub fn accept(&mut self, position: Point2<i32>, ticket: u64, epoch: u64) -> bool {
        match self.pending.get(&position) {
            Some(request)
                if request.ticket == ticket
                    && request.epoch == epoch
                    && !request.cancelled.load(Ordering::Acquire) =>
            {
                self.pending.remove(&position);
                true
            }
            _ => false,
        }
    }

    /// Cancels every outstanding request and forgets the observer chunk.
    pub fn cancel_all(&mut self) {
        let cancelled = self.pending.len();
        for (_, request) in self.pending.drain() {
            request.cancelled.store(true, Ordering::Release);
        }
        self.center = None;
        if cancelled > 0 {
            log::debug!("Cancelled {cancelled} pending chunk requests");
        }
    }

    /// Drops resident chunks beyond the keep-alive distance.
    ///
    /// # Returns
    /// The number of chunks evicted; always zero without a keep-alive distance.
    pub fn evict_out_of_range(&self, world: &mut WorldStore) -> usize {
        let (Some(keep_alive), Some(center)) = (self.keep_alive_distance, self.center) else {
            return 0;
        };
        let stale: Vec<Point2<i32>> = world
            .positions()
            .filter(|position| chunk_distance(center, *position) > keep_alive)
            .collect();
        for position in &stale {
            world.remove(*position);
        }
        if !stale.is_empty() {
            log::debug!("Evicted {} chunks beyond {} of {:?}", stale.len(), keep_alive, center);
        }
        stale.len()
    }

    fn recenter(&mut self, center: Point2<i32>) {
        if self.center == Some(center) {
            return;
        }
        log::trace!("Observer chunk is now {:?}", center);
        self.center = Some(center);

        let radius = self.render_distance;
        let before = self.pending.len();
        self.pending.retain(|position, request| {
            let keep = chunk_distance(center, *position) <= radius;
            if !keep {
                request.cancelled.store(true, Ordering::Release);
            }
            keep
        });
        let cancelled = before - self.pending.len();
        if cancelled > 0 {
            log::debug!("Cancelled {cancelled} out-of-range chunk requests");
        }
    }
}

impl Default for StreamingController {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DISTANCE, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::task_management::task::Task;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::chunk::{Chunk, CHUNK_COORDINATE_LIMIT};
    use crate::engine_state::voxels::generation::{ConstantField, FeatureOdds};

    fn flat_generator() -> ChunkGenerator {
        ChunkGenerator::with_noise(Arc::new(ConstantField(0.0)), 1).with_odds(FeatureOdds::none())
    }

    #[test]
    fn sync_loads_the_full_square() {
        let mut streaming = StreamingController::new(3, None);
        let mut world = WorldStore::new();
        let generated = streaming.sync(Point3::new(8.0, 35.0, 8.0), Dimension::Overworld, &flat_generator(), &mut world);

        assert_eq!(generated, 49);
        assert_eq!(world.len(), 49);
        for position in world.positions() {
            assert!((-3..=3).contains(&position.x) && (-3..=3).contains(&position.y));
        }
    }

    #[test]
    fn sync_is_idempotent_and_incremental() {
        let mut streaming = StreamingController::new(2, None);
        let mut world = WorldStore::new();
        let generator = flat_generator();

        assert_eq!(streaming.sync(Point3::new(0.0, 0.0, 0.0), Dimension::Overworld, &generator, &mut world), 25);
        assert_eq!(streaming.sync(Point3::new(15.9, 3.0, 0.5), Dimension::Overworld, &generator, &mut world), 0);

        // One chunk east: a new column of five.
        assert_eq!(streaming.sync(Point3::new(16.0, 0.0, 0.0), Dimension::Overworld, &generator, &mut world), 5);
        assert_eq!(world.len(), 30);
    }

    #[test]
    fn sync_keeps_resident_chunks_untouched() {
        let mut streaming = StreamingController::new(1, None);
        let mut world = WorldStore::new();
        let mut edited = Chunk::empty(Point2::new(0, 0));
        edited.set(Point3::new(1, 1, 1), BlockType::GLASS);
        world.put(Point2::new(0, 0), edited.clone());

        streaming.sync(Point3::new(0.0, 0.0, 0.0), Dimension::Overworld, &flat_generator(), &mut world);
        assert_eq!(*world.get(Point2::new(0, 0)).unwrap(), edited);
        assert_eq!(world.len(), 9);
    }

    #[test]
    fn sync_fills_in_terrain_under_early_placements() {
        let mut streaming = StreamingController::new(1, None);
        let mut world = WorldStore::new();
        // A placement just past the neighbourhood edge, before the observer walks over.
        let placed = Point3::new(32, 40, 3);
        world.edit_or_create(Point2::new(2, 0), |chunk| chunk.set(placed, BlockType::GLASS));

        let generator = flat_generator();
        streaming.sync(Point3::new(0.0, 0.0, 0.0), Dimension::Overworld, &generator, &mut world);
        assert!(world.needs_terrain(Point2::new(2, 0)));

        let generated = streaming.sync(Point3::new(20.0, 0.0, 0.0), Dimension::Overworld, &generator, &mut world);
        assert_eq!(generated, 3);
        let chunk = world.get(Point2::new(2, 0)).unwrap();
        assert!(!chunk.awaiting_terrain());
        assert_eq!(chunk.get(placed), Some(BlockType::GLASS));
        assert_eq!(chunk.get(Point3::new(32, 15, 3)), Some(BlockType::GRASS));
        assert_eq!(chunk.len(), 16 * 16 * 16 + 1);
    }

    #[test]
    fn far_observer_streams_at_the_coordinate_limit() {
        let mut streaming = StreamingController::new(1, None);
        let mut world = WorldStore::new();
        let generated = streaming.sync(Point3::new(3.0e9, 35.0, -3.0e9), Dimension::Overworld, &flat_generator(), &mut world);

        assert_eq!(generated, 9);
        let center = Point2::new(CHUNK_COORDINATE_LIMIT, -CHUNK_COORDINATE_LIMIT);
        assert_eq!(streaming.center(), Some(center));
        assert!(world.contains(center));
    }

    #[test]
    fn render_distance_is_capped() {
        assert_eq!(StreamingController::new(i32::MAX, None).render_distance(), MAX_RENDER_DISTANCE);
        assert_eq!(StreamingController::new(-3, None).render_distance(), 0);
    }

    #[test]
    fn requests_are_not_duplicated_and_are_cancelled_out_of_range() {
        let mut streaming = StreamingController::new(1, None);
        let world = WorldStore::new();
        let generator = Arc::new(flat_generator());

        let first = streaming.request_missing(Point3::new(0.0, 0.0, 0.0), Dimension::Overworld, 0, &generator, &world);
        assert_eq!(first.len(), 9);
        let again = streaming.request_missing(Point3::new(1.0, 0.0, 1.0), Dimension::Overworld, 0, &generator, &world);
        assert!(again.is_empty());

        // Move three chunks east: every old request is out of range.
        let moved = streaming.request_missing(Point3::new(48.0, 0.0, 0.0), Dimension::Overworld, 0, &generator, &world);
        assert_eq!(moved.len(), 9);
        assert!(first.iter().all(|task| task.is_cancelled()));
        assert!(moved.iter().all(|task| !task.is_cancelled()));
        assert_eq!(streaming.pending_len(), 9);
    }

    #[test]
    fn accept_checks_ticket_and_epoch() {
        let mut streaming = StreamingController::new(0, None);
        let world = WorldStore::new();
        let generator = Arc::new(flat_generator());

        let tasks = streaming.request_missing(Point3::new(0.0, 0.0, 0.0), Dimension::Nether, 4, &generator, &world);
        let ticket = tasks[0].ticket();
        let position = Point2::new(0, 0);

        assert!(!streaming.accept(position, ticket + 1, 4));
        assert!(!streaming.accept(position, ticket, 3));
        assert!(streaming.accept(position, ticket, 4));
        assert!(!streaming.accept(position, ticket, 4));
    }

    #[test]
    fn cancel_all_forgets_everything() {
        let mut streaming = StreamingController::new(1, None);
        let world = WorldStore::new();
        let generator = Arc::new(flat_generator());
        let tasks = streaming.request_missing(Point3::new(0.0, 0.0, 0.0), Dimension::End, 0, &generator, &world);

        streaming.cancel_all();
        assert_eq!(streaming.pending_len(), 0);
        assert_eq!(streaming.center(), None);
        assert!(tasks.iter().all(|task| task.is_cancelled()));
    }

    #[test]
    fn keep_alive_evicts_far_chunks() {
        let mut streaming = StreamingController::new(1, Some(2));
        let mut world = WorldStore::new();
        let generator = flat_generator();

        streaming.sync(Point3::new(0.0, 0.0, 0.0), Dimension::Overworld, &generator, &mut world);
        assert_eq!(world.len(), 9);

        // Observer chunk (3, 0): chunks at x = -1 are now 4 away and go.
        streaming.sync(Point3::new(50.0, 0.0, 0.0), Dimension::Overworld, &generator, &mut world);
        assert!(world.positions().all(|p| chunk_distance(Point2::new(3, 0), p) <= 2));
        assert!(world.contains(Point2::new(1, 0)));
        assert!(!world.contains(Point2::new(0, 0)));
    }

    #[test]
    fn without_keep_alive_nothing_is_evicted() {
        let mut streaming = StreamingController::new(1, None);
        let mut world = WorldStore::new();
        let generator = flat_generator();
        streaming.sync(Point3::new(0.0, 0.0, 0.0), Dimension::Overworld, &generator, &mut world);
        streaming.sync(Point3::new(500.0, 0.0, 0.0), Dimension::Overworld, &generator, &mut world);
        assert_eq!(world.len(), 18);
    }
}
