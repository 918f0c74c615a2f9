//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which executes work on background threads and applies the results on the
//! engine's main thread.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread with a `TaskContext`
//! 5. The result can spawn follow-up tasks
//!
//! Workers never touch the world store. Only `handle_result`, running on the main
//! thread, writes to it, which keeps the store single-writer.

use crate::core::MtResource;
use crate::engine_state::voxels::streaming::StreamingController;
use crate::engine_state::voxels::world::WorldStore;

/// Main-thread state a task result may read or update.
pub struct TaskContext<'a> {
    /// The shared world store.
    pub world: &'a MtResource<WorldStore>,
    /// Pending-request bookkeeping, used to reject stale results.
    pub streaming: &'a mut StreamingController,
    /// Current dimension epoch.
    pub epoch: u64,
}

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should own all the data they need. A task that was cancelled before a worker
/// picked it up is dropped without running.
pub trait Task: Send {
    /// Performs the work on a worker thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;

    /// Whether the task no longer needs to run.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// The result of processing a `Task`, applied on the main thread.
pub trait TaskResult: Send {
    /// Applies the result.
    ///
    /// # Returns
    /// Follow-up tasks to schedule (can be empty).
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>>;
}
