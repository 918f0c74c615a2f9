//! # Task Management System
//!
//! This module provides a worker-pool task manager for executing work such as chunk
//! generation off the main thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, applied on the main thread
//! - `TaskChannel`: Communication channel between the main thread and one worker
//!
//! Each worker is an OS thread fed through its own channel. Tasks are handed out
//! round-robin with at most `MAX_TASKS_IN_FLIGHT` per worker; anything beyond that
//! waits in a FIFO queue on the main thread. Cancelled tasks are dropped from the
//! queue instead of being sent.
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(4);
//! task_manager.publish_task(Box::new(MyTask::new()));
//!
//! // In the engine loop:
//! task_manager.process_completed_tasks(&mut context);
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use task::{Task, TaskContext, TaskResult};

/// A communication channel between the main thread and a worker thread.
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    /// Cleared once the worker has gone away (e.g. a task panicked).
    alive: bool,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// Dropping the manager closes every task channel, which ends the worker loops.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Keeping this at 1 leaves queued work on the main thread, where it can still be
/// cancelled cheaply.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// A worker that fails to spawn is logged and left out, so the pool may be smaller
    /// than requested; check `worker_count()`. With zero workers every published task
    /// stays queued.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        log::info!(
            "Starting {} chunk workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            match thread::Builder::new()
                .name(format!("chunk-worker-{index}"))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    alive: true,
                    _worker: worker,
                }),
                Err(err) => log::error!("Failed to spawn chunk worker {index}: {err}"),
            }
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of live workers.
    pub fn worker_count(&self) -> usize {
        self.channels.iter().filter(|channel| channel.alive).count()
    }

    /// Tasks sent to workers whose results have not been handled yet.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .filter(|channel| channel.alive)
            .map(|channel| channel.num_tasks_in_flight)
            .sum()
    }

    /// Tasks waiting for a free worker.
    pub fn queued_len(&self) -> usize {
        self.queued_tasks.len()
    }

    /// No queued work and nothing in flight.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.tasks_in_flight() == 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the worker has disconnected; the channel is marked dead
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => {
                log::warn!("Chunk worker {channel_idx} disconnected");
                channel.alive = false;
                Err(err.0)
            }
        }
    }

    /// Finds an available worker channel, round-robin from the last used one.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|offset| (self.current_channel + offset) % len)
            .find(|&index| {
                let channel = &self.channels[index];
                channel.alive && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
            })
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, mut task: Box<dyn Task + Send>) -> bool {
        while let Some(channel_idx) = self.find_available_channel() {
            match self.try_send_task(task, channel_idx) {
                Ok(()) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    return true;
                }
                // Dead channel: try the next one.
                Err(returned) => task = returned,
            }
        }
        self.queued_tasks.push_back(task);
        false
    }

    /// Hands queued tasks to free workers, oldest first, dropping cancelled ones.
    pub fn process_queued_tasks(&mut self) {
        let before = self.queued_tasks.len();
        self.queued_tasks.retain(|task| !task.is_cancelled());
        let dropped = before - self.queued_tasks.len();
        if dropped > 0 {
            log::debug!("Dropped {dropped} cancelled tasks from the queue");
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Applies every completed result on the calling (main) thread.
    ///
    /// Follow-up tasks returned by the results are published afterwards.
    ///
    /// # Returns
    /// The number of results handled.
    pub fn process_completed_tasks(&mut self, context: &mut TaskContext<'_>) -> usize {
        let mut tasks_to_queue = Vec::new();
        let mut handled = 0;

        for (index, channel) in self.channels.iter_mut().enumerate() {
            if !channel.alive {
                continue;
            }
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        handled += 1;
                        tasks_to_queue.extend(result.handle_result(context));
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        log::error!(
                            "Chunk worker {index} stopped with {} tasks in flight",
                            channel.num_tasks_in_flight
                        );
                        channel.alive = false;
                        channel.num_tasks_in_flight = 0;
                        break;
                    }
                }
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::core::MtResource;
    use crate::engine_state::voxels::streaming::StreamingController;
    use crate::engine_state::voxels::world::WorldStore;

    struct CountingTask {
        runs: Arc<AtomicUsize>,
        cancelled: Arc<AtomicBool>,
        follow_up: bool,
    }

    struct CountingResult {
        runs: Arc<AtomicUsize>,
        follow_up: bool,
    }

    impl Task for CountingTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingResult {
                runs: self.runs.clone(),
                follow_up: self.follow_up,
            })
        }

        fn is_cancelled(&self) -> bool {
            self.cancelled.load(Ordering::SeqCst)
        }
    }

    impl TaskResult for CountingResult {
        fn handle_result(self: Box<Self>, _context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
            if self.follow_up {
                vec![Box::new(CountingTask {
                    runs: self.runs.clone(),
                    cancelled: Arc::new(AtomicBool::new(false)),
                    follow_up: false,
                })]
            } else {
                Vec::new()
            }
        }
    }

    fn drain(manager: &mut TaskManager) -> usize {
        let world = MtResource::new(WorldStore::new());
        let mut streaming = StreamingController::new(1, None);
        let mut handled = 0;
        for _ in 0..2000 {
            manager.process_queued_tasks();
            let mut context = TaskContext {
                world: &world,
                streaming: &mut streaming,
                epoch: 0,
            };
            handled += manager.process_completed_tasks(&mut context);
            if manager.is_idle() {
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        handled
    }

    #[test]
    fn tasks_run_and_follow_ups_are_scheduled() {
        let mut manager = TaskManager::new(2);
        assert_eq!(manager.worker_count(), 2);
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            manager.publish_task(Box::new(CountingTask {
                runs: runs.clone(),
                cancelled: Arc::new(AtomicBool::new(false)),
                follow_up: true,
            }));
        }
        assert!(manager.queued_len() >= 3);

        let handled = drain(&mut manager);
        assert_eq!(handled, 10);
        assert_eq!(runs.load(Ordering::SeqCst), 10);
        assert!(manager.is_idle());
    }

    #[test]
    fn cancelled_queued_tasks_never_run() {
        let mut manager = TaskManager::new(1);
        let runs = Arc::new(AtomicUsize::new(0));
        let cancel = Arc::new(AtomicBool::new(false));

        // The first task occupies the only worker; the rest queue up.
        for _ in 0..4 {
            manager.publish_task(Box::new(CountingTask {
                runs: runs.clone(),
                cancelled: cancel.clone(),
                follow_up: false,
            }));
        }
        assert_eq!(manager.queued_len(), 3);
        cancel.store(true, Ordering::SeqCst);

        drain(&mut manager);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn without_workers_tasks_stay_queued() {
        let mut manager = TaskManager::new(0);
        let published = manager.publish_task(Box::new(CountingTask {
            runs: Arc::new(AtomicUsize::new(0)),
            cancelled: Arc::new(AtomicBool::new(false)),
            follow_up: false,
        }));
        assert!(!published);
        manager.process_queued_tasks();
        assert_eq!(manager.queued_len(), 1);
        assert!(!manager.is_idle());
    }
}
