//! Worker Pool Implementation
//!
//! Manages the lifecycle of task execution. It spawns background workers that
//! continuously poll the `TaskQueue` for claimable tasks.
//!
//! ## Responsibilities
//! - **Polling**: continuously checking for `Queued` (or lease-expired) tasks.
//! - **Lease Management**: spawns a sidecar task that renews the lease during
//!   long-running analyses.
//! - **Dispatch**: one executor per task kind, selected by an exhaustive match
//!   so an unknown kind cannot exist past compilation.

use super::queue::TaskQueue;
use super::types::*;
use crate::analysis::collaborators::{DistanceStore, Predictor};
use crate::analysis::executors;
use crate::report::publisher::Publisher;
use crate::search::bigsi;
use crate::search::index::SearchIndex;
use crate::tree::fetch::run_tree_fetch;
use crate::tree::samples::TreeIndex;
use crate::tree::version::TreeVersions;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Everything an executor needs besides its own payload: the external
/// analysis collaborators, the read-only tree state built at startup, and the
/// outbound result publisher.
pub struct ExecutorContext {
    pub predictor: Arc<dyn Predictor>,
    pub distance_store: Arc<dyn DistanceStore>,
    pub search_index: Arc<dyn SearchIndex>,
    pub tree_versions: Arc<TreeVersions>,
    pub tree_index: Arc<TreeIndex>,
    pub publisher: Publisher,
}

/// The engine that drives task execution.
pub struct TaskExecutor {
    /// Reference to the queue (source of tasks).
    queue: Arc<TaskQueue>,
    /// Collaborators and shared state handed to every executor.
    ctx: Arc<ExecutorContext>,
    /// Number of concurrent workers.
    worker_count: usize,
}

impl TaskExecutor {
    pub fn new(
        queue: Arc<TaskQueue>,
        ctx: Arc<ExecutorContext>,
        worker_count: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue,
            ctx,
            worker_count,
        })
    }

    /// Spawns the workers and returns immediately.
    /// Each worker runs independently in an infinite loop.
    pub async fn start(self: Arc<Self>) {
        tracing::info!("Starting {} task workers", self.worker_count);

        for worker_id in 0..self.worker_count {
            let executor = self.clone();
            tokio::spawn(async move {
                executor.worker_loop(worker_id).await;
            });
        }

        tracing::info!("Task executor started with {} workers", self.worker_count);
    }

    /// The main loop for a single worker.
    ///
    /// 1. Fetches claimable tasks.
    /// 2. Attempts to "claim" one (atomic state change).
    /// 3. If claimed, executes the task while maintaining a liveness lease.
    async fn worker_loop(&self, worker_id: usize) {
        tracing::info!("Worker {} started", worker_id);

        loop {
            let tasks = self.queue.claimable_tasks();

            if tasks.is_empty() {
                // Sleep if no work to avoid busy-waiting
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }

            tracing::trace!("Worker {} found {} available tasks", worker_id, tasks.len());

            let mut claimed = false;
            for (task_id, entry) in tasks {
                if self.queue.try_claim_task(&task_id) {
                    tracing::info!(
                        "Worker {} claimed {} task {}",
                        worker_id,
                        entry.task.kind_name(),
                        task_id.0
                    );

                    self.execute_with_lease(&task_id, entry.task).await;

                    claimed = true;
                    break; // Refresh the task list before claiming again
                }

                tracing::trace!("Task {} already claimed by another worker", task_id.0);
            }

            // If we didn't successfully claim anything in the list, wait briefly
            if !claimed {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }

    /// Wraps the actual execution with lease management.
    ///
    /// Spawns a sidecar task that renews the lease every 10 seconds. If the
    /// worker hangs or dies, renewal stops and the task eventually expires
    /// (becomes available again).
    async fn execute_with_lease(&self, task_id: &TaskId, task: Task) {
        let renewal_handle = self.spawn_lease_renewal(task_id);

        let result = self.run_task(&task).await;

        renewal_handle.abort();

        if let Err(e) = self.queue.complete_task(task_id, result) {
            tracing::error!("Failed to complete task {}: {}", task_id.0, e);
        }
    }

    fn spawn_lease_renewal(&self, task_id: &TaskId) -> tokio::task::JoinHandle<()> {
        let queue = self.queue.clone();
        let task_id = task_id.clone();

        tokio::spawn(async move {
            loop {
                // Renew every 10s (lease duration is 30s)
                tokio::time::sleep(Duration::from_secs(10)).await;

                if queue.renew_lease(&task_id).is_err() {
                    // Task finished or was reassigned
                    tracing::trace!("Task {} no longer needs lease renewal", task_id.0);
                    break;
                }
            }
        })
    }

    /// Dispatches to the executor matching the task kind.
    async fn run_task(&self, task: &Task) -> Result<()> {
        match task {
            Task::Predict { file, sample_id } => {
                executors::predict(&self.ctx, file, sample_id).await
            }
            Task::Genotype { file, sample_id } => {
                executors::genotype(&self.ctx, &self.queue, file, sample_id).await
            }
            Task::Distance { sample_id, mode } => {
                executors::distance(&self.ctx, sample_id, *mode).await
            }
            Task::BigsiSearch { search_kind, query } => {
                bigsi::run_search(&self.ctx, *search_kind, query).await
            }
            Task::TreeFetch { version } => run_tree_fetch(&self.ctx, version).await.map(|_| ()),
        }
    }
}
