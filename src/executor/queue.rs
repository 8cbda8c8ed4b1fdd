//! Work Queue
//!
//! Implements the at-least-once queue backing the task dispatcher. Tasks are
//! stored in hash-selected partitions and executed under a lease discipline.
//!
//! ## Responsibilities
//! - **Dispatch**: `submit` assigns a handle, stores a `Queued` entry and
//!   returns synchronously; execution never blocks the caller.
//! - **Leasing**: a worker claims a task by taking a lease, renews it while
//!   the task runs, and finalizes the entry as `Completed` or `Failed`.
//!   A `Running` task whose lease expired is considered abandoned and becomes
//!   claimable again (at-least-once semantics).
//! - **Dedup**: tasks carrying a dedup key are collapsed while an identical
//!   task is still queued or running, so fan-out retries cannot pile up
//!   duplicate work.

use super::types::*;

use anyhow::Result;
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const NUM_PARTITIONS: u32 = 64;
const DEFAULT_LEASE_MS: u64 = 30_000;

/// The central component managing task state.
pub struct TaskQueue {
    /// Local storage for tasks.
    /// Structure: `Partition ID -> Task ID -> TaskEntry`.
    partitions: DashMap<u32, DashMap<TaskId, TaskEntry>>,

    /// Dedup index: active dedup key -> the task currently holding it.
    active_keys: DashMap<String, TaskId>,

    /// Lease duration handed out on claim.
    lease_ms: u64,
}

impl TaskQueue {
    /// Creates a new queue with the default lease duration.
    pub fn new() -> Arc<Self> {
        Self::with_lease_ms(DEFAULT_LEASE_MS)
    }

    /// Creates a queue with an explicit lease duration. Tests use short
    /// leases to exercise expiry without waiting.
    pub fn with_lease_ms(lease_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            partitions: DashMap::new(),
            active_keys: DashMap::new(),
            lease_ms,
        })
    }

    fn partition_of(&self, task_id: &TaskId) -> u32 {
        let mut hasher = DefaultHasher::new();
        task_id.0.hash(&mut hasher);
        (hasher.finish() as u32) % NUM_PARTITIONS
    }

    /// Submits a new task.
    ///
    /// Assigns a fresh handle, stores the entry as `Queued`, and returns
    /// immediately. If the task declares a dedup key and an identical task is
    /// still queued or running, nothing is enqueued and the existing handle
    /// is returned instead.
    pub fn submit(&self, task: Task) -> TaskId {
        if let Some(key) = task.dedup_key() {
            if let Some(existing) = self.active_task_for(&key) {
                tracing::debug!(
                    "Suppressing duplicate {} (already pending as {})",
                    key,
                    existing.0
                );
                return existing;
            }
        }

        let task_id = TaskId::new();
        let partition = self.partition_of(&task_id);
        let key = task.dedup_key();
        let kind = task.kind_name();

        let entry = TaskEntry {
            task,
            status: TaskStatus::Queued,
            created_at: now_ms(),
            lease_expires: None,
        };

        self.partitions
            .entry(partition)
            .or_insert_with(DashMap::new)
            .insert(task_id.clone(), entry);

        if let Some(key) = key {
            self.active_keys.insert(key, task_id.clone());
        }

        tracing::info!("Enqueued {} task {}", kind, task_id.0);
        task_id
    }

    /// Resolves a dedup key to its task if that task is still in flight.
    /// Stale index entries left behind by terminal tasks are dropped.
    fn active_task_for(&self, key: &str) -> Option<TaskId> {
        let task_id = self.active_keys.get(key)?.value().clone();
        match self.get(&task_id) {
            Some(entry) if matches!(entry.status, TaskStatus::Queued | TaskStatus::Running) => {
                Some(task_id)
            }
            _ => {
                self.active_keys.remove(key);
                None
            }
        }
    }

    /// Retrieves all tasks eligible for execution.
    ///
    /// Eligible tasks are:
    /// 1. Status is `Queued`.
    /// 2. Status is `Running` BUT the lease has expired (worker crashed).
    pub fn claimable_tasks(&self) -> Vec<(TaskId, TaskEntry)> {
        let mut tasks = Vec::new();

        for partition in self.partitions.iter() {
            for entry in partition.value().iter() {
                let task_entry = entry.value();

                let is_available = match task_entry.status {
                    TaskStatus::Queued => true,
                    // Lease expiration check
                    TaskStatus::Running => match task_entry.lease_expires {
                        Some(lease) => now_ms() > lease,
                        None => false,
                    },
                    _ => false,
                };

                if is_available {
                    tasks.push((entry.key().clone(), task_entry.clone()));
                }
            }
        }

        tasks
    }

    /// Attempts to lock a task for execution by a worker.
    ///
    /// Sets the task status to `Running` and establishes a **lease**. If the
    /// worker dies, the lease expires and the task becomes claimable again.
    /// Returns `false` if another worker holds the task or it already reached
    /// a terminal state.
    pub fn try_claim_task(&self, task_id: &TaskId) -> bool {
        let partition = self.partition_of(task_id);

        if let Some(partition_map) = self.partitions.get(&partition) {
            if let Some(mut entry) = partition_map.get_mut(task_id) {
                let claimable = match entry.status {
                    TaskStatus::Queued => true,
                    // Abandoned by a crashed worker
                    TaskStatus::Running => match entry.lease_expires {
                        Some(lease) => now_ms() > lease,
                        None => false,
                    },
                    _ => false,
                };

                if !claimable {
                    return false;
                }

                entry.status = TaskStatus::Running;
                entry.lease_expires = Some(now_ms() + self.lease_ms);

                tracing::debug!("Claimed task {}", task_id.0);
                return true;
            }
        }

        false
    }

    /// Extends the lease of a currently running task.
    /// Called periodically by the worker to prevent lease expiry mid-execution.
    pub fn renew_lease(&self, task_id: &TaskId) -> Result<()> {
        let partition = self.partition_of(task_id);

        if let Some(partition_map) = self.partitions.get(&partition) {
            if let Some(mut entry) = partition_map.get_mut(task_id) {
                if entry.status == TaskStatus::Running {
                    entry.lease_expires = Some(now_ms() + self.lease_ms);
                    tracing::trace!("Renewed lease for task {}", task_id.0);
                    return Ok(());
                } else {
                    return Err(anyhow::anyhow!(
                        "Task not running (status: {:?})",
                        entry.status
                    ));
                }
            }
        }

        Err(anyhow::anyhow!("Task not found"))
    }

    /// Marks a task as either `Completed` or `Failed` and clears the lease.
    /// Releases the task's dedup key so future identical work can be enqueued.
    pub fn complete_task(&self, task_id: &TaskId, result: Result<()>) -> Result<()> {
        let partition = self.partition_of(task_id);

        let Some(partition_map) = self.partitions.get(&partition) else {
            return Err(anyhow::anyhow!("Task not found"));
        };

        let released_key;
        {
            let Some(mut entry) = partition_map.get_mut(task_id) else {
                return Err(anyhow::anyhow!("Task not found"));
            };

            match result {
                Ok(_) => {
                    entry.status = TaskStatus::Completed;
                    tracing::info!("Task {} completed", task_id.0);
                }
                Err(e) => {
                    entry.status = TaskStatus::Failed {
                        error: e.to_string(),
                    };
                    tracing::error!("Task {} failed: {}", task_id.0, e);
                }
            }
            entry.lease_expires = None;
            released_key = entry.task.dedup_key();
        }

        if let Some(key) = released_key {
            self.active_keys
                .remove_if(&key, |_, holder| holder == task_id);
        }

        Ok(())
    }

    /// Retrieves a task's details.
    pub fn get(&self, task_id: &TaskId) -> Option<TaskEntry> {
        let partition = self.partition_of(task_id);

        if let Some(partition_map) = self.partitions.get(&partition) {
            if let Some(entry) = partition_map.get(task_id) {
                return Some(entry.clone());
            }
        }

        None
    }

    pub fn task_count(&self) -> usize {
        self.partitions
            .iter()
            .map(|entry| entry.value().len())
            .sum()
    }

    pub fn status_counts(&self) -> (usize, usize, usize, usize) {
        let mut queued = 0;
        let mut running = 0;
        let mut completed = 0;
        let mut failed = 0;

        for partition in self.partitions.iter() {
            for entry in partition.value().iter() {
                match entry.status {
                    TaskStatus::Queued => queued += 1,
                    TaskStatus::Running => running += 1,
                    TaskStatus::Completed => completed += 1,
                    TaskStatus::Failed { .. } => failed += 1,
                }
            }
        }

        (queued, running, completed, failed)
    }
}
