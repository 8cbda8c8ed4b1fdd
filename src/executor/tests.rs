//! Executor Module Tests
//!
//! ## Test Scopes
//! - **Queue lifecycle**: submit, claim, lease renewal/expiry, completion.
//! - **Dedup**: suppression of duplicate fan-out work while identical tasks
//!   are still in flight.
//! - **Data Types**: wire-format checks for task entries and mode parsing.

#[cfg(test)]
mod tests {
    use crate::executor::queue::TaskQueue;
    use crate::executor::types::{DistanceMode, SearchKind, Task, TaskEntry, TaskId, TaskStatus};

    fn predict_task(sample: &str) -> Task {
        Task::Predict {
            file: format!("/data/{}.fastq", sample),
            sample_id: sample.to_string(),
        }
    }

    fn distance_task(sample: &str, mode: DistanceMode) -> Task {
        Task::Distance {
            sample_id: sample.to_string(),
            mode,
        }
    }

    // ============================================================
    // Queue lifecycle
    // ============================================================

    #[test]
    fn test_submit_stores_queued_entry() {
        let queue = TaskQueue::new();

        let task_id = queue.submit(predict_task("s1"));

        let entry = queue.get(&task_id).expect("task should be stored");
        assert_eq!(entry.status, TaskStatus::Queued);
        assert!(entry.created_at > 0);
        assert!(entry.lease_expires.is_none());
        assert_eq!(queue.task_count(), 1);
    }

    #[test]
    fn test_claim_is_exclusive() {
        let queue = TaskQueue::new();
        let task_id = queue.submit(predict_task("s1"));

        assert!(queue.try_claim_task(&task_id));
        let entry = queue.get(&task_id).unwrap();
        assert_eq!(entry.status, TaskStatus::Running);
        assert!(entry.lease_expires.is_some());

        // A second worker must not get the same task
        assert!(!queue.try_claim_task(&task_id));
    }

    #[test]
    fn test_complete_ok_is_terminal() {
        let queue = TaskQueue::new();
        let task_id = queue.submit(predict_task("s1"));
        queue.try_claim_task(&task_id);

        queue.complete_task(&task_id, Ok(())).unwrap();

        let entry = queue.get(&task_id).unwrap();
        assert_eq!(entry.status, TaskStatus::Completed);
        assert!(entry.lease_expires.is_none());
        assert!(!queue.try_claim_task(&task_id));
        assert!(queue.claimable_tasks().is_empty());
    }

    #[test]
    fn test_complete_err_marks_failed_without_retry() {
        let queue = TaskQueue::new();
        let task_id = queue.submit(predict_task("s1"));
        queue.try_claim_task(&task_id);

        queue
            .complete_task(&task_id, Err(anyhow::anyhow!("collaborator blew up")))
            .unwrap();

        let entry = queue.get(&task_id).unwrap();
        assert_eq!(
            entry.status,
            TaskStatus::Failed {
                error: "collaborator blew up".to_string()
            }
        );
        // Failed is final: the task never becomes claimable again
        assert!(queue.claimable_tasks().is_empty());
        assert!(!queue.try_claim_task(&task_id));
    }

    #[tokio::test]
    async fn test_expired_lease_makes_task_claimable_again() {
        let queue = TaskQueue::with_lease_ms(50);
        let task_id = queue.submit(predict_task("s1"));

        assert!(queue.try_claim_task(&task_id));
        assert!(queue.claimable_tasks().is_empty());

        tokio::time::sleep(std::time::Duration::from_millis(80)).await;

        let claimable = queue.claimable_tasks();
        assert_eq!(claimable.len(), 1);
        assert_eq!(claimable[0].0, task_id);
        assert!(queue.try_claim_task(&task_id));
    }

    #[test]
    fn test_renew_lease_requires_running_task() {
        let queue = TaskQueue::new();
        let task_id = queue.submit(predict_task("s1"));

        assert!(queue.renew_lease(&task_id).is_err());

        queue.try_claim_task(&task_id);
        assert!(queue.renew_lease(&task_id).is_ok());

        assert!(queue.renew_lease(&TaskId::new()).is_err());
    }

    // ============================================================
    // Fan-out dedup
    // ============================================================

    #[test]
    fn test_duplicate_distance_task_is_suppressed() {
        let queue = TaskQueue::new();

        let first = queue.submit(distance_task("s1", DistanceMode::TreeDistance));
        let second = queue.submit(distance_task("s1", DistanceMode::TreeDistance));

        assert_eq!(first, second);
        assert_eq!(queue.task_count(), 1);
    }

    #[test]
    fn test_distinct_modes_are_not_collapsed() {
        let queue = TaskQueue::new();

        let tree = queue.submit(distance_task("s1", DistanceMode::TreeDistance));
        let neighbour = queue.submit(distance_task("s1", DistanceMode::NearestNeighbour));

        assert_ne!(tree, neighbour);
        assert_eq!(queue.task_count(), 2);
    }

    #[test]
    fn test_dedup_key_released_after_terminal_state() {
        let queue = TaskQueue::new();

        let first = queue.submit(distance_task("s1", DistanceMode::NearestNeighbour));
        queue.try_claim_task(&first);
        queue.complete_task(&first, Ok(())).unwrap();

        let second = queue.submit(distance_task("s1", DistanceMode::NearestNeighbour));
        assert_ne!(first, second);
        assert_eq!(queue.task_count(), 2);
    }

    #[test]
    fn test_dedup_key_released_after_failure() {
        let queue = TaskQueue::new();

        let first = queue.submit(distance_task("s1", DistanceMode::All));
        queue.try_claim_task(&first);
        queue
            .complete_task(&first, Err(anyhow::anyhow!("boom")))
            .unwrap();

        let second = queue.submit(distance_task("s1", DistanceMode::All));
        assert_ne!(first, second);
    }

    #[test]
    fn test_non_distance_tasks_are_never_deduplicated() {
        let queue = TaskQueue::new();

        let first = queue.submit(predict_task("s1"));
        let second = queue.submit(predict_task("s1"));

        assert_ne!(first, second);
        assert_eq!(queue.task_count(), 2);
    }

    // ============================================================
    // Data types
    // ============================================================

    #[test]
    fn test_task_id_is_unique() {
        let id1 = TaskId::new();
        let id2 = TaskId::new();

        assert_ne!(id1.0, id2.0);
    }

    #[test]
    fn test_distance_mode_parse() {
        assert_eq!(DistanceMode::parse("all").unwrap(), DistanceMode::All);
        assert_eq!(
            DistanceMode::parse("tree-distance").unwrap(),
            DistanceMode::TreeDistance
        );
        assert_eq!(
            DistanceMode::parse("nearest-neighbour").unwrap(),
            DistanceMode::NearestNeighbour
        );

        let err = DistanceMode::parse("nearest").unwrap_err();
        assert!(err.to_string().contains("not a valid distance type"));
    }

    #[test]
    fn test_search_kind_parse() {
        assert_eq!(SearchKind::parse("sequence").unwrap(), SearchKind::Sequence);
        assert_eq!(
            SearchKind::parse("dna-variant").unwrap(),
            SearchKind::DnaVariant
        );
        assert_eq!(
            SearchKind::parse("protein-variant").unwrap(),
            SearchKind::ProteinVariant
        );
        assert!(SearchKind::parse("rna-variant").is_err());
    }

    #[test]
    fn test_task_entry_serialization() {
        let entry = TaskEntry {
            task: Task::Distance {
                sample_id: "s1".to_string(),
                mode: DistanceMode::NearestNeighbour,
            },
            status: TaskStatus::Queued,
            created_at: crate::executor::types::now_ms(),
            lease_expires: None,
        };

        let json = serde_json::to_value(&entry).expect("Serialization failed");
        assert_eq!(json["task"]["kind"], "distance");
        assert_eq!(json["task"]["mode"], "nearest-neighbour");

        let restored: TaskEntry = serde_json::from_value(json).expect("Deserialization failed");
        assert_eq!(restored.status, TaskStatus::Queued);
        match restored.task {
            Task::Distance { sample_id, mode } => {
                assert_eq!(sample_id, "s1");
                assert_eq!(mode, DistanceMode::NearestNeighbour);
            }
            other => panic!("Wrong task kind: {:?}", other),
        }
    }
}
