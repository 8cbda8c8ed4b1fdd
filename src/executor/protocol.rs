//! Inbound API Contracts
//!
//! Defines the acknowledgement and status DTOs shared by the HTTP handlers.
//! Every successful enqueue is acknowledged with `{"result":"success","taskId"}`
//! and status 200; invalid requests are rejected before any task is enqueued.

use super::types::{TaskId, TaskStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub result: String,
    #[serde(rename = "taskId", skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AckResponse {
    pub fn success(task_id: TaskId) -> Self {
        Self {
            result: "success".to_string(),
            task_id: Some(task_id),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: "error".to_string(),
            task_id: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
    pub status: TaskStatus,
    #[serde(rename = "createdAt")]
    pub created_at: u64,
}
