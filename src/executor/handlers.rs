use super::protocol::*;
use super::queue::TaskQueue;
use super::types::*;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use std::sync::Arc;

pub async fn handle_get_task_status(
    Extension(queue): Extension<Arc<TaskQueue>>,
    Path(task_id_str): Path<String>,
) -> (StatusCode, Json<Option<TaskStatusResponse>>) {
    let task_id = TaskId(task_id_str);

    match queue.get(&task_id) {
        Some(entry) => {
            tracing::debug!("Task status query: {} -> {:?}", task_id.0, entry.status);
            (
                StatusCode::OK,
                Json(Some(TaskStatusResponse {
                    task_id,
                    status: entry.status,
                    created_at: entry.created_at,
                })),
            )
        }
        None => {
            tracing::debug!("Task not found: {}", task_id.0);
            (StatusCode::NOT_FOUND, Json(None))
        }
    }
}
