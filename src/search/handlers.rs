use super::types::SearchRequest;
use crate::executor::protocol::AckResponse;
use crate::executor::queue::TaskQueue;
use crate::executor::types::{SearchKind, Task};

use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

pub async fn handle_search(
    Extension(queue): Extension<Arc<TaskQueue>>,
    Json(req): Json<SearchRequest>,
) -> (StatusCode, Json<AckResponse>) {
    let kind = match SearchKind::parse(&req.kind) {
        Ok(kind) => kind,
        Err(e) => {
            tracing::warn!("Rejected search request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(AckResponse::error(e.to_string())),
            );
        }
    };

    let task_id = queue.submit(Task::BigsiSearch {
        search_kind: kind,
        query: req.query,
    });

    (StatusCode::OK, Json(AckResponse::success(task_id)))
}
