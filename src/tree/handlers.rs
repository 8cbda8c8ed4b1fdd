use super::fetch::run_tree_fetch;
use crate::executor::executor::ExecutorContext;
use crate::executor::protocol::AckResponse;

use axum::response::IntoResponse;
use axum::{extract::Path, http::StatusCode, Extension, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub result: serde_json::Value,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Unlike the other routes this one executes inline: the tree document is
/// local and small, so the response carries the result itself rather than a
/// task handle.
pub async fn handle_tree(
    Extension(ctx): Extension<Arc<ExecutorContext>>,
    Path(version): Path<String>,
) -> axum::response::Response {
    match run_tree_fetch(&ctx, &version).await {
        Ok(results) => (
            StatusCode::OK,
            Json(TreeResponse {
                result: results,
                kind: "tree".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Tree fetch for version {} failed: {}", version, e);
            (
                StatusCode::BAD_REQUEST,
                Json(AckResponse::error(e.to_string())),
            )
                .into_response()
        }
    }
}
