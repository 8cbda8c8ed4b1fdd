use super::types::{AnalysesRequest, DistanceRequest};
use crate::executor::protocol::AckResponse;
use crate::executor::queue::TaskQueue;
use crate::executor::types::{DistanceMode, Task};

use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

/// Enqueues both the predictor and genotype runs for a sample. The two
/// submissions are independent; the acknowledgement carries the genotype
/// handle (the last one enqueued).
pub async fn handle_analyses(
    Extension(queue): Extension<Arc<TaskQueue>>,
    Json(req): Json<AnalysesRequest>,
) -> (StatusCode, Json<AckResponse>) {
    let predict_id = queue.submit(Task::Predict {
        file: req.file.clone(),
        sample_id: req.sample_id.clone(),
    });
    let genotype_id = queue.submit(Task::Genotype {
        file: req.file,
        sample_id: req.sample_id,
    });

    tracing::info!(
        "Accepted analyses request (predict {}, genotype {})",
        predict_id.0,
        genotype_id.0
    );

    (StatusCode::OK, Json(AckResponse::success(genotype_id)))
}

pub async fn handle_distance(
    Extension(queue): Extension<Arc<TaskQueue>>,
    Json(req): Json<DistanceRequest>,
) -> (StatusCode, Json<AckResponse>) {
    let raw_mode = req.distance_type.as_deref().unwrap_or("all");

    let mode = match DistanceMode::parse(raw_mode) {
        Ok(mode) => mode,
        Err(e) => {
            tracing::warn!("Rejected distance request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(AckResponse::error(e.to_string())),
            );
        }
    };

    let task_id = queue.submit(Task::Distance {
        sample_id: req.sample_id,
        mode,
    });

    (StatusCode::OK, Json(AckResponse::success(task_id)))
}
