//! Analysis Request DTOs

use serde::Deserialize;

/// Body of `POST /analyses`: a sample file to run both the predictor and the
/// genotyper on. Missing fields are rejected before anything is enqueued.
#[derive(Debug, Deserialize)]
pub struct AnalysesRequest {
    pub file: String,
    #[serde(rename = "sampleId")]
    pub sample_id: String,
}

/// Body of `POST /distance`. The distance type defaults to `all` and must be
/// one of the closed mode set.
#[derive(Debug, Deserialize)]
pub struct DistanceRequest {
    #[serde(rename = "sampleId")]
    pub sample_id: String,
    #[serde(rename = "distanceType")]
    pub distance_type: Option<String>,
}
