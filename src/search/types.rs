//! Search Request DTOs

use serde::Deserialize;

/// Body of `POST /search`: a search kind and the query object forwarded to
/// the index. The query must carry `userId` and `resultId` for callback
/// addressing.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub query: serde_json::Value,
}
