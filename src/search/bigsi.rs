//! BIGSI Search Executor
//!
//! Dispatches a search task to the matching index routine. The callback
//! address for the result is taken from the query object itself
//! (`userId`/`resultId`); the fingerprint is diagnostic only.

use super::fingerprint::fingerprint;
use crate::executor::executor::ExecutorContext;
use crate::executor::types::SearchKind;
use crate::report::publisher::Delivery;

use anyhow::Result;
use serde_json::Value;

pub async fn run_search(ctx: &ExecutorContext, kind: SearchKind, query: &Value) -> Result<()> {
    let query_id = fingerprint(query);
    tracing::info!("Running {} search (query {})", kind.as_str(), query_id);

    let results = match kind {
        SearchKind::Sequence => ctx.search_index.sequence_query(query).await?,
        SearchKind::DnaVariant => ctx.search_index.dna_variant_query(query).await?,
        SearchKind::ProteinVariant => ctx.search_index.protein_variant_query(query).await?,
    };

    let user_id = query
        .get("userId")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("search query is missing userId"))?;
    let result_id = query
        .get("resultId")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("search query is missing resultId"))?;

    let out = serde_json::json!({
        "results": results,
        "query": query,
    });

    // The result slot was pre-allocated by the reporting API, so this is a
    // replacement rather than an append.
    ctx.publisher.publish(
        kind.as_str(),
        out,
        &format!("users/{}/results/{}", user_id, result_id),
        None,
        Delivery::Replace,
    );

    Ok(())
}
