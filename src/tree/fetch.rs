use crate::executor::executor::ExecutorContext;
use crate::report::publisher::Delivery;

use anyhow::Result;
use serde_json::Value;

/// Runs a tree fetch: resolves the requested version, loads the document as a
/// single line, and reports it to the tree collection. Returns the result so
/// the synchronous `/tree/{version}` route can answer inline.
pub async fn run_tree_fetch(ctx: &ExecutorContext, version: &str) -> Result<Value> {
    let (resolved, document) = ctx.tree_versions.load_document(version).await?;

    let results = serde_json::json!({
        "tree": document,
        "version": resolved,
    });

    ctx.publisher
        .publish("tree", results.clone(), "trees", None, Delivery::Create);

    Ok(results)
}
