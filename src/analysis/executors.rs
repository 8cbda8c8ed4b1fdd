//! Predict / Genotype / Distance Executors
//!
//! Each executor is an async function of (payload, collaborators) that runs
//! one analysis and hands the result to the publisher. Only the genotype
//! executor has a side effect beyond publishing: it inserts the new genotype
//! into the distance store and fans out the two follow-up distance tasks.

use crate::executor::executor::ExecutorContext;
use crate::executor::queue::TaskQueue;
use crate::executor::types::{DistanceMode, Task};
use crate::report::publisher::Delivery;

use anyhow::Result;

pub async fn predict(ctx: &ExecutorContext, file: &str, sample_id: &str) -> Result<()> {
    let results = ctx.predictor.run_predictor(file, sample_id).await?;

    ctx.publisher.publish(
        "predictor",
        results,
        &format!("experiments/{}/results", sample_id),
        None,
        Delivery::Create,
    );

    Ok(())
}

/// Runs the genotyper, then makes the sample visible to distance queries, and
/// only then enqueues the follow-up distance work. The ordering matters: the
/// fan-out tasks must find the new sample already ingested.
pub async fn genotype(
    ctx: &ExecutorContext,
    queue: &TaskQueue,
    file: &str,
    sample_id: &str,
) -> Result<()> {
    let results = ctx.predictor.run_genotype(file, sample_id).await?;

    ctx.publisher.publish(
        "genotype",
        results.clone(),
        &format!("experiments/{}/results", sample_id),
        None,
        Delivery::Create,
    );

    ctx.distance_store.insert(&results).await?;

    let tree_task = queue.submit(Task::Distance {
        sample_id: sample_id.to_string(),
        mode: DistanceMode::TreeDistance,
    });
    let neighbour_task = queue.submit(Task::Distance {
        sample_id: sample_id.to_string(),
        mode: DistanceMode::NearestNeighbour,
    });

    tracing::info!(
        "Genotype for {} triggered distance tasks {} and {}",
        sample_id,
        tree_task.0,
        neighbour_task.0
    );

    Ok(())
}

/// Number of rows kept by nearest-neighbour queries.
const NEAREST_NEIGHBOUR_LIMIT: usize = 10;

pub async fn distance(ctx: &ExecutorContext, sample_id: &str, mode: DistanceMode) -> Result<()> {
    let mut neighbours = ctx.distance_store.distances(sample_id).await?;

    if mode == DistanceMode::TreeDistance {
        // Restrict to the sample set present in the reference tree
        neighbours.retain(|n| ctx.tree_index.contains(&n.sample_id));
    }

    neighbours.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    if mode == DistanceMode::NearestNeighbour {
        neighbours.truncate(NEAREST_NEIGHBOUR_LIMIT);
    }

    let results = serde_json::to_value(&neighbours)?;

    ctx.publisher.publish(
        "distance",
        results,
        &format!("experiments/{}/results", sample_id),
        Some(mode.as_str()),
        Delivery::Create,
    );

    Ok(())
}
