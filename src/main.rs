use atlas_analysis::analysis::collaborators::{HttpDistanceStore, MykrobePredictor};
use atlas_analysis::analysis::handlers::{handle_analyses, handle_distance};
use atlas_analysis::config::Config;
use atlas_analysis::executor::executor::{ExecutorContext, TaskExecutor};
use atlas_analysis::executor::handlers::handle_get_task_status;
use atlas_analysis::executor::queue::TaskQueue;
use atlas_analysis::report::publisher::{check_base_url, Publisher};
use atlas_analysis::search::handlers::handle_search;
use atlas_analysis::search::index::BigsiCli;
use atlas_analysis::tree::handlers::handle_tree;
use atlas_analysis::tree::samples::TreeIndex;
use atlas_analysis::tree::version::TreeVersions;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::from_env()?;
    check_base_url(&config.atlas_api)?;
    tracing::info!("Reporting API: {}", config.atlas_api);

    // 1. Read-only tree state, built once and shared with every worker:
    let tree_versions = Arc::new(TreeVersions::new(config.tree_paths.clone()));
    let tree_index = Arc::new(TreeIndex::load(&tree_versions).await?);

    // 2. Outbound delivery:
    let publisher = Publisher::spawn(config.atlas_api.clone(), config.delivery_attempts);

    // 3. Collaborators and the worker pool:
    let ctx = Arc::new(ExecutorContext {
        predictor: Arc::new(MykrobePredictor::new(config.default_outdir.clone())),
        distance_store: Arc::new(HttpDistanceStore::new(config.distance_api.clone())),
        search_index: Arc::new(BigsiCli::new(
            config.bigsi_db_path.clone(),
            config.tb_reference_path.clone(),
            config.tb_genbank_path.clone(),
        )),
        tree_versions: tree_versions.clone(),
        tree_index,
        publisher,
    });

    let queue = TaskQueue::new();
    let executor = TaskExecutor::new(queue.clone(), ctx.clone(), config.worker_count);
    executor.start().await;

    // 4. HTTP Router:
    let app = Router::new()
        .route("/analyses", post(handle_analyses))
        .route("/search", post(handle_search))
        .route("/distance", post(handle_distance))
        .route("/tree/:version", get(handle_tree))
        .route("/task/status/:id", get(handle_get_task_status))
        .layer(Extension(queue.clone()))
        .layer(Extension(ctx));

    // 5. Spawn stats reporter:
    let stats_queue = queue.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));

        loop {
            interval.tick().await;
            let (queued, running, completed, failed) = stats_queue.status_counts();
            tracing::info!(
                "Queue stats: {} queued, {} running, {} completed, {} failed",
                queued,
                running,
                completed,
                failed
            );
        }
    });

    // 6. Start HTTP server:
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
