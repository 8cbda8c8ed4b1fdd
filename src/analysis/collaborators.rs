//! External Analysis Collaborators
//!
//! The actual bioinformatics lives outside this service and is consumed
//! through narrow contracts: the predictor/genotyper toolchain is invoked as
//! a subprocess, the distance store is a separate HTTP service. Executors only
//! ever see these traits, so tests substitute fakes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tokio::process::Command;

/// Runs the sequence predictor and genotyper on an uploaded sample file.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn run_predictor(&self, file: &str, sample_id: &str) -> Result<Value>;
    async fn run_genotype(&self, file: &str, sample_id: &str) -> Result<Value>;
}

/// One neighbour row as returned by the distance store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Neighbour {
    #[serde(rename = "sampleId")]
    pub sample_id: String,
    pub distance: f64,
}

/// Pairwise-distance backend.
#[async_trait]
pub trait DistanceStore: Send + Sync {
    /// Makes a freshly genotyped sample visible to subsequent distance
    /// queries. No confirmation of replica propagation is awaited.
    async fn insert(&self, genotype: &Value) -> Result<()>;

    /// Raw distances from `sample_id` to every known sample, unordered.
    async fn distances(&self, sample_id: &str) -> Result<Vec<Neighbour>>;
}

/// Shells out to the Mykrobe toolchain. Intermediate artifacts land in
/// `outdir`; the final JSON report is read from the command's stdout.
pub struct MykrobePredictor {
    outdir: PathBuf,
}

impl MykrobePredictor {
    pub fn new(outdir: PathBuf) -> Self {
        Self { outdir }
    }

    async fn run(&self, subcommand: &str, file: &str, sample_id: &str) -> Result<Value> {
        tracing::debug!("Running mykrobe {} for sample {}", subcommand, sample_id);

        let output = Command::new("mykrobe")
            .arg(subcommand)
            .arg("--sample")
            .arg(sample_id)
            .arg("--seq")
            .arg(file)
            .arg("--tmp")
            .arg(&self.outdir)
            .arg("--format")
            .arg("json")
            .output()
            .await
            .context("failed to launch mykrobe")?;

        if !output.status.success() {
            return Err(anyhow::anyhow!(
                "mykrobe {} exited with {}: {}",
                subcommand,
                output.status,
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        serde_json::from_slice(&output.stdout).context("mykrobe produced invalid JSON")
    }
}

#[async_trait]
impl Predictor for MykrobePredictor {
    async fn run_predictor(&self, file: &str, sample_id: &str) -> Result<Value> {
        self.run("predict", file, sample_id).await
    }

    async fn run_genotype(&self, file: &str, sample_id: &str) -> Result<Value> {
        self.run("genotype", file, sample_id).await
    }
}

/// Distance store reached over HTTP.
pub struct HttpDistanceStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDistanceStore {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DistanceStore for HttpDistanceStore {
    async fn insert(&self, genotype: &Value) -> Result<()> {
        let url = format!("{}/samples", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(genotype)
            .send()
            .await
            .context("distance store unreachable")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "distance insert rejected: {}",
                response.status()
            ));
        }

        Ok(())
    }

    async fn distances(&self, sample_id: &str) -> Result<Vec<Neighbour>> {
        let url = format!("{}/distances/{}", self.base_url, sample_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("distance store unreachable")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "distance query rejected: {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }
}
