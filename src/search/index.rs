//! BIGSI Search Collaborator
//!
//! The genomic index itself is an external tool; this service only knows the
//! three query routines and the backing paths handed to the CLI.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tokio::process::Command;

#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn sequence_query(&self, query: &Value) -> Result<Value>;
    async fn dna_variant_query(&self, query: &Value) -> Result<Value>;
    async fn protein_variant_query(&self, query: &Value) -> Result<Value>;
}

/// Invokes the BIGSI CLI against the configured index and reference paths.
/// The query object is passed verbatim as JSON; results come back on stdout.
pub struct BigsiCli {
    db_path: PathBuf,
    reference_path: PathBuf,
    genbank_path: PathBuf,
}

impl BigsiCli {
    pub fn new(db_path: PathBuf, reference_path: PathBuf, genbank_path: PathBuf) -> Self {
        Self {
            db_path,
            reference_path,
            genbank_path,
        }
    }

    async fn run(&self, routine: &str, query: &Value) -> Result<Value> {
        tracing::debug!("Running bigsi {} query", routine);

        let output = Command::new("bigsi")
            .arg(routine)
            .arg("--db")
            .arg(&self.db_path)
            .arg("--reference")
            .arg(&self.reference_path)
            .arg("--genbank")
            .arg(&self.genbank_path)
            .arg("--query")
            .arg(query.to_string())
            .output()
            .await
            .context("failed to launch bigsi")?;

        if !output.status.success() {
            return Err(anyhow::anyhow!(
                "bigsi {} exited with {}: {}",
                routine,
                output.status,
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        serde_json::from_slice(&output.stdout).context("bigsi produced invalid JSON")
    }
}

#[async_trait]
impl SearchIndex for BigsiCli {
    async fn sequence_query(&self, query: &Value) -> Result<Value> {
        self.run("sequence", query).await
    }

    async fn dna_variant_query(&self, query: &Value) -> Result<Value> {
        self.run("dna-variant", query).await
    }

    async fn protein_variant_query(&self, query: &Value) -> Result<Value> {
        self.run("protein-variant", query).await
    }
}
