//! Environment-sourced configuration.
//!
//! Every knob has a default mirroring the development setup, so the binary
//! starts with no environment at all. Paths are handed verbatim to the
//! external collaborators; nothing here is validated beyond parseability.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API listens on.
    pub bind_addr: SocketAddr,
    /// Base URL of the reporting API results are delivered to.
    pub atlas_api: String,
    /// Scratch directory for predictor intermediate files.
    pub default_outdir: PathBuf,
    /// BIGSI index location.
    pub bigsi_db_path: PathBuf,
    /// Reference genome (FASTA).
    pub tb_reference_path: PathBuf,
    /// Reference annotation (GenBank).
    pub tb_genbank_path: PathBuf,
    /// Base URL of the distance-store service.
    pub distance_api: String,
    /// Version label -> tree document path.
    pub tree_paths: BTreeMap<String, PathBuf>,
    /// Number of task workers.
    pub worker_count: usize,
    /// Delivery attempts per result; 1 means never retried.
    pub delivery_attempts: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_or("ANALYSIS_BIND", "0.0.0.0:3000")
            .parse()
            .context("ANALYSIS_BIND is not a valid socket address")?;

        let worker_count = env_or("WORKER_COUNT", "4")
            .parse()
            .context("WORKER_COUNT is not a number")?;

        let delivery_attempts = env_or("DELIVERY_ATTEMPTS", "1")
            .parse()
            .context("DELIVERY_ATTEMPTS is not a number")?;

        Ok(Self {
            bind_addr,
            atlas_api: env_or("ATLAS_API", "https://api.atlas-prod.makeandship.com/"),
            default_outdir: env_or("DEFAULT_OUTDIR", "./").into(),
            bigsi_db_path: env_or("BIGSI_DB_PATH", "dbpath").into(),
            tb_reference_path: env_or("TB_REFERENCE_PATH", "ref.fa").into(),
            tb_genbank_path: env_or("TB_GENBANK_PATH", "ref.gb").into(),
            distance_api: env_or("DISTANCE_API", "http://localhost:8080/"),
            tree_paths: parse_tree_paths(&env_or("TREE_PATHS", "1.0=data/tb_newick.txt"))?,
            worker_count,
            delivery_attempts,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses the tree version registry from `label=path[,label=path...]`.
fn parse_tree_paths(raw: &str) -> Result<BTreeMap<String, PathBuf>> {
    let mut paths = BTreeMap::new();

    for pair in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let (label, path) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("TREE_PATHS entry {} is not label=path", pair))?;
        paths.insert(label.trim().to_string(), PathBuf::from(path.trim()));
    }

    if paths.is_empty() {
        return Err(anyhow::anyhow!("TREE_PATHS is empty"));
    }

    Ok(paths)
}
