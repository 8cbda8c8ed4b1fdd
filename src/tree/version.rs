//! Reference Tree Version Registry
//!
//! Maps version labels to backing tree documents. The registry is built once
//! from configuration at startup and is read-only during request handling.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct TreeVersions {
    paths: BTreeMap<String, PathBuf>,
}

impl TreeVersions {
    pub fn new(paths: BTreeMap<String, PathBuf>) -> Self {
        Self { paths }
    }

    /// Resolves a symbolic version label to a concrete one.
    ///
    /// `"latest"` parses every label as a float and picks the maximum; when
    /// two labels parse to the same value (e.g. "1" and "1.0") the
    /// lexicographically earliest label wins. An explicit label present in
    /// the registry resolves to itself; anything else is a lookup failure.
    pub fn resolve(&self, label: &str) -> Result<String> {
        if label != "latest" {
            if self.paths.contains_key(label) {
                return Ok(label.to_string());
            }
            return Err(anyhow::anyhow!("unknown tree version: {}", label));
        }

        // BTreeMap keys iterate in lexicographic order, so keeping the first
        // strictly-greater value implements the tie-break.
        let mut best: Option<(f64, &String)> = None;
        for key in self.paths.keys() {
            let value: f64 = key
                .parse()
                .map_err(|_| anyhow::anyhow!("tree version {} is not numeric", key))?;
            match best {
                Some((max, _)) if value <= max => {}
                _ => best = Some((value, key)),
            }
        }

        match best {
            Some((_, key)) => Ok(key.clone()),
            None => Err(anyhow::anyhow!("no tree versions configured")),
        }
    }

    /// Loads the document backing a version label.
    ///
    /// Returns the resolved version together with the document as a single
    /// unbroken line; the downstream consumer's wire contract forbids
    /// embedded newlines.
    pub async fn load_document(&self, label: &str) -> Result<(String, String)> {
        let version = self.resolve(label)?;
        let path = &self.paths[&version];

        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read tree document {}", path.display()))?;

        Ok((version, raw.replace('\n', "")))
    }
}
