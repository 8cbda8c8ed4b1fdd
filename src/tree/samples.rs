//! Leaf-Sample Index
//!
//! The tree-distance mode restricts distance queries to the samples present
//! in the reference tree. That sample set is derived once at startup from the
//! "latest" tree document and shared read-only with every worker; picking up
//! a newly published tree version requires a restart.

use super::version::TreeVersions;

use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;

pub struct TreeIndex {
    pub version: String,
    samples: HashSet<String>,
}

impl TreeIndex {
    /// Builds the index from the latest configured tree document.
    pub async fn load(versions: &TreeVersions) -> Result<Self> {
        let (version, document) = versions.load_document("latest").await?;
        let index = Self::from_document(&version, &document);
        tracing::info!(
            "Loaded {} tree samples from version {}",
            index.len(),
            index.version
        );
        Ok(index)
    }

    pub fn from_document(version: &str, document: &str) -> Self {
        Self {
            version: version.to_string(),
            samples: leaf_samples(document).into_iter().collect(),
        }
    }

    pub fn contains(&self, sample_id: &str) -> bool {
        self.samples.contains(sample_id)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Extracts terminal (leaf) node names from a newick document.
///
/// A leaf name follows `(` or `,`; names after `)` are internal node labels
/// and tokens after `:` are branch lengths, neither of which is a sample.
pub fn leaf_samples(newick: &str) -> Vec<String> {
    let re = Regex::new(r"[A-Za-z0-9_.\-]+").unwrap();

    re.find_iter(newick)
        .filter(|m| {
            let before = newick[..m.start()]
                .chars()
                .rev()
                .find(|c| !c.is_whitespace());
            matches!(before, None | Some('(') | Some(','))
        })
        .map(|m| m.as_str().to_string())
        .collect()
}
