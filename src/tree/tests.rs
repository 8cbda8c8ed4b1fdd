//! Tree Module Tests
//!
//! ## Test Scopes
//! - **Version resolution**: latest selection, the numeric-tie tie-break,
//!   explicit labels, lookup failures.
//! - **Document loading**: the single-line wire contract.
//! - **Leaf extraction**: terminal names in, branch lengths and internal
//!   labels out.

#[cfg(test)]
mod tests {
    use crate::analysis::collaborators::{DistanceStore, Neighbour, Predictor};
    use crate::executor::executor::ExecutorContext;
    use crate::report::publisher::{Delivery, Publisher};
    use crate::search::index::SearchIndex;
    use crate::tree::fetch::run_tree_fetch;
    use crate::tree::samples::{leaf_samples, TreeIndex};
    use crate::tree::version::TreeVersions;

    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn versions(labels: &[&str]) -> TreeVersions {
        let mut paths = BTreeMap::new();
        for label in labels {
            paths.insert(label.to_string(), PathBuf::from(format!("{}.nwk", label)));
        }
        TreeVersions::new(paths)
    }

    fn write_temp_tree(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tree-{}.nwk", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    // ============================================================
    // Version resolution
    // ============================================================

    #[test]
    fn test_latest_resolves_to_numeric_maximum() {
        let versions = versions(&["1.0", "1.2", "2.0"]);

        assert_eq!(versions.resolve("latest").unwrap(), "2.0");
    }

    #[test]
    fn test_numeric_tie_prefers_lexicographically_first_label() {
        let versions = versions(&["1", "1.0"]);

        // Both parse to 1.0; "1" sorts before "1.0"
        assert_eq!(versions.resolve("latest").unwrap(), "1");
    }

    #[test]
    fn test_explicit_label_resolves_to_itself() {
        let versions = versions(&["1.0", "2.0"]);

        assert_eq!(versions.resolve("1.0").unwrap(), "1.0");
    }

    #[test]
    fn test_unknown_label_is_a_lookup_failure() {
        let versions = versions(&["1.0"]);

        let err = versions.resolve("3.0").unwrap_err();
        assert!(err.to_string().contains("unknown tree version"));
    }

    #[test]
    fn test_non_numeric_label_fails_latest_resolution() {
        let versions = versions(&["1.0", "beta"]);

        assert!(versions.resolve("latest").is_err());
        // Explicit lookup of the odd label still works
        assert_eq!(versions.resolve("beta").unwrap(), "beta");
    }

    // ============================================================
    // Document loading
    // ============================================================

    #[tokio::test]
    async fn test_load_document_strips_newlines() {
        let path = write_temp_tree("(s1:0.1,\n(s2:0.2,\ns3:0.3):0.05)\n;\n");
        let mut paths = BTreeMap::new();
        paths.insert("1.0".to_string(), path.clone());
        let versions = TreeVersions::new(paths);

        let (version, document) = versions.load_document("latest").await.unwrap();

        assert_eq!(version, "1.0");
        assert!(!document.contains('\n'));
        assert_eq!(document, "(s1:0.1,(s2:0.2,s3:0.3):0.05);");

        std::fs::remove_file(path).unwrap();
    }

    // ============================================================
    // Leaf extraction
    // ============================================================

    #[test]
    fn test_leaf_samples_with_branch_lengths() {
        let samples = leaf_samples("(sample1:0.1,(sample2:0.2,sample3:0.3):0.05);");

        assert_eq!(samples, vec!["sample1", "sample2", "sample3"]);
    }

    #[test]
    fn test_leaf_samples_without_branch_lengths() {
        let samples = leaf_samples("(A,(B,C));");

        assert_eq!(samples, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_internal_labels_are_not_samples() {
        let samples = leaf_samples("(A:1,B:2)root:0;");

        assert_eq!(samples, vec!["A", "B"]);
    }

    #[test]
    fn test_tree_index_membership() {
        let index = TreeIndex::from_document("1.0", "(s1:0.1,s2:0.2);");

        assert_eq!(index.version, "1.0");
        assert_eq!(index.len(), 2);
        assert!(index.contains("s1"));
        assert!(!index.contains("s3"));
    }

    // ============================================================
    // Tree fetch
    // ============================================================

    struct NoopPredictor;

    #[async_trait]
    impl Predictor for NoopPredictor {
        async fn run_predictor(&self, _file: &str, _sample_id: &str) -> Result<Value> {
            Ok(Value::Null)
        }
        async fn run_genotype(&self, _file: &str, _sample_id: &str) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    struct NoopDistanceStore;

    #[async_trait]
    impl DistanceStore for NoopDistanceStore {
        async fn insert(&self, _genotype: &Value) -> Result<()> {
            Ok(())
        }
        async fn distances(&self, _sample_id: &str) -> Result<Vec<Neighbour>> {
            Ok(vec![])
        }
    }

    struct NoopSearchIndex;

    #[async_trait]
    impl SearchIndex for NoopSearchIndex {
        async fn sequence_query(&self, _query: &Value) -> Result<Value> {
            Ok(Value::Null)
        }
        async fn dna_variant_query(&self, _query: &Value) -> Result<Value> {
            Ok(Value::Null)
        }
        async fn protein_variant_query(&self, _query: &Value) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[tokio::test]
    async fn test_tree_fetch_publishes_and_returns_single_line() {
        let path = write_temp_tree("(s1:0.1,\ns2:0.2);\n");
        let mut paths = BTreeMap::new();
        paths.insert("1.0".to_string(), path.clone());

        let (publisher, mut rx) = Publisher::probe("https://atlas.test/api");
        let ctx = ExecutorContext {
            predictor: Arc::new(NoopPredictor),
            distance_store: Arc::new(NoopDistanceStore),
            search_index: Arc::new(NoopSearchIndex),
            tree_versions: Arc::new(TreeVersions::new(paths)),
            tree_index: Arc::new(TreeIndex::from_document("1.0", "(s1:1);")),
            publisher,
        };

        let results = run_tree_fetch(&ctx, "latest").await.unwrap();

        assert_eq!(results["version"], "1.0");
        assert_eq!(results["tree"], "(s1:0.1,s2:0.2);");

        let outbound = rx.try_recv().expect("tree result should be published");
        assert_eq!(outbound.envelope.kind, "tree");
        assert_eq!(outbound.delivery, Delivery::Create);
        assert_eq!(outbound.url, "https://atlas.test/api/trees");

        std::fs::remove_file(path).unwrap();
    }
}
