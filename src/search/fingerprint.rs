use serde_json::Value;
use sha2::{Digest, Sha256};

/// Length of the short digest kept for correlation.
const FINGERPRINT_LEN: usize = 24;

/// Deterministic short digest of a search query, used to correlate log lines
/// with delivered results. Not a storage key and not an idempotency lock.
///
/// `serde_json` objects keep their keys sorted, so two structurally equal
/// queries serialize to the same bytes regardless of insertion order.
pub fn fingerprint(query: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}
