use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a task.
///
/// Wrapper around a UUID string, assigned at enqueue time and returned to the
/// caller immediately as its acknowledgement handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generates a new random UUID v4-based TaskId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Represents the lifecycle state of a task in the queue.
///
/// Terminal states are final: a `Completed` or `Failed` task is never re-run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TaskStatus {
    /// Task has been submitted but not yet picked up by any worker.
    Queued,
    /// Task is currently being processed by a worker.
    /// This state is accompanied by a `lease_expires` timestamp in `TaskEntry`.
    Running,
    /// Task finished successfully.
    Completed,
    /// Task execution returned an `Err`.
    Failed { error: String },
}

/// Distance computation modes accepted by the distance executor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DistanceMode {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "tree-distance")]
    TreeDistance,
    #[serde(rename = "nearest-neighbour")]
    NearestNeighbour,
}

impl DistanceMode {
    /// Parses the wire form of a distance mode. Anything outside the closed
    /// set is rejected at the request boundary, before a task is enqueued.
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value {
            "all" => Ok(Self::All),
            "tree-distance" => Ok(Self::TreeDistance),
            "nearest-neighbour" => Ok(Self::NearestNeighbour),
            other => Err(anyhow::anyhow!("{} is not a valid distance type", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::TreeDistance => "tree-distance",
            Self::NearestNeighbour => "nearest-neighbour",
        }
    }
}

impl fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of BIGSI search routines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchKind {
    #[serde(rename = "sequence")]
    Sequence,
    #[serde(rename = "dna-variant")]
    DnaVariant,
    #[serde(rename = "protein-variant")]
    ProteinVariant,
}

impl SearchKind {
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value {
            "sequence" => Ok(Self::Sequence),
            "dna-variant" => Ok(Self::DnaVariant),
            "protein-variant" => Ok(Self::ProteinVariant),
            other => Err(anyhow::anyhow!("{} is not a valid search type", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::DnaVariant => "dna-variant",
            Self::ProteinVariant => "protein-variant",
        }
    }
}

/// The definition of a unit of work.
///
/// The kind and payload are fixed at enqueue time; only the surrounding
/// entry's status changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Task {
    /// Run the sequence predictor on an uploaded sample file.
    Predict { file: String, sample_id: String },
    /// Genotype a sample file. Completion inserts the genotype into the
    /// distance store and fans out the two follow-up distance tasks.
    Genotype { file: String, sample_id: String },
    /// Run one of the BIGSI search routines against the genomic index.
    BigsiSearch {
        search_kind: SearchKind,
        query: serde_json::Value,
    },
    /// Compute neighbour distances for a sample.
    Distance {
        sample_id: String,
        mode: DistanceMode,
    },
    /// Load a reference tree document and report it.
    TreeFetch { version: String },
}

impl Task {
    /// Key under which identical pending work is collapsed.
    ///
    /// Only the distance fan-out carries one: a retried genotype must not
    /// double-enqueue distance work for the same `(sample, mode)` pair while
    /// an identical task is still queued or running.
    pub fn dedup_key(&self) -> Option<String> {
        match self {
            Task::Distance { sample_id, mode } => {
                Some(format!("distance:{}:{}", sample_id, mode.as_str()))
            }
            _ => None,
        }
    }

    /// Short kind name used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Task::Predict { .. } => "predict",
            Task::Genotype { .. } => "genotype",
            Task::BigsiSearch { .. } => "bigsi-search",
            Task::Distance { .. } => "distance",
            Task::TreeFetch { .. } => "tree-fetch",
        }
    }
}

/// The internal representation of a task stored within the `TaskQueue`.
///
/// Contains the task definition and mutable metadata regarding its execution state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    /// The actual work definition.
    pub task: Task,
    /// Current execution status.
    pub status: TaskStatus,
    /// Timestamp (ms) when the task was submitted.
    pub created_at: u64,
    /// Timestamp (ms) when the current execution lease expires.
    /// If `now > lease_expires`, the task is considered abandoned and can be reclaimed.
    pub lease_expires: Option<u64>,
}

/// Helper to get the current system time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
