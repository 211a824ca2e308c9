use std::path::PathBuf;

use thiserror::Error;

/// Failures loading or validating a stable dataset.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read stable data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stable data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: i64 },
    #[error("horse {horse} references unknown {relation} {id}")]
    DanglingReference { horse: i64, relation: &'static str, id: i64 },
}
