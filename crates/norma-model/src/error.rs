use std::path::PathBuf;

use thiserror::Error;

use crate::predicate::PredicateId;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("predicate mapping key '{key}' is not a valid predicate id")]
    InvalidPredicateKey { key: String },

    #[error("predicate id {id} is defined more than once")]
    DuplicatePredicateId { id: PredicateId },

    #[error("cascade metadata lists no executions")]
    EmptyCascade,

    #[error("results file for instance '{instance}' not found at {path}")]
    MissingResultsFile { instance: String, path: PathBuf },
}
