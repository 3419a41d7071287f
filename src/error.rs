use std::path::PathBuf;
use thiserror::Error;

/// The main error type for yoloharvest operations.
///
/// Only stage-fatal conditions live here: a failing variant aborts the
/// current pipeline stage and, through it, the whole run. Item-level
/// problems (one filename, blob, product, or detection) are logged and
/// skipped by the stage that hits them and never surface as errors.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read transaction id list {path}: {source}")]
    ResolutionUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lookup store connection failed: {message}")]
    StoreConnect { message: String },

    #[error("Lookup store query failed: {message}")]
    Store { message: String },

    #[error("Authentication against the image service failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Image service request failed: {message}")]
    Service { message: String },

    #[error("Payload retrieval failed: {message}")]
    RetrievalFailed { message: String },

    #[error("Failed to parse response blob {path}: {message}")]
    PayloadParse { path: PathBuf, message: String },

    #[error("Cannot read results directory {path}: {source}")]
    ResultsUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
