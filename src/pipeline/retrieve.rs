//! Stage 3: persist per-transaction response payloads.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use log::{info, warn};
use walkdir::WalkDir;

use super::fetch::FetchedImages;
use crate::error::HarvestError;
use crate::store::{LookupStore, TransactionId};
use crate::workspace::Workspace;

/// Stage 3 output: every response blob present in the results directory,
/// including blobs left by earlier runs.
#[derive(Clone, Debug)]
pub struct ResponseBlobs {
    paths: Vec<PathBuf>,
}

impl ResponseBlobs {
    /// Lists the results directory. Failure to read it is stage-fatal —
    /// the one fatal condition the render stage inherits.
    pub fn scan(workspace: &Workspace) -> Result<Self, HarvestError> {
        let dir = workspace.results_dir();
        let mut paths = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| HarvestError::ResultsUnavailable {
                path: dir.clone(),
                source: source.into(),
            })?;
            if entry.file_type().is_file() {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Joins each filename to its owning transaction and persists that
/// transaction's response text once: the first response wins, later
/// filenames of the same transaction are skipped via the seen-set.
///
/// A filename without a record is logged and skipped. Any store error
/// aborts the stage.
pub fn retrieve_payloads(
    fetched: &FetchedImages,
    store: &mut dyn LookupStore,
    workspace: &Workspace,
) -> Result<ResponseBlobs, HarvestError> {
    let mut seen: BTreeSet<TransactionId> = BTreeSet::new();

    for file_name in fetched.file_names().file_names() {
        let record = store
            .payload_for_filename(file_name)
            .map_err(|err| HarvestError::RetrievalFailed {
                message: err.to_string(),
            })?;

        match record {
            Some(payload) => {
                if !seen.insert(payload.transaction_id) {
                    continue;
                }
                let path = workspace.response_blob_path(payload.transaction_id);
                fs::write(&path, &payload.response).map_err(|source| {
                    HarvestError::ArtifactWrite {
                        path: path.clone(),
                        source,
                    }
                })?;
                info!("saved: {}", path.display());
            }
            None => warn!("no record for {file_name}"),
        }
    }

    ResponseBlobs::scan(workspace)
}
