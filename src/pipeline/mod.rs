//! The four-stage harvest pipeline.
//!
//! Stages run strictly in order and each takes the previous stage's
//! declared output type, so the contract between stages is a type rather
//! than an implicit file path:
//!
//! 1. [`resolve_filenames`]: [`TransactionList`] → [`FilenameList`]
//! 2. [`fetch_images`]: [`FilenameList`] → [`FetchedImages`]
//! 3. [`retrieve_payloads`]: [`FetchedImages`] → [`ResponseBlobs`]
//! 4. [`crate::annotate::render_annotations`]: [`ResponseBlobs`] →
//!    [`RenderSummary`](crate::annotate::RenderSummary)
//!
//! A failing stage halts the run; artifacts written before the failure
//! stay on disk. There are no retries.

mod fetch;
mod resolve;
mod retrieve;

pub use fetch::{fetch_images, FetchedImages};
pub use resolve::{resolve_filenames, FilenameList, TransactionList};
pub use retrieve::{retrieve_payloads, ResponseBlobs};

use log::info;

use crate::annotate::{render_annotations, RenderSummary};
use crate::config::Config;
use crate::error::HarvestError;
use crate::remote::HttpImageService;
use crate::store::PgStore;
use crate::workspace::Workspace;

/// Runs all four stages in fixed order against the configured store and
/// service, halting at the first failing stage.
///
/// Store connections and the API session each live for one stage and are
/// released before the next stage starts.
pub fn run_pipeline(config: &Config) -> Result<RenderSummary, HarvestError> {
    let workspace = Workspace::create(&config.workspace)?;

    info!("--- stage 1: resolve filenames ---");
    let ids = TransactionList::load(&workspace.id_list_path())?;
    let filenames = {
        let mut store = PgStore::connect(&config.store)?;
        resolve_filenames(&ids, &mut store, &workspace)?
    };
    info!(
        "resolved {} filename(s) from {} id(s)",
        filenames.len(),
        ids.len()
    );

    info!("--- stage 2: fetch images ---");
    let fetched = {
        let mut service = HttpImageService::new(config.service.clone());
        fetch_images(&filenames, &mut service, &workspace)?
    };
    info!("downloaded {} image(s)", fetched.downloaded().len());

    info!("--- stage 3: retrieve payloads ---");
    let blobs = {
        let mut store = PgStore::connect(&config.store)?;
        retrieve_payloads(&fetched, &mut store, &workspace)?
    };
    info!("{} response blob(s) on disk", blobs.len());

    info!("--- stage 4: render annotations ---");
    let summary = render_annotations(blobs.paths(), &workspace);
    info!(
        "pipeline complete: {} blob(s) rendered, {} image(s) annotated, {} detection(s) drawn",
        summary.blobs_rendered, summary.images_annotated, summary.detections_drawn
    );

    Ok(summary)
}
