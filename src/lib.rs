//! Yoloharvest: harvest stored model-inference records into YOLO
//! training data.
//!
//! Given a list of transaction identifiers, yoloharvest resolves the
//! associated image filenames from a relational store, downloads the raw
//! images from a remote service, retrieves each transaction's inference
//! payload, and renders bounding-box overlays while emitting normalized
//! YOLO annotation files. The four stages run strictly in order over a
//! shared artifact tree; see [`pipeline`] for the stage contracts.
//!
//! # Modules
//!
//! - [`pipeline`]: the typed stage functions and the pipeline runner
//! - [`annotate`]: overlay rendering and YOLO label emission (the core)
//! - [`payload`]: the inference response schema and its legacy-format shim
//! - [`store`] / [`remote`]: the lookup store and image service collaborators
//! - [`geometry`]: pixel/normalized bounding-box types
//! - [`workspace`]: the on-disk artifact layout
//! - [`error`]: error types for yoloharvest operations

pub mod annotate;
pub mod config;
pub mod error;
pub mod geometry;
pub mod payload;
pub mod pipeline;
pub mod remote;
pub mod store;
pub mod workspace;

use std::path::PathBuf;

use clap::Parser;

pub use error::HarvestError;

/// The yoloharvest CLI application.
///
/// Every option can come from the process environment, which is how
/// deployments configure it; flags exist mostly for ad-hoc runs.
#[derive(Parser)]
#[command(name = "yoloharvest")]
#[command(version, about)]
struct Cli {
    /// Workspace root holding id_list.txt and the artifact directories.
    #[arg(long, env = "HARVEST_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    #[command(flatten)]
    store: config::StoreConfig,

    #[command(flatten)]
    service: config::ServiceConfig,
}

/// Run the yoloharvest CLI.
///
/// This is the main entry point, called from `main.rs`.
pub fn run() -> Result<(), HarvestError> {
    let cli = Cli::parse();
    let config = config::Config {
        workspace: cli.workspace,
        store: cli.store,
        service: cli.service,
    };

    pipeline::run_pipeline(&config)?;
    Ok(())
}
