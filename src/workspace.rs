//! The on-disk artifact tree shared by the pipeline stages.
//!
//! Everything the pipeline reads or writes lives under one root: the
//! transaction id list, the resolved filename list, raw images, persisted
//! response blobs, annotated output images and YOLO label files.

use std::fs;
use std::path::{Path, PathBuf};

use deunicode::deunicode;

use crate::error::HarvestError;
use crate::store::TransactionId;

/// Input file: newline-delimited transaction ids.
pub const ID_LIST_FILE: &str = "id_list.txt";

/// Intermediate file: resolved image filenames, rewritten every run.
pub const IMAGE_LIST_FILE: &str = "image_list.txt";

const RAW_IMAGES_DIR: &str = "raw_images";
const RESULTS_DIR: &str = "transaction_results";
const OUTPUT_IMAGES_DIR: &str = "output_images";
const OUTPUT_YOLO_DIR: &str = "output_yolo";

/// Directory layout rooted at the working directory.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Opens the workspace, creating the artifact directories if absent.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, HarvestError> {
        let workspace = Self { root: root.into() };
        for dir in [
            workspace.raw_images_dir(),
            workspace.results_dir(),
            workspace.output_images_dir(),
            workspace.output_yolo_dir(),
        ] {
            fs::create_dir_all(&dir)
                .map_err(|source| HarvestError::ArtifactWrite { path: dir, source })?;
        }
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn id_list_path(&self) -> PathBuf {
        self.root.join(ID_LIST_FILE)
    }

    pub fn image_list_path(&self) -> PathBuf {
        self.root.join(IMAGE_LIST_FILE)
    }

    pub fn raw_images_dir(&self) -> PathBuf {
        self.root.join(RAW_IMAGES_DIR)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join(RESULTS_DIR)
    }

    pub fn output_images_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_IMAGES_DIR)
    }

    pub fn output_yolo_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_YOLO_DIR)
    }

    /// Where a downloaded raw image is stored.
    pub fn raw_image_path(&self, file_name: &str) -> PathBuf {
        self.raw_images_dir().join(file_name)
    }

    /// Where a transaction's response blob is stored, one per id.
    pub fn response_blob_path(&self, id: TransactionId) -> PathBuf {
        self.results_dir().join(format!("{id}_response.txt"))
    }

    /// Where the annotated copy of an image is written. The name is
    /// transliterated to plain ASCII.
    pub fn annotated_image_path(&self, file_name: &str) -> PathBuf {
        self.output_images_dir()
            .join(format!("annotated_{}", deunicode(file_name)))
    }

    /// Where an image's YOLO label file is written: the image's base name
    /// with the extension replaced. Unlike the annotated image, the name
    /// is not transliterated.
    pub fn yolo_label_path(&self, file_name: &str) -> PathBuf {
        self.output_yolo_dir()
            .join(Path::new(file_name).with_extension("txt"))
    }
}
