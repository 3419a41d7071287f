//! Annotation rendering: response blobs in, annotated images and YOLO
//! label files out.
//!
//! This is the heart of the pipeline. Each persisted response blob is
//! parsed, its products are walked, and every valid detection is both
//! drawn onto a copy of the raw image and emitted as a normalized YOLO
//! label row. Every failure unit — blob, product, detection — is
//! independently skippable: a bad record costs exactly that record,
//! never the run.

mod overlay;
mod yolo;

pub use overlay::Overlay;
pub use yolo::{label_file_contents, label_row, ClassMap};

use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::payload::{self, Product};
use crate::workspace::Workspace;

/// Totals reported by the render stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Blobs that parsed and contained at least one product.
    pub blobs_rendered: usize,
    /// Blobs skipped: unreadable, unparseable, or without products.
    pub blobs_skipped: usize,
    /// Product images written with overlay and label file.
    pub images_annotated: usize,
    pub detections_drawn: usize,
    /// Detection records rejected for missing or uncoercible fields.
    pub detections_skipped: usize,
}

/// Renders every response blob into annotated images and YOLO label
/// files.
///
/// The blob list comes from the retrieval stage (or a directory scan when
/// run standalone); reading the results directory is the caller's
/// concern and the only fatal condition of this stage.
pub fn render_annotations(blob_paths: &[PathBuf], workspace: &Workspace) -> RenderSummary {
    let class_map = ClassMap::placeholder();
    let mut summary = RenderSummary::default();

    for blob_path in blob_paths {
        let text = match fs::read_to_string(blob_path) {
            Ok(text) => text,
            Err(err) => {
                warn!("error reading {}: {err}", blob_path.display());
                summary.blobs_skipped += 1;
                continue;
            }
        };

        let parsed = match payload::parse_blob(&text, blob_path) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("{err}");
                summary.blobs_skipped += 1;
                continue;
            }
        };

        let products = parsed.content.products();
        if products.is_empty() {
            summary.blobs_skipped += 1;
            continue;
        }

        for product in products.values() {
            render_product(product, &class_map, workspace, &mut summary);
        }
        summary.blobs_rendered += 1;
    }

    summary
}

/// Renders one product: overlay over its raw image plus a label file.
/// All failures here are logged and cost only this product.
fn render_product(
    product: &Product,
    class_map: &ClassMap,
    workspace: &Workspace,
    summary: &mut RenderSummary,
) {
    let Some(file_name) = product.file_name.as_deref() else {
        warn!("product entry without File_Name, skipping");
        return;
    };

    let image_path = workspace.raw_image_path(file_name);
    if !image_path.exists() {
        warn!(
            "raw image {} not on disk, skipping product",
            image_path.display()
        );
        return;
    }

    let base = match image::open(&image_path) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(err) => {
            warn!("cannot decode {}: {err}", image_path.display());
            return;
        }
    };
    let (width, height) = base.dimensions();

    let mut layer = Overlay::new(width, height);
    let mut rows = Vec::new();
    for record in product.inference_output.values() {
        let Some(detection) = record.validate() else {
            summary.detections_skipped += 1;
            continue;
        };
        layer.draw_detection(&detection);
        rows.push(label_row(
            class_map.class_id(&detection.label),
            &detection.bbox(),
            width,
            height,
        ));
        summary.detections_drawn += 1;
    }

    let annotated = layer.composite_onto(&base);
    let annotated_path = workspace.annotated_image_path(file_name);
    if let Err(err) = annotated.save(&annotated_path) {
        warn!("failed to write {}: {err}", annotated_path.display());
        return;
    }

    let label_path = workspace.yolo_label_path(file_name);
    if let Err(err) = fs::write(&label_path, label_file_contents(&rows)) {
        warn!("failed to write {}: {err}", label_path.display());
        return;
    }

    summary.images_annotated += 1;
    info!("annotated {file_name}");
}
