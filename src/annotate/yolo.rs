//! YOLO label-row emission.

use crate::geometry::{BBox, Pixel};

/// Label-to-class-id mapping point.
///
/// No taxonomy is implemented: every label resolves to the placeholder
/// class 0. Training against real classes means replacing
/// [`ClassMap::placeholder`] with a table built from the class list of
/// the target dataset; nothing else in the renderer changes.
#[derive(Clone, Debug, Default)]
pub struct ClassMap {
    _private: (),
}

impl ClassMap {
    /// The placeholder mapping: everything is class 0.
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Class id for a detection label.
    pub fn class_id(&self, _label: &str) -> u32 {
        0
    }
}

/// Formats one YOLO label row: `class_id x_center y_center width height`,
/// spatial fields normalized by the image dimensions, six decimal places.
///
/// Boxes reaching past the image edge produce values outside [0, 1];
/// they are emitted as-is.
pub fn label_row(class_id: u32, bbox: &BBox<Pixel>, image_width: u32, image_height: u32) -> String {
    let normalized = bbox.to_normalized(image_width as f64, image_height as f64);
    let (cx, cy, w, h) = normalized.to_cxcywh();
    format!("{} {:.6} {:.6} {:.6} {:.6}", class_id, cx, cy, w, h)
}

/// Joins rows into label-file content: newline-separated with no
/// trailing newline. An image without valid detections gets an empty
/// file.
pub fn label_file_contents(rows: &[String]) -> String {
    rows.join("\n")
}
