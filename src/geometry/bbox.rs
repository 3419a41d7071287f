//! Axis-aligned bounding boxes in XYXY form.

use std::fmt;
use std::marker::PhantomData;

use super::space::{Normalized, Pixel};

/// An axis-aligned box (xmin, ymin, xmax, ymax) tagged with its
/// coordinate space.
///
/// Construction enforces neither ordering nor image bounds. Detections
/// can carry degenerate or out-of-image boxes, and those flow through
/// normalization unchanged; it is the consumer's job to decide whether
/// that matters.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox<S> {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    _space: PhantomData<S>,
}

impl<S> BBox<S> {
    /// Creates a box from explicit corner coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            _space: PhantomData,
        }
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    #[inline]
    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// Width of the box. Negative when the box is inverted (xmax < xmin).
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the box. Negative when the box is inverted (ymax < ymin).
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Returns true if min <= max on both axes.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }
}

impl BBox<Pixel> {
    /// Builds a pixel box from integer detection coordinates.
    #[inline]
    pub fn from_pixels(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Self {
        Self::from_xyxy(x_min as f64, y_min as f64, x_max as f64, y_max as f64)
    }

    /// Divides each corner by the image dimensions.
    ///
    /// Out-of-image corners yield values outside [0, 1]; nothing is
    /// clamped.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBox<Normalized> {
        BBox::from_xyxy(
            self.xmin / image_width,
            self.ymin / image_height,
            self.xmax / image_width,
            self.ymax / image_height,
        )
    }
}

impl BBox<Normalized> {
    /// Center-form fields (x_center, y_center, width, height), the order
    /// used by YOLO label rows.
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
            self.width(),
            self.height(),
        )
    }
}

impl<S> fmt::Debug for BBox<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BBox")
            .field("xmin", &self.xmin)
            .field("ymin", &self.ymin)
            .field("xmax", &self.xmax)
            .field("ymax", &self.ymax)
            .finish()
    }
}
