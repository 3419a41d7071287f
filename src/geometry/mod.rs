//! Typed bounding-box geometry.
//!
//! Boxes carry a zero-sized marker for their coordinate space, so pixel
//! and normalized values cannot be mixed by accident: a detection's pixel
//! box has to pass through [`BBox::to_normalized`] before it can feed a
//! YOLO label row.

mod bbox;
mod space;

pub use bbox::BBox;
pub use space::{Normalized, Pixel};
