//! Coordinate space marker types.

use std::fmt;

/// Marker for absolute pixel coordinates within an image, (0, 0) at the
/// top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker for coordinates expressed as fractions of the image dimensions.
///
/// Values are usually in [0, 1], but boxes reaching past the image edge
/// normalize to values outside that range and are kept as-is.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // uninhabited
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // uninhabited
    }
}
