//! Remote image service collaborator.
//!
//! The service hands out raw image bytes by filename after one
//! authentication exchange. As with the lookup store, a trait keeps the
//! fetch stage testable without a live endpoint.

mod http;

pub use http::HttpImageService;

use crate::error::HarvestError;

/// A service that authenticates once and then serves raw image bytes by
/// filename.
pub trait ImageService {
    /// Performs the authentication exchange and keeps the session token
    /// for subsequent fetches. Failure is stage-fatal.
    fn authenticate(&mut self) -> Result<(), HarvestError>;

    /// Fetches one image. `Ok(None)` means the service answered with a
    /// non-success status; `Err` is a transport failure. The fetch stage
    /// treats both per-item.
    fn fetch_image(&mut self, file_name: &str) -> Result<Option<Vec<u8>>, HarvestError>;
}
