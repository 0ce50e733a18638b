//! PDF feature extraction port (§6.3/§4.2 boundary signals).

use crate::error::Result;
use crate::value_objects::PageFeatures;

/// Pulls per-page layout/text signals out of a raw PDF, feeding the boundary
/// detector and classifier. Pure function of its input bytes: no case or
/// document identity crosses this boundary, so it stays synchronous and
/// side-effect free.
pub trait PdfFeatureProvider: Send + Sync {
    /// Extract one [`PageFeatures`] per page of `pdf_bytes`, in page order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::InputInvalid`] if the bytes cannot be parsed as a PDF.
    fn pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageFeatures>>;
}
