//! Input file acquisition port (§4.1 Submit inputs).

use async_trait::async_trait;

use crate::error::Result;

/// One file pulled from an input reference, as raw bytes plus its original name.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Resolves a `Submit` request's input reference (inline upload, folder path,
/// remote bundle, ...) into concrete file bytes.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Resolve `reference` into its constituent files.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::NotFound`] if the reference does not
    /// resolve to anything, and [`crate::error::Error::InputInvalid`] if it
    /// resolves to something that isn't readable as input files.
    async fn get(&self, reference: &str) -> Result<Vec<InputFile>>;
}
