//! Per-job scoped working area (§9 redesign flag).
//!
//! The reference codebase scatters per-file temp directories and manual
//! cleanup across several services. Here one job owns exactly one
//! `WorkingArea`, backed by a single `tempfile::TempDir`, released through a
//! single registered cleanup hook when the job reaches a terminal state
//! (Completed/Failed/Cancelled) rather than left to ad hoc `Drop` timing.

use std::path::{Path, PathBuf};

use mcb_domain::error::{Error, Result};
use mcb_domain::value_objects::ProcessingId;
use tempfile::TempDir;

/// Scoped temp directory for one job's intermediate artifacts (extracted PDF
/// pages, OCR output, staged uploads).
pub struct WorkingArea {
    processing_id: ProcessingId,
    dir: TempDir,
}

impl WorkingArea {
    /// Create a fresh scoped directory for `processing_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoSimple`] if the directory cannot be created.
    pub fn create(processing_id: ProcessingId) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("mcb-job-{processing_id}-"))
            .tempdir()?;
        Ok(Self { processing_id, dir })
    }

    /// Path to this job's scoped directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path to a file within this job's scoped directory; does not create the file.
    #[must_use]
    pub fn child(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }

    /// Release the working area, recursively removing its contents.
    ///
    /// Call exactly once, from the job's terminal transition (Completed,
    /// Failed, or Cancelled); the directory is also removed on unwind if this
    /// is never called, but the cleanup hook at the terminal transition is
    /// the documented release point (§9).
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoSimple`] if removal fails (e.g. permissions).
    pub fn release(self) -> Result<()> {
        self.dir.close().map_err(Error::from)
    }

    /// Job this working area belongs to.
    #[must_use]
    pub fn processing_id(&self) -> ProcessingId {
        self.processing_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn create_makes_an_existing_directory() {
        let area = WorkingArea::create(ProcessingId::new()).expect("create ok");
        assert!(area.path().is_dir());
    }

    #[test]
    fn child_path_is_scoped_under_the_working_area() {
        let area = WorkingArea::create(ProcessingId::new()).expect("create ok");
        let child = area.child("page-0001.txt");
        assert!(child.starts_with(area.path()));
    }

    #[test]
    fn release_removes_the_directory() {
        let area = WorkingArea::create(ProcessingId::new()).expect("create ok");
        let path = area.path().to_path_buf();
        fs::write(area.child("note.txt"), b"x").expect("write ok");
        area.release().expect("release ok");
        assert!(!path.exists());
    }
}
