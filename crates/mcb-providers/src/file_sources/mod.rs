//! Input file resolution: inline uploads and remote folder references (§4.1, §6.1).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{FileSource, InputFile};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct InlineFileEntry {
    name: String,
    #[serde(rename = "contentBase64")]
    content_base64: String,
}

/// Resolves a JSON-encoded `[{name, contentBase64}]` reference into raw file bytes.
///
/// The HTTP edge serializes the request body's `files` array to this form
/// before handing it to the file source, so `Submit`'s two input shapes
/// (inline bytes vs. remote folder) both flow through the single `get(reference)` seam.
pub struct InlineFileSource;

#[async_trait]
impl FileSource for InlineFileSource {
    async fn get(&self, reference: &str) -> Result<Vec<InputFile>> {
        let entries: Vec<InlineFileEntry> =
            serde_json::from_str(reference).map_err(|e| Error::input_invalid(format!("malformed inline file reference: {e}")))?;

        if entries.is_empty() {
            return Err(Error::input_invalid("inline file reference contains no files"));
        }

        entries
            .into_iter()
            .map(|entry| {
                let bytes = STANDARD
                    .decode(entry.content_base64)
                    .map_err(|e| Error::input_invalid(format!("invalid base64 for {}: {e}", entry.name)))?;
                Ok(InputFile { name: entry.name, bytes })
            })
            .collect()
    }
}

/// Resolves a filesystem folder path into the files under it.
pub struct RemoteFolderFileSource;

#[async_trait]
impl FileSource for RemoteFolderFileSource {
    async fn get(&self, reference: &str) -> Result<Vec<InputFile>> {
        let root = Path::new(reference);
        if !root.is_dir() {
            return Err(Error::not_found(format!("folder {reference}")));
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(std::result::Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let bytes = tokio::fs::read(entry.path())
                .await
                .map_err(|e| Error::input_invalid(format!("failed to read {}: {e}", entry.path().display())))?;
            let name = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();
            files.push(InputFile { name, bytes });
        }

        if files.is_empty() {
            return Err(Error::not_found(format!("no files under folder {reference}")));
        }

        Ok(files)
    }
}

/// Dispatches a `Submit` reference to [`InlineFileSource`] or
/// [`RemoteFolderFileSource`] by shape, so a single `Services` can serve
/// both input variants of the ingest RPC (§6.1) behind one `FileSource`.
pub struct CompositeFileSource {
    inline: InlineFileSource,
    remote_folder: RemoteFolderFileSource,
}

impl CompositeFileSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inline: InlineFileSource,
            remote_folder: RemoteFolderFileSource,
        }
    }
}

impl Default for CompositeFileSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSource for CompositeFileSource {
    async fn get(&self, reference: &str) -> Result<Vec<InputFile>> {
        if reference.trim_start().starts_with('[') {
            self.inline.get(reference).await
        } else {
            self.remote_folder.get(reference).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inline_source_decodes_base64_content() {
        let source = InlineFileSource;
        let reference = serde_json::json!([{ "name": "a.pdf", "contentBase64": STANDARD.encode(b"hello") }]).to_string();
        let files = source.get(&reference).await.expect("ok");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].bytes, b"hello");
    }

    #[tokio::test]
    async fn inline_source_rejects_malformed_json() {
        let source = InlineFileSource;
        let err = source.get("not json").await.unwrap_err();
        assert!(matches!(err, Error::InputInvalid { .. }));
    }

    #[tokio::test]
    async fn remote_folder_source_reads_nested_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.txt"), b"alpha").expect("write");
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).expect("mkdir");
        std::fs::write(nested.join("b.txt"), b"beta").expect("write");

        let source = RemoteFolderFileSource;
        let files = source.get(dir.path().to_str().expect("utf8 path")).await.expect("ok");
        assert_eq!(files.len(), 2);
    }

    #[tokio::test]
    async fn remote_folder_source_rejects_missing_folder() {
        let source = RemoteFolderFileSource;
        let err = source.get("/nonexistent/path/for/sure").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn composite_source_routes_json_array_references_to_inline() {
        let source = CompositeFileSource::new();
        let reference = serde_json::json!([{ "name": "a.pdf", "contentBase64": STANDARD.encode(b"hello") }]).to_string();
        let files = source.get(&reference).await.expect("ok");
        assert_eq!(files[0].bytes, b"hello");
    }

    #[tokio::test]
    async fn composite_source_routes_plain_paths_to_remote_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.txt"), b"alpha").expect("write");

        let source = CompositeFileSource::new();
        let files = source.get(dir.path().to_str().expect("utf8 path")).await.expect("ok");
        assert_eq!(files.len(), 1);
    }
}
