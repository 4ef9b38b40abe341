//! File intake: turn a user-supplied path into a [`SelectedFile`].
//!
//! The accepted extensions are a hint, exactly like the `accept` attribute of
//! a browser file picker: anything else is logged and still accepted. The
//! backend decides what it can process.

use crate::error::DocAnalyzerError;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions the backend is known to handle.
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["pdf", "png", "jpg", "jpeg", "tiff"];

/// A document chosen by the user, held in memory until replaced.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name only; the backend stores and looks up documents by it.
    pub name: String,
    /// Raw file content sent with the upload.
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether the file name carries one of [`ACCEPTED_EXTENSIONS`].
    pub fn has_accepted_extension(&self) -> bool {
        has_accepted_extension(Path::new(&self.name))
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("content", &format_args!("<{} bytes>", self.content.len()))
            .finish()
    }
}

/// Case-insensitive check against [`ACCEPTED_EXTENSIONS`].
pub fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            ACCEPTED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Read a local file into a [`SelectedFile`].
///
/// Validates existence and read permission, then loads the whole file.
pub async fn resolve_file(path: impl AsRef<Path>) -> Result<SelectedFile, DocAnalyzerError> {
    let path = path.as_ref();

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| DocAnalyzerError::MissingFileName {
            path: path.to_path_buf(),
        })?;

    let content = tokio::fs::read(path).await.map_err(|e| map_io(path, e))?;

    if !has_accepted_extension(path) {
        warn!(
            "'{}' is not one of the supported formats ({}); uploading anyway",
            name,
            ACCEPTED_EXTENSIONS.join(", ")
        );
    }

    debug!("Resolved local document: {} ({} bytes)", path.display(), content.len());
    Ok(SelectedFile { name, content })
}

fn map_io(path: &Path, e: std::io::Error) -> DocAnalyzerError {
    let path: PathBuf = path.to_path_buf();
    match e.kind() {
        std::io::ErrorKind::NotFound => DocAnalyzerError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => DocAnalyzerError::PermissionDenied { path },
        _ => DocAnalyzerError::ReadFailed { path, source: e },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions() {
        assert!(has_accepted_extension(Path::new("report.pdf")));
        assert!(has_accepted_extension(Path::new("SCAN.TIFF")));
        assert!(has_accepted_extension(Path::new("photo.JpEg")));
        assert!(!has_accepted_extension(Path::new("notes.docx")));
        assert!(!has_accepted_extension(Path::new("README")));
    }

    #[tokio::test]
    async fn test_resolve_reads_content_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.7 body").unwrap();

        let file = resolve_file(&path).await.unwrap();
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.content, b"%PDF-1.7 body");
        assert!(file.has_accepted_extension());
    }

    #[tokio::test]
    async fn test_resolve_accepts_unlisted_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        std::fs::write(&path, b"PK").unwrap();

        let file = resolve_file(&path).await.unwrap();
        assert!(!file.has_accepted_extension());
    }

    #[tokio::test]
    async fn test_resolve_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_file(dir.path().join("nope.pdf")).await.unwrap_err();
        assert!(matches!(err, DocAnalyzerError::FileNotFound { .. }));
    }

    #[test]
    fn debug_hides_content() {
        let f = SelectedFile::new("a.pdf", vec![0u8; 2048]);
        assert_eq!(format!("{f:?}"), "SelectedFile { name: \"a.pdf\", content: <2048 bytes> }");
    }
}
