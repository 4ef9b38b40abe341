//! Error types for the docanalyzer library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DocAnalyzerError`] is **fatal** for the operation that raised it: the
//!   file cannot be read, the configuration is invalid, no document has been
//!   selected yet. Returned as `Err(DocAnalyzerError)` from session and
//!   intake functions.
//!
//! * [`RequestError`] is **non-fatal**: a single backend request failed
//!   (non-2xx status, timeout, connection refused). It never escapes the
//!   session; it is rendered inline in the result area as `Error: <reason>`
//!   and the user retries by dispatching the action again.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the caller of the library.
#[derive(Debug, Error)]
pub enum DocAnalyzerError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The path has no usable file name to key the upload with.
    #[error("'{path}' has no file name")]
    MissingFileName { path: PathBuf },

    /// Reading the file failed for another reason.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Workspace errors ──────────────────────────────────────────────────
    /// An action was requested before any document was selected.
    #[error("Please upload a document first.")]
    NoDocument,

    /// An action was requested after the upload failed and the gate is
    /// [`crate::config::ActionGate::RequireUpload`].
    #[error("'{filename}' was not uploaded; select the file again to retry the upload")]
    UploadRequired { filename: String },

    /// Copy was requested while no extraction result is shown.
    #[error("Nothing to copy: copy is only available for extraction results")]
    CopyUnavailable,

    /// The system clipboard rejected the write.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// A failed backend request.
///
/// The `Display` text is what ends up after `Error: ` in the result area, so
/// it is kept short and human readable.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum RequestError {
    /// The backend answered with a non-2xx status.
    #[error("Request failed with status code {status}")]
    Status { status: u16 },

    /// The request did not complete within the configured timeout.
    #[error("timeout of {secs}s exceeded")]
    Timeout { secs: u64 },

    /// The backend could not be reached.
    #[error("Network Error: {detail}")]
    Connect { detail: String },

    /// The response body could not be read.
    #[error("Failed to read response body: {detail}")]
    Decode { detail: String },

    /// Any other transport-level failure.
    #[error("{detail}")]
    Transport { detail: String },
}

impl RequestError {
    /// Map a reqwest error onto the request error kinds.
    pub(crate) fn from_reqwest(
        e: &reqwest::Error,
        request_timeout_secs: Option<u64>,
        connect_timeout_secs: Option<u64>,
    ) -> Self {
        let limit = if e.is_timeout() {
            applied_timeout(e.is_connect(), request_timeout_secs, connect_timeout_secs)
        } else {
            None
        };
        if let Some(secs) = limit {
            RequestError::Timeout { secs }
        } else if let Some(status) = e.status() {
            RequestError::Status {
                status: status.as_u16(),
            }
        } else if e.is_connect() {
            RequestError::Connect {
                detail: e.to_string(),
            }
        } else if e.is_body() || e.is_decode() {
            RequestError::Decode {
                detail: e.to_string(),
            }
        } else {
            RequestError::Transport {
                detail: e.to_string(),
            }
        }
    }

    /// The inline text shown in the result area for this failure.
    pub fn inline_message(&self) -> String {
        format!("Error: {self}")
    }
}

/// Which configured timeout a timed-out request ran into.
///
/// A connect-phase timeout prefers the connect timeout. `None` when neither
/// is configured; the error is then reported as a transport failure.
fn applied_timeout(during_connect: bool, request: Option<u64>, connect: Option<u64>) -> Option<u64> {
    if during_connect {
        connect.or(request)
    } else {
        request.or(connect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_document_prompts_upload() {
        assert_eq!(
            DocAnalyzerError::NoDocument.to_string(),
            "Please upload a document first."
        );
    }

    #[test]
    fn status_inline_message() {
        let e = RequestError::Status { status: 404 };
        assert_eq!(
            e.inline_message(),
            "Error: Request failed with status code 404"
        );
    }

    #[test]
    fn timeout_display() {
        let e = RequestError::Timeout { secs: 30 };
        assert!(e.to_string().contains("30s"), "got: {e}");
    }

    #[test]
    fn timeout_reports_the_limit_that_applied() {
        assert_eq!(applied_timeout(true, None, Some(5)), Some(5));
        assert_eq!(applied_timeout(true, Some(30), Some(5)), Some(5));
        assert_eq!(applied_timeout(false, Some(30), Some(5)), Some(30));
        assert_eq!(applied_timeout(false, None, Some(5)), Some(5));
        assert_eq!(applied_timeout(false, None, None), None);
    }

    #[test]
    fn upload_required_names_file() {
        let e = DocAnalyzerError::UploadRequired {
            filename: "report.pdf".into(),
        };
        assert!(e.to_string().contains("report.pdf"));
    }
}
