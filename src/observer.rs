//! Observer trait for workspace events.
//!
//! Inject an [`Arc<dyn WorkspaceObserver>`] via
//! [`crate::session::Session::with_observer`] to receive events as files are
//! uploaded and actions resolve. The terminal front end uses it to show
//! blocking alerts and spinners; a GUI would pop up dialogs instead.
//!
//! # Example
//!
//! ```rust
//! use docanalyzer::WorkspaceObserver;
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct AlertLog {
//!     alerts: Mutex<Vec<String>>,
//! }
//!
//! impl WorkspaceObserver for AlertLog {
//!     fn on_alert(&self, message: &str) {
//!         self.alerts.lock().unwrap().push(message.to_string());
//!     }
//! }
//! ```

use crate::action::ActionKind;
use crate::backend::ActionOutcome;
use crate::error::RequestError;
use serde_json::Value;
use std::sync::Arc;

/// Alert raised when the upload of a selected file fails.
pub const UPLOAD_FAILED_ALERT: &str = "Failed to upload the file.";

/// Called by the session as the workspace changes.
///
/// Implementations must be `Send + Sync` (actions can run on spawned tasks).
/// All methods have default implementations so callers only override what
/// they care about.
pub trait WorkspaceObserver: Send + Sync {
    /// A blocking, user-visible alert.
    fn on_alert(&self, message: &str) {
        let _ = message;
    }

    /// Called before the upload request is sent.
    fn on_upload_start(&self, filename: &str, bytes: usize) {
        let _ = (filename, bytes);
    }

    /// Called with the backend's reply once the upload succeeded.
    fn on_upload_complete(&self, filename: &str, reply: &Value) {
        let _ = (filename, reply);
    }

    /// Called when the upload failed. Raises [`UPLOAD_FAILED_ALERT`] by default.
    fn on_upload_failed(&self, filename: &str, error: &RequestError) {
        let _ = (filename, error);
        self.on_alert(UPLOAD_FAILED_ALERT);
    }

    /// Called just before an action request is sent.
    fn on_action_start(&self, kind: ActionKind, filename: &str) {
        let _ = (kind, filename);
    }

    /// Called when an action's response was written to the view.
    fn on_action_complete(&self, kind: ActionKind, outcome: &ActionOutcome) {
        let _ = (kind, outcome);
    }

    /// Called when a response arrived for a superseded request.
    fn on_response_discarded(&self, kind: ActionKind, request_id: u64) {
        let _ = (kind, request_id);
    }
}

/// A no-op implementation for callers that don't need events.
///
/// This is the default when no observer is configured.
pub struct NoopObserver;

impl WorkspaceObserver for NoopObserver {}

/// Convenience alias for the type stored in [`crate::session::Session`].
pub type Observer = Arc<dyn WorkspaceObserver>;
