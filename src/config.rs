//! Client configuration.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. The defaults reproduce the stock DocAnalyzer front
//! end: a backend on `http://127.0.0.1:8000`, no request timeout, actions
//! allowed as soon as a file is selected.

use crate::error::DocAnalyzerError;
use serde::{Deserialize, Serialize};

/// Default backend location.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Configuration for a [`crate::session::Session`] and its backend.
///
/// # Example
/// ```rust
/// use docanalyzer::{ActionGate, ClientConfig};
///
/// let config = ClientConfig::builder()
///     .base_url("http://localhost:9000")
///     .request_timeout_secs(30)
///     .action_gate(ActionGate::RequireUpload)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "http://localhost:9000");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Whole-request timeout in seconds. Default: None (wait forever).
    ///
    /// Extraction and Q&A on large scans can take minutes on the backend, so
    /// no timeout is applied unless asked for.
    pub request_timeout_secs: Option<u64>,

    /// TCP connect timeout in seconds. Default: None.
    pub connect_timeout_secs: Option<u64>,

    /// Whether a failed upload blocks actions. Default: [`ActionGate::RequireFile`].
    pub action_gate: ActionGate,

    /// Which response wins when requests overlap. Default: [`ResponseOrdering::LatestRequest`].
    pub response_ordering: ResponseOrdering,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            connect_timeout_secs: None,
            action_gate: ActionGate::default(),
            response_ordering: ResponseOrdering::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Join an endpoint path such as `/upload/` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = Some(secs);
        self
    }

    pub fn action_gate(mut self, gate: ActionGate) -> Self {
        self.config.action_gate = gate;
        self
    }

    pub fn response_ordering(mut self, ordering: ResponseOrdering) -> Self {
        self.config.response_ordering = ordering;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, DocAnalyzerError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(DocAnalyzerError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(DocAnalyzerError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.connect_timeout_secs == Some(0) {
            return Err(DocAnalyzerError::InvalidConfig(
                "Connect timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What must hold before an action may be dispatched.
///
/// The stock front end only checks that a file was selected, so a file whose
/// upload failed can still be queried by name; the backend then answers for
/// whatever it has stored under that name (or fails).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionGate {
    /// A selected file is enough, regardless of upload outcome. (default)
    #[default]
    RequireFile,
    /// The selected file must not have a failed upload.
    RequireUpload,
}

/// Which response is displayed when several requests overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResponseOrdering {
    /// Only the most recently dispatched request may write its result;
    /// responses to earlier requests are discarded. (default)
    #[default]
    LatestRequest,
    /// Every response writes; whichever resolves last is displayed.
    LastResolved,
}
