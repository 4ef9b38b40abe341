//! The backend contract and its HTTP implementation.
//!
//! The [`Backend`] trait is the seam between the workspace and the network:
//! [`HttpBackend`] talks to the real service with reqwest, tests substitute
//! scripted implementations. The trait returns raw JSON; turning a reply into
//! something displayable is [`decode_reply`]'s job so every backend gets the
//! same missing-field handling.
//!
//! ## Endpoints
//!
//! ```text
//! POST /upload/                   multipart: file            → { filename }
//! GET  /extract-text/?filename=   —                          → { text }
//! GET  /extract-images/?filename= —                          → { image_paths: [..] }
//! GET  /extract-links/?filename=  —                          → { links: [..] }
//! POST /ask-question/             multipart: filename, question → { answer }
//! ```

use crate::action::ActionKind;
use crate::config::ClientConfig;
use crate::error::{DocAnalyzerError, RequestError};
use crate::intake::SelectedFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Operations the document-analysis service offers.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Hand a document to the backend, which stores it under `file.name`.
    async fn upload(&self, file: &SelectedFile) -> Result<Value, RequestError>;

    /// Run `kind` against the stored document `filename`.
    ///
    /// `question` is only sent for [`ActionKind::AskQuestion`].
    async fn fetch(
        &self,
        kind: ActionKind,
        filename: &str,
        question: &str,
    ) -> Result<Value, RequestError>;
}

/// The displayable result of one action request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Extracted text, or the newline-joined image/link list.
    Content { content: String },
    /// The answer to a question.
    Answer { answer: String },
    /// The reply succeeded but lacked the expected field.
    MissingField { kind: ActionKind },
    /// The request itself failed.
    Failed { error: RequestError },
}

impl ActionOutcome {
    /// Text shown in the result area for this outcome.
    pub fn display_text(&self) -> String {
        match self {
            ActionOutcome::Content { content } => content.clone(),
            ActionOutcome::Answer { answer } => answer.clone(),
            ActionOutcome::MissingField { kind } => kind.missing_field_message().to_string(),
            ActionOutcome::Failed { error } => error.inline_message(),
        }
    }
}

/// Interpret a successful reply for `kind`.
///
/// Empty `text`/`answer` strings count as missing, as does a list field that
/// is not a JSON array (the backend answers with a bare error string when its
/// extractor throws).
pub fn decode_reply(kind: ActionKind, body: &Value) -> ActionOutcome {
    let field = body.get(kind.response_field());
    match kind {
        ActionKind::ExtractText | ActionKind::AskQuestion => {
            match field.and_then(Value::as_str).filter(|s| !s.is_empty()) {
                Some(s) if kind == ActionKind::AskQuestion => ActionOutcome::Answer {
                    answer: s.to_string(),
                },
                Some(s) => ActionOutcome::Content {
                    content: s.to_string(),
                },
                None => ActionOutcome::MissingField { kind },
            }
        }
        ActionKind::ExtractImages | ActionKind::ExtractLinks => {
            match field.and_then(Value::as_array) {
                Some(entries) => ActionOutcome::Content {
                    content: join_entries(entries),
                },
                None => ActionOutcome::MissingField { kind },
            }
        }
    }
}

/// Join list entries with a single newline, preserving order.
fn join_entries(entries: &[Value]) -> String {
    entries
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run one action against `backend` and decode its reply.
pub async fn dispatch(
    backend: &dyn Backend,
    kind: ActionKind,
    filename: &str,
    question: &str,
) -> ActionOutcome {
    match backend.fetch(kind, filename, question).await {
        Ok(body) => {
            debug!("Response data for {}: {}", kind.command(), body);
            decode_reply(kind, &body)
        }
        Err(error) => ActionOutcome::Failed { error },
    }
}

// ── HTTP implementation ──────────────────────────────────────────────────

/// [`Backend`] over HTTP using reqwest.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    /// Build a client honouring the configured timeouts.
    pub fn new(config: &ClientConfig) -> Result<Self, DocAnalyzerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| DocAnalyzerError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn map_err(&self, e: reqwest::Error) -> RequestError {
        RequestError::from_reqwest(
            &e,
            self.config.request_timeout_secs,
            self.config.connect_timeout_secs,
        )
    }

    /// Any 2xx reply succeeds; only the status and reading the body can fail.
    async fn read_body(&self, response: reqwest::Response) -> Result<Value, RequestError> {
        let response = response.error_for_status().map_err(|e| self.map_err(e))?;
        let body = response.text().await.map_err(|e| self.map_err(e))?;
        Ok(parse_body(body))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload(&self, file: &SelectedFile) -> Result<Value, RequestError> {
        let url = self.config.endpoint("/upload/");
        info!("Uploading {} ({} bytes) to {}", file.name, file.len(), url);

        let part = Part::bytes(file.content.clone())
            .file_name(file.name.clone())
            .mime_str(mime_for(&file.name))
            .map_err(|e| self.map_err(e))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        self.read_body(response).await
    }

    async fn fetch(
        &self,
        kind: ActionKind,
        filename: &str,
        question: &str,
    ) -> Result<Value, RequestError> {
        let url = self.config.endpoint(kind.endpoint());
        let request = match kind {
            ActionKind::AskQuestion => {
                let form = Form::new()
                    .text("filename", filename.to_string())
                    .text("question", question.to_string());
                self.client.post(&url).multipart(form)
            }
            _ => self.client.get(&url).query(&[("filename", filename)]),
        };

        debug!("{} {} (filename={})", kind.command(), url, filename);
        let response = request.send().await.map_err(|e| self.map_err(e))?;
        self.read_body(response).await
    }
}

/// JSON when the body parses as JSON, otherwise the raw text as a string.
///
/// A non-JSON reply then decodes like any reply lacking the expected field.
fn parse_body(body: String) -> Value {
    match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => {
            debug!("Reply is not JSON ({} bytes), keeping it as text", body.len());
            Value::String(body)
        }
    }
}

/// Content type for the upload part, by extension.
fn mime_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_reply() {
        let out = decode_reply(ActionKind::ExtractText, &json!({ "text": "Hello world" }));
        assert_eq!(
            out,
            ActionOutcome::Content {
                content: "Hello world".into()
            }
        );
    }

    #[test]
    fn empty_text_counts_as_missing() {
        let out = decode_reply(ActionKind::ExtractText, &json!({ "text": "" }));
        assert_eq!(out.display_text(), "Error: No text data received.");
    }

    #[test]
    fn links_are_joined_in_order() {
        let out = decode_reply(
            ActionKind::ExtractLinks,
            &json!({ "links": ["http://a.com", "http://b.com"] }),
        );
        assert_eq!(out.display_text(), "http://a.com\nhttp://b.com");
    }

    #[test]
    fn join_edge_lengths() {
        let none = decode_reply(ActionKind::ExtractImages, &json!({ "image_paths": [] }));
        assert_eq!(none.display_text(), "");

        let one = decode_reply(ActionKind::ExtractImages, &json!({ "image_paths": ["a.png"] }));
        assert_eq!(one.display_text(), "a.png");

        let three = decode_reply(
            ActionKind::ExtractImages,
            &json!({ "image_paths": ["a.png", "b.png", "c.jpeg"] }),
        );
        assert_eq!(three.display_text(), "a.png\nb.png\nc.jpeg");
    }

    #[test]
    fn bare_error_string_is_missing_field() {
        let out = decode_reply(
            ActionKind::ExtractImages,
            &json!("Error extracting images: cannot open broken document"),
        );
        assert_eq!(
            out,
            ActionOutcome::MissingField {
                kind: ActionKind::ExtractImages
            }
        );
    }

    #[test]
    fn answer_reply() {
        let out = decode_reply(ActionKind::AskQuestion, &json!({ "answer": "42" }));
        assert_eq!(out, ActionOutcome::Answer { answer: "42".into() });

        let missing = decode_reply(ActionKind::AskQuestion, &json!({}));
        assert_eq!(missing.display_text(), "Error: No answer received.");
    }

    #[test]
    fn non_json_body_decodes_as_missing_field() {
        assert_eq!(parse_body(r#"{"text":"hi"}"#.into()), json!({ "text": "hi" }));
        assert_eq!(parse_body("ok".into()), json!("ok"));
        assert_eq!(parse_body(String::new()), json!(""));

        let out = decode_reply(ActionKind::ExtractText, &parse_body(String::new()));
        assert_eq!(out.display_text(), "Error: No text data received.");
        let out = decode_reply(ActionKind::ExtractLinks, &parse_body("<html>".into()));
        assert_eq!(out.display_text(), "Error: No link data received.");
    }

    #[test]
    fn mime_by_extension() {
        assert_eq!(mime_for("report.PDF"), "application/pdf");
        assert_eq!(mime_for("scan.tiff"), "image/tiff");
        assert_eq!(mime_for("README"), "application/octet-stream");
    }
}
