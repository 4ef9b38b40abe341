//! The document workspace: a synchronous view-state machine.
//!
//! Everything the user sees is derived from one [`Workspace`]: which file is
//! selected, whether its upload went through, and which action (with its
//! result) is active. The workspace performs no I/O. Callers start an
//! operation, get a ticket, perform the request themselves and hand the
//! outcome back together with the ticket:
//!
//! ```text
//!   select_file ──▶ UploadTicket ──▶ (upload) ──▶ finish_upload
//!   begin_action ─▶ RequestTicket ─▶ (request) ─▶ apply
//! ```
//!
//! Tickets make overlapping requests safe. Each file selection starts a new
//! generation and each dispatch takes a fresh request id; what happens to a
//! response whose id is no longer the latest is decided by
//! [`ResponseOrdering`].
//!
//! ## Views
//!
//! ```text
//!   Landing ──select──▶ FileSelected ──action──▶ ActionActive
//!                          ▲   ◀────────back──────────┘
//!                          └──select (from any view)
//! ```

use crate::action::{ActionKind, ExtractionKind, PROCESSING_PLACEHOLDER};
use crate::backend::ActionOutcome;
use crate::config::{ActionGate, ClientConfig, ResponseOrdering};
use crate::error::{DocAnalyzerError, RequestError};
use crate::intake::SelectedFile;
use serde::Serialize;
use tracing::debug;

/// Outcome of the most recent upload of the selected file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadStatus {
    /// No file selected yet.
    #[default]
    NotStarted,
    /// Upload in flight. Counts as uploaded until told otherwise.
    Pending,
    Uploaded,
    Failed { reason: String },
}

impl UploadStatus {
    /// The optimistic "is the file on the backend" flag.
    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadStatus::Pending | UploadStatus::Uploaded)
    }
}

/// State of the question-and-answer panel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QuestionPanel {
    pub question: String,
    /// Answer text, or the no-answer message. Empty until a reply arrives.
    pub answer: String,
    /// Inline failure text when the request itself failed.
    pub error: Option<String>,
    pub pending: bool,
}

/// The active action together with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionState {
    #[default]
    None,
    Extraction {
        kind: ExtractionKind,
        content: String,
    },
    Question(QuestionPanel),
}

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// No file chosen yet.
    Landing,
    /// File chosen, action menu shown.
    FileSelected,
    /// An action's result (or the Q&A panel) is shown.
    ActionActive,
}

/// Handed out by [`Workspace::select_file`]; presented to
/// [`Workspace::finish_upload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
}

/// Handed out by [`Workspace::begin_action`]; presented to [`Workspace::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    id: u64,
    generation: u64,
    epoch: u64,
    kind: ActionKind,
    filename: String,
    question: String,
}

impl RequestTicket {
    /// Monotonically increasing per workspace.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Backend lookup key of the document.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The question sent with a Q&A request; empty otherwise.
    pub fn question(&self) -> &str {
        &self.question
    }
}

/// Whether a response made it into the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Written,
    /// The response belonged to a superseded request or file and was dropped.
    Discarded,
}

/// All view state of the document workspace.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    file: Option<SelectedFile>,
    upload: UploadStatus,
    action: ActionState,
    gate: ActionGate,
    ordering: ResponseOrdering,
    generation: u64,
    /// Bumped whenever the result view is closed.
    epoch: u64,
    next_request: u64,
    latest_request: Option<u64>,
}

impl Workspace {
    pub fn new(gate: ActionGate, ordering: ResponseOrdering) -> Self {
        Self {
            gate,
            ordering,
            ..Self::default()
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.action_gate, config.response_ordering)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn view(&self) -> View {
        match (&self.file, &self.action) {
            (None, _) => View::Landing,
            (Some(_), ActionState::None) => View::FileSelected,
            (Some(_), _) => View::ActionActive,
        }
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn upload_status(&self) -> &UploadStatus {
        &self.upload
    }

    pub fn action_state(&self) -> &ActionState {
        &self.action
    }

    pub fn selected_action(&self) -> Option<ActionKind> {
        match &self.action {
            ActionState::None => None,
            ActionState::Extraction { kind, .. } => Some((*kind).into()),
            ActionState::Question(_) => Some(ActionKind::AskQuestion),
        }
    }

    /// Extraction content; empty unless an extraction is active.
    pub fn result_content(&self) -> &str {
        match &self.action {
            ActionState::Extraction { content, .. } => content,
            _ => "",
        }
    }

    /// Answer text; empty unless the Q&A panel is active.
    pub fn answer(&self) -> &str {
        match &self.action {
            ActionState::Question(panel) => &panel.answer,
            _ => "",
        }
    }

    /// Question text; empty unless the Q&A panel is active.
    pub fn question(&self) -> &str {
        match &self.action {
            ActionState::Question(panel) => &panel.question,
            _ => "",
        }
    }

    /// Whether a dispatched request has not been answered yet.
    pub fn is_pending(&self) -> bool {
        self.latest_request.is_some()
    }

    /// The text "copy to clipboard" would copy.
    ///
    /// Only extraction results can be copied; the Q&A view has no copy
    /// affordance.
    pub fn copy_text(&self) -> Result<&str, DocAnalyzerError> {
        match &self.action {
            ActionState::Extraction { content, .. } => Ok(content),
            _ => Err(DocAnalyzerError::CopyUnavailable),
        }
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Replace the selected file and reset every per-action field.
    ///
    /// The upload status turns optimistically to pending; the caller uploads
    /// and reports back through [`Self::finish_upload`].
    pub fn select_file(&mut self, file: SelectedFile) -> UploadTicket {
        self.generation += 1;
        self.epoch += 1;
        self.file = Some(file);
        self.upload = UploadStatus::Pending;
        self.action = ActionState::None;
        self.latest_request = None;
        UploadTicket {
            generation: self.generation,
        }
    }

    /// Record the upload result. Returns `false` when the ticket belongs to
    /// a file that has since been replaced.
    pub fn finish_upload(&mut self, ticket: UploadTicket, result: Result<(), &RequestError>) -> bool {
        if ticket.generation != self.generation {
            debug!("Ignoring upload result for a replaced file");
            return false;
        }
        self.upload = match result {
            Ok(()) => UploadStatus::Uploaded,
            Err(e) => UploadStatus::Failed {
                reason: e.to_string(),
            },
        };
        true
    }

    /// Show the Q&A panel without sending anything.
    pub fn open_questions(&mut self) -> Result<(), DocAnalyzerError> {
        self.check_gate()?;
        if !matches!(self.action, ActionState::Question(_)) {
            self.epoch += 1;
            self.action = ActionState::Question(QuestionPanel::default());
            self.latest_request = None;
        }
        Ok(())
    }

    /// Update the question text. Ignored unless the Q&A panel is shown.
    pub fn set_question(&mut self, question: impl Into<String>) -> bool {
        match &mut self.action {
            ActionState::Question(panel) => {
                panel.question = question.into();
                true
            }
            _ => false,
        }
    }

    /// Start an action: validate, show the processing state, hand out a ticket.
    ///
    /// For [`ActionKind::AskQuestion`] the current question is sent.
    pub fn begin_action(&mut self, kind: ActionKind) -> Result<RequestTicket, DocAnalyzerError> {
        let filename = self.check_gate()?.to_string();

        let question = match kind.extraction() {
            Some(extraction) => {
                self.action = ActionState::Extraction {
                    kind: extraction,
                    content: PROCESSING_PLACEHOLDER.to_string(),
                };
                String::new()
            }
            None => {
                let question = self.question().to_string();
                self.action = ActionState::Question(QuestionPanel {
                    question: question.clone(),
                    answer: String::new(),
                    error: None,
                    pending: true,
                });
                question
            }
        };

        self.next_request += 1;
        self.latest_request = Some(self.next_request);

        Ok(RequestTicket {
            id: self.next_request,
            generation: self.generation,
            epoch: self.epoch,
            kind,
            filename,
            question,
        })
    }

    /// Apply a response to the view.
    ///
    /// Responses for a replaced file, or arriving after the user went back to
    /// the action menu, are always discarded. Otherwise the configured
    /// [`ResponseOrdering`] decides whether a superseded request may write.
    pub fn apply(&mut self, ticket: &RequestTicket, outcome: &ActionOutcome) -> Applied {
        if ticket.generation != self.generation
            || ticket.epoch != self.epoch
            || matches!(self.action, ActionState::None)
        {
            debug!("Discarding response #{} for a closed view", ticket.id);
            return Applied::Discarded;
        }

        let is_latest = self.latest_request == Some(ticket.id);
        if !is_latest && self.ordering == ResponseOrdering::LatestRequest {
            debug!(
                "Discarding response #{} ({}); latest request is #{:?}",
                ticket.id,
                ticket.kind.command(),
                self.latest_request
            );
            return Applied::Discarded;
        }
        if is_latest {
            self.latest_request = None;
        }

        self.action = match ticket.kind.extraction() {
            Some(kind) => ActionState::Extraction {
                kind,
                content: outcome.display_text(),
            },
            None => {
                // Keep whatever the user typed meanwhile.
                let question = match &self.action {
                    ActionState::Question(panel) => panel.question.clone(),
                    _ => ticket.question.clone(),
                };
                let (answer, error) = match outcome {
                    ActionOutcome::Failed { error } => (String::new(), Some(error.inline_message())),
                    other => (other.display_text(), None),
                };
                ActionState::Question(QuestionPanel {
                    question,
                    answer,
                    error,
                    pending: !is_latest && self.latest_request.is_some(),
                })
            }
        };
        Applied::Written
    }

    /// "Choose another action": back to the menu, keeping file and upload.
    pub fn back(&mut self) {
        self.epoch += 1;
        self.action = ActionState::None;
        self.latest_request = None;
    }

    fn check_gate(&self) -> Result<&str, DocAnalyzerError> {
        let file = self.file.as_ref().ok_or(DocAnalyzerError::NoDocument)?;
        if self.gate == ActionGate::RequireUpload && matches!(self.upload, UploadStatus::Failed { .. }) {
            return Err(DocAnalyzerError::UploadRequired {
                filename: file.name.clone(),
            });
        }
        Ok(&file.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SelectedFile {
        SelectedFile::new("report.pdf", b"%PDF".to_vec())
    }

    fn content(s: &str) -> ActionOutcome {
        ActionOutcome::Content { content: s.into() }
    }

    fn workspace_with_file(ordering: ResponseOrdering) -> Workspace {
        let mut ws = Workspace::new(ActionGate::RequireFile, ordering);
        let t = ws.select_file(report());
        assert!(ws.finish_upload(t, Ok(())));
        ws
    }

    #[test]
    fn starts_on_landing() {
        let ws = Workspace::default();
        assert_eq!(ws.view(), View::Landing);
        assert_eq!(ws.upload_status(), &UploadStatus::NotStarted);
        assert!(!ws.upload_status().is_uploaded());
    }

    #[test]
    fn action_without_file_is_refused() {
        let mut ws = Workspace::default();
        for kind in ActionKind::ALL {
            let err = ws.begin_action(kind).unwrap_err();
            assert!(matches!(err, DocAnalyzerError::NoDocument));
        }
        assert!(ws.open_questions().is_err());
        assert_eq!(ws.view(), View::Landing);
    }

    #[test]
    fn selecting_file_resets_action_state() {
        let mut ws = workspace_with_file(ResponseOrdering::LatestRequest);
        ws.open_questions().unwrap();
        ws.set_question("What is the total?");
        let t = ws.begin_action(ActionKind::AskQuestion).unwrap();
        ws.apply(&t, &ActionOutcome::Answer { answer: "42".into() });
        assert_eq!(ws.answer(), "42");

        let _ = ws.select_file(SelectedFile::new("other.png", vec![1, 2]));
        assert_eq!(ws.view(), View::FileSelected);
        assert_eq!(ws.selected_action(), None);
        assert_eq!(ws.answer(), "");
        assert_eq!(ws.question(), "");
        assert_eq!(ws.result_content(), "");
        assert_eq!(ws.upload_status(), &UploadStatus::Pending);
        assert!(ws.upload_status().is_uploaded());
    }

    #[test]
    fn extraction_shows_processing_then_result() {
        let mut ws = workspace_with_file(ResponseOrdering::LatestRequest);
        let t = ws.begin_action(ActionKind::ExtractText).unwrap();
        assert_eq!(ws.view(), View::ActionActive);
        assert_eq!(ws.result_content(), "Processing...");
        assert!(ws.is_pending());
        assert_eq!(t.filename(), "report.pdf");

        assert_eq!(ws.apply(&t, &content("Hello world")), Applied::Written);
        assert_eq!(ws.result_content(), "Hello world");
        assert_eq!(ws.copy_text().unwrap(), "Hello world");
        assert!(!ws.is_pending());
    }

    #[test]
    fn failed_request_renders_inline() {
        let mut ws = workspace_with_file(ResponseOrdering::LatestRequest);
        let t = ws.begin_action(ActionKind::ExtractLinks).unwrap();
        ws.apply(
            &t,
            &ActionOutcome::Failed {
                error: RequestError::Status { status: 500 },
            },
        );
        assert_eq!(
            ws.result_content(),
            "Error: Request failed with status code 500"
        );
        assert_eq!(ws.answer(), "");
    }

    #[test]
    fn question_flow_has_no_copy() {
        let mut ws = workspace_with_file(ResponseOrdering::LatestRequest);
        ws.open_questions().unwrap();
        assert_eq!(ws.view(), View::ActionActive);
        assert!(!ws.is_pending());
        assert!(ws.set_question("What is the total?"));

        let t = ws.begin_action(ActionKind::AskQuestion).unwrap();
        assert_eq!(t.question(), "What is the total?");
        ws.apply(&t, &ActionOutcome::Answer { answer: "42".into() });

        assert_eq!(ws.answer(), "42");
        assert_eq!(ws.result_content(), "");
        assert_eq!(ws.question(), "What is the total?");
        assert!(matches!(ws.copy_text(), Err(DocAnalyzerError::CopyUnavailable)));
    }

    #[test]
    fn question_failure_clears_answer() {
        let mut ws = workspace_with_file(ResponseOrdering::LatestRequest);
        ws.open_questions().unwrap();
        let t = ws.begin_action(ActionKind::AskQuestion).unwrap();
        ws.apply(
            &t,
            &ActionOutcome::Failed {
                error: RequestError::Connect {
                    detail: "connection refused".into(),
                },
            },
        );
        match ws.action_state() {
            ActionState::Question(panel) => {
                assert_eq!(panel.answer, "");
                assert_eq!(
                    panel.error.as_deref(),
                    Some("Error: Network Error: connection refused")
                );
                assert!(!panel.pending);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn back_keeps_file_and_upload() {
        let mut ws = workspace_with_file(ResponseOrdering::LatestRequest);
        ws.open_questions().unwrap();
        ws.set_question("anything");
        ws.back();
        assert_eq!(ws.view(), View::FileSelected);
        assert_eq!(ws.question(), "");
        assert_eq!(ws.file().unwrap().name, "report.pdf");
        assert_eq!(ws.upload_status(), &UploadStatus::Uploaded);
    }

    #[test]
    fn latest_request_wins_regardless_of_resolve_order() {
        let mut ws = workspace_with_file(ResponseOrdering::LatestRequest);
        let first = ws.begin_action(ActionKind::ExtractText).unwrap();
        let second = ws.begin_action(ActionKind::ExtractLinks).unwrap();
        assert!(second.id() > first.id());

        assert_eq!(ws.apply(&second, &content("http://a.com")), Applied::Written);
        assert_eq!(ws.apply(&first, &content("old text")), Applied::Discarded);
        assert_eq!(ws.selected_action(), Some(ActionKind::ExtractLinks));
        assert_eq!(ws.result_content(), "http://a.com");
    }

    #[test]
    fn last_resolved_wins_when_configured() {
        let mut ws = workspace_with_file(ResponseOrdering::LastResolved);
        let first = ws.begin_action(ActionKind::ExtractText).unwrap();
        let second = ws.begin_action(ActionKind::ExtractLinks).unwrap();

        assert_eq!(ws.apply(&second, &content("http://a.com")), Applied::Written);
        assert_eq!(ws.apply(&first, &content("late text")), Applied::Written);
        assert_eq!(ws.selected_action(), Some(ActionKind::ExtractText));
        assert_eq!(ws.result_content(), "late text");
    }

    #[test]
    fn response_after_back_is_discarded() {
        let mut ws = workspace_with_file(ResponseOrdering::LastResolved);
        let t = ws.begin_action(ActionKind::ExtractImages).unwrap();
        ws.back();
        assert_eq!(ws.apply(&t, &content("a.png")), Applied::Discarded);
        assert_eq!(ws.view(), View::FileSelected);
    }

    #[test]
    fn response_from_before_back_cannot_overwrite_next_action() {
        let mut ws = workspace_with_file(ResponseOrdering::LastResolved);
        let old = ws.begin_action(ActionKind::ExtractText).unwrap();
        ws.back();
        let new = ws.begin_action(ActionKind::ExtractLinks).unwrap();

        assert_eq!(ws.apply(&new, &content("http://a.com")), Applied::Written);
        assert_eq!(ws.apply(&old, &content("old text")), Applied::Discarded);
        assert_eq!(ws.selected_action(), Some(ActionKind::ExtractLinks));
        assert_eq!(ws.result_content(), "http://a.com");
    }

    #[test]
    fn response_for_replaced_file_is_discarded() {
        let mut ws = workspace_with_file(ResponseOrdering::LastResolved);
        let t = ws.begin_action(ActionKind::ExtractText).unwrap();
        let _ = ws.select_file(SelectedFile::new("new.pdf", vec![]));
        assert_eq!(ws.apply(&t, &content("stale")), Applied::Discarded);
        assert_eq!(ws.result_content(), "");
    }

    #[test]
    fn stale_upload_result_is_ignored() {
        let mut ws = Workspace::default();
        let old = ws.select_file(report());
        let new = ws.select_file(SelectedFile::new("b.pdf", vec![]));
        assert!(!ws.finish_upload(old, Err(&RequestError::Status { status: 500 })));
        assert_eq!(ws.upload_status(), &UploadStatus::Pending);
        assert!(ws.finish_upload(new, Ok(())));
        assert_eq!(ws.upload_status(), &UploadStatus::Uploaded);
    }

    #[test]
    fn failed_upload_still_allows_actions_by_default() {
        let mut ws = Workspace::default();
        let t = ws.select_file(report());
        ws.finish_upload(t, Err(&RequestError::Connect { detail: "refused".into() }));
        assert!(!ws.upload_status().is_uploaded());
        assert_eq!(ws.view(), View::FileSelected);

        let ticket = ws.begin_action(ActionKind::ExtractText).unwrap();
        assert_eq!(ticket.filename(), "report.pdf");
    }

    #[test]
    fn require_upload_gate_blocks_after_failure() {
        let mut ws = Workspace::new(ActionGate::RequireUpload, ResponseOrdering::LatestRequest);
        let t = ws.select_file(report());
        ws.finish_upload(t, Err(&RequestError::Status { status: 500 }));

        let err = ws.begin_action(ActionKind::ExtractText).unwrap_err();
        assert!(matches!(err, DocAnalyzerError::UploadRequired { .. }));
        assert_eq!(ws.view(), View::FileSelected);
    }
}
