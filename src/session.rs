//! Async controller tying a [`Workspace`] to a [`Backend`].
//!
//! A [`Session`] is what a front end talks to: it resolves files, performs
//! the upload and action requests, feeds the outcomes back into the
//! workspace and notifies the [`WorkspaceObserver`]. It is cheap to clone;
//! clones share the same workspace, which is how [`Session::spawn_action`]
//! lets requests overlap.
//!
//! The workspace sits behind a `parking_lot::Mutex` that is only ever held
//! for a single synchronous transition, never across an `.await`.

use crate::action::ActionKind;
use crate::backend::{self, ActionOutcome, Backend, HttpBackend};
use crate::clipboard::Clipboard;
use crate::config::ClientConfig;
use crate::error::DocAnalyzerError;
use crate::intake::{self, SelectedFile};
use crate::observer::{NoopObserver, Observer};
use crate::workspace::{Applied, RequestTicket, UploadStatus, Workspace};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A document workspace bound to a backend.
#[derive(Clone)]
pub struct Session {
    backend: Arc<dyn Backend>,
    workspace: Arc<Mutex<Workspace>>,
    observer: Observer,
}

impl Session {
    /// Create a session talking HTTP to `config.base_url`.
    pub fn new(config: &ClientConfig) -> Result<Self, DocAnalyzerError> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Create a session over any [`Backend`].
    pub fn with_backend(config: &ClientConfig, backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            workspace: Arc::new(Mutex::new(Workspace::from_config(config))),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    /// A copy of the current view state.
    pub fn snapshot(&self) -> Workspace {
        self.workspace.lock().clone()
    }

    /// Read the view state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&Workspace) -> R) -> R {
        f(&self.workspace.lock())
    }

    // ── File intake ──────────────────────────────────────────────────────

    /// Read `path` from disk, select it and upload it.
    pub async fn open(&self, path: impl AsRef<Path>) -> Result<UploadStatus, DocAnalyzerError> {
        let file = intake::resolve_file(path).await?;
        Ok(self.select_file(file).await)
    }

    /// Select `file` (resetting all per-action state) and upload it.
    ///
    /// A failed upload raises an alert and leaves the file selected.
    pub async fn select_file(&self, file: SelectedFile) -> UploadStatus {
        let ticket = self.workspace.lock().select_file(file.clone());
        self.observer.on_upload_start(&file.name, file.len());

        let result = self.backend.upload(&file).await;
        let (current, status) = {
            let mut ws = self.workspace.lock();
            let current = ws.finish_upload(ticket, result.as_ref().map(|_| ()));
            (current, ws.upload_status().clone())
        };
        if !current {
            debug!("Upload of {} finished after the file was replaced", file.name);
            return status;
        }

        match &result {
            Ok(reply) => {
                info!("File uploaded: {}", reply);
                self.observer.on_upload_complete(&file.name, reply);
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", file.name, e);
                self.observer.on_upload_failed(&file.name, e);
            }
        }
        status
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Click on an action in the menu.
    ///
    /// Extraction actions are dispatched immediately. Q&A only opens the
    /// question panel; nothing is sent until [`Self::ask`].
    pub async fn choose(&self, kind: ActionKind) -> Result<Option<ActionOutcome>, DocAnalyzerError> {
        if kind == ActionKind::AskQuestion {
            let opened = self.workspace.lock().open_questions();
            return opened.map(|()| None).map_err(|e| self.alert(e));
        }
        self.run_action(kind).await.map(Some)
    }

    /// Dispatch `kind` and wait for its outcome.
    ///
    /// The returned outcome is what the backend said; whether it was shown
    /// depends on the configured response ordering.
    pub async fn run_action(&self, kind: ActionKind) -> Result<ActionOutcome, DocAnalyzerError> {
        let ticket = self.begin(kind)?;
        Ok(self.complete(ticket).await)
    }

    /// Dispatch `kind` on a background task.
    ///
    /// Validation happens synchronously, so the processing state is visible
    /// as soon as this returns.
    pub fn spawn_action(&self, kind: ActionKind) -> Result<JoinHandle<ActionOutcome>, DocAnalyzerError> {
        let ticket = self.begin(kind)?;
        let session = self.clone();
        Ok(tokio::spawn(async move { session.complete(ticket).await }))
    }

    /// Submit `question` from the Q&A panel, opening it if needed.
    pub async fn ask(&self, question: impl Into<String>) -> Result<ActionOutcome, DocAnalyzerError> {
        let opened = {
            let mut ws = self.workspace.lock();
            ws.open_questions().map(|()| ws.set_question(question))
        };
        opened.map_err(|e| self.alert(e))?;
        self.run_action(ActionKind::AskQuestion).await
    }

    /// Edit the question text without submitting it.
    pub fn set_question(&self, question: impl Into<String>) -> bool {
        self.workspace.lock().set_question(question)
    }

    /// "Choose another action".
    pub fn back(&self) {
        self.workspace.lock().back();
    }

    /// Copy the current extraction result verbatim. Returns the copied text.
    pub fn copy_result(&self, clipboard: &mut dyn Clipboard) -> Result<String, DocAnalyzerError> {
        let text = self.read(|ws| ws.copy_text().map(str::to_string))?;
        clipboard.set_text(&text)?;
        info!("Copied {} chars to clipboard", text.len());
        Ok(text)
    }

    fn begin(&self, kind: ActionKind) -> Result<RequestTicket, DocAnalyzerError> {
        let started = self.workspace.lock().begin_action(kind);
        let ticket = started.map_err(|e| self.alert(e))?;
        info!(
            "Dispatching {} for {} (request #{})",
            kind.command(),
            ticket.filename(),
            ticket.id()
        );
        self.observer.on_action_start(kind, ticket.filename());
        Ok(ticket)
    }

    async fn complete(&self, ticket: RequestTicket) -> ActionOutcome {
        let outcome = backend::dispatch(
            self.backend.as_ref(),
            ticket.kind(),
            ticket.filename(),
            ticket.question(),
        )
        .await;

        if let ActionOutcome::Failed { error } = &outcome {
            warn!("Error calling backend for {}: {}", ticket.kind().command(), error);
        }

        let applied = self.workspace.lock().apply(&ticket, &outcome);
        match applied {
            Applied::Written => self.observer.on_action_complete(ticket.kind(), &outcome),
            Applied::Discarded => self
                .observer
                .on_response_discarded(ticket.kind(), ticket.id()),
        }
        outcome
    }

    /// Surface workspace refusals as alerts before returning them.
    fn alert(&self, e: DocAnalyzerError) -> DocAnalyzerError {
        if matches!(
            e,
            DocAnalyzerError::NoDocument | DocAnalyzerError::UploadRequired { .. }
        ) {
            self.observer.on_alert(&e.to_string());
        }
        e
    }
}
