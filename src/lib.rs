//! # docanalyzer
//!
//! Client for a DocAnalyzer document-analysis backend: upload a document,
//! then extract its text, images or links, or ask questions about it.
//!
//! All document processing (parsing, OCR, link extraction, question
//! answering) happens in the backend. This crate owns the client side: the
//! upload → choose-action → result state machine and the HTTP contract.
//!
//! ## Overview
//!
//! ```text
//! path ──▶ intake ──▶ Session::select_file ──▶ POST /upload/
//!                          │
//!                          ├─ choose / run_action ──▶ GET /extract-{text,images,links}/
//!                          ├─ ask                  ──▶ POST /ask-question/
//!                          └─ Workspace (view state, tickets) ──▶ render / copy
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docanalyzer::{ActionKind, ClientConfig, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new(&ClientConfig::default())?;
//!     session.open("report.pdf").await?;
//!     session.run_action(ActionKind::ExtractText).await?;
//!     println!("{}", session.read(|ws| ws.result_content().to_string()));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature     | Default | Description |
//! |-------------|---------|-------------|
//! | `cli`       | on      | Enables the `docanalyzer` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `clipboard` | via cli | System clipboard support through arboard |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod action;
pub mod backend;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod intake;
pub mod observer;
pub mod render;
pub mod session;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use action::{ActionKind, ExtractionKind, PROCESSING_PLACEHOLDER};
pub use backend::{decode_reply, ActionOutcome, Backend, HttpBackend};
pub use clipboard::{Clipboard, MemoryClipboard};
#[cfg(feature = "clipboard")]
pub use clipboard::SystemClipboard;
pub use config::{ActionGate, ClientConfig, ClientConfigBuilder, ResponseOrdering, DEFAULT_BASE_URL};
pub use error::{DocAnalyzerError, RequestError};
pub use intake::{resolve_file, SelectedFile, ACCEPTED_EXTENSIONS};
pub use observer::{NoopObserver, Observer, WorkspaceObserver};
pub use session::Session;
pub use workspace::{ActionState, Applied, QuestionPanel, RequestTicket, UploadStatus, View, Workspace};
