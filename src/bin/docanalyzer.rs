//! CLI binary for docanalyzer.
//!
//! A thin shim over the library crate: maps CLI flags to `ClientConfig`,
//! then either runs one action and prints its result, or starts an
//! interactive session that mirrors the upload → action → result views.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use docanalyzer::{
    render, ActionGate, ActionKind, ActionOutcome, ClientConfig, Clipboard, DocAnalyzerError,
    RequestError, ResponseOrdering, Session, SystemClipboard, WorkspaceObserver, DEFAULT_BASE_URL,
};
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal observer using indicatif ────────────────────────────────────────

/// Shows a spinner while a request is in flight and prints alerts.
struct CliObserver {
    /// The spinner of the request currently in flight, if any.
    spinner: Mutex<Option<ProgressBar>>,
    show_spinner: bool,
}

impl CliObserver {
    fn new(show_spinner: bool) -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
            show_spinner,
        })
    }

    fn spin(&self, prefix: &'static str, msg: String) {
        if !self.show_spinner {
            return;
        }
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix(prefix);
        bar.set_message(msg);
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Some(previous) = self.spinner.lock().replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn stop(&self) {
        if let Some(bar) = self.spinner.lock().take() {
            bar.finish_and_clear();
        }
    }
}

impl WorkspaceObserver for CliObserver {
    fn on_alert(&self, message: &str) {
        self.stop();
        eprintln!("{} {}", red("✘"), bold(message));
    }

    fn on_upload_start(&self, filename: &str, bytes: usize) {
        self.spin("Uploading", format!("{filename} ({bytes} bytes)"));
    }

    fn on_upload_complete(&self, filename: &str, _reply: &Value) {
        self.stop();
        eprintln!("{} {} uploaded", green("✔"), bold(filename));
    }

    fn on_upload_failed(&self, filename: &str, error: &RequestError) {
        self.stop();
        eprintln!("{}", dim(&format!("{filename}: {error}")));
        self.on_alert(docanalyzer::observer::UPLOAD_FAILED_ALERT);
    }

    fn on_action_start(&self, kind: ActionKind, filename: &str) {
        self.spin("Processing", format!("{} · {filename}", kind.label()));
    }

    fn on_action_complete(&self, _kind: ActionKind, _outcome: &ActionOutcome) {
        self.stop();
    }

    fn on_response_discarded(&self, kind: ActionKind, request_id: u64) {
        tracing::debug!("discarded {} response #{}", kind.command(), request_id);
    }
}

const COMMANDS: &str = r#"  open <path>      select and upload a document
  text             extract text
  images           extract images
  links            extract links
  qa               open the question panel
  ask <question>   ask a question about the document
  back             choose another action
  copy             copy the current extraction result
  show             redraw the current view
  help             list commands
  quit             leave"#;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive session (open a file, pick actions, copy results)
  docanalyzer

  # Upload and open the action menu straight away
  docanalyzer report.pdf

  # One-shot extraction to stdout
  docanalyzer report.pdf --action text
  docanalyzer scan.png --action links --copy

  # Ask a question
  docanalyzer report.pdf --action qa --question "What is the total?"

  # Structured output
  docanalyzer report.pdf --action images --json

INTERACTIVE COMMANDS:
  open <path>      select and upload a document
  text             extract text
  images           extract images
  links            extract links
  qa               open the question panel
  ask <question>   ask a question about the document
  back             choose another action
  copy             copy the current extraction result
  show             redraw the current view
  help             list commands
  quit             leave

ENVIRONMENT VARIABLES:
  DOCANALYZER_BASE_URL   Backend location (default http://127.0.0.1:8000)
  DOCANALYZER_TIMEOUT    Per-request timeout in seconds (default: none)
  RUST_LOG               Override the log filter
"#;

/// Upload documents to a DocAnalyzer backend and extract their content.
#[derive(Parser, Debug)]
#[command(
    name = "docanalyzer",
    version,
    about = "Upload documents to a DocAnalyzer backend and extract text, images, links or answers",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to upload (PDF, PNG, JPG, JPEG, TIFF).
    file: Option<PathBuf>,

    /// Run this action and print its result instead of starting a session.
    #[arg(short, long, value_enum, requires = "file")]
    action: Option<ActionArg>,

    /// Question for `--action qa`.
    #[arg(short = 'Q', long)]
    question: Option<String>,

    /// Backend base URL.
    #[arg(long, env = "DOCANALYZER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "DOCANALYZER_TIMEOUT")]
    timeout: Option<u64>,

    /// Refuse actions after a failed upload.
    #[arg(long, env = "DOCANALYZER_REQUIRE_UPLOAD")]
    require_upload: bool,

    /// Which response wins when requests overlap.
    #[arg(long, value_enum, default_value = "latest-request")]
    ordering: OrderingArg,

    /// Copy the extraction result to the system clipboard.
    #[arg(long)]
    copy: bool,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "DOCANALYZER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCANALYZER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, env = "DOCANALYZER_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ActionArg {
    Text,
    Images,
    Links,
    Qa,
}

impl From<ActionArg> for ActionKind {
    fn from(v: ActionArg) -> Self {
        match v {
            ActionArg::Text => ActionKind::ExtractText,
            ActionArg::Images => ActionKind::ExtractImages,
            ActionArg::Links => ActionKind::ExtractLinks,
            ActionArg::Qa => ActionKind::AskQuestion,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OrderingArg {
    LatestRequest,
    LastResolved,
}

impl From<OrderingArg> for ResponseOrdering {
    fn from(v: OrderingArg) -> Self {
        match v {
            OrderingArg::LatestRequest => ResponseOrdering::LatestRequest,
            OrderingArg::LastResolved => ResponseOrdering::LastResolved,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = check_flags(&cli) {
        e.exit();
    }

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers request progress, so library INFO logs only show
    // up in verbose mode.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let observer = CliObserver::new(!cli.quiet && !cli.no_progress && !cli.json);
    let session = Session::new(&config)
        .context("Failed to create session")?
        .with_observer(observer);

    match (cli.action, &cli.file) {
        (Some(action), Some(file)) => run_once(&cli, &session, file, action.into()).await,
        _ => run_interactive(&cli, &session).await,
    }
}

/// Flag combinations clap cannot express declaratively.
fn check_flags(cli: &Cli) -> Result<(), clap::Error> {
    if cli.copy && matches!(cli.action, Some(ActionArg::Qa)) {
        return Err(Cli::command().error(
            ErrorKind::ArgumentConflict,
            "--copy only applies to text, images and links; answers cannot be copied",
        ));
    }
    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder()
        .base_url(cli.base_url.as_str())
        .response_ordering(cli.ordering.into());
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if cli.require_upload {
        builder = builder.action_gate(ActionGate::RequireUpload);
    }
    builder.build().context("Invalid configuration")
}

// ── One-shot mode ────────────────────────────────────────────────────────────

async fn run_once(cli: &Cli, session: &Session, file: &Path, kind: ActionKind) -> Result<()> {
    let status = session
        .open(file)
        .await
        .with_context(|| format!("Failed to open {}", file.display()))?;
    tracing::debug!("upload status: {:?}", status);

    let outcome = if kind == ActionKind::AskQuestion {
        let question = cli
            .question
            .clone()
            .context("--action qa needs --question <TEXT>")?;
        session.ask(question).await?
    } else {
        session.run_action(kind).await?
    };

    if cli.json {
        let snapshot = session.snapshot();
        let out = json!({
            "file": snapshot.file().map(|f| f.name.clone()),
            "upload": snapshot.upload_status(),
            "action": kind,
            "outcome": outcome,
            "state": snapshot.action_state(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("Failed to serialise output")?
        );
    } else {
        let text = outcome.display_text();
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
        if !text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if cli.copy {
        let mut clipboard = SystemClipboard::new()?;
        let copied = session.copy_result(&mut clipboard)?;
        if !cli.quiet {
            eprintln!("{} copied {} chars", green("✔"), copied.len());
        }
    }

    match outcome {
        ActionOutcome::Failed { error } => {
            Err(anyhow::Error::new(error).context("Backend request failed"))
        }
        ActionOutcome::MissingField { kind } => anyhow::bail!(kind.missing_field_message()),
        _ => Ok(()),
    }
}

// ── Interactive mode ─────────────────────────────────────────────────────────

async fn run_interactive(cli: &Cli, session: &Session) -> Result<()> {
    eprintln!(
        "{} {}  {}",
        cyan("◆"),
        bold("DocAnalyzer"),
        dim(&format!("backend {}", cli.base_url))
    );

    if let Some(file) = &cli.file {
        if let Err(e) = session.open(file).await {
            eprintln!("{} {e}", red("✘"));
        }
    }
    show(session);

    // Kept alive for the whole session: some platforms drop the clipboard
    // contents together with the owning handle.
    let mut clipboard: Option<SystemClipboard> = None;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{} ", cyan("›"));
        io::stderr().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let result: Result<bool> = match command {
            "" => Ok(false),
            "quit" | "exit" | "q" => break,
            "help" | "?" => {
                eprintln!("{COMMANDS}");
                Ok(false)
            }
            "show" => Ok(true),
            "open" if rest.is_empty() => Err(anyhow::anyhow!("usage: open <path>")),
            "open" => session.open(rest).await.map(|_| true).map_err(Into::into),
            "back" => {
                session.back();
                Ok(true)
            }
            "ask" => session.ask(rest).await.map(|_| true).map_err(Into::into),
            "copy" => copy(session, &mut clipboard).map(|_| false),
            other => match other.parse::<ActionKind>() {
                Ok(kind) => session.choose(kind).await.map(|_| true).map_err(Into::into),
                Err(e) => Err(anyhow::anyhow!("{e}; type 'help' for commands")),
            },
        };

        match result {
            Ok(true) => show(session),
            Ok(false) => {}
            // Refusals were already shown as alerts by the observer.
            Err(e) if is_alerted(&e) => {}
            Err(e) => eprintln!("{} {e:#}", red("✘")),
        }
    }
    Ok(())
}

fn is_alerted(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<DocAnalyzerError>(),
        Some(DocAnalyzerError::NoDocument | DocAnalyzerError::UploadRequired { .. })
    )
}

fn show(session: &Session) {
    let view = session.read(render::render);
    print!("{view}");
    io::stdout().flush().ok();
}

fn copy(session: &Session, clipboard: &mut Option<SystemClipboard>) -> Result<()> {
    if clipboard.is_none() {
        *clipboard = Some(SystemClipboard::new()?);
    }
    let target: &mut dyn Clipboard = clipboard
        .as_mut()
        .context("Clipboard unavailable")?;
    let copied = session.copy_result(target)?;
    eprintln!("{} copied {} chars", green("✔"), copied.len());
    Ok(())
}
