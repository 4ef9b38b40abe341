//! Plain-text rendering of the workspace views.
//!
//! Results are emitted verbatim: no trimming, wrapping or escaping, so what
//! is printed is byte-for-byte what "copy to clipboard" would copy.

use crate::action::ActionKind;
use crate::intake::ACCEPTED_EXTENSIONS;
use crate::workspace::{ActionState, UploadStatus, View, Workspace};
use std::fmt::Write;

/// Render whichever view the workspace is in.
pub fn render(ws: &Workspace) -> String {
    match ws.view() {
        View::Landing => render_landing(),
        View::FileSelected => render_menu(ws),
        View::ActionActive => render_result(ws),
    }
}

/// The landing view: what to do and which formats are supported.
pub fn render_landing() -> String {
    let formats: Vec<String> = ACCEPTED_EXTENSIONS
        .iter()
        .map(|e| e.to_ascii_uppercase())
        .collect();
    format!(
        "Upload Your Documents\n\
         Select a file to upload (open <path>).\n\
         Supported formats: {}\n",
        formats.join(", ")
    )
}

/// The action menu for the selected file.
pub fn render_menu(ws: &Workspace) -> String {
    let mut out = String::new();
    let name = ws.file().map(|f| f.name.as_str()).unwrap_or_default();
    let _ = writeln!(out, "Choose an Action");
    let _ = writeln!(out, "Select what you'd like to do with \"{name}\"");
    if let UploadStatus::Failed { reason } = ws.upload_status() {
        let _ = writeln!(out, "(upload failed: {reason})");
    }
    for kind in ActionKind::ALL {
        let _ = writeln!(
            out,
            "  {:<7} {:<15} {}",
            kind.command(),
            kind.label(),
            kind.description()
        );
    }
    out
}

/// The result view of the active action.
pub fn render_result(ws: &Workspace) -> String {
    let mut out = String::new();
    match ws.action_state() {
        ActionState::None => {}
        ActionState::Extraction { kind, content } => {
            let kind = ActionKind::from(*kind);
            let _ = writeln!(out, "{}    [back] [copy]", kind.title());
            out.push('\n');
            out.push_str(content);
            out.push('\n');
        }
        ActionState::Question(panel) => {
            let _ = writeln!(out, "{}    [back]", ActionKind::AskQuestion.title());
            out.push('\n');
            if panel.question.is_empty() {
                out.push_str("Ask a question about your document... (ask <question>)\n");
            } else {
                let _ = writeln!(out, "Question: {}", panel.question);
            }
            if panel.pending {
                out.push_str("Processing...\n");
            }
            if let Some(error) = &panel.error {
                let _ = writeln!(out, "{error}");
            }
            if !panel.answer.is_empty() {
                out.push_str("Answer:\n");
                out.push_str(&panel.answer);
                out.push('\n');
            }
        }
    }
    out
}

/// Whether the current view offers "copy to clipboard".
pub fn has_copy_affordance(ws: &Workspace) -> bool {
    matches!(ws.action_state(), ActionState::Extraction { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ActionOutcome;
    use crate::intake::SelectedFile;

    fn ws_with_file() -> Workspace {
        let mut ws = Workspace::default();
        let t = ws.select_file(SelectedFile::new("report.pdf", vec![]));
        ws.finish_upload(t, Ok(()));
        ws
    }

    #[test]
    fn landing_lists_formats() {
        let out = render(&Workspace::default());
        assert!(out.contains("PDF, PNG, JPG, JPEG, TIFF"), "got: {out}");
    }

    #[test]
    fn menu_names_file_and_actions() {
        let out = render(&ws_with_file());
        assert!(out.contains("\"report.pdf\""));
        for kind in ActionKind::ALL {
            assert!(out.contains(kind.label()));
        }
    }

    #[test]
    fn result_is_verbatim() {
        let mut ws = ws_with_file();
        let t = ws.begin_action(ActionKind::ExtractText).unwrap();
        let text = "  indented\n\ttabbed  \n";
        ws.apply(&t, &ActionOutcome::Content { content: text.into() });

        let out = render(&ws);
        assert!(out.starts_with("Extracted Text"));
        assert!(out.contains(text));
        assert!(has_copy_affordance(&ws));
    }

    #[test]
    fn question_view_has_no_copy() {
        let mut ws = ws_with_file();
        ws.open_questions().unwrap();
        ws.set_question("What is the total?");
        let t = ws.begin_action(ActionKind::AskQuestion).unwrap();
        assert!(render(&ws).contains("Processing..."));

        ws.apply(&t, &ActionOutcome::Answer { answer: "42".into() });
        let out = render(&ws);
        assert!(out.starts_with("Ask Questions"));
        assert!(!out.contains("[copy]"));
        assert!(out.ends_with("Answer:\n42\n"), "got: {out}");
        assert!(!has_copy_affordance(&ws));
    }
}
