//! The four backend operations a user can request against a document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder shown in the result area while a request is in flight.
pub const PROCESSING_PLACEHOLDER: &str = "Processing...";

/// One of the four mutually exclusive actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    ExtractText,
    ExtractImages,
    ExtractLinks,
    AskQuestion,
}

/// The three actions whose result is plain content with a copy affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionKind {
    Text,
    Images,
    Links,
}

impl ActionKind {
    /// All actions, in menu order.
    pub const ALL: [ActionKind; 4] = [
        ActionKind::ExtractText,
        ActionKind::ExtractImages,
        ActionKind::ExtractLinks,
        ActionKind::AskQuestion,
    ];

    /// Backend path for this action.
    pub fn endpoint(self) -> &'static str {
        match self {
            ActionKind::ExtractText => "/extract-text/",
            ActionKind::ExtractImages => "/extract-images/",
            ActionKind::ExtractLinks => "/extract-links/",
            ActionKind::AskQuestion => "/ask-question/",
        }
    }

    /// JSON field carrying the result in a successful reply.
    pub fn response_field(self) -> &'static str {
        match self {
            ActionKind::ExtractText => "text",
            ActionKind::ExtractImages => "image_paths",
            ActionKind::ExtractLinks => "links",
            ActionKind::AskQuestion => "answer",
        }
    }

    /// Inline message used when the reply lacks [`Self::response_field`].
    pub fn missing_field_message(self) -> &'static str {
        match self {
            ActionKind::ExtractText => "Error: No text data received.",
            ActionKind::ExtractImages => "Error: No image data received.",
            ActionKind::ExtractLinks => "Error: No link data received.",
            ActionKind::AskQuestion => "Error: No answer received.",
        }
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::ExtractText => "Extract Text",
            ActionKind::ExtractImages => "Extract Images",
            ActionKind::ExtractLinks => "Extract Links",
            ActionKind::AskQuestion => "Q&A",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ActionKind::ExtractText => "Extract plain text content from the document",
            ActionKind::ExtractImages => "Extract all images from the document",
            ActionKind::ExtractLinks => "Get all links mentioned in the document",
            ActionKind::AskQuestion => "Ask questions about your document content",
        }
    }

    /// Heading of the result view.
    pub fn title(self) -> &'static str {
        match self {
            ActionKind::ExtractText => "Extracted Text",
            ActionKind::ExtractImages => "Extracted Images",
            ActionKind::ExtractLinks => "Extracted Links",
            ActionKind::AskQuestion => "Ask Questions",
        }
    }

    /// The extraction variant, or `None` for Q&A.
    pub fn extraction(self) -> Option<ExtractionKind> {
        match self {
            ActionKind::ExtractText => Some(ExtractionKind::Text),
            ActionKind::ExtractImages => Some(ExtractionKind::Images),
            ActionKind::ExtractLinks => Some(ExtractionKind::Links),
            ActionKind::AskQuestion => None,
        }
    }

    /// Short command word used by the terminal front end.
    pub fn command(self) -> &'static str {
        match self {
            ActionKind::ExtractText => "text",
            ActionKind::ExtractImages => "images",
            ActionKind::ExtractLinks => "links",
            ActionKind::AskQuestion => "qa",
        }
    }
}

impl From<ExtractionKind> for ActionKind {
    fn from(kind: ExtractionKind) -> Self {
        match kind {
            ExtractionKind::Text => ActionKind::ExtractText,
            ExtractionKind::Images => ActionKind::ExtractImages,
            ExtractionKind::Links => ActionKind::ExtractLinks,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "extract-text" => Ok(ActionKind::ExtractText),
            "images" | "extract-images" => Ok(ActionKind::ExtractImages),
            "links" | "extract-links" => Ok(ActionKind::ExtractLinks),
            "qa" | "ask" | "ask-question" => Ok(ActionKind::AskQuestion),
            other => Err(format!(
                "unknown action '{other}' (expected text, images, links or qa)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_words() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.command().parse::<ActionKind>().unwrap(), kind);
        }
        assert_eq!(
            "Extract-Links".parse::<ActionKind>().unwrap(),
            ActionKind::ExtractLinks
        );
        assert!("summarise".parse::<ActionKind>().is_err());
    }

    #[test]
    fn only_qa_lacks_extraction() {
        assert_eq!(ActionKind::AskQuestion.extraction(), None);
        for kind in [ExtractionKind::Text, ExtractionKind::Images, ExtractionKind::Links] {
            assert_eq!(ActionKind::from(kind).extraction(), Some(kind));
        }
    }

    #[test]
    fn missing_field_messages_are_action_specific() {
        assert_eq!(
            ActionKind::ExtractText.missing_field_message(),
            "Error: No text data received."
        );
        assert_eq!(
            ActionKind::AskQuestion.missing_field_message(),
            "Error: No answer received."
        );
    }
}
