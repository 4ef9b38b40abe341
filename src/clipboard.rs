//! Clipboard targets for the "copy to clipboard" affordance.

use crate::error::DocAnalyzerError;

/// Somewhere copied text can go.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), DocAnalyzerError>;
}

/// In-process clipboard. Used in tests and when no system clipboard exists.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last copied text, if any.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), DocAnalyzerError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// The operating system clipboard.
#[cfg(feature = "clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    pub fn new() -> Result<Self, DocAnalyzerError> {
        let inner =
            arboard::Clipboard::new().map_err(|e| DocAnalyzerError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), DocAnalyzerError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| DocAnalyzerError::Clipboard(e.to_string()))
    }
}
