//! System clipboard access.
//!
//! Write-only: the page reads pasted images itself and forwards them
//! (see `acquire::paste`). Uses arboard for native clipboard access,
//! which works reliably where `navigator.clipboard` in a webview does not.

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(#[source] arboard::Error),
    #[error("clipboard write failed: {0}")]
    Write(#[source] arboard::Error),
}

pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Native clipboard via arboard. A fresh handle is opened per write;
/// holding one open across the app's lifetime misbehaves on X11.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new().map_err(ClipboardError::Unavailable)?;
        clipboard.set_text(text).map_err(ClipboardError::Write)?;
        log::info!("[CLIPBOARD] Copied {} chars", text.chars().count());
        Ok(())
    }
}
