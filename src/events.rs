//! Event names shared with the page, and the Tauri-backed observer.
//!
//! Outbound: `shell-state` (full view after every transition),
//! `shell-notice` (warnings), `ocr-progress` (engine progress).
//! Inbound: `clipboard-paste` (see `acquire::paste`).
//!
//! Blocking notices are additionally raised as a native warning dialog,
//! so the user has to acknowledge them.

use crate::ocr::OcrProgress;
use crate::shell::types::{Notice, Severity, ShellView};
use crate::shell::ShellObserver;
use tauri::{AppHandle, Emitter};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

pub const STATE_EVENT: &str = "shell-state";
pub const NOTICE_EVENT: &str = "shell-notice";
pub const PROGRESS_EVENT: &str = "ocr-progress";
pub const PASTE_EVENT: &str = "clipboard-paste";

const DIALOG_TITLE: &str = "Image to Text";

pub struct TauriObserver {
    app: AppHandle,
}

impl TauriObserver {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl ShellObserver for TauriObserver {
    fn on_state(&self, view: &ShellView) {
        if let Err(e) = self.app.emit(STATE_EVENT, view) {
            log::warn!("[SHELL] Failed to emit state: {}", e);
        }
    }

    fn on_notice(&self, notice: &Notice) {
        if let Err(e) = self.app.emit(NOTICE_EVENT, notice) {
            log::warn!("[SHELL] Failed to emit notice: {}", e);
        }
        if notice.severity == Severity::Blocking {
            self.app
                .dialog()
                .message(notice.message.clone())
                .kind(MessageDialogKind::Warning)
                .title(DIALOG_TITLE)
                .show(|_| {});
        }
    }

    fn on_progress(&self, progress: &OcrProgress) {
        if let Err(e) = self.app.emit(PROGRESS_EVENT, progress) {
            log::debug!("[OCR] Failed to emit progress: {}", e);
        }
    }
}
