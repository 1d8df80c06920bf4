//! Shell state types — the single live record and its serializable view.
//!
//! `ShellState` holds all five entities (image, language, processing
//! state, text buffer, copy flag) plus the tickets that tie asynchronous
//! completions back to the invocation that started them. The page never
//! sees it directly; it receives a `ShellView` after every transition.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const MIB: u64 = 1024 * 1024;

/// Recognition language. Codes are the engine's language pack names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Rus,
    Eng,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Rus, Language::Eng];

    pub fn code(self) -> &'static str {
        match self {
            Language::Rus => "rus",
            Language::Eng => "eng",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Rus => "Russian",
            Language::Eng => "English",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(code.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    #[default]
    Idle,
    Pending,
    Done,
}

/// The one image currently held by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
    pub dimensions: Option<(u32, u32)>,
}

impl SelectedImage {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Thresholds applied to every acquired image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePolicy {
    /// Above this the image is rejected outright.
    pub hard_limit: u64,
    /// Above this the image is kept but flagged as slow to process.
    pub soft_limit: u64,
}

impl Default for SizePolicy {
    fn default() -> Self {
        Self {
            hard_limit: 10 * MIB,
            soft_limit: 4 * MIB,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeVerdict {
    Accept,
    AcceptLarge,
    Reject,
}

impl SizePolicy {
    pub fn assess(&self, size: u64) -> SizeVerdict {
        if size > self.hard_limit {
            SizeVerdict::Reject
        } else if size > self.soft_limit {
            SizeVerdict::AcceptLarge
        } else {
            SizeVerdict::Accept
        }
    }
}

/// All shell state. Replaced wholesale by `transition`.
#[derive(Debug, Clone, Default)]
pub struct ShellState {
    pub image: Option<SelectedImage>,
    pub language: Language,
    pub processing: ProcessingState,
    pub text: String,
    pub copied: bool,
    /// Identifies the live recognition; bumped on confirm and terminate.
    pub recognition_ticket: u64,
    /// Identifies the live copy-feedback timer.
    pub copy_ticket: u64,
    /// Bumped on every accepted image so the page can refetch the preview.
    pub image_revision: u64,
    /// Bumped by the store on every dispatch. Views reach the page from
    /// several threads; it drops any view older than the last one applied.
    pub revision: u64,
}

impl ShellState {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.processing == ProcessingState::Pending
    }

    pub fn view(&self, policy: &SizePolicy) -> ShellView {
        let pending = self.is_pending();
        let has_image = self.image.is_some();
        let has_text = !self.text.is_empty();

        let status = if pending {
            "Recognizing…"
        } else if !has_image {
            "Add an image or paste one with Ctrl+V"
        } else {
            "Awaiting confirmation"
        };

        ShellView {
            revision: self.revision,
            image: self.image.as_ref().map(|img| ImageSummary {
                name: img.name.clone(),
                mime_type: img.mime_type.clone(),
                size_bytes: img.size(),
                size_label: format!("{:.3} MB", img.size() as f64 / MIB as f64),
                width: img.dimensions.map(|d| d.0),
                height: img.dimensions.map(|d| d.1),
                revision: self.image_revision,
            }),
            size_advisory: self
                .image
                .as_ref()
                .is_some_and(|img| policy.assess(img.size()) == SizeVerdict::AcceptLarge),
            language: self.language,
            processing: self.processing,
            status: status.to_string(),
            text: self.text.clone(),
            copied: self.copied,
            controls: Controls {
                recognize: !pending && has_image,
                remove_image: !pending && has_image,
                select_rus: !pending && self.language != Language::Rus,
                select_eng: !pending && self.language != Language::Eng,
                terminate: pending,
                copy: has_text,
                clear: has_text,
                substitute: has_text,
            },
        }
    }
}

/// What the page renders. Sent with every `shell-state` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellView {
    pub revision: u64,
    pub image: Option<ImageSummary>,
    pub size_advisory: bool,
    pub language: Language,
    pub processing: ProcessingState,
    pub status: String,
    pub text: String,
    pub copied: bool,
    pub controls: Controls,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub size_label: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub revision: u64,
}

/// Which controls are enabled right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    pub recognize: bool,
    pub remove_image: bool,
    pub select_rus: bool,
    pub select_eng: bool,
    pub terminate: bool,
    pub copy: bool,
    pub clear: bool,
    pub substitute: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be acknowledged by the user (native warning dialog).
    Blocking,
    Advisory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    ImageTooLarge,
    LargeImage,
    UnsupportedImage,
    RecognitionFailed,
    ClipboardFailed,
}

/// A user-facing warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn image_too_large(size: u64, limit: u64) -> Self {
        Self {
            kind: NoticeKind::ImageTooLarge,
            severity: Severity::Blocking,
            message: format!(
                "The image is too large ({:.1} MB, limit {} MB). Recognition would take forever, please choose another one.",
                size as f64 / MIB as f64,
                limit / MIB
            ),
        }
    }

    pub fn large_image(limit: u64) -> Self {
        Self {
            kind: NoticeKind::LargeImage,
            severity: Severity::Advisory,
            message: format!(
                "The image is larger than {} MB. Processing may take a long time.",
                limit / MIB
            ),
        }
    }

    pub fn unsupported_image(reason: impl std::fmt::Display) -> Self {
        Self {
            kind: NoticeKind::UnsupportedImage,
            severity: Severity::Advisory,
            message: format!("This file cannot be used: {}", reason),
        }
    }

    pub fn recognition_failed(reason: impl std::fmt::Display) -> Self {
        Self {
            kind: NoticeKind::RecognitionFailed,
            severity: Severity::Advisory,
            message: format!("Recognition failed: {}", reason),
        }
    }

    pub fn clipboard_failed(reason: impl std::fmt::Display) -> Self {
        Self {
            kind: NoticeKind::ClipboardFailed,
            severity: Severity::Advisory,
            message: format!("Could not copy the text: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(size: usize) -> SelectedImage {
        SelectedImage {
            name: "scan.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![0u8; size].into(),
            dimensions: Some((640, 480)),
        }
    }

    #[test]
    fn size_policy_boundaries_accept_inclusive() {
        let policy = SizePolicy::default();
        assert_eq!(policy.assess(4 * MIB), SizeVerdict::Accept);
        assert_eq!(policy.assess(4 * MIB + 1), SizeVerdict::AcceptLarge);
        assert_eq!(policy.assess(10 * MIB), SizeVerdict::AcceptLarge);
        assert_eq!(policy.assess(10 * MIB + 1), SizeVerdict::Reject);
    }

    #[test]
    fn language_codes_round_trip() {
        assert_eq!(Language::from_code("RUS"), Some(Language::Rus));
        assert_eq!(Language::from_code(" eng "), Some(Language::Eng));
        assert_eq!(Language::from_code("deu"), None);
        assert_eq!(Language::default(), Language::Rus);
    }

    #[test]
    fn initial_view_disables_everything_but_other_language() {
        let view = ShellState::default().view(&SizePolicy::default());
        assert_eq!(view.status, "Add an image or paste one with Ctrl+V");
        assert_eq!(
            view.controls,
            Controls {
                recognize: false,
                remove_image: false,
                select_rus: false,
                select_eng: true,
                terminate: false,
                copy: false,
                clear: false,
                substitute: false,
            }
        );
    }

    #[test]
    fn pending_view_only_allows_terminate_and_text_controls() {
        let state = ShellState {
            image: Some(image(10)),
            processing: ProcessingState::Pending,
            text: "old".to_string(),
            ..ShellState::default()
        };
        let view = state.view(&SizePolicy::default());
        assert_eq!(view.status, "Recognizing…");
        assert!(view.controls.terminate);
        assert!(!view.controls.recognize);
        assert!(!view.controls.remove_image);
        assert!(!view.controls.select_eng);
        assert!(view.controls.copy);
    }

    #[test]
    fn image_summary_reports_size_in_mb() {
        let state = ShellState {
            image: Some(image(5 * MIB as usize)),
            image_revision: 3,
            ..ShellState::default()
        };
        let view = state.view(&SizePolicy::default());
        let summary = view.image.unwrap();
        assert_eq!(summary.size_label, "5.000 MB");
        assert_eq!(summary.width, Some(640));
        assert_eq!(summary.revision, 3);
        assert!(view.size_advisory);
        assert_eq!(view.status, "Awaiting confirmation");
    }

    #[test]
    fn view_serializes_camel_case() {
        let json = serde_json::to_value(ShellState::default().view(&SizePolicy::default())).unwrap();
        assert_eq!(json["processing"], "idle");
        assert_eq!(json["language"], "rus");
        assert_eq!(json["controls"]["removeImage"], false);
        assert!(json["sizeAdvisory"].is_boolean());
        assert_eq!(json["revision"], 0);
    }
}
