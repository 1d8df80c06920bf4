//! OCR domain — engine contract and shared types.
//!
//! The shell never recognizes text itself. Everything goes through the
//! `OcrEngine` trait: image bytes + language code in, recognized text out.
//! External code should only use the items exported here.
//!
//! Engines:
//!   - tesseract.rs — the `tesseract` CLI driven as a tokio child process
//!   - `UnavailableEngine` — stand-in when no engine could be located
//!
//! Shared:
//!   - tsv.rs — parser for the engine's structured TSV output

pub mod tesseract;
pub mod tsv;

pub use tesseract::TesseractEngine;

use crate::shell::types::Language;
use async_trait::async_trait;
use serde::Serialize;

/// Errors an engine call can reject with.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    #[error("failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR engine exited with {}: {stderr}", exit_label(.code))]
    Failed { code: Option<i32>, stderr: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

/// Coarse stage of a running recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OcrStage {
    Started,
    ImageSent,
    Diagnostic,
    Complete,
}

/// Progress event streamed while an engine call is outstanding.
///
/// Only used for diagnostics and the page's progress indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrProgress {
    pub stage: OcrStage,
    /// 0.0 ..= 1.0
    pub progress: f32,
    pub detail: Option<String>,
}

impl OcrProgress {
    pub fn stage(stage: OcrStage, progress: f32) -> Self {
        Self {
            stage,
            progress,
            detail: None,
        }
    }

    pub fn diagnostic(line: &str) -> Self {
        Self {
            stage: OcrStage::Diagnostic,
            progress: 0.5,
            detail: Some(line.to_string()),
        }
    }
}

/// Result of a successful engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub word_count: usize,
    /// Mean word confidence (0–100), when the engine reports one.
    pub mean_confidence: Option<f32>,
}

impl OcrOutput {
    /// Output with text only and no structured diagnostics.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            word_count: text.split_whitespace().count(),
            text,
            mean_confidence: None,
        }
    }
}

/// Callback receiving progress events during `OcrEngine::recognize`.
pub type ProgressFn<'a> = &'a (dyn Fn(OcrProgress) + Send + Sync);

/// The external recognition collaborator.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize the text in `image` using `language`.
    ///
    /// Dropping the returned future must abandon the work.
    async fn recognize(
        &self,
        image: &[u8],
        language: Language,
        progress: ProgressFn<'_>,
    ) -> Result<OcrOutput, OcrError>;

    /// Human-readable engine name for logs and the settings view.
    fn name(&self) -> &str;
}

/// Engine used when no real engine could be located at startup.
/// Every call rejects, which walks the shell through its failure path.
pub struct UnavailableEngine {
    reason: String,
}

impl UnavailableEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for UnavailableEngine {
    async fn recognize(
        &self,
        _image: &[u8],
        _language: Language,
        _progress: ProgressFn<'_>,
    ) -> Result<OcrOutput, OcrError> {
        Err(OcrError::Unavailable(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_error_mentions_status_and_stderr() {
        let err = OcrError::Failed {
            code: Some(1),
            stderr: "Error in pixReadStream".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("status 1"));
        assert!(msg.contains("pixReadStream"));

        let killed = OcrError::Failed {
            code: None,
            stderr: String::new(),
        };
        assert!(killed.to_string().contains("a signal"));
    }

    #[test]
    fn plain_output_counts_words() {
        let out = OcrOutput::plain("two words\nthree");
        assert_eq!(out.word_count, 3);
        assert!(out.mean_confidence.is_none());
    }

    #[tokio::test]
    async fn unavailable_engine_always_rejects() {
        let engine = UnavailableEngine::new("tesseract not found on PATH");
        let result = engine.recognize(b"\x89PNG", Language::Eng, &|_: OcrProgress| {}).await;
        match result {
            Err(OcrError::Unavailable(reason)) => assert!(reason.contains("PATH")),
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }
}
