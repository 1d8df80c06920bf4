//! Runtime configuration from environment variables.
//!
//! Variables (all optional):
//!   - OCR_TESSERACT_PATH     — engine binary; default: `tesseract` on PATH
//!   - OCR_MAX_IMAGE_BYTES    — hard ceiling, larger images are rejected
//!   - OCR_LARGE_IMAGE_BYTES  — soft threshold for the "may be slow" advisory
//!   - OCR_COPY_FEEDBACK_MS   — how long "Text copied" stays up
//!   - OCR_DEFAULT_LANG       — `rus` or `eng`
//!
//! `.env.local` / `.env` in the project root are loaded first (see `lib.rs`).

use crate::shell::types::{Language, SizePolicy};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_COPY_FEEDBACK: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    pub tesseract_path: Option<PathBuf>,
    pub size_policy: SizePolicy,
    pub copy_feedback: Duration,
    pub default_language: Language,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            size_policy: SizePolicy::default(),
            copy_feedback: DEFAULT_COPY_FEEDBACK,
            default_language: Language::default(),
        }
    }
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Bad values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let tesseract_path = lookup("OCR_TESSERACT_PATH")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let mut size_policy = SizePolicy {
            hard_limit: parse_or("OCR_MAX_IMAGE_BYTES", &lookup, defaults.size_policy.hard_limit),
            soft_limit: parse_or("OCR_LARGE_IMAGE_BYTES", &lookup, defaults.size_policy.soft_limit),
        };
        if size_policy.soft_limit > size_policy.hard_limit {
            log::warn!(
                "[CONFIG] Large-image threshold ({}) exceeds the maximum ({}); using defaults",
                size_policy.soft_limit,
                size_policy.hard_limit
            );
            size_policy = defaults.size_policy;
        }

        let copy_feedback = Duration::from_millis(parse_or(
            "OCR_COPY_FEEDBACK_MS",
            &lookup,
            defaults.copy_feedback.as_millis() as u64,
        ));

        let default_language = match lookup("OCR_DEFAULT_LANG") {
            Some(code) => Language::from_code(&code).unwrap_or_else(|| {
                log::warn!("[CONFIG] Unknown OCR_DEFAULT_LANG {:?}; using {}", code, defaults.default_language.code());
                defaults.default_language
            }),
            None => defaults.default_language,
        };

        Self {
            tesseract_path,
            size_policy,
            copy_feedback,
            default_language,
        }
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("[CONFIG] Invalid {}={:?}; using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

/// Effective configuration as shown to the page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub engine: String,
    pub max_image_bytes: u64,
    pub large_image_bytes: u64,
    pub copy_feedback_ms: u64,
    pub languages: Vec<LanguageOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageOption {
    pub code: &'static str,
    pub label: &'static str,
}

impl ConfigView {
    pub fn new(config: &ShellConfig, engine: &str) -> Self {
        Self {
            engine: engine.to_string(),
            max_image_bytes: config.size_policy.hard_limit,
            large_image_bytes: config.size_policy.soft_limit,
            copy_feedback_ms: config.copy_feedback.as_millis() as u64,
            languages: Language::ALL
                .into_iter()
                .map(|l| LanguageOption {
                    code: l.code(),
                    label: l.display_name(),
                })
                .collect(),
        }
    }
}
