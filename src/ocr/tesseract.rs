//! Tesseract CLI engine.
//!
//! Runs `tesseract stdin stdout -l <lang> tsv` as a tokio child process:
//! image bytes go in on stdin, TSV comes back on stdout, and stderr lines
//! are streamed out as diagnostic progress events. The child is spawned
//! with `kill_on_drop`, so abandoning the future kills the process.

use super::tsv::parse_tsv;
use super::{OcrEngine, OcrError, OcrOutput, OcrProgress, OcrStage, ProgressFn};
use crate::shell::types::Language;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

pub struct TesseractEngine {
    binary: PathBuf,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Find the engine binary: explicit override first, then `PATH`.
    pub fn locate(explicit: Option<&Path>) -> Result<Self, OcrError> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(Self::new(path));
            }
            return Err(OcrError::Unavailable(format!(
                "configured tesseract binary {} does not exist",
                path.display()
            )));
        }
        which::which("tesseract")
            .map(Self::new)
            .map_err(|e| OcrError::Unavailable(format!("tesseract not found on PATH: {}", e)))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// List the language packs the engine has installed.
    ///
    /// Also serves as a warm-up: the first invocation pays the cost of
    /// loading the binary and its shared libraries.
    pub async fn available_languages(&self) -> Result<Vec<String>, OcrError> {
        let output = Command::new(&self.binary)
            .arg("--list-langs")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| self.spawn_error(source))?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(parse_language_list(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Call once at startup: loads the engine and checks that every
    /// selectable language has its data installed.
    pub async fn warm_up(&self) {
        let start = std::time::Instant::now();
        match self.available_languages().await {
            Ok(installed) => {
                log::info!(
                    "[OCR] Tesseract warm-up complete in {}ms ({} language packs)",
                    start.elapsed().as_millis(),
                    installed.len()
                );
                for language in Language::ALL {
                    if !installed.iter().any(|l| l == language.code()) {
                        log::warn!(
                            "[OCR] Language pack '{}' is not installed; {} recognition will fail",
                            language.code(),
                            language.display_name()
                        );
                    }
                }
            }
            Err(e) => log::warn!("[OCR] Warm-up failed: {}", e),
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> OcrError {
        OcrError::Spawn {
            binary: self.binary.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(
        &self,
        image: &[u8],
        language: Language,
        progress: ProgressFn<'_>,
    ) -> Result<OcrOutput, OcrError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", language.code(), "tsv"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        progress(OcrProgress::stage(OcrStage::Started, 0.0));
        log::debug!(
            "[OCR] Spawned {} for {} bytes, lang={}",
            self.binary.display(),
            image.len(),
            language.code()
        );

        let (Some(mut stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(OcrError::Io(std::io::Error::other(
                "child process pipes were not captured",
            )));
        };

        let write = async move {
            let written = stdin.write_all(image).await;
            // Closing stdin tells the engine the image is complete.
            drop(stdin);
            if written.is_ok() {
                progress(OcrProgress::stage(OcrStage::ImageSent, 0.2));
            }
            written
        };
        let read_out = async move {
            let mut buf = String::new();
            BufReader::new(stdout).read_to_string(&mut buf).await.map(|_| buf)
        };
        let read_err = async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut collected = Vec::new();
            while let Some(line) = lines.next_line().await? {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                progress(OcrProgress::diagnostic(&line));
                collected.push(line);
            }
            Ok::<_, std::io::Error>(collected)
        };

        let (written, stdout_text, stderr_lines) = tokio::join!(write, read_out, read_err);
        let status = child.wait().await?;
        let stderr_lines = stderr_lines.unwrap_or_default();

        if !status.success() {
            return Err(OcrError::Failed {
                code: status.code(),
                stderr: stderr_lines.join("\n"),
            });
        }
        written?;
        let page = parse_tsv(&stdout_text?);

        progress(OcrProgress::stage(OcrStage::Complete, 1.0));
        Ok(OcrOutput {
            text: page.text,
            word_count: page.word_count,
            mean_confidence: page.mean_confidence,
        })
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// Parse `tesseract --list-langs` output.
///
/// The first line is a banner ("List of available languages in ..."),
/// every following non-empty line is a language code.
fn parse_language_list(raw: &str) -> Vec<String> {
    raw.lines()
        .skip_while(|l| !l.starts_with("List of available languages"))
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
