//! Recognition shell — owns the live state and carries out effects.
//!
//! Every user action becomes an `Action` passed to `ShellStore::dispatch`,
//! which runs the pure `transition` under the state lock, publishes the
//! new view, then performs the returned effects outside the lock:
//!   - StartRecognition   → spawn the engine call on the tokio runtime
//!   - AbandonRecognition → abort that task (kills the engine process)
//!   - WriteClipboard     → native clipboard write; a failure expires the copy ticket
//!   - ScheduleCopyReset  → cancellable delayed `CopyFeedbackExpired`
//!   - Notify             → forward to the observer

pub mod transition;
pub mod types;

use crate::clipboard::ClipboardWriter;
use crate::config::ShellConfig;
use crate::ocr::{OcrEngine, OcrProgress};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use transition::{transition, Action, Effect};
use types::{Language, Notice, SelectedImage, ShellState, ShellView, SizePolicy};

/// Receives everything the page needs to hear about.
pub trait ShellObserver: Send + Sync {
    fn on_state(&self, view: &ShellView);
    fn on_notice(&self, notice: &Notice);
    fn on_progress(&self, progress: &OcrProgress);
}

pub struct ShellStore {
    state: Mutex<ShellState>,
    policy: SizePolicy,
    copy_feedback: Duration,
    engine: Arc<dyn OcrEngine>,
    clipboard: Arc<dyn ClipboardWriter>,
    observer: Arc<dyn ShellObserver>,
    runtime: Handle,
    recognition: Mutex<Option<JoinHandle<()>>>,
    copy_reset: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ShellStore {
    /// `runtime` is where engine calls and timers are spawned; dispatch
    /// may then be called from any thread.
    pub fn new(
        config: &ShellConfig,
        engine: Arc<dyn OcrEngine>,
        clipboard: Arc<dyn ClipboardWriter>,
        observer: Arc<dyn ShellObserver>,
        runtime: Handle,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ShellState::new(config.default_language)),
            policy: config.size_policy,
            copy_feedback: config.copy_feedback,
            engine,
            clipboard,
            observer,
            runtime,
            recognition: Mutex::new(None),
            copy_reset: Mutex::new(None),
        })
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn snapshot(&self) -> ShellView {
        lock(&self.state).view(&self.policy)
    }

    /// The currently selected image, if any.
    pub fn selected_image(&self) -> Option<SelectedImage> {
        lock(&self.state).image.clone()
    }

    /// Surface a notice that is not tied to a state change.
    pub fn notify(&self, notice: &Notice) {
        self.observer.on_notice(notice);
    }

    /// Apply `action`, publish the resulting view, run its effects.
    pub fn dispatch(self: &Arc<Self>, action: Action) -> ShellView {
        let (view, effects) = {
            let mut guard = lock(&self.state);
            let current = std::mem::take(&mut *guard);
            let (next, effects) = transition(current, action, &self.policy);
            *guard = next;
            guard.revision += 1;
            (guard.view(&self.policy), effects)
        };

        self.observer.on_state(&view);
        for effect in effects {
            self.run_effect(effect);
        }
        view
    }

    fn run_effect(self: &Arc<Self>, effect: Effect) {
        match effect {
            Effect::StartRecognition {
                ticket,
                image,
                language,
            } => self.start_recognition(ticket, image, language),
            Effect::AbandonRecognition => {
                if let Some(task) = lock(&self.recognition).take() {
                    task.abort();
                    log::info!("[OCR] Recognition abandoned");
                }
            }
            Effect::WriteClipboard { text, ticket } => {
                if let Err(e) = self.clipboard.write_text(&text) {
                    log::error!("[CLIPBOARD] {}", e);
                    self.observer.on_notice(&Notice::clipboard_failed(e));
                    // Nothing was copied; drop the "copied" feedback now.
                    self.dispatch(Action::CopyFeedbackExpired { ticket });
                }
            }
            Effect::ScheduleCopyReset { ticket } => self.schedule_copy_reset(ticket),
            Effect::Notify(notice) => self.observer.on_notice(&notice),
        }
    }

    fn start_recognition(self: &Arc<Self>, ticket: u64, image: SelectedImage, language: Language) {
        // Hold the slot across the spawn so a concurrent abandon cannot
        // slip in between.
        let mut slot = lock(&self.recognition);
        let store = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            let started = Instant::now();
            let observer = Arc::clone(&store.observer);
            let progress = move |p: OcrProgress| {
                log::debug!("[OCR] {:?} {:.0}% {}", p.stage, p.progress * 100.0, p.detail.as_deref().unwrap_or(""));
                observer.on_progress(&p);
            };

            log::info!(
                "[OCR] Recognizing {} ({} bytes, lang={}) with {}",
                image.name,
                image.size(),
                language.code(),
                store.engine.name()
            );
            let result = store.engine.recognize(&image.bytes, language, &progress).await;
            let elapsed_ms = started.elapsed().as_millis();

            let action = match result {
                Ok(output) => {
                    log::info!(
                        "[OCR] Extracted {} chars, {} words in {}ms, confidence={}",
                        output.text.chars().count(),
                        output.word_count,
                        elapsed_ms,
                        output
                            .mean_confidence
                            .map_or("n/a".to_string(), |c| format!("{:.1}", c))
                    );
                    Action::RecognitionSucceeded {
                        ticket,
                        text: output.text,
                    }
                }
                Err(e) => {
                    log::error!("[OCR] Recognition failed after {}ms: {}", elapsed_ms, e);
                    Action::RecognitionFailed {
                        ticket,
                        reason: e.to_string(),
                    }
                }
            };
            store.dispatch(action);
        });

        // The Pending gate means nothing should be running; make sure.
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    fn schedule_copy_reset(self: &Arc<Self>, ticket: u64) {
        let mut slot = lock(&self.copy_reset);
        let store = Arc::clone(self);
        let delay = self.copy_feedback;
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            store.dispatch(Action::CopyFeedbackExpired { ticket });
        });
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    /// Cancel outstanding work. Called once when the app exits.
    pub fn shutdown(&self) {
        if let Some(task) = lock(&self.recognition).take() {
            task.abort();
        }
        if let Some(task) = lock(&self.copy_reset).take() {
            task.abort();
        }
        log::info!("[SHELL] Shut down");
    }
}
