//! The shell's state-transition function.
//!
//! `transition(state, action, policy)` returns the next state plus the
//! effects the runtime must carry out (start or abandon the engine call,
//! write the clipboard, schedule the copy-flag reset, show a notice).
//! It performs no I/O, which keeps every rule here unit-testable.
//!
//! Gating mirrors the enabled/disabled controls: an action whose control
//! would be disabled is a no-op rather than an error.

use super::types::{Language, Notice, ProcessingState, SelectedImage, ShellState, SizePolicy, SizeVerdict};
use crate::cleanup;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Drop, file picker or paste produced an image.
    ImageAcquired(SelectedImage),
    RemoveImage,
    SelectLanguage(Language),
    ConfirmRecognition,
    RecognitionSucceeded { ticket: u64, text: String },
    RecognitionFailed { ticket: u64, reason: String },
    /// Abandon whatever is going on and return to the empty shell.
    Terminate,
    EditText(String),
    ClearText,
    Substitute { target: String, replacement: String },
    CopyRequested,
    CopyFeedbackExpired { ticket: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartRecognition {
        ticket: u64,
        image: SelectedImage,
        language: Language,
    },
    AbandonRecognition,
    /// On failure the store expires `ticket` right away.
    WriteClipboard { text: String, ticket: u64 },
    ScheduleCopyReset { ticket: u64 },
    Notify(Notice),
}

pub fn transition(
    mut state: ShellState,
    action: Action,
    policy: &SizePolicy,
) -> (ShellState, Vec<Effect>) {
    let mut effects = Vec::new();

    match action {
        Action::ImageAcquired(image) => {
            if state.is_pending() {
                log::info!("[SHELL] Ignoring {} while recognition is pending", image.name);
                return (state, effects);
            }
            match policy.assess(image.size()) {
                SizeVerdict::Reject => {
                    log::warn!(
                        "[SHELL] Rejected {} ({} bytes > {} limit)",
                        image.name,
                        image.size(),
                        policy.hard_limit
                    );
                    state.image = None;
                    effects.push(Effect::Notify(Notice::image_too_large(
                        image.size(),
                        policy.hard_limit,
                    )));
                }
                verdict => {
                    if verdict == SizeVerdict::AcceptLarge {
                        effects.push(Effect::Notify(Notice::large_image(policy.soft_limit)));
                    }
                    log::info!("[SHELL] Image selected: {} ({} bytes)", image.name, image.size());
                    state.image = Some(image);
                    state.image_revision += 1;
                }
            }
        }

        Action::RemoveImage => {
            if !state.is_pending() {
                state.image = None;
            }
        }

        Action::SelectLanguage(language) => {
            if !state.is_pending() && state.language != language {
                log::info!("[SHELL] Language set to {}", language.code());
                state.language = language;
            }
        }

        Action::ConfirmRecognition => {
            if state.is_pending() {
                log::debug!("[SHELL] Recognition already in flight, ignoring confirm");
                return (state, effects);
            }
            let Some(image) = state.image.clone() else {
                return (state, effects);
            };
            state.processing = ProcessingState::Pending;
            state.recognition_ticket += 1;
            effects.push(Effect::StartRecognition {
                ticket: state.recognition_ticket,
                image,
                language: state.language,
            });
        }

        Action::RecognitionSucceeded { ticket, text } => {
            if state.is_pending() && ticket == state.recognition_ticket {
                state.text = text;
                state.processing = ProcessingState::Done;
            } else {
                log::debug!("[SHELL] Discarding stale recognition result #{}", ticket);
            }
        }

        Action::RecognitionFailed { ticket, reason } => {
            if state.is_pending() && ticket == state.recognition_ticket {
                state.processing = ProcessingState::Idle;
                effects.push(Effect::Notify(Notice::recognition_failed(reason)));
            } else {
                log::debug!("[SHELL] Discarding stale recognition failure #{}", ticket);
            }
        }

        Action::Terminate => {
            if state.is_pending() {
                effects.push(Effect::AbandonRecognition);
            }
            state.image = None;
            state.text.clear();
            state.processing = ProcessingState::Idle;
            state.recognition_ticket += 1;
        }

        Action::EditText(text) => state.text = text,

        Action::ClearText => state.text.clear(),

        Action::Substitute {
            target,
            replacement,
        } => {
            if !state.text.is_empty() {
                state.text = cleanup::replace_literal(&state.text, &target, &replacement);
            }
        }

        Action::CopyRequested => {
            if !state.text.is_empty() {
                state.copied = true;
                state.copy_ticket += 1;
                effects.push(Effect::WriteClipboard {
                    text: state.text.clone(),
                    ticket: state.copy_ticket,
                });
                effects.push(Effect::ScheduleCopyReset {
                    ticket: state.copy_ticket,
                });
            }
        }

        Action::CopyFeedbackExpired { ticket } => {
            if ticket == state.copy_ticket {
                state.copied = false;
            }
        }
    }

    (state, effects)
}
