//! Tauri command handlers.
//!
//! Thin wrappers that bridge the page's invoke() calls to the shell.
//! Each command maps to one `Action` and returns the resulting view, so
//! the page can render without waiting for the `shell-state` event.

use crate::acquire::{self, ACCEPTED_EXTENSIONS};
use crate::cleanup::{Substitution, BUILTIN_SUBSTITUTIONS};
use crate::config::{ConfigView, ShellConfig};
use crate::shell::transition::Action;
use crate::shell::types::{Language, ShellView};
use crate::shell::ShellStore;
use std::sync::Arc;
use tauri_plugin_dialog::DialogExt;

type Store<'a> = tauri::State<'a, Arc<ShellStore>>;

/// Tauri command: current view. Called by the page on load.
#[tauri::command]
pub fn get_shell_state(store: Store<'_>) -> ShellView {
    store.snapshot()
}

/// Tauri command: `data:` URL of the selected image for the preview.
///
/// Kept out of the view so the image is only transferred when its
/// revision changes.
#[tauri::command]
pub fn get_image_preview(store: Store<'_>) -> Option<String> {
    store.selected_image().as_ref().map(acquire::preview_data_url)
}

/// Tauri command: effective limits, engine name and languages.
#[tauri::command]
pub fn get_config(store: Store<'_>, config: tauri::State<'_, ShellConfig>) -> ConfigView {
    ConfigView::new(&config, store.engine_name())
}

/// Tauri command: the built-in one-click substitutions.
#[tauri::command]
pub fn list_substitutions() -> Vec<Substitution> {
    BUILTIN_SUBSTITUTIONS.to_vec()
}

/// Tauri command: open the native file picker.
///
/// Returns immediately; the chosen file is loaded in the background and
/// arrives through the usual `shell-state` event.
#[tauri::command]
pub fn pick_image(app: tauri::AppHandle, store: Store<'_>) -> Result<(), String> {
    let store = Arc::clone(store.inner());
    app.dialog()
        .file()
        .set_title("Choose an image")
        .add_filter("Images", ACCEPTED_EXTENSIONS)
        .pick_file(move |picked| {
            let Some(picked) = picked else {
                log::debug!("[ACQUIRE] File dialog cancelled");
                return;
            };
            match picked.into_path() {
                Ok(path) => {
                    tauri::async_runtime::spawn(async move {
                        acquire::acquire_path(&store, &path).await;
                    });
                }
                Err(e) => log::warn!("[ACQUIRE] Unusable file dialog result: {}", e),
            }
        });
    Ok(())
}

/// Tauri command: drop the selected image.
#[tauri::command]
pub fn remove_image(store: Store<'_>) -> ShellView {
    store.dispatch(Action::RemoveImage)
}

#[tauri::command]
pub fn set_language(store: Store<'_>, language: Language) -> ShellView {
    store.dispatch(Action::SelectLanguage(language))
}

/// Tauri command: confirm and start recognition of the selected image.
#[tauri::command]
pub fn recognize(store: Store<'_>) -> ShellView {
    store.dispatch(Action::ConfirmRecognition)
}

/// Tauri command: abandon processing and reset image, text and status.
#[tauri::command]
pub fn terminate_recognition(store: Store<'_>) -> ShellView {
    store.dispatch(Action::Terminate)
}

/// Tauri command: the user edited the text area.
#[tauri::command]
pub fn set_text(store: Store<'_>, text: String) -> ShellView {
    store.dispatch(Action::EditText(text))
}

#[tauri::command]
pub fn clear_text(store: Store<'_>) -> ShellView {
    store.dispatch(Action::ClearText)
}

/// Tauri command: copy the text buffer to the system clipboard.
#[tauri::command]
pub fn copy_text(store: Store<'_>) -> ShellView {
    store.dispatch(Action::CopyRequested)
}

/// Tauri command: literal, case-insensitive replace across the buffer.
#[tauri::command]
pub fn apply_substitution(store: Store<'_>, target: String, replacement: String) -> ShellView {
    store.dispatch(Action::Substitute {
        target,
        replacement,
    })
}
