//! OCR shell — Tauri application entry point.
//!
//! Wires the domains together. No business logic lives here, just module
//! declarations, plugin registration, managed state, window/run event
//! hooks and the command registry.
//!
//!   - shell/      — state record, transition function, effect runner
//!   - acquire/    — images from drops, the file picker and paste
//!   - ocr/        — engine contract + Tesseract CLI engine
//!   - cleanup.rs  — literal character substitutions
//!   - commands.rs — invoke() handlers for the page

pub mod acquire;
pub mod cleanup;
pub mod clipboard;
mod commands;
pub mod config;
pub mod events;
pub mod ocr;
pub mod shell;

use acquire::paste::PasteSubscription;
use clipboard::SystemClipboard;
use config::ShellConfig;
use events::TauriObserver;
use ocr::{OcrEngine, TesseractEngine, UnavailableEngine};
use shell::ShellStore;
use std::sync::{Arc, Mutex};
use tauri::Manager;

/// Holds the paste subscription until the app exits.
struct PasteListener(Mutex<Option<PasteSubscription>>);

/// Entry point — called by `main.rs`.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Load .env.local → .env from the project root.
    let project_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));

    'env_load: for env_file in [".env.local", ".env"] {
        let path = project_root.join(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    env_logger::init();

    let config = ShellConfig::from_env();
    log::info!(
        "[CONFIG] max={}B large={}B copy_feedback={}ms lang={}",
        config.size_policy.hard_limit,
        config.size_policy.soft_limit,
        config.copy_feedback.as_millis(),
        config.default_language.code()
    );

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(config.clone())
        .invoke_handler(tauri::generate_handler![
            commands::get_shell_state,
            commands::get_image_preview,
            commands::get_config,
            commands::list_substitutions,
            commands::pick_image,
            commands::remove_image,
            commands::set_language,
            commands::recognize,
            commands::terminate_recognition,
            commands::set_text,
            commands::clear_text,
            commands::copy_text,
            commands::apply_substitution,
        ])
        .setup(move |app| {
            log::info!("OCR shell starting up");

            let engine: Arc<dyn OcrEngine> =
                match TesseractEngine::locate(config.tesseract_path.as_deref()) {
                    Ok(engine) => {
                        log::info!("[OCR] Using {}", engine.binary().display());
                        let engine = Arc::new(engine);
                        let warm = Arc::clone(&engine);
                        tauri::async_runtime::spawn(async move { warm.warm_up().await });
                        engine
                    }
                    Err(e) => {
                        log::error!("[OCR] {}", e);
                        Arc::new(UnavailableEngine::new(e.to_string()))
                    }
                };

            let store = ShellStore::new(
                &config,
                engine,
                Arc::new(SystemClipboard),
                Arc::new(TauriObserver::new(app.handle().clone())),
                tauri::async_runtime::handle().inner().clone(),
            );

            let subscription = PasteSubscription::attach(app.handle(), Arc::clone(&store));
            app.manage(PasteListener(Mutex::new(Some(subscription))));
            app.manage(store);

            log::info!("Shell ready — drop, pick or paste an image");
            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::DragDrop(tauri::DragDropEvent::Drop { paths, .. }) = event {
                let Some(path) = paths.first().cloned() else {
                    return;
                };
                if paths.len() > 1 {
                    log::info!("[ACQUIRE] {} files dropped, using the first", paths.len());
                }
                let Some(store) = window.try_state::<Arc<ShellStore>>() else {
                    return;
                };
                let store = Arc::clone(store.inner());
                tauri::async_runtime::spawn(async move {
                    acquire::acquire_path(&store, &path).await;
                });
            }
        })
        .build(tauri::generate_context!())
        .expect("Error building OCR shell");

    app.run(|app, event| {
        if let tauri::RunEvent::Exit = event {
            if let Some(listener) = app.try_state::<PasteListener>() {
                drop(
                    listener
                        .0
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                        .take(),
                );
            }
            if let Some(store) = app.try_state::<Arc<ShellStore>>() {
                store.shutdown();
            }
        }
    });
}
