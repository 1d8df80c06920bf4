//! Clipboard paste acquisition.
//!
//! The page owns the `paste` DOM listener and forwards the event's item
//! list, in order, as a `clipboard-paste` event. The Rust side subscribes
//! to that event exactly once for the app's lifetime through
//! `PasteSubscription`, which unlistens when dropped.

use super::{from_base64, AcquireError};
use crate::events::PASTE_EVENT;
use crate::shell::transition::Action;
use crate::shell::types::{Notice, SelectedImage};
use crate::shell::ShellStore;
use serde::Deserialize;
use std::sync::Arc;
use tauri::{AppHandle, EventId, Listener};

/// Pasted images are always named like this, whatever the source.
pub const PASTED_IMAGE_NAME: &str = "pasted-image.png";

/// One entry of the DOM `clipboardData.items` list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteItem {
    pub mime_type: String,
    /// Base64 file payload; absent for string items or unreadable files.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PastePayload {
    #[serde(default)]
    pub items: Vec<PasteItem>,
}

/// The first item that is an image and actually carries a file.
pub fn first_image_item(items: &[PasteItem]) -> Option<&PasteItem> {
    items
        .iter()
        .find(|item| item.mime_type.starts_with("image/") && item.data.is_some())
}

/// Resolve a paste payload to an image, if it contains one.
///
/// `Ok(None)` means "no image here" and must leave the shell untouched.
pub fn image_from_payload(payload: &PastePayload) -> Result<Option<SelectedImage>, AcquireError> {
    let Some(item) = first_image_item(&payload.items) else {
        return Ok(None);
    };
    let data = item.data.as_deref().unwrap_or_default();
    from_base64(PASTED_IMAGE_NAME, data).map(Some)
}

/// Handle one raw `clipboard-paste` payload.
///
/// Malformed payloads and pastes without an image are ignored; an image
/// that cannot be used raises an advisory notice.
pub fn handle_paste(store: &Arc<ShellStore>, raw: &str) {
    let payload: PastePayload = match serde_json::from_str(raw) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("[PASTE] Malformed paste payload: {}", e);
            return;
        }
    };
    match image_from_payload(&payload) {
        Ok(Some(image)) => {
            log::info!("[PASTE] Image pasted ({} bytes)", image.size());
            store.dispatch(Action::ImageAcquired(image));
        }
        Ok(None) => {
            log::debug!("[PASTE] No image among {} item(s), ignoring", payload.items.len());
        }
        Err(e) => {
            log::warn!("[PASTE] Pasted image unusable: {}", e);
            store.notify(&Notice::unsupported_image(e));
        }
    }
}

/// Live subscription to the page's paste events.
pub struct PasteSubscription {
    app: AppHandle,
    id: EventId,
}

impl PasteSubscription {
    pub fn attach(app: &AppHandle, store: Arc<ShellStore>) -> Self {
        let id = app.listen(PASTE_EVENT, move |event| handle_paste(&store, event.payload()));
        log::info!("[PASTE] Listener attached");
        Self {
            app: app.clone(),
            id,
        }
    }
}

impl Drop for PasteSubscription {
    fn drop(&mut self) {
        self.app.unlisten(self.id);
        log::info!("[PASTE] Listener detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::tests::png_bytes;
    use base64::Engine as _;

    fn item(mime: &str, data: Option<&str>) -> PasteItem {
        PasteItem {
            mime_type: mime.to_string(),
            data: data.map(str::to_string),
        }
    }

    #[test]
    fn picks_first_image_in_order() {
        let items = vec![
            item("text/plain", None),
            item("image/jpeg", Some("AAAA")),
            item("image/png", Some("BBBB")),
        ];
        assert_eq!(first_image_item(&items).unwrap().mime_type, "image/jpeg");
    }

    #[test]
    fn skips_image_items_without_file_data() {
        let items = vec![item("image/png", None), item("image/gif", Some("R0lG"))];
        assert_eq!(first_image_item(&items).unwrap().mime_type, "image/gif");
    }

    #[test]
    fn non_image_payload_yields_nothing() {
        let payload = PastePayload {
            items: vec![item("text/plain", None), item("text/html", None)],
        };
        assert!(image_from_payload(&payload).unwrap().is_none());
        assert!(image_from_payload(&PastePayload { items: vec![] }).unwrap().is_none());
    }

    #[test]
    fn pasted_image_is_named_and_sniffed() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes(2, 2));
        let payload = PastePayload {
            items: vec![item("image/png", Some(&encoded))],
        };
        let image = image_from_payload(&payload).unwrap().unwrap();
        assert_eq!(image.name, PASTED_IMAGE_NAME);
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn payload_deserializes_from_page_json() {
        let payload: PastePayload = serde_json::from_str(
            r#"{"items":[{"mimeType":"text/plain"},{"mimeType":"image/png","data":"iVBO"}]}"#,
        )
        .unwrap();
        assert_eq!(payload.items.len(), 2);
        assert!(payload.items[0].data.is_none());
    }
}
