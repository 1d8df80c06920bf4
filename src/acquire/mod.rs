//! Image acquisition — turn a dropped/picked file or pasted bytes into a
//! `SelectedImage`.
//!
//! Size policy is not applied here; the shell's transition function owns
//! it so that every acquisition path gets identical treatment.

pub mod paste;

use crate::shell::transition::Action;
use crate::shell::types::{Notice, SelectedImage};
use crate::shell::ShellStore;
use base64::Engine as _;
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// File extensions the picker offers and drops are checked against.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("unsupported file type {0:?} (expected PNG or JPEG)")]
    UnsupportedType(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid image payload: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("{0} is not a recognizable image")]
    NotAnImage(String),
}

/// Whether `path` carries one of the accepted image extensions.
pub fn is_accepted_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|a| a.eq_ignore_ascii_case(ext))
        })
}

/// Load an image from disk (drag-drop or file dialog).
pub async fn load_from_path(path: &Path) -> Result<SelectedImage, AcquireError> {
    if !is_accepted_path(path) {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        return Err(AcquireError::UnsupportedType(ext));
    }

    let bytes = tokio::fs::read(path).await.map_err(|source| AcquireError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());

    log::info!("[ACQUIRE] Read {} ({} bytes)", path.display(), bytes.len());
    from_bytes(name, bytes)
}

/// Load `path` and hand it to the shell; failures become a notice and
/// leave the current selection alone.
pub async fn acquire_path(store: &Arc<ShellStore>, path: &Path) {
    match load_from_path(path).await {
        Ok(image) => {
            store.dispatch(Action::ImageAcquired(image));
        }
        Err(e) => {
            log::warn!("[ACQUIRE] {}", e);
            store.notify(&Notice::unsupported_image(e));
        }
    }
}

/// Build a `SelectedImage` from raw bytes, sniffing the actual format.
///
/// Only PNG and JPEG content is accepted, whatever the name or MIME type
/// claims.
pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<SelectedImage, AcquireError> {
    let name = name.into();
    let format = image::guess_format(&bytes).map_err(|_| AcquireError::NotAnImage(name.clone()))?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        let kind = format.extensions_str().first().copied().unwrap_or("unknown");
        return Err(AcquireError::UnsupportedType(kind.to_string()));
    }

    // Header-only read; a truncated body still gets through and is the
    // engine's problem.
    let dimensions = image::ImageReader::with_format(Cursor::new(&bytes), format)
        .into_dimensions()
        .ok();

    Ok(SelectedImage {
        name,
        mime_type: format.to_mime_type().to_string(),
        bytes: bytes.into(),
        dimensions,
    })
}

/// Build a `SelectedImage` from a base64 payload sent by the page.
pub fn from_base64(name: impl Into<String>, data: &str) -> Result<SelectedImage, AcquireError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
    from_bytes(name, bytes)
}

/// `data:` URL for the page's preview `<img>`.
pub fn preview_data_url(image: &SelectedImage) -> String {
    format!(
        "data:{};base64,{}",
        image.mime_type,
        base64::engine::general_purpose::STANDARD.encode(&image.bytes)
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode a tiny solid PNG in memory.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn accepts_png_and_jpeg_extensions_case_insensitively() {
        assert!(is_accepted_path(Path::new("/tmp/scan.PNG")));
        assert!(is_accepted_path(Path::new("photo.jpeg")));
        assert!(is_accepted_path(Path::new("photo.jpg")));
        assert!(!is_accepted_path(Path::new("notes.txt")));
        assert!(!is_accepted_path(Path::new("no_extension")));
    }

    #[test]
    fn from_bytes_sniffs_format_and_dimensions() {
        let image = from_bytes("pixel.png", png_bytes(3, 2)).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.dimensions, Some((3, 2)));
        assert_eq!(image.name, "pixel.png");
    }

    #[test]
    fn from_bytes_rejects_other_image_formats() {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
        let mut gif = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut gif), ImageFormat::Gif)
            .unwrap();

        let err = from_bytes("anim.png", gif).unwrap_err();
        assert!(matches!(err, AcquireError::UnsupportedType(ref kind) if kind == "gif"));
    }

    #[test]
    fn from_bytes_accepts_jpeg() {
        let img = image::RgbImage::from_pixel(5, 3, image::Rgb([200, 200, 200]));
        let mut jpeg = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        let image = from_bytes("photo.jpg", jpeg).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.dimensions, Some((5, 3)));
    }

    #[test]
    fn from_bytes_rejects_non_images() {
        let err = from_bytes("notes.png", b"hello, world".to_vec()).unwrap_err();
        assert!(matches!(err, AcquireError::NotAnImage(ref n) if n == "notes.png"));
    }

    #[test]
    fn from_base64_decodes_payload() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes(1, 1));
        let image = from_base64("pasted-image.png", &encoded).unwrap();
        assert_eq!(image.dimensions, Some((1, 1)));

        assert!(matches!(
            from_base64("x", "***not base64***"),
            Err(AcquireError::Encoding(_))
        ));
    }

    #[test]
    fn preview_is_a_data_url() {
        let image = from_bytes("p.png", png_bytes(1, 1)).unwrap();
        assert!(preview_data_url(&image).starts_with("data:image/png;base64,iVBOR"));
    }

    #[tokio::test]
    async fn load_from_path_checks_extension_before_reading() {
        let err = load_from_path(Path::new("/nonexistent/readme.txt")).await.unwrap_err();
        assert!(matches!(err, AcquireError::UnsupportedType(ref e) if e == "txt"));
    }

    #[tokio::test]
    async fn load_from_path_reads_file() {
        let path = std::env::temp_dir().join("ocr-shell-acquire-test.png");
        std::fs::write(&path, png_bytes(4, 4)).unwrap();

        let image = load_from_path(&path).await.unwrap();
        assert_eq!(image.name, "ocr-shell-acquire-test.png");
        assert_eq!(image.dimensions, Some((4, 4)));

        // Cleanup
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn load_from_path_reports_missing_file() {
        let err = load_from_path(Path::new("/nonexistent/dir/scan.png")).await.unwrap_err();
        assert!(matches!(err, AcquireError::Read { .. }));
    }
}
