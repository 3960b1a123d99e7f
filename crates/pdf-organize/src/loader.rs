//! Source loading
//!
//! Turns raw bytes into registry entries plus the per-page facts the
//! collection needs (intrinsic rotation, preview). Loaders are injected into
//! the editing session so callers can swap in their own document backend.

use crate::page_tree::{intrinsic_rotation, page_dimensions};
use crate::registry::{ImageSource, PdfSource};
use crate::types::{ImageFormat, OrganizeError, Result, Rotation};
use base64::{Engine, engine::general_purpose::STANDARD};
use lopdf::Document;
use std::io::Cursor;

/// Per-page facts reported by a loader
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    /// Rotation the page already carries in its source
    pub intrinsic_rotation: Rotation,
    /// Page size in points, before rotation
    pub size: (f32, f32),
    /// Rendered preview, when the loader produces one
    pub preview: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub source: PdfSource,
    pub pages: Vec<LoadedPage>,
}

#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub source: ImageSource,
    pub width: u32,
    pub height: u32,
    /// `data:` URL of the original bytes
    pub preview: String,
}

/// Capability that parses uploaded bytes.
pub trait SourceLoader {
    /// Parse a page-bearing document. Fails if the bytes are not a valid document.
    fn load_document(&self, name: &str, bytes: &[u8]) -> Result<LoadedDocument>;

    /// Validate an image and build its preview.
    fn load_image(&self, name: &str, bytes: &[u8], format: ImageFormat) -> Result<LoadedImage>;
}

/// Loader backed by `lopdf` and `image`. Does not render page previews.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfLoader;

impl SourceLoader for LopdfLoader {
    fn load_document(&self, name: &str, bytes: &[u8]) -> Result<LoadedDocument> {
        let document = Document::load_mem(bytes).map_err(|e| OrganizeError::Load {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let source = PdfSource::new(name, document);

        let pages = source
            .page_ids
            .iter()
            .map(|&page_id| LoadedPage {
                intrinsic_rotation: intrinsic_rotation(&source.document, page_id),
                size: page_dimensions(&source.document, page_id),
                preview: None,
            })
            .collect();

        Ok(LoadedDocument { source, pages })
    }

    fn load_image(&self, name: &str, bytes: &[u8], format: ImageFormat) -> Result<LoadedImage> {
        let load_error = |reason: String| OrganizeError::Load {
            name: name.to_string(),
            reason,
        };

        // The content decides the format; the declared type is only a fallback.
        let format = match image::guess_format(bytes) {
            Ok(sniffed) => match ImageFormat::detect(bytes) {
                Some(detected) => detected,
                None => {
                    return Err(OrganizeError::UnsupportedInput(format!(
                        "{name}: {sniffed:?} images are not supported"
                    )));
                }
            },
            Err(_) => format,
        };

        let (width, height) = image::ImageReader::with_format(
            Cursor::new(bytes),
            to_image_crate_format(format),
        )
        .into_dimensions()
        .map_err(|e| load_error(e.to_string()))?;

        Ok(LoadedImage {
            source: ImageSource {
                name: name.to_string(),
                format,
                bytes: bytes.to_vec(),
            },
            width,
            height,
            preview: data_url(format, bytes),
        })
    }
}

pub(crate) fn to_image_crate_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Webp => image::ImageFormat::WebP,
    }
}

/// Encode bytes as a `data:` URL preview reference.
pub fn data_url(format: ImageFormat, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_has_mime_prefix() {
        let url = data_url(ImageFormat::Png, b"abc");
        assert_eq!(url, "data:image/png;base64,YWJj");
    }

    #[test]
    fn garbage_pdf_is_a_load_error() {
        let result = LopdfLoader.load_document("broken.pdf", b"not a pdf");
        assert!(matches!(result, Err(OrganizeError::Load { .. })));
    }
}
