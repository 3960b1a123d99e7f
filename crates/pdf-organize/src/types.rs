use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Failed to load {name}: {reason}")]
    Load { name: String, reason: String },
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
    #[error("No source registered at index {0}")]
    MissingSource(usize),
    #[error("Page {index} out of range (source has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("Assembly failed: {0}")]
    Assembly(String),
}

pub type Result<T> = std::result::Result<T, OrganizeError>;

/// Page rotation, always one of the four quarter turns (clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Normalize an arbitrary angle. Returns `None` unless it lands on a quarter turn.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Clockwise90),
            180 => Some(Rotation::Clockwise180),
            270 => Some(Rotation::Clockwise270),
            _ => None,
        }
    }

    /// The rotate action: one quarter turn counter-clockwise.
    pub fn rotated_counter_clockwise(self) -> Self {
        match self {
            Rotation::None => Rotation::Clockwise270,
            Rotation::Clockwise90 => Rotation::None,
            Rotation::Clockwise180 => Rotation::Clockwise90,
            Rotation::Clockwise270 => Rotation::Clockwise180,
        }
    }

    /// Sum of two rotations, wrapped into a quarter turn.
    pub fn combine(self, other: Rotation) -> Self {
        match (self.degrees() + other.degrees()) % 360 {
            90 => Rotation::Clockwise90,
            180 => Rotation::Clockwise180,
            270 => Rotation::Clockwise270,
            _ => Rotation::None,
        }
    }

    /// True for 90 and 270, where width and height trade places.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

/// Opaque item identifier: creation timestamp plus a disambiguating suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate(suffix: &str) -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self(format!("{millis}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raster formats accepted as sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageFormat {
    Jpeg,
    Png,
    /// Previewable only; skipped at export.
    Webp,
}

impl ImageFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    /// Sniff the format from the leading bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::WebP => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn is_embeddable(self) -> bool {
        matches!(self, ImageFormat::Jpeg | ImageFormat::Png)
    }
}

/// What an input file turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Image(ImageFormat),
    Unsupported,
}

impl InputKind {
    /// Classify by declared MIME type first, then by file extension.
    pub fn classify(name: &str, mime: Option<&str>) -> Self {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("application/pdf") {
                return InputKind::Pdf;
            }
            if let Some(format) = ImageFormat::from_mime(mime) {
                return InputKind::Image(format);
            }
        }

        let ext = std::path::Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        if ext.eq_ignore_ascii_case("pdf") {
            InputKind::Pdf
        } else if let Some(format) = ImageFormat::from_extension(ext) {
            InputKind::Image(format)
        } else {
            InputKind::Unsupported
        }
    }
}

/// Summary of the current editing state
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStatistics {
    /// Items in the collection (= output pages)
    pub items: usize,
    /// Sources ever registered in this session
    pub sources: usize,
    /// Remaining items per source, indexed like the registry
    pub items_per_source: Vec<usize>,
    /// Items whose rotation differs from their source orientation
    pub rotated_items: usize,
    /// Items currently selected
    pub selected_items: usize,
    /// Sources that no longer contribute any item
    pub unused_sources: usize,
    /// Image items whose format cannot be embedded at export
    pub skipped_on_export: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_action_matches_modular_formula() {
        for rotation in [
            Rotation::None,
            Rotation::Clockwise90,
            Rotation::Clockwise180,
            Rotation::Clockwise270,
        ] {
            let expected = ((rotation.degrees() - 90) % 360 + 360) % 360;
            assert_eq!(rotation.rotated_counter_clockwise().degrees(), expected);
        }
    }

    #[test]
    fn from_degrees_normalizes() {
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Clockwise270));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Clockwise90));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn classify_prefers_mime() {
        assert_eq!(
            InputKind::classify("scan.bin", Some("image/png")),
            InputKind::Image(ImageFormat::Png)
        );
        assert_eq!(InputKind::classify("report.PDF", None), InputKind::Pdf);
        assert_eq!(InputKind::classify("notes.txt", None), InputKind::Unsupported);
    }
}
