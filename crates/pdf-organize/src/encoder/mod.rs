//! Output document encoding
//!
//! The assembler talks to the output format only through [`DocumentEncoder`].
//! [`LopdfEncoder`] is the implementation used for export.

mod copy;
mod lopdf_encoder;
mod xobject;

pub use lopdf_encoder::LopdfEncoder;

use crate::options::ExportOptions;
use crate::registry::{ImageSource, PdfSource};
use crate::types::{Result, Rotation};

/// Handle to an embedded image plus its native pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddedImage<I> {
    pub handle: I,
    pub width: u32,
    pub height: u32,
}

/// Where and how to draw an image on a page.
///
/// The image is scaled to `width` × `height`, rotated by `angle_degrees`
/// about its center and centered on `center`. Positive angles turn
/// counter-clockwise, as in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub center: (f32, f32),
    pub width: f32,
    pub height: f32,
    pub angle_degrees: i32,
}

impl ImagePlacement {
    /// Transformation matrix `[a b c d e f]` mapping the unit square onto the page.
    pub fn matrix(&self) -> [f32; 6] {
        let (cos, sin) = match self.angle_degrees.rem_euclid(360) {
            0 => (1.0, 0.0),
            90 => (0.0, 1.0),
            180 => (-1.0, 0.0),
            270 => (0.0, -1.0),
            other => {
                let radians = (other as f32).to_radians();
                (radians.cos(), radians.sin())
            }
        };
        let (w, h) = (self.width, self.height);
        let (cx, cy) = self.center;

        // translate(center) · rotate · translate(-w/2, -h/2) · scale(w, h)
        let matrix = [
            w * cos,
            w * sin,
            -h * sin,
            h * cos,
            cx - (w / 2.0) * cos + (h / 2.0) * sin,
            cy - (w / 2.0) * sin - (h / 2.0) * cos,
        ];
        // avoid writing "-0" into content streams
        matrix.map(|v| v + 0.0)
    }
}

/// Capability that builds one output document.
///
/// An encoder is a single-writer object: every call mutates the document it
/// is building, so calls must be made one at a time.
pub trait DocumentEncoder {
    type Page: Copy;
    type Image: Copy;

    /// Create an empty output document.
    fn create(options: &ExportOptions) -> Self
    where
        Self: Sized;

    /// Copy page `page_index` of `source` into the output and append it.
    ///
    /// `source_index` identifies the source so shared resources are copied once.
    fn copy_page(
        &mut self,
        source_index: usize,
        source: &PdfSource,
        page_index: usize,
    ) -> Result<Self::Page>;

    /// Embed a JPEG or PNG image.
    fn embed_image(&mut self, image: &ImageSource) -> Result<EmbeddedImage<Self::Image>>;

    /// Append a blank page of the given size in points.
    fn add_page(&mut self, width: f32, height: f32) -> Result<Self::Page>;

    /// Draw an embedded image onto a page created by [`DocumentEncoder::add_page`].
    fn draw_image(
        &mut self,
        page: Self::Page,
        image: Self::Image,
        placement: ImagePlacement,
    ) -> Result<()>;

    /// Set the page's absolute rotation.
    fn set_rotation(&mut self, page: Self::Page, rotation: Rotation) -> Result<()>;

    /// Finish the document and return its bytes.
    fn serialize(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}
