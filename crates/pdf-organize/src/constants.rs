//! Shared constants for page organizing and export

// =============================================================================
// Output Document
// =============================================================================

/// PDF version written to exported documents
pub const DEFAULT_PDF_VERSION: &str = "1.7";

/// Versions accepted in export options
pub const SUPPORTED_PDF_VERSIONS: &[&str] = &["1.4", "1.5", "1.6", "1.7", "2.0"];

/// Suggested filename for exported documents
pub const DEFAULT_EXPORT_FILE_NAME: &str = "organized.pdf";

// =============================================================================
// Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Fallback when a page carries no usable MediaBox
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Page Tree
// =============================================================================

/// Page attributes a page may inherit from its ancestors in the page tree
pub const INHERITABLE_PAGE_KEYS: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Bound on page-tree walks, guards against cyclic /Parent chains
pub const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Prefix for image XObject resource names
pub const IMAGE_XOBJECT_PREFIX: &str = "Im";
