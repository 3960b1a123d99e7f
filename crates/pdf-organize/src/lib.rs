//! Reorder, rotate, delete and merge PDF pages and images, then export the
//! result as a new PDF.

pub mod assemble;
pub mod collection;
pub mod constants;
pub mod encoder;
pub mod io;
pub mod loader;
mod options;
mod page_tree;
pub mod registry;
pub mod session;
mod stats;
mod types;

pub use assemble::{AssembledDocument, assemble, assemble_selection, assemble_with};
pub use collection::{Collection, Item};
pub use encoder::{DocumentEncoder, EmbeddedImage, ImagePlacement, LopdfEncoder};
pub use io::{DirectorySink, ExportSink, MemorySink, load_input_file, load_input_files};
pub use loader::{LoadedDocument, LoadedImage, LoadedPage, LopdfLoader, SourceLoader};
pub use options::*;
pub use page_tree::page_dimensions;
pub use registry::{ImageSource, PdfSource, Source, SourceRegistry};
pub use session::{EditingSession, ExportReport, InputFile, LoadSummary};
pub use stats::calculate_statistics;
pub use types::*;
