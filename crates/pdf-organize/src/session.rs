//! Editing session
//!
//! Ties the source registry and the collection together for one
//! load → edit → export cycle. Loading goes through an injected
//! [`SourceLoader`]; exporting goes through an [`ExportSink`].

use crate::assemble::{AssembledDocument, assemble, assemble_selection};
use crate::collection::{Collection, Item};
use crate::io::ExportSink;
use crate::loader::{LopdfLoader, SourceLoader};
use crate::options::ExportOptions;
use crate::registry::{Source, SourceRegistry};
use crate::stats::calculate_statistics;
use crate::types::*;
use log::{info, warn};

/// Raw bytes of one uploaded file
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    /// Declared MIME type, if the caller knows it
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: None,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn kind(&self) -> InputKind {
        InputKind::classify(&self.name, self.mime.as_deref())
    }
}

/// Outcome of a batch load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    /// Items created, in collection order
    pub loaded: Vec<ItemId>,
    /// Names of inputs skipped as unsupported
    pub skipped: Vec<String>,
}

/// Outcome of an export handed to a sink
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub file_name: String,
    pub page_count: usize,
    pub byte_len: usize,
    pub skipped: Vec<ItemId>,
}

pub struct EditingSession<L = LopdfLoader> {
    loader: L,
    registry: SourceRegistry,
    collection: Collection,
}

impl EditingSession<LopdfLoader> {
    pub fn new() -> Self {
        Self::with_loader(LopdfLoader)
    }
}

impl Default for EditingSession<LopdfLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: SourceLoader> EditingSession<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            registry: SourceRegistry::new(),
            collection: Collection::new(),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut Collection {
        &mut self.collection
    }

    pub fn statistics(&self) -> CollectionStatistics {
        calculate_statistics(&self.collection, &self.registry)
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Load a PDF and append one item per page.
    ///
    /// Nothing changes if the bytes cannot be parsed.
    pub fn load_document(&mut self, name: &str, bytes: &[u8]) -> Result<Vec<ItemId>> {
        let loaded = self.loader.load_document(name, bytes)?;
        let source_index = self.registry.push(Source::Pdf(loaded.source));

        let items: Vec<Item> = loaded
            .pages
            .into_iter()
            .enumerate()
            .map(|(page_index, page)| {
                let id = ItemId::generate(&format!("{source_index}-{page_index}"));
                let item = Item::new(id, source_index, page_index)
                    .with_base_rotation(page.intrinsic_rotation);
                match page.preview {
                    Some(preview) => item.with_thumbnail(preview),
                    None => item,
                }
            })
            .collect();

        info!("Loaded {} with {} pages", name, items.len());
        Ok(self.append(items))
    }

    /// Load an image as a single item.
    pub fn load_image(&mut self, name: &str, bytes: &[u8], format: ImageFormat) -> Result<ItemId> {
        let loaded = self.loader.load_image(name, bytes, format)?;
        let source_index = self.registry.push(Source::Image(loaded.source));

        let id = ItemId::generate(&format!("{source_index}-{name}"));
        let item = Item::new(id.clone(), source_index, 0).with_thumbnail(loaded.preview);

        info!("Loaded image {} ({}x{})", name, loaded.width, loaded.height);
        self.append(vec![item]);
        Ok(id)
    }

    /// Load one file, dispatching on its kind.
    pub fn load_file(&mut self, file: &InputFile) -> Result<Vec<ItemId>> {
        match file.kind() {
            InputKind::Pdf => self.load_document(&file.name, &file.bytes),
            InputKind::Image(format) => Ok(vec![self.load_image(&file.name, &file.bytes, format)?]),
            InputKind::Unsupported => Err(OrganizeError::UnsupportedInput(file.name.clone())),
        }
    }

    /// Load several files as one operation.
    ///
    /// Unsupported files are skipped with a warning. Any other failure aborts
    /// the batch and restores the session to its state before the call.
    pub fn load_files(&mut self, files: &[InputFile]) -> Result<LoadSummary> {
        let registry_len = self.registry.len();
        let collection_before = self.collection.clone();
        let mut summary = LoadSummary::default();

        for file in files {
            match self.load_file(file) {
                Ok(ids) => summary.loaded.extend(ids),
                Err(OrganizeError::UnsupportedInput(reason)) => {
                    warn!("Skipping unsupported input {}", reason);
                    summary.skipped.push(file.name.clone());
                }
                Err(e) => {
                    self.registry.truncate(registry_len);
                    self.collection = collection_before;
                    return Err(e);
                }
            }
        }

        Ok(summary)
    }

    fn append(&mut self, items: Vec<Item>) -> Vec<ItemId> {
        let ids: Vec<ItemId> = items.iter().map(|item| item.id.clone()).collect();
        self.collection.append(items);
        ids
    }

    /// Forget every source and item.
    pub fn reset(&mut self) {
        self.collection.clear();
        self.registry.clear();
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    pub async fn export(&self, options: &ExportOptions) -> Result<AssembledDocument> {
        assemble(self.collection.items(), &self.registry, options).await
    }

    pub async fn export_selection(&self, options: &ExportOptions) -> Result<AssembledDocument> {
        assemble_selection(&self.collection, &self.registry, options).await
    }

    /// Export the whole collection and hand the bytes to `sink`.
    ///
    /// The sink is only called once assembly has fully succeeded.
    pub async fn export_to<S: ExportSink>(
        &self,
        options: &ExportOptions,
        sink: &mut S,
    ) -> Result<ExportReport> {
        let assembled = self.export(options).await?;
        let report = ExportReport {
            file_name: options.file_name.clone(),
            page_count: assembled.page_count,
            byte_len: assembled.bytes.len(),
            skipped: assembled.skipped,
        };
        sink.offer(&options.file_name, assembled.bytes).await?;
        Ok(report)
    }
}
