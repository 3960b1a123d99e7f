//! Append-only registry of loaded sources
//!
//! Every uploaded PDF or image becomes one entry. Items refer back to their
//! source by index, so entries are never reordered or removed while a session
//! is alive.

use crate::types::{ImageFormat, OrganizeError, Result};
use lopdf::{Document, ObjectId};

/// A parsed PDF together with its page object IDs in page order.
#[derive(Debug, Clone)]
pub struct PdfSource {
    pub name: String,
    pub document: Document,
    pub page_ids: Vec<ObjectId>,
}

impl PdfSource {
    pub fn new(name: impl Into<String>, document: Document) -> Self {
        // get_pages is keyed by 1-based page number, BTreeMap keeps them in order
        let page_ids = document.get_pages().values().copied().collect();
        Self {
            name: name.into(),
            document,
            page_ids,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(OrganizeError::PageOutOfRange {
                index,
                count: self.page_ids.len(),
            })
    }
}

/// Raw image bytes with their decoded format.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub name: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum Source {
    Pdf(PdfSource),
    Image(ImageSource),
}

impl Source {
    pub fn name(&self) -> &str {
        match self {
            Source::Pdf(pdf) => &pdf.name,
            Source::Image(image) => &image.name,
        }
    }

    /// Pages (or images) this source can contribute.
    pub fn content_count(&self) -> usize {
        match self {
            Source::Pdf(pdf) => pdf.page_count(),
            Source::Image(_) => 1,
        }
    }
}

/// Sources in load order.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source and return its stable index.
    pub fn push(&mut self, source: Source) -> usize {
        self.sources.push(source);
        self.sources.len() - 1
    }

    pub fn get(&self, index: usize) -> Result<&Source> {
        self.sources
            .get(index)
            .ok_or(OrganizeError::MissingSource(index))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.sources.truncate(len);
    }

    pub(crate) fn clear(&mut self) {
        self.sources.clear();
    }
}
