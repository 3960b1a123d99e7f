//! File input and export sinks

use crate::session::InputFile;
use crate::types::*;
use log::info;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Read a file from disk into an [`InputFile`].
///
/// The MIME type is left undeclared; classification falls back to the
/// extension and, for images, to the file content.
pub async fn load_input_file(path: impl AsRef<Path>) -> Result<InputFile> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(InputFile {
        name,
        mime: None,
        bytes,
    })
}

/// Read several files, in order.
pub async fn load_input_files(paths: &[impl AsRef<Path>]) -> Result<Vec<InputFile>> {
    let mut files = Vec::new();
    for path in paths {
        files.push(load_input_file(path).await?);
    }
    Ok(files)
}

/// Where exported documents go.
pub trait ExportSink {
    /// Hand over the finished bytes under a suggested filename.
    fn offer(&mut self, file_name: &str, bytes: Vec<u8>) -> impl Future<Output = Result<()>>;
}

/// Writes exports into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl ExportSink for DirectorySink {
    async fn offer(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.path_for(file_name);
        tokio::fs::write(&path, &bytes).await?;
        info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

/// Keeps exports in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl ExportSink for MemorySink {
    async fn offer(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        self.files.push((file_name.to_string(), bytes));
        Ok(())
    }
}
