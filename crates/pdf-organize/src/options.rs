use crate::constants::{DEFAULT_EXPORT_FILE_NAME, DEFAULT_PDF_VERSION, SUPPORTED_PDF_VERSIONS};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Export configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExportOptions {
    /// Suggested filename handed to the export sink
    pub file_name: String,

    /// PDF version written in the output header
    pub pdf_version: String,

    /// Flate-compress streams that allow it
    pub compress: bool,

    /// Optional /Title in the document info dictionary
    pub title: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            pdf_version: DEFAULT_PDF_VERSION.to_string(),
            compress: true,
            title: None,
        }
    }
}

impl ExportOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| OrganizeError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| OrganizeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let name = self.file_name.trim();
        if name.is_empty() {
            return Err(OrganizeError::Config("Export file name is empty".to_string()));
        }
        if name.contains(['/', '\\']) {
            return Err(OrganizeError::Config(format!(
                "Export file name must not contain path separators: {}",
                name
            )));
        }
        if !name.to_ascii_lowercase().ends_with(".pdf") {
            return Err(OrganizeError::Config(format!(
                "Export file name must end in .pdf: {}",
                name
            )));
        }

        if !SUPPORTED_PDF_VERSIONS.contains(&self.pdf_version.as_str()) {
            return Err(OrganizeError::Config(format!(
                "Unsupported PDF version {}. Use one of {:?}.",
                self.pdf_version, SUPPORTED_PDF_VERSIONS
            )));
        }

        Ok(())
    }
}
