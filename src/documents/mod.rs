//! Uploaded document handling: text extraction and on-disk storage of the
//! original files.


use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{RagError, Result};

/// Extracts the plain text of a document
pub trait TextExtractor: Send + Sync {
    /// Return the concatenated text of every page, in page order
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// PDF text extraction backed by `pdf-extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    #[inline]
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed inputs
        let extracted = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
            .map_err(|_| RagError::Extraction("PDF parser panicked on malformed input".to_string()))?;

        let text = extracted.map_err(|e| RagError::Extraction(format!("Failed to read PDF: {}", e)))?;
        debug!(
            "Extracted {} characters from {} byte PDF",
            text.chars().count(),
            bytes.len()
        );
        Ok(text)
    }
}

/// Directory where uploaded files are kept
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    #[inline]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Ensure the storage directory exists
    #[inline]
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under the sanitized `filename`, replacing any previous file
    #[inline]
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = sanitize_filename(filename)?;
        self.init()?;

        let path = self.dir.join(name);
        fs::write(&path, bytes)?;
        info!("Stored upload {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

/// Reduce a client-supplied filename to a single safe path component
#[inline]
pub fn sanitize_filename(filename: &str) -> Result<&str> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(RagError::InvalidInput(format!(
            "Invalid upload filename: {:?}",
            filename
        )));
    }

    Ok(name)
}
