//! PDF Document Loader
//!
//! Scans a directory for `.pdf` files (extension matched case-insensitively)
//! and extracts one [`Document`] per page with `lopdf`.

use std::path::{Path, PathBuf};

use docqa_core::{Document, DocumentSource};

use crate::RagError;

/// Loads every PDF in a directory
#[derive(Debug, Clone)]
pub struct PdfLoader {
    dir: PathBuf,
}

impl PdfLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// PDF files in the directory, sorted by file name
    pub fn pdf_files(&self) -> Result<Vec<PathBuf>, RagError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            RagError::Io(format!("Failed to read {}: {}", self.dir.display(), e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_pdf(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Load all pages of all PDFs
    ///
    /// Fails with [`RagError::NoDocuments`] when the directory is missing or
    /// nothing was loaded.
    pub fn load(&self) -> Result<Vec<Document>, RagError> {
        if !self.dir.is_dir() {
            return Err(RagError::NoDocuments(format!(
                "{} (directory not found)",
                self.dir.display()
            )));
        }

        let mut documents = Vec::new();
        for path in self.pdf_files()? {
            let pages = Self::load_file(&path)?;
            tracing::info!(file = %path.display(), pages = pages.len(), "Loaded PDF");
            documents.extend(pages);
        }

        if documents.is_empty() {
            return Err(RagError::NoDocuments(self.dir.display().to_string()));
        }

        Ok(documents)
    }

    /// Load the pages of one PDF file
    ///
    /// Pages whose text cannot be extracted are skipped with a warning.
    pub fn load_file(path: &Path) -> Result<Vec<Document>, RagError> {
        let pdf = lopdf::Document::load(path)
            .map_err(|e| RagError::Pdf(format!("{}: {}", path.display(), e)))?;

        let mut documents = Vec::new();
        for page in pdf.get_pages().keys().copied() {
            match pdf.extract_text(&[page]) {
                Ok(text) => {
                    // extraction terminates every text object with a newline
                    let text = text.trim_end().to_string();
                    documents.push(Document::new(DocumentSource::new(path, page), text));
                }
                Err(e) => {
                    tracing::warn!(
                        file = %path.display(),
                        page,
                        error = %e,
                        "Skipping page without extractable text"
                    );
                }
            }
        }
        Ok(documents)
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
