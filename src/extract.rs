// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Text extraction from intake documents

use std::path::Path;
use tracing::{debug, Level};

use crate::{ArchivistError, Result};

/// Extension of documents picked up from the intake folder
pub const DOCUMENT_EXTENSION: &str = "pdf";

/// Returns the text of a document in page order
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Extractor for PDF files
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn page_count(bytes: &[u8]) -> Option<usize> {
        lopdf::Document::load_mem(bytes)
            .ok()
            .map(|doc| doc.get_pages().len())
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            ArchivistError::Extraction {
                file: display_name(path),
                message: e.to_string(),
            }
        })?;

        // Page counting parses the file again
        if tracing::enabled!(Level::DEBUG) {
            debug!(
                "Extracted {} chars from {:?} ({} pages)",
                text.chars().count(),
                path,
                Self::page_count(&bytes).map_or_else(|| "?".to_string(), |n| n.to_string())
            );
        }
        Ok(text)
    }
}

/// Check whether an intake entry is a document to classify
pub fn is_document(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

/// Truncate to at most `max_chars` characters, on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
