//! PDF Text Extraction
//!
//! Thin wrapper over the `pdf-extract` crate. A file that cannot be
//! parsed yields an error the caller reports per-document; it never
//! takes the process down.

use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::{info, warn};

/// Extract the full text of a PDF file.
pub fn extract_text(path: &Path) -> Result<String> {
    info!(path = %path.display(), "extracting text from PDF");

    let text = pdf_extract::extract_text(path)
        .map_err(|e| anyhow!("Failed to extract text from {}: {}", path.display(), e))?;

    if text.trim().is_empty() {
        warn!(path = %path.display(), "PDF produced no extractable text");
    } else {
        info!(
            path = %path.display(),
            chars = text.len(),
            "extracted text from PDF"
        );
    }

    Ok(text)
}
