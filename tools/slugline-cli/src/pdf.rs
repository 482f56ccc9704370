//! PDF page text via `pdf-extract`, one string per page so the page count
//! matches the document.

use slugline_core::{ExtractedPages, PageSource, Result, SluglineError};
use tracing::debug;

/// Extracts page text from PDF bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPages;

impl PageSource for PdfPages {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedPages> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
            SluglineError::ExtractionUnavailable(format!("pdf extraction failed: {e}"))
        })?;
        let pages = ExtractedPages::from_pages(pages);
        debug!(pages = pages.page_count, lines = pages.lines.len(), "extracted pdf text");
        Ok(pages)
    }
}
