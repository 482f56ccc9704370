//! # Page Text
//!
//! The heuristic parser never sees a PDF. A [`PageSource`] turns document
//! bytes into [`ExtractedPages`]: trimmed, non-empty lines in reading order
//! plus the page count. The core ships [`PlainTextPages`] for text that has
//! already been extracted; binaries that can read PDFs plug in their own
//! source.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::error::Result;

/// Page separator in plain-text page dumps.
pub const FORM_FEED: char = '\x0C';

/// Lines of a document with page boundaries discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPages {
    /// Trimmed, non-empty lines in reading order.
    pub lines: Vec<String>,
    pub page_count: u32,
}

impl ExtractedPages {
    /// Builds from per-page text.
    #[must_use]
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extracted = Self::default();
        for page in pages {
            extracted.page_count += 1;
            extracted.lines.extend(
                page.as_ref()
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from),
            );
        }
        extracted
    }

    /// Builds from a text dump whose pages are separated by form feeds.
    /// Empty input has zero pages.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        let mut pages: Vec<&str> = text.split(FORM_FEED).collect();
        // A trailing form feed closes the last page rather than opening one.
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        Self::from_pages(pages)
    }
}

/// Turns document bytes into page text.
pub trait PageSource: Send + Sync {
    /// Short name for logs, e.g. `"pdf"`.
    fn name(&self) -> &str;

    /// Extracts the document's lines.
    ///
    /// # Errors
    ///
    /// Returns `SluglineError::ExtractionUnavailable` if the extractor cannot
    /// run or fails on this document.
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedPages>;
}

/// Already-extracted text, pages separated by form feeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextPages;

impl PageSource for PlainTextPages {
    fn name(&self) -> &str {
        "text"
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedPages> {
        Ok(ExtractedPages::from_text(&decode_text(bytes)))
    }
}

/// Decodes document bytes: a BOM selects the encoding, otherwise UTF-8 is
/// tried and Windows-1252 is the fallback. Windows-1252 maps every byte, so
/// decoding never fails.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }

    match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => text.into_owned(),
        None => {
            tracing::debug!("input is not valid UTF-8, decoding as windows-1252");
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}
