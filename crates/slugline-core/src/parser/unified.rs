//! # Unified Parser Interface
//!
//! Dispatches a document to the structured or heuristic parser by format.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SluglineError};
use crate::pages::PageSource;
use crate::parser::heuristic::HeuristicParser;
use crate::parser::rules::HeuristicConfig;
use crate::parser::structured::StructuredParser;
use crate::types::Script;

/// Screenplay file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Final Draft XML.
    Fdx,
    /// PDF, parsed from extracted page text.
    Pdf,
    /// Fountain plain-text markup. Recognized but not parsed.
    Fountain,
}

impl Format {
    /// Detects the format from a file name's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `SluglineError::UnsupportedFormat` for any other extension.
    pub fn from_filename(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| SluglineError::UnsupportedFormat(format!("{name}: no file extension")))?;

        match ext.as_str() {
            "fdx" => Ok(Self::Fdx),
            "pdf" => Ok(Self::Pdf),
            "fountain" | "txt" => Ok(Self::Fountain),
            other => Err(SluglineError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fdx => "fdx",
            Self::Pdf => "pdf",
            Self::Fountain => "fountain",
        })
    }
}

/// Configuration for [`ScriptParser`].
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Thresholds for the heuristic text parser.
    pub heuristic: HeuristicConfig,
}

impl ParserConfig {
    /// Create a new parser configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heuristic parser thresholds.
    #[must_use]
    pub fn with_heuristic(mut self, heuristic: HeuristicConfig) -> Self {
        self.heuristic = heuristic;
        self
    }
}

/// Parses whole documents of any supported format.
///
/// `Send + Sync`: one parser can serve many threads.
pub struct ScriptParser {
    structured: StructuredParser,
    heuristic: HeuristicParser,
    pages: Option<Arc<dyn PageSource>>,
}

impl ScriptParser {
    /// Create a parser without a page source; PDF input will fail with
    /// `ExtractionUnavailable` until one is attached.
    ///
    /// # Errors
    ///
    /// Returns `SluglineError::RegexError` if a pattern fails to compile.
    pub fn new(config: ParserConfig) -> Result<Self> {
        Ok(Self {
            structured: StructuredParser::new()?,
            heuristic: HeuristicParser::new(config.heuristic)?,
            pages: None,
        })
    }

    /// Attach the page-text extractor used for PDF input.
    #[must_use]
    pub fn with_page_source(mut self, source: Arc<dyn PageSource>) -> Self {
        self.pages = Some(source);
        self
    }

    /// Parse a document.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` for Fountain input.
    /// - `MalformedInput` for FDX that is not well-formed.
    /// - `ExtractionUnavailable` for PDF input without a working page source.
    ///
    /// # Examples
    ///
    /// ```
    /// use slugline_core::{Format, ParserConfig, ScriptParser};
    ///
    /// let parser = ScriptParser::new(ParserConfig::default()).unwrap();
    /// let fdx = br#"<FinalDraft><Content>
    ///   <Paragraph Type="Scene Heading"><Text>INT. KITCHEN - DAY</Text></Paragraph>
    /// </Content></FinalDraft>"#;
    ///
    /// let script = parser.parse(Format::Fdx, fdx).unwrap();
    /// assert_eq!(script.scenes[0].location, "KITCHEN");
    /// ```
    pub fn parse(&self, format: Format, bytes: &[u8]) -> Result<Script> {
        debug!(%format, bytes = bytes.len(), "parsing document");
        match format {
            Format::Fdx => self.structured.parse_bytes(bytes),
            Format::Pdf => {
                let source = self.pages.as_ref().ok_or_else(|| {
                    SluglineError::ExtractionUnavailable("no page text extractor configured".into())
                })?;
                let pages = source.extract(bytes)?;
                debug!(
                    source = source.name(),
                    pages = pages.page_count,
                    lines = pages.lines.len(),
                    "extracted page text"
                );
                Ok(self.heuristic.parse_pages(&pages))
            }
            Format::Fountain => Err(SluglineError::UnsupportedFormat(
                "fountain screenplays are not supported".into(),
            )),
        }
    }

    /// Parse with the given page source regardless of format, e.g. for
    /// plain-text page dumps.
    ///
    /// # Errors
    ///
    /// Returns whatever the page source reports.
    pub fn parse_pages(&self, source: &dyn PageSource, bytes: &[u8]) -> Result<Script> {
        let pages = source.extract(bytes)?;
        Ok(self.heuristic.parse_pages(&pages))
    }

    /// Run the heuristic parser on externally extracted lines.
    #[must_use]
    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Script {
        self.heuristic.parse_lines(lines)
    }

    /// Check if a page source is attached.
    #[must_use]
    pub fn has_page_source(&self) -> bool {
        self.pages.is_some()
    }
}

/// Convenience function to parse a document with default settings and no
/// page source.
///
/// # Errors
///
/// See [`ScriptParser::parse`].
pub fn parse(format: Format, bytes: &[u8]) -> Result<Script> {
    ScriptParser::new(ParserConfig::default())?.parse(format, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{ExtractedPages, PlainTextPages};

    #[test]
    fn format_from_filename() {
        assert_eq!(Format::from_filename("pilot.fdx").unwrap(), Format::Fdx);
        assert_eq!(Format::from_filename("dir/Pilot.FDX").unwrap(), Format::Fdx);
        assert_eq!(Format::from_filename("ep1.pdf").unwrap(), Format::Pdf);
        assert_eq!(Format::from_filename("ep1.fountain").unwrap(), Format::Fountain);
        assert_eq!(Format::from_filename("ep1.txt").unwrap(), Format::Fountain);

        for bad in ["ep1.docx", "README", "archive.fdx.zip"] {
            assert!(matches!(
                Format::from_filename(bad),
                Err(SluglineError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn fountain_is_unsupported() {
        let parser = ScriptParser::new(ParserConfig::default()).unwrap();
        let err = parser.parse(Format::Fountain, b"INT. A - DAY").unwrap_err();
        assert!(matches!(err, SluglineError::UnsupportedFormat(_)));
    }

    #[test]
    fn pdf_without_source_is_unavailable() {
        let parser = ScriptParser::new(ParserConfig::default()).unwrap();
        assert!(!parser.has_page_source());
        let err = parser.parse(Format::Pdf, b"%PDF-1.4").unwrap_err();
        assert!(matches!(err, SluglineError::ExtractionUnavailable(_)));
    }

    struct FailingSource;

    impl PageSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        fn extract(&self, _bytes: &[u8]) -> Result<ExtractedPages> {
            Err(SluglineError::ExtractionUnavailable("broken".into()))
        }
    }

    #[test]
    fn extraction_failure_propagates() {
        let parser = ScriptParser::new(ParserConfig::default())
            .unwrap()
            .with_page_source(Arc::new(FailingSource));
        let err = parser.parse(Format::Pdf, b"%PDF").unwrap_err();
        assert!(matches!(err, SluglineError::ExtractionUnavailable(_)));
    }

    #[test]
    fn pdf_goes_through_page_source() {
        let parser = ScriptParser::new(ParserConfig::default())
            .unwrap()
            .with_page_source(Arc::new(PlainTextPages));
        let script = parser
            .parse(Format::Pdf, b"INT. A - DAY\nANNA\nHello.\x0CEXT. B - NIGHT")
            .unwrap();
        assert_eq!(script.total_pages, Some(2));
        assert_eq!(script.total_scenes, 2);
        assert_eq!(script.characters.get("ANNA").unwrap().total_lines, 1);
    }

    #[test]
    fn parse_pages_with_explicit_source() {
        let parser = ScriptParser::new(ParserConfig::default()).unwrap();
        let script = parser
            .parse_pages(&PlainTextPages, b"INT. A - DAY\nThe room is empty.")
            .unwrap();
        assert_eq!(script.scenes[0].line_count, 1);
        assert_eq!(script.total_pages, Some(1));
    }

    #[test]
    fn parser_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScriptParser>();
    }

    #[test]
    fn convenience_parse() {
        let script = parse(
            Format::Fdx,
            br#"<FinalDraft><Content><Paragraph Type="Scene Heading"><Text>EXT. PIER - DUSK</Text></Paragraph></Content></FinalDraft>"#,
        )
        .unwrap();
        assert_eq!(script.total_scenes, 1);
    }
}
