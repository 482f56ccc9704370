//! # Batch Parsing
//!
//! Parses many documents independently (in parallel with the `rayon`
//! feature) and keeps one outcome per input, in input order. A failed
//! document never aborts the batch; callers aggregate the successes.

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{Result, SluglineError};
use crate::parser::{Format, ScriptParser};
use crate::types::Document;

/// One input document of a batch.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    /// Detected from `name` at parse time when `None`.
    pub format: Option<Format>,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    /// A document whose format is taken from its file name.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            format: None,
            bytes,
        }
    }

    /// Override format detection.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    fn parse(&self, parser: &ScriptParser) -> Result<Document> {
        let format = match self.format {
            Some(format) => format,
            None => Format::from_filename(&self.name)?,
        };
        let script = parser.parse(format, &self.bytes)?;
        Ok(Document::new(self.name.clone(), script))
    }
}

/// A document that could not be parsed.
#[derive(Debug)]
pub struct BatchFailure {
    pub name: String,
    pub error: SluglineError,
}

/// Result of parsing one batch input.
#[derive(Debug)]
pub enum BatchOutcome {
    Parsed(Document),
    Failed(BatchFailure),
}

impl BatchOutcome {
    /// Name of the input this outcome belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Parsed(document) => &document.name,
            Self::Failed(failure) => &failure.name,
        }
    }

    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// Splits outcomes into parsed documents and failures, both in input
    /// order.
    #[must_use]
    pub fn partition(
        outcomes: impl IntoIterator<Item = Self>,
    ) -> (Vec<Document>, Vec<BatchFailure>) {
        let mut parsed = Vec::new();
        let mut failed = Vec::new();
        for outcome in outcomes {
            match outcome {
                Self::Parsed(document) => parsed.push(document),
                Self::Failed(failure) => failed.push(failure),
            }
        }
        (parsed, failed)
    }
}

fn parse_one(parser: &ScriptParser, source: &SourceDocument) -> BatchOutcome {
    match source.parse(parser) {
        Ok(document) => BatchOutcome::Parsed(document),
        Err(error) => {
            warn!(document = %source.name, %error, "document failed to parse");
            BatchOutcome::Failed(BatchFailure {
                name: source.name.clone(),
                error,
            })
        }
    }
}

/// Parses every source; outcomes are returned in input order.
#[cfg(feature = "rayon")]
#[must_use]
pub fn parse_all(parser: &ScriptParser, sources: &[SourceDocument]) -> Vec<BatchOutcome> {
    info!(documents = sources.len(), "parsing batch in parallel");
    sources
        .par_iter()
        .map(|source| parse_one(parser, source))
        .collect()
}

/// Parses every source; outcomes are returned in input order.
#[cfg(not(feature = "rayon"))]
#[must_use]
pub fn parse_all(parser: &ScriptParser, sources: &[SourceDocument]) -> Vec<BatchOutcome> {
    info!(documents = sources.len(), "parsing batch");
    sources
        .iter()
        .map(|source| parse_one(parser, source))
        .collect()
}
