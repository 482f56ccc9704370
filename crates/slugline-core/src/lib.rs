//! # Slugline Core
//!
//! Turns screenplays into a structural model: scenes with their
//! interior/exterior, location and time of day, and the characters speaking
//! in them. Final Draft XML is parsed exactly from its paragraph types;
//! extracted PDF text is parsed heuristically from line shapes. Many parsed
//! scripts fold into one cross-document index with deterministic ordering.
//!
//! ## Quick Start
//!
//! ```rust
//! use slugline_core::{Format, IntExt, ParserConfig, ScriptParser};
//!
//! let fdx = br#"<FinalDraft><Content>
//!   <Paragraph Type="Scene Heading"><Text>INT. KITCHEN - DAY</Text></Paragraph>
//!   <Paragraph Type="Character"><Text>PAISLEY (CONT'D)</Text></Paragraph>
//!   <Paragraph Type="Dialogue"><Text>Dinner's ready.</Text></Paragraph>
//! </Content></FinalDraft>"#;
//!
//! let parser = ScriptParser::new(ParserConfig::default()).unwrap();
//! let script = parser.parse(Format::Fdx, fdx).unwrap();
//!
//! assert_eq!(script.scenes[0].int_ext, IntExt::Int);
//! assert_eq!(script.characters.get("PAISLEY").unwrap().total_lines, 1);
//! ```
pub mod aggregator;
pub mod batch;
pub mod error;
pub mod identity;
pub mod pages;
pub mod parser;
pub mod slug;
pub mod types;

// Re-export primary API
pub use aggregator::{Aggregator, aggregate};
pub use batch::{BatchFailure, BatchOutcome, SourceDocument, parse_all};
pub use error::{Result, SluglineError};
pub use identity::{NameNormalizer, merge_variants, normalize};
pub use pages::{ExtractedPages, PageSource, PlainTextPages, decode_text};
pub use parser::{
    CharacterRule, Format, HeuristicConfig, HeuristicParser, ParagraphKind, ParserConfig,
    ScriptParser, StructuredParser,
};
pub use slug::{SlugClassifier, SlugInfo, classify};
pub use types::{
    Aggregate, Appearance, Character, CharacterIndexEntry, CharacterMap, CharacterSummary,
    Document, DocumentScenes, Histogram, IntExt, LocationDetail, OrderedMap, Scene, Script,
    ScriptSummary, TimeOfDay,
};
