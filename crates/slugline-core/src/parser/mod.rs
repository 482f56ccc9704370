mod builder;
pub mod heuristic;
pub mod rules;
pub mod structured;
pub mod unified;

pub use heuristic::HeuristicParser;
pub use rules::{CharacterRule, Decision, HeuristicConfig, LineRules, Verdict};
pub use structured::{ParagraphKind, ParagraphStream, StructuredParser, read_paragraphs};
pub use unified::{Format, ParserConfig, ScriptParser, parse};
