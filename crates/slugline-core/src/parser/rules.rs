//! # Line Classification Rules
//!
//! The heuristic parser decides whether a line is a character cue by running
//! an ordered chain of [`CharacterRule`]s. Each rule either decides
//! (`Some(verdict)`) or passes (`None`); the first decision wins and a line
//! that passes every rule is a cue. [`LineRules::explain`] reports which rule
//! decided, which is what `trace` logging prints.

use regex::Regex;

use crate::error::Result;
use crate::slug::SlugClassifier;

/// Thresholds for the heuristic text parser.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicConfig {
    /// Minimum fraction of uppercase letters (over all characters) in a cue.
    pub min_uppercase_ratio: f64,
    /// Longest line, in characters, that can be a cue.
    pub max_name_len: usize,
    /// Action lines longer than this end a dialogue block.
    pub dialogue_break_len: usize,
    /// All-caps lines shorter than this are not action.
    pub shouted_line_len: usize,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            min_uppercase_ratio: 0.7,
            max_name_len: 50,
            dialogue_break_len: 60,
            shouted_line_len: 30,
        }
    }
}

impl HeuristicConfig {
    /// Create a new configuration with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum uppercase ratio for cues.
    #[must_use]
    pub fn with_min_uppercase_ratio(mut self, ratio: f64) -> Self {
        self.min_uppercase_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the maximum cue length.
    #[must_use]
    pub fn with_max_name_len(mut self, len: usize) -> Self {
        self.max_name_len = len;
        self
    }

    /// Set the length above which an action line breaks a dialogue block.
    #[must_use]
    pub fn with_dialogue_break_len(mut self, len: usize) -> Self {
        self.dialogue_break_len = len;
        self
    }

    /// Set the length below which an all-caps line is not counted as action.
    #[must_use]
    pub fn with_shouted_line_len(mut self, len: usize) -> Self {
        self.shouted_line_len = len;
        self
    }
}

/// Outcome of the cue test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Character,
    NotCharacter,
}

/// One named step of the cue test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterRule {
    /// Empty lines are never cues.
    Blank,
    /// Scene headings are never cues.
    SceneHeading,
    /// Transitions, title cards, scene/act counters, `CONTINUED`.
    ProductionPhrase,
    /// Too few uppercase letters.
    MostlyUppercase,
    /// Longer than [`HeuristicConfig::max_name_len`].
    MaxLength,
    /// Only digits once spaces, periods, hyphens and apostrophes are removed.
    NumericOnly,
    /// A short line ending in `:` without a V.O./O.S./CONT qualifier.
    BareColon,
    /// `FADE`, `CUT`, `THE END` and similar reserved words.
    ReservedWord,
    /// No alphabetic character at all.
    NoLetters,
}

impl CharacterRule {
    /// Rules in evaluation order.
    pub const CHAIN: [Self; 9] = [
        Self::Blank,
        Self::SceneHeading,
        Self::ProductionPhrase,
        Self::MostlyUppercase,
        Self::MaxLength,
        Self::NumericOnly,
        Self::BareColon,
        Self::ReservedWord,
        Self::NoLetters,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::SceneHeading => "scene-heading",
            Self::ProductionPhrase => "production-phrase",
            Self::MostlyUppercase => "mostly-uppercase",
            Self::MaxLength => "max-length",
            Self::NumericOnly => "numeric-only",
            Self::BareColon => "bare-colon",
            Self::ReservedWord => "reserved-word",
            Self::NoLetters => "no-letters",
        }
    }
}

/// Which rule decided a line, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    /// `None` when every rule passed and the default verdict applied.
    pub rule: Option<CharacterRule>,
}

const RESERVED_WORDS: &[&str] = &[
    "FADE",
    "CUT",
    "DISSOLVE",
    "SMASH",
    "CONTINUED",
    "CONTINUES",
    "END",
    "THE END",
];

/// Compiled line tests for the heuristic parser.
#[derive(Debug, Clone)]
pub struct LineRules {
    config: HeuristicConfig,
    slugs: SlugClassifier,
    re_production: Regex,
    re_qualifier: Regex,
}

impl LineRules {
    /// # Errors
    ///
    /// Returns `SluglineError::RegexError` if a pattern fails to compile.
    pub fn new(config: HeuristicConfig) -> Result<Self> {
        Ok(Self {
            config,
            slugs: SlugClassifier::new()?,
            re_production: Regex::new(
                r"(?i)^(?:MATCH CUT|CUT TO|FADE|DISSOLVE|SMASH|TITLES?|KNOCK\.?\s*KNOCK\.?|CONTINUED|CONTINUES|(?:\d+\.?\s*)?(?:SCENE|ACT)\s+\d+)",
            )?,
            re_qualifier: Regex::new(r"(?i)\(V?\.?O\.?S?\.?\)|\(CONT")?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Returns `true` if the line is a scene heading.
    #[must_use]
    pub fn is_heading(&self, line: &str) -> bool {
        self.slugs.is_heading(line)
    }

    /// Applies a single rule to a trimmed line.
    #[must_use]
    pub fn apply(&self, rule: CharacterRule, line: &str) -> Option<Verdict> {
        let reject = match rule {
            CharacterRule::Blank => line.is_empty(),
            CharacterRule::SceneHeading => self.is_heading(line),
            CharacterRule::ProductionPhrase => self.re_production.is_match(line),
            CharacterRule::MostlyUppercase => {
                let total = line.chars().count();
                let upper = line.chars().filter(|c| c.is_uppercase()).count();
                total == 0 || (upper as f64 / total as f64) < self.config.min_uppercase_ratio
            }
            CharacterRule::MaxLength => line.chars().count() > self.config.max_name_len,
            CharacterRule::NumericOnly => {
                let stripped: String = line
                    .chars()
                    .filter(|c| !matches!(c, ' ' | '.' | '-' | '\''))
                    .collect();
                !stripped.is_empty() && stripped.chars().all(char::is_numeric)
            }
            CharacterRule::BareColon => {
                line.ends_with(':')
                    && line.split_whitespace().count() <= 2
                    && !self.re_qualifier.is_match(line)
            }
            CharacterRule::ReservedWord => RESERVED_WORDS.contains(&line.to_uppercase().as_str()),
            CharacterRule::NoLetters => !line.chars().any(char::is_alphabetic),
        };
        reject.then_some(Verdict::NotCharacter)
    }

    /// Runs the rule chain and reports which rule decided.
    #[must_use]
    pub fn explain(&self, line: &str) -> Decision {
        let line = line.trim();
        CharacterRule::CHAIN
            .iter()
            .find_map(|&rule| {
                self.apply(rule, line).map(|verdict| Decision {
                    verdict,
                    rule: Some(rule),
                })
            })
            .unwrap_or(Decision {
                verdict: Verdict::Character,
                rule: None,
            })
    }

    /// Returns `true` if the line looks like a character cue.
    #[must_use]
    pub fn is_character(&self, line: &str) -> bool {
        self.explain(line).verdict == Verdict::Character
    }

    /// Returns `true` if the line is narrative action: not a heading, not a
    /// cue, and not a short all-caps line.
    #[must_use]
    pub fn is_action(&self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() || self.is_heading(line) || self.is_character(line) {
            return false;
        }
        !(is_all_caps(line) && line.chars().count() < self.config.shouted_line_len)
    }
}

/// At least one cased letter and no lowercase letters.
fn is_all_caps(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

/// Returns `true` for a line wrapped in literal parentheses.
#[must_use]
pub fn is_parenthetical(line: &str) -> bool {
    line.starts_with('(') && line.ends_with(')')
}
