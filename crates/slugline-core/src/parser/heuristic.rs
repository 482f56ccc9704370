use regex::Regex;
use tracing::{debug, trace};

use crate::error::Result;
use crate::identity::NameNormalizer;
use crate::pages::ExtractedPages;
use crate::parser::builder::ScriptBuilder;
use crate::parser::rules::{CharacterRule, HeuristicConfig, LineRules, Verdict, is_parenthetical};
use crate::slug::SlugClassifier;
use crate::types::Script;

/// Heuristic parser for screenplays available only as extracted page text.
///
/// Text extraction loses all paragraph typing, so every line is classified
/// from its shape alone: scene headings by their `INT.`/`EXT.` prefix, cues by
/// the [`LineRules`] chain, and the rest as action. Misclassification is an
/// accuracy issue, not an error; parsing lines never fails.
pub struct HeuristicParser {
    rules: LineRules,
    slugs: SlugClassifier,
    normalizer: NameNormalizer,
    re_title: Regex,
}

impl HeuristicParser {
    /// Constructs a new `HeuristicParser` with pre-compiled patterns.
    ///
    /// # Errors
    ///
    /// Returns `SluglineError::RegexError` if any pattern fails to compile
    /// (should never happen with the static patterns defined here).
    pub fn new(config: HeuristicConfig) -> Result<Self> {
        Ok(Self {
            rules: LineRules::new(config)?,
            slugs: SlugClassifier::new()?,
            normalizer: NameNormalizer::new()?,
            re_title: Regex::new(r"(?i)^TITLES?\s*:\s*(.+)$")?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &HeuristicConfig {
        self.rules.config()
    }

    #[must_use]
    pub fn rules(&self) -> &LineRules {
        &self.rules
    }

    /// Parses extracted pages, recording their page count.
    #[must_use]
    pub fn parse_pages(&self, pages: &ExtractedPages) -> Script {
        let mut script = self.parse_lines(pages.lines.as_slice());
        script.total_pages = Some(pages.page_count);
        script
    }

    /// Parses an ordered list of text lines. Lines are trimmed and blank
    /// lines dropped before classification.
    ///
    /// # Examples
    ///
    /// ```
    /// use slugline_core::parser::{HeuristicConfig, HeuristicParser};
    ///
    /// let parser = HeuristicParser::new(HeuristicConfig::default()).unwrap();
    /// let script = parser.parse_lines(&["INT. KITCHEN - DAY", "ANNA", "Dinner's ready."]);
    ///
    /// assert_eq!(script.total_scenes, 1);
    /// assert_eq!(script.characters.get("ANNA").unwrap().total_lines, 1);
    /// ```
    #[must_use]
    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Script {
        let lines: Vec<&str> = lines
            .iter()
            .map(|l| l.as_ref().trim())
            .filter(|l| !l.is_empty())
            .collect();

        let title = self.extract_title(&lines);
        debug!(lines = lines.len(), title = ?title, "parsing extracted text");

        let mut builder = ScriptBuilder::new(&self.slugs, &self.normalizer);
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            if self.rules.is_heading(line) {
                builder.open_scene(line);
                i += 1;
                continue;
            }

            if !builder.has_scene() {
                i += 1;
                continue;
            }

            let decision = self.rules.explain(line);
            trace!(
                line,
                verdict = ?decision.verdict,
                rule = decision.rule.map_or("default", CharacterRule::name),
                "classified line"
            );

            if decision.verdict == Verdict::Character {
                if builder.cue(line).is_none() {
                    i += 1;
                    continue;
                }

                let end = self.dialogue_end(&lines, i + 1);
                let spoken = lines[i + 1..end]
                    .iter()
                    .filter(|l| !is_parenthetical(l))
                    .count();
                if spoken > 0 {
                    builder.dialogue(spoken);
                }
                i = end;
                continue;
            }

            if self.rules.is_action(line) {
                builder.action(1);
            }
            i += 1;
        }

        builder.finish(title, None)
    }

    fn extract_title(&self, lines: &[&str]) -> Option<String> {
        lines.iter().find_map(|line| {
            self.re_title
                .captures(line)
                .map(|c| c[1].trim().to_string())
        })
    }

    /// Index one past the last line of the dialogue block starting at
    /// `start`. The block ends before the next cue or heading, or before an
    /// action line longer than the break length.
    fn dialogue_end(&self, lines: &[&str], start: usize) -> usize {
        let break_len = self.rules.config().dialogue_break_len;
        for (j, &next) in lines.iter().enumerate().skip(start) {
            if self.rules.is_character(next) || self.rules.is_heading(next) {
                return j;
            }
            if next.chars().count() > break_len
                && self.rules.is_action(next)
                && !is_parenthetical(next)
            {
                return j;
            }
        }
        lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(lines: &[&str]) -> Script {
        HeuristicParser::new(HeuristicConfig::default())
            .unwrap()
            .parse_lines(lines)
    }

    #[test]
    fn title_from_titles_line() {
        let script = parse(&["Draft 3", "TITLES: The Long Night ", "INT. A - DAY"]);
        assert_eq!(script.title.as_deref(), Some("The Long Night"));

        let script = parse(&["The Long Night", "INT. A - DAY"]);
        assert_eq!(script.title, None);
    }

    #[test]
    fn lines_before_first_heading_are_skipped() {
        let script = parse(&["ANNA", "Hello?", "INT. A - DAY", "Quiet room, nobody here."]);
        assert!(script.characters.is_empty());
        assert_eq!(script.total_scenes, 1);
        assert_eq!(script.scenes[0].line_count, 1);
    }

    #[test]
    fn dialogue_block_excludes_parentheticals() {
        let script = parse(&[
            "INT. KITCHEN - NIGHT",
            "ANNA",
            "(whispering)",
            "Is he asleep?",
            "I think so.",
            "BEN",
            "Finally.",
        ]);

        let anna = script.characters.get("ANNA").unwrap();
        assert_eq!(anna.total_lines, 2);
        assert_eq!(anna.dialogue_count, 1);
        let ben = script.characters.get("BEN").unwrap();
        assert_eq!(ben.total_lines, 1);
        assert_eq!(script.scenes[0].line_count, 3);
        assert_eq!(script.scenes[0].characters, vec!["ANNA", "BEN"]);
    }

    #[test]
    fn long_action_line_ends_block_and_counts_as_action() {
        let script = parse(&[
            "INT. KITCHEN - NIGHT",
            "ANNA",
            "Is he asleep?",
            "Anna tiptoes across the kitchen floor and peers through the doorway.",
            "Short mixed-case action.",
        ]);

        let anna = script.characters.get("ANNA").unwrap();
        assert_eq!(anna.total_lines, 1);
        // 1 dialogue line + 2 action lines.
        assert_eq!(script.scenes[0].line_count, 3);
    }

    #[test]
    fn heading_ends_block() {
        let script = parse(&[
            "INT. KITCHEN - NIGHT",
            "ANNA",
            "Goodnight.",
            "EXT. STREET - NIGHT",
            "Rain falls on the empty street.",
        ]);
        assert_eq!(script.total_scenes, 2);
        assert_eq!(script.scenes[0].line_count, 1);
        assert_eq!(script.scenes[1].line_count, 1);
        assert_eq!(script.characters.get("ANNA").unwrap().scenes, vec![1]);
    }

    #[test]
    fn cue_with_only_parentheticals_records_appearance() {
        let script = parse(&["INT. A - DAY", "ANNA", "(nods)", "BEN", "Good."]);
        let anna = script.characters.get("ANNA").unwrap();
        assert_eq!(anna.scenes, vec![1]);
        assert_eq!(anna.first_appearance, 1);
        assert_eq!(anna.total_lines, 0);
        assert_eq!(anna.dialogue_count, 0);
    }

    #[test]
    fn transitions_are_not_characters() {
        let script = parse(&[
            "INT. A - DAY",
            "CUT TO:",
            "FADE OUT.",
            "THE END",
            "Something happens here in the room.",
        ]);
        assert!(script.characters.is_empty());
        assert_eq!(script.scenes[0].line_count, 1);
    }

    #[test]
    fn empty_canonical_cue_is_skipped() {
        // With the ratio rule disabled a bare qualifier passes the line
        // rules but canonicalizes to nothing.
        let parser =
            HeuristicParser::new(HeuristicConfig::new().with_min_uppercase_ratio(0.0)).unwrap();
        assert!(parser.rules().is_character("(CONT'D)"));

        let script = parser.parse_lines(&["INT. A - DAY", "(CONT'D)"]);
        assert!(script.characters.is_empty());
        assert!(script.scenes[0].characters.is_empty());
    }

    #[test]
    fn shouted_short_lines_are_not_action() {
        let script = parse(&["INT. A - DAY", "Somebody screams from the hallway.", "BANG!!!"]);
        // Too few letters for a cue, too short and loud for action.
        assert_eq!(script.scenes[0].line_count, 1);
    }

    #[test]
    fn variants_merge() {
        let script = parse(&[
            "INT. A - DAY",
            "PAISLEY",
            "Hi.",
            "EXT. B - NIGHT",
            "PAISLEY (CONT'D)",
            "Still me.",
            "Still talking.",
        ]);
        assert_eq!(script.characters.len(), 1);
        let paisley = script.characters.get("PAISLEY").unwrap();
        assert_eq!(paisley.scenes, vec![1, 2]);
        assert_eq!(paisley.total_lines, 3);
        assert_eq!(paisley.dialogue_count, 2);
        assert!(script.validate().is_empty());
    }

    #[test]
    fn parse_pages_sets_page_count() {
        let parser = HeuristicParser::new(HeuristicConfig::default()).unwrap();
        let pages = ExtractedPages {
            lines: vec!["INT. A - DAY".into(), "Nothing moves.".into()],
            page_count: 3,
        };
        let script = parser.parse_pages(&pages);
        assert_eq!(script.total_pages, Some(3));
        assert_eq!(script.total_scenes, 1);
    }
}
