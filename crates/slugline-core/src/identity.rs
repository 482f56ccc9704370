//! # Character Identity
//!
//! Cue names come in many spellings for the same person: `JOHN`,
//! `JOHN (V.O.)`, `JOHN (CONT'D)`, `JOHN #2`. [`NameNormalizer`] reduces a
//! cue to its canonical identity and [`merge_variants`] folds every raw
//! variant of one identity into a single [`Character`].
//!
//! A cue whose canonical form is empty (a transition such as `CUT TO:` that
//! slipped through as a cue) is a false positive and must never enter the
//! character set.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::types::{Character, CharacterMap, OrderedMap};

static DEFAULT: LazyLock<NameNormalizer> = LazyLock::new(|| NameNormalizer::new().unwrap());

/// Strips qualifiers from cue names.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    re_voice_over: Regex,
    re_off_screen: Regex,
    re_continued: Regex,
    re_number: Regex,
    re_production_marker: Regex,
}

impl NameNormalizer {
    /// Compiles the qualifier and denylist patterns.
    ///
    /// # Errors
    ///
    /// Returns `SluglineError::RegexError` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_voice_over: Regex::new(r"(?i)\s*\(V\.O\.\)")?,
            re_off_screen: Regex::new(r"(?i)\s*\(O\.S\.\)")?,
            // Any single character in the apostrophe slot: ' ’ ` etc.
            re_continued: Regex::new(r"(?i)\s*\(CONT.D\)")?,
            re_number: Regex::new(r"\s*#\d+")?,
            re_production_marker: Regex::new(
                r"(?i)^\s*(?:MATCH CUT|CUT TO|FADE(?:\s+(?:IN|OUT))?|DISSOLVE|SMASH|TITLES?|KNOCK\.?\s*KNOCK\.?)\s*[:.]?\s*$",
            )?,
        })
    }

    /// Returns the canonical identity of a cue name, or an empty string if
    /// the cue is a production marker rather than a speaker.
    ///
    /// Idempotent: canonicalizing a canonical name returns it unchanged.
    /// Stripping one qualifier can expose another (`JOHN (V.O#3.)`), so the
    /// strip pass repeats until the name stops changing.
    #[must_use]
    pub fn canonicalize(&self, name: &str) -> String {
        let mut name = self.strip_once(name);
        loop {
            let next = self.strip_once(&name);
            if next == name {
                return name;
            }
            name = next;
        }
    }

    // Every pass only removes text, so repeated passes reach a fixed point.
    fn strip_once(&self, name: &str) -> String {
        let name = self.re_voice_over.replace_all(name, "");
        let name = self.re_off_screen.replace_all(&name, "");
        let name = self.re_continued.replace_all(&name, "");
        let name = self.re_number.replace_all(&name, "");
        let name = self.re_production_marker.replace(&name, "");
        name.trim().to_string()
    }
}

/// Canonicalizes a cue name with the shared default normalizer.
///
/// ```
/// use slugline_core::identity::normalize;
///
/// assert_eq!(normalize("PAISLEY (CONT'D)"), "PAISLEY");
/// assert_eq!(normalize("JOHN #2"), "JOHN");
/// assert_eq!(normalize("CUT TO:"), "");
/// ```
#[must_use]
pub fn normalize(name: &str) -> String {
    DEFAULT.canonicalize(name)
}

/// Folds raw-keyed characters into canonical-keyed ones.
///
/// Entries are grouped by `name_canonical` in first-seen order. The first
/// entry of each group is the primary and absorbs the others; the output is
/// keyed by canonical name only.
#[must_use]
pub fn merge_variants(characters: CharacterMap) -> CharacterMap {
    let mut groups: OrderedMap<String, Vec<Character>> = OrderedMap::new();
    for (_, character) in characters {
        groups
            .entry(character.name_canonical.clone())
            .or_default()
            .push(character);
    }

    let mut merged = CharacterMap::new();
    for (canonical, variants) in groups {
        let mut variants = variants.into_iter();
        let Some(mut primary) = variants.next() else {
            continue;
        };
        for variant in variants {
            tracing::trace!(
                canonical = %canonical,
                variant = %variant.name_raw,
                "merging character variant"
            );
            primary.absorb(variant);
        }
        merged.insert(canonical, primary);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_qualifiers() {
        assert_eq!(normalize("PAISLEY (CONT'D)"), "PAISLEY");
        assert_eq!(normalize("PAISLEY (CONT’D)"), "PAISLEY");
        assert_eq!(normalize("paisley (cont'd)"), "paisley");
        assert_eq!(
            normalize("PRESIDENT JOHN F. KENNEDY (V.O.)"),
            "PRESIDENT JOHN F. KENNEDY"
        );
        assert_eq!(normalize("MOM (O.S.)"), "MOM");
        assert_eq!(normalize("JOHN #2"), "JOHN");
        assert_eq!(normalize("JOHN #2 (V.O.) (CONT'D)"), "JOHN");
    }

    #[test]
    fn keeps_other_parentheticals() {
        assert_eq!(normalize("ANNA (ON PHONE)"), "ANNA (ON PHONE)");
        assert_eq!(normalize("MR. SMITH"), "MR. SMITH");
    }

    #[test]
    fn production_markers_are_blanked() {
        for cue in [
            "CUT TO:",
            "MATCH CUT",
            "FADE",
            "FADE IN:",
            "FADE OUT.",
            "DISSOLVE:",
            "SMASH",
            "TITLE",
            "TITLES:",
            "KNOCK KNOCK",
            "KNOCK. KNOCK.",
        ] {
            assert_eq!(normalize(cue), "", "{cue} was not blanked");
        }
        // Markers only match as the whole name.
        assert_eq!(normalize("SMASH MOUTH"), "SMASH MOUTH");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        for name in [
            "PAISLEY (CONT'D)",
            "PRESIDENT JOHN F. KENNEDY (V.O.)",
            "JOHN #2",
            "CUT TO:",
            "  ANNA  ",
            "DR. NO (O.S.)",
        ] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once, "not idempotent for {name}");
        }
    }

    #[test]
    fn nested_qualifiers_strip_to_fixed_point() {
        // Removing one token exposes another qualifier or a marker.
        assert_eq!(normalize("JOHN (V.O#3.)"), "JOHN");
        assert_eq!(normalize("ANNA (V.(O.S.)O.)"), "ANNA");
        assert_eq!(normalize("BEN (CONT#12'D)"), "BEN");
        assert_eq!(normalize("CUT TO#2:"), "");
        for name in ["JOHN (V.O#3.)", "ANNA (V.(O.S.)O.)", "BEN (CONT#12'D)", "CUT TO#2:"] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once, "not idempotent for {name}");
        }
    }

    fn cued(raw: &str, scenes: &[u32], lines: usize, blocks: usize) -> Character {
        let mut c = Character::new(raw, normalize(raw));
        for &s in scenes {
            c.appear_in(s);
        }
        c.total_lines = lines;
        c.dialogue_count = blocks;
        c
    }

    #[test]
    fn merge_sums_and_unions() {
        let mut map = CharacterMap::new();
        map.insert("JOHN".into(), cued("JOHN", &[1, 4], 5, 2));
        map.insert("ANNA".into(), cued("ANNA", &[2], 1, 1));
        map.insert("JOHN (V.O.)".into(), cued("JOHN (V.O.)", &[3, 4], 2, 2));
        map.insert("JOHN #2".into(), cued("JOHN #2", &[6], 3, 1));

        let merged = merge_variants(map);
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["JOHN", "ANNA"]);

        let john = merged.get("JOHN").unwrap();
        assert_eq!(john.name_raw, "JOHN");
        assert_eq!(john.scenes, vec![1, 3, 4, 6]);
        assert_eq!(john.total_lines, 10);
        assert_eq!(john.dialogue_count, 5);
        assert_eq!(john.first_appearance, 1);
        assert_eq!(john.last_appearance, 6);
    }

    #[test]
    fn singleton_is_rekeyed_by_canonical_name() {
        let mut map = CharacterMap::new();
        map.insert("MOM (O.S.)".into(), cued("MOM (O.S.)", &[2], 1, 1));

        let merged = merge_variants(map);
        assert!(merged.get("MOM (O.S.)").is_none());
        let mom = merged.get("MOM").unwrap();
        assert_eq!(mom.name_raw, "MOM (O.S.)");
        assert_eq!(mom.scenes, vec![2]);
    }

    #[test]
    fn earlier_variant_wins_first_appearance() {
        let mut map = CharacterMap::new();
        map.insert("JOHN (V.O.)".into(), cued("JOHN (V.O.)", &[5], 1, 1));
        map.insert("JOHN".into(), cued("JOHN", &[2], 1, 1));

        let john = merge_variants(map).get("JOHN").cloned().unwrap();
        assert_eq!(john.name_raw, "JOHN (V.O.)");
        assert_eq!(john.first_appearance, 2);
        assert_eq!(john.last_appearance, 5);
    }
}
