use std::fmt;

use serde::{Deserialize, Serialize};

/// Interior/exterior designation parsed from a slug line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntExt {
    /// `INT.`
    Int,
    /// `EXT.`
    Ext,
    /// `INT./EXT.`, `EXT./INT.`, `INT/EXT`
    IntExt,
    /// No recognizable prefix.
    Unknown,
}

impl IntExt {
    /// Label used in reports and histograms.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Ext => "EXT",
            Self::IntExt => "INT_EXT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for IntExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-of-day token from a slug line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOfDay {
    Day,
    Night,
    Dawn,
    Dusk,
    Evening,
    Morning,
    Continuous,
    Later,
    Same,
    Unknown,
}

impl TimeOfDay {
    /// Parses a token case-insensitively. Anything unrecognized is `Unknown`.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "DAY" => Self::Day,
            "NIGHT" => Self::Night,
            "DAWN" => Self::Dawn,
            "DUSK" => Self::Dusk,
            "EVENING" => Self::Evening,
            "MORNING" => Self::Morning,
            "CONTINUOUS" => Self::Continuous,
            "LATER" => Self::Later,
            "SAME" => Self::Same,
            _ => Self::Unknown,
        }
    }

    /// Folds dawn/morning into day and dusk/evening into night.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Dawn | Self::Morning => Self::Day,
            Self::Dusk | Self::Evening => Self::Night,
            other => other,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Night => "NIGHT",
            Self::Dawn => "DAWN",
            Self::Dusk => "DUSK",
            Self::Evening => "EVENING",
            Self::Morning => "MORNING",
            Self::Continuous => "CONTINUOUS",
            Self::Later => "LATER",
            Self::Same => "SAME",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scene of a screenplay, opened by a slug line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// 1-based position in the document's scene sequence.
    pub scene_number: u32,

    /// The slug line as written (trimmed).
    pub slug_line: String,

    pub int_ext: IntExt,

    /// Location as written between the prefix and the time token.
    pub location: String,

    /// Uppercased location.
    pub location_normalized: String,

    /// Time-of-day token as written.
    pub time_of_day: TimeOfDay,

    /// Time of day after folding (see [`TimeOfDay::normalized`]).
    pub time_of_day_normalized: TimeOfDay,

    /// Raw character names that speak in this scene, in order of first cue.
    pub characters: Vec<String>,

    /// Dialogue and action lines counted in this scene.
    pub line_count: usize,
}

impl Scene {
    /// Records a raw speaker name; duplicates are ignored.
    pub fn add_character(&mut self, raw_name: &str) {
        if !self.characters.iter().any(|c| c == raw_name) {
            self.characters.push(raw_name.to_string());
        }
    }

    /// Location key used for breakdowns: normalized if available, raw otherwise.
    #[must_use]
    pub fn location_key(&self) -> &str {
        if self.location_normalized.is_empty() {
            &self.location
        } else {
            &self.location_normalized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_folding() {
        assert_eq!(TimeOfDay::Dawn.normalized(), TimeOfDay::Day);
        assert_eq!(TimeOfDay::Morning.normalized(), TimeOfDay::Day);
        assert_eq!(TimeOfDay::Dusk.normalized(), TimeOfDay::Night);
        assert_eq!(TimeOfDay::Evening.normalized(), TimeOfDay::Night);
        assert_eq!(TimeOfDay::Continuous.normalized(), TimeOfDay::Continuous);
        assert_eq!(TimeOfDay::Unknown.normalized(), TimeOfDay::Unknown);
    }

    #[test]
    fn time_of_day_tokens() {
        assert_eq!(TimeOfDay::from_token("night"), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_token("Later"), TimeOfDay::Later);
        assert_eq!(TimeOfDay::from_token("NOON"), TimeOfDay::Unknown);
    }

    #[test]
    fn labels_match_serialization() {
        for v in [IntExt::Int, IntExt::Ext, IntExt::IntExt, IntExt::Unknown] {
            let json = serde_json::to_string(&v).unwrap();
            assert_eq!(json, format!("\"{v}\""));
        }
        assert_eq!(
            serde_json::to_string(&TimeOfDay::Continuous).unwrap(),
            "\"CONTINUOUS\""
        );
    }

    #[test]
    fn add_character_dedups() {
        let mut scene = Scene {
            scene_number: 1,
            slug_line: "INT. KITCHEN - DAY".into(),
            int_ext: IntExt::Int,
            location: "Kitchen".into(),
            location_normalized: "KITCHEN".into(),
            time_of_day: TimeOfDay::Day,
            time_of_day_normalized: TimeOfDay::Day,
            characters: Vec::new(),
            line_count: 0,
        };
        scene.add_character("ANNA");
        scene.add_character("BEN");
        scene.add_character("ANNA");
        assert_eq!(scene.characters, vec!["ANNA", "BEN"]);
        assert_eq!(scene.location_key(), "KITCHEN");
    }
}
