use serde::{Deserialize, Serialize};

use super::character::{Character, CharacterMap};
use super::ordered::{Histogram, OrderedMap};
use super::scene::Scene;
use crate::identity;

/// The structural model of one screenplay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub title: Option<String>,

    /// Scenes in document order, numbered `1..=total_scenes`.
    pub scenes: Vec<Scene>,

    /// Characters keyed by canonical name (after variant merging).
    pub characters: CharacterMap,

    pub total_scenes: usize,

    /// Page count reported by the text extractor; `None` for structured input.
    pub total_pages: Option<u32>,
}

/// A parsed script together with the name it was ingested under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub script: Script,
}

impl Document {
    #[must_use]
    pub fn new(name: impl Into<String>, script: Script) -> Self {
        Self {
            name: name.into(),
            script,
        }
    }
}

/// Per-character line of a [`ScriptSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub canonical_name: String,
    pub total_lines: usize,
    pub scenes: usize,
    pub first_appearance: i64,
    pub last_appearance: i64,
}

/// Single-document breakdowns: int/ext, time of day, location, characters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSummary {
    pub int_ext_breakdown: Histogram,
    pub time_of_day_breakdown: Histogram,
    pub location_breakdown: Histogram,
    pub character_summary: OrderedMap<String, CharacterSummary>,
}

impl Script {
    /// Builds the single-document breakdowns, keys in encounter order.
    #[must_use]
    pub fn summary(&self) -> ScriptSummary {
        let mut summary = ScriptSummary::default();
        for scene in &self.scenes {
            summary.int_ext_breakdown.bump(scene.int_ext.as_str());
            summary.time_of_day_breakdown.bump(scene.time_of_day.as_str());
            let location = scene.location_key();
            if !location.is_empty() {
                summary.location_breakdown.bump(location);
            }
        }
        for (name, character) in self.characters.iter() {
            summary.character_summary.insert(
                name.clone(),
                CharacterSummary {
                    canonical_name: character.name_canonical.clone(),
                    total_lines: character.total_lines,
                    scenes: character.scenes.len(),
                    first_appearance: character.first_appearance,
                    last_appearance: character.last_appearance,
                },
            );
        }
        summary
    }

    /// Total spoken lines across all characters.
    #[must_use]
    pub fn total_dialogue_lines(&self) -> usize {
        self.characters.values().map(|c| c.total_lines).sum()
    }

    /// Checks the structural invariants of the model and describes every
    /// violation found. An empty result means the script is consistent.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.total_scenes != self.scenes.len() {
            problems.push(format!(
                "total_scenes is {} but {} scenes are present",
                self.total_scenes,
                self.scenes.len()
            ));
        }

        for (pos, scene) in self.scenes.iter().enumerate() {
            let expected = pos as u32 + 1;
            if scene.scene_number != expected {
                problems.push(format!(
                    "scene at position {pos} is numbered {} (expected {expected})",
                    scene.scene_number
                ));
            }
        }

        for (name, character) in self.characters.iter() {
            let first = character.first_appearance;
            let last = character.last_appearance;
            if first != Character::NEVER && last != Character::NEVER {
                if first > last {
                    problems.push(format!(
                        "{name}: first appearance {first} is after last appearance {last}"
                    ));
                }
                for bound in [first, last] {
                    if !character.scenes.iter().any(|&s| i64::from(s) == bound) {
                        problems.push(format!(
                            "{name}: appearance {bound} is not in its scene list"
                        ));
                    }
                }
            }
        }

        for scene in &self.scenes {
            for raw in &scene.characters {
                let canonical = identity::normalize(raw);
                match self.characters.get(canonical.as_str()) {
                    Some(c) if c.scenes.contains(&scene.scene_number) => {}
                    Some(_) => problems.push(format!(
                        "{raw} is listed in scene {} but {canonical} does not record it",
                        scene.scene_number
                    )),
                    None => problems.push(format!(
                        "{raw} is listed in scene {} but has no character entry",
                        scene.scene_number
                    )),
                }
            }
        }

        problems
    }
}
