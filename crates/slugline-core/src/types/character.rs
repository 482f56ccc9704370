use serde::{Deserialize, Serialize};

use super::ordered::OrderedMap;

/// A speaking character within one script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Name as first cued (uppercased), e.g. `"JOHN (V.O.)"`.
    pub name_raw: String,

    /// Identity after qualifier stripping, e.g. `"JOHN"`.
    pub name_canonical: String,

    /// Ascending, duplicate-free scene numbers the character speaks in.
    pub scenes: Vec<u32>,

    /// Spoken lines across all dialogue blocks.
    pub total_lines: usize,

    /// Number of dialogue blocks.
    pub dialogue_count: usize,

    /// First scene number, or [`Character::NEVER`].
    pub first_appearance: i64,

    /// Last scene number, or [`Character::NEVER`].
    pub last_appearance: i64,
}

/// Characters keyed by name, in first-seen order.
pub type CharacterMap = OrderedMap<String, Character>;

impl Character {
    /// Sentinel for "never appeared".
    pub const NEVER: i64 = -1;

    #[must_use]
    pub fn new(name_raw: impl Into<String>, name_canonical: impl Into<String>) -> Self {
        Self {
            name_raw: name_raw.into(),
            name_canonical: name_canonical.into(),
            scenes: Vec::new(),
            total_lines: 0,
            dialogue_count: 0,
            first_appearance: Self::NEVER,
            last_appearance: Self::NEVER,
        }
    }

    /// Records a cue in `scene`.
    pub fn appear_in(&mut self, scene: u32) {
        if let Err(pos) = self.scenes.binary_search(&scene) {
            self.scenes.insert(pos, scene);
        }
        if self.first_appearance == Self::NEVER {
            self.first_appearance = i64::from(scene);
        }
        self.last_appearance = i64::from(scene);
    }

    /// Folds another variant of the same identity into this one.
    pub fn absorb(&mut self, other: Character) {
        self.scenes.extend(other.scenes);
        self.scenes.sort_unstable();
        self.scenes.dedup();

        self.total_lines += other.total_lines;
        self.dialogue_count += other.dialogue_count;

        if other.first_appearance != Self::NEVER
            && (self.first_appearance == Self::NEVER
                || other.first_appearance < self.first_appearance)
        {
            self.first_appearance = other.first_appearance;
        }
        if other.last_appearance > self.last_appearance {
            self.last_appearance = other.last_appearance;
        }
    }

    /// Returns `true` if the character was ever cued.
    #[must_use]
    pub fn has_appeared(&self) -> bool {
        self.first_appearance != Self::NEVER
    }
}
