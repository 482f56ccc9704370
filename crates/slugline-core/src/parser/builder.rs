//! Scene and character bookkeeping shared by both parsers.

use tracing::{debug, warn};

use crate::identity::{NameNormalizer, merge_variants};
use crate::slug::SlugClassifier;
use crate::types::{Character, CharacterMap, Scene, Script};

/// Accumulates a [`Script`] from classified paragraphs.
///
/// Holds the `NoScene`/`InScene` state (`current_scene`), the speaker the
/// next dialogue block belongs to, and the running scene counter. The
/// character map is keyed by raw cue name until [`ScriptBuilder::finish`]
/// merges variants.
pub(crate) struct ScriptBuilder<'a> {
    classifier: &'a SlugClassifier,
    normalizer: &'a NameNormalizer,
    scenes: Vec<Scene>,
    characters: CharacterMap,
    current_scene: Option<Scene>,
    current_speaker: Option<String>,
    scene_counter: u32,
}

impl<'a> ScriptBuilder<'a> {
    pub(crate) fn new(classifier: &'a SlugClassifier, normalizer: &'a NameNormalizer) -> Self {
        Self {
            classifier,
            normalizer,
            scenes: Vec::new(),
            characters: CharacterMap::new(),
            current_scene: None,
            current_speaker: None,
            scene_counter: 0,
        }
    }

    pub(crate) fn has_scene(&self) -> bool {
        self.current_scene.is_some()
    }

    /// Seals the open scene and opens a new one from `slug`.
    pub(crate) fn open_scene(&mut self, slug: &str) {
        self.seal();
        self.scene_counter += 1;
        self.current_scene = Some(Scene::from_slug(self.scene_counter, slug, self.classifier));
        self.current_speaker = None;
    }

    /// Records a character cue in the open scene.
    ///
    /// Returns the raw (uppercased) name, or `None` if no scene is open or
    /// the cue canonicalizes to nothing. A rejected cue also clears the
    /// current speaker so following dialogue is not misattributed.
    pub(crate) fn cue(&mut self, text: &str) -> Option<String> {
        let scene = self.current_scene.as_mut()?;
        let raw = text.trim().to_uppercase();
        let canonical = self.normalizer.canonicalize(&raw);
        if canonical.is_empty() {
            warn!(cue = %raw, scene = self.scene_counter, "rejected cue with empty canonical name");
            self.current_speaker = None;
            return None;
        }

        scene.add_character(&raw);
        self.characters
            .entry(raw.clone())
            .or_insert_with(|| Character::new(raw.clone(), canonical))
            .appear_in(self.scene_counter);
        self.current_speaker = Some(raw.clone());
        Some(raw)
    }

    /// Credits a dialogue block of `lines` spoken lines to the current
    /// speaker. Ignored without an open scene and speaker.
    pub(crate) fn dialogue(&mut self, lines: usize) {
        let (Some(scene), Some(speaker)) = (self.current_scene.as_mut(), &self.current_speaker)
        else {
            return;
        };
        if let Some(character) = self.characters.get_mut(speaker.as_str()) {
            character.total_lines += lines;
            character.dialogue_count += 1;
            scene.line_count += lines;
        }
    }

    /// Adds action lines to the open scene.
    pub(crate) fn action(&mut self, lines: usize) {
        if let Some(scene) = self.current_scene.as_mut() {
            scene.line_count += lines;
        }
    }

    fn seal(&mut self) {
        if let Some(scene) = self.current_scene.take() {
            self.scenes.push(scene);
        }
    }

    /// Seals the last scene and merges character variants.
    pub(crate) fn finish(mut self, title: Option<String>, total_pages: Option<u32>) -> Script {
        self.seal();
        let raw_variants = self.characters.len();
        let characters = merge_variants(self.characters);

        debug!(
            scenes = self.scenes.len(),
            raw_variants,
            characters = characters.len(),
            "script assembled"
        );

        Script {
            title,
            total_scenes: self.scenes.len(),
            scenes: self.scenes,
            characters,
            total_pages,
        }
    }
}

/// Number of non-blank lines in a paragraph.
pub(crate) fn count_lines(text: &str) -> usize {
    text.lines().filter(|l| !l.trim().is_empty()).count()
}
