//! # Cross-Document Aggregator
//!
//! Folds many parsed scripts into one [`Aggregate`] in a single streaming
//! pass. Documents must be pushed in ingestion order: the position of a
//! document in that sequence breaks ties for a character's first and last
//! appearance.

use std::collections::BTreeSet;

use tracing::debug;

use crate::identity::normalize;
use crate::types::{
    Aggregate, Appearance, CharacterIndexEntry, Document, DocumentScenes, Histogram,
    LocationDetail, OrderedMap,
};

/// A `(ingestion index, scene number)` position.
type Position = (usize, u32);

/// Running totals for one canonical character.
#[derive(Debug, Default)]
struct CharacterAccumulator {
    name_canonical: String,
    total_lines: usize,
    dialogue_count: usize,
    scenes: BTreeSet<String>,
    documents: BTreeSet<String>,
    /// Index of the last document whose totals were added.
    counted_in: Option<usize>,
    first: Option<Position>,
    last: Option<Position>,
}

impl CharacterAccumulator {
    fn new(name_canonical: &str) -> Self {
        Self {
            name_canonical: name_canonical.to_string(),
            ..Self::default()
        }
    }

    fn observe(&mut self, at: Position) {
        if self.first.is_none_or(|first| at < first) {
            self.first = Some(at);
        }
        if self.last.is_none_or(|last| at > last) {
            self.last = Some(at);
        }
    }
}

/// Streaming builder for an [`Aggregate`].
///
/// # Examples
///
/// ```
/// use slugline_core::{Aggregator, Document, ParserConfig, ScriptParser};
///
/// let parser = ScriptParser::new(ParserConfig::default()).unwrap();
/// let episodes = [
///     ("ep1", ["INT. BAR - NIGHT", "MOE", "Yeah?"]),
///     ("ep2", ["INT. BAR - DAY", "MOE", "Closed."]),
/// ];
///
/// let mut aggregator = Aggregator::new();
/// for (name, lines) in episodes {
///     aggregator.push(&Document::new(name, parser.parse_lines(&lines)));
/// }
/// let aggregate = aggregator.finish();
///
/// assert_eq!(aggregate.location_breakdown.get("BAR"), Some(&2));
/// assert_eq!(aggregate.characters.get("MOE").unwrap().document_count, 2);
/// ```
#[derive(Debug, Default)]
pub struct Aggregator {
    documents: Vec<Document>,
    total_scenes: usize,
    location_breakdown: Histogram,
    int_ext_breakdown: Histogram,
    time_of_day_breakdown: Histogram,
    characters: OrderedMap<String, CharacterAccumulator>,
    scenes_by_location: OrderedMap<String, Vec<LocationDetail>>,
    scenes_per_document: Vec<DocumentScenes>,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the next document (in ingestion order) into the index.
    pub fn push(&mut self, document: &Document) {
        let index = self.documents.len();
        let script = &document.script;

        self.total_scenes += script.scenes.len();
        self.scenes_per_document.push(DocumentScenes {
            document: document.name.clone(),
            title: script.title.clone(),
            scene_count: script.scenes.len(),
        });

        for scene in &script.scenes {
            let location = scene.location_key();
            if !location.is_empty() {
                self.location_breakdown.bump(location);
                self.scenes_by_location
                    .entry(location.to_string())
                    .or_default()
                    .push(LocationDetail {
                        document: document.name.clone(),
                        document_title: script.title.clone(),
                        scene_number: scene.scene_number,
                        slug_line: scene.slug_line.clone(),
                        int_ext: scene.int_ext,
                        time_of_day: scene.time_of_day,
                        characters: scene.characters.clone(),
                        line_count: scene.line_count,
                    });
            }

            self.int_ext_breakdown.bump(scene.int_ext.as_str());
            self.time_of_day_breakdown.bump(scene.time_of_day.as_str());

            for raw in &scene.characters {
                let canonical = normalize(raw);
                let Some(character) = script.characters.get(canonical.as_str()) else {
                    continue;
                };

                let bucket = self
                    .characters
                    .entry(canonical.clone())
                    .or_insert_with(|| CharacterAccumulator::new(&canonical));

                if bucket.counted_in != Some(index) {
                    bucket.counted_in = Some(index);
                    bucket.total_lines += character.total_lines;
                    bucket.dialogue_count += character.dialogue_count;
                    bucket.documents.insert(document.name.clone());
                }
                bucket
                    .scenes
                    .insert(format!("{}:{}", document.name, scene.scene_number));
                bucket.observe((index, scene.scene_number));
            }
        }

        debug!(
            document = %document.name,
            index,
            scenes = script.scenes.len(),
            characters = script.characters.len(),
            "aggregated document"
        );
        self.documents.push(document.clone());
    }

    /// Sorts the location histogram and emits the aggregate.
    #[must_use]
    pub fn finish(mut self) -> Aggregate {
        self.location_breakdown.sort_by_count_desc();

        let documents = &self.documents;
        let appearance = |pos: Option<Position>| {
            pos.map(|(index, scene)| Appearance {
                document: documents[index].name.clone(),
                scene,
            })
        };

        let characters = self
            .characters
            .into_iter()
            .map(|(key, acc)| {
                let entry = CharacterIndexEntry {
                    name_canonical: acc.name_canonical,
                    total_lines: acc.total_lines,
                    dialogue_count: acc.dialogue_count,
                    document_count: acc.documents.len(),
                    scene_count: acc.scenes.len(),
                    scenes: acc.scenes.into_iter().collect(),
                    documents: acc.documents.into_iter().collect(),
                    first_appearance: appearance(acc.first),
                    last_appearance: appearance(acc.last),
                };
                (key, entry)
            })
            .collect();

        Aggregate {
            total_documents: self.documents.len(),
            total_scenes: self.total_scenes,
            location_breakdown: self.location_breakdown,
            int_ext_breakdown: self.int_ext_breakdown,
            time_of_day_breakdown: self.time_of_day_breakdown,
            characters,
            scenes_by_location: self.scenes_by_location,
            scenes_per_document: self.scenes_per_document,
            documents: self.documents,
        }
    }
}

/// Aggregates documents in slice order.
#[must_use]
pub fn aggregate(documents: &[Document]) -> Aggregate {
    let mut aggregator = Aggregator::new();
    for document in documents {
        aggregator.push(document);
    }
    aggregator.finish()
}
