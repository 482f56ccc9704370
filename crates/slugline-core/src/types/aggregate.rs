use serde::{Deserialize, Serialize};

use super::ordered::{Histogram, OrderedMap};
use super::scene::{IntExt, TimeOfDay};
use super::script::Document;

/// A `{document, scene}` position in the ingestion sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub document: String,
    pub scene: u32,
}

/// One scene filed under its location in the cross-document index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDetail {
    pub document: String,
    pub document_title: Option<String>,
    pub scene_number: u32,
    pub slug_line: String,
    pub int_ext: IntExt,
    pub time_of_day: TimeOfDay,
    pub characters: Vec<String>,
    pub line_count: usize,
}

/// A canonical character across every ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterIndexEntry {
    pub name_canonical: String,
    pub total_lines: usize,
    pub dialogue_count: usize,
    /// Composite `"<document>:<scene#>"` keys, sorted.
    pub scenes: Vec<String>,
    /// Document names, sorted.
    pub documents: Vec<String>,
    pub document_count: usize,
    pub scene_count: usize,
    pub first_appearance: Option<Appearance>,
    pub last_appearance: Option<Appearance>,
}

/// Scene count of one ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentScenes {
    pub document: String,
    pub title: Option<String>,
    pub scene_count: usize,
}

/// Cross-document index built from many scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Per-document results in ingestion order.
    pub documents: Vec<Document>,

    pub total_documents: usize,
    pub total_scenes: usize,

    /// Scenes per location, descending by count (ties in first-seen order).
    pub location_breakdown: Histogram,

    /// Scenes per int/ext label, in encounter order.
    pub int_ext_breakdown: Histogram,

    /// Scenes per time-of-day token, in encounter order.
    pub time_of_day_breakdown: Histogram,

    /// Characters keyed by canonical name, in first-seen order.
    pub characters: OrderedMap<String, CharacterIndexEntry>,

    /// Every scene filed under its location, locations in first-seen order.
    pub scenes_by_location: OrderedMap<String, Vec<LocationDetail>>,

    pub scenes_per_document: Vec<DocumentScenes>,
}
