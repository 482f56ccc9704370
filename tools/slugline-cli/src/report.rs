//! Report writers for single scripts and batches.
//!
//! Every writer takes any `io::Write`, so the CLI points them at files and
//! tests point them at byte buffers.

use std::collections::BTreeSet;
use std::io::Write;

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use slugline_core::{
    Aggregate, Appearance, CharacterIndexEntry, CharacterMap, Histogram, LocationDetail,
    OrderedMap, Scene, Script, ScriptSummary,
};

/// Placeholder for a character that never appeared.
const NO_APPEARANCE: &str = "-";

#[derive(Serialize)]
struct ScriptReport<'a> {
    title: Option<&'a str>,
    total_scenes: usize,
    scenes: &'a [Scene],
    characters: &'a CharacterMap,
    summary: ScriptSummary,
}

/// Writes the single-document JSON report.
pub fn write_script_json<W: Write>(mut writer: W, script: &Script) -> Result<()> {
    let report = ScriptReport {
        title: script.title.as_deref(),
        total_scenes: script.total_scenes,
        scenes: &script.scenes,
        characters: &script.characters,
        summary: script.summary(),
    };
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

/// One row per scene.
pub fn write_scenes_csv<W: Write>(writer: W, script: &Script) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "Scene #",
        "Slug Line",
        "INT/EXT",
        "Location",
        "Time of Day",
        "Characters",
        "Line Count",
    ])?;
    for scene in &script.scenes {
        wtr.write_record([
            scene.scene_number.to_string(),
            scene.slug_line.clone(),
            scene.int_ext.to_string(),
            scene.location.clone(),
            scene.time_of_day.to_string(),
            scene.characters.join(", "),
            scene.line_count.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// One row per character, sorted by name.
pub fn write_characters_csv<W: Write>(writer: W, script: &Script) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "Character",
        "Canonical Name",
        "Total Lines",
        "Dialogue Count",
        "Scenes",
        "First Appearance",
        "Last Appearance",
    ])?;

    let mut characters: Vec<_> = script.characters.iter().collect();
    characters.sort_by(|a, b| a.0.cmp(b.0));

    for (_, character) in characters {
        wtr.write_record([
            character.name_raw.clone(),
            character.name_canonical.clone(),
            character.total_lines.to_string(),
            character.dialogue_count.to_string(),
            character.scenes.len().to_string(),
            character.first_appearance.to_string(),
            character.last_appearance.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Human-readable breakdown of one script.
pub fn write_summary_text<W: Write>(mut writer: W, script: &Script) -> Result<()> {
    let summary = script.summary();

    writeln!(writer, "SCRIPT BREAKDOWN REPORT")?;
    writeln!(writer, "{}", "=".repeat(50))?;
    writeln!(writer)?;
    writeln!(writer, "Title: {}", script.title.as_deref().unwrap_or("Untitled"))?;
    writeln!(writer, "Total Scenes: {}", script.total_scenes)?;
    writeln!(writer, "Total Dialogue Lines: {}", script.total_dialogue_lines())?;

    writeln!(writer)?;
    writeln!(writer, "INT/EXT Breakdown:")?;
    write_counts(&mut writer, sorted_by_key(&summary.int_ext_breakdown))?;

    writeln!(writer)?;
    writeln!(writer, "Time of Day Breakdown:")?;
    write_counts(&mut writer, sorted_by_key(&summary.time_of_day_breakdown))?;

    writeln!(writer)?;
    writeln!(writer, "Location Breakdown:")?;
    let mut locations = summary.location_breakdown;
    locations.sort_by_count_desc();
    write_counts(&mut writer, locations.iter().map(|(k, v)| (k.as_str(), *v)))?;

    writeln!(writer)?;
    writeln!(writer, "Character Summary:")?;
    let mut characters: Vec<_> = script.characters.values().collect();
    characters.sort_by(|a, b| b.total_lines.cmp(&a.total_lines));
    for character in characters {
        writeln!(
            writer,
            "  {}: {} lines, {} scenes",
            character.name_canonical,
            character.total_lines,
            character.scenes.len()
        )?;
    }
    Ok(())
}

fn sorted_by_key(histogram: &Histogram) -> Vec<(&str, usize)> {
    let mut counts: Vec<_> = histogram.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    counts.sort_by(|a, b| a.0.cmp(b.0));
    counts
}

fn write_counts<'a, W: Write>(
    writer: &mut W,
    counts: impl IntoIterator<Item = (&'a str, usize)>,
) -> Result<()> {
    for (label, count) in counts {
        writeln!(writer, "  {label}: {count}")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct EpisodeSummary<'a> {
    filename: &'a str,
    title: Option<&'a str>,
    scene_count: usize,
}

#[derive(Serialize)]
struct BatchSummary<'a> {
    total_episodes: usize,
    total_scenes: usize,
    episodes: Vec<EpisodeSummary<'a>>,
}

#[derive(Serialize)]
struct CollatedBreakdowns<'a> {
    location_breakdown: &'a Histogram,
    int_ext_breakdown: &'a Histogram,
    time_of_day_breakdown: &'a Histogram,
}

#[derive(Serialize)]
struct BatchReport<'a> {
    batch_summary: BatchSummary<'a>,
    collated_breakdowns: CollatedBreakdowns<'a>,
    characters: &'a OrderedMap<String, CharacterIndexEntry>,
    scenes_by_location: &'a OrderedMap<String, Vec<LocationDetail>>,
    scenes_per_episode: OrderedMap<&'a str, usize>,
}

/// Writes the batch JSON report.
pub fn write_batch_json<W: Write>(mut writer: W, aggregate: &Aggregate) -> Result<()> {
    let report = BatchReport {
        batch_summary: BatchSummary {
            total_episodes: aggregate.total_documents,
            total_scenes: aggregate.total_scenes,
            episodes: aggregate
                .scenes_per_document
                .iter()
                .map(|d| EpisodeSummary {
                    filename: &d.document,
                    title: d.title.as_deref(),
                    scene_count: d.scene_count,
                })
                .collect(),
        },
        collated_breakdowns: CollatedBreakdowns {
            location_breakdown: &aggregate.location_breakdown,
            int_ext_breakdown: &aggregate.int_ext_breakdown,
            time_of_day_breakdown: &aggregate.time_of_day_breakdown,
        },
        characters: &aggregate.characters,
        scenes_by_location: &aggregate.scenes_by_location,
        scenes_per_episode: aggregate
            .scenes_per_document
            .iter()
            .map(|d| (d.document.as_str(), d.scene_count))
            .collect(),
    };
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

/// One row per location, busiest first.
pub fn write_locations_csv<W: Write>(writer: W, aggregate: &Aggregate) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["Location", "Scene Count", "Episodes", "Episode List"])?;

    for (location, count) in aggregate.location_breakdown.iter() {
        let documents: BTreeSet<&str> = aggregate
            .scenes_by_location
            .get(location.as_str())
            .into_iter()
            .flatten()
            .map(|detail| detail.document.as_str())
            .collect();
        wtr.write_record([
            location.clone(),
            count.to_string(),
            documents.len().to_string(),
            documents.into_iter().collect::<Vec<_>>().join(", "),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// One row per character, most lines first.
pub fn write_batch_characters_csv<W: Write>(writer: W, aggregate: &Aggregate) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "Character",
        "Total Lines",
        "Dialogue Count",
        "Scene Count",
        "Episode Count",
        "Episodes",
        "First Appearance",
        "Last Appearance",
    ])?;

    let mut characters: Vec<_> = aggregate.characters.iter().collect();
    characters.sort_by(|a, b| b.1.total_lines.cmp(&a.1.total_lines));

    for (name, entry) in characters {
        wtr.write_record([
            name.clone(),
            entry.total_lines.to_string(),
            entry.dialogue_count.to_string(),
            entry.scene_count.to_string(),
            entry.document_count.to_string(),
            entry.documents.join(", "),
            appearance(entry.first_appearance.as_ref()),
            appearance(entry.last_appearance.as_ref()),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn appearance(at: Option<&Appearance>) -> String {
    at.map_or_else(
        || NO_APPEARANCE.to_string(),
        |at| format!("{}:{}", at.document, at.scene),
    )
}

/// Every scene under its location, locations busiest first.
pub fn write_location_details_csv<W: Write>(writer: W, aggregate: &Aggregate) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "Location",
        "Episode",
        "Scene #",
        "Slug Line",
        "INT/EXT",
        "Time of Day",
        "Characters",
        "Line Count",
    ])?;

    for location in aggregate.location_breakdown.keys() {
        let Some(details) = aggregate.scenes_by_location.get(location.as_str()) else {
            continue;
        };
        for detail in details {
            wtr.write_record([
                location.clone(),
                detail.document.clone(),
                detail.scene_number.to_string(),
                detail.slug_line.clone(),
                detail.int_ext.to_string(),
                detail.time_of_day.to_string(),
                detail.characters.join(", "),
                detail.line_count.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
