//! Slugline CLI
//!
//! Parses Final Draft (`.fdx`) and PDF screenplays into scene and character
//! breakdowns, one script at a time or as a batch of episodes.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use slugline_core::{
    BatchOutcome, Format, PageSource, ParserConfig, PlainTextPages, Script, ScriptParser,
    SourceDocument, aggregate, parse_all,
};
use tracing::{info, warn};

#[cfg(feature = "pdf")]
mod pdf;
mod report;

/// CLI arguments
#[derive(Parser)]
#[command(name = "slugline")]
#[command(about = "Scene and character breakdowns for screenplays")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one script and write its reports
    Parse {
        /// Input script (.fdx or .pdf)
        file: PathBuf,

        /// Output directory
        #[arg(short, long, env = "SLUGLINE_OUTPUT_DIR", default_value = "reports")]
        output_dir: PathBuf,

        /// Reports to write
        #[arg(
            short,
            long,
            env = "SLUGLINE_FORMAT",
            value_enum,
            default_value_t = ReportFormat::All
        )]
        format: ReportFormat,

        /// Treat the input as already-extracted page text (form-feed separated)
        #[arg(long)]
        pages_text: bool,
    },
    /// Parse many episodes and write collated reports
    Batch {
        /// Input scripts, in episode order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, env = "SLUGLINE_OUTPUT_DIR", default_value = "reports")]
        output_dir: PathBuf,

        /// Reports to write
        #[arg(short, long, env = "SLUGLINE_FORMAT", value_enum, default_value_t = BatchFormat::All)]
        format: BatchFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Json,
    Csv,
    Text,
    All,
}

impl ReportFormat {
    fn includes(self, other: Self) -> bool {
        self == other || self == Self::All
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BatchFormat {
    Json,
    Csv,
    All,
}

impl BatchFormat {
    fn includes(self, other: Self) -> bool {
        self == other || self == Self::All
    }
}

#[cfg(feature = "pdf")]
fn pdf_source() -> Option<Arc<dyn PageSource>> {
    Some(Arc::new(pdf::PdfPages))
}

#[cfg(not(feature = "pdf"))]
fn pdf_source() -> Option<Arc<dyn PageSource>> {
    None
}

fn script_parser() -> Result<ScriptParser> {
    let parser = ScriptParser::new(ParserConfig::default())?;
    Ok(match pdf_source() {
        Some(source) => parser.with_page_source(source),
        None => parser,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn warn_inconsistencies(name: &str, script: &Script) {
    for problem in script.validate() {
        warn!(document = name, "{problem}");
    }
}

/// Creates `path`, runs `write` against it, and reports the file.
fn write_report(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).with_context(|| format!("Failed to write report: {}", path.display()))?;
    writer.flush()?;
    println!("Generated {}", path.display());
    Ok(())
}

fn run_parse(file: &Path, output_dir: &Path, format: ReportFormat, pages_text: bool) -> Result<()> {
    let name = display_name(file);
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let parser = script_parser()?;

    println!("Parsing {}...", file.display());
    let parsed = if pages_text {
        parser.parse_pages(&PlainTextPages, &bytes)
    } else {
        Format::from_filename(&name).and_then(|format| parser.parse(format, &bytes))
    };
    let script = parsed.with_context(|| format!("Failed to parse {}", file.display()))?;

    warn_inconsistencies(&name, &script);
    println!(
        "Parsed {} scenes, {} characters, {} dialogue lines",
        script.total_scenes,
        script.characters.len(),
        script.total_dialogue_lines()
    );

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let stem = file
        .file_stem()
        .map_or_else(|| "script".to_string(), |s| s.to_string_lossy().into_owned());

    if format.includes(ReportFormat::Json) {
        write_report(&output_dir.join(format!("{stem}_report.json")), |w| {
            report::write_script_json(w, &script)
        })?;
    }
    if format.includes(ReportFormat::Csv) {
        write_report(&output_dir.join(format!("{stem}_scenes.csv")), |w| {
            report::write_scenes_csv(w, &script)
        })?;
        write_report(&output_dir.join(format!("{stem}_characters.csv")), |w| {
            report::write_characters_csv(w, &script)
        })?;
    }
    if format.includes(ReportFormat::Text) {
        write_report(&output_dir.join(format!("{stem}_summary.txt")), |w| {
            report::write_summary_text(w, &script)
        })?;
    }
    Ok(())
}

fn run_batch(files: &[PathBuf], output_dir: &Path, format: BatchFormat) -> Result<()> {
    let mut sources = Vec::with_capacity(files.len());
    let mut unreadable = 0;
    for file in files {
        match fs::read(file) {
            Ok(bytes) => sources.push(SourceDocument::new(display_name(file), bytes)),
            Err(e) => {
                eprintln!("Failed to read {}: {e}", file.display());
                unreadable += 1;
            }
        }
    }

    let parser = script_parser()?;
    let (documents, failures) = BatchOutcome::partition(parse_all(&parser, &sources));
    for failure in &failures {
        eprintln!("Failed to parse {}: {}", failure.name, failure.error);
    }
    if documents.is_empty() {
        bail!("All {} documents failed", files.len());
    }
    info!(
        parsed = documents.len(),
        failed = failures.len() + unreadable,
        "batch parsed"
    );

    for document in &documents {
        warn_inconsistencies(&document.name, &document.script);
    }
    let aggregate = aggregate(&documents);
    println!(
        "Collated {} episodes, {} scenes, {} characters",
        aggregate.total_documents,
        aggregate.total_scenes,
        aggregate.characters.len()
    );

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    if format.includes(BatchFormat::Json) {
        write_report(&output_dir.join("batch_report.json"), |w| {
            report::write_batch_json(w, &aggregate)
        })?;
    }
    if format.includes(BatchFormat::Csv) {
        write_report(&output_dir.join("batch_locations.csv"), |w| {
            report::write_locations_csv(w, &aggregate)
        })?;
        write_report(&output_dir.join("batch_characters.csv"), |w| {
            report::write_batch_characters_csv(w, &aggregate)
        })?;
        write_report(&output_dir.join("batch_location_details.csv"), |w| {
            report::write_location_details_csv(w, &aggregate)
        })?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            file,
            output_dir,
            format,
            pages_text,
        } => run_parse(&file, &output_dir, format, pages_text),
        Commands::Batch {
            files,
            output_dir,
            format,
        } => run_batch(&files, &output_dir, format),
    }
}
