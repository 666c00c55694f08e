//! pagesift CLI - layout block classification for extracted PDF pages

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagesift::{
    load_document, load_options, merge_field_rows, render, BlockKind, ClassifyOptions, FieldRow,
    JsonFormat, LayoutClassifier, TocStyle,
};

#[derive(Parser)]
#[command(name = "pagesift")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Classify extracted PDF page content into blocks and a table of contents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the blocks of every page
    Classify {
        /// Input document (JSON pages from the extractor)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page range (e.g., "3-10" or "4")
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Classification options file (JSON, partial allowed)
        #[arg(long, value_name = "FILE", env = "PAGESIFT_CONFIG")]
        config: Option<PathBuf>,

        /// Disable parallel page processing
        #[arg(long)]
        sequential: bool,

        /// Keep wrapped table cells as separate rows
        #[arg(long)]
        no_merge: bool,
    },

    /// Build the table of contents
    Toc {
        /// Input document (JSON pages from the extractor)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Minimum heading score
        #[arg(long)]
        min_score: Option<f32>,

        /// Also accept unnumbered headings with strong typography
        #[arg(long)]
        unnumbered: bool,

        /// Output JSON instead of a Markdown outline
        #[arg(long)]
        json: bool,

        /// Render entries as Markdown headings instead of a nested list
        #[arg(long)]
        headings: bool,

        /// Classification options file (JSON, partial allowed)
        #[arg(long, value_name = "FILE", env = "PAGESIFT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show block statistics for a document
    Stats {
        /// Input document (JSON pages from the extractor)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Classification options file (JSON, partial allowed)
        #[arg(long, value_name = "FILE", env = "PAGESIFT_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Merge wrapped field/value rows of a key-value table
    MergeCells {
        /// Input JSON array of {"campo", "valor"} rows
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Blocks per page as JSON
    Json,
    /// Markdown rendering of the blocks
    Markdown,
    /// Plain text rendering of the blocks
    Text,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Classify {
            input,
            output,
            pages,
            format,
            compact,
            config,
            sequential,
            no_merge,
        }) => build_options(config.as_deref()).and_then(|options| {
            let parallel = options.parallel && !sequential;
            let merge = options.merge_continuations && !no_merge;
            let options = options.with_parallel(parallel).with_merge_continuations(merge);
            cmd_classify(&input, output.as_deref(), pages.as_deref(), format, compact, options)
        }),
        Some(Commands::Toc {
            input,
            min_score,
            unnumbered,
            json,
            headings,
            config,
        }) => build_options(config.as_deref()).and_then(|options| {
            let style = if headings {
                TocStyle::Headings
            } else {
                TocStyle::Indented
            };
            cmd_toc(&input, min_score, unnumbered, json, style, options)
        }),
        Some(Commands::Stats { input, config }) => {
            build_options(config.as_deref()).and_then(|options| cmd_stats(&input, options))
        }
        Some(Commands::MergeCells { input, output }) => cmd_merge_cells(&input, output.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: pagesift <COMMAND> <FILE>".yellow());
            println!("       pagesift --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn build_options(config: Option<&Path>) -> CliResult<ClassifyOptions> {
    match config {
        Some(path) => {
            log::debug!("Loading options from {}", path.display());
            Ok(load_options(path)?)
        }
        None => Ok(ClassifyOptions::default()),
    }
}

/// Parse "A-B" or a single page "A" into an inclusive range.
fn parse_page_range(spec: &str) -> Result<RangeInclusive<u32>, String> {
    let spec = spec.trim();
    let parse = |s: &str| -> Result<u32, String> {
        s.trim()
            .parse::<u32>()
            .map_err(|_| format!("'{}' is not a page number", s.trim()))
    };

    let (start, end) = match spec.split_once('-') {
        Some((a, b)) => (parse(a)?, parse(b)?),
        None => {
            let page = parse(spec)?;
            (page, page)
        }
    };

    if start == 0 {
        return Err("pages are numbered from 1".to_string());
    }
    if start > end {
        return Err(format!("start {} is after end {}", start, end));
    }
    Ok(start..=end)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult<()> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_classify(
    input: &Path,
    output: Option<&Path>,
    pages: Option<&str>,
    format: OutputFormat,
    compact: bool,
    options: ClassifyOptions,
) -> CliResult<()> {
    let doc = load_document(input)?;
    let classifier = LayoutClassifier::with_options(doc, options);

    let range = match pages {
        Some(p) => parse_page_range(p).map_err(|e| format!("Invalid page range: {}", e))?,
        None => 1..=classifier.page_count().max(1),
    };

    let pb = output.map(|_| spinner("Classifying pages..."));
    let result = if classifier.page_count() == 0 {
        Default::default()
    } else {
        classifier.classify_document(*range.start(), *range.end())?
    };
    if let Some(pb) = pb {
        pb.finish_with_message(format!("{} blocks", result.block_count()));
    }

    let content = match format {
        OutputFormat::Json => {
            let json_format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            render::to_json(&result, json_format)?
        }
        OutputFormat::Markdown => render::to_markdown(&result),
        OutputFormat::Text => render::to_text(&result),
    };

    write_or_print(output, &content)
}

fn cmd_toc(
    input: &Path,
    min_score: Option<f32>,
    unnumbered: bool,
    json: bool,
    style: TocStyle,
    options: ClassifyOptions,
) -> CliResult<()> {
    let doc = load_document(input)?;
    let min_score = min_score.unwrap_or(options.headings.min_score);
    let detect_unnumbered = unnumbered || options.headings.detect_unnumbered;
    let classifier = LayoutClassifier::with_options(doc, options);

    let entries = classifier.build_table_of_contents(min_score, detect_unnumbered);

    if json {
        println!("{}", render::to_json(&entries, JsonFormat::Pretty)?);
    } else if entries.is_empty() {
        println!("{}", "No headings found".yellow());
    } else {
        print!("{}", render::toc_to_markdown(&entries, style));
    }

    Ok(())
}

fn cmd_stats(input: &Path, options: ClassifyOptions) -> CliResult<()> {
    let doc = load_document(input)?;
    let classifier = LayoutClassifier::with_options(doc, options);

    let pb = spinner("Classifying pages...");
    let result = classifier.classify_all()?;
    let headings = &classifier.options().headings;
    let toc = classifier.build_table_of_contents(headings.min_score, headings.detect_unnumbered);
    pb.finish_and_clear();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), classifier.page_count());
    println!("{}: {:.1}", "Body font size".bold(), classifier.baseline().body_size);

    println!();
    println!("{}", "Block Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for kind in BlockKind::ALL {
        println!("{}: {}", kind.as_str().bold(), result.count(kind));
    }
    println!("{}: {}", "total".bold(), result.block_count());

    let floor = classifier.options().confidence_floor;
    let low = format!("{} (below {:.2})", result.low_confidence, floor);
    if result.low_confidence > 0 {
        println!("{}: {}", "Low confidence".bold(), low.yellow());
    } else {
        println!("{}: {}", "Low confidence".bold(), low);
    }
    println!("{}: {}", "TOC entries".bold(), toc.len());

    Ok(())
}

fn cmd_merge_cells(input: &Path, output: Option<&Path>) -> CliResult<()> {
    let data = fs::read(input)?;
    let rows: Vec<FieldRow> = serde_json::from_slice(&data)?;
    let merged = merge_field_rows(&rows);
    log::info!("Merged {} rows into {}", rows.len(), merged.len());

    let json = render::to_json(&merged, JsonFormat::Pretty)?;
    write_or_print(output, &json)
}

fn cmd_version() {
    println!("{} {}", "pagesift".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Layout block classification for PDF pages");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pagesift".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_range() {
        assert_eq!(parse_page_range("3-10"), Ok(3..=10));
        assert_eq!(parse_page_range(" 4 "), Ok(4..=4));
        assert_eq!(parse_page_range("2 - 5"), Ok(2..=5));
    }

    #[test]
    fn test_parse_page_range_invalid() {
        assert!(parse_page_range("5-2").is_err());
        assert!(parse_page_range("0-3").is_err());
        assert!(parse_page_range("a-b").is_err());
        assert!(parse_page_range("").is_err());
    }

    #[test]
    fn test_merge_cells_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rows.json");
        let output = dir.path().join("merged.json");
        fs::write(
            &input,
            r#"[
                {"campo": "Nombre de la instalación", "valor": "Línea 2x500 kV"},
                {"campo": "/ LT002CI1", "valor": "y LT002CI2"},
                {"campo": "Tensión nominal", "valor": "500 kV"}
            ]"#,
        )
        .unwrap();

        cmd_merge_cells(&input, Some(&output)).unwrap();

        let merged: Vec<FieldRow> = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(merged.len(), 2);
        assert!(merged[0].value.contains("y LT002CI2"));
        assert_eq!(merged[1].field, "Tensión nominal");
    }

    #[test]
    fn test_build_options_default() {
        let options = build_options(None).unwrap();
        assert!(options.parallel);
    }
}
