//! rulegrid - rule-line extraction, label anchoring and alignment checks
//!
//! ```text
//! rulegrid extract reference.pdf -o layout.json
//! rulegrid anchors --layout layout_with_texts.json -o anchors.json
//! rulegrid resolve --anchors anchors.json --layout layout.json -o resolved.json
//! rulegrid verify --layout resolved.json --rules rules.json --font font.ttf
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use layout::{
    analyze_pages, build_anchor_set, parse_anchor_set, parse_layout, parse_rules, LayoutDocument,
    Tolerances,
};
use pdf_core::{extract_layout_from_pdf, FontData, PdfDocument};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Extract canonical rule lines from a reference PDF, anchor labels to them
/// and verify label baselines.
#[derive(Parser, Debug)]
#[command(name = "rulegrid")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use debug logging level
    #[arg(short = 'v', long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,

    /// Extraction tolerances JSON (missing file = defaults)
    #[arg(long, global = true, default_value = "line_extraction_config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the canonical line layout of a two-page spread
    Extract {
        /// Reference PDF
        pdf: PathBuf,

        /// Page to read (1-indexed)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build nearest-line anchors for the absolute labels of a layout
    Anchors {
        /// Layout JSON carrying page1_texts / page2_texts
        #[arg(long)]
        layout: PathBuf,

        /// Cluster tolerance override in points
        #[arg(long)]
        tol: Option<f64>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve anchors against a (regenerated) layout
    Resolve {
        /// Anchor set JSON
        #[arg(long)]
        anchors: PathBuf,

        /// Layout JSON providing the current lines
        #[arg(long)]
        layout: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify label baselines against their bounding lines
    Verify {
        /// Layout JSON carrying absolute labels
        #[arg(long)]
        layout: PathBuf,

        /// Alignment rules JSON
        #[arg(long)]
        rules: PathBuf,

        /// TrueType font used for metrics
        #[arg(long)]
        font: PathBuf,

        /// Center alignment tolerance in points
        #[arg(long)]
        tolerance: Option<f64>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_layout(path: &Path) -> Result<LayoutDocument> {
    parse_layout(&read_to_string(path)?).with_context(|| format!("invalid layout {}", path.display()))
}

/// Write pretty JSON to a file, or stdout when no path is given
fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("saved {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let tolerances = Tolerances::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    match args.command {
        Command::Extract { pdf, page, output } => {
            let doc = PdfDocument::open(&pdf)?;
            let layout = extract_layout_from_pdf(&doc, page, &tolerances)?;
            log::info!(
                "extracted {} + {} lines from {}",
                layout.page1_lines.len(),
                layout.page2_lines.len(),
                pdf.display()
            );
            write_json(&layout, output.as_deref())
        }

        Command::Anchors {
            layout,
            tol,
            output,
        } => {
            let doc = load_layout(&layout)?;
            let tolerances = Tolerances {
                cluster_tolerance_pt: tol.unwrap_or(tolerances.cluster_tolerance_pt),
                ..tolerances
            };
            let set = build_anchor_set(&doc, &layout.display().to_string(), &tolerances)?;
            write_json(&set, output.as_deref())
        }

        Command::Resolve {
            anchors,
            layout,
            output,
        } => {
            let set = parse_anchor_set(&read_to_string(&anchors)?)
                .with_context(|| format!("invalid anchor set {}", anchors.display()))?;
            let mut doc = load_layout(&layout)?;
            let (page1, page2) = set.resolve(&doc, &tolerances)?;
            doc.page1_texts = page1;
            doc.page2_texts = page2;
            write_json(&doc, output.as_deref())
        }

        Command::Verify {
            layout,
            rules,
            font,
            tolerance,
            output,
        } => {
            let doc = load_layout(&layout)?;
            let mut rules_doc = parse_rules(&read_to_string(&rules)?)
                .with_context(|| format!("invalid rules {}", rules.display()))?;
            if tolerance.is_some() {
                rules_doc.tolerance_pt = tolerance;
            }
            let font = FontData::from_file(&font)
                .with_context(|| format!("failed to load font {}", font.display()))?;

            let report = analyze_pages(&doc, &rules_doc, &font, &tolerances);
            write_json(&report, output.as_deref())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    run(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let args = Args::try_parse_from(["rulegrid", "-v", "extract", "form.pdf", "-o", "out.json"])
            .unwrap();
        assert!(args.verbose);
        assert_eq!(args.config, PathBuf::from("line_extraction_config.json"));
        match args.command {
            Command::Extract { pdf, page, output } => {
                assert_eq!(pdf, PathBuf::from("form.pdf"));
                assert_eq!(page, 1);
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verify_requires_font() {
        let result =
            Args::try_parse_from(["rulegrid", "verify", "--layout", "l.json", "--rules", "r.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_write_json_to_file() {
        let dir = std::env::temp_dir().join(format!("rulegrid-cli-{}", std::process::id()));
        let path = dir.join("nested").join("tolerances.json");

        write_json(&Tolerances::default(), Some(path.as_path())).unwrap();
        let back = Tolerances::load(&path).unwrap();
        assert_eq!(back, Tolerances::default());

        fs::remove_dir_all(&dir).unwrap();
    }
}
