//! spanguard - PII span detection and evaluation CLI
//!
//! # Usage
//!
//! ```bash
//! # Resolve PII spans in a file (or stdin with `-`)
//! spanguard detect notes.txt
//! echo "Call 555-123-4567" | spanguard detect -
//!
//! # Score the resolver against a BIO-labeled JSONL corpus
//! spanguard eval train.jsonl --strategy overlap --threshold 0.5
//! spanguard eval train.jsonl --config eval.toml --approximate
//!
//! # Check a card number
//! spanguard luhn 4532015112830366
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG=debug` to see rejected candidates.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use spanguard::checksum::{luhn_check, strip_separators};
use spanguard::config::{EvalConfig, StrategyKind};
use spanguard::eval::{evaluate_corpus, AggregationMode, Corpus};
use spanguard::{Document, SpanResolver};

/// PII span detection, conflict resolution, and span-level evaluation
#[derive(Parser)]
#[command(name = "spanguard", author, version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve PII entities in a text file
    #[command(visible_alias = "d")]
    Detect(DetectArgs),

    /// Evaluate the resolver against a labeled corpus
    #[command(visible_alias = "e")]
    Eval(EvalArgs),

    /// Validate a number with the Luhn checksum
    Luhn {
        /// Digits, optionally separated by spaces or dashes
        number: String,
    },
}

#[derive(Parser, Debug)]
struct DetectArgs {
    /// Input file, or `-` for stdin
    #[arg(default_value = "-", value_name = "FILE")]
    input: String,

    /// Output format
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    /// Classify PERSON in headings as an explicit identifier
    #[arg(long)]
    elevate_headings: bool,
}

#[derive(Parser, Debug)]
struct EvalArgs {
    /// Corpus file (JSON Lines or a JSON array)
    #[arg(value_name = "CORPUS")]
    corpus: PathBuf,

    /// Matching strategy
    #[arg(short, long)]
    strategy: Option<StrategyArg>,

    /// Overlap threshold in (0, 1]
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Combine documents via back-derived counts instead of raw counts
    #[arg(long)]
    approximate: bool,

    /// Evaluate only the first N valid rows
    #[arg(short, long, value_name = "N")]
    limit: Option<usize>,

    /// TOML config; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the human-readable table instead of JSON
    #[arg(long)]
    table: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Identical span, text and label
    Exact,
    /// Label match plus symmetric containment
    Overlap,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Pretty JSON document
    #[default]
    Json,
    /// One line per entity
    Human,
}

fn read_input(input: &str) -> Result<String, String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        Ok(buf)
    } else {
        fs::read_to_string(input).map_err(|e| format!("failed to read {input}: {e}"))
    }
}

fn cmd_detect(args: DetectArgs) -> Result<(), String> {
    let text = read_input(&args.input)?;
    let id = if args.input == "-" { "stdin" } else { args.input.as_str() };

    let resolver = SpanResolver::default().with_elevate_headings(args.elevate_headings);
    let mut document = Document::from_text(id, &text);
    let start = Instant::now();
    let total = resolver.detect_document(&mut document).map_err(|e| e.to_string())?;
    log::info!("resolved {total} entities in {:.1?}", start.elapsed());

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&document).map_err(|e| e.to_string())?;
            println!("{json}");
        }
        OutputFormat::Human => {
            for element in &document.elements {
                for e in &element.entities {
                    println!(
                        "{}\t{}:{}-{}\t{}\t{:.2}\t{}",
                        e.label,
                        element.id,
                        e.start(),
                        e.end(),
                        e.sensitivity.as_str(),
                        e.base_risk_score,
                        e.text
                    );
                }
            }
        }
    }
    Ok(())
}

fn cmd_eval(args: EvalArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => EvalConfig::from_path(path).map_err(|e| e.to_string())?,
        None => EvalConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.strategy = match strategy {
            StrategyArg::Exact => StrategyKind::Exact,
            StrategyArg::Overlap => StrategyKind::Overlap,
        };
    }
    if let Some(threshold) = args.threshold {
        config.overlap_threshold = threshold;
    }
    if args.approximate {
        config.aggregation = AggregationMode::Approximate;
    }
    if args.limit.is_some() {
        config.limit = args.limit;
    }
    let options = config.to_options().map_err(|e| e.to_string())?;

    let corpus = Corpus::load(&args.corpus).map_err(|e| e.to_string())?;
    let resolver = SpanResolver::default().with_elevate_headings(config.elevate_headings);

    let start = Instant::now();
    let evaluation = evaluate_corpus(&resolver, &corpus, &options).map_err(|e| e.to_string())?;
    log::info!("evaluated in {:.1?}", start.elapsed());

    if args.table {
        print!("{}", evaluation.report.summary());
    } else {
        println!("{}", evaluation.report.to_json().map_err(|e| e.to_string())?);
    }
    eprintln!("{}", evaluation.diagnostics);
    Ok(())
}

fn cmd_luhn(number: &str) -> Result<(), String> {
    let valid = luhn_check(number).map_err(|e| e.to_string())?;
    let digits = strip_separators(number);
    if valid {
        println!("{digits}: valid");
        Ok(())
    } else {
        Err(format!("{digits}: fails Luhn check"))
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Detect(args) => cmd_detect(args),
        Commands::Eval(args) => cmd_eval(args),
        Commands::Luhn { number } => cmd_luhn(&number),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
