//! vocabscan command-line interface
//!
//! ```bash
//! vocabscan extract page.jpg --from EN --to KO
//! vocabscan extract page.jpg --config vocabscan.toml --format json
//! vocabscan replay page.tsv --to JA --verbose
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vocabscan::ocr::{TesseractCliEngine, parse_tsv};
use vocabscan::{Language, Pipeline, PipelineResult, Recognition, VocabConfig, extract_from_recognition};

#[derive(Parser)]
#[command(name = "vocabscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract bilingual vocabulary lists from photographed pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize an image with Tesseract and extract term/meaning pairs
    Extract {
        /// Image file (PNG or JPEG)
        image: PathBuf,

        /// Path to the tesseract executable
        #[arg(long, default_value = "tesseract", env = "VOCABSCAN_TESSERACT")]
        tesseract: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Extract from a saved Tesseract TSV (or recognition JSON) without running OCR
    Replay {
        /// `.tsv` from `tesseract ... tsv`, or a `.json` recognition
        input: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Term language (EN, ES, FR, DE, KO, JA)
    #[arg(long)]
    from: Option<Language>,

    /// Meaning language
    #[arg(long)]
    to: Option<Language>,

    /// Configuration file (.toml, .yaml, .json); defaults to a discovered vocabscan.toml
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log pipeline decisions to stderr
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One `term<TAB>meaning` line per item
    Text,
    /// Full result with diagnostics
    Json,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "vocabscan=debug" } else { "vocabscan=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `--config` file, else a discovered `vocabscan.toml`, else defaults; language flags win.
fn resolve_config(common: &CommonArgs) -> Result<VocabConfig> {
    let mut config = match &common.config {
        Some(path) => VocabConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => VocabConfig::discover()
            .context("Failed to load discovered configuration")?
            .unwrap_or_default(),
    };

    if let Some(from) = common.from {
        config.languages.from = from;
    }
    if let Some(to) = common.to {
        config.languages.to = to;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_recognition(path: &Path, min_confidence: f64) -> Result<Recognition> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).with_context(|| format!("Invalid recognition JSON in {}", path.display()))
    } else {
        Ok(parse_tsv(&content, min_confidence))
    }
}

fn print_result(result: &PipelineResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", result.to_json()?);
        }
        OutputFormat::Text => {
            for item in &result.items {
                println!("{}", item);
            }
            let d = &result.diagnostics;
            eprintln!(
                "{} items (extractor: {}, expected ~{}, passes: {})",
                d.item_count, d.extractor, d.expected_hint, d.recognition_passes
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            image,
            tesseract,
            common,
        } => {
            init_tracing(common.verbose);
            let config = resolve_config(&common)?;
            let bytes = std::fs::read(&image).with_context(|| format!("Failed to read {}", image.display()))?;

            let engine = Arc::new(TesseractCliEngine::with_binary(tesseract, &config.ocr));
            let pipeline = Pipeline::new(engine, config)
                .with_progress(|label, progress| eprint!("\r{:>3.0}% {:<32}", progress * 100.0, label));

            let result = pipeline
                .run(&bytes)
                .await
                .with_context(|| format!("Failed to process {}", image.display()))?;
            eprintln!();

            if result.diagnostics.ocr_failed {
                tracing::warn!(note = ?result.diagnostics.note, "Recognition failed; result is partial");
            }
            print_result(&result, common.format)?;
        }
        Commands::Replay { input, common } => {
            init_tracing(common.verbose);
            let config = resolve_config(&common)?;
            let recognition = load_recognition(&input, config.ocr.min_confidence)?;

            let (items, diagnostics) = extract_from_recognition(&recognition, &config)?;
            let result = PipelineResult {
                items,
                diagnostics,
                raw_text: recognition.text,
            };
            print_result(&result, common.format)?;
        }
    }

    Ok(())
}
