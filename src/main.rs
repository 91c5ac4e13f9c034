// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Archivist: AI-assisted filing of scanned documents
//!
//! Command line front end. The review UI is served by `archivist serve`.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use archivist::classifier::OpenAiClassifier;
use archivist::config::{AppConfig, IntakeConfig};
use archivist::confirm::{ConfirmSubmission, ConfirmedFields, ConfirmationProcessor, EntryEdit};
use archivist::history::FilingLog;
use archivist::orchestrator::{list_documents, ClassificationOrchestrator};
use archivist::queue::ReviewBatch;
use archivist::vocabulary::VocabularyData;
use archivist::{ArchivistError, Result};

/// Archivist CLI - AI-assisted document filing
#[derive(Parser, Debug)]
#[command(name = "archivist")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Classify scanned documents and file them after review", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to application settings (JSON format)
    #[arg(short, long, default_value = "archivist.json", global = true)]
    config: PathBuf,

    /// Intake folder (overrides settings)
    #[arg(short, long, global = true)]
    intake: Option<PathBuf>,

    /// Output folder (overrides settings)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the review UI
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Classify the intake folder and print the results
    Classify,

    /// Classify and file every document without manual edits
    File {
        /// Actually copy and archive (otherwise only show destinations)
        #[arg(long)]
        yes: bool,

        /// Add each confirmed source to the learned vocabulary
        #[arg(long)]
        learn_sources: bool,

        /// Add each confirmed description to the learned vocabulary
        #[arg(long)]
        learn_descriptions: bool,
    },

    /// Show the learned vocabulary
    Vocab,

    /// List recently filed documents
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },

    /// Check the classification service
    Status,

    /// Create intake and output folders with template configuration
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(intake) = cli.intake {
        config.intake_dir = intake;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }

    match cli.command {
        Some(Commands::Serve { host, port }) => run_serve(config, host, port).await,
        Some(Commands::Classify) => run_classify(config, &cli.format).await,
        Some(Commands::File { yes, learn_sources, learn_descriptions }) => {
            run_file(config, yes, learn_sources, learn_descriptions, &cli.format).await
        }
        Some(Commands::Vocab) => run_vocab(config, &cli.format),
        Some(Commands::History { count }) => run_history(config, count, &cli.format),
        Some(Commands::Status) => run_status(config).await,
        Some(Commands::Init { dir, force }) => run_init(dir, force, &cli.config),
        None => run_serve(config, None, None).await,
    }
}

async fn run_serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.web.host = host;
    }
    if let Some(port) = port {
        config.web.port = port;
    }
    archivist::web::start_server(config).await
}

/// Classify the intake folder into a fresh batch
async fn classify_intake(config: &AppConfig) -> Result<ReviewBatch> {
    let orchestrator = ClassificationOrchestrator::new(config.workflow.failure_policy);
    let mut batch = ReviewBatch::new();
    let summary = orchestrator.run_batch(&config.intake_dir, &mut batch).await?;

    info!("Classified {} documents ({} failed)", summary.classified, summary.failed);
    for failure in &batch.failures {
        warn!("{}: {}", failure.filename, failure.error);
    }
    Ok(batch)
}

async fn run_classify(config: AppConfig, format: &str) -> Result<()> {
    let batch = classify_intake(&config).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    if batch.is_empty() {
        println!("No documents in {:?}", config.intake_dir);
    }
    for r in &batch.results {
        println!("{}", r.filename);
        println!("  date:           {}", r.date);
        println!("  source:         {}", r.source);
        println!("  destination:    {}", r.destination);
        println!("  description:    {}", r.description);
        println!("  classification: {}", r.classification);
    }

    Ok(())
}

async fn run_file(
    config: AppConfig,
    yes: bool,
    learn_sources: bool,
    learn_descriptions: bool,
    format: &str,
) -> Result<()> {
    let mut batch = classify_intake(&config).await?;

    if !yes {
        println!("DRY RUN: pass --yes to file these documents");
        for r in &batch.results {
            let fields = ConfirmedFields::resolve(r, None, config.workflow.edit_fallback);
            let target = config.output_dir.join(&fields.classification).join(fields.output_filename());
            println!("  {} -> {}", r.filename, target.display());
        }
        return Ok(());
    }

    let mut submission = ConfirmSubmission {
        batch_id: Some(batch.id),
        ..Default::default()
    };
    for r in &batch.results {
        submission.edits.insert(r.filename.clone(), EntryEdit {
            learn_source: learn_sources,
            learn_description: learn_descriptions,
            ..Default::default()
        });
    }

    let report = ConfirmationProcessor::new(config.workflow)
        .confirm(&config.intake_dir, &config.output_dir, &mut batch, &submission)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for filed in &report.filed {
        println!("{} -> {}", filed.filename, filed.output_path.display());
    }
    if let Some(dir) = &report.archive_dir {
        println!("\nOriginals archived in {}", dir.display());
    }
    println!("Filed {} documents", report.filed.len());

    Ok(())
}

fn run_vocab(config: AppConfig, format: &str) -> Result<()> {
    let data = VocabularyData::load(&config.intake_dir)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("Learned sources ({}):", data.additional_sources.len());
    for s in &data.additional_sources {
        println!("  {}", s);
    }
    println!("Description suggestions ({}):", data.description_suggestions.len());
    for d in &data.description_suggestions {
        println!("  {}", d);
    }

    Ok(())
}

fn run_history(config: AppConfig, count: usize, format: &str) -> Result<()> {
    let log = FilingLog::in_intake(&config.intake_dir);
    let entries = log.get_recent(count)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Recent filings ({} entries):", entries.len());
    for entry in entries {
        println!("  {} {} -> {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.original_path.display(),
            entry.output_path.display()
        );
    }

    Ok(())
}

async fn run_status(config: AppConfig) -> Result<()> {
    println!("Archivist v1.0.0 Status");
    println!("=======================");
    println!("Intake: {:?}", config.intake_dir);
    println!("Output: {:?}", config.output_dir);

    let intake_config = match IntakeConfig::load(&config.intake_dir) {
        Ok(c) => c,
        Err(e) => {
            println!("Intake config: Error - {}", e);
            return Ok(());
        }
    };

    println!("\nVocabulary:");
    println!("  Sources: {}", intake_config.sources.len());
    println!("  Destinations: {}", intake_config.destinations.len());
    println!("  Classifications: {}", intake_config.classifications.len());

    let pending = list_documents(&config.intake_dir)?.len();
    println!("  Documents waiting: {}", pending);

    let classifier = OpenAiClassifier::new(&intake_config)?;
    match classifier.health_check().await {
        Ok(()) => println!("\nClassification service: Reachable (model {})", classifier.model()),
        Err(e) => println!("\nClassification service: Error - {}", e),
    }

    Ok(())
}

/// Initialize intake and output folders
fn run_init(dir: Option<PathBuf>, force: bool, settings_name: &Path) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let intake = target.join("input");
    let output = target.join("output");
    let intake_config = IntakeConfig::path_in(&intake);

    if intake_config.exists() && !force {
        return Err(ArchivistError::Config(format!(
            "{:?} already exists. Use --force to overwrite",
            intake_config
        )));
    }

    std::fs::create_dir_all(&intake)?;
    std::fs::create_dir_all(&output)?;
    IntakeConfig::template().save(&intake)?;

    let settings = AppConfig {
        intake_dir: intake,
        output_dir: output,
        ..Default::default()
    };
    let settings_path = target.join(settings_name.file_name().unwrap_or(settings_name.as_os_str()));
    settings.save(&settings_path)?;

    println!("Archivist initialized in {:?}", target);
    println!("\nCreated:");
    println!("  - {}", settings_path.display());
    println!("  - input/config.json");
    println!("  - output/");
    println!("\nNext steps:");
    println!("  1. Put your API key and vocabulary in input/config.json");
    println!("  2. Drop scanned PDFs into input/");
    println!("  3. Start the review UI: archivist serve");

    Ok(())
}
