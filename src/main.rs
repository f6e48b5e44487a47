//! MediVerse - multi-specialist medical report analysis
//!
//! A CLI tool that sends a medical report to several specialist LLM agents
//! concurrently, then asks a multidisciplinary team agent to combine their
//! findings into a final diagnosis.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (configuration, input, or an agent call)

mod agent;
mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;

use agent::{OllamaConfig, OllamaGenerator};
use analysis::{Pipeline, PipelineSettings, PipelineState};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Diagnosis, DiagnosisMetadata};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("MediVerse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_analysis(args).await {
        error!("Analysis failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .mediverse.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the model, timeouts and concurrency.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete analysis workflow.
async fn run_analysis(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Read the medical report
    let source = args.report_source();
    let medical_report = report::read_medical_report(&source)?;
    info!("Loaded medical report from {}", source.label());

    // Step 2: Build the pipeline
    let settings = PipelineSettings::from(&config);
    let generator = OllamaGenerator::new(OllamaConfig::from(&config.model))
        .context("Failed to create model client")?;
    let pipeline = Pipeline::medical(Arc::new(generator), &settings);

    if !args.quiet {
        eprintln!("🤖 Consulting specialists...");
        eprintln!("   Model: {}", config.model.name);
        eprintln!("   Ollama: {}", config.model.ollama_url);
        eprintln!("   Specialists: {}", pipeline.specialist_names().join(", "));
        match settings.task_timeout {
            Some(limit) => eprintln!("   Task timeout: {}s", limit.as_secs()),
            None => eprintln!("   Task timeout: none"),
        }
    }

    // Step 3: Run specialists, then the team
    let outcome = run_with_spinner(&pipeline, &medical_report, args.quiet).await?;

    // Step 4: Build and render the diagnosis
    let specialist_reports: BTreeMap<String, String> =
        if config.pipeline.include_specialist_reports {
            outcome.results.into_iter().collect()
        } else {
            BTreeMap::new()
        };

    let diagnosis = Diagnosis {
        metadata: DiagnosisMetadata {
            source: source.label(),
            analysis_date: Utc::now(),
            model_used: config.model.name.clone(),
            specialists_consulted: pipeline.specialist_names().len(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        final_diagnosis: outcome.final_text,
        specialist_reports,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&diagnosis)?,
        OutputFormat::Markdown => report::generate_markdown_report(&diagnosis),
    };

    // Step 5: Deliver
    if args.stdout {
        println!("{}", output);
        return Ok(());
    }

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if !args.quiet {
        eprintln!(
            "\n✅ Analysis complete in {:.1}s! Report saved to: {}",
            diagnosis.metadata.duration_seconds,
            output_path.display()
        );
    }

    Ok(())
}

/// Run the pipeline while a spinner follows its state.
async fn run_with_spinner(
    pipeline: &Pipeline,
    medical_report: &str,
    quiet: bool,
) -> Result<analysis::PipelineOutcome> {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let (state_tx, mut state_rx) = watch::channel(PipelineState::Idle);
    let progress = spinner.clone();
    let watcher = tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = *state_rx.borrow_and_update();
            progress.set_message(state_message(state));
        }
    });

    let outcome = pipeline.run_observed(medical_report, &state_tx).await;

    drop(state_tx);
    if let Err(e) = watcher.await {
        warn!("Progress watcher stopped: {}", e);
    }

    match outcome {
        Ok(outcome) => {
            spinner.finish_with_message("Analysis complete");
            Ok(outcome)
        }
        Err(e) => {
            spinner.abandon_with_message("Analysis failed");
            if let Some(task) = e.failed_task() {
                eprintln!("   An error occurred with the {} agent.", task);
            }
            Err(e.into())
        }
    }
}

fn state_message(state: PipelineState) -> &'static str {
    match state {
        PipelineState::Idle => "Preparing analysis...",
        PipelineState::Dispatching => "Running diagnostics with AI specialists...",
        PipelineState::Aggregating => "Multidisciplinary team reviewing findings...",
        PipelineState::Done => "Analysis complete",
        PipelineState::Failed => "Analysis failed",
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
