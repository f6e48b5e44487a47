//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// MediVerse - multi-specialist medical report analysis
///
/// Sends a medical report to a cardiologist, a psychologist and a
/// pulmonologist agent in parallel, then has a multidisciplinary team
/// agent combine their findings into a final diagnosis.
///
/// Examples:
///   mediverse report.txt
///   mediverse report.txt --model medllama2:latest --format json
///   cat report.txt | mediverse - --stdout
///   mediverse --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Medical report to analyse (UTF-8 text file, or "-" for stdin)
    #[arg(value_name = "REPORT", required_unless_present = "init_config")]
    pub report: Option<String>,

    /// Ollama model to use for every agent
    ///
    /// Can also be set via MEDIVERSE_MODEL env var or .mediverse.toml config.
    #[arg(short, long, env = "MEDIVERSE_MODEL")]
    pub model: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the report to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .mediverse.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Limit on each agent call in seconds
    ///
    /// A specialist exceeding it fails the whole analysis.
    #[arg(long, value_name = "SECS")]
    pub task_timeout: Option<u64>,

    /// Maximum number of specialist calls in flight
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Leave the individual specialist reports out of the output
    #[arg(long)]
    pub no_specialist_reports: bool,

    /// Generate a default .mediverse.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Where the medical report is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    Stdin,
    File(PathBuf),
}

impl ReportSource {
    /// Human-readable label used in report metadata.
    pub fn label(&self) -> String {
        match self {
            ReportSource::Stdin => "<stdin>".to_string(),
            ReportSource::File(path) => path.display().to_string(),
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Where to read the report from.
    pub fn report_source(&self) -> ReportSource {
        match self.report.as_deref() {
            None | Some("-") => ReportSource::Stdin,
            Some(path) => ReportSource::File(PathBuf::from(path)),
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let ReportSource::File(ref path) = self.report_source() {
            if !path.exists() {
                return Err(format!("Report file does not exist: {}", path.display()));
            }
            if !path.is_file() {
                return Err(format!("Report path is not a file: {}", path.display()));
            }
        }

        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }
        if self.task_timeout == Some(0) {
            return Err("Task timeout must be at least 1 second".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
