//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.mediverse.toml` files.

use crate::agent::OllamaConfig;
use crate::analysis::PipelineSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".mediverse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Maximum number of specialist calls in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_output() -> String {
    "mediverse_report.md".to_string()
}

fn default_concurrency() -> usize {
    4
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout() -> u64 {
    600
}

/// Pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Limit on each specialist and team call, in seconds. Unset means no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_timeout_seconds: Option<u64>,

    /// Append each specialist's report to the final output.
    #[serde(default = "default_true")]
    pub include_specialist_reports: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            task_timeout_seconds: None,
            include_specialist_reports: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            concurrency: config.general.concurrency,
            task_timeout: config.pipeline.task_timeout_seconds.map(Duration::from_secs),
        }
    }
}

impl From<&ModelConfig> for OllamaConfig {
    fn from(model: &ModelConfig) -> Self {
        Self {
            ollama_url: model.ollama_url.clone(),
            model_name: model.name.clone(),
            temperature: model.temperature,
            timeout_seconds: model.timeout_seconds,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from `dir`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Try to load configuration from the working directory.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.model.ollama_url = url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        if let Some(task_timeout) = args.task_timeout {
            self.pipeline.task_timeout_seconds = Some(task_timeout);
        }
        if args.no_specialist_reports {
            self.pipeline.include_specialist_reports = false;
        }

        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "llama3.2:latest");
        assert_eq!(config.general.concurrency, 4);
        assert_eq!(config.pipeline.task_timeout_seconds, None);
        assert!(config.pipeline.include_specialist_reports);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "diagnosis.md"
concurrency = 8

[model]
name = "medllama2:latest"
temperature = 0.2

[pipeline]
task_timeout_seconds = 120
include_specialist_reports = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "diagnosis.md");
        assert_eq!(config.model.name, "medllama2:latest");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.model.ollama_url, "http://localhost:11434");
        assert_eq!(config.pipeline.task_timeout_seconds, Some(120));
        assert!(!config.pipeline.include_specialist_reports);

        let settings = PipelineSettings::from(&config);
        assert_eq!(settings.concurrency, 8);
        assert_eq!(settings.task_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[pipeline]"));
        assert!(!toml_str.contains("verbose"));

        let round: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(round.general.concurrency, 4);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "[model]\nname = \"phi3\"").unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.model.name, "phi3");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[model\nname = ").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let args = crate::cli::Args::try_parse_from([
            "mediverse",
            "report.txt",
            "--model",
            "phi3",
            "--concurrency",
            "2",
            "--task-timeout",
            "45",
            "--no-specialist-reports",
        ])
        .unwrap();

        let mut config = Config::default();
        config.model.temperature = 0.4;
        config.merge_with_args(&args);

        assert_eq!(config.model.name, "phi3");
        assert_eq!(config.model.temperature, 0.4);
        assert_eq!(config.general.concurrency, 2);
        assert_eq!(config.pipeline.task_timeout_seconds, Some(45));
        assert!(!config.pipeline.include_specialist_reports);
    }

    #[test]
    fn test_ollama_config_from_model() {
        let model = ModelConfig {
            name: "phi3".to_string(),
            ..ModelConfig::default()
        };
        let ollama = OllamaConfig::from(&model);
        assert_eq!(ollama.model_name, "phi3");
        assert_eq!(ollama.timeout_seconds, 600);
    }
}
