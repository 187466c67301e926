//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.wealthtrack.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".wealthtrack.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Where records and the draft are kept.
    #[serde(default)]
    pub storage: StorageConfig,

    /// AI advice settings.
    #[serde(default)]
    pub advice: AdviceConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding every saved quarter.
    #[serde(default = "default_records_path")]
    pub records_path: PathBuf,

    /// JSON file holding the quarter being edited.
    #[serde(default = "default_draft_path")]
    pub draft_path: PathBuf,

    /// Start with a demo quarter when nothing has been saved yet.
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            records_path: default_records_path(),
            draft_path: default_draft_path(),
            seed_demo_data: true,
        }
    }
}

fn default_records_path() -> PathBuf {
    PathBuf::from(".wealthtrack/records.json")
}

fn default_draft_path() -> PathBuf {
    PathBuf::from(".wealthtrack/draft.json")
}

fn default_true() -> bool {
    true
}

/// Advice model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceConfig {
    /// Gemini model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Language the advice is written in.
    #[serde(default = "default_language")]
    pub language: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
            language: default_language(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

fn default_language() -> String {
    "Chinese".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> u64 {
    60
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

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when explicitly given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.storage.records_path = data.clone();
        }

        if let Some(ref model) = args.model {
            self.advice.model = model.clone();
        }

        if let Some(timeout) = args.timeout {
            self.advice.timeout_seconds = timeout;
        }

        if args.no_seed {
            self.storage.seed_demo_data = false;
        }

        if args.verbose {
            self.general.verbose = true;
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

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.advice.model, "gemini-3-flash-preview");
        assert_eq!(config.advice.api_key_env, "API_KEY");
        assert_eq!(config.advice.language, "Chinese");
        assert_eq!(
            config.storage.records_path,
            PathBuf::from(".wealthtrack/records.json")
        );
        assert!(config.storage.seed_demo_data);
        assert!(!config.general.verbose);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[storage]
records_path = "/tmp/wealth.json"
seed_demo_data = false

[advice]
model = "gemini-2.5-pro"
language = "English"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.storage.records_path, PathBuf::from("/tmp/wealth.json"));
        assert_eq!(
            config.storage.draft_path,
            PathBuf::from(".wealthtrack/draft.json")
        );
        assert!(!config.storage.seed_demo_data);
        assert_eq!(config.advice.model, "gemini-2.5-pro");
        assert_eq!(config.advice.language, "English");
        assert_eq!(config.advice.timeout_seconds, 60);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[storage\nrecords_path = 1").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_merge_with_args() {
        let args = crate::cli::Args::parse_from([
            "wealthtrack",
            "--data",
            "other.json",
            "--model",
            "gemini-test",
            "--no-seed",
            "trends",
        ]);
        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.storage.records_path, PathBuf::from("other.json"));
        assert_eq!(config.advice.model, "gemini-test");
        assert_eq!(config.advice.timeout_seconds, 60);
        assert!(!config.storage.seed_demo_data);
    }

    #[test]
    fn test_general_verbose_raises_log_level() {
        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = crate::cli::Args::parse_from(["wealthtrack", "trends"]);
        config.merge_with_args(&args);

        assert!(config.general.verbose);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);
        assert_eq!(
            args.log_level(Config::default().general.verbose),
            tracing::Level::INFO
        );

        let quiet = crate::cli::Args::parse_from(["wealthtrack", "trends", "--quiet"]);
        assert_eq!(quiet.log_level(config.general.verbose), tracing::Level::ERROR);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[advice]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.advice.model, "gemini-3-flash-preview");
    }
}
