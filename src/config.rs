//! Configuration system
//!
//! Provides configuration management with:
//! - Config file loading (optional, `basic` feature)
//! - Environment variable overrides
//! - Runtime defaults
//! - Validation

use crate::aggregator::NoncachedPolicy;
use crate::pricing::PricingCatalog;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
    pub processing: ProcessingConfig,
    pub accounting: AccountingConfig,
    pub output: OutputConfig,
    pub pricing: PricingCatalog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub parallel_chunks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountingConfig {
    pub clamp_negative_noncached: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(anyhow::anyhow!("unknown output format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub json_pretty: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from("logs"),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { parallel_chunks: 1 }
    }
}

impl AccountingConfig {
    pub fn noncached_policy(&self) -> NoncachedPolicy {
        if self.clamp_negative_noncached {
            NoncachedPolicy::ClampToZero
        } else {
            NoncachedPolicy::Signed
        }
    }
}

const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];
const LOG_OUTPUTS: [&str; 3] = ["console", "file", "both"];

impl Config {
    /// Load configuration from defaults, the first config file found, and environment.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        for path in Self::candidate_paths() {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("realtime-cost.toml"),
            PathBuf::from(".realtime-cost.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("realtime-cost").join("config.toml"));
        }
        paths
    }

    /// Load configuration from TOML file
    #[cfg(feature = "basic")]
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    #[cfg(not(feature = "basic"))]
    pub fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(
            config_file = %path.display(),
            "Config file support not compiled in, using defaults"
        );
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        if let Ok(val) = env::var("REALTIME_COST_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        if let Ok(val) = env::var("REALTIME_COST_PARALLEL_CHUNKS") {
            self.processing.parallel_chunks = val
                .parse()
                .context("Invalid REALTIME_COST_PARALLEL_CHUNKS")?;
        }

        if let Ok(val) = env::var("REALTIME_COST_CLAMP_NEGATIVE") {
            self.accounting.clamp_negative_noncached = val
                .parse()
                .context("Invalid REALTIME_COST_CLAMP_NEGATIVE")?;
        }

        if let Ok(val) = env::var("REALTIME_COST_OUTPUT_FORMAT") {
            self.output.format = val
                .parse()
                .context("Invalid REALTIME_COST_OUTPUT_FORMAT")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Log format must be one of {:?}, got '{}'",
                LOG_FORMATS,
                self.logging.format
            ));
        }

        if !LOG_OUTPUTS.contains(&self.logging.output.as_str()) {
            return Err(anyhow::anyhow!(
                "Log output must be one of {:?}, got '{}'",
                LOG_OUTPUTS,
                self.logging.output
            ));
        }

        if self.processing.parallel_chunks == 0 {
            return Err(anyhow::anyhow!("Parallel chunks must be greater than 0"));
        }

        self.pricing.validate()?;

        // Only create the log directory when file logging will use it.
        if self.logging.output != "console" && !self.paths.log_directory.exists() {
            fs::create_dir_all(&self.paths.log_directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }

    /// Save current configuration to file
    #[cfg(feature = "basic")]
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}
