//! Bootstrap configuration loading
//!
//! Configuration sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! Missing TOML files at the default location are not an error: the service
//! starts with compiled defaults and logs a warning.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const ENV_CONFIG: &str = "EXAM_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Cannot change while running; the service must restart to pick up edits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Folder holding the cohort source files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// HTTP listen address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret required for dataset updates (unset disables updates)
    #[serde(default)]
    pub update_secret: Option<String>,

    /// Matches delivered per name-search batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Scores at or above this value are marked as passing
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,

    /// Usage statistics file, relative to `data_dir` unless absolute
    #[serde(default = "default_stats_file")]
    pub stats_file: PathBuf,

    /// Cohort key -> source file name (relative to `data_dir`)
    #[serde(default = "default_cohorts")]
    pub cohorts: BTreeMap<String, PathBuf>,

    /// Leading identifier digit -> cohort key
    #[serde(default = "default_routing")]
    pub routing: BTreeMap<String, String>,

    /// Column alias priority lists
    #[serde(default)]
    pub columns: ColumnAliases,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Alias lists used to find the identifier and display-name columns
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnAliases {
    #[serde(default = "default_identifier_aliases")]
    pub identifier_aliases: Vec<String>,

    #[serde(default = "default_name_aliases")]
    pub name_aliases: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            identifier_aliases: default_identifier_aliases(),
            name_aliases: default_name_aliases(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5790
}

fn default_batch_size() -> usize {
    3
}

fn default_pass_threshold() -> f64 {
    50.0
}

fn default_stats_file() -> PathBuf {
    PathBuf::from("stats.json")
}

fn default_cohorts() -> BTreeMap<String, PathBuf> {
    (2021..=2025)
        .map(|year| {
            (
                year.to_string(),
                PathBuf::from(format!("results_{}.xlsx", year)),
            )
        })
        .collect()
}

fn default_routing() -> BTreeMap<String, String> {
    [("5", "2025"), ("8", "2024"), ("3", "2023"), ("2", "2022"), ("4", "2021")]
        .into_iter()
        .map(|(digit, cohort)| (digit.to_string(), cohort.to_string()))
        .collect()
}

fn default_identifier_aliases() -> Vec<String> {
    ["Number", "number", "رقم_الجلوس", "رقم", "roll", "seat", "id", "ID"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_name_aliases() -> Vec<String> {
    ["الاسم", "اسم", "name", "Name", "الطالب"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind_address: default_bind_address(),
            port: default_port(),
            update_secret: None,
            batch_size: default_batch_size(),
            pass_threshold: default_pass_threshold(),
            stats_file: default_stats_file(),
            cohorts: default_cohorts(),
            routing: default_routing(),
            columns: ColumnAliases::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a file
    ///
    /// With `explicit = true` (path came from the command line or environment)
    /// a missing file is an error; otherwise it falls back to defaults.
    pub fn load(path: Option<&Path>, explicit: bool) -> Result<Self> {
        let Some(path) = path else {
            warn!("No config file found, using compiled defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            if explicit {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<()> {
        if self.cohorts.is_empty() {
            return Err(Error::Config("No cohorts configured".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }

        for (digit, cohort) in &self.routing {
            let mut chars = digit.chars();
            let single_digit = matches!(
                (chars.next(), chars.next()),
                (Some(c), None) if c.is_ascii_digit()
            );
            if !single_digit {
                return Err(Error::Config(format!(
                    "Routing key '{}' must be a single ASCII digit",
                    digit
                )));
            }
            if !self.cohorts.contains_key(cohort) {
                return Err(Error::Config(format!(
                    "Routing entry '{}' points at unconfigured cohort '{}'",
                    digit, cohort
                )));
            }
        }

        Ok(())
    }

    /// Backing file for a configured cohort
    pub fn cohort_path(&self, cohort_key: &str) -> Option<PathBuf> {
        self.cohorts
            .get(cohort_key)
            .map(|file| self.data_dir.join(file))
    }

    /// Location of the usage statistics file
    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join(&self.stats_file)
    }
}

/// Resolve which config file to read
///
/// Priority: command-line argument, then environment variable, then the
/// per-user default location. Returns the path and whether it was given
/// explicitly.
pub fn resolve_config_file(cli_arg: Option<&Path>, env_var_name: &str) -> Option<(PathBuf, bool)> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some((path.to_path_buf(), true));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some((PathBuf::from(path), true));
        }
    }

    // Priority 3: Per-user config directory
    default_config_file().map(|path| (path, false))
}

/// Default per-user config file path for the platform
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("exam-results").join("config.toml"))
}
