//! Configuration file support for ferro-vep.
//!
//! # Example Configuration
//!
//! ```toml
//! [service]
//! base_url = "https://grch37.rest.ensembl.org/vep/homo_sapiens/region/"
//! timeout_seconds = 30
//!
//! [retry]
//! max_attempts = 10
//! multiplier_ms = 1000
//! exp_base = 2
//! max_delay_ms = 60000
//!
//! [output]
//! columns = ["chrom", "gene", "pos", "ref", "alt", "effect"]
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. The path given with `--config`
//! 2. `.ferro-vep.toml` in current directory
//! 3. `~/.config/ferro/vep.toml`
//!
//! CLI flags take precedence over config file settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::VepError;
use crate::pipeline::PipelineConfig;
use crate::variant::Column;
use crate::vep::{RetryPolicy, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Parsed configuration from a .ferro-vep.toml file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VepConfig {
    /// Annotation service settings.
    pub service: ServiceConfig,
    /// Retry settings.
    pub retry: RetryConfig,
    /// Report settings.
    pub output: OutputConfig,
}

/// `[service]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// `[retry]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub multiplier_ms: Option<u64>,
    pub exp_base: Option<u32>,
    pub max_delay_ms: Option<u64>,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub columns: Option<Vec<String>>,
}

impl VepConfig {
    /// Load configuration from the default locations.
    ///
    /// An explicit path must exist; the default locations are skipped when
    /// absent. Returns the built-in defaults when nothing is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self, VepError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(VepError::Config {
                    msg: format!("config file not found: {}", path.display()),
                });
            }
            return Self::load_from_path(path);
        }

        for path in Self::search_paths() {
            if path.is_file() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// Default locations, in search order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".ferro-vep.toml")];
        if let Some(home) = dirs_home() {
            paths.push(home.join(".config").join("ferro").join("vep.toml"));
        }
        paths
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, VepError> {
        let content = fs::read_to_string(path).map_err(|e| VepError::Config {
            msg: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self, VepError> {
        let config: VepConfig = toml::from_str(content)?;
        // Validate column names
        config.columns()?;
        Ok(config)
    }

    /// Service endpoint, falling back to the public Ensembl server.
    pub fn base_url(&self) -> &str {
        self.service.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Per-attempt request timeout.
    pub fn timeout(&self) -> Duration {
        self.service
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Retry policy with file settings layered over the defaults.
    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default();
        if let Some(n) = self.retry.max_attempts {
            policy.max_attempts = n;
        }
        if let Some(ms) = self.retry.multiplier_ms {
            policy.multiplier = Duration::from_millis(ms);
        }
        if let Some(base) = self.retry.exp_base {
            policy.exp_base = base;
        }
        if let Some(ms) = self.retry.max_delay_ms {
            policy.max_delay = Duration::from_millis(ms);
        }
        policy
    }

    /// Output columns.
    pub fn columns(&self) -> Result<Vec<Column>, VepError> {
        match &self.output.columns {
            None => Ok(PipelineConfig::default().columns),
            Some(names) if names.is_empty() => Err(VepError::Config {
                msg: "[output] columns must not be empty".to_string(),
            }),
            Some(names) => names.iter().map(|n| n.parse()).collect(),
        }
    }

    /// Pipeline settings derived from this config.
    pub fn pipeline_config(&self) -> Result<PipelineConfig, VepError> {
        Ok(PipelineConfig::with_columns(self.columns()?))
    }
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
