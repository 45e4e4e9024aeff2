//! Configuration management for splitroute.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cidr_set::CidrSet;
use crate::planner::{RouteConfig, DEFAULT_CUTOFF_PREFIX};
use crate::render::{OutputFormat, DEFAULT_IPSET_NAME};
use crate::validation::{
    validate_country_code, validate_cutoff, validate_ipset_name, validate_universe_entry,
};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/splitroute/config.yaml";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Country networks are coarsened to blocks no longer than this prefix
    pub cutoff_prefix: u8,

    /// Address space eligible for routing
    pub universe: Vec<String>,

    /// Country whose networks stay off the tunnel
    pub country_code: String,

    /// Country feed previously downloaded by an external fetcher
    pub feed_file: Option<PathBuf>,

    /// Networks that never go through the tunnel
    pub exclude_file: PathBuf,

    /// Networks that always go through the tunnel
    pub include_file: PathBuf,

    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cutoff_prefix: DEFAULT_CUTOFF_PREFIX,
            universe: vec!["0.0.0.0/0".to_string()],
            country_code: "RU".to_string(),
            feed_file: None,
            exclude_file: PathBuf::from("/etc/splitroute/exclude.txt"),
            include_file: PathBuf::from("/etc/splitroute/include.txt"),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Set name used by the `ipset` format
    pub ipset_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Plain,
            ipset_name: DEFAULT_IPSET_NAME.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            debug!("Config file {:?} not found, using defaults", path.as_ref());
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        validate_cutoff(self.cutoff_prefix)?;
        validate_country_code(&self.country_code)?;
        validate_ipset_name(&self.output.ipset_name)?;

        if self.universe.is_empty() {
            anyhow::bail!("universe must contain at least one CIDR block");
        }
        for entry in &self.universe {
            validate_universe_entry(entry)?;
        }

        Ok(())
    }

    /// Save configuration to YAML file atomically
    ///
    /// Uses tempfile + rename pattern to prevent corruption on crash.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let path = path.as_ref();
        let content = serde_yaml::to_string(self).with_context(|| "Failed to serialize config")?;

        let parent_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut temp_file = NamedTempFile::new_in(parent_dir)
            .context("Failed to create temporary file for config")?;

        temp_file.write_all(content.as_bytes())?;
        temp_file.as_file().sync_all()?;

        temp_file
            .persist(path)
            .with_context(|| format!("Failed to persist config file: {:?}", path))?;

        Ok(())
    }

    /// Canonical universe set
    pub fn universe_set(&self) -> Result<CidrSet> {
        self.universe
            .iter()
            .map(|entry| validate_universe_entry(entry))
            .collect()
    }

    /// Parameters for [`crate::planner::compute_plan`].
    pub fn route_config(&self) -> Result<RouteConfig> {
        let universe = self.universe_set()?;
        Ok(RouteConfig::new(self.cutoff_prefix, universe)?)
    }

    /// Generate default config with comments
    pub fn generate_default_yaml() -> String {
        include_str!("../templates/config.yaml").to_string()
    }
}
