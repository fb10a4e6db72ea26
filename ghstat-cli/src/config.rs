//! CLI configuration
//!
//! Loads the TOML file describing the Greenhouse instance and the leads whose
//! requisitions are gathered:
//!
//! ```toml
//! [greenhouse]
//! base_url = "https://canonical.greenhouse.io"
//! timeout_secs = 30
//! concurrency = 5
//!
//! [[leads]]
//! name = "Joe Bloggs"
//! roles = [1234567, 7654321]
//! ```

use anyhow::{Context, Result, bail};
use ghstat_client::{ClientConfig, DEFAULT_BASE_URL};
use ghstat_core::domain::lead::Lead;
use ghstat_engine::{DEFAULT_MAX_CONCURRENCY, ManagerConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up in the working and configuration directories
pub const CONFIG_FILE: &str = "ghstat.toml";

/// Connection settings for the Greenhouse instance
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GreenhouseSettings {
    /// Base URL of the Greenhouse instance
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of roles gathered at once
    pub concurrency: usize,
}

impl Default for GreenhouseSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Contents of `ghstat.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub greenhouse: GreenhouseSettings,

    #[serde(default)]
    pub leads: Vec<Lead>,
}

impl Config {
    /// Parses and validates a configuration document
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw).context("failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Finds the configuration file to use
    ///
    /// An explicit path always wins, even if it does not exist. Otherwise the
    /// first existing file among [`Config::search_paths`] is used.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let cwd = std::env::current_dir().context("failed to read working directory")?;
        let candidates = Self::search_paths(&cwd, dirs::config_dir());
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Ok(path.clone()),
            None => {
                let looked: Vec<String> =
                    candidates.iter().map(|p| p.display().to_string()).collect();
                bail!(
                    "no configuration file found, looked in: {}",
                    looked.join(", ")
                )
            }
        }
    }

    /// Candidate configuration files, in lookup order
    pub fn search_paths(cwd: &Path, config_dir: Option<PathBuf>) -> Vec<PathBuf> {
        let mut paths = vec![cwd.join(CONFIG_FILE)];
        if let Some(dir) = config_dir {
            paths.push(dir.join("ghstat").join(CONFIG_FILE));
        }
        paths
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.greenhouse.base_url.is_empty() {
            bail!("greenhouse.base_url cannot be empty");
        }

        if !self.greenhouse.base_url.starts_with("http://")
            && !self.greenhouse.base_url.starts_with("https://")
        {
            bail!("greenhouse.base_url must start with http:// or https://");
        }

        if self.greenhouse.timeout_secs == 0 {
            bail!("greenhouse.timeout_secs must be greater than 0");
        }

        if self.greenhouse.concurrency == 0 {
            bail!("greenhouse.concurrency must be greater than 0");
        }

        for lead in &self.leads {
            if lead.name.trim().is_empty() {
                bail!("lead names cannot be empty");
            }
            if lead.roles.contains(&0) {
                bail!("lead '{}' lists an invalid role id 0", lead.name);
            }
        }

        Ok(())
    }

    /// Settings for the Greenhouse client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.greenhouse.base_url.clone(),
            timeout: Duration::from_secs(self.greenhouse.timeout_secs),
        }
    }

    /// Settings for a gathering run
    pub fn manager_config(&self, filter: Vec<String>, format: String) -> ManagerConfig {
        ManagerConfig {
            leads: self.leads.clone(),
            filter,
            format,
            max_concurrency: self.greenhouse.concurrency,
            today: None,
        }
    }
}
