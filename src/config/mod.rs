//! Configuration module
//!
//! Lookup order: explicit `--config` path, `.git-pw.toml` in the current
//! directory or any parent, then the platform config directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Name of the per-repository config file
pub const LOCAL_CONFIG_FILE: &str = ".git-pw.toml";

/// Pager used when neither `$PAGER` nor `output.pager` is set
const DEFAULT_PAGER: &str = "less -FRX";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub apply: ApplyConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Patchwork server connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// API root, e.g. "https://patchwork.example.com/api/1.1"
    #[serde(default)]
    pub url: Option<String>,

    /// Project linkname used to scope listings
    #[serde(default)]
    pub project: Option<String>,

    /// API token (preferred over username/password)
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// API version to use when the URL does not carry one
    #[serde(default)]
    pub api_version: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            project: None,
            token: None,
            username: None,
            password: None,
            api_version: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ApplyConfig {
    /// Pass `-s` to `git am`
    #[serde(default)]
    pub signoff: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Pager command; an empty string disables paging
    #[serde(default)]
    pub pager: Option<String>,
}

/// Server settings given on the command line or in the environment
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub url: Option<String>,
    pub project: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    /// Load config from an explicit path or the default locations
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        if let Some(local) = Self::find_local_config() {
            return Self::load_from(&local);
        }

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                return Self::load_from(&global);
            }
        }

        Ok(Self::default())
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Find `.git-pw.toml` walking up directories
    pub fn find_local_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(LOCAL_CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Get global config path (e.g. ~/.config/git-pw/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "git-pw").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line and environment settings on top of the file
    pub fn apply_overrides(&mut self, overrides: ServerOverrides) {
        let server = &mut self.server;
        if overrides.url.is_some() {
            server.url = overrides.url;
        }
        if overrides.project.is_some() {
            server.project = overrides.project;
        }
        if overrides.token.is_some() {
            server.token = overrides.token;
        }
        if overrides.username.is_some() {
            server.username = overrides.username;
        }
        if overrides.password.is_some() {
            server.password = overrides.password;
        }
    }

    /// Pager command with priority:
    /// 1. `$PAGER` (passed in by the caller)
    /// 2. `output.pager`
    /// 3. `less -FRX`
    ///
    /// An empty value at any level disables paging.
    pub fn pager(&self, env_pager: Option<String>) -> Option<String> {
        let pager = env_pager
            .or_else(|| self.output.pager.clone())
            .unwrap_or_else(|| DEFAULT_PAGER.to_string());

        if pager.trim().is_empty() {
            None
        } else {
            Some(pager)
        }
    }
}
