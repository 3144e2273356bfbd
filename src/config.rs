//! Configuration file handling
//!
//! Settings live in `config.toml` under the platform config directory
//! (`~/.config/cheroterm/` on Linux). A missing file yields the defaults; a
//! file that exists but cannot be read or parsed is an error so typos are not
//! silently ignored.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// One navigable content region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Tab label
    pub label: String,
    /// Endpoint that returns the next page of this region
    pub recycle_link: String,
    /// Endpoint that accepts new threads, if the region is a board section
    #[serde(default)]
    pub post_link: Option<String>,
    /// Message shown until the first page arrives
    #[serde(default = "default_empty_message")]
    pub empty_message: String,
}

impl RegionConfig {
    pub fn new(label: impl Into<String>, recycle_link: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            recycle_link: recycle_link.into(),
            post_link: None,
            empty_message: default_empty_message(),
        }
    }

    /// Region for a board section, which also accepts new threads
    pub fn board_section(name: &str) -> Self {
        Self {
            post_link: Some(format!("/{}/new", name)),
            ..Self::new(name, format!("/{}/recycle", name))
        }
    }

    /// Region listing the activity of one user
    pub fn profile(user_id: &str) -> Self {
        Self::new(
            format!("Profile {}", user_id),
            format!("/profile/recycle?userid={}", user_id),
        )
    }
}

/// Application configuration; deserializable from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Where log output goes; the terminal itself belongs to the UI
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Your user id on the board; marks posts you already upvoted or saved
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_regions")]
    pub regions: Vec<RegionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            log_level: default_log_level(),
            log_file: None,
            user_id: None,
            regions: default_regions(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_empty_message() -> String {
    "Nothing here yet. Press n to load content.".to_string()
}

fn default_regions() -> Vec<RegionConfig> {
    vec![
        RegionConfig::new("Explore", "/explore/recycle"),
        RegionConfig::new("Feed", "/recyclefeed"),
        RegionConfig::new("Activity", "/recycleactivity"),
        RegionConfig::new("Saved", "/recyclesaved"),
    ]
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "cheroterm")
}

impl Config {
    /// Default location of the config file, if a home directory exists
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads the config file at `path`, or the defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), regions = config.regions.len(), "loaded config");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Log file to write to: the configured one or `<data dir>/cheroterm.log`
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(|| {
            project_dirs().map(|dirs| dirs.data_local_dir().join("cheroterm.log"))
        })
    }
}
