//! Command-line interface parsing for cheroterm
//!
//! Flags override values read from the configuration file. `--section` and
//! `--profile` add regions after the configured ones.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::config::{Config, ConfigError, RegionConfig};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// Section names become URL path segments
    #[error("Invalid section name: '{0}'. Use letters, digits, '-' or '_'")]
    InvalidSection(String),

    #[error("Invalid user id: '{0}'")]
    InvalidProfile(String),

    #[error("Invalid base URL: '{0}'. It must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("No configuration directory available; pass --config")]
    NoConfigDir,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// cheroterm - browse and post to a chero board from the terminal
#[derive(Parser, Debug)]
#[command(name = "cheroterm")]
#[command(about = "Terminal client for chero boards: browse sections, vote, save and post")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server to talk to, e.g. http://localhost:8080
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Add a region for a board section (repeatable)
    ///
    /// Examples:
    ///   cheroterm --section mylife
    ///   cheroterm --section mylife --section music
    #[arg(long = "section", value_name = "NAME")]
    pub sections: Vec<String>,

    /// Add a region listing one user's activity (repeatable)
    #[arg(long = "profile", value_name = "USERID")]
    pub profiles: Vec<String>,

    /// Log level filter when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

fn is_path_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Checks a `--section` argument
pub fn parse_section_arg(s: &str) -> Result<RegionConfig, CliError> {
    if is_path_segment(s) {
        Ok(RegionConfig::board_section(s))
    } else {
        Err(CliError::InvalidSection(s.to_string()))
    }
}

/// Checks a `--profile` argument
pub fn parse_profile_arg(s: &str) -> Result<RegionConfig, CliError> {
    if is_path_segment(s) {
        Ok(RegionConfig::profile(s))
    } else {
        Err(CliError::InvalidProfile(s.to_string()))
    }
}

fn check_base_url(url: &str) -> Result<(), CliError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(CliError::InvalidBaseUrl(url.to_string()))
    }
}

/// Configuration the app starts with: the file's values with flags applied
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub config: Config,
    /// Where the configuration came from
    pub config_path: PathBuf,
}

impl StartupConfig {
    /// Loads the configuration file and applies the parsed flags on top.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with the merged settings
    /// * `Err(CliError)` if the file is unreadable or a flag is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let config_path = match &cli.config {
            Some(path) => path.clone(),
            None => Config::default_path().ok_or(CliError::NoConfigDir)?,
        };
        let config = Config::load(&config_path)?;
        Ok(Self {
            config: Self::apply(cli, config)?,
            config_path,
        })
    }

    /// Applies flags to an already loaded configuration
    pub fn apply(cli: &Cli, mut config: Config) -> Result<Config, CliError> {
        if let Some(url) = &cli.base_url {
            config.base_url = url.clone();
        }
        check_base_url(&config.base_url)?;

        if let Some(level) = &cli.log_level {
            config.log_level = level.clone();
        }
        for section in &cli.sections {
            config.regions.push(parse_section_arg(section)?);
        }
        for user_id in &cli.profiles {
            config.regions.push(parse_profile_arg(user_id)?);
        }
        Ok(config)
    }
}
