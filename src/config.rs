//! Configuration for the work client
//!
//! Command line arguments with environment variable overrides, validated
//! before the search starts.

use crate::{Difficulty, Error, Result, Root};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty thresholds selectable at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    /// Standard network publish threshold
    Full,
    /// Relaxed test-network publish threshold
    Test,
}

impl From<DifficultyLevel> for Difficulty {
    fn from(level: DifficultyLevel) -> Self {
        match level {
            DifficultyLevel::Full => Difficulty::FULL,
            DifficultyLevel::Test => Difficulty::TEST,
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyLevel::Full => write!(f, "full"),
            DifficultyLevel::Test => write!(f, "test"),
        }
    }
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Complete configuration for the work client
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(
    name = "nano-work-client",
    version = env!("CARGO_PKG_VERSION"),
    about = "Proof-of-work nonce generator for Nano-style block lattices",
    long_about = "Searches for a 64-bit nonce whose Blake2b digest over the \
                  given root meets the selected publish threshold, racing \
                  several CPU workers and printing the first valid work string"
)]
pub struct Config {
    /// Work root: previous block hash, or account public key for open
    /// blocks (64 hex characters)
    #[arg(value_name = "ROOT")]
    pub root: Option<String>,

    /// Verify an existing work string against the root instead of
    /// generating a new one
    #[arg(long, value_name = "WORK")]
    pub verify: Option<String>,

    /// Number of concurrent search workers (0 = all cores)
    #[arg(short = 'c', long, default_value = "4", env = "NANO_WORK_WORKERS")]
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Difficulty threshold to search against
    #[arg(short = 'd', long, default_value = "full", value_enum)]
    #[serde(default = "default_difficulty")]
    pub difficulty: DifficultyLevel,

    /// Log level (logs go to stderr; stdout carries only the work string)
    #[arg(short = 'l', long, default_value = "warn", value_enum)]
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Print the parsed configuration and exit
    #[arg(long)]
    #[serde(default)]
    pub print_config: bool,

    /// Print program info and exit
    #[arg(long)]
    #[serde(default)]
    pub info: bool,
}

fn default_worker_count() -> usize {
    4
}

fn default_difficulty() -> DifficultyLevel {
    DifficultyLevel::Full
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

impl Config {
    /// Get the selected difficulty threshold
    pub fn threshold(&self) -> Difficulty {
        self.difficulty.into()
    }

    /// Parse the root argument, failing fast on malformed input
    pub fn parsed_root(&self) -> Result<Root> {
        let root = self
            .root
            .as_deref()
            .ok_or_else(|| Error::config("a 64-character hex root is required"))?;
        root.parse()
    }

    /// Validate configuration values before the search starts
    pub fn validate(&self) -> Result<()> {
        // 0 is "all cores"; anything else must be a sane task count
        if self.worker_count > 1024 {
            return Err(Error::config(format!(
                "worker count {} is unreasonably large",
                self.worker_count
            )));
        }

        if self.root.is_none() && !self.print_config && !self.info {
            return Err(Error::config("a 64-character hex root is required"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const ROOT: &str = "e89208dd038fbb269987689621d52292ae9c35941a7484756ecced92a65093ba";

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["nano-work-client", ROOT]).unwrap();
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.difficulty, DifficultyLevel::Full);
        assert_eq!(config.threshold(), Difficulty::FULL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_difficulty_selection() {
        let config =
            Config::try_parse_from(["nano-work-client", "--difficulty", "test", ROOT]).unwrap();
        assert_eq!(config.threshold(), Difficulty::TEST);
    }

    #[test]
    fn test_missing_root_rejected() {
        let config = Config::try_parse_from(["nano-work-client"]).unwrap();
        assert_matches!(config.validate(), Err(Error::Config { .. }));
    }

    #[test]
    fn test_missing_root_allowed_for_info() {
        let config = Config::try_parse_from(["nano-work-client", "--info"]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parsed_root_surfaces_parse_error() {
        // One character short of a valid root
        let config = Config::try_parse_from(["nano-work-client", &ROOT[..63]]).unwrap();
        assert_matches!(config.parsed_root(), Err(Error::Parse { .. }));
    }

    #[test]
    fn test_excessive_worker_count_rejected() {
        let config =
            Config::try_parse_from(["nano-work-client", "-c", "4096", ROOT]).unwrap();
        assert_matches!(config.validate(), Err(Error::Config { .. }));
    }

    #[test]
    fn test_config_serializes_to_yaml() {
        let config = Config::try_parse_from(["nano-work-client", ROOT]).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("worker_count: 4"));
    }
}
