//! Rune frame router configuration
//!
//! This crate provides centralized configuration for the frame router,
//! loading settings from `rune.toml` with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`RuneConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure for the frame router
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RuneConfig {
    /// Spatial routing settings
    pub routing: RoutingConfig,
    /// Frame registry settings
    pub registry: RegistryConfig,
    /// Follow-mode link aggregation settings
    pub links: LinkConfig,
    /// Diagnostic channel settings
    pub diagnostics: DiagnosticsConfig,
}

/// How the hit-tester chooses between several frames containing a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Smallest width wins; approximates the innermost frame.
    #[default]
    Narrowest,
    /// Most ancestors wins; narrower width breaks remaining ties.
    Deepest,
}

impl TieBreak {
    /// Parse a tie-break name as used in `rune.toml` and the environment.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "narrowest" => Some(Self::Narrowest),
            "deepest" => Some(Self::Deepest),
            _ => None,
        }
    }
}

/// Spatial routing configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Tie-break policy for nested frames containing the same point
    pub tie_break: TieBreak,
}

/// Frame registry configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Reject reports with negative or non-finite sizes
    pub strict_validation: bool,
    /// Upper bound on parent hops when walking a frame chain
    pub max_depth: usize,
    /// Drop records of frames the host no longer enumerates when follow mode starts
    pub prune_on_follow: bool,
}

/// Link aggregation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinkConfig {
    /// Drop links positioned outside their frame's usable rectangle
    pub clip_to_usable: bool,
}

/// Diagnostic channel configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Forward diagnostics to the host notification surface
    pub notify: bool,
    /// Verbose tracing categories (`frames`, or `all` for everything)
    pub categories: Vec<String>,
}

impl DiagnosticsConfig {
    /// Whether verbose tracing was requested for `category`.
    pub fn enabled(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c == "all" || c.eq_ignore_ascii_case(category))
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict_validation: false,
            max_depth: 64,
            prune_on_follow: true,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            clip_to_usable: true,
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            notify: true,
            categories: Vec::new(),
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl RuneConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from the default location (rune.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("RUNE_FRAMES_TIE_BREAK") {
            if let Some(tie_break) = TieBreak::parse(&val) {
                self.routing.tie_break = tie_break;
            }
        }

        if let Ok(val) = std::env::var("RUNE_FRAMES_STRICT") {
            self.registry.strict_validation = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("RUNE_FRAMES_MAX_DEPTH") {
            if let Ok(depth) = val.parse::<usize>() {
                self.registry.max_depth = depth;
            }
        }
        if let Ok(val) = std::env::var("RUNE_FRAMES_PRUNE") {
            self.registry.prune_on_follow = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("RUNE_FRAMES_CLIP_LINKS") {
            self.links.clip_to_usable = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("RUNE_FRAMES_NOTIFY") {
            self.diagnostics.notify = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("RUNE_DIAGNOSTICS") {
            self.diagnostics.categories = val
                .split(',')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }

    /// Same as [`RuneConfig::load`], but reading an explicit file.
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.merge_with_env();
        Ok(config)
    }
}
