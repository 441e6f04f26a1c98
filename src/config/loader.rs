//! Configuration file loading with precedence handling.

use crate::paging::{Axis, LayoutParams, Size, DEFAULT_GAP_BETWEEN_PAGES};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "PAGESCROLL_CONFIG";
/// Environment variable overriding the scroll axis.
pub const ENV_AXIS: &str = "PAGESCROLL_AXIS";
/// Environment variable overriding the inter-page gap.
pub const ENV_GAP: &str = "PAGESCROLL_GAP";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown fields.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/pagescroll/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Scroll axis ("horizontal" or "vertical").
    #[serde(default)]
    pub axis: Option<Axis>,

    /// Distance between pages. Rounded to even, clamped non-negative.
    #[serde(default)]
    pub gap: Option<f64>,

    /// Extra pages kept live on each side of the visible range.
    #[serde(default)]
    pub preload_margin: Option<usize>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Scroll axis.
    pub axis: Axis,
    /// Inter-page gap as configured (normalized when building layout params).
    pub gap: f64,
    /// Preload margin in pages.
    pub preload_margin: usize,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Horizontal,
            gap: DEFAULT_GAP_BETWEEN_PAGES,
            preload_margin: 0,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Layout parameters for a viewport under this configuration.
    pub fn layout_params(&self, viewport: Size) -> LayoutParams {
        LayoutParams::new(self.axis, self.gap, viewport)
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/pagescroll/pagescroll.log` on Linux, or the
/// platform state directory elsewhere. Falls back to the current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("pagescroll").join("pagescroll.log")
    } else {
        PathBuf::from("pagescroll.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/pagescroll/config.toml` on Linux, the platform config
/// directory elsewhere, or `None` if it cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pagescroll").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `PAGESCROLL_CONFIG` environment variable
/// 3. Default path `~/.config/pagescroll/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        axis: config.axis.unwrap_or(defaults.axis),
        gap: config.gap.unwrap_or(defaults.gap),
        preload_margin: config.preload_margin.unwrap_or(defaults.preload_margin),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `PAGESCROLL_AXIS` and `PAGESCROLL_GAP`. Values that do not parse
/// are ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(axis) = std::env::var(ENV_AXIS).ok().and_then(|v| v.parse().ok()) {
        config.axis = axis;
    }

    if let Some(gap) = std::env::var(ENV_GAP).ok().and_then(|v| v.trim().parse().ok()) {
        config.gap = gap;
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence. Only flags the user actually set
/// are applied.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    axis_override: Option<Axis>,
    gap_override: Option<f64>,
    preload_override: Option<usize>,
) -> ResolvedConfig {
    if let Some(axis) = axis_override {
        config.axis = axis;
    }

    if let Some(gap) = gap_override {
        config.gap = gap;
    }

    if let Some(margin) = preload_override {
        config.preload_margin = margin;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
