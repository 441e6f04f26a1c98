//! Configuration module.
//!
//! Settings come from hardcoded defaults, an optional TOML file,
//! `PAGESCROLL_*` environment variables and CLI flags, in that order of
//! increasing precedence.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};
