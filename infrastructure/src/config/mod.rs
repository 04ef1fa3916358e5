//! Configuration file loading for mods
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./mods.toml` or `./.mods.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/mods/config.toml`
//! 4. Fallback: `~/.config/mods/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileDatasetConfig, FileDiscussionConfig, FileModelConfig,
    FileOutputConfig, FileRetryConfig, FileRunConfig, FileVariantConfig,
};
pub use loader::ConfigLoader;
