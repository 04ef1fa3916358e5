//! Presentation layer for mods
//!
//! This crate contains CLI definitions, outline formatters and progress
//! reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, parse_dataset};
pub use output::console::OutlineFormatter;
pub use progress::reporter::{BatchProgressReporter, SimpleProgress};
