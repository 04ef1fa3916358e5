//! Command-line definitions.

pub mod commands;
