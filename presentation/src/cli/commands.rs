//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// `NAME=PATH` dataset argument.
pub fn parse_dataset(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(format!("expected NAME=PATH, got '{}'", value)),
    }
}

/// CLI arguments for mods
///
/// Every discussion option is optional here; unset options keep the value
/// from the configuration files.
#[derive(Parser, Debug)]
#[command(name = "mods")]
#[command(author, version, about = "Multi-document discussion - cited outlines over conflicting documents")]
#[command(long_about = r#"
mods runs a moderated discussion over the documents of each dataset item.

For every query a moderator plans a few fine-grained discussion points,
picks which documents should speak on each, and every selected document
reports the facts it holds for and against the query. The result is a
cited outline per item, saved to <res-dir>/<run-name>.json.

Configuration files are loaded from (in priority order):
1. --config <path>         Explicit config file
2. ./mods.toml             Project-level config
3. ~/.config/mods/config.toml   Global config

Example:
  mods --dataset news=data/news.jsonl --run-name trial
  mods --dataset news=data/news.jsonl --use-cot false true --use-rationale false true
"#)]
pub struct Cli {
    /// Name of the run; also the checkpoint file name
    #[arg(long, value_name = "NAME")]
    pub run_name: Option<String>,

    /// Items to run per dataset (0 = all)
    #[arg(long, value_name = "N")]
    pub num_to_run: Option<usize>,

    /// Passages retrieved per document
    #[arg(long, value_name = "K")]
    pub top_k: Option<usize>,

    /// Discussion points planned per query
    #[arg(long, value_name = "N")]
    pub num_topics: Option<usize>,

    /// Directory for the checkpoint bundle
    #[arg(long, value_name = "DIR")]
    pub res_dir: Option<PathBuf>,

    /// Per-variant chain-of-thought flags, paired with --use-rationale
    #[arg(long, num_args = 1.., value_name = "BOOL")]
    pub use_cot: Vec<bool>,

    /// Per-variant rationale flags, paired with --use-cot
    #[arg(long, num_args = 1.., value_name = "BOOL")]
    pub use_rationale: Vec<bool>,

    /// Retrieve selection context with the topic instead of the query
    #[arg(long, value_name = "BOOL")]
    pub use_subtopic_retrieval: Option<bool>,

    /// Let the moderator choose speakers (false = every document speaks)
    #[arg(long, value_name = "BOOL")]
    pub select_agents: Option<bool>,

    /// Dataset to run (can be specified multiple times)
    #[arg(long = "dataset", value_name = "NAME=PATH", value_parser = parse_dataset)]
    pub datasets: Vec<(String, PathBuf)>,

    /// Elicit a topic's speakers concurrently
    #[arg(long)]
    pub parallel_speakers: bool,

    /// Print every completed outline after the run
    #[arg(long)]
    pub print_outlines: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write a daily log file into this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Variant flag pairs, if either list was given. A missing list
    /// defaults to all-false of the other list's length.
    pub fn variant_flags(&self) -> Option<(Vec<bool>, Vec<bool>)> {
        match (self.use_cot.is_empty(), self.use_rationale.is_empty()) {
            (true, true) => None,
            (false, true) => Some((self.use_cot.clone(), vec![false; self.use_cot.len()])),
            (true, false) => Some((vec![false; self.use_rationale.len()], self.use_rationale.clone())),
            (false, false) => Some((self.use_cot.clone(), self.use_rationale.clone())),
        }
    }

    /// `tracing` filter directive for the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
