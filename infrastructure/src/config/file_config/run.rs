//! Run configuration from TOML (`[run]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named dataset file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDatasetConfig {
    pub name: String,
    pub path: PathBuf,
}

impl std::str::FromStr for FileDatasetConfig {
    type Err = String;

    /// Parse the `NAME=PATH` command-line form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => Ok(Self {
                name: name.trim().to_string(),
                path: PathBuf::from(path.trim()),
            }),
            _ => Err(format!("expected NAME=PATH, got '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunConfig {
    pub run_name: String,
    /// Directory holding the checkpoint bundle.
    pub res_dir: PathBuf,
    /// Items per dataset (0 = all).
    pub num_to_run: usize,
    pub datasets: Vec<FileDatasetConfig>,
    /// JSONL transcript of every prompt and completion.
    pub conversation_log: Option<PathBuf>,
}

impl Default for FileRunConfig {
    fn default() -> Self {
        Self {
            run_name: "default_run".to_string(),
            res_dir: PathBuf::from("."),
            num_to_run: 20,
            datasets: Vec::new(),
            conversation_log: None,
        }
    }
}

impl FileRunConfig {
    /// `<res_dir>/<run_name>.json`
    pub fn checkpoint_path(&self) -> PathBuf {
        self.res_dir.join(format!("{}.json", self.run_name))
    }
}
