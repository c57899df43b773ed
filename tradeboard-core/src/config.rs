//! Dashboard configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! url_root = "https://example.github.io/dashboard/db/"
//! load_history = false
//! templates = "templates.json"
//!
//! [paths]
//! index = "index.json"
//! metrics = "metrics.json"
//! users = "users.json"
//! days = ""
//!
//! [cache]
//! bust_index = true
//! bust_days = true
//! bust_metrics = false
//! bust_users = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::DayId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Web root of the data folder. When unset, data is read from `data_dir`.
    pub url_root: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub paths: DataPaths,
    pub cache: CachePolicy,
    /// Fetch every day in the index unless the user overrides it.
    pub load_history: bool,
    /// JSON template library replacing the built-in templates.
    pub templates: Option<PathBuf>,
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Relative locations of the data documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub index: String,
    pub metrics: String,
    pub users: String,
    /// Prefix for day documents; a day is read from `{days}{id}.json`.
    pub days: String,
}

impl DataPaths {
    pub fn day(&self, id: &DayId) -> String {
        format!("{}{}.json", self.days, id)
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            index: "index.json".into(),
            metrics: "metrics.json".into(),
            users: "users.json".into(),
            days: String::new(),
        }
    }
}

/// Which documents are fetched with a cache-busting query.
///
/// Index and day records change daily; metrics are large and change rarely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    pub bust_index: bool,
    pub bust_days: bool,
    pub bust_metrics: bool,
    pub bust_users: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            bust_index: true,
            bust_days: true,
            bust_metrics: false,
            bust_users: true,
        }
    }
}
