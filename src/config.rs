//! `asgraph.toml` loading.
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [traversal]
//! safe_mode = true
//! special_nodes = "visit-referenced-only"
//! max_depth = 512
//! ```

use asgraph_asg::{Preorder, SpecialNodePolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "asgraph.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub traversal: TraversalConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level for the `asgraph` target, e.g. `info` or `debug`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { level: "info".to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    pub safe_mode: bool,
    pub special_nodes: SpecialNodes,
    pub max_depth: Option<usize>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        TraversalConfig {
            safe_mode: true,
            special_nodes: SpecialNodes::Skip,
            max_depth: None,
        }
    }
}

impl TraversalConfig {
    pub fn preorder(&self) -> Preorder {
        Preorder::new()
            .safe_mode(self.safe_mode)
            .special_nodes(self.special_nodes.into())
            .max_depth(self.max_depth)
    }
}

/// Special-node policy as spelled in the config file and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialNodes {
    #[default]
    Skip,
    VisitAll,
    VisitReferencedOnly,
}

impl From<SpecialNodes> for SpecialNodePolicy {
    fn from(value: SpecialNodes) -> Self {
        match value {
            SpecialNodes::Skip => SpecialNodePolicy::Skip,
            SpecialNodes::VisitAll => SpecialNodePolicy::VisitAll,
            SpecialNodes::VisitReferencedOnly => SpecialNodePolicy::VisitReferencedOnly,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Reads `path`, or [`DEFAULT_CONFIG_FILE`] when `None`. Only a missing
    /// default file falls back to defaults; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_owned(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Config::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Self::from_toml(&text, &path)
    }
}
