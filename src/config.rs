//! Analyzer configuration.
//!
//! Settings come from built-in defaults, then an optional YAML file, then
//! command-line flags. The YAML file uses the same field names as
//! [`AnalyzerConfig`]:
//!
//! ```yaml
//! storage_dir: /srv/uploads
//! preview_rows: 5
//! delimiter: semicolon
//! encoding: windows-1252
//! empty_columns: "null"
//! ```

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use encoding_rs::Encoding;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{cli::parse_delimiter, io_utils, scanner::DEFAULT_PREVIEW_ROWS};

pub const DEFAULT_STORAGE_DIR: &str = "storage";

/// How a column without numeric cells is rendered in a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "kebab-case")]
pub enum EmptyColumnPolicy {
    /// Report `0` for sum, average and max.
    #[default]
    Zero,
    /// Report `null` for sum, average and max.
    Null,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub storage_dir: PathBuf,
    pub preview_rows: usize,
    #[serde(deserialize_with = "deserialize_delimiter")]
    pub delimiter: Option<u8>,
    pub encoding: Option<String>,
    pub empty_columns: EmptyColumnPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            delimiter: None,
            encoding: None,
            empty_columns: EmptyColumnPolicy::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading configuration file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing configuration file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn resolve_encoding(&self) -> Result<&'static Encoding> {
        io_utils::resolve_encoding(self.encoding.as_deref())
    }
}

fn deserialize_delimiter<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|value| parse_delimiter(&value).map_err(serde::de::Error::custom))
        .transpose()
}
