//! JSON files read and written by the CLI

use dp_core::{DataAsset, EditDataPatch, EditOptions, EditSpecification, FieldEdits, Monitor, RecordEdits, TokenString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Errors from the CLI host
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a JSON file
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The patch targets a different asset than the one loaded
    #[error("patch '{patch}' targets '{target}', but the data file contains '{asset}'")]
    TargetMismatch {
        patch: String,
        target: String,
        asset: String,
    },

    /// Applying the patch failed
    #[error(transparent)]
    Core(#[from] dp_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A data patch as written in a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Name shown in log messages
    pub log_name: String,
    /// Asset to edit; may contain tokens
    pub target: String,
    /// Whole records to set, or `null` to remove
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<BTreeMap<String, Option<String>>>,
    /// Individual fields to set, by record key and field index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, BTreeMap<i32, String>>>,
    #[serde(default)]
    pub options: EditOptions,
}

impl PatchConfig {
    /// Create an empty patch
    pub fn new(log_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            log_name: log_name.into(),
            target: target.into(),
            entries: None,
            fields: None,
            options: EditOptions::default(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path.as_ref())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path.as_ref())
    }

    /// Build the edit specification from the configured values
    pub fn specification(&self) -> EditSpecification {
        let records = self.entries.as_ref().map(|entries| {
            entries
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_deref().map(TokenString::new)))
                .collect::<RecordEdits>()
        });

        let fields = self.fields.as_ref().map(|groups| {
            let mut edits = FieldEdits::new();
            for (key, fields) in groups {
                for (index, value) in fields {
                    edits.insert(key.as_str(), *index, TokenString::new(value.as_str()));
                }
            }
            edits
        });

        EditSpecification::from_parts(records, fields)
    }

    /// Build a live patch reporting to the given monitor
    pub fn build(&self, monitor: Box<dyn Monitor>) -> EditDataPatch {
        EditDataPatch::with_options(
            self.log_name.as_str(),
            self.target.as_str(),
            self.specification(),
            self.options.clone(),
            monitor,
        )
    }
}

/// Load a data asset from JSON
pub fn load_asset<P: AsRef<Path>>(path: P) -> Result<DataAsset> {
    load_json(path.as_ref())
}

/// Save a data asset as JSON
pub fn save_asset<P: AsRef<Path>>(asset: &DataAsset, path: P) -> Result<()> {
    save_json(asset, path.as_ref())
}

/// Load token values from JSON; names are matched case-insensitively
pub fn load_context<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, String>> {
    let raw: BTreeMap<String, String> = load_json(path.as_ref())?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| (name.to_lowercase(), value))
        .collect())
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| CliError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| CliError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}
