//! Options controlling how edits are applied

use serde::{Deserialize, Serialize};

/// What to do when a record key can't be converted to the dictionary's key type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyErrorPolicy {
    /// Log a warning and skip the record edit or field group
    #[default]
    Warn,
    /// Abort the apply call with an error
    Fail,
}

/// Options for a data patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditOptions {
    /// Separator between the fields of a record value
    pub field_delimiter: char,
    /// Handling of keys that don't fit the dictionary's key type
    pub key_errors: KeyErrorPolicy,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            field_delimiter: '/',
            key_errors: KeyErrorPolicy::Warn,
        }
    }
}
