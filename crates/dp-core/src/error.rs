//! Error types for dp-core
//!
//! Only failures that abort an apply call live here. Problems in the patch
//! content itself are reported through the [`Monitor`](crate::Monitor) and
//! skipped.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dp-core
#[derive(Debug, Error)]
pub enum Error {
    /// The asset is a string dictionary, but its key type has no editor
    #[error("patch '{patch}' can't edit '{asset}': unsupported dictionary key type '{key_type}'")]
    UnsupportedKeyType {
        patch: String,
        asset: String,
        key_type: String,
    },

    /// A record key couldn't be converted to the dictionary's key type
    #[error("patch '{patch}' can't edit '{asset}': key '{key}' is not a valid {key_type}: {source}")]
    KeyCoercion {
        patch: String,
        asset: String,
        key: String,
        key_type: &'static str,
        #[source]
        source: KeyParseError,
    },
}

/// Failed to convert a literal key into a dictionary key type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct KeyParseError {
    pub message: String,
}

impl KeyParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
