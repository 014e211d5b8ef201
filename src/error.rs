//! Error taxonomy shared by the model, the codecs and the fix-up pass.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or unrecognized XML/JSON structure.
    #[error("schema error: {0}")]
    Schema(String),

    /// A construction invariant was violated.
    #[error("validation error: {0}")]
    Validation(String),

    /// A custom field carried a value that is neither a string nor an integer.
    #[error("custom field '{key}' has unsupported value type {found}")]
    UnsupportedCustomValue { key: String, found: &'static str },

    #[error("unknown hash algorithm '{0}'")]
    UnknownAlgorithm(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to write document: {0}")]
    Write(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
