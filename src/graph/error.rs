//! Defines the error types for loading and querying source bin graphs.
use std::path::PathBuf;
use thiserror::Error;

/// Failures while building a `SourceBinGraph` from persisted data.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Malformed source '{title}': {reason}")]
    MalformedSource { title: String, reason: String },
    #[error("Cannot read source '{title}' at {}", path.display())]
    Io {
        title: String,
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("Cannot parse source '{title}'")]
    Parse {
        title: String,
        #[source]
        err: serde_json::Error,
    },
}

impl SourceError {
    pub fn malformed(title: &str, reason: impl Into<String>) -> Self {
        SourceError::MalformedSource { title: title.to_string(), reason: reason.into() }
    }

    /// Rewrites the title of a malformed-source error, used when an axis error
    /// surfaces while loading a named source.
    pub(crate) fn in_source(self, source_title: &str) -> Self {
        match self {
            SourceError::MalformedSource { reason, .. } => SourceError::malformed(source_title, reason),
            other => other,
        }
    }
}

/// Failures resolving an axis or a payload inside a loaded graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Unknown variable '{variable}': source never binned on it")]
    UnknownVariable { variable: String },
    #[error("Coordinate out of range: {variable} bin {index} >= {count}")]
    CoordinateOutOfRange { variable: String, index: usize, count: usize },
    #[error("Structural mismatch at {coordinate} on '{variable}': {reason}")]
    StructuralMismatch { variable: String, coordinate: String, reason: String },
}
