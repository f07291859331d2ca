//! Defines the error types for the compatibility check.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompatibilityError {
    #[error("No sources to compare")]
    NoSources,
    #[error("Source {source_index} ('{source_title}') never binned on '{variable}'")]
    UnknownVariable { source_index: usize, source_title: String, variable: String },
    #[error("Files have differing bins: source {source_index} ('{source_title}') has {actual} '{variable}' bins, reference has {expected}")]
    IncompatibleBinning {
        source_index: usize,
        source_title: String,
        variable: String,
        expected: usize,
        actual: usize,
    },
}
