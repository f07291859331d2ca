//! The crate-level error, unifying every stage of a comparison run.
use crate::config::ConfigError;
use crate::graph::SourceError;
use crate::render::RenderError;
use crate::traversal::TraversalError;
use crate::validation::CompatibilityError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComparatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Compatibility(#[from] CompatibilityError),
    #[error(transparent)]
    Traversal(#[from] TraversalError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
