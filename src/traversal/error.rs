//! Defines the errors that abort a traversal.
use crate::graph::LookupError;
use crate::render::RenderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraversalError {
    #[error("Reference source never binned on grid variable '{variable}'")]
    UnknownGridVariable { variable: String },
    #[error("Traversal already ran; build a new one to walk again")]
    AlreadyRun,
    #[error("Reference coordinate cannot be placed on the grid")]
    Coordinate(#[from] LookupError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
