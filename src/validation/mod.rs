//! Structural compatibility of the loaded sources.
//!
//! Runs once, before anything is allocated for the comparison: sources are
//! aligned purely by ordinal bin index, so every source must split each grid
//! dimension into the same number of bins as the reference.
pub mod compatibility;
pub mod error;

pub use compatibility::{check_compatibility, AxisSpan, GridDims};
pub use error::CompatibilityError;
