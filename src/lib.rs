//! Bin-by-bin comparison of identically binned result sources.
//!
//! Each source is a nested bin hierarchy whose leaves carry a set of
//! histograms. One walk over the reference source aligns the matching leaf of
//! every other source into a dense store, and each completed subgroup of the
//! two-variable grid is handed to a renderer.

pub mod binning;
pub mod comparator;
pub mod config;
pub mod display;
pub mod error;
pub mod graph;
pub mod payload;
pub mod render;
pub mod traversal;
pub mod validation;

pub use comparator::{align_sources, Comparator, RunReport};
pub use config::{Category, ComparatorConfig, GridSpec, SourceSpec};
pub use error::ComparatorError;
pub use graph::SourceBinGraph;
