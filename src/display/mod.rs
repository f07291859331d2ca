//! Human-readable dumps of loaded source graphs.
pub mod tree;

pub use tree::format_tree;
