//! Per-source bin hierarchies: the persisted document format, the graph built
//! from it, and the lookups the alignment traversal needs.
pub mod dag;
pub mod document;
pub mod error;
pub mod node;

// Re-export key types for convenient access
pub use dag::SourceBinGraph;
pub use document::{AxisDoc, NodeDoc, SourceDocument};
pub use error::{LookupError, SourceError};
pub use node::{Access, BinNode, NodeId, PayloadId};
