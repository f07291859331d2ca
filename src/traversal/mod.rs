//! The alignment traversal: one walk over the reference source's graph that
//! notifies an observer per leaf and per completed subgroup.
pub mod engine;
pub mod error;
pub mod inject;
pub mod observer;

pub use engine::{AlignmentTraversal, TraversalState, TraversalSummary};
pub use error::TraversalError;
pub use inject::{inject_payloads, MissingCell, PayloadInjector};
pub use observer::{AlignmentObserver, TraversalContext};
