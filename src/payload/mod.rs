//! Per-bin payloads and the dense store that aligns them across sources.
pub mod histos;
pub mod store;

pub use histos::{Hist1D, Histos};
pub use store::{PayloadHandle, PayloadStore, StoreError};
