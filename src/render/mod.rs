//! Rendering of completed comparison grids and collection of the artifacts.
//!
//! The traversal side only depends on the `ComparisonRenderer` and
//! `ArtifactSink` traits; `SvgGridRenderer` and `ArchiveCollector` are the
//! stock implementations used by the command line tool.
pub mod collector;
pub mod plot;
pub mod request;

pub use collector::{ArchiveCollector, ArtifactArchive, ArtifactSink};
pub use plot::SvgGridRenderer;
pub use request::{Artifact, AxisDisplay, ComparisonRenderer, RenderError, RenderRequest};
