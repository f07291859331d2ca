//! Run configuration: which sources to compare, the grid layout and its
//! display styling, and the catalog of statistics to render.
pub mod category;
pub mod grid;
pub mod settings;

pub use category::Category;
pub use grid::{GridAxisStyle, GridSpec};
pub use settings::{ComparatorConfig, ConfigError, RenderOptions, SourceSpec};
