//! The binning model shared by every source: axes and the coordinates that
//! address a cell of the nested bin partition.
pub mod axis;
pub mod coordinate;

pub use axis::BinAxis;
pub use coordinate::BinCoordinate;
