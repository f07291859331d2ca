//! The renderer boundary: what a renderer is handed and what it returns.

use crate::binning::BinCoordinate;
use crate::config::GridAxisStyle;
use crate::payload::PayloadStore;
use crate::validation::AxisSpan;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Plotting failed: {0}")]
    Plot(String),
    #[error("Nothing to draw for '{0}': empty cell range")]
    EmptyGrid(String),
    #[error("Cannot read cell ({x}, {y}) of the payload store")]
    Store {
        x: usize,
        y: usize,
        #[source]
        err: crate::payload::StoreError,
    },
    #[error("Cannot write artifact collection {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("Cannot encode artifact collection")]
    Encode(#[from] serde_json::Error),
}

/// Display metadata of one grid dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisDisplay {
    pub title: String,
    pub log_scale: bool,
    /// Cut points of the reference axis.
    pub boundaries: Vec<f64>,
}

impl AxisDisplay {
    pub fn new(span: &AxisSpan, style: &GridAxisStyle) -> Self {
        Self {
            title: style.title.clone(),
            log_scale: style.log_scale,
            boundaries: span.boundaries.clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }

    /// Edges of grid bin `i` as binned by the reference source.
    pub fn edges(&self, i: usize) -> Option<(f64, f64)> {
        match (self.boundaries.get(i), self.boundaries.get(i + 1)) {
            (Some(&lo), Some(&hi)) => Some((lo, hi)),
            _ => None,
        }
    }

    /// Title with a scale marker, e.g. `Q² (log)`.
    pub fn heading(&self) -> String {
        if self.log_scale {
            format!("{} (log)", self.title)
        } else {
            self.title.clone()
        }
    }
}

/// Everything needed to draw one (subgroup, statistic) comparison.
///
/// `x_bins` and `y_bins` select the grid cells the subgroup covers; every
/// cell inside them has been through the leaf callbacks.
#[derive(Debug)]
pub struct RenderRequest<'a, 'g> {
    pub name: &'a str,
    pub statistic: &'a str,
    pub subgroup: &'a BinCoordinate,
    pub store: &'a PayloadStore<'g>,
    pub x_bins: Range<usize>,
    pub y_bins: Range<usize>,
    pub x_axis: &'a AxisDisplay,
    pub y_axis: &'a AxisDisplay,
    pub labels: &'a [String],
}

/// A rendered comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub statistic: String,
    pub subgroup: String,
    pub svg: String,
}

/// Draws one comparison artifact per request.
pub trait ComparisonRenderer {
    fn render(&mut self, request: &RenderRequest<'_, '_>) -> Result<Artifact, RenderError>;
}
