//! Defines `BinAxis`, one binning dimension of a source.

use crate::graph::{AxisDoc, SourceError};
use serde::{Deserialize, Serialize};

/// One binning dimension: a variable name and its ordered cut points.
///
/// Alignment between sources is purely ordinal, so two axes are considered
/// compatible when their `count()` agrees even if the boundary values differ.
///
/// Serialized as an `AxisDoc`; deserializing goes through `BinAxis::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AxisDoc", into = "AxisDoc")]
pub struct BinAxis {
    variable: String,
    boundaries: Vec<f64>,
}

impl BinAxis {
    /// Builds an axis, rejecting fewer than two boundaries or a sequence
    /// that is not strictly increasing.
    pub fn new(variable: impl Into<String>, boundaries: Vec<f64>) -> Result<Self, SourceError> {
        let variable = variable.into();
        if boundaries.len() < 2 {
            return Err(SourceError::malformed(
                &variable,
                format!("axis '{}' needs at least two boundaries, got {}", variable, boundaries.len()),
            ));
        }
        if let Some(w) = boundaries.windows(2).find(|w| !(w[0] < w[1])) {
            return Err(SourceError::malformed(
                &variable,
                format!("axis '{}' boundaries not strictly increasing at {} -> {}", variable, w[0], w[1]),
            ));
        }
        Ok(Self { variable, boundaries })
    }

    /// Uniform binning helper, mostly used to build fixtures.
    pub fn uniform(variable: impl Into<String>, count: usize, min: f64, max: f64) -> Result<Self, SourceError> {
        let n = count.max(1);
        let step = (max - min) / n as f64;
        let boundaries = (0..=n).map(|i| min + step * i as f64).collect();
        Self::new(variable, boundaries)
    }

    pub fn variable(&self) -> &str { &self.variable }
    pub fn boundaries(&self) -> &[f64] { &self.boundaries }
    pub fn count(&self) -> usize { self.boundaries.len() - 1 }
    pub fn min(&self) -> f64 { self.boundaries[0] }
    pub fn max(&self) -> f64 { self.boundaries[self.boundaries.len() - 1] }

    /// Lower and upper edge of bin `i`, if it exists.
    pub fn edges(&self, i: usize) -> Option<(f64, f64)> {
        if i < self.count() {
            Some((self.boundaries[i], self.boundaries[i + 1]))
        } else {
            None
        }
    }

    /// True when both axes carry the same cut points within a relative tolerance.
    pub fn same_boundaries(&self, other: &BinAxis, rel_tol: f64) -> bool {
        self.boundaries.len() == other.boundaries.len()
            && self.boundaries.iter().zip(&other.boundaries).all(|(a, b)| {
                let scale = a.abs().max(b.abs()).max(f64::MIN_POSITIVE);
                (a - b).abs() <= rel_tol * scale
            })
    }
}

impl TryFrom<AxisDoc> for BinAxis {
    type Error = SourceError;

    fn try_from(doc: AxisDoc) -> Result<Self, Self::Error> {
        BinAxis::new(doc.variable, doc.boundaries)
    }
}

impl From<BinAxis> for AxisDoc {
    fn from(axis: BinAxis) -> Self {
        Self { variable: axis.variable, boundaries: axis.boundaries }
    }
}
