//! Defines `BinCoordinate`, the address of one cell in a nested bin partition.

use crate::graph::LookupError;
use smallvec::SmallVec;
use std::fmt;

/// A single resolved binning decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinIndex {
    pub variable: String,
    pub bin: usize,
}

/// An ordered mapping from variable name to 0-based bin index.
///
/// Components are kept in the order they were resolved, which for a
/// traversal is the outer-to-inner nesting order of the walked graph.
/// Lookups are by name, so a coordinate resolved in one source can address
/// a source that nests the same variables differently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BinCoordinate {
    components: SmallVec<[BinIndex; 4]>,
}

impl BinCoordinate {
    pub fn new() -> Self { Self::default() }

    /// Builds a coordinate from `(variable, bin)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        let mut coord = Self::new();
        for (variable, bin) in pairs {
            coord.push(variable, bin);
        }
        coord
    }

    /// Appends a component; an existing component for the same variable is replaced.
    pub fn push(&mut self, variable: &str, bin: usize) {
        if let Some(c) = self.components.iter_mut().find(|c| c.variable == variable) {
            c.bin = bin;
        } else {
            self.components.push(BinIndex { variable: variable.to_string(), bin });
        }
    }

    pub fn pop(&mut self) -> Option<BinIndex> { self.components.pop() }

    pub fn get(&self, variable: &str) -> Option<usize> {
        self.components.iter().find(|c| c.variable == variable).map(|c| c.bin)
    }

    /// Like `get`, but a missing variable is a structural mismatch.
    pub fn require(&self, variable: &str) -> Result<usize, LookupError> {
        self.get(variable).ok_or_else(|| LookupError::StructuralMismatch {
            variable: variable.to_string(),
            coordinate: self.label(),
            reason: "coordinate does not bin on this variable".to_string(),
        })
    }

    /// The leading components up to and including `variable`.
    pub fn prefix_through(&self, variable: &str) -> Option<BinCoordinate> {
        let end = self.components.iter().position(|c| c.variable == variable)?;
        Some(Self { components: self.components[..=end].iter().cloned().collect() })
    }

    pub fn len(&self) -> usize { self.components.len() }
    pub fn is_empty(&self) -> bool { self.components.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &BinIndex> { self.components.iter() }

    /// Compact form such as `z1_x0`, used to name rendered artifacts.
    pub fn label(&self) -> String {
        if self.components.is_empty() {
            return "all".to_string();
        }
        self.components
            .iter()
            .map(|c| format!("{}{}", c.variable, c.bin))
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for BinCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", c.variable, c.bin)?;
        }
        write!(f, ")")
    }
}
