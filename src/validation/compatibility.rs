//! The bin-count check across all sources.

use super::error::CompatibilityError;
use crate::binning::BinAxis;
use crate::config::GridSpec;
use crate::graph::SourceBinGraph;
use tracing::{debug, warn};

/// Relative tolerance under which differing boundary values are not worth a warning.
const BOUNDARY_REL_TOL: f64 = 1e-9;

/// Extent of one grid dimension, taken from the reference source.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpan {
    pub variable: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    /// The reference's cut points; `count + 1` entries.
    pub boundaries: Vec<f64>,
}

/// Both grid dimensions of the comparison layout.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDims {
    pub x: AxisSpan,
    pub y: AxisSpan,
}

/// Verifies every source splits both grid dimensions into as many bins as the
/// reference (`sources[0]`). Boundary values are not required to match; they are
/// only reported.
///
/// # Returns
/// - `Ok(GridDims)` describing the reference grid.
/// - `Err` naming the first divergent source and dimension.
pub fn check_compatibility(sources: &[SourceBinGraph], grid: &GridSpec) -> Result<GridDims, CompatibilityError> {
    let reference = sources.first().ok_or(CompatibilityError::NoSources)?;
    let variables = [grid.x.as_str(), grid.y.as_str()];

    let mut reference_axes = Vec::with_capacity(variables.len());
    for variable in variables {
        let axis = reference.get_axis(variable).map_err(|_| CompatibilityError::UnknownVariable {
            source_index: 0,
            source_title: reference.title().to_string(),
            variable: variable.to_string(),
        })?;
        reference_axes.push(axis);
    }

    for (source_index, source) in sources.iter().enumerate().skip(1) {
        for reference_axis in &reference_axes {
            let variable = reference_axis.variable();
            let axis = source.get_axis(variable).map_err(|_| CompatibilityError::UnknownVariable {
                source_index,
                source_title: source.title().to_string(),
                variable: variable.to_string(),
            })?;
            if axis.count() != reference_axis.count() {
                return Err(CompatibilityError::IncompatibleBinning {
                    source_index,
                    source_title: source.title().to_string(),
                    variable: variable.to_string(),
                    expected: reference_axis.count(),
                    actual: axis.count(),
                });
            }
            if !axis.same_boundaries(reference_axis, BOUNDARY_REL_TOL) {
                warn!(
                    source = source.title(),
                    variable,
                    "Bin boundaries differ from the reference; aligning by bin index"
                );
            }
        }
        debug!(source = source.title(), source_index, "Binning compatible with reference");
    }

    let span = |axis: &BinAxis| AxisSpan {
        variable: axis.variable().to_string(),
        count: axis.count(),
        min: axis.min(),
        max: axis.max(),
        boundaries: axis.boundaries().to_vec(),
    };
    Ok(GridDims { x: span(reference_axes[0]), y: span(reference_axes[1]) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SourceDocument;
    use crate::payload::Histos;
    use rstest::rstest;

    fn source(title: &str, nx: usize, ny: usize) -> SourceBinGraph {
        let axes = vec![
            BinAxis::uniform("x", nx, 0.0, 1.0).unwrap(),
            BinAxis::uniform("q2", ny, 1.0, 100.0).unwrap(),
        ];
        let doc = SourceDocument::full_grid(&axes, |c| Histos::new(c.label()));
        SourceBinGraph::from_document(title, doc).unwrap()
    }

    fn grid() -> GridSpec {
        GridSpec { x: "x".into(), y: "q2".into() }
    }

    #[test]
    fn test_compatible_sources_report_reference_dims() {
        let sources = vec![source("a", 2, 3), source("b", 2, 3), source("c", 2, 3)];
        let dims = check_compatibility(&sources, &grid()).unwrap();
        assert_eq!(dims.x.count, 2);
        assert_eq!(dims.y.count, 3);
        assert_eq!(dims.y.min, 1.0);
        assert_eq!(dims.y.max, 100.0);
        assert_eq!(dims.x.boundaries, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_single_source_is_trivially_compatible() {
        let dims = check_compatibility(&[source("only", 4, 1)], &grid()).unwrap();
        assert_eq!((dims.x.count, dims.y.count), (4, 1));
    }

    #[rstest]
    #[case(2, 3, 1, "q2", 2, 3)]
    #[case(3, 2, 1, "x", 2, 3)]
    fn test_first_divergent_source_is_named(
        #[case] nx: usize,
        #[case] ny: usize,
        #[case] index: usize,
        #[case] variable: &str,
        #[case] expected: usize,
        #[case] actual: usize,
    ) {
        let sources = vec![source("ref", 2, 2), source("bad", nx, ny), source("worse", 5, 5)];
        let err = check_compatibility(&sources, &grid()).unwrap_err();
        assert_eq!(
            err,
            CompatibilityError::IncompatibleBinning {
                source_index: index,
                source_title: "bad".into(),
                variable: variable.into(),
                expected,
                actual,
            }
        );
    }

    #[test]
    fn test_differing_boundaries_with_equal_counts_pass() {
        let other_axes = vec![
            BinAxis::new("x", vec![0.0, 0.7, 1.0]).unwrap(),
            BinAxis::new("q2", vec![1.0, 5.0, 50.0]).unwrap(),
        ];
        let doc = SourceDocument::full_grid(&other_axes, |c| Histos::new(c.label()));
        let other = SourceBinGraph::from_document("shifted", doc).unwrap();
        assert!(check_compatibility(&[source("ref", 2, 2), other], &grid()).is_ok());
    }

    #[test]
    fn test_missing_grid_variable() {
        let grid = GridSpec { x: "x".into(), y: "eta".into() };
        let err = check_compatibility(&[source("ref", 2, 2)], &grid).unwrap_err();
        assert!(matches!(err, CompatibilityError::UnknownVariable { source_index: 0, .. }));
    }

    #[test]
    fn test_no_sources() {
        assert_eq!(check_compatibility(&[], &grid()), Err(CompatibilityError::NoSources));
    }
}
