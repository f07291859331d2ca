//! Payload injection: the leaf behaviour that fills one grid cell of the
//! store across every source.

use super::error::TraversalError;
use super::observer::{AlignmentObserver, TraversalContext};
use crate::binning::BinCoordinate;
use crate::config::GridSpec;
use crate::graph::Access;
use crate::payload::Histos;
use std::borrow::Cow;
use tracing::{debug, error, warn};

/// A cell one source could not supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCell {
    pub source_index: usize,
    pub source_title: String,
    pub coordinate: BinCoordinate,
    pub reason: String,
}

/// Writes the reference payload at `[0][bx][by]`, then probes every other
/// source for the payload at the same coordinate.
///
/// A failed probe is recoverable: it is logged, the cell is left unset and
/// returned as a `MissingCell`. Store index errors are logged and skipped.
/// Only a reference coordinate that lacks a grid variable is an error.
pub fn inject_payloads<'g>(
    ctx: &mut TraversalContext<'g>,
    coordinate: &BinCoordinate,
    payload: &'g Histos,
    grid: &GridSpec,
) -> Result<Vec<MissingCell>, TraversalError> {
    let bx = coordinate.require(&grid.x)?;
    let by = coordinate.require(&grid.y)?;
    debug!(bx, by, %coordinate, "Injecting payloads");

    if let Err(e) = ctx.store.set(0, bx, by, Cow::Borrowed(payload)) {
        error!(source_index = 0, bx, by, "Invalid bin number: {e}");
    }

    let sources = ctx.sources;
    let mut missing = Vec::new();
    for (source_index, source) in sources.iter().enumerate().skip(1) {
        match source.get_payload(coordinate, Access::Borrow) {
            Ok(handle) => {
                if let Err(e) = ctx.store.set(source_index, bx, by, handle) {
                    error!(source_index, bx, by, "Invalid bin number: {e}");
                }
            }
            Err(e) => {
                warn!(
                    source_index,
                    source = source.title(),
                    %coordinate,
                    "Payload lookup failed, cell left unset: {e}"
                );
                // Clear anything left over from an earlier leaf mapped to this cell.
                let _ = ctx.store.clear(source_index, bx, by);
                missing.push(MissingCell {
                    source_index,
                    source_title: source.title().to_string(),
                    coordinate: coordinate.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(missing)
}

/// An observer that only aligns payloads: every leaf is injected, subgroup
/// boundaries are ignored. Collects the cells sources could not supply.
#[derive(Debug, Clone)]
pub struct PayloadInjector {
    grid: GridSpec,
    missing: Vec<MissingCell>,
}

impl PayloadInjector {
    pub fn new(grid: GridSpec) -> Self {
        Self { grid, missing: Vec::new() }
    }

    pub fn grid(&self) -> &GridSpec { &self.grid }
    pub fn missing(&self) -> &[MissingCell] { &self.missing }
    pub fn into_missing(self) -> Vec<MissingCell> { self.missing }
}

impl<'g> AlignmentObserver<'g> for PayloadInjector {
    fn on_leaf(
        &mut self,
        ctx: &mut TraversalContext<'g>,
        coordinate: &BinCoordinate,
        payload: &'g Histos,
    ) -> Result<(), TraversalError> {
        let missing = inject_payloads(ctx, coordinate, payload, &self.grid)?;
        self.missing.extend(missing);
        Ok(())
    }

    fn on_subgroup_complete(&mut self, _ctx: &TraversalContext<'g>, _subgroup: &BinCoordinate) -> Result<(), TraversalError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::BinAxis;
    use crate::graph::{PayloadId, SourceBinGraph, SourceDocument};
    use crate::payload::PayloadStore;

    fn source(title: &str, skip: Option<&str>) -> SourceBinGraph {
        let axes = vec![
            BinAxis::uniform("x", 2, 0.0, 1.0).unwrap(),
            BinAxis::uniform("q2", 2, 1.0, 10.0).unwrap(),
        ];
        let mut doc = SourceDocument::full_grid(&axes, |c| Histos::new(format!("{title}:{}", c.label())));
        if let Some(skip) = skip {
            doc.retain_leaves(|c| c.label() != skip);
        }
        SourceBinGraph::from_document(title, doc).unwrap()
    }

    fn grid() -> GridSpec {
        GridSpec { x: "x".into(), y: "q2".into() }
    }

    #[test]
    fn test_inject_fills_every_source() {
        let sources = vec![source("a", None), source("b", None), source("c", None)];
        let mut ctx = TraversalContext::new(&sources, PayloadStore::allocate(3, 2, 2));
        let coord = BinCoordinate::from_pairs([("x", 1), ("q2", 0)]);
        let reference = sources[0].payload(PayloadId::new(2));

        let missing = inject_payloads(&mut ctx, &coord, reference, &grid()).unwrap();
        assert!(missing.is_empty());
        let names: Vec<_> = ctx.store.slice(1, 0).unwrap().iter().map(|h| h.as_ref().unwrap().name.clone()).collect();
        assert_eq!(names, vec!["a:x1_q20", "b:x1_q20", "c:x1_q20"]);
    }

    #[test]
    fn test_failed_probe_leaves_cell_unset() {
        let sources = vec![source("a", None), source("b", Some("x1_q21"))];
        let mut ctx = TraversalContext::new(&sources, PayloadStore::allocate(2, 2, 2));
        let coord = BinCoordinate::from_pairs([("x", 1), ("q2", 1)]);
        let leaf = sources[0].get_payload(&coord, Access::Borrow).unwrap();
        let Cow::Borrowed(leaf) = leaf else { panic!("expected a borrowed payload") };

        let missing = inject_payloads(&mut ctx, &coord, leaf, &grid()).unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].source_index, 1);
        assert_eq!(missing[0].source_title, "b");
        assert_eq!(ctx.store.get(0, 1, 1).map(|h| h.name.as_str()), Some("a:x1_q21"));
        assert_eq!(ctx.store.get(1, 1, 1), None);
    }

    #[test]
    fn test_coordinate_without_grid_variable_is_fatal() {
        let sources = vec![source("a", None)];
        let mut ctx = TraversalContext::new(&sources, PayloadStore::allocate(1, 2, 2));
        let coord = BinCoordinate::from_pairs([("x", 0)]);
        let payload = sources[0].payload(PayloadId::new(0));
        let err = inject_payloads(&mut ctx, &coord, payload, &grid()).unwrap_err();
        assert!(matches!(err, TraversalError::Coordinate(_)));
        assert_eq!(ctx.store.filled(), 0);
    }

    #[test]
    fn test_out_of_range_cell_is_logged_not_fatal() {
        let sources = vec![source("a", None), source("b", None)];
        // Deliberately undersized store.
        let mut ctx = TraversalContext::new(&sources, PayloadStore::allocate(2, 1, 1));
        let coord = BinCoordinate::from_pairs([("x", 1), ("q2", 1)]);
        let payload = sources[0].payload(PayloadId::new(3));
        let missing = inject_payloads(&mut ctx, &coord, payload, &grid()).unwrap();
        assert!(missing.is_empty());
        assert_eq!(ctx.store.filled(), 0);
    }
}
