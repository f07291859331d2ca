//! A synchronous, single-threaded walk over the reference source graph.

use super::error::TraversalError;
use super::observer::{AlignmentObserver, TraversalContext};
use crate::binning::BinCoordinate;
use crate::config::GridSpec;
use crate::graph::{BinNode, NodeId, SourceBinGraph};
use tracing::{debug, info};

/// Where the traversal is in its walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalState {
    Idle,
    Traversing { leaf: NodeId },
    SubgroupBoundary { subgroup: BinCoordinate },
    Done,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalSummary {
    pub leaves_visited: usize,
    pub subgroups_completed: usize,
}

/// Drives one walk over the reference graph.
///
/// Leaves are visited depth-first in the graph's own nesting order, siblings
/// by ascending bin. A subgroup is the subtree of one node binned on the
/// subgroup variable; its completion event fires right after the last leaf
/// below it, before the walk moves to the next sibling.
pub struct AlignmentTraversal<'g> {
    reference: &'g SourceBinGraph,
    subgroup_variable: String,
    state: TraversalState,
    summary: TraversalSummary,
}

impl<'g> AlignmentTraversal<'g> {
    /// Uses whichever grid variable the reference nests outermost as the
    /// subgroup variable, so each subgroup is one full sweep of the other.
    pub fn new(reference: &'g SourceBinGraph, grid: &GridSpec) -> Result<Self, TraversalError> {
        let depth = |variable: &str| {
            reference
                .depth_of(variable)
                .ok_or_else(|| TraversalError::UnknownGridVariable { variable: variable.to_string() })
        };
        let outer = if depth(&grid.x)? <= depth(&grid.y)? { &grid.x } else { &grid.y };
        Self::with_subgroup_variable(reference, outer)
    }

    pub fn with_subgroup_variable(reference: &'g SourceBinGraph, variable: &str) -> Result<Self, TraversalError> {
        if reference.depth_of(variable).is_none() {
            return Err(TraversalError::UnknownGridVariable { variable: variable.to_string() });
        }
        Ok(Self {
            reference,
            subgroup_variable: variable.to_string(),
            state: TraversalState::Idle,
            summary: TraversalSummary::default(),
        })
    }

    pub fn subgroup_variable(&self) -> &str { &self.subgroup_variable }
    pub fn state(&self) -> &TraversalState { &self.state }

    /// Walks every reference leaf exactly once. Any observer error aborts the walk.
    pub fn run<O>(&mut self, ctx: &mut TraversalContext<'g>, observer: &mut O) -> Result<TraversalSummary, TraversalError>
    where
        O: AlignmentObserver<'g> + ?Sized,
    {
        if self.state != TraversalState::Idle {
            return Err(TraversalError::AlreadyRun);
        }
        info!(
            reference = self.reference.title(),
            subgroup = %self.subgroup_variable,
            leaves = self.reference.leaf_count(),
            "Starting alignment traversal"
        );

        let mut coordinate = BinCoordinate::new();
        self.walk(self.reference.root(), ctx, observer, &mut coordinate)?;
        self.state = TraversalState::Done;

        info!(
            leaves = self.summary.leaves_visited,
            subgroups = self.summary.subgroups_completed,
            "Alignment traversal done"
        );
        Ok(self.summary.clone())
    }

    fn walk<O>(
        &mut self,
        node: NodeId,
        ctx: &mut TraversalContext<'g>,
        observer: &mut O,
        coordinate: &mut BinCoordinate,
    ) -> Result<(), TraversalError>
    where
        O: AlignmentObserver<'g> + ?Sized,
    {
        let reference = self.reference;
        for child in reference.children(node) {
            let BinNode::Bin { axis, bin, payload } = *reference.node(child) else { continue };
            let variable = reference.axes()[axis].variable();
            coordinate.push(variable, bin);

            match payload {
                Some(id) => {
                    self.state = TraversalState::Traversing { leaf: child };
                    debug!(%coordinate, "Visiting leaf");
                    observer.on_leaf(ctx, coordinate, reference.payload(id))?;
                    self.summary.leaves_visited += 1;
                }
                None => self.walk(child, ctx, observer, coordinate)?,
            }

            if variable == self.subgroup_variable {
                self.state = TraversalState::SubgroupBoundary { subgroup: coordinate.clone() };
                debug!(subgroup = %coordinate, "Subgroup complete");
                observer.on_subgroup_complete(ctx, coordinate)?;
                self.summary.subgroups_completed += 1;
            }
            coordinate.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::BinAxis;
    use crate::graph::SourceDocument;
    use crate::payload::{Histos, PayloadStore};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Leaf(String),
        Subgroup(String),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
        fail_on_subgroup: bool,
    }

    impl<'g> AlignmentObserver<'g> for Recorder {
        fn on_leaf(
            &mut self,
            _ctx: &mut TraversalContext<'g>,
            coordinate: &BinCoordinate,
            payload: &'g Histos,
        ) -> Result<(), TraversalError> {
            assert_eq!(payload.name, coordinate.label());
            self.events.push(Event::Leaf(coordinate.label()));
            Ok(())
        }

        fn on_subgroup_complete(&mut self, _ctx: &TraversalContext<'g>, subgroup: &BinCoordinate) -> Result<(), TraversalError> {
            if self.fail_on_subgroup {
                return Err(TraversalError::UnknownGridVariable { variable: "forced".into() });
            }
            self.events.push(Event::Subgroup(subgroup.label()));
            Ok(())
        }
    }

    fn graph(axes: &[(&str, usize)]) -> SourceBinGraph {
        let axes: Vec<BinAxis> = axes
            .iter()
            .map(|&(v, n)| BinAxis::uniform(v, n, 1.0, 2.0).unwrap())
            .collect();
        let doc = SourceDocument::full_grid(&axes, |c| Histos::new(c.label()));
        SourceBinGraph::from_document("ref", doc).unwrap()
    }

    fn grid() -> GridSpec {
        GridSpec { x: "x".into(), y: "q2".into() }
    }

    fn leaf(s: &str) -> Event { Event::Leaf(s.into()) }
    fn sub(s: &str) -> Event { Event::Subgroup(s.into()) }

    #[test]
    fn test_two_by_two_event_order() {
        let g = graph(&[("x", 2), ("q2", 2)]);
        let sources = std::slice::from_ref(&g);
        let mut ctx = TraversalContext::new(sources, PayloadStore::allocate(1, 2, 2));
        let mut traversal = AlignmentTraversal::new(&g, &grid()).unwrap();
        assert_eq!(traversal.state(), &TraversalState::Idle);

        let mut rec = Recorder::default();
        let summary = traversal.run(&mut ctx, &mut rec).unwrap();

        assert_eq!(summary, TraversalSummary { leaves_visited: 4, subgroups_completed: 2 });
        assert_eq!(
            rec.events,
            vec![leaf("x0_q20"), leaf("x0_q21"), sub("x0"), leaf("x1_q20"), leaf("x1_q21"), sub("x1")]
        );
        assert_eq!(traversal.state(), &TraversalState::Done);
    }

    #[test]
    fn test_subgroup_variable_is_outermost_grid_variable() {
        let g = graph(&[("q2", 3), ("x", 2)]);
        let traversal = AlignmentTraversal::new(&g, &grid()).unwrap();
        assert_eq!(traversal.subgroup_variable(), "q2");

        let sources = std::slice::from_ref(&g);
        let mut ctx = TraversalContext::new(sources, PayloadStore::allocate(1, 2, 3));
        let mut traversal = traversal;
        let mut rec = Recorder::default();
        let summary = traversal.run(&mut ctx, &mut rec).unwrap();
        assert_eq!(summary.subgroups_completed, 3);
        assert_eq!(rec.events[2], sub("q20"));
    }

    #[test]
    fn test_outer_non_grid_variable_prefixes_subgroups() {
        let g = graph(&[("z", 2), ("x", 2), ("q2", 2)]);
        let sources = std::slice::from_ref(&g);
        let mut ctx = TraversalContext::new(sources, PayloadStore::allocate(1, 2, 2));
        let mut traversal = AlignmentTraversal::new(&g, &grid()).unwrap();
        let mut rec = Recorder::default();
        let summary = traversal.run(&mut ctx, &mut rec).unwrap();

        assert_eq!(summary, TraversalSummary { leaves_visited: 8, subgroups_completed: 4 });
        let subgroups: Vec<_> = rec.events.iter().filter(|e| matches!(e, Event::Subgroup(_))).cloned().collect();
        assert_eq!(subgroups, vec![sub("z0_x0"), sub("z0_x1"), sub("z1_x0"), sub("z1_x1")]);
    }

    #[test]
    fn test_every_subgroup_follows_exactly_its_leaves() {
        let g = graph(&[("x", 3), ("q2", 4)]);
        let sources = std::slice::from_ref(&g);
        let mut ctx = TraversalContext::new(sources, PayloadStore::allocate(1, 3, 4));
        let mut rec = Recorder::default();
        AlignmentTraversal::new(&g, &grid()).unwrap().run(&mut ctx, &mut rec).unwrap();

        let mut since_last = 0;
        for event in &rec.events {
            match event {
                Event::Leaf(_) => since_last += 1,
                Event::Subgroup(_) => {
                    assert_eq!(since_last, 4);
                    since_last = 0;
                }
            }
        }
        assert_eq!(since_last, 0);
    }

    #[test]
    fn test_run_twice_is_rejected() {
        let g = graph(&[("x", 1), ("q2", 1)]);
        let sources = std::slice::from_ref(&g);
        let mut ctx = TraversalContext::new(sources, PayloadStore::allocate(1, 1, 1));
        let mut traversal = AlignmentTraversal::new(&g, &grid()).unwrap();
        traversal.run(&mut ctx, &mut Recorder::default()).unwrap();
        let err = traversal.run(&mut ctx, &mut Recorder::default()).unwrap_err();
        assert!(matches!(err, TraversalError::AlreadyRun));
    }

    #[test]
    fn test_observer_error_aborts() {
        let g = graph(&[("x", 2), ("q2", 2)]);
        let sources = std::slice::from_ref(&g);
        let mut ctx = TraversalContext::new(sources, PayloadStore::allocate(1, 2, 2));
        let mut rec = Recorder { fail_on_subgroup: true, ..Default::default() };
        let mut traversal = AlignmentTraversal::new(&g, &grid()).unwrap();
        assert!(traversal.run(&mut ctx, &mut rec).is_err());
        // The walk stopped at the first subgroup boundary.
        assert_eq!(rec.events.len(), 2);
        assert_ne!(traversal.state(), &TraversalState::Done);
    }

    #[test]
    fn test_unknown_grid_variable() {
        let g = graph(&[("x", 2), ("q2", 2)]);
        let grid = GridSpec { x: "x".into(), y: "eta".into() };
        assert!(matches!(
            AlignmentTraversal::new(&g, &grid),
            Err(TraversalError::UnknownGridVariable { ref variable }) if variable == "eta"
        ));
    }
}
