//! dag.rs
//! A source's bin hierarchy held as a petgraph DAG: one level per binning
//! variable, payloads on the final level.

use super::document::{NodeDoc, SourceDocument};
use super::error::{LookupError, SourceError};
use super::node::{Access, BinNode, NodeId, PayloadId};
use crate::binning::{BinAxis, BinCoordinate};
use crate::payload::{Histos, PayloadHandle};
use petgraph::graph::DiGraph;
use petgraph::Direction;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SourceBinGraph {
    title: String,
    axes: Vec<BinAxis>,
    axis_lookup: HashMap<String, usize>,
    graph: DiGraph<BinNode, ()>,
    root: NodeId,
    payloads: Vec<Histos>,
}

impl SourceBinGraph {
    pub fn from_path(title: &str, path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| SourceError::Io {
            title: title.to_string(),
            path: path.to_path_buf(),
            err,
        })?;
        Self::from_reader(title, BufReader::new(file))
    }

    pub fn from_reader(title: &str, reader: impl Read) -> Result<Self, SourceError> {
        let doc: SourceDocument = serde_json::from_reader(reader)
            .map_err(|err| SourceError::Parse { title: title.to_string(), err })?;
        Self::from_document(title, doc)
    }

    /// Builds the graph, checking that every node is described by the binning
    /// metadata and sits on the level its variable was declared at.
    pub fn from_document(title: &str, doc: SourceDocument) -> Result<Self, SourceError> {
        let mut axes = Vec::with_capacity(doc.binning.len());
        let mut axis_lookup = HashMap::new();
        for axis_doc in doc.binning {
            let axis = BinAxis::new(axis_doc.variable, axis_doc.boundaries).map_err(|e| e.in_source(title))?;
            if axis_lookup.insert(axis.variable().to_string(), axes.len()).is_some() {
                return Err(SourceError::malformed(
                    title,
                    format!("variable '{}' declared twice in binning", axis.variable()),
                ));
            }
            axes.push(axis);
        }

        let mut graph = DiGraph::new();
        let root = graph.add_node(BinNode::Root);
        let mut built = Self { title: title.to_string(), axes, axis_lookup, graph, root, payloads: Vec::new() };
        built.insert_level(root, doc.tree, 0)?;

        debug!(
            source = title,
            axes = built.axes.len(),
            nodes = built.graph.node_count(),
            leaves = built.payloads.len(),
            "Built source bin graph"
        );
        Ok(built)
    }

    fn insert_level(&mut self, parent: NodeId, nodes: Vec<NodeDoc>, level: usize) -> Result<(), SourceError> {
        if nodes.is_empty() {
            return Ok(());
        }
        let Some(expected) = self.axes.get(level) else {
            return Err(SourceError::malformed(
                &self.title,
                format!("found {} node(s) below the final binning level", nodes.len()),
            ));
        };
        let expected_variable = expected.variable().to_string();
        let last = level + 1 == self.axes.len();
        let mut seen = HashSet::new();

        for node in nodes {
            let Some(&axis) = self.axis_lookup.get(&node.variable) else {
                return Err(SourceError::malformed(
                    &self.title,
                    format!("no bin metadata for variable '{}'", node.variable),
                ));
            };
            if axis != level {
                return Err(SourceError::malformed(
                    &self.title,
                    format!("node binned on '{}' at depth {}, expected '{}'", node.variable, level, expected_variable),
                ));
            }
            let count = self.axes[axis].count();
            if node.bin >= count {
                return Err(SourceError::malformed(
                    &self.title,
                    format!("bin {} of '{}' exceeds axis count {}", node.bin, node.variable, count),
                ));
            }
            if !seen.insert(node.bin) {
                return Err(SourceError::malformed(
                    &self.title,
                    format!("duplicate bin {} of '{}' under one parent", node.bin, node.variable),
                ));
            }

            let payload = match (last, node.payload) {
                (true, Some(histos)) => {
                    let id = PayloadId::new(self.payloads.len());
                    self.payloads.push(histos);
                    Some(id)
                }
                (true, None) => {
                    return Err(SourceError::malformed(
                        &self.title,
                        format!("leaf bin {} of '{}' has no payload", node.bin, node.variable),
                    ))
                }
                (false, Some(_)) => {
                    return Err(SourceError::malformed(
                        &self.title,
                        format!("inner bin {} of '{}' carries a payload", node.bin, node.variable),
                    ))
                }
                (false, None) => {
                    if node.children.is_empty() {
                        debug!(
                            source = %self.title,
                            variable = %node.variable,
                            bin = node.bin,
                            "Inner bin has no children; its subgroup will render without data"
                        );
                    }
                    None
                }
            };

            let id = self.graph.add_node(BinNode::Bin { axis, bin: node.bin, payload });
            self.graph.add_edge(parent, id, ());
            self.insert_level(id, node.children, level + 1)?;
        }
        Ok(())
    }

    pub fn title(&self) -> &str { &self.title }
    pub fn root(&self) -> NodeId { self.root }
    pub fn axes(&self) -> &[BinAxis] { &self.axes }
    pub fn node(&self, id: NodeId) -> &BinNode { &self.graph[id] }
    pub fn node_count(&self) -> usize { self.graph.node_count() }
    pub fn leaf_count(&self) -> usize { self.payloads.len() }
    pub fn payload(&self, id: PayloadId) -> &Histos { &self.payloads[id.index()] }

    /// Resolves the axis binned on `variable`.
    pub fn get_axis(&self, variable: &str) -> Result<&BinAxis, LookupError> {
        self.axis_lookup
            .get(variable)
            .map(|&i| &self.axes[i])
            .ok_or_else(|| LookupError::UnknownVariable { variable: variable.to_string() })
    }

    /// Nesting depth of `variable` (0 = outermost).
    pub fn depth_of(&self, variable: &str) -> Option<usize> {
        self.axis_lookup.get(variable).copied()
    }

    /// The axis a bin node belongs to.
    pub fn axis_of(&self, id: NodeId) -> Option<&BinAxis> {
        match self.graph[id] {
            BinNode::Bin { axis, .. } => self.axes.get(axis),
            BinNode::Root => None,
        }
    }

    /// Children of `id`, ordered by bin index.
    pub fn children(&self, id: NodeId) -> SmallVec<[NodeId; 8]> {
        let mut children: SmallVec<[NodeId; 8]> = self.graph.neighbors_directed(id, Direction::Outgoing).collect();
        children.sort_by_key(|&c| self.graph[c].bin());
        children
    }

    fn child_with_bin(&self, id: NodeId, bin: usize) -> Option<NodeId> {
        self.graph
            .neighbors_directed(id, Direction::Outgoing)
            .find(|&c| self.graph[c].bin() == Some(bin))
    }

    /// Finds the payload at `coordinate` by walking this graph's own levels.
    ///
    /// Components are matched by variable name, so the coordinate may come from
    /// a graph that resolved its variables in a different order.
    pub fn get_payload(&self, coordinate: &BinCoordinate, access: Access) -> Result<PayloadHandle<'_>, LookupError> {
        let mut node = self.root;
        for axis in &self.axes {
            let index = coordinate.require(axis.variable())?;
            if index >= axis.count() {
                return Err(LookupError::CoordinateOutOfRange {
                    variable: axis.variable().to_string(),
                    index,
                    count: axis.count(),
                });
            }
            node = self.child_with_bin(node, index).ok_or_else(|| LookupError::StructuralMismatch {
                variable: axis.variable().to_string(),
                coordinate: coordinate.to_string(),
                reason: format!("no node for bin {}", index),
            })?;
        }

        let id = self.graph[node].payload().ok_or_else(|| LookupError::StructuralMismatch {
            variable: String::new(),
            coordinate: coordinate.to_string(),
            reason: "resolved node holds no payload".to_string(),
        })?;
        let histos = self.payload(id);
        Ok(match access {
            Access::Borrow => Cow::Borrowed(histos),
            Access::Owned => Cow::Owned(histos.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AxisDoc;
    use rstest::rstest;

    fn axes() -> Vec<BinAxis> {
        vec![
            BinAxis::new("x", vec![0.01, 0.1, 1.0]).unwrap(),
            BinAxis::new("q2", vec![1.0, 10.0, 100.0]).unwrap(),
        ]
    }

    fn full() -> SourceBinGraph {
        let doc = SourceDocument::full_grid(&axes(), |c| Histos::new(c.label()));
        SourceBinGraph::from_document("ref", doc).unwrap()
    }

    #[test]
    fn test_build_full_grid() {
        let g = full();
        assert_eq!(g.leaf_count(), 4);
        // root + 2 x bins + 4 q2 bins
        assert_eq!(g.node_count(), 7);
        assert_eq!(g.get_axis("q2").unwrap().count(), 2);
        assert_eq!(g.depth_of("x"), Some(0));
        assert_eq!(g.depth_of("q2"), Some(1));
    }

    #[test]
    fn test_children_sorted_by_bin() {
        let g = full();
        let bins: Vec<_> = g.children(g.root()).iter().map(|&c| g.node(c).bin()).collect();
        assert_eq!(bins, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_unknown_axis() {
        let err = full().get_axis("eta").unwrap_err();
        assert_eq!(err, LookupError::UnknownVariable { variable: "eta".into() });
    }

    #[test]
    fn test_get_payload_borrow_and_owned() {
        let g = full();
        let coord = BinCoordinate::from_pairs([("x", 1), ("q2", 0)]);
        let borrowed = g.get_payload(&coord, Access::Borrow).unwrap();
        assert!(matches!(borrowed, Cow::Borrowed(_)));
        assert_eq!(borrowed.name, "x1_q20");
        let owned = g.get_payload(&coord, Access::Owned).unwrap();
        assert!(matches!(owned, Cow::Owned(_)));
        assert_eq!(owned.name, "x1_q20");
    }

    #[test]
    fn test_get_payload_matches_by_name_not_order() {
        let g = full();
        let coord = BinCoordinate::from_pairs([("q2", 1), ("x", 0)]);
        assert_eq!(g.get_payload(&coord, Access::Borrow).unwrap().name, "x0_q21");
    }

    #[test]
    fn test_get_payload_out_of_range() {
        let coord = BinCoordinate::from_pairs([("x", 0), ("q2", 2)]);
        let err = full().get_payload(&coord, Access::Borrow).unwrap_err();
        assert_eq!(err, LookupError::CoordinateOutOfRange { variable: "q2".into(), index: 2, count: 2 });
    }

    #[test]
    fn test_get_payload_missing_leaf_is_structural_mismatch() {
        let mut doc = SourceDocument::full_grid(&axes(), |c| Histos::new(c.label()));
        doc.retain_leaves(|c| c.label() != "x1_q21");
        let g = SourceBinGraph::from_document("other", doc).unwrap();
        let coord = BinCoordinate::from_pairs([("x", 1), ("q2", 1)]);
        let err = g.get_payload(&coord, Access::Borrow).unwrap_err();
        assert!(matches!(err, LookupError::StructuralMismatch { ref variable, .. } if variable == "q2"));
    }

    #[test]
    fn test_get_payload_coordinate_without_variable() {
        let coord = BinCoordinate::from_pairs([("x", 0)]);
        let err = full().get_payload(&coord, Access::Borrow).unwrap_err();
        assert!(matches!(err, LookupError::StructuralMismatch { .. }));
    }

    fn leaf(variable: &str, bin: usize) -> NodeDoc {
        NodeDoc { variable: variable.into(), bin, children: vec![], payload: Some(Histos::new("h")) }
    }

    fn inner(variable: &str, bin: usize, children: Vec<NodeDoc>) -> NodeDoc {
        NodeDoc { variable: variable.into(), bin, children, payload: None }
    }

    fn binning() -> Vec<AxisDoc> {
        axes().iter().map(AxisDoc::from).collect()
    }

    #[rstest]
    #[case::undeclared_variable(vec![inner("eta", 0, vec![])])]
    #[case::wrong_level(vec![inner("q2", 0, vec![])])]
    #[case::bin_beyond_count(vec![inner("x", 5, vec![])])]
    #[case::duplicate_bin(vec![inner("x", 0, vec![]), inner("x", 0, vec![])])]
    #[case::leaf_without_payload(vec![inner("x", 0, vec![inner("q2", 0, vec![])])])]
    #[case::inner_with_payload(vec![leaf("x", 0)])]
    #[case::below_final_level(vec![inner("x", 0, vec![NodeDoc {
        variable: "q2".into(), bin: 0, children: vec![leaf("q2", 1)], payload: Some(Histos::new("h")),
    }])])]
    fn test_malformed_documents(#[case] tree: Vec<NodeDoc>) {
        let doc = SourceDocument { binning: binning(), tree };
        let err = SourceBinGraph::from_document("bad", doc).unwrap_err();
        assert!(matches!(err, SourceError::MalformedSource { ref title, .. } if title == "bad"), "got {err}");
    }

    #[test]
    fn test_inner_bin_without_children_is_accepted() {
        let tree = vec![inner("x", 0, vec![]), inner("x", 1, vec![leaf("q2", 0), leaf("q2", 1)])];
        let g = SourceBinGraph::from_document("sparse", SourceDocument { binning: binning(), tree }).unwrap();
        assert_eq!(g.leaf_count(), 2);
        let x_bins = g.children(g.root());
        assert_eq!(x_bins.len(), 2);
        assert!(g.children(x_bins[0]).is_empty());
        let coord = BinCoordinate::from_pairs([("x", 0), ("q2", 0)]);
        assert!(matches!(g.get_payload(&coord, Access::Borrow), Err(LookupError::StructuralMismatch { .. })));
    }

    #[test]
    fn test_duplicate_axis_declaration() {
        let mut b = binning();
        b.push(b[0].clone());
        let err = SourceBinGraph::from_document("dup", SourceDocument { binning: b, tree: vec![] }).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_from_reader_parse_error() {
        let err = SourceBinGraph::from_reader("junk", "{ not json".as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = SourceBinGraph::from_path("gone", "/nonexistent/source.json").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn test_from_path_round_trip() {
        let doc = SourceDocument::full_grid(&axes(), |c| Histos::new(c.label()));
        let file = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(file.as_file(), &doc).unwrap();
        let g = SourceBinGraph::from_path("disk", file.path()).unwrap();
        assert_eq!(g.title(), "disk");
        assert_eq!(g.leaf_count(), 4);
    }
}
