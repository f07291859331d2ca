//! The persisted form of a source's bin hierarchy.
//!
//! A document lists the binning axes in nesting order and a recursive tree of
//! bin nodes. Nodes on the final level carry the payload for their cell:
//!
//! ```json
//! {
//!   "binning": [{ "variable": "x", "boundaries": [0.01, 0.1, 1.0] }],
//!   "tree": [{ "variable": "x", "bin": 0, "payload": { "name": "x0", "histograms": {} } }]
//! }
//! ```

use crate::binning::{BinAxis, BinCoordinate};
use crate::payload::Histos;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDoc {
    pub variable: String,
    pub boundaries: Vec<f64>,
}

impl From<&BinAxis> for AxisDoc {
    fn from(axis: &BinAxis) -> Self {
        Self { variable: axis.variable().to_string(), boundaries: axis.boundaries().to_vec() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDoc {
    pub variable: String,
    pub bin: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Histos>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub binning: Vec<AxisDoc>,
    #[serde(default)]
    pub tree: Vec<NodeDoc>,
}

impl SourceDocument {
    /// A complete hierarchy over `axes` (outer to inner), with `fill` producing
    /// the payload of every leaf cell.
    pub fn full_grid(axes: &[BinAxis], mut fill: impl FnMut(&BinCoordinate) -> Histos) -> Self {
        let mut coord = BinCoordinate::new();
        let tree = Self::grow(axes, 0, &mut coord, &mut fill);
        Self { binning: axes.iter().map(AxisDoc::from).collect(), tree }
    }

    fn grow(
        axes: &[BinAxis],
        level: usize,
        coord: &mut BinCoordinate,
        fill: &mut impl FnMut(&BinCoordinate) -> Histos,
    ) -> Vec<NodeDoc> {
        let Some(axis) = axes.get(level) else { return Vec::new() };
        let last = level + 1 == axes.len();
        (0..axis.count())
            .map(|bin| {
                coord.push(axis.variable(), bin);
                let node = NodeDoc {
                    variable: axis.variable().to_string(),
                    bin,
                    children: if last { Vec::new() } else { Self::grow(axes, level + 1, coord, fill) },
                    payload: if last { Some(fill(coord)) } else { None },
                };
                coord.pop();
                node
            })
            .collect()
    }

    /// Drops every leaf whose coordinate fails `keep`. Returns how many were removed.
    pub fn retain_leaves(&mut self, mut keep: impl FnMut(&BinCoordinate) -> bool) -> usize {
        let mut coord = BinCoordinate::new();
        Self::prune(&mut self.tree, &mut coord, &mut keep)
    }

    fn prune(nodes: &mut Vec<NodeDoc>, coord: &mut BinCoordinate, keep: &mut impl FnMut(&BinCoordinate) -> bool) -> usize {
        let mut removed = 0;
        nodes.retain_mut(|node| {
            coord.push(&node.variable, node.bin);
            let retain = if node.payload.is_some() {
                let k = keep(coord);
                if !k {
                    removed += 1;
                }
                k
            } else {
                removed += Self::prune(&mut node.children, coord, keep);
                true
            };
            coord.pop();
            retain
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes() -> Vec<BinAxis> {
        vec![
            BinAxis::new("x", vec![0.0, 1.0, 2.0]).unwrap(),
            BinAxis::new("q2", vec![1.0, 10.0, 100.0, 1000.0]).unwrap(),
        ]
    }

    fn count_leaves(nodes: &[NodeDoc]) -> usize {
        nodes
            .iter()
            .map(|n| if n.payload.is_some() { 1 } else { count_leaves(&n.children) })
            .sum()
    }

    #[test]
    fn test_full_grid_shape() {
        let doc = SourceDocument::full_grid(&axes(), |c| Histos::new(c.label()));
        assert_eq!(doc.binning.len(), 2);
        assert_eq!(doc.tree.len(), 2);
        assert_eq!(count_leaves(&doc.tree), 6);
        assert_eq!(doc.tree[1].children[2].payload.as_ref().unwrap().name, "x1_q22");
    }

    #[test]
    fn test_retain_leaves_removes_one_cell() {
        let mut doc = SourceDocument::full_grid(&axes(), |c| Histos::new(c.label()));
        let removed = doc.retain_leaves(|c| !(c.get("x") == Some(1) && c.get("q2") == Some(1)));
        assert_eq!(removed, 1);
        assert_eq!(count_leaves(&doc.tree), 5);
    }

    #[test]
    fn test_document_json_round_trip() {
        let doc = SourceDocument::full_grid(&axes(), |c| Histos::new(c.label()));
        let json = serde_json::to_string(&doc).unwrap();
        let back: SourceDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
