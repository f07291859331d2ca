//! Defines the node type of a source bin graph and the handle kinds it hands out.

use petgraph::graph::NodeIndex;

/// A unique, stable identifier for a node within a source graph.
///
/// This is a type alias for `petgraph::graph::NodeIndex` to abstract the
/// underlying graph implementation.
pub type NodeId = NodeIndex;

/// Index into a graph's dense payload table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayloadId(pub u32);

impl PayloadId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// A node of the bin hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinNode {
    /// The unbinned full sample; every graph has exactly one.
    Root,
    /// One bin of the axis at depth `axis`. Nodes on the final level carry a payload.
    Bin { axis: usize, bin: usize, payload: Option<PayloadId> },
}

impl BinNode {
    pub fn payload(&self) -> Option<PayloadId> {
        match self {
            BinNode::Bin { payload, .. } => *payload,
            BinNode::Root => None,
        }
    }

    pub fn bin(&self) -> Option<usize> {
        match self {
            BinNode::Bin { bin, .. } => Some(*bin),
            BinNode::Root => None,
        }
    }
}

/// How a payload lookup hands out its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// A non-owning alias into the graph, valid as long as the graph is borrowed.
    Borrow,
    /// A copy the caller owns outright.
    Owned,
}
