//! The two-channel observer interface the traversal drives.

use super::error::TraversalError;
use crate::binning::BinCoordinate;
use crate::graph::SourceBinGraph;
use crate::payload::{Histos, PayloadStore};

/// State shared with every callback, passed explicitly instead of being
/// captured: the full source set (reference first) and the aligned store.
#[derive(Debug)]
pub struct TraversalContext<'g> {
    pub sources: &'g [SourceBinGraph],
    pub store: PayloadStore<'g>,
}

impl<'g> TraversalContext<'g> {
    pub fn new(sources: &'g [SourceBinGraph], store: PayloadStore<'g>) -> Self {
        Self { sources, store }
    }

    pub fn reference(&self) -> Option<&'g SourceBinGraph> {
        self.sources.first()
    }

    pub fn into_store(self) -> PayloadStore<'g> {
        self.store
    }
}

/// Receives traversal events. Both methods run inline on the traversal's
/// thread; the walk does not advance until they return.
pub trait AlignmentObserver<'g> {
    /// Called once per reference leaf, with the leaf's coordinate and payload.
    /// The store may be written here.
    fn on_leaf(
        &mut self,
        ctx: &mut TraversalContext<'g>,
        coordinate: &BinCoordinate,
        payload: &'g Histos,
    ) -> Result<(), TraversalError>;

    /// Called once every leaf below a subgroup node has been visited. The
    /// store is read-only here.
    fn on_subgroup_complete(&mut self, ctx: &TraversalContext<'g>, subgroup: &BinCoordinate) -> Result<(), TraversalError>;
}
