//! store.rs
//! Dense N-source x X-bins x Y-bins container of payload handles.

use super::histos::Histos;
use std::borrow::Cow;

pub use self::error::StoreError;
mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        #[error("Index out of range: (source, x, y) = ({source_index}, {x}, {y}) exceeds ({num_sources}, {num_x}, {num_y})")]
        IndexOutOfRange {
            source_index: usize,
            x: usize,
            y: usize,
            num_sources: usize,
            num_x: usize,
            num_y: usize,
        },
    }
}

/// A payload as held by the store.
///
/// `Borrowed` aliases a leaf owned by one of the loaded source graphs;
/// `Owned` is a copy taken out of a graph.
pub type PayloadHandle<'g> = Cow<'g, Histos>;

/// Aligned payloads for every (source, x, y) cell.
///
/// The layout is cell-major (`(x * num_y + y) * num_sources + source`) so the
/// N-way comparison unit of one grid cell is a contiguous slice.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadStore<'g> {
    num_sources: usize,
    num_x: usize,
    num_y: usize,
    cells: Vec<Option<PayloadHandle<'g>>>,
}

impl<'g> PayloadStore<'g> {
    /// Allocates the store with every cell unset. Dimensions are fixed for its lifetime.
    pub fn allocate(num_sources: usize, num_x: usize, num_y: usize) -> Self {
        Self {
            num_sources,
            num_x,
            num_y,
            cells: vec![None; num_sources * num_x * num_y],
        }
    }

    /// `(num_sources, num_x, num_y)`
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.num_sources, self.num_x, self.num_y)
    }

    fn offset(&self, source_index: usize, x: usize, y: usize) -> Result<usize, StoreError> {
        if source_index >= self.num_sources || x >= self.num_x || y >= self.num_y {
            return Err(StoreError::IndexOutOfRange {
                source_index,
                x,
                y,
                num_sources: self.num_sources,
                num_x: self.num_x,
                num_y: self.num_y,
            });
        }
        Ok((x * self.num_y + y) * self.num_sources + source_index)
    }

    pub fn set(&mut self, source_index: usize, x: usize, y: usize, handle: PayloadHandle<'g>) -> Result<(), StoreError> {
        let idx = self.offset(source_index, x, y)?;
        self.cells[idx] = Some(handle);
        Ok(())
    }

    /// Marks a cell unset again.
    pub fn clear(&mut self, source_index: usize, x: usize, y: usize) -> Result<(), StoreError> {
        let idx = self.offset(source_index, x, y)?;
        self.cells[idx] = None;
        Ok(())
    }

    pub fn get(&self, source_index: usize, x: usize, y: usize) -> Option<&Histos> {
        let idx = self.offset(source_index, x, y).ok()?;
        self.cells[idx].as_deref()
    }

    /// The N handles of one grid cell, ordered by source index. Unset entries are `None`.
    pub fn slice(&self, x: usize, y: usize) -> Result<&[Option<PayloadHandle<'g>>], StoreError> {
        let start = self.offset(0, x, y)?;
        Ok(&self.cells[start..start + self.num_sources])
    }

    /// Number of cells currently holding a payload.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
