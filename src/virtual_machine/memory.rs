use crate::virtual_machine::Cell;
use crate::virtual_machine::errors::VMError;
use std::collections::BTreeMap;
use std::ops::Index;

/// How far past the dense buffer a write may land and still grow it.
/// Writes further out go to the sparse map.
pub const DENSE_GROWTH_LIMIT: usize = 1 << 20;

/// Cell storage for one [`Computer`](super::vm::Computer).
///
/// Cells near the program live in a dense buffer that covers the loaded
/// program plus every nearby address written since; writing just past its end
/// grows it and zero-fills the gap. Writes more than [`DENSE_GROWTH_LIMIT`]
/// cells beyond the buffer go to a sparse map instead, so any non-negative
/// address is writable. Unwritten addresses read as zero. Cloning copies
/// every cell, so a cloned memory never observes writes made to the original.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Cell>,
    sparse: BTreeMap<usize, Cell>,
}

impl Memory {
    /// Creates a memory whose first cells are `cells`.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            sparse: BTreeMap::new(),
        }
    }

    /// Returns the current extent of the dense buffer.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.sparse.is_empty()
    }

    /// Returns the dense cells. Far cells held sparsely are not included.
    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of far cells held outside the dense buffer.
    pub fn sparse_len(&self) -> usize {
        self.sparse.len()
    }

    fn index_of(address: Cell) -> Result<usize, VMError> {
        usize::try_from(address).map_err(|_| VMError::NegativeAddress { address })
    }

    /// Reads the cell at `address`, or 0 if it was never written.
    pub fn read(&self, address: Cell) -> Result<Cell, VMError> {
        Ok(self[Self::index_of(address)?])
    }

    /// Stores `value` at `address`, growing the dense buffer when the address
    /// is close enough and using the sparse map otherwise.
    pub fn write(&mut self, address: Cell, value: Cell) -> Result<(), VMError> {
        let index = Self::index_of(address)?;
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value;
            return Ok(());
        }
        if index - self.cells.len() > DENSE_GROWTH_LIMIT {
            self.sparse.insert(index, value);
            return Ok(());
        }

        self.cells.resize(index + 1, 0);
        // Far cells the buffer now covers move into it.
        let covered = self.cells.len();
        let far = self.sparse.split_off(&covered);
        for (at, cell) in std::mem::replace(&mut self.sparse, far) {
            self.cells[at] = cell;
        }
        self.cells[index] = value;
        Ok(())
    }
}

/// Reads a cell by unsigned address; unwritten addresses read as zero.
impl Index<usize> for Memory {
    type Output = Cell;

    fn index(&self, index: usize) -> &Self::Output {
        self.cells
            .get(index)
            .or_else(|| self.sparse.get(&index))
            .unwrap_or(&0)
    }
}
