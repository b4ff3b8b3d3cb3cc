use thiserror::Error;

use crate::cell::{Cell, CellDecodeError, CELL_BYTES};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cannot allocate a {width}x{height} grid")]
    Alloc { width: u16, height: u16 },
    #[error("packed grid is {found} bytes, expected {expected}")]
    Length { expected: usize, found: usize },
    #[error("cell {index} is malformed: {source}")]
    Decode {
        index: usize,
        #[source]
        source: CellDecodeError,
    },
}

/// Dense `width * height` matrix of cells, stored row-major in one buffer.
///
/// Coordinates passed to [`Grid::cell_at`] and [`Grid::cell_at_mut`] must be
/// validated by the caller; use [`Grid::get`] for checked access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn create(width: u16, height: u16) -> Result<Self, GridError> {
        Self::filled(width, height, Cell::default())
    }

    pub fn filled(width: u16, height: u16, cell: Cell) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Alloc { width, height });
        }
        let len = width as usize * height as usize;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| GridError::Alloc { width, height })?;
        cells.resize(len, cell);
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Reset every cell without reallocating.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn index_of(&self, x: u16, y: u16) -> usize {
        debug_assert!(self.in_bounds(x, y), "({x}, {y}) outside grid");
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn xy_of(&self, index: usize) -> (u16, u16) {
        let w = self.width as usize;
        ((index % w) as u16, (index / w) as u16)
    }

    #[inline]
    pub fn cell_at(&self, x: u16, y: u16) -> &Cell {
        &self.cells[self.index_of(x, y)]
    }

    #[inline]
    pub fn cell_at_mut(&mut self, x: u16, y: u16) -> &mut Cell {
        let index = self.index_of(x, y);
        &mut self.cells[index]
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| self.cell_at(x, y))
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            Some(self.cell_at_mut(x, y))
        } else {
            None
        }
    }

    /// Row-major walk yielding coordinates with each cell.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &Cell)> + '_ {
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let (x, y) = self.xy_of(index);
            (x, y, cell)
        })
    }

    pub fn packed_len(&self) -> usize {
        self.cells.len() * CELL_BYTES
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.packed_len()];
        for (cell, chunk) in self.cells.iter().zip(out.chunks_exact_mut(CELL_BYTES)) {
            cell.pack(chunk);
        }
        out
    }

    /// Rebuild a grid from [`Grid::pack`] output. Selection flags come back cleared.
    pub fn unpack(width: u16, height: u16, bytes: &[u8]) -> Result<Self, GridError> {
        let mut grid = Self::create(width, height)?;
        let expected = grid.packed_len();
        if bytes.len() != expected {
            return Err(GridError::Length {
                expected,
                found: bytes.len(),
            });
        }
        for (index, (cell, chunk)) in grid
            .cells
            .iter_mut()
            .zip(bytes.chunks_exact(CELL_BYTES))
            .enumerate()
        {
            *cell = Cell::unpack(chunk).map_err(|source| GridError::Decode { index, source })?;
        }
        Ok(grid)
    }

    /// Cell-by-cell [`Cell::persisted_eq`].
    pub fn persisted_eq(&self, other: &Grid) -> bool {
        self.width == other.width
            && self.height == other.height
            && self
                .cells
                .iter()
                .zip(&other.cells)
                .all(|(a, b)| a.persisted_eq(b))
    }
}
