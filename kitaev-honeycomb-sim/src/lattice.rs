//! Honeycomb unit cells on a sheared torus.
//!
//! The lattice has N = L1·L2 unit cells, each holding one A and one B site.
//! Cells are addressed by (x, y) with x ∈ [0, L1), y ∈ [0, L2) and stored
//! linearly as `x + L1·y`.
//!
//! The boundary is periodic with a skew M: stepping L2 cells along e2 lands
//! M cells back along e1, i.e. the torus is R² modulo the lattice spanned by
//! (L1, 0) and (M, L2):
//!
//! ```text
//! x' = (x - M·⌊y / L2⌋) mod L1
//! y' = y mod L2
//! ```
//!
//! Floor and mod are Euclidean, so negative displacements wrap the same way
//! positive ones do.

use crate::error::{KitaevError, Result};

/// Immutable lattice parameters (L1, L2, M).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lattice {
    l1: usize,
    l2: usize,
    m: usize,
}

impl Lattice {
    /// Validate and build a lattice. Requires `L1 > 0`, `L2 > 0`, `M < L1`.
    pub fn new(l1: usize, l2: usize, m: usize) -> Result<Self> {
        let reason = if l1 == 0 {
            Some("L1 must be positive")
        } else if l2 == 0 {
            Some("L2 must be positive")
        } else if m >= l1 {
            Some("M must be smaller than L1")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(KitaevError::InvalidGeometry { l1, l2, m, reason }),
            None => Ok(Self { l1, l2, m }),
        }
    }

    /// Extent along e1.
    pub fn l1(&self) -> usize {
        self.l1
    }

    /// Extent along e2.
    pub fn l2(&self) -> usize {
        self.l2
    }

    /// Boundary skew M.
    pub fn skew(&self) -> usize {
        self.m
    }

    /// Number of unit cells (= hexagonal plaquettes).
    pub fn num_cells(&self) -> usize {
        self.l1 * self.l2
    }

    /// Linear index of the cell at integer coordinate (x, y), wrapping any
    /// coordinate back onto the torus.
    pub fn index(&self, x: i64, y: i64) -> usize {
        let (l1, l2, m) = (self.l1 as i64, self.l2 as i64, self.m as i64);
        let wraps = y.div_euclid(l2);
        let x = (x - m * wraps).rem_euclid(l1);
        let y = y.rem_euclid(l2);
        (x + l1 * y) as usize
    }

    /// Canonical coordinate of a cell.
    pub fn position(&self, cell: usize) -> Result<(usize, usize)> {
        self.check(cell)?;
        Ok((cell % self.l1, cell / self.l1))
    }

    /// Index of the cell displaced by (dx, dy) from `cell`.
    pub fn displaced(&self, cell: usize, (dx, dy): (i64, i64)) -> Result<usize> {
        let (x, y) = self.position(cell)?;
        Ok(self.index(x as i64 + dx, y as i64 + dy))
    }

    /// Nearest neighbour cell along e1.
    pub fn nn1(&self, cell: usize) -> Result<usize> {
        self.displaced(cell, (1, 0))
    }

    /// Nearest neighbour cell along e2.
    pub fn nn2(&self, cell: usize) -> Result<usize> {
        self.displaced(cell, (0, 1))
    }

    /// `[nn1, nn2]` for every cell, in cell order.
    pub fn neighbor_table(&self) -> Vec<[usize; 2]> {
        (0..self.num_cells())
            .map(|cell| {
                let (x, y) = (cell % self.l1, cell / self.l1);
                let (x, y) = (x as i64, y as i64);
                [self.index(x + 1, y), self.index(x, y + 1)]
            })
            .collect()
    }

    /// Topological sign (-1)^θ of the boundary, θ = L1 + L2 + M(L1 - M) mod 2.
    pub fn boundary_sign(&self) -> f64 {
        let theta = (self.l1 + self.l2 + self.m * (self.l1 - self.m)) % 2;
        if theta == 0 {
            1.0
        } else {
            -1.0
        }
    }

    fn check(&self, cell: usize) -> Result<()> {
        if cell < self.num_cells() {
            Ok(())
        } else {
            Err(KitaevError::CellOutOfRange {
                index: cell,
                cells: self.num_cells(),
            })
        }
    }
}
