//! Flux patterns: which hexagonal plaquettes carry a vortex.
//!
//! Plaquettes are labelled by unit cell, so a pattern is one flag per cell.
//! On a closed surface vortices are created in pairs and every realizable
//! pattern has even weight.
//!
//! Patterns order lexicographically with cell 0 most significant, which is
//! also the numeric order of [`VortexConfig::code`].

use std::fmt;

use crate::error::{KitaevError, Result};
use crate::lattice::Lattice;

/// One flag per plaquette; `true` = vortex present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VortexConfig {
    flags: Vec<bool>,
}

impl VortexConfig {
    pub fn new(flags: Vec<bool>) -> Self {
        Self { flags }
    }

    /// Vortex-free pattern on `n` plaquettes.
    pub fn empty(n: usize) -> Self {
        Self {
            flags: vec![false; n],
        }
    }

    /// Pattern with vortices on the listed cells (listing a cell twice
    /// annihilates the pair).
    pub fn from_cells(n: usize, cells: &[usize]) -> Result<Self> {
        let mut flags = vec![false; n];
        for &cell in cells {
            let flag = flags
                .get_mut(cell)
                .ok_or(KitaevError::CellOutOfRange { index: cell, cells: n })?;
            *flag ^= true;
        }
        Ok(Self { flags })
    }

    /// Decode from an integer whose most significant of `n` bits is cell 0.
    pub fn from_code(n: usize, code: u64) -> Self {
        let flags = (0..n).map(|i| (code >> (n - 1 - i)) & 1 == 1).collect();
        Self { flags }
    }

    /// Inverse of [`VortexConfig::from_code`]; `None` for patterns longer
    /// than 63 plaquettes.
    pub fn code(&self) -> Option<u64> {
        if self.flags.len() >= 64 {
            return None;
        }
        Some(self.flags.iter().fold(0u64, |acc, &f| (acc << 1) | f as u64))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn has_vortex(&self, cell: usize) -> Result<bool> {
        self.flags.get(cell).copied().ok_or(KitaevError::CellOutOfRange {
            index: cell,
            cells: self.flags.len(),
        })
    }

    /// Number of vortices.
    pub fn weight(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    pub fn is_even(&self) -> bool {
        self.weight() % 2 == 0
    }

    /// Cells carrying a vortex, ascending.
    pub fn vortex_cells(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
            .collect()
    }

    /// Check that the pattern fits `lattice` and has even weight.
    pub fn validate(&self, lattice: &Lattice) -> Result<()> {
        if self.len() != lattice.num_cells() {
            return Err(KitaevError::VortexLengthMismatch {
                expected: lattice.num_cells(),
                actual: self.len(),
            });
        }
        if !self.is_even() {
            return Err(KitaevError::OddVortexParity {
                weight: self.weight(),
                config: self.to_string(),
            });
        }
        Ok(())
    }

    /// Vortex cells paired in encountered order: (c0, c1), (c2, c3), …
    pub fn pairs(&self) -> Result<Vec<(usize, usize)>> {
        if !self.is_even() {
            return Err(KitaevError::OddVortexParity {
                weight: self.weight(),
                config: self.to_string(),
            });
        }
        Ok(self
            .vortex_cells()
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect())
    }

    /// The pattern moved rigidly by (dx, dy): the flag of cell c ends up on
    /// cell c + (dx, dy).
    pub fn translated(&self, lattice: &Lattice, shift: (i64, i64)) -> Result<Self> {
        if self.len() != lattice.num_cells() {
            return Err(KitaevError::VortexLengthMismatch {
                expected: lattice.num_cells(),
                actual: self.len(),
            });
        }
        let mut flags = vec![false; self.len()];
        for (cell, &flag) in self.flags.iter().enumerate() {
            flags[lattice.displaced(cell, shift)?] = flag;
        }
        Ok(Self { flags })
    }
}

impl fmt::Display for VortexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, &flag) in self.flags.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", flag as u8)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tuple_style() {
        let v = VortexConfig::new(vec![false, true, true, false]);
        assert_eq!(v.to_string(), "(0, 1, 1, 0)");
    }

    #[test]
    fn test_code_puts_cell_zero_first() {
        let v = VortexConfig::from_code(3, 0b100);
        assert_eq!(v.flags(), &[true, false, false]);
        assert_eq!(v.code(), Some(0b100));
        for code in 0..64u64 {
            assert_eq!(VortexConfig::from_code(6, code).code(), Some(code));
        }
    }

    #[test]
    fn test_ordering_matches_code_order() {
        let a = VortexConfig::from_code(5, 0b00110);
        let b = VortexConfig::from_code(5, 0b01001);
        assert!(a < b);
        assert!(VortexConfig::empty(5) < a);
    }

    #[test]
    fn test_pairs_in_encountered_order() {
        let v = VortexConfig::from_cells(6, &[4, 1, 2, 5]).unwrap();
        assert_eq!(v.pairs().unwrap(), vec![(1, 2), (4, 5)]);
    }

    #[test]
    fn test_repeated_cell_annihilates() {
        let v = VortexConfig::from_cells(4, &[2, 2]).unwrap();
        assert_eq!(v.weight(), 0);
        assert!(VortexConfig::from_cells(4, &[4]).is_err());
    }

    #[test]
    fn test_has_vortex_checks_range() {
        let v = VortexConfig::from_cells(4, &[1, 2]).unwrap();
        assert_eq!(v.has_vortex(1), Ok(true));
        assert_eq!(v.has_vortex(3), Ok(false));
        assert_eq!(
            VortexConfig::empty(4).has_vortex(99),
            Err(KitaevError::CellOutOfRange { index: 99, cells: 4 })
        );
    }

    #[test]
    fn test_odd_weight_rejected() {
        let lat = Lattice::new(2, 2, 0).unwrap();
        let v = VortexConfig::from_cells(4, &[1]).unwrap();
        match v.validate(&lat) {
            Err(KitaevError::OddVortexParity { weight, config }) => {
                assert_eq!(weight, 1);
                assert_eq!(config, "(0, 1, 0, 0)");
            }
            other => panic!("expected parity error, got {:?}", other),
        }
        assert!(v.pairs().is_err());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let lat = Lattice::new(3, 2, 1).unwrap();
        assert_eq!(
            VortexConfig::empty(5).validate(&lat),
            Err(KitaevError::VortexLengthMismatch { expected: 6, actual: 5 })
        );
    }

    #[test]
    fn test_empty_pattern_is_valid() {
        let lat = Lattice::new(3, 3, 2).unwrap();
        assert!(VortexConfig::empty(9).validate(&lat).is_ok());
    }

    #[test]
    fn test_translation_moves_vortices() {
        let lat = Lattice::new(3, 2, 1).unwrap();
        let v = VortexConfig::from_cells(6, &[0, 4]).unwrap();
        let moved = v.translated(&lat, (1, 0)).unwrap();
        assert_eq!(moved.vortex_cells(), vec![1, 5]);
        // (1,1) + e2 wraps to (0,0); (0,0) + e2 = (0,1)
        let up = v.translated(&lat, (0, 1)).unwrap();
        assert_eq!(up.vortex_cells(), vec![0, 3]);
        assert_eq!(up.weight(), v.weight());
    }

    #[test]
    fn test_translation_by_period_is_identity() {
        let lat = Lattice::new(4, 2, 3).unwrap();
        let v = VortexConfig::from_code(8, 0b1001_0110);
        assert_eq!(v.translated(&lat, (4, 0)).unwrap(), v);
        assert_eq!(v.translated(&lat, (3, 2)).unwrap(), v);
    }
}
