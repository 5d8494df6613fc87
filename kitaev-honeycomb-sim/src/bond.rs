//! Signed bond couplings of the honeycomb lattice.
//!
//! Unit cell i holds an A site and a B site. Its three bonds all leave A_i:
//! - **z**: A_i - B_i
//! - **x**: A_i - B_{i+e1}
//! - **y**: A_i - B_{i+e2}
//!
//! In the Majorana representation every bond carries a Z₂ gauge field
//! u = ±1. A configuration stores the coupling magnitudes once and a flip
//! flag per bond, so magnitudes can never drift while signs are toggled.
//!
//! Flipping the y-bond of cell b toggles the flux through plaquettes b and
//! b-e1; flipping the x-bond of cell b toggles plaquettes b and b-e2. A
//! string of flips along a row and then a column therefore moves flux from
//! one plaquette to another, and a string that winds the torus inserts a
//! Wilson loop without creating any vortex.

use crate::error::{KitaevError, Result};
use crate::lattice::Lattice;
use crate::vortex::VortexConfig;

/// Bond direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondType {
    X,
    Y,
    Z,
}

impl BondType {
    pub const ALL: [BondType; 3] = [BondType::X, BondType::Y, BondType::Z];

    fn slot(self) -> usize {
        match self {
            BondType::X => 0,
            BondType::Y => 1,
            BondType::Z => 2,
        }
    }
}

/// Coupling magnitudes Jx, Jy, Jz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Couplings {
    pub jx: f64,
    pub jy: f64,
    pub jz: f64,
}

impl Default for Couplings {
    fn default() -> Self {
        Self {
            jx: 1.0,
            jy: 1.0,
            jz: 1.0,
        }
    }
}

impl Couplings {
    /// Jx = Jy = 1 with the given Jz (i.e. Jz/Jx).
    pub fn with_jz(jz: f64) -> Self {
        Self {
            jz,
            ..Self::default()
        }
    }

    pub fn get(&self, bond: BondType) -> f64 {
        match bond {
            BondType::X => self.jx,
            BondType::Y => self.jy,
            BondType::Z => self.jz,
        }
    }
}

/// Global flux sector: which non-contractible Wilson loops are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WilsonLoop {
    /// Sector 0.
    None,
    /// Sector 1: loop winding L1·e1.
    E1,
    /// Sector 2: loop winding M·e1 + L2·e2.
    Skewed,
    /// Sector 3: both loops.
    Both,
}

impl WilsonLoop {
    pub const ALL: [WilsonLoop; 4] = [
        WilsonLoop::None,
        WilsonLoop::E1,
        WilsonLoop::Skewed,
        WilsonLoop::Both,
    ];

    pub fn index(self) -> u8 {
        match self {
            WilsonLoop::None => 0,
            WilsonLoop::E1 => 1,
            WilsonLoop::Skewed => 2,
            WilsonLoop::Both => 3,
        }
    }

    pub fn from_index(index: u8) -> Result<Self> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(KitaevError::InvalidLoop(index))
    }

    fn winds_e1(self) -> bool {
        matches!(self, WilsonLoop::E1 | WilsonLoop::Both)
    }

    fn winds_skewed(self) -> bool {
        matches!(self, WilsonLoop::Skewed | WilsonLoop::Both)
    }
}

impl TryFrom<u8> for WilsonLoop {
    type Error = KitaevError;

    fn try_from(index: u8) -> Result<Self> {
        Self::from_index(index)
    }
}

/// Bond couplings of one (Wilson loop, vortex) sector.
#[derive(Debug, Clone)]
pub struct BondConfig {
    lattice: Lattice,
    couplings: Couplings,
    wilson_loop: WilsonLoop,
    flipped: Vec<[bool; 3]>,
}

impl BondConfig {
    /// Uniform couplings with the requested Wilson loops inserted.
    pub fn new(lattice: &Lattice, couplings: Couplings, wilson_loop: WilsonLoop) -> Self {
        let mut config = Self {
            lattice: *lattice,
            couplings,
            wilson_loop,
            flipped: vec![[false; 3]; lattice.num_cells()],
        };
        if wilson_loop.winds_e1() {
            config.insert_loop_e1();
        }
        if wilson_loop.winds_skewed() {
            config.insert_loop_skewed();
        }
        config
    }

    /// Loop sector plus a vortex pattern, built in that order.
    pub fn with_vortices(
        lattice: &Lattice,
        couplings: Couplings,
        wilson_loop: WilsonLoop,
        vortices: &VortexConfig,
    ) -> Result<Self> {
        let mut config = Self::new(lattice, couplings, wilson_loop);
        config.create_vortices(vortices)?;
        Ok(config)
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn couplings(&self) -> Couplings {
        self.couplings
    }

    pub fn wilson_loop(&self) -> WilsonLoop {
        self.wilson_loop
    }

    /// Signed coupling of a bond.
    pub fn coupling(&self, cell: usize, bond: BondType) -> Result<f64> {
        self.check(cell)?;
        Ok(self.signed(cell, bond))
    }

    pub fn is_flipped(&self, cell: usize, bond: BondType) -> Result<bool> {
        self.check(cell)?;
        Ok(self.flipped[cell][bond.slot()])
    }

    /// Unchecked [`BondConfig::coupling`] for cells known to be in range.
    pub(crate) fn signed(&self, cell: usize, bond: BondType) -> f64 {
        let magnitude = self.couplings.get(bond);
        if self.flipped[cell][bond.slot()] {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Number of bonds whose sign has been flipped.
    pub fn num_flipped(&self) -> usize {
        self.flipped.iter().flatten().filter(|&&f| f).count()
    }

    /// Flip the sign of a single bond.
    pub fn flip(&mut self, cell: usize, bond: BondType) -> Result<()> {
        self.check(cell)?;
        self.toggle(cell, bond);
        Ok(())
    }

    fn check(&self, cell: usize) -> Result<()> {
        if cell < self.flipped.len() {
            Ok(())
        } else {
            Err(KitaevError::CellOutOfRange {
                index: cell,
                cells: self.flipped.len(),
            })
        }
    }

    fn toggle(&mut self, cell: usize, bond: BondType) {
        self.flipped[cell][bond.slot()] ^= true;
    }

    /// Wilson loop along L1·e1: y-bonds of row 0.
    fn insert_loop_e1(&mut self) {
        for x in 0..self.lattice.l1() as i64 {
            let cell = self.lattice.index(x, 0);
            self.toggle(cell, BondType::Y);
        }
    }

    /// Wilson loop along M·e1 + L2·e2: x-bonds of column 0, closed across
    /// the skewed boundary by M y-bonds of the top row.
    fn insert_loop_skewed(&mut self) {
        let top = self.lattice.l2() as i64 - 1;
        for y in 0..self.lattice.l2() as i64 {
            let cell = self.lattice.index(0, y);
            self.toggle(cell, BondType::X);
        }
        for x in 0..self.lattice.skew() as i64 {
            let cell = self.lattice.index(x + 1, top);
            self.toggle(cell, BondType::Y);
        }
    }

    /// Create (or annihilate) vortices on plaquettes `i` and `j`.
    ///
    /// The string runs along row y_i from x_i to x_j, then along column x_j
    /// from y_i to y_j. It never crosses the boundary of the fundamental
    /// domain, so strings for the same endpoints differ by a contractible
    /// loop (a gauge transformation).
    pub fn create_vortex_pair(&mut self, i: usize, j: usize) -> Result<()> {
        let (xi, yi) = self.lattice.position(i)?;
        let (xj, yj) = self.lattice.position(j)?;
        self.flip_row_string(xi, xj, yi);
        self.flip_column_string(xj, yi, yj);
        Ok(())
    }

    /// y-bonds of cells (x+1, y) for x between x1 and x2.
    fn flip_row_string(&mut self, x1: usize, x2: usize, y: usize) {
        let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        for x in lo..hi {
            let cell = self.lattice.index(x as i64 + 1, y as i64);
            self.toggle(cell, BondType::Y);
        }
    }

    /// x-bonds of cells (x, y+1) for y between y1 and y2.
    fn flip_column_string(&mut self, x: usize, y1: usize, y2: usize) {
        let (lo, hi) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        for y in lo..hi {
            let cell = self.lattice.index(x as i64, y as i64 + 1);
            self.toggle(cell, BondType::X);
        }
    }

    /// Realize a whole vortex pattern, pairing vortices in cell order.
    ///
    /// The pattern is validated before any bond is touched.
    pub fn create_vortices(&mut self, vortices: &VortexConfig) -> Result<()> {
        vortices.validate(&self.lattice)?;
        for (i, j) in vortices.pairs()? {
            self.create_vortex_pair(i, j)?;
        }
        Ok(())
    }

    /// Product of the signs of all nonzero couplings.
    pub fn sign_product(&self) -> f64 {
        let mut negative = false;
        for flags in &self.flipped {
            for bond in BondType::ALL {
                let magnitude = self.couplings.get(bond);
                if magnitude != 0.0 {
                    negative ^= (magnitude < 0.0) ^ flags[bond.slot()];
                }
            }
        }
        if negative {
            -1.0
        } else {
            1.0
        }
    }

    /// Flux through every plaquette, read back from the bond signs.
    ///
    /// Plaquette p is bounded by x(p), x(p+e2), y(p), y(p+e1), z(p+e1) and
    /// z(p+e2). Each coupling type appears twice, so uniform couplings carry
    /// no flux whatever their signs; a vortex sits wherever an odd number of
    /// those six bonds is flipped.
    pub fn vortex_pattern(&self) -> VortexConfig {
        let flags = self
            .lattice
            .neighbor_table()
            .iter()
            .enumerate()
            .map(|(p, &[e1, e2])| {
                let ring = [
                    self.flipped[p][0],
                    self.flipped[e2][0],
                    self.flipped[p][1],
                    self.flipped[e1][1],
                    self.flipped[e1][2],
                    self.flipped[e2][2],
                ];
                ring.iter().filter(|&&f| f).count() % 2 == 1
            })
            .collect();
        VortexConfig::new(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattices() -> Vec<Lattice> {
        [(2, 2, 0), (3, 2, 1), (3, 3, 0), (4, 3, 2), (4, 2, 3), (5, 2, 4)]
            .iter()
            .map(|&(l1, l2, m)| Lattice::new(l1, l2, m).unwrap())
            .collect()
    }

    #[test]
    fn test_uniform_construction() {
        let lat = Lattice::new(3, 2, 1).unwrap();
        let bonds = BondConfig::new(&lat, Couplings::with_jz(0.5), WilsonLoop::None);
        for cell in 0..lat.num_cells() {
            assert_eq!(bonds.coupling(cell, BondType::X).unwrap(), 1.0);
            assert_eq!(bonds.coupling(cell, BondType::Y).unwrap(), 1.0);
            assert_eq!(bonds.coupling(cell, BondType::Z).unwrap(), 0.5);
        }
        assert_eq!(bonds.num_flipped(), 0);
    }

    #[test]
    fn test_loop_flip_counts() {
        let lat = Lattice::new(4, 3, 2).unwrap();
        let c = Couplings::default();
        assert_eq!(BondConfig::new(&lat, c, WilsonLoop::E1).num_flipped(), 4);
        // L2 x-bonds + M y-bonds
        assert_eq!(BondConfig::new(&lat, c, WilsonLoop::Skewed).num_flipped(), 5);
        // y-bonds of row 0 and the top row are disjoint for L2 > 1
        assert_eq!(BondConfig::new(&lat, c, WilsonLoop::Both).num_flipped(), 9);
    }

    #[test]
    fn test_loop_e1_flips_row_zero_y_bonds() {
        let lat = Lattice::new(3, 2, 1).unwrap();
        let bonds = BondConfig::new(&lat, Couplings::default(), WilsonLoop::E1);
        for cell in 0..3 {
            assert_eq!(bonds.coupling(cell, BondType::Y).unwrap(), -1.0);
        }
        for cell in 3..6 {
            assert_eq!(bonds.coupling(cell, BondType::Y).unwrap(), 1.0);
        }
    }

    #[test]
    fn test_wilson_loops_insert_no_flux() {
        for lat in lattices() {
            for wl in WilsonLoop::ALL {
                let bonds = BondConfig::new(&lat, Couplings::default(), wl);
                assert_eq!(
                    bonds.vortex_pattern().weight(),
                    0,
                    "loop {:?} on {:?} created vortices",
                    wl,
                    lat
                );
            }
        }
    }

    #[test]
    fn test_vortex_pair_lands_on_endpoints() {
        for lat in lattices() {
            let n = lat.num_cells();
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let mut bonds = BondConfig::new(&lat, Couplings::default(), WilsonLoop::None);
                    bonds.create_vortex_pair(i, j).unwrap();
                    let pattern = bonds.vortex_pattern();
                    assert_eq!(
                        pattern.vortex_cells(),
                        {
                            let mut v = vec![i, j];
                            v.sort();
                            v
                        },
                        "pair ({}, {}) on {:?}",
                        i,
                        j,
                        lat
                    );
                }
            }
        }
    }

    #[test]
    fn test_vortex_pair_twice_restores_flux() {
        let lat = Lattice::new(4, 3, 2).unwrap();
        let mut bonds = BondConfig::new(&lat, Couplings::default(), WilsonLoop::Skewed);
        bonds.create_vortex_pair(2, 9).unwrap();
        bonds.create_vortex_pair(9, 2).unwrap();
        assert_eq!(bonds.vortex_pattern().weight(), 0);
    }

    #[test]
    fn test_batch_creation_reproduces_pattern() {
        let lat = Lattice::new(3, 2, 1).unwrap();
        for code in 0..64u64 {
            let pattern = VortexConfig::from_code(6, code);
            if !pattern.is_even() {
                continue;
            }
            for wl in WilsonLoop::ALL {
                let bonds =
                    BondConfig::with_vortices(&lat, Couplings::default(), wl, &pattern).unwrap();
                assert_eq!(bonds.vortex_pattern(), pattern);
            }
        }
    }

    #[test]
    fn test_odd_pattern_rejected_before_mutation() {
        let lat = Lattice::new(2, 2, 0).unwrap();
        let mut bonds = BondConfig::new(&lat, Couplings::default(), WilsonLoop::None);
        let odd = VortexConfig::from_cells(4, &[0, 1, 3]).unwrap();
        assert!(matches!(
            bonds.create_vortices(&odd),
            Err(KitaevError::OddVortexParity { weight: 3, .. })
        ));
        assert_eq!(bonds.num_flipped(), 0);
    }

    #[test]
    fn test_sign_product() {
        let lat = Lattice::new(2, 1, 0).unwrap();
        let c = Couplings::default();
        assert_eq!(BondConfig::new(&lat, c, WilsonLoop::None).sign_product(), 1.0);
        assert_eq!(BondConfig::new(&lat, c, WilsonLoop::E1).sign_product(), 1.0);
        assert_eq!(BondConfig::new(&lat, c, WilsonLoop::Skewed).sign_product(), -1.0);
        assert_eq!(BondConfig::new(&lat, c, WilsonLoop::Both).sign_product(), -1.0);
    }

    #[test]
    fn test_sign_product_counts_negative_magnitudes_and_skips_zero() {
        let lat = Lattice::new(3, 1, 0).unwrap();
        let negative = BondConfig::new(&lat, Couplings::with_jz(-1.0), WilsonLoop::None);
        assert_eq!(negative.sign_product(), -1.0);
        let mut zero = BondConfig::new(&lat, Couplings::with_jz(0.0), WilsonLoop::None);
        zero.flip(1, BondType::Z).unwrap();
        assert_eq!(zero.sign_product(), 1.0);
        assert_eq!(zero.coupling(1, BondType::Z).unwrap(), 0.0);
    }

    #[test]
    fn test_flip_out_of_range() {
        let lat = Lattice::new(2, 2, 0).unwrap();
        let mut bonds = BondConfig::new(&lat, Couplings::default(), WilsonLoop::None);
        assert!(bonds.flip(4, BondType::X).is_err());
    }

    #[test]
    fn test_lookups_out_of_range() {
        let lat = Lattice::new(2, 2, 0).unwrap();
        let bonds = BondConfig::new(&lat, Couplings::default(), WilsonLoop::Both);
        assert_eq!(
            bonds.coupling(4, BondType::X),
            Err(KitaevError::CellOutOfRange { index: 4, cells: 4 })
        );
        assert_eq!(
            bonds.is_flipped(99, BondType::Y),
            Err(KitaevError::CellOutOfRange { index: 99, cells: 4 })
        );
        // row 0 y-bonds and the column 0 x-bond carry the loops
        assert_eq!(bonds.is_flipped(0, BondType::Y), Ok(true));
        assert_eq!(bonds.is_flipped(0, BondType::X), Ok(true));
        assert_eq!(bonds.is_flipped(3, BondType::Z), Ok(false));
        assert_eq!(bonds.coupling(0, BondType::Y), Ok(-1.0));
    }

    #[test]
    fn test_loop_index_roundtrip() {
        for wl in WilsonLoop::ALL {
            assert_eq!(WilsonLoop::from_index(wl.index()).unwrap(), wl);
        }
        assert_eq!(WilsonLoop::try_from(4u8), Err(KitaevError::InvalidLoop(4)));
    }
}
