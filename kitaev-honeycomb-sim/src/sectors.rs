//! Vortex sector enumeration and ground-state search.
//!
//! A flux sector is a (Wilson loop, vortex pattern) pair. Patterns related
//! by a lattice translation have the same spectrum, so only one
//! representative per translation orbit is evaluated: the lexicographically
//! smallest pattern of the orbit, cell 0 most significant.
//!
//! Patterns are enumerated as `u64` codes in ascending order, so the
//! enumeration is limited to lattices of fewer than 64 cells.

use std::ops::Range;

use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::bond::{BondConfig, Couplings, WilsonLoop};
use crate::error::{KitaevError, Result};
use crate::lattice::Lattice;
use crate::report;
use crate::solver::{solve, EnergyResult, SolverConfig};
use crate::vortex::VortexConfig;

/// Cell permutations for every translation of the lattice.
///
/// Row `t` maps cell `d` to `d + pos(t)`, so reading a pattern through row
/// `t` yields the translate that moves cell `t` onto the origin.
#[derive(Debug, Clone)]
pub struct TranslationTable {
    shifts: Vec<Vec<usize>>,
}

impl TranslationTable {
    pub fn new(lattice: &Lattice) -> Self {
        let n = lattice.num_cells();
        let l1 = lattice.l1();
        let shifts = (0..n)
            .map(|t| {
                let (tx, ty) = ((t % l1) as i64, (t / l1) as i64);
                (0..n)
                    .map(|d| {
                        let (dx, dy) = ((d % l1) as i64, (d / l1) as i64);
                        lattice.index(dx + tx, dy + ty)
                    })
                    .collect()
            })
            .collect();
        Self { shifts }
    }

    pub fn num_cells(&self) -> usize {
        self.shifts.len()
    }

    /// Whether `config` is the smallest member of its translation orbit
    /// and has even weight.
    pub fn is_canonical(&self, config: &VortexConfig) -> bool {
        let n = self.num_cells();
        if config.len() != n || !config.is_even() {
            return false;
        }
        let weight = config.weight();
        if weight == 0 || weight == n {
            return true;
        }
        let flags = config.flags();
        if flags[0] {
            return false;
        }
        self.shifts[1..]
            .iter()
            .all(|shift| !translate_is_smaller(flags, shift))
    }
}

/// Lexicographic comparison of the translate `d -> flags[shift[d]]` against
/// `flags`, stopping at the first difference.
fn translate_is_smaller(flags: &[bool], shift: &[usize]) -> bool {
    for (d, &src) in shift.iter().enumerate() {
        match (flags[src], flags[d]) {
            (false, true) => return true,
            (true, false) => return false,
            _ => {}
        }
    }
    false
}

/// One-off canonical check; builds the translation table on every call.
pub fn is_canonical(lattice: &Lattice, config: &VortexConfig) -> bool {
    TranslationTable::new(lattice).is_canonical(config)
}

/// Lazy iterator over canonical vortex patterns in ascending code order.
///
/// Cloning restarts from the current position. [`VortexSectors::with_range`]
/// restricts the scan to a block of codes, so disjoint ranges partition the
/// work.
#[derive(Debug, Clone)]
pub struct VortexSectors {
    table: TranslationTable,
    next: u64,
    end: u64,
}

impl VortexSectors {
    pub fn new(lattice: &Lattice) -> Result<Self> {
        Self::with_range(lattice, 0..u64::MAX)
    }

    /// Scan only codes in `codes`, clipped to `[0, 2^N)`.
    pub fn with_range(lattice: &Lattice, codes: Range<u64>) -> Result<Self> {
        let n = lattice.num_cells();
        if n >= 64 {
            return Err(KitaevError::LatticeTooLarge { cells: n });
        }
        let total = 1u64 << n;
        Ok(Self {
            table: TranslationTable::new(lattice),
            next: codes.start.min(total),
            end: codes.end.min(total),
        })
    }

    /// Total number of codes, canonical or not, for `lattice`.
    pub fn code_space(lattice: &Lattice) -> Result<u64> {
        let n = lattice.num_cells();
        if n >= 64 {
            return Err(KitaevError::LatticeTooLarge { cells: n });
        }
        Ok(1u64 << n)
    }
}

impl Iterator for VortexSectors {
    type Item = VortexConfig;

    fn next(&mut self) -> Option<VortexConfig> {
        let n = self.table.num_cells();
        while self.next < self.end {
            let code = self.next;
            self.next += 1;
            if code.count_ones() % 2 != 0 {
                continue;
            }
            let config = VortexConfig::from_code(n, code);
            if self.table.is_canonical(&config) {
                return Some(config);
            }
        }
        None
    }
}

impl std::iter::FusedIterator for VortexSectors {}

/// Energy of one flux sector. `None` means vortex-free.
pub fn evaluate_sector(
    lattice: &Lattice,
    couplings: &Couplings,
    wilson_loop: WilsonLoop,
    vortices: Option<&VortexConfig>,
    solver: &SolverConfig,
) -> Result<EnergyResult> {
    let bonds = match vortices {
        Some(vortices) => BondConfig::with_vortices(lattice, *couplings, wilson_loop, vortices)?,
        None => BondConfig::new(lattice, *couplings, wilson_loop),
    };
    solve(&bonds, solver)
}

/// Vortex-free energies of the four Wilson loop sectors.
pub fn loop_energies(
    lattice: &Lattice,
    couplings: &Couplings,
    solver: &SolverConfig,
) -> Result<Vec<(WilsonLoop, EnergyResult)>> {
    WilsonLoop::ALL
        .iter()
        .map(|&wl| Ok((wl, evaluate_sector(lattice, couplings, wl, None, solver)?)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Also search canonical vortex patterns, not only the vortex-free one.
    pub include_vortices: bool,
    /// Retain every evaluated sector in [`SearchOutcome::evaluations`].
    /// Off by default; the search then holds only the running minimum.
    pub keep_evaluations: bool,
    pub solver: SolverConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            include_vortices: true,
            keep_evaluations: false,
            solver: SolverConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn vortex_free() -> Self {
        Self {
            include_vortices: false,
            ..Self::default()
        }
    }
}

/// Physical energy of one evaluated sector.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorEnergy {
    pub wilson_loop: WilsonLoop,
    pub vortex: VortexConfig,
    pub energy: f64,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub lattice: Lattice,
    pub couplings: Couplings,
    /// Lowest physical energy; the first one in enumeration order on ties.
    pub ground: SectorEnergy,
    /// Every successful evaluation, vortex-major and loop-minor. Empty
    /// unless [`SearchConfig::keep_evaluations`] is set.
    pub evaluations: Vec<SectorEnergy>,
    /// Number of successful evaluations.
    pub evaluated: usize,
    pub canonical_sectors: usize,
    /// Evaluations dropped because of a numerical anomaly.
    pub failed: usize,
}

impl SearchOutcome {
    pub fn energy(&self) -> f64 {
        self.ground.energy
    }
}

/// Canonical patterns handed to the solver per batch.
const BATCH_PATTERNS: usize = 256;

/// Minimum physical energy over all Wilson loops and, if enabled, all
/// canonical vortex patterns.
///
/// Patterns are pulled lazily from [`VortexSectors`] in fixed-size batches;
/// each batch is evaluated (in parallel with the `parallel` feature) and
/// folded into the running minimum in enumeration order before the next
/// batch is drawn.
///
/// A sector whose evaluation hits a numerical anomaly is logged and
/// skipped. Caller-input errors abort the search, as does a search in which
/// every evaluation failed.
pub fn search_ground_state(
    lattice: &Lattice,
    couplings: &Couplings,
    config: &SearchConfig,
) -> Result<SearchOutcome> {
    search_in_batches(lattice, couplings, config, BATCH_PATTERNS)
}

fn search_in_batches(
    lattice: &Lattice,
    couplings: &Couplings,
    config: &SearchConfig,
    batch: usize,
) -> Result<SearchOutcome> {
    let mut patterns: Box<dyn Iterator<Item = VortexConfig>> = if config.include_vortices {
        info!(
            "scanning {} vortex codes x {} loops on L1={} L2={} M={}",
            VortexSectors::code_space(lattice)?,
            WilsonLoop::ALL.len(),
            lattice.l1(),
            lattice.l2(),
            lattice.skew()
        );
        Box::new(VortexSectors::new(lattice)?)
    } else {
        Box::new(std::iter::once(VortexConfig::empty(lattice.num_cells())))
    };

    let mut tally = Tally::new(config.keep_evaluations);
    loop {
        let chunk: Vec<VortexConfig> = patterns.by_ref().take(batch.max(1)).collect();
        if chunk.is_empty() {
            break;
        }
        tally.canonical_sectors += chunk.len();
        let jobs: Vec<(&VortexConfig, WilsonLoop)> = chunk
            .iter()
            .flat_map(|v| WilsonLoop::ALL.iter().map(move |&wl| (v, wl)))
            .collect();
        let results = evaluate_jobs(lattice, couplings, &jobs, &config.solver);
        for ((vortex, wilson_loop), result) in jobs.into_iter().zip(results) {
            tally.record(vortex, wilson_loop, result)?;
        }
    }

    let Tally {
        ground,
        evaluations,
        evaluated,
        canonical_sectors,
        failed,
        first_error,
    } = tally;
    let ground = match (ground, first_error) {
        (Some(ground), _) => ground,
        (None, Some(err)) => return Err(err),
        (None, None) => return Err(KitaevError::NoSectors),
    };
    info!(
        "ground state {} in loop {} vortex {} ({} sectors, {} failed)",
        report::format_energy(ground.energy),
        ground.wilson_loop.index(),
        ground.vortex,
        canonical_sectors,
        failed
    );

    Ok(SearchOutcome {
        lattice: *lattice,
        couplings: *couplings,
        ground,
        evaluations: evaluations.unwrap_or_default(),
        evaluated,
        canonical_sectors,
        failed,
    })
}

/// Running state of a search, fed in enumeration order.
struct Tally {
    ground: Option<SectorEnergy>,
    evaluations: Option<Vec<SectorEnergy>>,
    evaluated: usize,
    canonical_sectors: usize,
    failed: usize,
    first_error: Option<KitaevError>,
}

impl Tally {
    fn new(keep_evaluations: bool) -> Self {
        Self {
            ground: None,
            evaluations: keep_evaluations.then(Vec::new),
            evaluated: 0,
            canonical_sectors: 0,
            failed: 0,
            first_error: None,
        }
    }

    fn record(
        &mut self,
        vortex: &VortexConfig,
        wilson_loop: WilsonLoop,
        result: Result<EnergyResult>,
    ) -> Result<()> {
        match result {
            Ok(energy) => {
                let sector = SectorEnergy {
                    wilson_loop,
                    vortex: vortex.clone(),
                    energy: energy.physical,
                };
                debug!("{}", report::evaluation_line(&sector));
                self.evaluated += 1;
                if self.ground.as_ref().map_or(true, |g| sector.energy < g.energy) {
                    self.ground = Some(sector.clone());
                }
                if let Some(all) = self.evaluations.as_mut() {
                    all.push(sector);
                }
                Ok(())
            }
            Err(err) if err.is_numerical() => {
                warn!("skipping loop {} vortex {}: {}", wilson_loop.index(), vortex, err);
                self.failed += 1;
                self.first_error.get_or_insert(err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(feature = "parallel")]
fn evaluate_jobs(
    lattice: &Lattice,
    couplings: &Couplings,
    jobs: &[(&VortexConfig, WilsonLoop)],
    solver: &SolverConfig,
) -> Vec<Result<EnergyResult>> {
    jobs.par_iter()
        .map(|&(vortex, wl)| evaluate_sector(lattice, couplings, wl, Some(vortex), solver))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_jobs(
    lattice: &Lattice,
    couplings: &Couplings,
    jobs: &[(&VortexConfig, WilsonLoop)],
    solver: &SolverConfig,
) -> Vec<Result<EnergyResult>> {
    jobs.iter()
        .map(|&(vortex, wl)| evaluate_sector(lattice, couplings, wl, Some(vortex), solver))
        .collect()
}
