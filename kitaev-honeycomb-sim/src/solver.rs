//! Exact ground-state energy of one (Wilson loop, vortex) sector.
//!
//! With the gauge fixed by a bond configuration the Hamiltonian is a free
//! Majorana bilinear `H = (i/2) Σ_i Σ_j A_ij c^A_i c^B_j`. Writing the real
//! N×N coupling matrix as `A = V S Uᵀ`, the singular values `s_k` are the
//! quasiparticle energies and the fermionic vacuum has energy `-½ Σ s_k`.
//!
//! Only half of the fermionic states survive the projection back onto the
//! spin Hilbert space. Whether the vacuum survives is decided by
//!
//! ```text
//! σ = Π sign(u_ij) · (-1)^θ · det(U) · det(V)
//! ```
//!
//! If σ < 0 the vacuum is unphysical and the lowest state flips the
//! occupation of the softest mode, costing `min s_k`.
//!
//! Two decompositions are available. [`DecompositionMethod::Svd`] runs a
//! direct SVD of A. [`DecompositionMethod::GramEigen`] diagonalizes AᵀA for
//! U and the singular values, then builds V column by column from
//! `A·u_k / s_k`, falling back to eigenvectors of AAᵀ for zero modes.

use log::trace;
use nalgebra::{DMatrix, DVector, SymmetricEigen, SVD};

use crate::bond::{BondConfig, BondType};
use crate::error::{KitaevError, Result};

/// Singular values below this are zero modes and are clamped to 0.
pub const ZERO_MODE_THRESHOLD: f64 = 1e-6;

/// Allowed deviation of |det U| and |det V| from 1.
pub const DETERMINANT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecompositionMethod {
    #[default]
    Svd,
    GramEigen,
}

/// Numerical settings of the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub method: DecompositionMethod,
    /// Clamp singular values below this to zero.
    pub zero_threshold: f64,
    /// Reject decompositions whose determinants stray further from ±1.
    pub det_tolerance: f64,
    /// Reject sectors with more zero modes than this. Off (`None`) by
    /// default: zero modes are clamped and reported in
    /// [`EnergyResult::zero_modes`] but never rejected unless a limit is set.
    pub max_zero_modes: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: DecompositionMethod::Svd,
            zero_threshold: ZERO_MODE_THRESHOLD,
            det_tolerance: DETERMINANT_TOLERANCE,
            max_zero_modes: None,
        }
    }
}

impl SolverConfig {
    pub fn gram_eigen() -> Self {
        Self {
            method: DecompositionMethod::GramEigen,
            ..Self::default()
        }
    }
}

/// Energies of one sector.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyResult {
    /// Lowest energy allowed by the projection.
    pub physical: f64,
    /// The other candidate; differs from `physical` by `min_energy`.
    pub unphysical: f64,
    /// Smallest quasiparticle energy (after clamping).
    pub min_energy: f64,
    /// σ = ±1; +1 means the fermionic vacuum is physical.
    pub parity: f64,
    pub det_u: f64,
    pub det_v: f64,
    pub zero_modes: usize,
}

impl EnergyResult {
    pub fn vacuum_is_physical(&self) -> bool {
        self.parity > 0.0
    }
}

/// Singular values (ascending, clamped) and orthogonal-factor determinants.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub singular_values: Vec<f64>,
    pub det_u: f64,
    pub det_v: f64,
    pub zero_modes: usize,
}

/// Dense coupling matrix: row = A site, column = B site.
pub fn coupling_matrix(bonds: &BondConfig) -> DMatrix<f64> {
    let n = bonds.lattice().num_cells();
    let mut a = DMatrix::zeros(n, n);
    for (i, [e1, e2]) in bonds.lattice().neighbor_table().into_iter().enumerate() {
        a[(i, i)] += bonds.signed(i, BondType::Z);
        a[(i, e1)] += bonds.signed(i, BondType::X);
        a[(i, e2)] += bonds.signed(i, BondType::Y);
    }
    a
}

/// Decompose a coupling matrix with the configured method.
pub fn decompose(a: &DMatrix<f64>, config: &SolverConfig) -> Result<Decomposition> {
    let decomposition = match config.method {
        DecompositionMethod::Svd => decompose_svd(a, config.zero_threshold)?,
        DecompositionMethod::GramEigen => decompose_gram(a, config.zero_threshold)?,
    };
    check_orthogonality(decomposition.det_u, decomposition.det_v, config.det_tolerance)?;
    if let Some(limit) = config.max_zero_modes {
        if decomposition.zero_modes > limit {
            return Err(KitaevError::ZeroModeAnomaly {
                found: decomposition.zero_modes,
                detail: format!("at most {} allowed", limit),
            });
        }
    }
    Ok(decomposition)
}

fn decompose_svd(a: &DMatrix<f64>, threshold: f64) -> Result<Decomposition> {
    let n = a.nrows();
    let svd = SVD::try_new(a.clone(), true, true, f64::EPSILON, 0)
        .ok_or(KitaevError::DecompositionFailed { size: n })?;
    let (Some(left), Some(right_t)) = (svd.u.as_ref(), svd.v_t.as_ref()) else {
        return Err(KitaevError::DecompositionFailed { size: n });
    };

    let mut singular_values: Vec<f64> = svd
        .singular_values
        .iter()
        .map(|&s| clamp(s, threshold))
        .collect();
    singular_values.sort_by(|a, b| a.total_cmp(b));
    let zero_modes = singular_values.iter().filter(|&&s| s == 0.0).count();

    // A = left · S · right_tᵀ: U holds the right vectors, V the left ones
    Ok(Decomposition {
        singular_values,
        det_u: right_t.determinant(),
        det_v: left.determinant(),
        zero_modes,
    })
}

fn decompose_gram(a: &DMatrix<f64>, threshold: f64) -> Result<Decomposition> {
    let n = a.nrows();
    let gram = SymmetricEigen::new(a.transpose() * a);
    let order = ascending(&gram.eigenvalues);

    let mut u = DMatrix::zeros(n, n);
    let mut singular_values = Vec::with_capacity(n);
    for (col, &k) in order.iter().enumerate() {
        u.set_column(col, &gram.eigenvectors.column(k));
        singular_values.push(clamp(gram.eigenvalues[k].max(0.0).sqrt(), threshold));
    }
    let zero_modes = singular_values.iter().filter(|&&s| s == 0.0).count();

    let mut v = DMatrix::zeros(n, n);
    for col in zero_modes..n {
        let image = (a * u.column(col)) / singular_values[col];
        v.set_column(col, &image.normalize());
    }

    if zero_modes > 0 {
        // left null space of A
        let cogram = SymmetricEigen::new(a * a.transpose());
        let co_order = ascending(&cogram.eigenvalues);
        let co_zero = co_order
            .iter()
            .filter(|&&k| clamp(cogram.eigenvalues[k].max(0.0).sqrt(), threshold) == 0.0)
            .count();
        matching_zero_modes(zero_modes, co_zero)?;
        for (col, &k) in co_order.iter().take(zero_modes).enumerate() {
            v.set_column(col, &cogram.eigenvectors.column(k));
        }
    }

    Ok(Decomposition {
        singular_values,
        det_u: u.determinant(),
        det_v: v.determinant(),
        zero_modes,
    })
}

/// Right and left null spaces of a square matrix have equal dimension.
fn matching_zero_modes(right: usize, left: usize) -> Result<()> {
    if right == left {
        Ok(())
    } else {
        Err(KitaevError::ZeroModeAnomaly {
            found: right,
            detail: format!("AᵀA has {} zero modes but AAᵀ has {}", right, left),
        })
    }
}

fn ascending(values: &DVector<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
    order
}

fn clamp(s: f64, threshold: f64) -> f64 {
    if s.abs() < threshold {
        0.0
    } else {
        s
    }
}

fn check_orthogonality(det_u: f64, det_v: f64, tolerance: f64) -> Result<()> {
    // written so that NaN fails
    let ok = |d: f64| (d.abs() - 1.0).abs() <= tolerance;
    if ok(det_u) && ok(det_v) {
        Ok(())
    } else {
        Err(KitaevError::DeterminantAnomaly { det_u, det_v })
    }
}

/// Physical and unphysical energy of a bond configuration.
pub fn solve(bonds: &BondConfig, config: &SolverConfig) -> Result<EnergyResult> {
    let a = coupling_matrix(bonds);
    let dec = decompose(&a, config)?;

    let min_energy = dec.singular_values.first().copied().unwrap_or(0.0);
    let vacuum = -0.5 * dec.singular_values.iter().sum::<f64>();
    let excited = vacuum + min_energy;

    let sign = bonds.sign_product() * bonds.lattice().boundary_sign() * dec.det_u * dec.det_v;
    let parity = if sign < 0.0 { -1.0 } else { 1.0 };
    let (physical, unphysical) = if parity > 0.0 {
        (vacuum, excited)
    } else {
        (excited, vacuum)
    };

    trace!(
        "solved {}-cell sector: E_phys={:.12e} σ={} zero_modes={}",
        a.nrows(),
        physical,
        parity,
        dec.zero_modes
    );

    Ok(EnergyResult {
        physical,
        unphysical,
        min_energy,
        parity,
        det_u: dec.det_u,
        det_v: dec.det_v,
        zero_modes: dec.zero_modes,
    })
}
