//! Error type shared by geometry, bond construction, the solver and the search.
//!
//! Caller-input failures (geometry, vortex parity, out-of-range cells) are
//! raised before any matrix is built. Numerical anomalies come out of the
//! solver and abort a single evaluation only.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, KitaevError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KitaevError {
    /// Lattice parameters outside `L1 > 0`, `L2 > 0`, `0 <= M < L1`.
    #[error("invalid lattice geometry L1={l1} L2={l2} M={m}: {reason}")]
    InvalidGeometry {
        l1: usize,
        l2: usize,
        m: usize,
        reason: &'static str,
    },

    #[error("unit cell {index} is outside the lattice of {cells} cells")]
    CellOutOfRange { index: usize, cells: usize },

    /// Vortices come in pairs; an odd total cannot be realized by bond flips.
    #[error("vortex configuration {config} has odd weight {weight}")]
    OddVortexParity { weight: usize, config: String },

    #[error("vortex configuration has {actual} plaquettes, lattice has {expected}")]
    VortexLengthMismatch { expected: usize, actual: usize },

    #[error("Wilson loop sector {0} is not one of 0, 1, 2, 3")]
    InvalidLoop(u8),

    /// The enumerator encodes a configuration in a `u64`.
    #[error("lattice of {cells} cells is too large to enumerate vortex sectors")]
    LatticeTooLarge { cells: usize },

    #[error("no flux sector was evaluated")]
    NoSectors,

    #[error("decomposition of the {size}x{size} coupling matrix did not converge")]
    DecompositionFailed { size: usize },

    #[error("decomposition is not orthogonal: det(U)={det_u:.3e}, det(V)={det_v:.3e}")]
    DeterminantAnomaly { det_u: f64, det_v: f64 },

    #[error("unexpected zero modes: {found} found ({detail})")]
    ZeroModeAnomaly { found: usize, detail: String },
}

impl KitaevError {
    /// True for failures that originate inside the solver rather than in
    /// the caller's input.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Self::DecompositionFailed { .. }
                | Self::DeterminantAnomaly { .. }
                | Self::ZeroModeAnomaly { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_geometry() {
        let err = KitaevError::InvalidGeometry {
            l1: 3,
            l2: 2,
            m: 3,
            reason: "M must be smaller than L1",
        };
        assert_eq!(
            err.to_string(),
            "invalid lattice geometry L1=3 L2=2 M=3: M must be smaller than L1"
        );
    }

    #[test]
    fn display_odd_parity_names_configuration() {
        let err = KitaevError::OddVortexParity {
            weight: 1,
            config: "(0, 1, 0)".into(),
        };
        assert!(err.to_string().contains("(0, 1, 0)"));
        assert!(err.to_string().contains("odd weight 1"));
    }

    #[test]
    fn numerical_classification() {
        assert!(KitaevError::DecompositionFailed { size: 4 }.is_numerical());
        assert!(KitaevError::DeterminantAnomaly { det_u: 0.5, det_v: 1.0 }.is_numerical());
        assert!(!KitaevError::InvalidLoop(7).is_numerical());
        assert!(!KitaevError::CellOutOfRange { index: 9, cells: 4 }.is_numerical());
    }

    #[test]
    fn error_trait_works() {
        let err = KitaevError::InvalidLoop(5);
        let dyn_err: &dyn std::error::Error = &err;
        assert!(dyn_err.to_string().contains('5'));
    }
}
