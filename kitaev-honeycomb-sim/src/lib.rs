//! # kitaev-honeycomb-sim
//!
//! Exact ground-state energies of the Kitaev honeycomb model on a finite
//! sheared torus.
//!
//! In a fixed flux sector the spin model is a free Majorana hopping problem.
//! Its energies follow from the singular values of an N×N coupling matrix,
//! and the projection back onto spins fixes which of the two candidate
//! fermionic vacua is physical. Searching all Wilson loop sectors and all
//! inequivalent vortex patterns gives the true ground state.
//!
//! ## Physics
//!
//! - **Lattice**: L1×L2 unit cells, periodic with skew M along e2
//! - **Bonds**: x, y, z couplings per cell; sign flips encode the gauge field
//! - **Vortices**: plaquettes with flipped flux, created in pairs by strings
//! - **Wilson loops**: four topological sectors per vortex pattern
//! - **Parity**: σ = Π sign(u) · (-1)^θ · det(U) · det(V) selects the vacuum

pub mod bond;
pub mod error;
pub mod lattice;
pub mod report;
pub mod sectors;
pub mod solver;
pub mod vortex;

pub use error::{KitaevError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use crate::bond::*;
    pub use crate::error::{KitaevError, Result};
    pub use crate::lattice::*;
    pub use crate::report::*;
    pub use crate::sectors::*;
    pub use crate::solver::*;
    pub use crate::vortex::*;
}
