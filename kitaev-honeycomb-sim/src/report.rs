//! Plain-text rendering of loop scans and search results.
//!
//! Energies print in scientific notation with twelve fractional digits and
//! a signed, zero-padded exponent (`-2.236067977500e+00`).

use crate::bond::{Couplings, WilsonLoop};
use crate::lattice::Lattice;
use crate::sectors::{SearchOutcome, SectorEnergy};
use crate::solver::EnergyResult;

const BANNER: &str = "########################################";

pub fn format_energy(e: f64) -> String {
    fix_exponent(format!("{:.12e}", e))
}

/// Like [`format_energy`] but always prints the mantissa sign.
pub fn format_energy_signed(e: f64) -> String {
    fix_exponent(format!("{:+.12e}", e))
}

// "1.5e-7" -> "1.5e-07", "2.0e0" -> "2.0e+00"
fn fix_exponent(raw: String) -> String {
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => raw,
    }
}

/// `<energy> <loop> <vortex>`, one line per evaluated sector.
pub fn evaluation_line(sector: &SectorEnergy) -> String {
    format!(
        "{} {} {}",
        format_energy(sector.energy),
        sector.wilson_loop.index(),
        sector.vortex
    )
}

/// Vortex-free energy of each Wilson loop sector.
pub fn loop_table(
    lattice: &Lattice,
    couplings: &Couplings,
    energies: &[(WilsonLoop, EnergyResult)],
) -> String {
    let mut lines = vec![
        format!(
            "# L1={} L2={} M={} Jx={:?} Jy={:?} Jz={:?}",
            lattice.l1(),
            lattice.l2(),
            lattice.skew(),
            couplings.jx,
            couplings.jy,
            couplings.jz
        ),
        "# loop\tenergy".to_string(),
    ];
    for (wl, result) in energies {
        lines.push(format!("{}\t{}", wl.index(), format_energy_signed(result.physical)));
    }
    lines.join("\n")
}

pub fn ground_state_report(outcome: &SearchOutcome) -> String {
    let (lattice, couplings) = (&outcome.lattice, &outcome.couplings);
    [
        BANNER.to_string(),
        format!("# L1\t=\t{}", lattice.l1()),
        format!("# L2\t=\t{}", lattice.l2()),
        format!("# M\t=\t{}", lattice.skew()),
        format!("# Jx\t=\t{:?}", couplings.jx),
        format!("# Jy\t=\t{:?}", couplings.jy),
        format!("# Jz\t=\t{:?}", couplings.jz),
        BANNER.to_string(),
        format!("# loop\t=\t{}", outcome.ground.wilson_loop.index()),
        format!("# vortex\t=\t{}", outcome.ground.vortex),
        BANNER.to_string(),
        "# Ground-state energy".to_string(),
        format_energy(outcome.energy()),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sectors::{loop_energies, search_ground_state, SearchConfig};
    use crate::solver::SolverConfig;
    use crate::vortex::VortexConfig;

    #[test]
    fn energy_formatting() {
        assert_eq!(format_energy(-(5.0f64.sqrt())), "-2.236067977500e+00");
        assert_eq!(format_energy(0.0), "0.000000000000e+00");
        assert_eq!(format_energy(1.5e-7), "1.500000000000e-07");
        assert_eq!(format_energy(-12.5), "-1.250000000000e+01");
        assert_eq!(format_energy(1e100), "1.000000000000e+100");
    }

    #[test]
    fn signed_formatting() {
        assert_eq!(format_energy_signed(2.0), "+2.000000000000e+00");
        assert_eq!(format_energy_signed(-0.25), "-2.500000000000e-01");
    }

    #[test]
    fn non_finite_passes_through() {
        assert_eq!(format_energy(f64::NAN), "NaN");
        assert_eq!(format_energy(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn evaluation_line_layout() {
        let sector = SectorEnergy {
            wilson_loop: WilsonLoop::Both,
            vortex: VortexConfig::new(vec![true, false, false, true]),
            energy: -1.0,
        };
        assert_eq!(evaluation_line(&sector), "-1.000000000000e+00 3 (1, 0, 0, 1)");
    }

    #[test]
    fn loop_table_two_cells() {
        let lat = Lattice::new(2, 1, 0).unwrap();
        let couplings = Couplings::default();
        let scan = loop_energies(&lat, &couplings, &SolverConfig::default()).unwrap();
        let table = loop_table(&lat, &couplings, &scan);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "# L1=2 L2=1 M=0 Jx=1.0 Jy=1.0 Jz=1.0");
        assert_eq!(lines[1], "# loop\tenergy");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[4], "2\t-2.236067977500e+00");
    }

    #[test]
    fn ground_state_report_two_cells() {
        let lat = Lattice::new(2, 1, 0).unwrap();
        let outcome = search_ground_state(&lat, &Couplings::default(), &SearchConfig::default()).unwrap();
        let expected = [
            BANNER,
            "# L1\t=\t2",
            "# L2\t=\t1",
            "# M\t=\t0",
            "# Jx\t=\t1.0",
            "# Jy\t=\t1.0",
            "# Jz\t=\t1.0",
            BANNER,
            "# loop\t=\t2",
            "# vortex\t=\t(0, 0)",
            BANNER,
            "# Ground-state energy",
            "-2.236067977500e+00",
        ]
        .join("\n");
        assert_eq!(ground_state_report(&outcome), expected);
    }
}
