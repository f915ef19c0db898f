//! Physical constants and the normalization factors between code units,
//! atomic units and SI.
//!
//! Code units are the usual PIC normalization: times in `1/omega_r`, momenta
//! in `m c`, energies in `m_e c^2`, fields in `m_e c omega_r / e`, where
//! `omega_r` is the reference angular frequency.

use serde::{Deserialize, Serialize};

// constants

pub const E_MASS_EV: f64           = 510_998.9;              // electron rest energy [eV]
pub const SPEED_OF_LIGHT: f64      = 299_792_458.0;          // speed of light [m/s]
pub const ELECTRON_RADIUS: f64     = 2.81794e-15;            // classical electron radius [m]
pub const HYDROGEN_POTENTIAL: f64  = 13.598434005136;        // ionization potential of hydrogen [eV]

pub const EV_TO_AU: f64            = 1.0 / 27.2116;          // eV -> atomic units of energy
pub const AU_TO_MEC2: f64          = 27.2116 / 510.998e3;    // atomic units of energy -> m_e c^2
pub const EC_TO_AU_PER_OMEGA: f64  = 3.314742578e-15;        // hbar omega / (m_e c^2 alpha^3), per unit omega_r [s]
pub const AU_TO_W0_TIMES_OMEGA: f64 = 4.134137172e+16;       // alpha^2 m_e c^2 / hbar, per unit omega_r [1/s]

// ionization

pub const FIELD_THRESHOLD_AU: f64  = 1e-10;                  // fields below this magnitude [a.u.] never ionize

// collisional ionization tables

pub const N_POINTS: usize          = 100;                    // energy grid points per charge state
pub const E_MIN_EV: f64            = 1.0;                    // lowest tabulated incident energy [eV]
pub const E_MAX_EV: f64            = 1.0e7;                  // highest tabulated incident energy [eV]
pub const GRID_A1: f64             = E_MASS_EV / E_MIN_EV;   // m_e c^2 / E_min

/// Inverse logarithmic spacing of the energy grid, `(N - 1) / ln(E_max / E_min)`.
#[inline]
pub fn grid_a2() -> f64 {
    (N_POINTS - 1) as f64 / (E_MAX_EV / E_MIN_EV).ln()
}

/// Conversion factors derived once from the reference angular frequency.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct Normalization {
    /// Reference angular frequency [rad/s].
    pub reference_angular_frequency: f64,
    /// Code-unit electric field -> atomic units.
    pub ec_to_au: f64,
    /// Atomic unit of rate -> code units of rate.
    pub au_to_w0: f64,
}

impl Normalization {
    pub fn new(reference_angular_frequency: f64) -> Self {
        Normalization {
            reference_angular_frequency,
            ec_to_au: EC_TO_AU_PER_OMEGA * reference_angular_frequency,
            au_to_w0: AU_TO_W0_TIMES_OMEGA / reference_angular_frequency,
        }
    }

    /// Normalization of the binary-encounter cross-sections, `r_e omega_r / 2c`.
    pub fn cross_section_normalization(&self) -> f64 {
        ELECTRON_RADIUS * self.reference_angular_frequency / (2.0 * SPEED_OF_LIGHT)
    }
}
