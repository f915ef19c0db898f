//! Single-level field ionization rates.
//!
//! All variants share the ADK/PPT tunnelling rate
//!
//! ```text
//! w(Z, F) = beta[Z] exp(-delta/3 + alpha[Z] ln(delta)),   delta = gamma[Z] / F
//! ```
//!
//! with `F` in atomic units and `w` in code units. The variants only correct
//! this base rate, see [`RateLaw`].

use std::f64::consts::PI;

use log::trace;

use crate::atomic::AtomicSpecies;
use crate::config::{IonizationModel, Polarization};
use crate::constants::{EV_TO_AU, HYDROGEN_POTENTIAL};
use crate::field::FieldSample;

/// Per-charge-state coefficients of the rate laws, computed once per species.
#[derive(Clone, PartialEq, Debug)]
pub struct RateLawCoefficients {
    pub atomic_number: u32,
    /// Ionization potentials [a.u.].
    pub potential: Vec<f64>,
    /// Ionization potentials [eV].
    pub potential_ev: Vec<f64>,
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
    pub gamma: Vec<f64>,
    /// Tong-Lin exponent, `tl_parameter * (2 n*)^2 / gamma`.
    pub lambda: Vec<f64>,
    /// `(2 Ip)^(-3/4)`, used for the envelope momentum spread.
    pub ip_times2_to_minus3ov4: Vec<f64>,
    /// Atomic unit of rate in code units.
    pub au_to_w0: f64,
}

impl RateLawCoefficients {
    pub fn new(species: &AtomicSpecies, model: IonizationModel, tl_parameter: f64, au_to_w0: f64) -> Self {
        let size = species.atomic_number as usize;
        let mut c = RateLawCoefficients {
            atomic_number: species.atomic_number,
            potential: Vec::with_capacity(size),
            potential_ev: species.potential.clone(),
            alpha: Vec::with_capacity(size),
            beta: Vec::with_capacity(size),
            gamma: Vec::with_capacity(size),
            lambda: Vec::with_capacity(size),
            ip_times2_to_minus3ov4: Vec::with_capacity(size),
            au_to_w0,
        };

        for z in 0..size {
            let (abs_m, g_factor) = if model == IonizationModel::TunnelFullPpt {
                (species.magnetic_quantum_number[z].abs() as f64, species.degeneracy[z])
            } else {
                (0.0, 1.0)
            };
            let ip = species.potential[z] * EV_TO_AU;
            let l = species.azimuthal_quantum_number[z] as f64;

            let blm = (2.0 * l + 1.0) * libm::tgamma(l + abs_m + 1.0)
                / (2f64.powf(abs_m) * libm::tgamma(abs_m + 1.0) * libm::tgamma(l - abs_m + 1.0));

            // 2 n*, twice the effective principal quantum number
            let cst = (z as f64 + 1.0) * (2.0 / ip).sqrt();
            // A_nl = 4 C_nl^2 with C_nl = 1 for a neutral atom
            let anl = if model == IonizationModel::Tunnel {
                2f64.powf(cst + 1.0) / (cst * libm::tgamma(cst))
            } else if z > 0 {
                2f64.powf(cst + 1.0)
                    / (cst * libm::tgamma(cst / 2.0 + l + 1.0) * libm::tgamma(cst / 2.0 - l))
            } else {
                4.0
            };

            let two_ip = 2.0 * ip;
            let gamma = 2.0 * (two_ip * two_ip * two_ip).sqrt();
            c.potential.push(ip);
            c.alpha.push(cst - 1.0 - abs_m);
            c.beta.push(g_factor * anl * blm * ip * au_to_w0);
            c.gamma.push(gamma);
            c.lambda.push(tl_parameter * cst * cst / gamma);
            c.ip_times2_to_minus3ov4.push(1.0 / (two_ip * two_ip * two_ip).sqrt().sqrt());
            trace!(
                "Z* = {}: Ip = {:.4} au, l = {}, alpha = {:.4}, beta = {:.4e}, gamma = {:.4}",
                z, ip, l, c.alpha[z], c.beta[z], gamma
            );
        }
        c
    }

    /// Sum of the ionization potentials of levels `charge .. charge + levels` [a.u.].
    pub fn total_potential(&self, charge: u32, levels: u32) -> f64 {
        let start = (charge as usize).min(self.potential.len());
        let end = (start + levels as usize).min(self.potential.len());
        self.potential[start..end].iter().sum()
    }
}

/// ADK/PPT tunnelling rate of charge state `z` in a field of `abs` atomic units.
#[inline]
pub fn tunnel_rate(c: &RateLawCoefficients, z: u32, abs: f64) -> f64 {
    let z = z as usize;
    let delta = c.gamma[z] / abs;
    c.beta[z] * (-delta / 3.0 + c.alpha[z] * delta.ln()).exp()
}

/// Barrier-suppression saturation of the tunnelling rate.
///
/// The linear bound wins whenever `quadratic >= linear`, even if the
/// tunnelling rate is lower.
#[inline]
pub fn bsi_rate(quadratic: f64, linear: f64, tunnel: f64) -> f64 {
    if quadratic >= linear {
        linear
    } else if tunnel >= quadratic {
        quadratic
    } else {
        tunnel
    }
}

/// Quadratic and linear barrier-suppression bounds of charge state `z`.
#[inline]
pub fn bsi_bounds(c: &RateLawCoefficients, z: u32, abs: f64) -> (f64, f64) {
    let ratio = HYDROGEN_POTENTIAL / c.potential_ev[z as usize];
    let quadratic = 2.4 * (abs * abs) * ratio * ratio * c.au_to_w0;
    let linear = 0.8 * abs * ratio.sqrt() * c.au_to_w0;
    (quadratic, linear)
}

/// Cycle-averaging factor of the envelope model, `delta = gamma[Z] / F`.
#[inline]
pub fn envelope_correction(polarization: Polarization, delta: f64) -> f64 {
    match polarization {
        Polarization::Linear => (6.0 / (PI * delta)).sqrt(),
        Polarization::Circular => 1.0,
    }
}

/// The closed set of rate-law variants.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum RateLaw {
    /// ADK (`tunnel`) or PPT (`tunnel_full_PPT`), depending on the coefficients.
    Tunnel,
    BarrierSuppression,
    TongLin,
    EnvelopeAveraged(Polarization),
}

impl RateLaw {
    /// Ionization rate of charge state `z` (code units).
    pub fn rate(&self, c: &RateLawCoefficients, z: u32, field: &FieldSample) -> f64 {
        let abs = field.abs;
        match *self {
            RateLaw::Tunnel => tunnel_rate(c, z, abs),
            RateLaw::BarrierSuppression => {
                let (quadratic, linear) = bsi_bounds(c, z, abs);
                bsi_rate(quadratic, linear, tunnel_rate(c, z, abs))
            }
            RateLaw::TongLin => tunnel_rate(c, z, abs) * (-abs * c.lambda[z as usize]).exp(),
            RateLaw::EnvelopeAveraged(polarization) => {
                let delta = c.gamma[z as usize] / abs;
                envelope_correction(polarization, delta) * tunnel_rate(c, z, abs)
            }
        }
    }

    pub fn is_envelope(&self) -> bool {
        matches!(self, RateLaw::EnvelopeAveraged(_))
    }
}
