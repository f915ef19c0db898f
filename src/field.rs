//! Field values seen by the ionization engine.
//!
//! The field interpolator of the host code fills an [`InterpolatedFields`]
//! for the particles of a domain; the samplers turn one particle's entry into
//! a [`FieldSample`] in atomic units.

use serde::{Deserialize, Serialize};

/// Laser envelope quantities interpolated at one particle.
#[derive(Serialize, Deserialize, Clone, Copy, Default, PartialEq, Debug)]
pub struct EnvelopeValues {
    /// Transverse envelope field amplitude (code units).
    pub e_env: f64,
    /// Longitudinal envelope field amplitude (code units).
    pub ex_env: f64,
    /// Envelope potential `|A|^2 / 2`.
    pub phi_env: f64,
}

/// Fields interpolated at the particles of a domain, indexed like the particles.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Debug)]
pub struct InterpolatedFields {
    /// Plasma electric field (code units).
    pub e: Vec<[f64; 3]>,
    /// Envelope quantities, filled only when an envelope model is active.
    pub envelope: Vec<EnvelopeValues>,
}

impl InterpolatedFields {
    pub fn with_capacity(n: usize) -> Self {
        InterpolatedFields {
            e: Vec::with_capacity(n),
            envelope: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.e.len()
    }

    pub fn is_empty(&self) -> bool {
        self.e.is_empty()
    }

    pub fn clear(&mut self) {
        self.e.clear();
        self.envelope.clear();
    }
}

/// Field at one particle for one evaluation.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct FieldSample {
    /// Plasma field components (code units).
    pub e: [f64; 3],
    /// Effective field magnitude [a.u.].
    pub abs: f64,
    /// `1 / abs`.
    pub inv: f64,
    /// Envelope potential, for the envelope injector.
    pub phi_env: Option<f64>,
}

impl FieldSample {
    fn from_magnitude(e: [f64; 3], abs: f64, phi_env: Option<f64>) -> Self {
        FieldSample {
            e,
            abs,
            inv: if abs > 0.0 { 1.0 / abs } else { 0.0 },
            phi_env,
        }
    }
}

/// `|E|` of the plasma field, converted to atomic units.
pub fn sample_plain(e: [f64; 3], ec_to_au: f64) -> FieldSample {
    let abs = ec_to_au * (e[0] * e[0] + e[1] * e[1] + e[2] * e[2]).sqrt();
    FieldSample::from_magnitude(e, abs, None)
}

/// `sqrt(|E_plasma|^2 + |E_env|^2 + |E_env,x|^2)` in atomic units.
pub fn sample_envelope(e: [f64; 3], env: &EnvelopeValues, ec_to_au: f64) -> FieldSample {
    let ec2 = ec_to_au * ec_to_au;
    let e_sq = ec2 * (e[0] * e[0] + e[1] * e[1] + e[2] * e[2]);
    let env_sq = ec2 * (env.e_env * env.e_env + env.ex_env * env.ex_env);
    FieldSample::from_magnitude(e, (e_sq + env_sq).sqrt(), Some(env.phi_env))
}
