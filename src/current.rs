//! Ionization current: the energy spent to free bound electrons is taken
//! from the field through a current along `E`,
//!
//! ```text
//! J = (sum of Ip over the freed levels) / |E|^2 / dt * E
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::AU_TO_MEC2;
use crate::field::FieldSample;
use crate::particles::Particle;

/// Field-solver side of the current deposition.
pub trait CurrentDeposit {
    /// Adds the ionization current `j` (per unit weight) carried by `ion`.
    fn deposit_ionization_current(&mut self, ion: &Particle, j: [f64; 3]);
}

/// Discards the current, for setups without a field solver (or tests).
#[derive(Clone, Copy, Default, Debug)]
pub struct NoCurrent;

impl CurrentDeposit for NoCurrent {
    fn deposit_ionization_current(&mut self, _ion: &Particle, _j: [f64; 3]) {}
}

/// Current of one ionization event. `total_potential` is in atomic units.
pub fn ionization_current(total_potential: f64, field: &FieldSample, ec_to_au: f64, inv_dt: f64) -> [f64; 3] {
    let factor = AU_TO_MEC2 * ec_to_au * ec_to_au * inv_dt * field.inv * field.inv * total_potential;
    [factor * field.e[0], factor * field.e[1], factor * field.e[2]]
}

/// Current density on a 1D grid of `n_g` nodes spaced by `dx`, deposited
/// with linear weighting.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct LineCurrent {
    pub dx: f64,
    pub jx: Vec<f64>,
    pub jy: Vec<f64>,
    pub jz: Vec<f64>,
}

impl LineCurrent {
    pub fn new(n_g: usize, dx: f64) -> Self {
        LineCurrent {
            dx,
            jx: vec![0.0; n_g],
            jy: vec![0.0; n_g],
            jz: vec![0.0; n_g],
        }
    }

    pub fn clear(&mut self) {
        for j in [&mut self.jx, &mut self.jy, &mut self.jz].iter_mut() {
            j.iter_mut().for_each(|v| *v = 0.0);
        }
    }

    /// Sum of each current component over the grid.
    pub fn total(&self) -> [f64; 3] {
        [self.jx.iter().sum(), self.jy.iter().sum(), self.jz.iter().sum()]
    }
}

impl CurrentDeposit for LineCurrent {
    fn deposit_ionization_current(&mut self, ion: &Particle, j: [f64; 3]) {
        let n_g = self.jx.len();
        if n_g < 2 {
            return;
        }
        let x = ion.position[0] / self.dx;
        if !(x >= 0.0) || x > (n_g - 1) as f64 {
            return;
        }
        let p = (x.trunc() as usize).min(n_g - 2);
        let c2 = x - p as f64;
        let c1 = 1.0 - c2;
        let w = ion.weight;
        self.jx[p] += c1 * w * j[0];
        self.jx[p + 1] += c2 * w * j[0];
        self.jy[p] += c1 * w * j[1];
        self.jy[p + 1] += c2 * w * j[1];
        self.jz[p] += c1 * w * j[2];
        self.jz[p + 1] += c2 * w * j[2];
    }
}
