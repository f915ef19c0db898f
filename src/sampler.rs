//! Monte Carlo sampling of sequential ionization within one timestep.
//!
//! Successive ionizations `Z -> Z+1 -> ... ` with rates `w_Z, w_{Z+1}, ...`
//! form a chain of exponential decays. The probability of exactly `k`
//! ionizations in `dt` has the closed form (Nuter et al., Phys. Plasmas 18,
//! 033107 (2011))
//!
//! ```text
//! P_k = (w_Z ... w_{Z+k-1}) * sum_{i=0..k} D_i^(k) exp(-w_{Z+i} dt)
//! D_i^(k) = prod_{j != i} 1 / (w_{Z+j} - w_{Z+i})
//! ```
//!
//! The coefficients `D` are updated in place when a level is added, and the
//! cumulative probability is compared against a single uniform draw.

use log::warn;

/// Relative floor on `|w_new - w_i|`, against the larger of the two rates.
pub const RATE_GAP_FLOOR: f64 = 1e-12;

/// Scratch space of the multi-level recursion, sized to the atomic number.
#[derive(Clone, Default, Debug)]
pub struct MultiLevelSampler {
    rates: Vec<f64>,
    coefficients: Vec<f64>,
    floored: u64,
}

impl MultiLevelSampler {
    pub fn new(atomic_number: u32) -> Self {
        MultiLevelSampler {
            rates: Vec::with_capacity(atomic_number as usize + 1),
            coefficients: Vec::with_capacity(atomic_number as usize + 1),
            floored: 0,
        }
    }

    /// Number of rate differences that had to be floored so far.
    pub fn floored_denominators(&self) -> u64 {
        self.floored
    }

    /// Number of levels ionized in `dt` for an ion of charge `charge`, given
    /// the uniform draw `ran_p` in `[0, 1)`. `rate(z)` is the ionization rate
    /// of charge state `z`; it is called for `z` in `charge..atomic_number`,
    /// lazily and at most once each.
    ///
    /// The result never exceeds `atomic_number - charge`.
    pub fn sample<F>(&mut self, charge: u32, atomic_number: u32, ran_p: f64, dt: f64, mut rate: F) -> u32
    where
        F: FnMut(u32) -> f64,
    {
        if charge >= atomic_number {
            return 0;
        }
        let w0 = rate(charge);
        let zp1 = charge + 1;

        // ionization of the last electron
        if zp1 == atomic_number {
            return if ran_p < 1.0 - (-w0 * dt).exp() { 1 } else { 0 };
        }

        let max_levels = atomic_number - zp1;
        self.rates.clear();
        self.coefficients.clear();
        self.rates.push(w0);
        self.coefficients.push(1.0);

        let mut k_times = 0;
        let mut mult = 1.0;
        let mut pint = (-w0 * dt).exp();

        while pint < ran_p && k_times < max_levels {
            mult *= self.rates[k_times as usize];
            if mult == 0.0 {
                // the chain stops at a level that cannot ionize
                break;
            }
            let w_new = rate(zp1 + k_times);
            let mut d_sum = 0.0;
            let mut p_sum = 0.0;
            for i in 0..=k_times as usize {
                let w_i = self.rates[i];
                let gap = self.floor_gap(w_new - w_i, w_new.abs().max(w_i.abs()));
                self.coefficients[i] /= gap;
                d_sum += self.coefficients[i];
                p_sum += (-w_i * dt).exp() * self.coefficients[i];
            }
            self.coefficients.push(-d_sum);
            self.rates.push(w_new);
            p_sum += -d_sum * (-w_new * dt).exp();

            // round-off can make the mass slightly negative when rates are close
            pint += (p_sum * mult).max(0.0);
            k_times += 1;
        }

        // every lower count is ruled out: the remaining mass is full stripping
        if pint < ran_p && k_times == max_levels {
            k_times += 1;
        }
        k_times
    }

    fn floor_gap(&mut self, gap: f64, scale: f64) -> f64 {
        let floor = (RATE_GAP_FLOOR * scale).max(f64::MIN_POSITIVE);
        if gap.abs() >= floor {
            return gap;
        }
        self.floored += 1;
        if self.floored == 1 {
            warn!("ionization rates of successive charge states coincide (gap {:e}), flooring the difference", gap);
        }
        if gap < 0.0 {
            -floor
        } else {
            floor
        }
    }
}
