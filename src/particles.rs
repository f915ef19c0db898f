//! Macro-particle records and the species containers new electrons are
//! imported into.

use log::debug;
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::error::{IonizationError, Result};

/// One macro-particle. Momenta are in units of `m_e c` for every species, so
/// an electron moving with an ion has the ion's momentum scaled by the
/// electron/ion mass ratio.
#[derive(Serialize, Deserialize, Clone, Copy, Default, PartialEq, Debug)]
pub struct Particle {
    pub position: [f64; 3],
    pub momentum: [f64; 3],
    pub weight: f64,
    pub charge: i16,
}

impl Particle {
    pub fn momentum_sqr(&self) -> f64 {
        self.momentum.iter().map(|p| p * p).sum()
    }

    /// Lorentz factor for a particle of `mass` electron masses.
    pub fn lorentz_factor(&self, mass: f64) -> f64 {
        (1.0 + self.momentum_sqr() / (mass * mass)).sqrt()
    }
}

/// Destination of newly created particles (the host's particle system).
pub trait ParticleSink {
    /// Takes over `particles` (leaving the vector empty), stamped with the
    /// simulated `time` of their creation.
    fn import_particles(&mut self, particles: &mut Vec<Particle>, time: f64);
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ParticleSpecies {
    pub name: String,
    /// Mass in electron masses.
    pub mass: f64,
    /// Atomic number of ions, 0 for electrons.
    pub atomic_number: u32,
    pub particles: Vec<Particle>,
    /// Number of particles imported from ionization so far.
    pub imported: u64,
    pub last_import_time: Option<f64>,
}

impl ParticleSpecies {
    pub fn new(name: &str, mass: f64, atomic_number: u32) -> Self {
        ParticleSpecies {
            name: name.to_string(),
            mass,
            atomic_number,
            particles: Vec::new(),
            imported: 0,
            last_import_time: None,
        }
    }

    pub fn electrons(name: &str) -> Self {
        ParticleSpecies::new(name, 1.0, 0)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Places `np` particles uniformly in `[x_min, x_max)` along x, with a
    /// thermal momentum spread of `thermal_momentum` (per component, m_e c).
    pub fn init_particles<R: Rng>(
        &mut self,
        np: usize,
        x_min: f64,
        x_max: f64,
        thermal_momentum: f64,
        weight: f64,
        charge: i16,
        rng: &mut R,
    ) -> Result<()> {
        let normal = Normal::new(0.0, thermal_momentum)
            .map_err(|e| IonizationError::InvalidConfig(format!("thermal momentum: {:?}", e)))?;
        self.particles.reserve(np);
        for _i in 0..np {
            let p0 = Particle {
                position: [x_min + (x_max - x_min) * rng.gen::<f64>(), 0.0, 0.0],
                momentum: [rng.sample(normal), rng.sample(normal), rng.sample(normal)],
                weight,
                charge,
            };
            self.particles.push(p0);
        }
        Ok(())
    }

    /// Number of particles in each charge state `0..=atomic_number`.
    pub fn charge_histogram(&self) -> Vec<u64> {
        let mut histogram = vec![0; self.atomic_number as usize + 1];
        for p in &self.particles {
            if let Some(h) = histogram.get_mut(p.charge.max(0) as usize) {
                *h += 1;
            }
        }
        histogram
    }

    /// Sum of `weight * charge` over the species.
    pub fn total_charge(&self) -> f64 {
        self.particles.iter().map(|p| p.weight * p.charge as f64).sum()
    }
}

impl ParticleSink for ParticleSpecies {
    fn import_particles(&mut self, particles: &mut Vec<Particle>, time: f64) {
        if particles.is_empty() {
            return;
        }
        debug!("{}: importing {} particles at t = {:.4}", self.name, particles.len(), time);
        self.imported += particles.len() as u64;
        self.last_import_time = Some(time);
        self.particles.append(particles);
    }
}
