//! Creation of the electrons freed by ionization and their handoff to the
//! electron species.

use std::f64::consts::{PI, SQRT_2};

use log::debug;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::config::Polarization;
use crate::field::FieldSample;
use crate::particles::{Particle, ParticleSink};

const TWO_PI: f64 = 2.0 * PI;

/// Ponderomotive kick parameters of the envelope model.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct EnvelopeKick {
    pub polarization: Polarization,
    pub cos_phi: f64,
    pub sin_phi: f64,
}

impl EnvelopeKick {
    pub fn new(polarization: Polarization, polarization_phi: f64) -> Self {
        EnvelopeKick {
            polarization,
            cos_phi: polarization_phi.cos(),
            sin_phi: polarization_phi.sin(),
        }
    }
}

/// Electrons created during one timestep of one domain, waiting to be
/// imported into the electron species.
#[derive(Clone, Default, Debug)]
pub struct PendingElectrons {
    particles: Vec<Particle>,
    ion_charges: Vec<i16>,
    save_ion_charge: bool,
}

impl PendingElectrons {
    pub fn new(save_ion_charge: bool) -> Self {
        PendingElectrons {
            particles: Vec::new(),
            ion_charges: Vec::new(),
            save_ion_charge,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Charge of the parent ion before ionization, one entry per electron.
    pub fn ion_charges(&self) -> &[i16] {
        &self.ion_charges
    }

    fn born_from(ion: &Particle, inv_mass: f64, weight: f64) -> Particle {
        Particle {
            position: ion.position,
            momentum: [
                ion.momentum[0] * inv_mass,
                ion.momentum[1] * inv_mass,
                ion.momentum[2] * inv_mass,
            ],
            weight,
            charge: -1,
        }
    }

    /// One electron carrying the weight of all `levels` freed electrons.
    /// `inv_mass` is the electron/ion mass ratio.
    pub fn inject_direct(&mut self, ion: &mut Particle, levels: u32, inv_mass: f64) {
        if levels == 0 {
            return;
        }
        self.particles.push(Self::born_from(ion, inv_mass, levels as f64 * ion.weight));
        if self.save_ion_charge {
            self.ion_charges.push(ion.charge);
        }
        ion.charge += levels as i16;
    }

    /// One electron per freed level, each with the full ion weight and a
    /// momentum kick sampled from the ponderomotive model of the envelope.
    /// `ip_times2_to_minus3ov4` is indexed by charge state.
    pub fn inject_envelope<R: Rng>(
        &mut self,
        ion: &mut Particle,
        levels: u32,
        inv_mass: f64,
        field: &FieldSample,
        kick: &EnvelopeKick,
        ip_times2_to_minus3ov4: &[f64],
        rng: &mut R,
    ) {
        let charge = ion.charge.max(0) as usize;
        // envelope of the vector potential along the polarization direction
        let a_abs = (2.0 * field.phi_env.unwrap_or(0.0)).max(0.0).sqrt();

        for level in 0..levels as usize {
            let mut electron = Self::born_from(ion, inv_mass, ion.weight);
            match kick.polarization {
                Polarization::Linear => {
                    // rms spread of Schroeder et al., PRSTAB 17 (2014)
                    let gaussian: f64 = rng.sample(StandardNormal);
                    let ip_factor = ip_times2_to_minus3ov4.get(charge + level).copied().unwrap_or(0.0);
                    let p_perp = gaussian * a_abs * (1.5 * field.abs).sqrt() * ip_factor;
                    electron.momentum[1] += p_perp * kick.cos_phi;
                    electron.momentum[2] += p_perp * kick.sin_phi;
                    electron.momentum[0] += a_abs * a_abs / 4.0 + p_perp * p_perp / 2.0;
                }
                Polarization::Circular => {
                    let angle = TWO_PI * rng.gen::<f64>();
                    electron.momentum[1] += a_abs * angle.cos() / SQRT_2;
                    electron.momentum[2] += a_abs * angle.sin() / SQRT_2;
                    electron.momentum[0] += a_abs * a_abs / 2.0;
                }
            }
            self.particles.push(electron);
            if self.save_ion_charge {
                self.ion_charges.push(ion.charge);
            }
        }
        ion.charge += levels as i16;
    }

    /// Hands the buffered electrons to `dest`, stamped at `(step + 0.5) * dt`,
    /// and returns the ion charge log of the flushed electrons.
    pub fn finish<S: ParticleSink + ?Sized>(&mut self, dest: &mut S, step: usize, dt: f64) -> Vec<i16> {
        let time = (step as f64 + 0.5) * dt;
        if !self.particles.is_empty() {
            debug!("flushing {} new electrons at t = {:.4}", self.particles.len(), time);
            dest.import_particles(&mut self.particles, time);
        }
        self.particles.clear();
        std::mem::take(&mut self.ion_charges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ion(charge: i16) -> Particle {
        Particle {
            position: [1.0, 2.0, 3.0],
            momentum: [100.0, -50.0, 25.0],
            weight: 0.5,
            charge,
        }
    }

    struct Recorder {
        received: Vec<(usize, f64)>,
    }

    impl ParticleSink for Recorder {
        fn import_particles(&mut self, particles: &mut Vec<Particle>, time: f64) {
            self.received.push((particles.len(), time));
            particles.clear();
        }
    }

    #[test]
    fn test_direct_injection() {
        let mut pending = PendingElectrons::new(true);
        let mut parent = ion(2);
        pending.inject_direct(&mut parent, 3, 0.01);
        assert_eq!(parent.charge, 5);
        assert_eq!(pending.len(), 1);
        let e = pending.particles()[0];
        assert_eq!(e.position, [1.0, 2.0, 3.0]);
        assert_relative_eq!(e.momentum[0], 1.0);
        assert_relative_eq!(e.momentum[1], -0.5);
        assert_relative_eq!(e.weight, 1.5);
        assert_eq!(e.charge, -1);
        assert_eq!(pending.ion_charges(), &[2]);

        pending.inject_direct(&mut parent, 0, 0.01);
        assert_eq!(pending.len(), 1);
        assert_eq!(parent.charge, 5);
    }

    #[test]
    fn test_envelope_injection_circular() {
        let mut pending = PendingElectrons::new(false);
        let mut rng = StdRng::seed_from_u64(3);
        let mut parent = ion(0);
        parent.momentum = [0.0; 3];
        let field = FieldSample { abs: 0.1, inv: 10.0, phi_env: Some(2.0), ..Default::default() };
        let kick = EnvelopeKick::new(Polarization::Circular, 0.0);
        pending.inject_envelope(&mut parent, 2, 1e-3, &field, &kick, &[1.0, 1.0, 1.0], &mut rng);

        assert_eq!(parent.charge, 2);
        assert_eq!(pending.len(), 2);
        assert!(pending.ion_charges().is_empty());
        for e in pending.particles() {
            // A = 2, |p_perp| = A / sqrt(2), p_x = A^2 / 2
            assert_relative_eq!(e.weight, 0.5);
            assert_relative_eq!(e.momentum[0], 2.0);
            assert_relative_eq!(e.momentum[1].hypot(e.momentum[2]), SQRT_2, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_envelope_injection_linear() {
        let mut pending = PendingElectrons::new(true);
        let mut rng = StdRng::seed_from_u64(11);
        let mut parent = ion(1);
        parent.momentum = [0.0; 3];
        let field = FieldSample { abs: 0.2, inv: 5.0, phi_env: Some(0.5), ..Default::default() };
        let kick = EnvelopeKick::new(Polarization::Linear, PI / 2.0);
        pending.inject_envelope(&mut parent, 3, 1e-3, &field, &kick, &[0.9, 0.8, 0.7, 0.6], &mut rng);

        assert_eq!(parent.charge, 4);
        assert_eq!(pending.ion_charges(), &[1, 1, 1]);
        for e in pending.particles() {
            // polarization along z, drift A^2/4 + p_perp^2/2 with A = 1
            assert!(e.momentum[1].abs() < 1e-12);
            let p_perp = e.momentum[2];
            assert_relative_eq!(e.momentum[0], 0.25 + p_perp * p_perp / 2.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_finish_stamps_half_step() {
        let mut pending = PendingElectrons::new(true);
        let mut parent = ion(0);
        pending.inject_direct(&mut parent, 1, 0.01);
        pending.inject_direct(&mut parent, 2, 0.01);
        let mut sink = Recorder { received: Vec::new() };
        let charges = pending.finish(&mut sink, 7, 0.2);
        assert_eq!(sink.received.len(), 1);
        assert_eq!(sink.received[0].0, 2);
        assert_relative_eq!(sink.received[0].1, 1.5);
        assert_eq!(charges, vec![0, 1]);
        assert!(pending.is_empty());
        assert!(pending.ion_charges().is_empty());

        // nothing to hand over
        pending.finish(&mut sink, 8, 0.2);
        assert_eq!(sink.received.len(), 1);
    }
}
