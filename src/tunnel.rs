//! Field ionization of an ion species by the local electric field.

use std::ops::{AddAssign, Range};

use log::{debug, info};
use rand::Rng;

use crate::atomic::{AtomicData, AtomicSpecies};
use crate::config::{IonizationConfig, IonizationModel, Polarization};
use crate::constants::{Normalization, FIELD_THRESHOLD_AU};
use crate::current::{ionization_current, CurrentDeposit};
use crate::electrons::{EnvelopeKick, PendingElectrons};
use crate::error::{IonizationError, Result};
use crate::field::{sample_envelope, sample_plain, FieldSample, InterpolatedFields};
use crate::particles::{Particle, ParticleSink};
use crate::rate::{RateLaw, RateLawCoefficients};
use crate::sampler::MultiLevelSampler;

/// Counters of one ionization pass.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct IonizationStats {
    /// Ions that lost at least one electron.
    pub ionized_ions: u64,
    /// Levels freed in total.
    pub levels: u64,
    /// Electron macro-particles created.
    pub new_electrons: u64,
    /// Ions skipped because the field was negligible.
    pub skipped_low_field: u64,
}

impl AddAssign for IonizationStats {
    fn add_assign(&mut self, other: Self) {
        self.ionized_ions += other.ionized_ions;
        self.levels += other.levels;
        self.new_electrons += other.new_electrons;
        self.skipped_low_field += other.skipped_low_field;
    }
}

/// Field ionization engine of one ion species in one domain.
#[derive(Clone, Debug)]
pub struct FieldIonization {
    model: IonizationModel,
    law: RateLaw,
    coefficients: RateLawCoefficients,
    normalization: Normalization,
    dt: f64,
    inv_dt: f64,
    /// Electron/ion mass ratio.
    inv_mass: f64,
    kick: Option<EnvelopeKick>,
    sampler: MultiLevelSampler,
    pub new_electrons: PendingElectrons,
}

impl FieldIonization {
    /// `ion_mass` is in electron masses.
    pub fn new<A: AtomicData + ?Sized>(
        config: &IonizationConfig,
        data: &A,
        atomic_number: u32,
        ion_mass: f64,
    ) -> Result<Self> {
        config.validate()?;
        if !(ion_mass > 0.0) {
            return Err(IonizationError::InvalidConfig(format!("ion mass must be positive, got {}", ion_mass)));
        }
        let law = match config.model {
            IonizationModel::Tunnel | IonizationModel::TunnelFullPpt => RateLaw::Tunnel,
            IonizationModel::TunnelTongLin => RateLaw::TongLin,
            IonizationModel::TunnelBsi => RateLaw::BarrierSuppression,
            IonizationModel::TunnelEnvelopeAveraged => {
                RateLaw::EnvelopeAveraged(Polarization::from_ellipticity(config.ellipticity)?)
            }
            other => {
                return Err(IonizationError::InvalidConfig(format!(
                    "'{}' is not a field ionization model",
                    other
                )))
            }
        };
        let kick = match law {
            RateLaw::EnvelopeAveraged(polarization) => Some(EnvelopeKick::new(polarization, config.polarization_phi)),
            _ => None,
        };

        let normalization = Normalization::new(config.reference_angular_frequency);
        let species = AtomicSpecies::new(data, atomic_number)?;
        let coefficients =
            RateLawCoefficients::new(&species, config.model, config.tl_parameter, normalization.au_to_w0);
        info!(
            "field ionization: model {}, Z = {}, dt = {}",
            config.model, atomic_number, config.timestep
        );

        Ok(FieldIonization {
            model: config.model,
            law,
            coefficients,
            normalization,
            dt: config.timestep,
            inv_dt: 1.0 / config.timestep,
            inv_mass: 1.0 / ion_mass,
            kick,
            sampler: MultiLevelSampler::new(atomic_number),
            new_electrons: PendingElectrons::new(config.save_ion_charge),
        })
    }

    pub fn model(&self) -> IonizationModel {
        self.model
    }

    pub fn law(&self) -> RateLaw {
        self.law
    }

    pub fn atomic_number(&self) -> u32 {
        self.coefficients.atomic_number
    }

    pub fn coefficients(&self) -> &RateLawCoefficients {
        &self.coefficients
    }

    /// Field seen by particle `ipart`, using the sampler of the active model.
    pub fn sample_field(&self, fields: &InterpolatedFields, ipart: usize) -> FieldSample {
        let e = fields.e[ipart];
        if self.law.is_envelope() {
            let env = fields.envelope.get(ipart).copied().unwrap_or_default();
            sample_envelope(e, &env, self.normalization.ec_to_au)
        } else {
            sample_plain(e, self.normalization.ec_to_au)
        }
    }

    /// Rate of charge state `z` in `field` (code units).
    pub fn rate(&self, z: u32, field: &FieldSample) -> f64 {
        self.law.rate(&self.coefficients, z, field)
    }

    /// Ionizes `ions[range]` for one timestep. `fields` is indexed like
    /// `ions`; one uniform number is drawn from `rng` per ion in a
    /// non-negligible field.
    pub fn ionize<R: Rng, D: CurrentDeposit + ?Sized>(
        &mut self,
        ions: &mut [Particle],
        range: Range<usize>,
        fields: &InterpolatedFields,
        rng: &mut R,
        current: &mut D,
    ) -> Result<IonizationStats> {
        let len = ions.len().min(fields.len());
        if range.end > len {
            return Err(IonizationError::RangeOutOfBounds { end: range.end, len });
        }
        let atomic_number = self.coefficients.atomic_number;
        let mut stats = IonizationStats::default();

        for ipart in range {
            if ions[ipart].charge < 0 || ions[ipart].charge as u32 >= atomic_number {
                continue;
            }
            let z = ions[ipart].charge as u32;

            let field = self.sample_field(fields, ipart);
            if field.abs < FIELD_THRESHOLD_AU {
                stats.skipped_low_field += 1;
                continue;
            }

            let ran_p = rng.gen::<f64>();
            let law = self.law;
            let coefficients = &self.coefficients;
            let k_times = self
                .sampler
                .sample(z, atomic_number, ran_p, self.dt, |level| law.rate(coefficients, level, &field));
            if k_times == 0 {
                continue;
            }

            stats.ionized_ions += 1;
            stats.levels += k_times as u64;
            let ion = &mut ions[ipart];
            match self.kick {
                None => {
                    let total_potential = self.coefficients.total_potential(z, k_times);
                    let j = ionization_current(total_potential, &field, self.normalization.ec_to_au, self.inv_dt);
                    current.deposit_ionization_current(ion, j);
                    self.new_electrons.inject_direct(ion, k_times, self.inv_mass);
                    stats.new_electrons += 1;
                }
                Some(kick) => {
                    self.new_electrons.inject_envelope(
                        ion,
                        k_times,
                        self.inv_mass,
                        &field,
                        &kick,
                        &self.coefficients.ip_times2_to_minus3ov4,
                        rng,
                    );
                    stats.new_electrons += k_times as u64;
                }
            }
        }
        if stats.ionized_ions > 0 {
            debug!(
                "{}: {} ions ionized, {} levels, {} pending electrons",
                self.model,
                stats.ionized_ions,
                stats.levels,
                self.new_electrons.len()
            );
        }
        Ok(stats)
    }

    /// Moves the pending electrons into `dest` at `(step + 0.5) * dt`.
    pub fn finish<S: ParticleSink + ?Sized>(&mut self, dest: &mut S, step: usize) -> Vec<i16> {
        self.new_electrons.finish(dest, step, self.dt)
    }

    pub fn floored_denominators(&self) -> u64 {
        self.sampler.floored_denominators()
    }
}
