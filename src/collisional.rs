//! Electron-impact ionization in binary electron-ion collisions, using the
//! tables of the [`RateDatabase`].

use log::{debug, info};
use rand::Rng;

use crate::atomic::AtomicData;
use crate::config::{IonizationConfig, IonizationModel};
use crate::constants::Normalization;
use crate::database::{grid_index, RateDatabase};
use crate::electrons::PendingElectrons;
use crate::error::{IonizationError, Result};
use crate::particles::{Particle, ParticleSink};
use crate::sampler::MultiLevelSampler;
use crate::tunnel::IonizationStats;

/// Result of one electron-ion collision.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct CollisionOutcome {
    /// Levels ionized.
    pub levels: u32,
    /// Energy given to the freed electrons [m_e c^2].
    pub transferred_energy: f64,
    /// Kinetic energy taken from the incident electron [m_e c^2].
    pub lost_energy: f64,
}

/// Collisional ionization of one ion species in one domain.
#[derive(Clone, Debug)]
pub struct CollisionalIonization {
    atomic_number: u32,
    offset: usize,
    dt: f64,
    ion_mass: f64,
    inv_mass: f64,
    sampler: MultiLevelSampler,
    pub new_electrons: PendingElectrons,
}

impl CollisionalIonization {
    /// Builds (or reuses) the tables of `atomic_number` in `database`.
    pub fn new<A: AtomicData + ?Sized>(
        config: &IonizationConfig,
        database: &mut RateDatabase,
        data: &A,
        atomic_number: u32,
        ion_mass: f64,
    ) -> Result<Self> {
        config.validate()?;
        if config.model != IonizationModel::Collisional {
            return Err(IonizationError::InvalidConfig(format!(
                "'{}' is not the collisional ionization model",
                config.model
            )));
        }
        if !(ion_mass > 0.0) {
            return Err(IonizationError::InvalidConfig(format!("ion mass must be positive, got {}", ion_mass)));
        }
        let normalization = Normalization::new(config.reference_angular_frequency);
        let offset = database.build(atomic_number, &normalization, data)?;
        info!("collisional ionization: Z = {}, table offset {}", atomic_number, offset);

        Ok(CollisionalIonization {
            atomic_number,
            offset,
            dt: config.timestep,
            ion_mass,
            inv_mass: 1.0 / ion_mass,
            sampler: MultiLevelSampler::new(atomic_number),
            new_electrons: PendingElectrons::new(config.save_ion_charge),
        })
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Kinetic energy of `electron` in the rest frame of `ion` [m_e c^2],
    /// and the flux factor `v_rel * gamma_rel / (gamma_e * gamma_i)`.
    pub fn relative_kinematics(&self, electron: &Particle, ion: &Particle) -> (f64, f64) {
        let gamma_e = electron.lorentz_factor(1.0);
        let gamma_i = ion.lorentz_factor(self.ion_mass);
        let ue_dot_ui: f64 = (0..3).map(|i| electron.momentum[i] * ion.momentum[i] * self.inv_mass).sum();
        let gamma_s = (gamma_e * gamma_i - ue_dot_ui).max(1.0);
        let v_s = (1.0 - 1.0 / (gamma_s * gamma_s)).sqrt();
        (gamma_s - 1.0, v_s * gamma_s / (gamma_e * gamma_i))
    }

    /// One collision between `electron` and `ion`. `density` scales the
    /// tabulated cross-section into a rate together with the flux factor;
    /// `ran_p` is a uniform draw in `[0, 1)`.
    ///
    /// Freed electrons go to the pending buffer, and the incident electron
    /// is slowed down by the lost energy, keeping its direction. Fails when
    /// `database` is not the one this engine's tables were built in.
    pub fn collide(
        &mut self,
        database: &RateDatabase,
        electron: &mut Particle,
        ion: &mut Particle,
        density: f64,
        ran_p: f64,
    ) -> Result<CollisionOutcome> {
        let atomic_number = self.atomic_number;
        let table = database.table_at(self.offset, atomic_number)?;
        if ion.charge < 0 || ion.charge as u32 >= atomic_number {
            return Ok(CollisionOutcome::default());
        }
        let z = ion.charge as u32;

        let (energy, flux) = self.relative_kinematics(electron, ion);
        let x = grid_index(energy);
        let rate_factor = density * flux;
        let levels = self
            .sampler
            .sample(z, atomic_number, ran_p, self.dt, |level| rate_factor * table.interpolate_index(level, x).cross_section);
        if levels == 0 {
            return Ok(CollisionOutcome::default());
        }

        let mut outcome = CollisionOutcome { levels, ..Default::default() };
        for level in z..z + levels {
            let sample = table.interpolate_index(level, x);
            outcome.transferred_energy += sample.transferred_energy;
            outcome.lost_energy += sample.lost_energy;
        }

        let p = electron.momentum_sqr().sqrt();
        if p > 0.0 {
            let kinetic = (electron.lorentz_factor(1.0) - 1.0 - outcome.lost_energy).max(0.0);
            let scale = (kinetic * (kinetic + 2.0)).sqrt() / p;
            electron.momentum.iter_mut().for_each(|m| *m *= scale);
        }

        self.new_electrons.inject_direct(ion, levels, self.inv_mass);
        Ok(outcome)
    }

    /// Collides the listed `(electron, ion)` index pairs, one uniform draw per pair.
    pub fn collide_pairs<R: Rng>(
        &mut self,
        database: &RateDatabase,
        electrons: &mut [Particle],
        ions: &mut [Particle],
        pairs: &[(usize, usize)],
        density: f64,
        rng: &mut R,
    ) -> Result<IonizationStats> {
        let mut stats = IonizationStats::default();
        for &(ie, ii) in pairs {
            if ie >= electrons.len() {
                return Err(IonizationError::RangeOutOfBounds { end: ie + 1, len: electrons.len() });
            }
            if ii >= ions.len() {
                return Err(IonizationError::RangeOutOfBounds { end: ii + 1, len: ions.len() });
            }
            let ran_p = rng.gen::<f64>();
            let outcome = self.collide(database, &mut electrons[ie], &mut ions[ii], density, ran_p)?;
            if outcome.levels > 0 {
                stats.ionized_ions += 1;
                stats.levels += outcome.levels as u64;
                stats.new_electrons += 1;
            }
        }
        if stats.ionized_ions > 0 {
            debug!("collisional: {} ions ionized over {} pairs", stats.ionized_ions, pairs.len());
        }
        Ok(stats)
    }

    /// Moves the pending electrons into `dest` at `(step + 0.5) * dt`.
    pub fn finish<S: ParticleSink + ?Sized>(&mut self, dest: &mut S, step: usize) -> Vec<i16> {
        self.new_electrons.finish(dest, step, self.dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic::BuiltinAtomicData;
    use crate::particles::ParticleSpecies;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const HELIUM_MASS: f64 = 7_294.3;

    fn setup() -> (RateDatabase, CollisionalIonization) {
        let mut database = RateDatabase::new();
        let config = IonizationConfig::new(IonizationModel::Collisional);
        let engine = CollisionalIonization::new(&config, &mut database, &BuiltinAtomicData, 2, HELIUM_MASS).unwrap();
        (database, engine)
    }

    /// Density giving `rate * dt = target` for the neutral at the electron's energy.
    fn density_for(engine: &CollisionalIonization, database: &RateDatabase, e: &Particle, ion: &Particle, target: f64) -> f64 {
        let (energy, flux) = engine.relative_kinematics(e, ion);
        let cs = database.table(2).unwrap().interpolate(0, energy).cross_section;
        target / (cs * flux * engine.dt)
    }

    #[test]
    fn test_shared_database() {
        let (mut database, engine) = setup();
        let config = IonizationConfig::new(IonizationModel::Collisional);
        let again = CollisionalIonization::new(&config, &mut database, &BuiltinAtomicData, 2, HELIUM_MASS).unwrap();
        assert_eq!(again.offset(), engine.offset());
        assert_eq!(database.atomic_numbers(), &[2]);
        assert!(CollisionalIonization::new(
            &IonizationConfig::new(IonizationModel::Tunnel),
            &mut database,
            &BuiltinAtomicData,
            2,
            HELIUM_MASS
        )
        .is_err());
    }

    #[test]
    fn test_ion_at_rest_sees_electron_energy() {
        let (_, engine) = setup();
        let e = Particle { momentum: [0.75, 0.0, 0.0], ..Default::default() };
        let ion = Particle::default();
        let (energy, flux) = engine.relative_kinematics(&e, &ion);
        assert_relative_eq!(energy, 0.25, max_relative = 1e-12);
        // v = p / gamma
        assert_relative_eq!(flux, 0.6, max_relative = 1e-12);
    }

    #[test]
    fn test_below_threshold_never_ionizes() {
        let (database, mut engine) = setup();
        // ~ 5 eV, below the 24.6 eV threshold of helium
        let mut e = Particle { momentum: [4.4e-3, 0.0, 0.0], weight: 1.0, charge: -1, ..Default::default() };
        let mut ion = Particle { weight: 1.0, ..Default::default() };
        for r in &[0.0, 0.5, 0.999] {
            let outcome = engine.collide(&database, &mut e, &mut ion, 1e30, *r).unwrap();
            assert_eq!(outcome.levels, 0);
        }
        assert_eq!(ion.charge, 0);
        assert!(engine.new_electrons.is_empty());
    }

    #[test]
    fn test_collision_slows_incident_electron() {
        let (database, mut engine) = setup();
        // ~ 1 keV electron
        let mut e = Particle { momentum: [0.0, 0.0626, 0.0], weight: 1.0, charge: -1, ..Default::default() };
        let mut ion = Particle { position: [0.3, 0.0, 0.0], weight: 2.0, ..Default::default() };
        let density = density_for(&engine, &database, &e, &ion, 50.0);
        let kinetic_before = e.lorentz_factor(1.0) - 1.0;

        let outcome = engine.collide(&database, &mut e, &mut ion, density, 0.5).unwrap();
        assert!(outcome.levels >= 1);
        assert_eq!(ion.charge as u32, outcome.levels);
        assert!(outcome.lost_energy > 0.0);
        assert_relative_eq!(
            e.lorentz_factor(1.0) - 1.0,
            (kinetic_before - outcome.lost_energy).max(0.0),
            max_relative = 1e-9
        );
        assert_eq!(e.momentum[0], 0.0);
        assert!(e.momentum[1] > 0.0);

        let pending = engine.new_electrons.particles();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].position, ion.position);
        assert_relative_eq!(pending[0].weight, 2.0 * outcome.levels as f64);
    }

    #[test]
    fn test_pairs_and_finish() {
        let (database, mut engine) = setup();
        let mut electrons = vec![Particle { momentum: [0.1, 0.0, 0.0], weight: 1.0, charge: -1, ..Default::default() }; 20];
        let mut ions = vec![Particle { weight: 1.0, ..Default::default() }; 20];
        let density = density_for(&engine, &database, &electrons[0], &ions[0], 5.0);
        let pairs: Vec<(usize, usize)> = (0..20).map(|i| (i, i)).collect();
        let mut rng = StdRng::seed_from_u64(17);
        let stats = engine.collide_pairs(&database, &mut electrons, &mut ions, &pairs, density, &mut rng).unwrap();
        assert!(stats.ionized_ions > 0);
        assert!(ions.iter().all(|p| p.charge <= 2));
        assert!(engine.collide_pairs(&database, &mut electrons, &mut ions, &[(0, 20)], density, &mut rng).is_err());

        let mut species = ParticleSpecies::electrons("electron");
        engine.finish(&mut species, 9);
        assert_eq!(species.len() as u64, stats.new_electrons);
        assert_eq!(species.last_import_time, Some(9.5 * engine.dt));
        assert!(engine.new_electrons.is_empty());
    }

    #[test]
    fn test_foreign_database_is_rejected() {
        let (_, mut engine) = setup();
        let mut carbon_only = RateDatabase::new();
        let config = IonizationConfig::new(IonizationModel::Collisional);
        CollisionalIonization::new(&config, &mut carbon_only, &BuiltinAtomicData, 6, 21_874.7).unwrap();

        let mut e = Particle { momentum: [0.2, 0.0, 0.0], weight: 1.0, charge: -1, ..Default::default() };
        let mut ion = Particle { weight: 1.0, ..Default::default() };
        let result = engine.collide(&carbon_only, &mut e, &mut ion, 1e12, 0.999);
        assert!(matches!(result, Err(IonizationError::UnknownAtomicNumber(2))));
        assert_eq!(ion.charge, 0);
        assert_eq!(e.momentum, [0.2, 0.0, 0.0]);
        assert!(engine.new_electrons.is_empty());

        // same element, but built at another offset
        let mut shifted = RateDatabase::new();
        CollisionalIonization::new(&config, &mut shifted, &BuiltinAtomicData, 6, 21_874.7).unwrap();
        CollisionalIonization::new(&config, &mut shifted, &BuiltinAtomicData, 2, HELIUM_MASS).unwrap();
        assert!(engine.collide(&shifted, &mut e, &mut ion, 1e12, 0.999).is_err());
    }
}
