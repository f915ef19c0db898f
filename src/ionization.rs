//! Per-species selection of the ionization mechanism.

use crate::atomic::AtomicData;
use crate::collisional::CollisionalIonization;
use crate::config::{IonizationConfig, IonizationModel};
use crate::database::RateDatabase;
use crate::electrons::PendingElectrons;
use crate::error::Result;
use crate::particles::ParticleSink;
use crate::tunnel::FieldIonization;

/// Ionization engine of one ion species in one domain.
#[derive(Clone, Debug)]
pub enum Ionization {
    None,
    Field(FieldIonization),
    Collisional(CollisionalIonization),
}

impl Ionization {
    /// Builds the engine selected by `config.model`. The collisional model
    /// registers its element in `database`, which must therefore be set up
    /// before domains run in parallel.
    pub fn from_config<A: AtomicData + ?Sized>(
        config: &IonizationConfig,
        database: &mut RateDatabase,
        data: &A,
        atomic_number: u32,
        ion_mass: f64,
    ) -> Result<Self> {
        if atomic_number == 0 {
            return Ok(Ionization::None);
        }
        Ok(if config.model.is_field_ionization() {
            Ionization::Field(FieldIonization::new(config, data, atomic_number, ion_mass)?)
        } else if config.model == IonizationModel::Collisional {
            Ionization::Collisional(CollisionalIonization::new(config, database, data, atomic_number, ion_mass)?)
        } else {
            Ionization::None
        })
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Ionization::None)
    }

    pub fn new_electrons(&self) -> Option<&PendingElectrons> {
        match self {
            Ionization::None => None,
            Ionization::Field(field) => Some(&field.new_electrons),
            Ionization::Collisional(collisional) => Some(&collisional.new_electrons),
        }
    }

    /// Flushes the pending electrons of either engine, see
    /// [`PendingElectrons::finish`].
    pub fn finish<S: ParticleSink + ?Sized>(&mut self, dest: &mut S, step: usize) -> Vec<i16> {
        match self {
            Ionization::None => Vec::new(),
            Ionization::Field(field) => field.finish(dest, step),
            Ionization::Collisional(collisional) => collisional.finish(dest, step),
        }
    }
}
