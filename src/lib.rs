//! Field and collisional ionization of ion macro-particles for
//! particle-in-cell plasma codes.
//!
//! Per particle and timestep the engine samples the local field, evaluates
//! the ionization rates of the successive charge states, draws the number
//! of ionized levels in one Monte Carlo test, creates the freed electrons
//! and deposits the ionization current. Electron-impact ionization uses
//! tabulated binary-encounter-Bethe cross-sections shared by all species of
//! one element.

pub mod atomic;
pub mod checkpoint;
pub mod collisional;
pub mod config;
pub mod constants;
pub mod current;
pub mod database;
pub mod electrons;
pub mod error;
pub mod field;
pub mod ionization;
pub mod particles;
pub mod rate;
pub mod sampler;
pub mod tunnel;

pub use atomic::{AtomicData, AtomicSpecies, BuiltinAtomicData};
pub use collisional::{CollisionOutcome, CollisionalIonization};
pub use config::{IonizationConfig, IonizationModel, Polarization};
pub use constants::Normalization;
pub use current::{CurrentDeposit, LineCurrent, NoCurrent};
pub use database::{RateDatabase, RateTable};
pub use electrons::PendingElectrons;
pub use error::{IonizationError, Result};
pub use field::{EnvelopeValues, FieldSample, InterpolatedFields};
pub use ionization::Ionization;
pub use particles::{Particle, ParticleSink, ParticleSpecies};
pub use rate::{RateLaw, RateLawCoefficients};
pub use sampler::MultiLevelSampler;
pub use tunnel::{FieldIonization, IonizationStats};
