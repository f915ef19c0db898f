//! Atomic structure constants: ionization potentials, quantum numbers of the
//! outermost bound electron and orbital binding energies.
//!
//! The engine only talks to the [`AtomicData`] trait. [`BuiltinAtomicData`]
//! covers hydrogen to neon, which is what most laser-plasma ionization
//! injection setups need (H, He, N, O, Ne, ...).

use serde::{Deserialize, Serialize};

use crate::error::{IonizationError, Result};

/// Lookup of atomic structure constants for an ion of given atomic number and
/// charge state. Energies are in eV.
pub trait AtomicData {
    /// Energy needed to remove the outermost electron of the ion with `charge`.
    fn ionization_energy(&self, atomic_number: u32, charge: u32) -> Result<f64>;

    /// Azimuthal quantum number `l` of the outermost electron.
    fn azimuthal_quantum_number(&self, atomic_number: u32, charge: u32) -> Result<u32>;

    /// Magnetic quantum number `m` of the outermost electron.
    fn magnetic_quantum_number(&self, atomic_number: u32, charge: u32) -> Result<i32>;

    /// Number of equivalent outermost electrons sharing `|m|`.
    fn magnetic_degeneracy(&self, atomic_number: u32, charge: u32) -> Result<f64>;

    /// Binding energy of bound orbital `orbital` of the ion, counting from the
    /// outermost electron (`0`) inwards to `atomic_number - charge - 1`.
    fn binding_energy(&self, atomic_number: u32, charge: u32, orbital: u32) -> Result<f64>;
}

// first ionization energies of all charge states [eV], NIST ASD
const IONIZATION_ENERGIES: [&[f64]; 10] = [
    &[13.598434],
    &[24.587389, 54.417765],
    &[5.391715, 75.640097, 122.454359],
    &[9.322699, 18.211150, 153.896203, 217.718584],
    &[8.298019, 25.154830, 37.930590, 259.371500, 340.225800],
    &[11.260288, 24.383154, 47.887780, 64.493520, 392.090500, 489.993200],
    &[14.534130, 29.601250, 47.445300, 77.473500, 97.890100, 552.067330, 667.046100],
    &[13.618055, 35.121120, 54.935540, 77.413500, 113.899000, 138.118900, 739.326830, 871.409880],
    &[17.422820, 34.970810, 62.707980, 87.175000, 114.249000, 157.163110, 185.186800, 953.898050,
      1103.117480],
    &[21.564540, 40.962970, 63.423300, 97.190000, 126.247000, 157.934000, 207.271000, 239.097000,
      1195.807840, 1362.199160],
];

/// A subshell of the first two shells, as `(l, number of the last electron
/// that fits in it)` with electrons counted from the innermost one.
#[derive(Clone, Copy, PartialEq, Debug)]
struct Subshell {
    l: u32,
    last: u32,
}

fn subshell_of(electron: u32) -> Subshell {
    match electron {
        1..=2 => Subshell { l: 0, last: 2 },   // 1s
        3..=4 => Subshell { l: 0, last: 4 },   // 2s
        _     => Subshell { l: 1, last: 10 },  // 2p
    }
}

/// Built-in tables for Z = 1..=10.
///
/// Quantum numbers follow from the ground-state configuration. Within the 2p
/// subshell the `m = 0` pair is filled first, so the outermost electron has
/// `m = 0` for up to two 2p electrons and `|m| = 1` beyond. Orbital binding
/// energies are taken as the ionization energy of the ion in which that
/// subshell is the outermost one, so all electrons of a subshell share a
/// binding energy.
#[derive(Serialize, Deserialize, Clone, Copy, Default, Debug)]
pub struct BuiltinAtomicData;

impl BuiltinAtomicData {
    fn energies(atomic_number: u32) -> Result<&'static [f64]> {
        if atomic_number == 0 || atomic_number as usize > IONIZATION_ENERGIES.len() {
            return Err(IonizationError::UnsupportedElement(atomic_number));
        }
        Ok(IONIZATION_ENERGIES[atomic_number as usize - 1])
    }

    /// Number of bound electrons left in the ion.
    fn bound_electrons(atomic_number: u32, charge: u32) -> Result<u32> {
        Self::energies(atomic_number)?;
        if charge >= atomic_number {
            return Err(IonizationError::ChargeStateOutOfRange { atomic_number, charge });
        }
        Ok(atomic_number - charge)
    }
}

impl AtomicData for BuiltinAtomicData {
    fn ionization_energy(&self, atomic_number: u32, charge: u32) -> Result<f64> {
        Self::bound_electrons(atomic_number, charge)?;
        Ok(Self::energies(atomic_number)?[charge as usize])
    }

    fn azimuthal_quantum_number(&self, atomic_number: u32, charge: u32) -> Result<u32> {
        let n = Self::bound_electrons(atomic_number, charge)?;
        Ok(subshell_of(n).l)
    }

    fn magnetic_quantum_number(&self, atomic_number: u32, charge: u32) -> Result<i32> {
        let n = Self::bound_electrons(atomic_number, charge)?;
        let shell = subshell_of(n);
        if shell.l == 0 || n - 4 <= 2 {
            Ok(0)
        } else {
            Ok(1)
        }
    }

    fn magnetic_degeneracy(&self, atomic_number: u32, charge: u32) -> Result<f64> {
        match self.magnetic_quantum_number(atomic_number, charge)? {
            0 => Ok(1.0),
            _ => Ok(2.0),
        }
    }

    fn binding_energy(&self, atomic_number: u32, charge: u32, orbital: u32) -> Result<f64> {
        let n = Self::bound_electrons(atomic_number, charge)?;
        if orbital >= n {
            return Err(IonizationError::ChargeStateOutOfRange {
                atomic_number,
                charge: charge + orbital,
            });
        }
        let outermost = subshell_of(n - orbital).last.min(n);
        self.ionization_energy(atomic_number, atomic_number - outermost)
    }
}

/// Per-charge-state atomic constants of one ion species, fixed at construction.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct AtomicSpecies {
    pub atomic_number: u32,
    /// Ionization potential of each charge state [eV].
    pub potential: Vec<f64>,
    pub azimuthal_quantum_number: Vec<u32>,
    pub magnetic_quantum_number: Vec<i32>,
    pub degeneracy: Vec<f64>,
}

impl AtomicSpecies {
    pub fn new<A: AtomicData + ?Sized>(data: &A, atomic_number: u32) -> Result<Self> {
        let size = atomic_number as usize;
        let mut species = AtomicSpecies {
            atomic_number,
            potential: Vec::with_capacity(size),
            azimuthal_quantum_number: Vec::with_capacity(size),
            magnetic_quantum_number: Vec::with_capacity(size),
            degeneracy: Vec::with_capacity(size),
        };
        for z in 0..atomic_number {
            species.potential.push(data.ionization_energy(atomic_number, z)?);
            species.azimuthal_quantum_number.push(data.azimuthal_quantum_number(atomic_number, z)?);
            species.magnetic_quantum_number.push(data.magnetic_quantum_number(atomic_number, z)?);
            species.degeneracy.push(data.magnetic_degeneracy(atomic_number, z)?);
        }
        Ok(species)
    }
}
