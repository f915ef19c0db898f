//! Tabulated electron-impact ionization data.
//!
//! For every charge state of an element the integrated cross-section, mean
//! transferred energy and mean lost energy are tabulated on a logarithmic grid
//! of incident electron energies (1 eV - 10 MeV, 100 points), following the
//! relativistic binary-encounter-Bethe model of Pérez et al., Phys. Plasmas 19,
//! 083104 (2012). Tables are built once per atomic number and shared by every
//! species of the same element.

use log::debug;

use crate::atomic::AtomicData;
use crate::constants::{grid_a2, Normalization, E_MASS_EV, GRID_A1, N_POINTS};
use crate::error::{IonizationError, Result};

/// Incident electron energy of grid point `i` [m_e c^2].
#[inline]
pub fn grid_energy(i: usize) -> f64 {
    (i as f64 / grid_a2()).exp() / GRID_A1
}

/// Fractional grid index of an incident energy [m_e c^2], clamped to the grid.
#[inline]
pub fn grid_index(energy: f64) -> f64 {
    let x = grid_a2() * (GRID_A1 * energy).ln();
    if x > 0.0 {
        x.min((N_POINTS - 1) as f64)
    } else {
        // also catches NaN from non-positive energies
        0.0
    }
}

/// Interpolated table values at one incident energy.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct CrossSectionSample {
    /// Integrated cross-section (normalized).
    pub cross_section: f64,
    /// Mean energy transferred to the new electron [m_e c^2].
    pub transferred_energy: f64,
    /// Mean energy lost by the incident electron [m_e c^2].
    pub lost_energy: f64,
}

/// Registry of ionization tables, one block of `Z * N_POINTS` entries per
/// distinct atomic number.
///
/// Built through `&mut self` during setup and only read afterwards.
#[derive(Clone, Default, Debug)]
pub struct RateDatabase {
    atomic_numbers: Vec<u32>,
    offsets: Vec<usize>,
    cross_section: Vec<f64>,
    transferred_energy: Vec<f64>,
    lost_energy: Vec<f64>,
}

impl RateDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic numbers whose tables have been built, in build order.
    pub fn atomic_numbers(&self) -> &[u32] {
        &self.atomic_numbers
    }

    /// Offset of the table for `atomic_number`, if it has been built.
    pub fn offset(&self, atomic_number: u32) -> Option<usize> {
        self.atomic_numbers
            .iter()
            .position(|&z| z == atomic_number)
            .map(|i| self.offsets[i])
    }

    /// Returns the offset of the table for `atomic_number`, building it first
    /// if no species of this element has asked for it before.
    pub fn build<A: AtomicData + ?Sized>(
        &mut self,
        atomic_number: u32,
        normalization: &Normalization,
        data: &A,
    ) -> Result<usize> {
        let mut offset = 0;
        for &z in &self.atomic_numbers {
            if z == atomic_number {
                return Ok(offset);
            }
            offset += z as usize * N_POINTS;
        }
        if atomic_number == 0 {
            return Ok(offset);
        }

        debug!("building collisional ionization tables for Z = {}", atomic_number);
        let size = offset + atomic_number as usize * N_POINTS;
        let mut cs = vec![0.0; atomic_number as usize * N_POINTS];
        let mut te = vec![0.0; cs.len()];
        let mut le = vec![0.0; cs.len()];
        let norm = normalization.cross_section_normalization();

        for zstar in 0..atomic_number {
            let bound = atomic_number - zstar;
            // binding energies of the remaining orbitals, outermost first [m_e c^2]
            let binding: Vec<f64> = (0..bound)
                .map(|k| data.binding_energy(atomic_number, zstar, k).map(|b| b / E_MASS_EV))
                .collect::<Result<_>>()?;

            for i in 0..N_POINTS {
                let loc = zstar as usize * N_POINTS + i;
                let ep = grid_energy(i);
                let mut occupation = 1.0;
                for k in 0..bound as usize {
                    let bp = binding[k];
                    // equal binding energies form one shell, accounted once with its occupation
                    if k + 1 < bound as usize && bp == binding[k + 1] {
                        occupation += 1.0;
                        continue;
                    }
                    let e = ep / bp;
                    if e > 1.0 {
                        let (sk, wk) = beb_orbital(ep, bp, occupation * norm);
                        cs[loc] += sk;
                        te[loc] += wk * bp;
                        le[loc] += (wk + sk) * bp;
                    }
                    occupation = 1.0;
                }
                if cs[loc] > 0.0 {
                    te[loc] /= cs[loc];
                    le[loc] /= cs[loc];
                }
            }
        }

        self.cross_section.extend_from_slice(&cs);
        self.transferred_energy.extend_from_slice(&te);
        self.lost_energy.extend_from_slice(&le);
        debug_assert_eq!(self.cross_section.len(), size);
        self.atomic_numbers.push(atomic_number);
        self.offsets.push(offset);
        Ok(offset)
    }

    /// Table of one element, looked up by atomic number.
    pub fn table(&self, atomic_number: u32) -> Result<RateTable<'_>> {
        let offset = self
            .offset(atomic_number)
            .ok_or(IonizationError::UnknownAtomicNumber(atomic_number))?;
        Ok(self.slice_table(offset, atomic_number))
    }

    /// Table of one element from an offset previously returned by [`build`](Self::build).
    ///
    /// Fails with `UnknownAtomicNumber` unless this database built the
    /// element's table at `offset`.
    pub fn table_at(&self, offset: usize, atomic_number: u32) -> Result<RateTable<'_>> {
        if self.offset(atomic_number) != Some(offset) {
            return Err(IonizationError::UnknownAtomicNumber(atomic_number));
        }
        Ok(self.slice_table(offset, atomic_number))
    }

    fn slice_table(&self, offset: usize, atomic_number: u32) -> RateTable<'_> {
        let end = offset + atomic_number as usize * N_POINTS;
        RateTable {
            atomic_number,
            cross_section: &self.cross_section[offset..end],
            transferred_energy: &self.transferred_energy[offset..end],
            lost_energy: &self.lost_energy[offset..end],
        }
    }
}

/// Binary-encounter-Bethe contribution of one shell with binding energy `bp`
/// to an incident electron of energy `ep` (both in m_e c^2). `s_norm` carries
/// the occupation number and the cross-section normalization.
///
/// Returns the integrated cross-section and the energy-weighted term of the
/// transferred energy, in units of `bp`.
fn beb_orbital(ep: f64, bp: f64, s_norm: f64) -> (f64, f64) {
    let e = ep / bp;
    // no orbital kinetic energy tables: take U = B
    let up = bp;
    let betae2 = 1.0 - 1.0 / ((1.0 + ep) * (1.0 + ep));
    let betab2 = 1.0 - 1.0 / ((1.0 + bp) * (1.0 + bp));
    let betau2 = 1.0 - 1.0 / ((1.0 + up) * (1.0 + up));
    let s0 = s_norm / (bp * (betae2 + betab2 + betau2));
    let mut ep2 = 1.0 / (1.0 + ep * 0.5);
    ep2 *= ep2;
    let a1 = (1.0 + 2.0 * ep) / (1.0 + e) * ep2;
    let a2 = (e - 1.0) * bp * bp * 0.5 * ep2;
    let a3 = (betae2 / (1.0 - betae2)).ln() - betae2 - (2.0 * bp).ln();
    let sk = s0 * (0.5 * a3 * (1.0 - 1.0 / (e * e)) + 1.0 - 1.0 / e + a2 - a1 * e.ln());
    let wk = s0
        * (0.5 * a3 * (e - 1.0) * (e - 1.0) / e / (e + 1.0) + 2.0 * (0.5 * (e + 1.0)).ln() - e.ln()
            + 0.25 * a2 * (e - 1.0)
            - a1 * (e * e.ln() - (e + 1.0) * (0.5 * (e + 1.0)).ln()));
    (sk, wk)
}

/// Read-only view of the tables of one element.
#[derive(Clone, Copy, Debug)]
pub struct RateTable<'a> {
    atomic_number: u32,
    cross_section: &'a [f64],
    transferred_energy: &'a [f64],
    lost_energy: &'a [f64],
}

impl<'a> RateTable<'a> {
    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    /// Tabulated values of charge state `zstar` at grid point `i`.
    pub fn at(&self, zstar: u32, i: usize) -> CrossSectionSample {
        let loc = zstar as usize * N_POINTS + i;
        CrossSectionSample {
            cross_section: self.cross_section[loc],
            transferred_energy: self.transferred_energy[loc],
            lost_energy: self.lost_energy[loc],
        }
    }

    /// Linear interpolation of charge state `zstar` at fractional grid index `x`.
    /// Indices outside `[0, N_POINTS - 1]` take the nearest tabulated value.
    pub fn interpolate_index(&self, zstar: u32, x: f64) -> CrossSectionSample {
        if !(x > 0.0) {
            return self.at(zstar, 0);
        }
        let last = N_POINTS - 1;
        if x >= last as f64 {
            return self.at(zstar, last);
        }
        let i = x as usize;
        let a = x - i as f64;
        let lo = self.at(zstar, i);
        let hi = self.at(zstar, i + 1);
        CrossSectionSample {
            cross_section: (1.0 - a) * lo.cross_section + a * hi.cross_section,
            transferred_energy: (1.0 - a) * lo.transferred_energy + a * hi.transferred_energy,
            lost_energy: (1.0 - a) * lo.lost_energy + a * hi.lost_energy,
        }
    }

    /// Interpolated values of charge state `zstar` for an incident kinetic energy [m_e c^2].
    pub fn interpolate(&self, zstar: u32, energy: f64) -> CrossSectionSample {
        self.interpolate_index(zstar, grid_index(energy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic::BuiltinAtomicData;
    use approx::assert_relative_eq;

    fn database(zs: &[u32]) -> RateDatabase {
        let mut db = RateDatabase::new();
        let norm = Normalization::new(1.8e15);
        for &z in zs {
            db.build(z, &norm, &BuiltinAtomicData).unwrap();
        }
        db
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut db = RateDatabase::new();
        let norm = Normalization::new(1.8e15);
        let he = db.build(2, &norm, &BuiltinAtomicData).unwrap();
        let n = db.build(7, &norm, &BuiltinAtomicData).unwrap();
        assert_eq!(he, 0);
        assert_eq!(n, 2 * N_POINTS);
        assert_eq!(db.build(7, &norm, &BuiltinAtomicData).unwrap(), n);
        assert_eq!(db.build(2, &norm, &BuiltinAtomicData).unwrap(), he);
        assert_eq!(db.atomic_numbers(), &[2, 7]);
        assert_eq!(db.cross_section.len(), 9 * N_POINTS);
    }

    #[test]
    fn test_zero_atomic_number_is_noop() {
        let mut db = database(&[1]);
        let offset = db.build(0, &Normalization::new(1.8e15), &BuiltinAtomicData).unwrap();
        assert_eq!(offset, N_POINTS);
        assert_eq!(db.atomic_numbers(), &[1]);
        assert_eq!(db.cross_section.len(), N_POINTS);
    }

    #[test]
    fn test_unknown_atomic_number() {
        let db = database(&[1]);
        assert!(matches!(db.table(8), Err(IonizationError::UnknownAtomicNumber(8))));
    }

    #[test]
    fn test_threshold_and_positivity() {
        let db = database(&[1]);
        let table = db.table(1).unwrap();
        for i in 0..N_POINTS {
            let e_ev = grid_energy(i) * E_MASS_EV;
            let s = table.at(0, i);
            if e_ev <= 13.598434 {
                assert_eq!(s.cross_section, 0.0, "below threshold at {} eV", e_ev);
                assert_eq!(s.transferred_energy, 0.0);
            } else {
                assert!(s.cross_section > 0.0, "above threshold at {} eV", e_ev);
                assert!(s.lost_energy > s.transferred_energy);
            }
        }
    }

    #[test]
    fn test_exact_grid_index_round_trip() {
        let db = database(&[6]);
        let table = db.table(6).unwrap();
        for zstar in 0..6 {
            for i in 0..N_POINTS {
                assert_eq!(table.interpolate_index(zstar, i as f64), table.at(zstar, i));
            }
        }
    }

    #[test]
    fn test_interpolation_midpoint_and_clamping() {
        let db = database(&[2]);
        let table = db.table(2).unwrap();
        let lo = table.at(0, 40);
        let hi = table.at(0, 41);
        let mid = table.interpolate_index(0, 40.5);
        assert_relative_eq!(mid.cross_section, 0.5 * (lo.cross_section + hi.cross_section));
        assert_eq!(table.interpolate_index(0, -3.0), table.at(0, 0));
        assert_eq!(table.interpolate_index(0, 250.0), table.at(0, N_POINTS - 1));
        assert_eq!(table.interpolate(0, 1.0e3), table.at(0, N_POINTS - 1));
        assert_eq!(table.interpolate(0, 0.0), table.at(0, 0));
    }

    #[test]
    fn test_grid_index_inverts_grid_energy() {
        for &i in &[0usize, 1, 17, 50, 99] {
            assert_relative_eq!(grid_index(grid_energy(i)), i as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_shared_shell_merging() {
        // the two 1s electrons of neutral helium form one shell with occupation 2
        let db = database(&[2]);
        let table = db.table(2).unwrap();
        let i = 60;
        let ep = grid_energy(i);
        let norm = Normalization::new(1.8e15).cross_section_normalization();
        let (sk, _) = beb_orbital(ep, 24.587389 / E_MASS_EV, 2.0 * norm);
        assert_relative_eq!(table.at(0, i).cross_section, sk, max_relative = 1e-12);
    }
}
