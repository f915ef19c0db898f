//! Binary checkpoints of the particle state, for restarting a run.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::particles::ParticleSpecies;

/// Writes the number of completed steps followed by the electron species
/// and the ion species (one of each per domain).
pub fn save_checkpoint<P: AsRef<Path>>(
    path: P,
    steps_done: usize,
    electrons: &[ParticleSpecies],
    ions: &[ParticleSpecies],
) -> Result<()> {
    let mut file = BufWriter::new(File::create(path.as_ref())?);
    bincode::serialize_into(&mut file, &steps_done)?;
    bincode::serialize_into(&mut file, electrons)?;
    bincode::serialize_into(&mut file, ions)?;
    file.flush()?;
    info!(
        "checkpoint written to {} after {} steps ({} electrons)",
        path.as_ref().display(),
        steps_done,
        electrons.iter().map(|s| s.len()).sum::<usize>()
    );
    Ok(())
}

pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<(usize, Vec<ParticleSpecies>, Vec<ParticleSpecies>)> {
    let mut file = BufReader::new(File::open(path.as_ref())?);
    let steps_done: usize = bincode::deserialize_from(&mut file)?;
    let electrons: Vec<ParticleSpecies> = bincode::deserialize_from(&mut file)?;
    let ions: Vec<ParticleSpecies> = bincode::deserialize_from(&mut file)?;
    info!("checkpoint {} loaded, {} steps done", path.as_ref().display(), steps_done);
    Ok((steps_done, electrons, ions))
}
