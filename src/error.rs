use thiserror::Error;

#[derive(Error, Debug)]
pub enum IonizationError {
    #[error("ellipticity {0} not in {{0, 1}} for the envelope ionization model")]
    InvalidEllipticity(f64),

    #[error("no rate database built for atomic number {0}")]
    UnknownAtomicNumber(u32),

    #[error("no atomic data for atomic number {0}")]
    UnsupportedElement(u32),

    #[error("charge state {charge} out of range for atomic number {atomic_number}")]
    ChargeStateOutOfRange { atomic_number: u32, charge: u32 },

    #[error("particle range ends at {end} but only {len} entries are available")]
    RangeOutOfBounds { end: usize, len: usize },

    #[error("configuration error: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, IonizationError>;
