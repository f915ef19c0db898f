// picion driver: nitrogen gas ionized by a laser pulse, split into domains
// that run their ionization pass in parallel.
//
// command line arguments:
// [1]: number of timesteps to run (0 for init)
// [2]: ionization model (default: tunnel)

use std::env;
use std::f64::consts::PI;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use env_logger::Env;
use log::{error, info, warn};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

use picion::checkpoint::{load_checkpoint, save_checkpoint};
use picion::{
    BuiltinAtomicData, EnvelopeValues, InterpolatedFields, Ionization, IonizationConfig, IonizationError,
    IonizationModel, IonizationStats, LineCurrent, Particle, ParticleSpecies, RateDatabase, Result,
};

// constants

const PROTON_MASS: f64     = 1836.152673;            // proton mass [m_e]

// simulation parameters (normalized units: c = omega_r = m_e = e = 1)

const N_G: usize           = 801;                    // number of grid points
const L: f64               = 40.0 * PI;              // plasma length (20 laser wavelengths)
const N_DOMAINS: usize     = 8;                      // number of domains along x
const N_ION: usize         = 4000;                   // ions per domain
const N_BEAM: usize        = 4000;                   // projectile electrons per domain (collisional model)
const DT: f64              = 0.1;                    // timestep
const WEIGHT: f64          = 1.0e-3;                 // weight of ion superparticles
const ATOMIC_NUMBER: u32   = 7;                      // nitrogen
const ION_MASS: f64        = 14.007 * PROTON_MASS;   // nitrogen mass [m_e]
const ION_THERMAL: f64     = 1.0e-3;                 // ion thermal momentum [m_e c]
const BEAM_MOMENTUM: f64   = 0.1;                    // projectile electron thermal momentum [m_e c], ~ 2.5 keV
const BEAM_DENSITY: f64    = 1.0e9;                  // electron density scaling the collision rate
const SEED: u64            = 0x5eed_1011;            // base seed of the domain random streams

// laser pulse, polarized along y, moving along +x

const E0: f64              = 0.05;                   // peak field (~ 0.39 a.u. at 0.8 um)
const TAU: f64             = 30.0;                   // pulse duration (1/e half width)
const T_PEAK: f64          = 90.0;                   // time of the pulse maximum at x = 0

// additional (derived) constants

const DX: f64              = L / ((N_G - 1) as f64); // spatial grid division
const DOMAIN_LENGTH: f64   = L / (N_DOMAINS as f64); // length of one domain
const CHECKPOINT: &str     = "picion.bin";

// laser field and envelope at (x, t)
fn laser_envelope(x: f64, t: f64) -> f64 {
    let phase = t - x - T_PEAK;
    E0 * (-(phase / TAU) * (phase / TAU)).exp()
}

fn laser_field(x: f64, t: f64) -> f64 {
    laser_envelope(x, t) * (t - x).cos()
}

/// One spatial partition, owning its particles, ionization engine and random stream.
struct Domain {
    ions: ParticleSpecies,
    electrons: ParticleSpecies,
    fields: InterpolatedFields,
    engine: Ionization,
    rng: StdRng,
    current: LineCurrent,
}

// fills the fields seen by `ions` at time `t`
fn interpolate_fields(fields: &mut InterpolatedFields, ions: &[Particle], envelope: bool, t: f64) {
    fields.clear();
    for p in ions.iter() {
        let x = p.position[0];
        if envelope {
            let a = laser_envelope(x, t);
            fields.e.push([0.0; 3]);
            fields.envelope.push(EnvelopeValues { e_env: a, ex_env: 0.0, phi_env: 0.5 * a * a });
        } else {
            fields.e.push([0.0, laser_field(x, t), 0.0]);
        }
    }
}

impl Domain {
    fn advance(&mut self, database: &RateDatabase, t: f64) -> Result<IonizationStats> {
        let Domain { ions, electrons, fields, engine, rng, current } = self;
        let n = ions.len();
        match engine {
            Ionization::None => Ok(IonizationStats::default()),
            Ionization::Field(field) => {
                interpolate_fields(fields, &ions.particles, field.law().is_envelope(), t);
                field.ionize(&mut ions.particles, 0..n, fields, rng, current)
            }
            Ionization::Collisional(collisional) => {
                // each ion meets one randomly chosen electron of the domain
                let n_pairs = n.min(electrons.len());
                let mut partners: Vec<usize> = (0..electrons.len()).collect();
                partners.shuffle(rng);
                let pairs: Vec<(usize, usize)> = partners.into_iter().take(n_pairs).zip(0..n_pairs).collect();
                collisional.collide_pairs(database, &mut electrons.particles, &mut ions.particles, &pairs, BEAM_DENSITY, rng)
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!(">> picion: starting...");

    // reading in command line arguments
    let args: Vec<String> = env::args().collect();
    if args.len() == 1 {
        error!(">> picion: ERROR = need number of steps argument");
        std::process::exit(1);
    }
    let steps: usize = match args[1].parse::<usize>() {
        Ok(s) => s,
        Err(_) => {
            error!(">> picion: ERROR = '{}' is not a number of steps", args[1]);
            std::process::exit(1);
        }
    };
    let model = if args.len() > 2 {
        match args[2].parse::<IonizationModel>() {
            Ok(m) => m,
            Err(err) => {
                error!(">> picion: {}", err);
                std::process::exit(1);
            }
        }
    } else {
        IonizationModel::Tunnel
    };

    let start = Instant::now();
    let result = if steps == 0 { init(model) } else { run(steps, model) };
    if let Err(err) = result {
        error!(">> picion: {}", err);
        std::process::exit(1);
    }
    info!(">> picion: completed in {:.3} sec.", 0.001 * start.elapsed().as_millis() as f64);
}

fn init(model: IonizationModel) -> Result<()> {
    if Path::new(CHECKPOINT).exists() {
        warn!(">> picion: data from a previous calculation are detected.");
        warn!("           To start a new simulation, delete {} before running ./picion 0", CHECKPOINT);
        warn!("           To continue the existing calculation, give the number of steps, e.g. ./picion 1000");
        return Ok(());
    }
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut electrons = Vec::with_capacity(N_DOMAINS);
    let mut ions = Vec::with_capacity(N_DOMAINS);
    for d in 0..N_DOMAINS {
        let x_min = d as f64 * DOMAIN_LENGTH;
        let mut nitrogen = ParticleSpecies::new("nitrogen", ION_MASS, ATOMIC_NUMBER);
        nitrogen.init_particles(N_ION, x_min, x_min + DOMAIN_LENGTH, ION_THERMAL, WEIGHT, 0, &mut rng)?;
        let mut e = ParticleSpecies::electrons("electron");
        if model == IonizationModel::Collisional {
            e.init_particles(N_BEAM, x_min, x_min + DOMAIN_LENGTH, BEAM_MOMENTUM, WEIGHT, -1, &mut rng)?;
        }
        ions.push(nitrogen);
        electrons.push(e);
    }
    info!(">> picion: {} domains initialized with {} ions each", N_DOMAINS, N_ION);
    save_checkpoint(CHECKPOINT, 0, &electrons, &ions)
}

fn run(steps: usize, model: IonizationModel) -> Result<()> {
    let (steps_done, electrons, ions) = load_checkpoint(CHECKPOINT)?;
    if electrons.len() != ions.len() {
        return Err(IonizationError::InvalidConfig(format!(
            "checkpoint holds {} electron and {} ion species",
            electrons.len(),
            ions.len()
        )));
    }

    let config = IonizationConfig {
        model,
        timestep: DT,
        ..Default::default()
    };
    info!(">> picion: model {}, running {} steps from step {}", model, steps, steps_done);

    // tables are built here, before the domains run in parallel
    let mut database = RateDatabase::new();
    let mut domains = Vec::with_capacity(ions.len());
    for (d, (ions, electrons)) in ions.into_iter().zip(electrons.into_iter()).enumerate() {
        let engine = Ionization::from_config(&config, &mut database, &BuiltinAtomicData, ions.atomic_number, ions.mass)?;
        domains.push(Domain {
            fields: InterpolatedFields::with_capacity(ions.len()),
            ions,
            electrons,
            engine,
            rng: StdRng::seed_from_u64(SEED ^ ((steps_done as u64) << 8) ^ d as u64),
            current: LineCurrent::new(N_G, DX),
        });
    }
    let database = database;

    let mut conv_file = OpenOptions::new().append(true).create(true).open("ionization.dat")?;
    let mut total = IonizationStats::default();
    for s in 0..steps {
        let step = steps_done + s;
        let t = step as f64 * DT;

        let stats = domains
            .par_iter_mut()
            .map(|d| d.advance(&database, t))
            .collect::<Result<Vec<IonizationStats>>>()?;
        for st in stats {
            total += st;
        }

        // new electrons enter the simulation half a step later
        let mut created = 0;
        for d in domains.iter_mut() {
            let before = d.electrons.len();
            d.engine.finish(&mut d.electrons, step);
            created += d.electrons.len() - before;
        }

        if s % 200 == 0 {
            let n_e: usize = domains.iter().map(|d| d.electrons.len()).sum();
            info!("step = {:8}  t = {:10.3}  #e = {:8}  new = {:6}", step, t, n_e, created);
            writeln!(conv_file, "{:10}   {:10}   {:10}", step, n_e, total.levels)?;
        }
    }

    let steps_done = steps_done + steps;
    info!(
        ">> picion: {} ions ionized, {} levels freed, {} ions skipped in negligible field",
        total.ionized_ions, total.levels, total.skipped_low_field
    );
    for d in domains.iter() {
        if let Ionization::Field(field) = &d.engine {
            if field.floored_denominators() > 0 {
                warn!(">> picion: {} rate differences floored", field.floored_denominators());
            }
        }
    }

    save_charge_states(&domains)?;
    save_current(&domains)?;
    let electrons: Vec<ParticleSpecies> = domains.iter().map(|d| d.electrons.clone()).collect();
    let ions: Vec<ParticleSpecies> = domains.iter().map(|d| d.ions.clone()).collect();
    save_checkpoint(CHECKPOINT, steps_done, &electrons, &ions)
}

// charge state distribution summed over the domains
fn save_charge_states(domains: &[Domain]) -> Result<()> {
    let mut histogram = vec![0u64; ATOMIC_NUMBER as usize + 1];
    for d in domains {
        for (h, n) in histogram.iter_mut().zip(d.ions.charge_histogram()) {
            *h += n;
        }
    }
    let total: u64 = histogram.iter().sum();
    let mut file = File::create("charge_states.dat")?;
    for (z, n) in histogram.iter().enumerate() {
        writeln!(file, "{:4} \t{:10} \t{:1.6e}", z, n, *n as f64 / (total.max(1) as f64))?;
    }
    Ok(())
}

// ionization current accumulated over the run
fn save_current(domains: &[Domain]) -> Result<()> {
    let mut file = File::create("current.dat")?;
    for i in 0..N_G {
        let (mut jx, mut jy, mut jz) = (0.0, 0.0, 0.0);
        for d in domains {
            jx += d.current.jx[i];
            jy += d.current.jy[i];
            jz += d.current.jz[i];
        }
        writeln!(file, "{:1.6e} \t{:1.6e} \t{:1.6e} \t{:1.6e}", (i as f64) * DX, jx, jy, jz)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laser_stays_within_its_envelope() {
        assert!((laser_envelope(0.0, T_PEAK) - E0).abs() < 1e-12);
        assert!(laser_envelope(0.0, 0.0) < 1e-3 * E0);
        for i in 0..100 {
            let t = 0.7 * i as f64;
            assert!(laser_field(1.0, t).abs() <= laser_envelope(1.0, t));
        }
    }

    #[test]
    fn test_envelope_fields() {
        let ions = vec![Particle { position: [2.0, 0.0, 0.0], ..Default::default() }; 3];
        let mut fields = InterpolatedFields::default();
        interpolate_fields(&mut fields, &ions, true, T_PEAK + 2.0);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.envelope.len(), 3);
        let env = fields.envelope[0];
        assert!((env.phi_env - 0.5 * env.e_env * env.e_env).abs() < 1e-15);
        interpolate_fields(&mut fields, &ions, false, T_PEAK);
        assert!(fields.envelope.is_empty());
        assert_eq!(fields.e[0][0], 0.0);
    }
}
