use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use picion::field::sample_plain;
use picion::{
    BuiltinAtomicData, FieldIonization, InterpolatedFields, Ionization, IonizationConfig, IonizationModel,
    LineCurrent, NoCurrent, Particle, ParticleSpecies, RateDatabase,
};

fn ions(n: usize, charge: i16) -> Vec<Particle> {
    (0..n)
        .map(|i| Particle {
            position: [(i % 100) as f64 * 0.05, 0.0, 0.0],
            momentum: [0.0, 0.0, 0.0],
            weight: 1.0,
            charge,
        })
        .collect()
}

#[test]
fn single_level_probability_matches_exponential_law() {
    let config = IonizationConfig::new(IonizationModel::Tunnel);
    let mut engine = FieldIonization::new(&config, &BuiltinAtomicData, 1, 1836.15).unwrap();
    let n = 200_000;
    let mut hydrogen = ions(n, 0);
    let ec_to_au = picion::Normalization::new(config.reference_angular_frequency).ec_to_au;
    let e = [0.0, 0.0, 0.12 / ec_to_au];
    let fields = InterpolatedFields { e: vec![e; n], envelope: Vec::new() };

    let w = engine.rate(0, &sample_plain(e, ec_to_au));
    let expected = 1.0 - (-w * config.timestep).exp();
    assert!(expected > 0.05 && expected < 0.95, "probability {}", expected);

    let mut rng = StdRng::seed_from_u64(2024);
    let stats = engine.ionize(&mut hydrogen, 0..n, &fields, &mut rng, &mut NoCurrent).unwrap();
    let fraction = stats.ionized_ions as f64 / n as f64;
    assert!((fraction - expected).abs() < 5e-3, "{} vs {}", fraction, expected);
    assert_eq!(stats.levels, stats.ionized_ions);
}

#[test]
fn charge_states_stay_bounded_under_random_fields() {
    let mut rng = StdRng::seed_from_u64(77);
    for &model in &[
        IonizationModel::Tunnel,
        IonizationModel::TunnelFullPpt,
        IonizationModel::TunnelTongLin,
        IonizationModel::TunnelBsi,
    ] {
        let config = IonizationConfig::new(model);
        for &z in &[2u32, 6, 10] {
            let mut engine = FieldIonization::new(&config, &BuiltinAtomicData, z, 1836.15 * 2.0 * z as f64).unwrap();
            let n = 300;
            let mut particles = ions(n, 0);
            for _ in 0..40 {
                let scale = 10f64.powf(rng.gen::<f64>() * 4.0 - 3.0);
                let fields = InterpolatedFields {
                    e: (0..n)
                        .map(|_| [scale * rng.gen::<f64>(), scale * rng.gen::<f64>(), scale * rng.gen::<f64>()])
                        .collect(),
                    envelope: Vec::new(),
                };
                engine.ionize(&mut particles, 0..n, &fields, &mut rng, &mut NoCurrent).unwrap();
                assert!(particles.iter().all(|p| p.charge >= 0 && p.charge as u32 <= z), "{} Z={}", model, z);
            }
        }
    }
}

#[test]
fn freed_charge_is_carried_by_new_electrons() {
    let config = IonizationConfig::new(IonizationModel::TunnelBsi);
    let mut engine = FieldIonization::new(&config, &BuiltinAtomicData, 8, 29_148.9).unwrap();
    let n = 500;
    let mut oxygen = ions(n, 0);
    let ec_to_au = picion::Normalization::new(config.reference_angular_frequency).ec_to_au;
    let fields = InterpolatedFields { e: vec![[0.5 / ec_to_au, 0.0, 0.0]; n], envelope: Vec::new() };
    let mut rng = StdRng::seed_from_u64(5);
    let mut current = LineCurrent::new(6, 1.0);
    let mut electrons = ParticleSpecies::electrons("electron");

    for step in 0..20 {
        engine.ionize(&mut oxygen, 0..n, &fields, &mut rng, &mut current).unwrap();
        engine.finish(&mut electrons, step);
    }
    let freed: f64 = oxygen.iter().map(|p| p.weight * p.charge as f64).sum();
    assert!(freed > 0.0);
    assert_relative_eq!(-electrons.total_charge(), freed, max_relative = 1e-12);
    // electrons enter half a step after the step that created them
    let t = electrons.last_import_time.unwrap() / config.timestep;
    assert_relative_eq!(t.fract(), 0.5, epsilon = 1e-9);
    assert!(t < 20.0);

    // current along +x only
    let j = current.total();
    assert!(j[0] > 0.0);
    assert_eq!(j[1], 0.0);
    assert_eq!(j[2], 0.0);
}

#[test]
fn envelope_model_deposits_no_current() {
    let mut config = IonizationConfig::new(IonizationModel::TunnelEnvelopeAveraged);
    config.ellipticity = 1.0;
    let mut engine = FieldIonization::new(&config, &BuiltinAtomicData, 2, 7_294.3).unwrap();
    let n = 200;
    let mut helium = ions(n, 0);
    let ec_to_au = picion::Normalization::new(config.reference_angular_frequency).ec_to_au;
    let a = 0.6 / ec_to_au;
    let fields = InterpolatedFields {
        e: vec![[0.0; 3]; n],
        envelope: vec![picion::EnvelopeValues { e_env: a, ex_env: 0.0, phi_env: 0.5 * a * a }; n],
    };
    let mut rng = StdRng::seed_from_u64(9);
    let mut current = LineCurrent::new(6, 1.0);
    let stats = engine.ionize(&mut helium, 0..n, &fields, &mut rng, &mut current).unwrap();
    assert!(stats.ionized_ions > 0);
    assert_eq!(current.total(), [0.0; 3]);
    // circular polarization: every electron drifts forward by A^2 / 2
    for e in engine.new_electrons.particles() {
        assert_relative_eq!(e.momentum[0], 0.5 * a * a, max_relative = 1e-12);
    }
}

#[test]
fn collisional_and_field_species_share_one_setup() {
    let mut database = RateDatabase::new();
    let collisional_config = IonizationConfig::new(IonizationModel::Collisional);
    let field_config = IonizationConfig::new(IonizationModel::Tunnel);

    let mut carbon =
        Ionization::from_config(&collisional_config, &mut database, &BuiltinAtomicData, 6, 21_874.7).unwrap();
    let carbon_again =
        Ionization::from_config(&collisional_config, &mut database, &BuiltinAtomicData, 6, 21_874.7).unwrap();
    let mut neon = Ionization::from_config(&field_config, &mut database, &BuiltinAtomicData, 10, 36_785.3).unwrap();
    assert_eq!(database.atomic_numbers(), &[6]);

    let (offset_a, offset_b) = match (&carbon, &carbon_again) {
        (Ionization::Collisional(a), Ionization::Collisional(b)) => (a.offset(), b.offset()),
        _ => panic!("collisional engines expected"),
    };
    assert_eq!(offset_a, offset_b);

    let mut electrons = ParticleSpecies::electrons("electron");
    if let Ionization::Collisional(engine) = &mut carbon {
        let mut e = Particle { momentum: [0.2, 0.0, 0.0], weight: 1.0, charge: -1, ..Default::default() };
        let mut ion = Particle { weight: 1.0, ..Default::default() };
        let outcome = engine.collide(&database, &mut e, &mut ion, 1e12, 0.999).unwrap();
        assert_eq!(ion.charge as u32, outcome.levels);
    }
    carbon.finish(&mut electrons, 4);
    neon.finish(&mut electrons, 4);
    if !electrons.is_empty() {
        assert_relative_eq!(electrons.last_import_time.unwrap(), 4.5 * collisional_config.timestep);
    }
    assert!(carbon.new_electrons().map_or(false, |p| p.is_empty()));
}
