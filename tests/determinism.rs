//! Determinism Test - Golden Master verification.
//!
//! Verifies that the engine produces identical results across runs
//! when given the same input stream.

use bouquet_stream::{BouquetBuilt, Engine};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Species drawn from a small pool so recipes actually get built
const SPECIES_POOL: usize = 8;

/// Generate a random, valid recipe code
fn generate_recipe(rng: &mut ChaCha8Rng, index: usize) -> String {
    let group = (b'A' + (index % 26) as u8) as char;
    let size = if rng.gen_bool(0.5) { 'L' } else { 'S' };

    let kinds = rng.gen_range(1..=4);
    let mut species = rand::seq::index::sample(rng, SPECIES_POOL, kinds).into_vec();
    species.sort_unstable();

    let mut code = format!("{}{}", group, size);
    let mut sum = 0u32;
    for s in species {
        let qty = rng.gen_range(1..=3u32);
        code.push_str(&format!("{}{}", qty, (b'a' + s as u8) as char));
        sum += qty;
    }
    code.push_str(&(sum + rng.gen_range(0..4)).to_string());
    code
}

/// Generate a deterministic stream: recipes, separator, flowers
fn generate_stream(seed: u64, recipes: usize, flowers: usize) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut lines = Vec::with_capacity(recipes + flowers + 1);

    for i in 0..recipes {
        lines.push(generate_recipe(&mut rng, i));
    }
    lines.push(String::new());

    for _ in 0..flowers {
        let species = (b'a' + rng.gen_range(0..SPECIES_POOL) as u8) as char;
        let size = if rng.gen_bool(0.5) { 'L' } else { 'S' };
        lines.push(format!("{}{}", species, size));
    }

    lines
}

/// Compute a hash of all emissions
fn hash_emissions(emissions: &[BouquetBuilt]) -> u64 {
    let mut hasher = DefaultHasher::new();

    for built in emissions {
        built.line.hash(&mut hasher);
        built.code.hash(&mut hasher);
        built.allocation.hash(&mut hasher);
    }

    hasher.finish()
}

/// Run the engine over a stream and return (emission hash, state hash, emissions)
fn run_engine(lines: &[String]) -> (u64, u64, usize) {
    let mut engine = Engine::new();
    let mut emissions = Vec::new();

    for line in lines {
        if let Some(built) = engine.process_line(line).expect("generated stream is valid") {
            emissions.push(built);
        }
    }

    (hash_emissions(&emissions), engine.state_hash(), emissions.len())
}

#[test]
fn test_determinism_small() {
    const SEED: u64 = 0xDEADBEEF;
    const RUNS: usize = 10;

    let lines = generate_stream(SEED, 50, 1_000);

    let (first_emission_hash, first_state_hash, built) = run_engine(&lines);
    assert!(built > 0, "stream should build at least one bouquet");

    for run in 1..RUNS {
        let (emission_hash, state_hash, _) = run_engine(&lines);

        assert_eq!(
            emission_hash, first_emission_hash,
            "Emission hash mismatch on run {}", run
        );
        assert_eq!(
            state_hash, first_state_hash,
            "State hash mismatch on run {}", run
        );
    }

    println!("Determinism test passed!");
    println!("  Lines: {}", lines.len());
    println!("  Bouquets: {}", built);
    println!("  Emission hash: {:#018x}", first_emission_hash);
    println!("  State hash: {:#018x}", first_state_hash);
}

#[test]
fn test_determinism_large() {
    const SEED: u64 = 0xCAFEBABE;
    const RUNS: usize = 3;

    let lines = generate_stream(SEED, 5_000, 100_000);

    let (first_emission_hash, first_state_hash, built) = run_engine(&lines);

    for run in 1..RUNS {
        let (emission_hash, state_hash, _) = run_engine(&lines);

        assert_eq!(emission_hash, first_emission_hash, "Emission hash mismatch on run {}", run);
        assert_eq!(state_hash, first_state_hash, "State hash mismatch on run {}", run);
    }

    println!("Large determinism test passed!");
    println!("  Bouquets: {}", built);
    println!("  Emission hash: {:#018x}", first_emission_hash);
}

#[test]
fn test_different_seeds_produce_different_results() {
    let lines1 = generate_stream(1, 50, 1_000);
    let lines2 = generate_stream(2, 50, 1_000);

    let (hash1, _, _) = run_engine(&lines1);
    let (hash2, _, _) = run_engine(&lines2);

    assert_ne!(hash1, hash2, "Different seeds should produce different results");
}
