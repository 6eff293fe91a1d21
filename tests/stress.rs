//! Stress Tests - Push the engine to its limits.
//!
//! These tests verify correctness under extreme conditions:
//! - Large catalogues that are mostly unbuildable
//! - Recipes using every species
//! - Heavy duplication of recipe codes
//! - Maximum slot counts and quantities

use bouquet_stream::{
    DecodeError, Engine, EngineError, InternalError, Phase, Size, Species,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn sp(c: char) -> Species {
    Species::from_char(c).unwrap()
}

// ============================================================================
// Catalogue Stress Tests
// ============================================================================

#[test]
fn test_large_catalogue_scan() {
    const RECIPES: u32 = 50_000;
    let mut engine = Engine::with_capacity(RECIPES as usize + 1);

    // None of these can be built: no 'y' flowers ever arrive
    for i in 0..RECIPES {
        let group = (b'A' + (i % 26) as u8) as char;
        let line = format!("{}L1y{}", group, 2 + i % 1000);
        assert_eq!(engine.process_line(&line).unwrap(), None);
    }
    engine.process_line("ZS1a1").unwrap();
    engine.process_line("").unwrap();

    let built = engine.process_line("aS").unwrap().expect("last recipe is buildable");
    assert_eq!(built.code, "ZS1a1");
    assert_eq!(engine.catalogue().len(), RECIPES as usize);

    for _ in 0..1_000 {
        assert_eq!(engine.process_line("aL").unwrap(), None);
    }
    assert_eq!(engine.inventory().count_of(sp('a'), Size::Large), 1_000);
}

#[test]
fn test_recipe_with_every_species() {
    let mut code = String::from("AL");
    for species in Species::all() {
        code.push('1');
        code.push(species.as_char());
    }
    code.push_str("26");

    let mut engine = Engine::new();
    engine.process_line(&code).unwrap();
    engine.process_line("").unwrap();

    // Reverse order, so only the final 'a' completes it
    let species: Vec<Species> = Species::all().collect();
    for s in species.iter().rev().take(25) {
        assert_eq!(engine.process_line(&format!("{}L", s)).unwrap(), None);
    }

    let built = engine.process_line("aL").unwrap().unwrap();
    assert_eq!(built.code, code);
    assert_eq!(built.allocation.len(), 26);
    assert_eq!(built.allocation.total(), 26);
    assert!(engine.inventory().is_empty());
    assert!(engine.catalogue().is_empty());
}

#[test]
fn test_many_duplicate_codes() {
    let mut engine = Engine::new();

    for _ in 0..1_000 {
        engine.process_line("AS1a1").unwrap();
    }
    engine.process_line("BS1a1").unwrap();
    engine.process_line("").unwrap();
    assert_eq!(engine.catalogue().len(), 1_001);

    let built = engine.process_line("aS").unwrap().unwrap();
    assert_eq!(built.code, "AS1a1");
    assert_eq!(engine.catalogue().len(), 1);
    assert_eq!(engine.catalogue()[0].code(), "BS1a1");

    let built = engine.process_line("aS").unwrap().unwrap();
    assert_eq!(built.code, "BS1a1");
    assert!(engine.catalogue().is_empty());

    // Nothing left to build
    assert_eq!(engine.process_line("aS").unwrap(), None);
}

// ============================================================================
// Boundary Value Tests
// ============================================================================

#[test]
fn test_max_total_slots() {
    let mut engine = Engine::new();
    engine.process_line("AL1a4294967295").unwrap();
    engine.process_line("").unwrap();

    assert_eq!(engine.catalogue()[0].total_slots(), u32::MAX);
    assert_eq!(engine.catalogue()[0].filler_slots(), u32::MAX - 1);

    for _ in 0..10_000 {
        assert_eq!(engine.process_line("aL").unwrap(), None);
    }
    assert_eq!(engine.inventory().count_of_size(Size::Large), 10_000);
}

#[test]
fn test_total_slots_overflow_is_malformed() {
    let mut engine = Engine::new();
    let err = engine.process_line("AL1a4294967296").unwrap_err();

    assert_eq!(
        err,
        EngineError::Decode(DecodeError::MalformedRecipe("AL1a4294967296".into()))
    );
    assert_eq!(engine.phase(), Phase::Halted);
}

#[test]
fn test_required_sum_beyond_u32() {
    let mut engine = Engine::new();
    let code = "AL4294967295a4294967295b4294967295";
    let err = engine.process_line(code).unwrap_err();

    assert_eq!(
        err,
        EngineError::Decode(DecodeError::SlotsBelowRequired {
            code: code.into(),
            total: u32::MAX,
            required: 2 * u32::MAX as u64,
        })
    );
}

#[test]
fn test_max_single_quantity_accepted() {
    let mut engine = Engine::new();
    engine.process_line("AL4294967295a4294967295").unwrap();
    engine.process_line("").unwrap();

    assert_eq!(engine.catalogue()[0].required_sum(), u32::MAX);
    assert_eq!(engine.catalogue()[0].filler_slots(), 0);
}

// ============================================================================
// Long Stream Tests
// ============================================================================

#[test]
fn test_long_stream_accounting() {
    const FLOWERS: u64 = 1_000_000;
    let mut rng = ChaCha8Rng::seed_from_u64(0xF10E);
    let mut engine = Engine::new();

    for i in 0..2_000u32 {
        let group = (b'A' + (i % 26) as u8) as char;
        let size = if i % 2 == 0 { 'L' } else { 'S' };
        let a = (b'a' + (i % 20) as u8) as char;
        let b = (b'a' + (i % 20) as u8 + 1 + (i % 5) as u8) as char;
        let line = format!("{}{}{}{}{}{}{}", group, size, 1 + i % 3, a, 1 + i % 2, b, 5 + i % 7);
        engine.process_line(&line).unwrap();
    }
    engine.process_line("").unwrap();

    let mut consumed = 0u64;
    let mut built = 0u64;

    for _ in 0..FLOWERS {
        let species = (b'a' + rng.gen_range(0..26u8)) as char;
        let size = if rng.gen_bool(0.5) { 'L' } else { 'S' };

        if let Some(bouquet) = engine.process_line(&format!("{}{}", species, size)).unwrap() {
            built += 1;
            consumed += bouquet.allocation.total();
        }
    }

    let stats = engine.stats();
    assert_eq!(stats.flowers, FLOWERS);
    assert_eq!(stats.bouquets, built);
    assert_eq!(stats.recipes, 2_000);
    assert_eq!(stats.lines, 2_001 + FLOWERS);
    assert_eq!(engine.inventory().total(), FLOWERS - consumed);

    println!("Long stream: {} bouquets, {} flowers left", built, engine.inventory().total());
}

#[test]
fn test_halted_engine_rejects_everything() {
    let mut engine = Engine::new();
    engine.process_line("AL1a1").unwrap();
    assert!(engine.process_line("bogus").is_err());

    for _ in 0..10_000 {
        assert_eq!(
            engine.process_line("aL").unwrap_err(),
            EngineError::Internal(InternalError::Halted)
        );
        assert_eq!(
            engine.process_line("").unwrap_err(),
            EngineError::Internal(InternalError::Halted)
        );
    }

    assert_eq!(engine.phase(), Phase::Halted);
    assert_eq!(engine.catalogue().len(), 1);
    assert!(engine.inventory().is_empty());
}
