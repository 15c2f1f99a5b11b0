//! Determinism tests for the random number generation layer.
//!
//! Every random decision in the engine flows through `RngManager` instances
//! seeded via `derive_seed`, so these properties underwrite the
//! reproducibility guarantee of the whole simulator.

use case_scheduler_core_rs::{derive_seed, RngManager};

#[test]
fn test_same_seed_same_sequence() {
    let mut a = RngManager::new(12345);
    let mut b = RngManager::new(12345);
    for _ in 0..1000 {
        assert_eq!(a.next(), b.next());
    }
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = RngManager::new(1);
    let mut b = RngManager::new(2);
    let first: Vec<u64> = (0..10).map(|_| a.next()).collect();
    let second: Vec<u64> = (0..10).map(|_| b.next()).collect();
    assert_ne!(first, second);
}

#[test]
fn test_range_bounds() {
    let mut rng = RngManager::new(99);
    for _ in 0..1000 {
        let v = rng.range(5, 15);
        assert!((5..15).contains(&v));
    }
}

#[test]
fn test_shuffle_is_deterministic_permutation() {
    let mut a = RngManager::new(7);
    let mut b = RngManager::new(7);

    let mut first: Vec<usize> = (0..50).collect();
    let mut second: Vec<usize> = (0..50).collect();
    a.shuffle(&mut first);
    b.shuffle(&mut second);

    assert_eq!(first, second);
    let mut sorted = first.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..50).collect::<Vec<usize>>());
}

#[test]
fn test_poisson_deterministic_and_plausible() {
    let mut a = RngManager::new(31);
    let mut b = RngManager::new(31);
    let draws: Vec<u64> = (0..2000).map(|_| a.poisson(4.0)).collect();
    let again: Vec<u64> = (0..2000).map(|_| b.poisson(4.0)).collect();
    assert_eq!(draws, again);

    let mean = draws.iter().sum::<u64>() as f64 / draws.len() as f64;
    assert!((mean - 4.0).abs() < 0.3, "poisson mean drifted: {mean}");
}

#[test]
fn test_derive_seed_streams_are_independent() {
    let shuffle = derive_seed(42, 0, "shuffle");
    let arrivals = derive_seed(42, 0, "arrivals");
    assert_ne!(shuffle, arrivals);

    // Stable across calls.
    assert_eq!(shuffle, derive_seed(42, 0, "shuffle"));
}

#[test]
fn test_derive_seed_varies_by_iteration_and_run() {
    let base = derive_seed(42, 0, "shuffle");
    assert_ne!(base, derive_seed(42, 1, "shuffle"));
    assert_ne!(base, derive_seed(43, 0, "shuffle"));
}
