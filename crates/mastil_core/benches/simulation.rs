//! Simulation benchmarks for mastil_core.
//!
//! Run with: `cargo bench -p mastil_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mastil_core::ai::{decide, AiState, Strategy};
use mastil_core::combat::resolve_arrival;
use mastil_core::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Arrival resolution against the standard map.
pub fn resolver_benchmark(c: &mut Criterion) {
    let buildings = Layout::standard().spawn(&GameConfig::default());
    let target = BuildingId::from("h4");

    c.bench_function("resolve_arrival", |b| {
        b.iter(|| {
            let mut buildings = buildings.clone();
            black_box(resolve_arrival(
                &mut buildings,
                black_box(&target),
                black_box(37),
                Owner::Player,
            ))
        })
    });
}

/// One AI decision tick per strategy.
pub fn ai_benchmark(c: &mut Criterion) {
    let config = GameConfig::default();
    let buildings = Layout::standard().spawn(&config);
    let home = BuildingId::from("b2");

    for strategy in Strategy::ALL {
        c.bench_function(&format!("ai_decide_{}", strategy.name()), |b| {
            let mut rng = SmallRng::seed_from_u64(7);
            b.iter(|| {
                let mut state = AiState::with_strategy(strategy, 0);
                black_box(decide(
                    &mut state,
                    &buildings,
                    &config,
                    Some(&home),
                    black_box(3_000),
                    &mut rng,
                ))
            })
        });
    }
}

/// Ten virtual minutes of a full game.
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("simulate_10_minutes", |b| {
        b.iter(|| {
            let mut sim = Simulation::new(GameConfig::default(), Layout::standard(), 11)
                .expect("standard data is valid");
            sim.setup("Bench", Element::Fire).expect("fresh game");
            sim.advance(600_000);
            black_box(sim.state_hash())
        })
    });
}

criterion_group!(benches, resolver_benchmark, ai_benchmark, simulation_benchmark);
criterion_main!(benches);
