//! Criterion benchmarks for one committed step of each engine.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use fieldsim::automaton::{CellularRuleEngine, Neighborhood, Parity};
use fieldsim::config::Params;
use fieldsim::simulator::{AutomatonSimulator, FieldSimulator, Steppable};

/// Benchmark: one 5x5 circular convolution step on a 256x256 torus.
fn bench_convolution_step(c: &mut Criterion) {
    let mut sim = FieldSimulator::new(256, 256, 5, 0.9998).unwrap();
    sim.seed(30000.0);

    c.bench_function("convolution_step_256", |b| {
        b.iter(|| {
            sim.step();
            black_box(sim.field());
        });
    });
}

/// Benchmark: one parity step on a random 256x256 grid.
fn bench_parity_step(c: &mut Criterion) {
    let params = Params {
        width: 256,
        height: 256,
        ..Params::default()
    };
    let mut sim = AutomatonSimulator::parity(&params).unwrap();

    c.bench_function("parity_step_256", |b| {
        b.iter(|| {
            sim.step();
            black_box(sim.field());
        });
    });

    let wide = CellularRuleEngine::new(Parity, Neighborhood::Moore5);
    let input = sim.field().clone();
    c.bench_function("parity_apply_moore5_256", |b| {
        b.iter(|| black_box(wide.apply(&input)));
    });
}

criterion_group!(benches, bench_convolution_step, bench_parity_step);
criterion_main!(benches);
