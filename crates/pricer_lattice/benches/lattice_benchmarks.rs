//! Criterion benchmarks for pricer_lattice.
//!
//! Measures tree construction, full valuations per exercise rule, and the
//! sequential vs parallel column schedules across step counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::types::{ExerciseStyle, OptionKind};
use pricer_lattice::config::LatticeConfig;
use pricer_lattice::engine::Schedule;
use pricer_lattice::params::LatticeParameters;
use pricer_lattice::pricer::LatticePricer;
use pricer_lattice::rules::{
    BarrierTurnoverSpec, ExerciseProbabilities, RuleSpec, VestingTurnoverSpec,
};
use pricer_lattice::tree::PriceTree;

fn config(steps: usize) -> LatticeConfig {
    LatticeConfig::builder()
        .spot(100.0)
        .strike(100.0)
        .volatility(0.3)
        .rate(0.04)
        .dividend_yield(0.01)
        .maturity(5.0)
        .steps(steps)
        .option_kind(OptionKind::Call)
        .exercise_style(ExerciseStyle::American)
        .build()
        .unwrap()
}

/// Benchmark price tree construction, closed form vs forward multiplication.
fn bench_price_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("price_tree");

    for steps in [100, 500, 2000] {
        let config = config(steps);
        let params = LatticeParameters::derive(&config).unwrap();

        group.bench_with_input(BenchmarkId::new("closed_form", steps), &steps, |b, _| {
            b.iter(|| PriceTree::build(black_box(&config), black_box(&params)));
        });
        group.bench_with_input(BenchmarkId::new("iterative", steps), &steps, |b, _| {
            b.iter(|| PriceTree::build_iterative(black_box(&config), black_box(&params)));
        });
    }

    group.finish();
}

/// Benchmark full valuations for each exercise rule.
fn bench_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("rules");
    let rules = [
        RuleSpec::Plain,
        RuleSpec::VestingTurnover(
            VestingTurnoverSpec::new(1.0, 0.05)
                .with_exercise_probabilities(ExerciseProbabilities::constant(0.1)),
        ),
        RuleSpec::BarrierTurnover(BarrierTurnoverSpec::new(1.0, 0.05, 2.0)),
    ];

    for steps in [100, 1000] {
        let pricer = LatticePricer::new(config(steps));
        for rule in &rules {
            group.bench_with_input(BenchmarkId::new(rule.name(), steps), rule, |b, rule| {
                b.iter(|| pricer.present_value(black_box(rule)).unwrap());
            });
        }
    }

    group.finish();
}

/// Benchmark the column schedule at large step counts.
fn bench_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule");
    group.sample_size(20);

    for steps in [1000, 5000] {
        for (label, schedule) in [("sequential", Schedule::Sequential), ("parallel", Schedule::Parallel)] {
            let pricer = LatticePricer::new(config(steps)).with_schedule(schedule);
            group.bench_with_input(BenchmarkId::new(label, steps), &pricer, |b, pricer| {
                b.iter(|| pricer.present_value(black_box(&RuleSpec::Plain)).unwrap());
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_price_tree, bench_rules, bench_schedule);
criterion_main!(benches);
