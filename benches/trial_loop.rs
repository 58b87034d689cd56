/// A/A trial loop benchmarks
///
/// Measures assignment + aggregation + t-test cost per trial across analysis
/// levels and dataset sizes.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use aa_pitfalls::experiment::{
    aggregate, run_trial, salt_for_trial, AaTestConfig, AnalysisLevel, TrialAssignment,
};
use aa_pitfalls::simulate::{generate, SyntheticConfig};

fn dataset(users: usize) -> aa_pitfalls::dataset::Dataset {
    generate(&SyntheticConfig {
        users,
        ..SyntheticConfig::default()
    })
    .expect("bench dataset fits the row cap")
}

fn bench_aggregate_levels(c: &mut Criterion) {
    let data = dataset(200);
    let assignment = TrialAssignment::new(&data, salt_for_trial(0, 0));

    let mut group = c.benchmark_group("aggregate");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(data.len() as u64));

    for level in AnalysisLevel::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, &level| {
            b.iter(|| black_box(aggregate(&data, level, &assignment)));
        });
    }

    group.finish();
}

fn bench_trial_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_trial");
    group.measurement_time(Duration::from_secs(5));
    let config = AaTestConfig::default();

    for users in [100usize, 500, 2_000].iter() {
        let data = dataset(*users);
        group.throughput(Throughput::Elements(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(users), users, |b, _| {
            let mut trial = 0;
            b.iter(|| {
                trial += 1;
                black_box(run_trial(&data, trial, &config).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate_levels, bench_trial_sizes);
criterion_main!(benches);
