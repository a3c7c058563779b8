use benchmarks::{cleaned_records, fitted_features};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flight_fare::cleaning::Cleaner;
use flight_fare::model::{ForestConfig, RandomForestRegressor, Regressor};
use flight_fare::synthetic::SyntheticFlights;

fn bench_clean(c: &mut Criterion) {
    let cleaner = Cleaner::default();
    let mut group = c.benchmark_group("clean");
    for n in [1000, 10000].iter() {
        let frame = SyntheticFlights::new(42).frame(*n).expect("Failed to generate frame");
        group.bench_with_input(BenchmarkId::from_parameter(n), &frame, |b, frame| {
            b.iter(|| black_box(cleaner.clean_records(black_box(frame.clone()))));
        });
    }
    group.finish();
}

fn bench_fit_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_features");
    for n in [1000, 10000].iter() {
        let (records, prices) = cleaned_records(*n, 42).expect("Failed to build records");
        group.bench_with_input(BenchmarkId::from_parameter(n), &(records, prices), |b, (r, p)| {
            b.iter(|| black_box(fitted_features(black_box(r), black_box(p))));
        });
    }
    group.finish();
}

fn bench_apply_features(c: &mut Criterion) {
    let (records, prices) = cleaned_records(10000, 42).expect("Failed to build records");
    let features = fitted_features(&records, &prices).expect("Failed to fit features");

    c.bench_function("apply_features_10000", |b| {
        b.iter(|| black_box(features.apply(black_box(&records))));
    });
}

fn bench_fit_forest(c: &mut Criterion) {
    let (records, prices) = cleaned_records(2000, 42).expect("Failed to build records");
    let features = fitted_features(&records, &prices).expect("Failed to fit features");
    let x = features.apply(&records).expect("Failed to apply features");

    let mut group = c.benchmark_group("fit_forest");
    group.sample_size(10);
    for n_trees in [10, 50].iter() {
        let regressor = RandomForestRegressor::new(ForestConfig {
            n_trees: *n_trees,
            ..ForestConfig::default()
        });
        group.bench_with_input(BenchmarkId::from_parameter(n_trees), &regressor, |b, regressor| {
            b.iter(|| black_box(regressor.fit(x.view(), black_box(&prices))));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_clean,
    bench_fit_features,
    bench_apply_features,
    bench_fit_forest
);
criterion_main!(benches);
