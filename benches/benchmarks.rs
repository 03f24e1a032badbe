//! Benchmarks for tree fitting, boosting and prediction.
//!
//! Run with: cargo bench
//! Or for specific benchmarks: cargo bench -- boosting_fit

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;

use mcboost_rs::loss::{pseudo_residuals, softmax_axis0};
use mcboost_rs::{BoostParams, GradientBoostingClassifier, RegressionTree, TreeParams};

// ============================================================================
// Data Generation Utilities
// ============================================================================

/// Random features with labels from bucketing a linear score into `n_classes`.
fn generate_classification_data(
    n_samples: usize,
    n_features: usize,
    n_classes: usize,
) -> (Array2<f64>, Array1<usize>) {
    let x = Array2::random((n_samples, n_features), Uniform::new(0.0, 1.0).unwrap());
    let y = x
        .axis_iter(Axis(0))
        .map(|row| {
            let score = row.iter().enumerate().map(|(j, v)| v / (j + 1) as f64).sum::<f64>();
            let max = (1..=n_features).map(|j| 1.0 / j as f64).sum::<f64>();
            ((score / max * n_classes as f64) as usize).min(n_classes - 1)
        })
        .collect();
    (x, y)
}

// ============================================================================
// Loss Benchmarks
// ============================================================================

fn bench_loss(c: &mut Criterion) {
    let mut group = c.benchmark_group("loss");

    for n_samples in [1000, 10000].iter() {
        let scores = Array2::random((5, *n_samples), Uniform::new(-3.0, 3.0).unwrap());
        let y: Vec<usize> = (0..*n_samples).map(|i| i % 5).collect();

        group.throughput(Throughput::Elements(*n_samples as u64));
        group.bench_with_input(BenchmarkId::new("softmax", n_samples), &scores, |b, s| {
            b.iter(|| softmax_axis0(black_box(&s.view())))
        });

        let probs = softmax_axis0(&scores.view());
        group.bench_with_input(BenchmarkId::new("pseudo_residuals", n_samples), &probs, |b, p| {
            b.iter(|| pseudo_residuals(black_box(&p.view()), black_box(&y), 2))
        });
    }

    group.finish();
}

// ============================================================================
// Tree Benchmarks
// ============================================================================

fn bench_regression_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("regression_tree");

    for n_samples in [500, 2000, 5000].iter() {
        let x = Array2::random((*n_samples, 10), Uniform::new(0.0, 1.0).unwrap());
        let target = Array1::random(*n_samples, Uniform::new(-1.0, 1.0).unwrap());

        group.throughput(Throughput::Elements(*n_samples as u64));
        group.bench_with_input(
            BenchmarkId::new("depth_first", n_samples),
            n_samples,
            |b, _| {
                let params = TreeParams::default();
                b.iter(|| RegressionTree::fit(black_box(&x.view()), black_box(&target.view()), &params))
            },
        );
        group.bench_with_input(
            BenchmarkId::new("best_first", n_samples),
            n_samples,
            |b, _| {
                let params = TreeParams {
                    max_depth: None,
                    max_leaf_nodes: Some(8),
                    ..TreeParams::default()
                };
                b.iter(|| RegressionTree::fit(black_box(&x.view()), black_box(&target.view()), &params))
            },
        );
    }

    group.finish();
}

// ============================================================================
// Boosting Benchmarks
// ============================================================================

fn bench_boosting_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("boosting_fit");
    group.sample_size(10);

    for n_classes in [3, 10].iter() {
        for n_samples in [500, 2000].iter() {
            let (x, y) = generate_classification_data(*n_samples, 8, *n_classes);
            let id = format!("{}x{}", n_samples, n_classes);

            group.throughput(Throughput::Elements((*n_samples * *n_classes) as u64));
            for parallel in [false, true] {
                let name = if parallel { "parallel" } else { "sequential" };
                group.bench_with_input(BenchmarkId::new(name, &id), &id, |b, _| {
                    b.iter(|| {
                        let params = BoostParams::default()
                            .with_n_estimators(20)
                            .with_parallel(parallel);
                        let mut model = GradientBoostingClassifier::new(params);
                        model.fit(black_box(&x), black_box(&y)).unwrap();
                        model
                    })
                });
            }
        }
    }

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");

    let (x_train, y_train) = generate_classification_data(2000, 8, 5);
    let mut model = GradientBoostingClassifier::new(BoostParams::default().with_n_estimators(50));
    model.fit(&x_train, &y_train).unwrap();

    for n_samples in [100, 1000, 10000].iter() {
        let (x, _) = generate_classification_data(*n_samples, 8, 5);

        group.throughput(Throughput::Elements(*n_samples as u64));
        group.bench_with_input(BenchmarkId::new("predict", n_samples), &x, |b, x| {
            b.iter(|| model.predict(black_box(x)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("predict_proba", n_samples), &x, |b, x| {
            b.iter(|| model.predict_proba(black_box(x)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_loss,
    bench_regression_tree,
    bench_boosting_fit,
    bench_predict,
);

criterion_main!(benches);
