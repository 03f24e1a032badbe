//! Fit a classifier on three synthetic clusters and report held-out metrics.
//!
//! Run with: cargo run --example multiclass
//! Per-round deviance is logged at debug level: RUST_LOG=mcboost_rs=debug

use mcboost_rs::evaluation::{accuracy, confusion_matrix, log_loss};
use mcboost_rs::{BoostParams, GradientBoostingClassifier};
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Normal;
use rand::SeedableRng;
use rand::rngs::StdRng;

const SPECIES: [&str; 3] = ["amber", "cobalt", "moss"];
const CENTERS: [[f64; 2]; 3] = [[0.0, 0.0], [3.0, 3.0], [6.0, 0.0]];

fn make_clusters(per_class: usize, rng: &mut StdRng) -> (Array2<f64>, Array1<&'static str>) {
    let n = per_class * CENTERS.len();
    let mut x = Array2::random_using((n, 2), Normal::new(0.0, 1.0).unwrap(), rng);
    let mut y = Vec::with_capacity(n);
    for (i, mut row) in x.axis_iter_mut(Axis(0)).enumerate() {
        let class = i % CENTERS.len();
        row[0] += CENTERS[class][0];
        row[1] += CENTERS[class][1];
        y.push(SPECIES[class]);
    }
    (x, Array1::from(y))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut rng = StdRng::seed_from_u64(2024);
    let (x_train, y_train) = make_clusters(200, &mut rng);
    let (x_test, y_test) = make_clusters(100, &mut rng);

    let params = BoostParams::default()
        .with_n_estimators(50)
        .with_learning_rate(0.1)
        .with_max_depth(Some(3));
    let mut model = GradientBoostingClassifier::new(params);
    model.fit(&x_train, &y_train)?;

    let preds = model.predict(&x_test)?;
    let proba = model.predict_proba(&x_test)?;
    let classes = model.classes().unwrap_or_default();
    let y_idx: Vec<usize> = y_test
        .iter()
        .filter_map(|label| classes.iter().position(|c| c == label))
        .collect();

    println!("classes:   {:?}", classes);
    println!("accuracy:  {:.4}", accuracy(&y_test, &preds));
    println!("log loss:  {:.4}", log_loss(&y_idx, &proba.view(), 1e-15));
    if let Some(deviance) = model.train_deviance() {
        println!(
            "deviance:  {:.4} -> {:.4}",
            deviance.first().copied().unwrap_or(f64::NAN),
            deviance.last().copied().unwrap_or(f64::NAN)
        );
    }

    println!("confusion matrix (rows = true, cols = predicted):");
    let cm = confusion_matrix(&y_test, &preds, classes);
    for (label, row) in classes.iter().zip(cm.axis_iter(Axis(0))) {
        println!("  {:>7} {:?}", label, row.to_vec());
    }

    let stages = model.staged_predict(&x_test)?;
    for round in [1, 10, 25, 50] {
        if let Some(stage) = stages.get(round - 1) {
            println!("after {:>2} rounds: accuracy {:.4}", round, accuracy(&y_test, stage));
        }
    }

    Ok(())
}
