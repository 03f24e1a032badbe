//! Invariants of the boosting procedure that hold for any dataset:
//! determinism, probability normalisation, leaf coverage and input checks.

use approx::assert_relative_eq;
use mcboost_rs::loss::softmax_axis0;
use mcboost_rs::{BoostError, BoostParams, GradientBoostingClassifier, ParamError};
use ndarray::{Array1, Array2, Axis, array};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// Random features with labels drawn from a noisy rule over four classes.
fn generate_noisy_data(n_samples: usize, n_features: usize, seed: u64) -> (Array2<f64>, Array1<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::random_using(
        (n_samples, n_features),
        Uniform::new(0.0, 1.0).unwrap(),
        &mut rng,
    );
    let noise = Array1::random_using(n_samples, Uniform::new(-0.2, 0.2).unwrap(), &mut rng);

    let y = x
        .axis_iter(Axis(0))
        .zip(noise.iter())
        .map(|(row, &eps)| {
            let score = row[0] + 0.5 * row[1 % n_features] + eps;
            (score * 2.6).clamp(0.0, 3.0) as u8
        })
        .collect();
    (x, y)
}

fn params() -> BoostParams {
    BoostParams::default()
        .with_n_estimators(8)
        .with_max_depth(Some(3))
}

#[test]
fn test_repeated_fits_are_identical() {
    let (x, y) = generate_noisy_data(150, 4, 1);

    let mut a = GradientBoostingClassifier::new(params());
    let mut b = GradientBoostingClassifier::new(params());
    a.fit(&x, &y).unwrap();
    b.fit(&x, &y).unwrap();

    assert_eq!(a.decision_function(&x).unwrap(), b.decision_function(&x).unwrap());
    assert_eq!(a.train_deviance(), b.train_deviance());
}

#[test]
fn test_parallel_matches_sequential() {
    let (x, y) = generate_noisy_data(150, 4, 2);

    let mut parallel = GradientBoostingClassifier::new(params().with_parallel(true));
    let mut sequential = GradientBoostingClassifier::new(params().with_parallel(false));
    parallel.fit(&x, &y).unwrap();
    sequential.fit(&x, &y).unwrap();

    let (ep, es) = (parallel.ensemble().unwrap(), sequential.ensemble().unwrap());
    assert_eq!(ep.len(), es.len());
    for (rp, rs) in ep.rounds().zip(es.rounds()) {
        for (p, s) in rp.iter().zip(rs.iter()) {
            assert_eq!(p.leaf_values, s.leaf_values);
        }
    }
    assert_eq!(
        parallel.decision_function(&x).unwrap(),
        sequential.decision_function(&x).unwrap()
    );
}

#[test]
fn test_predict_is_idempotent() {
    let (x, y) = generate_noisy_data(120, 3, 3);
    let mut model = GradientBoostingClassifier::new(params());
    model.fit(&x, &y).unwrap();

    let first = model.predict(&x).unwrap();
    let second = model.predict(&x).unwrap();
    assert_eq!(first, second);
    assert_eq!(model.predict_proba(&x).unwrap(), model.predict_proba(&x).unwrap());
}

#[test]
fn test_probabilities_sum_to_one_after_every_round() {
    let (x, y) = generate_noisy_data(100, 3, 4);
    let mut model = GradientBoostingClassifier::new(params());
    model.fit(&x, &y).unwrap();

    let proba = model.predict_proba(&x).unwrap();
    for row in proba.axis_iter(Axis(0)) {
        assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-12);
        assert!(row.iter().all(|&p| p > 0.0 && p < 1.0));
    }

    // Partial sums of the ensemble stay normalised as well
    let ensemble = model.ensemble().unwrap();
    let mut scores = Array2::<f64>::zeros((ensemble.n_classes(), x.nrows()));
    for round in ensemble.rounds() {
        for (class, entry) in round.iter().enumerate() {
            let leaves = entry.tree.apply(&x.view());
            for (i, &leaf) in leaves.iter().enumerate() {
                scores[[class, i]] += entry.leaf_values.get(leaf).unwrap();
            }
        }
        let probs = softmax_axis0(&scores.view());
        for column in probs.axis_iter(Axis(1)) {
            assert_relative_eq!(column.sum(), 1.0, epsilon = 1e-12);
        }
    }
    assert_eq!(scores, model.decision_function(&x).unwrap());
}

#[test]
fn test_every_training_leaf_has_a_value() {
    let (x, y) = generate_noisy_data(90, 5, 5);
    let mut model = GradientBoostingClassifier::new(params().with_max_leaf_nodes(Some(6)));
    model.fit(&x, &y).unwrap();

    let ensemble = model.ensemble().unwrap();
    assert_eq!(ensemble.n_rounds(), 8);
    for round in ensemble.rounds() {
        assert_eq!(round.len(), ensemble.n_classes());
        for entry in round {
            assert!(entry.tree.n_leaves() <= 6);
            let leaves = entry.tree.apply(&x.view());
            assert!(leaves.iter().all(|&leaf| entry.leaf_values.get(leaf).is_some()));
            assert_eq!(entry.leaf_values.len(), {
                let mut distinct = leaves.to_vec();
                distinct.sort_unstable();
                distinct.dedup();
                distinct.len()
            });
        }
    }
}

#[test]
fn test_single_leaf_trees_use_closed_form() {
    let x = array![[0.0], [1.0], [2.0], [3.0]];
    let y = array!["a", "b", "b", "c"];
    let params = BoostParams::default()
        .with_n_estimators(1)
        .with_max_depth(Some(0))
        .with_learning_rate(0.5);
    let mut model = GradientBoostingClassifier::new(params);
    model.fit(&x, &y).unwrap();

    // p = 1/3 everywhere, so each class's leaf value depends only on its count
    let k = 3.0;
    let n = 4.0;
    for (class, count) in [1.0, 2.0, 1.0].into_iter().enumerate() {
        let s1 = count * (1.0 - 1.0 / k) - (n - count) / k;
        let abs_pos: f64 = 1.0 - 1.0 / k;
        let abs_neg: f64 = 1.0 / k;
        let s2 = count * abs_pos * (1.0 - abs_pos) + (n - count) * abs_neg * (1.0 - abs_neg);
        let expected = 0.5 * (k - 1.0) / k * s1 / (s2 + 1e-10);

        let entry = model.ensemble().unwrap().get(0, class).unwrap();
        assert_eq!(entry.tree.n_nodes(), 1);
        assert_relative_eq!(entry.leaf_values.get(0).unwrap(), expected, epsilon = 1e-12);
    }
    assert_eq!(model.predict(&x).unwrap(), Array1::from_elem(4, "b"));
}

#[test]
fn test_concurrent_predictions_agree() {
    let (x, y) = generate_noisy_data(120, 4, 6);
    let mut model = GradientBoostingClassifier::new(params());
    model.fit(&x, &y).unwrap();
    let expected = model.predict(&x).unwrap();

    let results: Vec<Array1<u8>> = (0..8)
        .into_par_iter()
        .map(|_| model.predict(&x).unwrap())
        .collect();
    assert!(results.iter().all(|r| r == &expected));

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| model.predict_proba(&x).unwrap()))
            .collect();
        let first = model.predict_proba(&x).unwrap();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), first);
        }
    });
}

#[test]
fn test_rejects_invalid_input() {
    let (x, y) = generate_noisy_data(20, 2, 7);

    let mut model = GradientBoostingClassifier::new(params().with_learning_rate(0.0));
    assert_eq!(
        model.fit(&x, &y),
        Err(BoostError::InvalidParams(ParamError::InvalidLearningRate(0.0)))
    );

    let mut model = GradientBoostingClassifier::new(params().with_n_estimators(0));
    assert_eq!(
        model.fit(&x, &y),
        Err(BoostError::InvalidParams(ParamError::ZeroEstimators))
    );

    let mut model = GradientBoostingClassifier::new(params());
    assert_eq!(
        model.fit(&Array2::<f64>::zeros((0, 2)), &Array1::<u8>::zeros(0)),
        Err(BoostError::EmptyDataset)
    );
    assert_eq!(
        model.fit(&x, &y.slice(ndarray::s![..10])),
        Err(BoostError::LengthMismatch {
            rows: 20,
            what: "y",
            len: 10
        })
    );
    assert_eq!(
        model.fit(&x, &Array1::from_elem(20, 1u8)),
        Err(BoostError::TooFewClasses(1))
    );
    assert!(!model.is_fitted());
    assert_eq!(model.decision_function(&x), Err(BoostError::NotFitted));
}

#[test]
fn test_constant_features_still_fit() {
    let x = Array2::from_elem((10, 3), 1.0);
    let y: Array1<u8> = (0..10).map(|i| (i % 2) as u8).collect();
    let mut model = GradientBoostingClassifier::new(params());
    model.fit(&x, &y).unwrap();

    // No split is possible, so every tree is a single leaf
    for round in model.ensemble().unwrap().rounds() {
        assert!(round.iter().all(|entry| entry.tree.n_nodes() == 1));
    }
    let proba = model.predict_proba(&x).unwrap();
    assert_relative_eq!(proba[[0, 0]], 0.5, epsilon = 1e-9);
}
