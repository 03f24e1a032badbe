//! Multinomial deviance: softmax probabilities, pseudo-residuals and the
//! Newton step used to correct regression-tree leaves.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Added to the Newton denominator so a leaf with `p ≈ 0` or `p ≈ 1`
/// everywhere never divides by zero.
pub const NEWTON_EPSILON: f64 = 1e-10;

/// Softmax applied along axis 0 of a (K x N) score matrix.
///
/// The per-column maximum is subtracted before exponentiating so raw scores
/// that grow over many rounds never overflow.
pub fn softmax_axis0(scores: &ArrayView2<f64>) -> Array2<f64> {
    let mut probs = scores.to_owned();
    for mut column in probs.axis_iter_mut(Axis(1)) {
        let max = column.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        column.mapv_inplace(|s| (s - max).exp());
        let total = column.sum();
        column /= total;
    }
    probs
}

/// Negative gradient of the multinomial deviance w.r.t. the raw score of
/// class `k`: `1{y_i == k} - p[k, i]`.
pub fn pseudo_residuals(probs: &ArrayView2<f64>, y: &[usize], k: usize) -> Array1<f64> {
    let row = probs.row(k);
    Array1::from_shape_fn(y.len(), |i| {
        let indicator = if y[i] == k { 1.0 } else { 0.0 };
        indicator - row[i]
    })
}

/// One Newton-Raphson step for the value of a leaf holding `samples`:
///
/// `gamma = (K - 1) / K * Σ r / (Σ |r| (1 - |r|) + ε)`
///
/// The stored correction is `learning_rate * gamma`.
pub fn newton_leaf_value(
    residuals: &ArrayView1<f64>,
    samples: &[usize],
    n_classes: usize,
    learning_rate: f64,
) -> f64 {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for &i in samples {
        let r = residuals[i];
        numerator += r;
        denominator += r.abs() * (1.0 - r.abs());
    }

    let k = n_classes as f64;
    let gamma = (k - 1.0) / k * numerator / (denominator + NEWTON_EPSILON);
    learning_rate * gamma
}

/// Mean multinomial deviance `-log p[y_i, i]` of a (K x N) score matrix,
/// computed with log-sum-exp.
pub fn multinomial_deviance(scores: &ArrayView2<f64>, y: &[usize]) -> f64 {
    let n = scores.ncols();
    if n == 0 {
        return 0.0;
    }

    let total: f64 = scores
        .axis_iter(Axis(1))
        .zip(y.iter())
        .map(|(column, &label)| {
            let max = column.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            let log_sum = column.iter().map(|&s| (s - max).exp()).sum::<f64>().ln();
            log_sum + max - column[label]
        })
        .sum();

    total / n as f64
}
