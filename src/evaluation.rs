//! Evaluation metrics for classifiers.
//!
//! This module provides accuracy, confusion matrices and the multi-class
//! log loss for comparing predicted labels or probabilities with the truth.

use ndarray::{Array1, Array2, ArrayView2};

/// Fraction of positions where `y_true` and `y_pred` agree.
///
/// If the lengths differ only the shared prefix is compared, the same way
/// `confusion_matrix` pairs up its inputs.
///
/// # Returns
/// A value in [0, 1]; 0 for empty input.
pub fn accuracy<L: PartialEq>(y_true: &Array1<L>, y_pred: &Array1<L>) -> f64 {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / n as f64
}

/// Confusion matrix with rows indexed by true class and columns by predicted
/// class, both in the order of `classes`.
///
/// Labels not present in `classes` are ignored.
///
/// # Example
/// ```ignore
/// let cm = confusion_matrix(&y_true, &y_pred, model.classes().unwrap());
/// let correct: usize = (0..cm.nrows()).map(|k| cm[[k, k]]).sum();
/// ```
pub fn confusion_matrix<L: PartialEq>(
    y_true: &Array1<L>,
    y_pred: &Array1<L>,
    classes: &[L],
) -> Array2<usize> {
    let k = classes.len();
    let mut matrix = Array2::zeros((k, k));
    let index = |label: &L| classes.iter().position(|c| c == label);
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        if let (Some(i), Some(j)) = (index(t), index(p)) {
            matrix[[i, j]] += 1;
        }
    }
    matrix
}

/// Mean negative log-likelihood of the true classes.
///
/// # Arguments
/// * `y_true` - Class index of every sample.
/// * `proba` - Predicted probabilities, shape (n_samples, n_classes).
/// * `eps` - Probabilities are clipped to `[eps, 1 - eps]` before the log.
pub fn log_loss(y_true: &[usize], proba: &ArrayView2<f64>, eps: f64) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = y_true
        .iter()
        .enumerate()
        .map(|(i, &k)| -proba[[i, k]].clamp(eps, 1.0 - eps).ln())
        .sum();
    total / n as f64
}
