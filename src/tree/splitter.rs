//! Exhaustive best-split search over sorted feature values.

use super::FEATURE_THRESHOLD;
use super::criterion::Criterion;
use ndarray::ArrayView2;

/// Best split found for a node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Split {
    pub feature: usize,
    pub threshold: f64,
    /// Number of samples sent left.
    pub n_left: usize,
    /// Weighted impurity of both children, `w_L * I_L + w_R * I_R`.
    pub children_impurity: f64,
}

/// Leaf-size constraints every candidate must satisfy.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SplitLimits {
    pub min_samples_leaf: usize,
    pub min_weight_leaf: f64,
}

/// Scan every feature for the threshold minimising weighted child impurity.
///
/// Thresholds sit halfway between consecutive distinct values. Ties keep the
/// first candidate found (lowest feature, then lowest threshold).
pub(crate) fn best_split<C: Criterion>(
    x: &ArrayView2<f64>,
    criterion: &C,
    samples: &[usize],
    total: &C::Stats,
    limits: SplitLimits,
) -> Option<Split> {
    let n = samples.len();
    if n < 2 {
        return None;
    }
    let mut sorted = samples.to_vec();
    let mut best: Option<Split> = None;

    for feature in 0..x.ncols() {
        let column = x.column(feature);
        sorted.sort_by(|&a, &b| column[a].total_cmp(&column[b]));

        if column[sorted[n - 1]] <= column[sorted[0]] + FEATURE_THRESHOLD {
            continue;
        }

        let mut left = criterion.empty();
        for pos in 0..n - 1 {
            criterion.push(&mut left, sorted[pos]);

            let current = column[sorted[pos]];
            let next = column[sorted[pos + 1]];
            if next <= current + FEATURE_THRESHOLD {
                continue;
            }

            let n_left = pos + 1;
            if n_left < limits.min_samples_leaf || n - n_left < limits.min_samples_leaf {
                continue;
            }

            let right = criterion.subtract(total, &left);
            let (w_left, w_right) = (criterion.weight(&left), criterion.weight(&right));
            if w_left < limits.min_weight_leaf || w_right < limits.min_weight_leaf {
                continue;
            }

            let children_impurity =
                w_left * criterion.impurity(&left) + w_right * criterion.impurity(&right);
            if best
                .as_ref()
                .is_some_and(|b| children_impurity >= b.children_impurity)
            {
                continue;
            }

            let mut threshold = (current + next) / 2.0;
            if threshold == next || !threshold.is_finite() {
                threshold = current;
            }
            best = Some(Split {
                feature,
                threshold,
                n_left,
                children_impurity,
            });
        }
    }

    best
}

/// Reorder `samples` so rows going left come first; returns the left count.
pub(crate) fn partition(
    x: &ArrayView2<f64>,
    samples: &mut [usize],
    feature: usize,
    threshold: f64,
) -> usize {
    let column = x.column(feature);
    let (left, right): (Vec<usize>, Vec<usize>) = samples
        .iter()
        .partition(|&&i| column[i] <= threshold);
    let n_left = left.len();
    samples[..n_left].copy_from_slice(&left);
    samples[n_left..].copy_from_slice(&right);
    n_left
}
