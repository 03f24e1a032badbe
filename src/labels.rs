//! Bijection between label values and dense class indices.

use crate::error::{BoostError, Result};
use ndarray::{Array1, ArrayBase, Data, Ix1};

/// Sorted set of the distinct labels seen at fit time.
///
/// Class index `k` is the position of a label in the sorted set, so the
/// mapping is fixed once built and every class index decodes to exactly one
/// label. Lookups use binary search.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder<L> {
    classes: Vec<L>,
}

impl<L: Ord + Clone> LabelEncoder<L> {
    /// Collect the distinct labels of `y`.
    pub fn fit<S>(y: &ArrayBase<S, Ix1>) -> Self
    where
        S: Data<Elem = L>,
    {
        Self::fit_transform(y).0
    }

    /// Fit the encoder and return the class index of every label of `y`.
    pub fn fit_transform<S>(y: &ArrayBase<S, Ix1>) -> (Self, Vec<usize>)
    where
        S: Data<Elem = L>,
    {
        let mut order: Vec<usize> = (0..y.len()).collect();
        order.sort_by(|&a, &b| y[a].cmp(&y[b]));

        let mut classes: Vec<L> = Vec::new();
        let mut codes = vec![0usize; y.len()];
        for &i in &order {
            if classes.last() != Some(&y[i]) {
                classes.push(y[i].clone());
            }
            codes[i] = classes.len() - 1;
        }
        (Self { classes }, codes)
    }

    /// Like [`LabelEncoder::fit_transform`], but requires at least two classes.
    ///
    /// # Errors
    ///
    /// Returns [`BoostError::TooFewClasses`] when `y` has fewer than 2 distinct values.
    pub fn fit_multiclass<S>(y: &ArrayBase<S, Ix1>) -> Result<(Self, Vec<usize>)>
    where
        S: Data<Elem = L>,
    {
        let (encoder, codes) = Self::fit_transform(y);
        if encoder.n_classes() < 2 {
            return Err(BoostError::TooFewClasses(encoder.n_classes()));
        }
        Ok((encoder, codes))
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Distinct labels in class-index order.
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    /// Class index of `label`, if it was seen at fit time.
    pub fn index_of(&self, label: &L) -> Option<usize> {
        self.classes.binary_search(label).ok()
    }

    /// Label for class index `k`, if `k < n_classes()`.
    pub fn label(&self, k: usize) -> Option<&L> {
        self.classes.get(k)
    }

    pub(crate) fn decode(&self, indices: &[usize]) -> Array1<L> {
        indices.iter().map(|&k| self.classes[k].clone()).collect()
    }
}

/// Index of the first maximum.
pub(crate) fn argmax(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (k, v) in values.enumerate() {
        if v > best_value {
            best_value = v;
            best = k;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn classes_are_sorted_and_unique() {
        let y = array![3, 1, 2, 3, 1];
        let (encoder, codes) = LabelEncoder::fit_transform(&y);
        assert_eq!(encoder.classes(), &[1, 2, 3]);
        assert_eq!(codes, vec![2, 0, 1, 2, 0]);
        assert_eq!(encoder, LabelEncoder::fit(&y));
    }

    #[test]
    fn round_trips_string_labels() {
        let y = Array1::from(vec!["setosa", "virginica", "versicolor", "setosa"]);
        let (encoder, codes) = LabelEncoder::fit_transform(&y);
        assert_eq!(encoder.decode(&codes), y);
        assert_eq!(encoder.index_of(&"versicolor"), Some(1));
        assert_eq!(encoder.index_of(&"unknown"), None);
        assert_eq!(encoder.label(2), Some(&"virginica"));
        assert_eq!(encoder.label(3), None);
    }

    #[test]
    fn single_class_is_rejected() {
        let y = array![7, 7, 7];
        assert_eq!(
            LabelEncoder::fit_multiclass(&y),
            Err(BoostError::TooFewClasses(1))
        );
        let empty: Array1<i32> = Array1::from(vec![]);
        assert_eq!(
            LabelEncoder::fit_multiclass(&empty),
            Err(BoostError::TooFewClasses(0))
        );
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax([0.1, 0.7, 0.7, 0.2].into_iter()), 1);
        assert_eq!(argmax([3.0].into_iter()), 0);
    }
}
