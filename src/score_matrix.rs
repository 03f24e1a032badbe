//! Accumulated raw scores, one row per class and one column per sample.

use crate::ensemble::LeafValueMap;
use crate::loss::softmax_axis0;
use ndarray::{Array2, ArrayView2, ArrayViewMut1};

/// K x N raw score matrix. Its shape is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    scores: Array2<f64>,
}

impl ScoreMatrix {
    /// Wrap an initial (K x N) score matrix.
    pub fn new(initial: Array2<f64>) -> Self {
        Self { scores: initial }
    }

    pub fn zeros(n_classes: usize, n_samples: usize) -> Self {
        Self::new(Array2::zeros((n_classes, n_samples)))
    }

    pub fn n_classes(&self) -> usize {
        self.scores.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.scores.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.scores.view()
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.scores
    }

    /// Class probabilities (K x N) of the current scores.
    pub fn softmax(&self) -> Array2<f64> {
        softmax_axis0(&self.scores.view())
    }

    /// Add the correction of each sample's leaf to row `class`.
    ///
    /// Returns the first leaf that has no value; the row is left partially
    /// updated in that case.
    pub fn add_leaf_values(
        &mut self,
        class: usize,
        leaves: &[usize],
        values: &LeafValueMap,
    ) -> Result<(), usize> {
        add_to_row(self.scores.row_mut(class), leaves.iter().copied(), values)
    }
}

pub(crate) fn add_to_row<I>(
    mut row: ArrayViewMut1<f64>,
    leaves: I,
    values: &LeafValueMap,
) -> Result<(), usize>
where
    I: IntoIterator<Item = usize>,
{
    for (score, leaf) in row.iter_mut().zip(leaves) {
        *score += values.get(leaf).ok_or(leaf)?;
    }
    Ok(())
}
