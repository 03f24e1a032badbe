//! Standalone Gini classification tree with inspectable node arrays.
//!
//! Not used by the boosting loop; it shares the node layout, splitter and
//! growth strategy of [`RegressionTree`](super::RegressionTree).

use super::NodeArrays;
use super::builder::TreeBuilder;
use super::criterion::GiniCriterion;
use crate::error::{BoostError, Result};
use crate::labels::{LabelEncoder, argmax};
use crate::params::TreeParams;
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Data, Ix1, Ix2};

/// A fitted CART classification tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationTree<L> {
    nodes: NodeArrays,
    /// Weighted class histogram per node, shape (n_nodes, n_classes).
    value: Array2<f64>,
    labels: LabelEncoder<L>,
}

impl<L: Ord + Clone> ClassificationTree<L> {
    /// Fit a tree on `(x, y)`.
    ///
    /// `sample_weight` defaults to 1 for every row. `max_depth = None` grows
    /// until leaves are pure or `min_samples_leaf` stops them.
    ///
    /// # Errors
    ///
    /// Returns an error for empty input, mismatched lengths, invalid weights
    /// or `min_samples_leaf == 0`.
    pub fn fit<Sx, Sy>(
        x: &ArrayBase<Sx, Ix2>,
        y: &ArrayBase<Sy, Ix1>,
        sample_weight: Option<&Array1<f64>>,
        min_samples_leaf: usize,
        max_depth: Option<usize>,
    ) -> Result<Self>
    where
        Sx: Data<Elem = f64>,
        Sy: Data<Elem = L>,
    {
        let params = TreeParams {
            min_samples_leaf,
            max_depth,
            ..TreeParams::default()
        };
        params.validate()?;

        let n = x.nrows();
        if n == 0 {
            return Err(BoostError::EmptyDataset);
        }
        if y.len() != n {
            return Err(BoostError::LengthMismatch {
                rows: n,
                what: "y",
                len: y.len(),
            });
        }

        let weights: Vec<f64> = match sample_weight {
            Some(w) if w.len() != n => {
                return Err(BoostError::LengthMismatch {
                    rows: n,
                    what: "sample_weight",
                    len: w.len(),
                });
            }
            Some(w) => w.to_vec(),
            None => vec![1.0; n],
        };
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(BoostError::InvalidSampleWeight);
        }
        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 {
            return Err(BoostError::InvalidSampleWeight);
        }

        let (labels, classes) = LabelEncoder::fit_transform(y);
        let n_classes = labels.n_classes();
        let criterion = GiniCriterion {
            classes: &classes,
            weights: &weights,
            n_classes,
        };
        let (nodes, stats) =
            TreeBuilder::new(x.view(), &criterion, &params, total_weight).build();

        let mut value = Array2::zeros((nodes.n_nodes(), n_classes));
        for (mut row, hist) in value.rows_mut().into_iter().zip(&stats) {
            for (v, &c) in row.iter_mut().zip(&hist.counts) {
                *v = c;
            }
        }

        Ok(Self {
            nodes,
            value,
            labels,
        })
    }

    fn check_features(&self, x: &ArrayView2<f64>) -> Result<()> {
        if x.ncols() != self.nodes.n_features() {
            return Err(BoostError::FeatureMismatch {
                expected: self.nodes.n_features(),
                got: x.ncols(),
            });
        }
        Ok(())
    }

    /// Leaf index reached by every row of `x`.
    ///
    /// # Errors
    ///
    /// Returns [`BoostError::FeatureMismatch`] on a wrong column count.
    pub fn apply<S: Data<Elem = f64>>(&self, x: &ArrayBase<S, Ix2>) -> Result<Array1<usize>> {
        let x = x.view();
        self.check_features(&x)?;
        Ok(self.nodes.apply(&x))
    }

    /// Class probabilities per row, shape (n_samples, n_classes).
    ///
    /// # Errors
    ///
    /// Returns [`BoostError::FeatureMismatch`] on a wrong column count.
    pub fn predict_proba<S: Data<Elem = f64>>(&self, x: &ArrayBase<S, Ix2>) -> Result<Array2<f64>> {
        let leaves = self.apply(x)?;
        let mut proba = Array2::zeros((leaves.len(), self.n_classes()));
        for (mut row, &leaf) in proba.rows_mut().into_iter().zip(leaves.iter()) {
            let hist = self.value.row(leaf);
            let total = hist.sum();
            if total > 0.0 {
                row.assign(&hist.mapv(|c| c / total));
            } else {
                row.fill(1.0 / self.n_classes() as f64);
            }
        }
        Ok(proba)
    }

    /// Majority label (by weight) of the leaf each row falls into.
    ///
    /// # Errors
    ///
    /// Returns [`BoostError::FeatureMismatch`] on a wrong column count.
    pub fn predict<S: Data<Elem = f64>>(&self, x: &ArrayBase<S, Ix2>) -> Result<Array1<L>> {
        let leaves = self.apply(x)?;
        let indices: Vec<usize> = leaves
            .iter()
            .map(|&leaf| argmax(self.value.row(leaf).iter().copied()))
            .collect();
        Ok(self.labels.decode(&indices))
    }

    pub fn classes(&self) -> &[L] {
        self.labels.classes()
    }

    pub fn n_classes(&self) -> usize {
        self.labels.n_classes()
    }

    pub fn nodes(&self) -> &NodeArrays {
        &self.nodes
    }

    /// Weighted class histogram per node, shape (n_nodes, n_classes).
    pub fn value(&self) -> &Array2<f64> {
        &self.value
    }

    pub fn children_left(&self) -> &[isize] {
        self.nodes.children_left()
    }

    pub fn children_right(&self) -> &[isize] {
        self.nodes.children_right()
    }

    pub fn feature(&self) -> &[isize] {
        self.nodes.feature()
    }

    pub fn threshold(&self) -> &[f64] {
        self.nodes.threshold()
    }

    pub fn is_leaf(&self) -> &[bool] {
        self.nodes.is_leaf()
    }

    pub fn depth(&self) -> &[usize] {
        self.nodes.depth()
    }

    pub fn sample_start(&self) -> &[usize] {
        self.nodes.sample_start()
    }

    pub fn sample_end(&self) -> &[usize] {
        self.nodes.sample_end()
    }
}
