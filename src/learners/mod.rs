use crate::error::Result;
use crate::params::TreeParams;
use crate::tree::RegressionTree;
use ndarray::{Array1, ArrayView1, ArrayView2};
use std::fmt::Debug;

/// Fits a regression tree against one class's pseudo-residuals.
pub trait TreeLearner {
    fn fit(
        &self,
        x: &ArrayView2<f64>,
        target: &ArrayView1<f64>,
        params: &TreeParams,
    ) -> Result<Box<dyn FittedTree>>;
}

/// A fitted tree that routes samples to leaves.
///
/// `apply` returns exactly one leaf identifier per row of `x`. Identifiers
/// must be `< n_nodes()`, and the same input must map to the same
/// identifiers on every call.
pub trait FittedTree: Send + Sync + Debug {
    fn apply(&self, x: &ArrayView2<f64>) -> Array1<usize>;

    fn n_nodes(&self) -> usize;

    fn n_leaves(&self) -> usize;
}

/// CART regression trees with the squared-error criterion.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionTreeLearner;

impl TreeLearner for RegressionTreeLearner {
    fn fit(
        &self,
        x: &ArrayView2<f64>,
        target: &ArrayView1<f64>,
        params: &TreeParams,
    ) -> Result<Box<dyn FittedTree>> {
        let tree = RegressionTree::fit(x, target, params)?;
        Ok(Box::new(tree))
    }
}

impl FittedTree for RegressionTree {
    fn apply(&self, x: &ArrayView2<f64>) -> Array1<usize> {
        RegressionTree::apply(self, x)
    }

    fn n_nodes(&self) -> usize {
        self.nodes().n_nodes()
    }

    fn n_leaves(&self) -> usize {
        self.nodes().n_leaves()
    }
}
