//! Squared-error regression tree used as the default boosting base learner.

use super::NodeArrays;
use super::builder::TreeBuilder;
use super::criterion::MseCriterion;
use crate::error::{BoostError, Result};
use crate::params::TreeParams;
use ndarray::{Array1, ArrayView1, ArrayView2};

/// A fitted CART regression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: NodeArrays,
    /// Mean target per node.
    value: Vec<f64>,
}

impl RegressionTree {
    /// Fit a tree on `(x, target)` under `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` is empty, the lengths disagree, or `params`
    /// is invalid.
    pub fn fit(x: &ArrayView2<f64>, target: &ArrayView1<f64>, params: &TreeParams) -> Result<Self> {
        params.validate()?;
        if x.nrows() == 0 {
            return Err(BoostError::EmptyDataset);
        }
        if target.len() != x.nrows() {
            return Err(BoostError::LengthMismatch {
                rows: x.nrows(),
                what: "target",
                len: target.len(),
            });
        }

        let weights = vec![1.0; x.nrows()];
        let criterion = MseCriterion {
            target: target.view(),
            weights: &weights,
        };
        let (nodes, stats) =
            TreeBuilder::new(x.view(), &criterion, params, x.nrows() as f64).build();
        let value = stats.iter().map(|s| s.mean()).collect();

        Ok(Self { nodes, value })
    }

    pub fn nodes(&self) -> &NodeArrays {
        &self.nodes
    }

    /// Mean training target of every node.
    pub fn value(&self) -> &[f64] {
        &self.value
    }

    /// Leaf index reached by every row of `x`.
    pub fn apply(&self, x: &ArrayView2<f64>) -> Array1<usize> {
        self.nodes.apply(x)
    }

    /// Mean training target of the leaf each row falls into.
    pub fn predict(&self, x: &ArrayView2<f64>) -> Array1<f64> {
        self.apply(x).mapv(|leaf| self.value[leaf])
    }
}
