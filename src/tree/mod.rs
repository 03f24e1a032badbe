//! CART trees stored as parallel node arrays.
//!
//! Node 0 is the root. Leaf identifiers handed out by [`NodeArrays::apply`]
//! are node indices, so every identifier is `< n_nodes`.

mod builder;
pub mod classifier;
mod criterion;
pub mod regressor;
mod splitter;

pub use classifier::ClassificationTree;
pub use regressor::RegressionTree;

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// Child index stored for leaves.
pub const TREE_LEAF: isize = -1;
/// Feature index stored for leaves.
pub const TREE_UNDEFINED: isize = -2;

/// Feature values closer than this are treated as equal when placing splits.
pub(crate) const FEATURE_THRESHOLD: f64 = 1e-7;

/// Structure shared by the regression and classification trees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeArrays {
    pub(crate) children_left: Vec<isize>,
    pub(crate) children_right: Vec<isize>,
    pub(crate) feature: Vec<isize>,
    pub(crate) threshold: Vec<f64>,
    pub(crate) is_leaf: Vec<bool>,
    pub(crate) depth: Vec<usize>,
    pub(crate) impurity: Vec<f64>,
    pub(crate) weighted_n_node_samples: Vec<f64>,
    pub(crate) sample_start: Vec<usize>,
    pub(crate) sample_end: Vec<usize>,
    /// Training rows permuted so every node owns `sample_start..sample_end`.
    pub(crate) sample_order: Vec<usize>,
    pub(crate) n_features: usize,
}

impl NodeArrays {
    pub(crate) fn push_leaf(
        &mut self,
        depth: usize,
        start: usize,
        end: usize,
        impurity: f64,
        weight: f64,
    ) -> usize {
        self.children_left.push(TREE_LEAF);
        self.children_right.push(TREE_LEAF);
        self.feature.push(TREE_UNDEFINED);
        self.threshold.push(TREE_UNDEFINED as f64);
        self.is_leaf.push(true);
        self.depth.push(depth);
        self.impurity.push(impurity);
        self.weighted_n_node_samples.push(weight);
        self.sample_start.push(start);
        self.sample_end.push(end);
        self.is_leaf.len() - 1
    }

    pub(crate) fn set_split(
        &mut self,
        node: usize,
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    ) {
        self.children_left[node] = left as isize;
        self.children_right[node] = right as isize;
        self.feature[node] = feature as isize;
        self.threshold[node] = threshold;
        self.is_leaf[node] = false;
    }

    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&leaf| leaf).count()
    }

    /// Depth of the deepest node.
    pub fn max_depth(&self) -> usize {
        self.depth.iter().copied().max().unwrap_or(0)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn children_left(&self) -> &[isize] {
        &self.children_left
    }

    pub fn children_right(&self) -> &[isize] {
        &self.children_right
    }

    /// Split feature per node ([`TREE_UNDEFINED`] for leaves).
    pub fn feature(&self) -> &[isize] {
        &self.feature
    }

    /// Split threshold per node; samples with `x[feature] <= threshold` go left.
    pub fn threshold(&self) -> &[f64] {
        &self.threshold
    }

    pub fn is_leaf(&self) -> &[bool] {
        &self.is_leaf
    }

    pub fn depth(&self) -> &[usize] {
        &self.depth
    }

    pub fn impurity(&self) -> &[f64] {
        &self.impurity
    }

    pub fn weighted_n_node_samples(&self) -> &[f64] {
        &self.weighted_n_node_samples
    }

    pub fn sample_start(&self) -> &[usize] {
        &self.sample_start
    }

    pub fn sample_end(&self) -> &[usize] {
        &self.sample_end
    }

    pub fn sample_order(&self) -> &[usize] {
        &self.sample_order
    }

    /// Training rows that reached `node`.
    pub fn node_samples(&self, node: usize) -> &[usize] {
        &self.sample_order[self.sample_start[node]..self.sample_end[node]]
    }

    /// Leaf reached by a single row.
    pub fn apply_row(&self, row: &ArrayView1<f64>) -> usize {
        let mut node = 0;
        while !self.is_leaf[node] {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }

    /// Leaf reached by every row of `x`.
    pub fn apply(&self, x: &ArrayView2<f64>) -> Array1<usize> {
        x.axis_iter(Axis(0))
            .map(|row| self.apply_row(&row))
            .collect()
    }
}
