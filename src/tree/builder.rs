//! Tree growth: depth-first by default, best-first under a leaf budget.

use super::NodeArrays;
use super::criterion::Criterion;
use super::splitter::{Split, SplitLimits, best_split, partition};
use crate::params::TreeParams;
use ndarray::ArrayView2;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Improvements within this margin of `min_impurity_decrease` still split.
const IMPROVEMENT_EPSILON: f64 = f64::EPSILON;

/// A node created as a leaf that has a split waiting to be applied.
struct Expandable {
    node: usize,
    split: Split,
    improvement: f64,
}

impl PartialEq for Expandable {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Expandable {}

impl PartialOrd for Expandable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expandable {
    // Max-heap on improvement; older nodes first on ties.
    fn cmp(&self, other: &Self) -> Ordering {
        self.improvement
            .total_cmp(&other.improvement)
            .then_with(|| other.node.cmp(&self.node))
    }
}

enum Frontier {
    DepthFirst(Vec<Expandable>),
    BestFirst(BinaryHeap<Expandable>),
}

impl Frontier {
    fn push(&mut self, item: Expandable) {
        match self {
            Frontier::DepthFirst(stack) => stack.push(item),
            Frontier::BestFirst(heap) => heap.push(item),
        }
    }

    fn pop(&mut self) -> Option<Expandable> {
        match self {
            Frontier::DepthFirst(stack) => stack.pop(),
            Frontier::BestFirst(heap) => heap.pop(),
        }
    }
}

/// Grows a tree over `x` with the given criterion and constraints.
pub(crate) struct TreeBuilder<'a, C: Criterion> {
    x: ArrayView2<'a, f64>,
    criterion: &'a C,
    params: &'a TreeParams,
    min_weight_leaf: f64,
    total_weight: f64,
}

impl<'a, C: Criterion> TreeBuilder<'a, C> {
    pub fn new(
        x: ArrayView2<'a, f64>,
        criterion: &'a C,
        params: &'a TreeParams,
        total_weight: f64,
    ) -> Self {
        Self {
            x,
            criterion,
            params,
            min_weight_leaf: params.min_weight_fraction_leaf * total_weight,
            total_weight,
        }
    }

    /// Grow the tree; returns its node arrays and the statistics of every node.
    pub fn build(&self) -> (NodeArrays, Vec<C::Stats>) {
        let n_samples = self.x.nrows();
        let mut nodes = NodeArrays {
            sample_order: (0..n_samples).collect(),
            n_features: self.x.ncols(),
            ..NodeArrays::default()
        };
        let mut stats = Vec::new();

        let mut frontier = match self.params.max_leaf_nodes {
            Some(_) => Frontier::BestFirst(BinaryHeap::new()),
            None => Frontier::DepthFirst(Vec::new()),
        };

        if let Some(root) = self.add_node(&mut nodes, &mut stats, 0, 0, n_samples) {
            frontier.push(root);
        }

        let mut n_leaves = 1;
        while let Some(item) = frontier.pop() {
            if self
                .params
                .max_leaf_nodes
                .is_some_and(|max| n_leaves >= max)
            {
                break;
            }

            let node = item.node;
            let (start, end) = (nodes.sample_start[node], nodes.sample_end[node]);
            let depth = nodes.depth[node];
            let n_left = partition(
                &self.x,
                &mut nodes.sample_order[start..end],
                item.split.feature,
                item.split.threshold,
            );
            let mid = start + n_left;

            let left = self.add_node(&mut nodes, &mut stats, depth + 1, start, mid);
            let left_id = nodes.n_nodes() - 1;
            let right = self.add_node(&mut nodes, &mut stats, depth + 1, mid, end);
            let right_id = nodes.n_nodes() - 1;
            nodes.set_split(
                node,
                item.split.feature,
                item.split.threshold,
                left_id,
                right_id,
            );
            n_leaves += 1;

            // Right first so the stack expands the left subtree before the right
            if let Some(right) = right {
                frontier.push(right);
            }
            if let Some(left) = left {
                frontier.push(left);
            }
        }

        (nodes, stats)
    }

    /// Append a leaf for `sample_order[start..end]` and return its pending
    /// split, if the node may still be split.
    fn add_node(
        &self,
        nodes: &mut NodeArrays,
        stats: &mut Vec<C::Stats>,
        depth: usize,
        start: usize,
        end: usize,
    ) -> Option<Expandable> {
        let node_stats = self.criterion.node_stats(&nodes.sample_order[start..end]);
        let weight = self.criterion.weight(&node_stats);
        let impurity = self.criterion.impurity(&node_stats);
        let node = nodes.push_leaf(depth, start, end, impurity, weight);
        stats.push(node_stats);

        let n = end - start;
        let params = self.params;
        let stop = params.max_depth.is_some_and(|max| depth >= max)
            || n < params.min_samples_split
            || n < 2 * params.min_samples_leaf
            || weight < 2.0 * self.min_weight_leaf
            || impurity <= f64::EPSILON
            || params.min_impurity_split.is_some_and(|t| impurity <= t);
        if stop {
            return None;
        }

        let limits = SplitLimits {
            min_samples_leaf: params.min_samples_leaf,
            min_weight_leaf: self.min_weight_leaf,
        };
        let split = best_split(
            &self.x,
            self.criterion,
            &nodes.sample_order[start..end],
            &stats[node],
            limits,
        )?;

        let improvement = (weight * impurity - split.children_impurity) / self.total_weight;
        if improvement + IMPROVEMENT_EPSILON < params.min_impurity_decrease {
            return None;
        }

        Some(Expandable {
            node,
            split,
            improvement,
        })
    }
}
