//! The trained ensemble: one (tree, leaf values) entry per round and class.

use crate::learners::FittedTree;

/// Sample indices bucketed by leaf identifier with a counting sort.
///
/// Samples keep their original relative order inside each bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafGroups {
    /// `offsets[leaf]..offsets[leaf + 1]` is the bucket of `leaf` in `order`.
    offsets: Vec<usize>,
    order: Vec<usize>,
}

impl LeafGroups {
    /// Group `leaves[i]` (the leaf of sample `i`) for leaves in `0..n_nodes`.
    pub fn new(leaves: &[usize], n_nodes: usize) -> Self {
        let mut offsets = vec![0usize; n_nodes + 1];
        for &leaf in leaves {
            offsets[leaf + 1] += 1;
        }
        for node in 0..n_nodes {
            offsets[node + 1] += offsets[node];
        }

        let mut cursor = offsets.clone();
        let mut order = vec![0usize; leaves.len()];
        for (i, &leaf) in leaves.iter().enumerate() {
            order[cursor[leaf]] = i;
            cursor[leaf] += 1;
        }

        Self { offsets, order }
    }

    /// Samples routed to `leaf`.
    pub fn samples(&self, leaf: usize) -> &[usize] {
        &self.order[self.offsets[leaf]..self.offsets[leaf + 1]]
    }

    /// Non-empty buckets as `(leaf, samples)`, in leaf order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        (0..self.offsets.len() - 1)
            .map(|leaf| (leaf, self.samples(leaf)))
            .filter(|(_, samples)| !samples.is_empty())
    }
}

/// Correction value of every leaf a tree produced at training time.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafValueMap {
    values: Vec<Option<f64>>,
}

impl LeafValueMap {
    /// Evaluate `value_of` once per non-empty leaf group.
    pub fn from_groups<F>(groups: &LeafGroups, n_nodes: usize, mut value_of: F) -> Self
    where
        F: FnMut(&[usize]) -> f64,
    {
        let mut values = vec![None; n_nodes];
        for (leaf, samples) in groups.iter() {
            values[leaf] = Some(value_of(samples));
        }
        Self { values }
    }

    pub fn get(&self, leaf: usize) -> Option<f64> {
        self.values.get(leaf).copied().flatten()
    }

    /// Number of leaves with a value.
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(leaf, value)` pairs in leaf order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(leaf, v)| v.map(|v| (leaf, v)))
    }
}

/// One fitted tree and its leaf corrections.
#[derive(Debug)]
pub struct EnsembleEntry {
    pub tree: Box<dyn FittedTree>,
    pub leaf_values: LeafValueMap,
}

/// Entries laid out round-major: entry `(m, k)` lives at `m * n_classes + k`.
#[derive(Debug)]
pub struct Ensemble {
    n_classes: usize,
    entries: Vec<EnsembleEntry>,
}

impl Ensemble {
    pub(crate) fn with_capacity(n_classes: usize, n_rounds: usize) -> Self {
        Self {
            n_classes,
            entries: Vec::with_capacity(n_classes * n_rounds),
        }
    }

    /// Append one round; `round` must hold exactly one entry per class.
    pub(crate) fn push_round(&mut self, round: Vec<EnsembleEntry>) {
        debug_assert_eq!(round.len(), self.n_classes);
        self.entries.extend(round);
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_rounds(&self) -> usize {
        if self.n_classes == 0 {
            0
        } else {
            self.entries.len() / self.n_classes
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, round: usize, class: usize) -> Option<&EnsembleEntry> {
        if class >= self.n_classes {
            return None;
        }
        self.entries.get(round * self.n_classes + class)
    }

    /// Rounds in training order, each a slice indexed by class.
    pub fn rounds(&self) -> impl Iterator<Item = &[EnsembleEntry]> + '_ {
        self.entries.chunks(self.n_classes.max(1))
    }
}
