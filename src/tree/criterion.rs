//! Impurity criteria: weighted squared error and weighted Gini.

use ndarray::ArrayView1;

/// Sufficient statistics of a node and the impurity they imply.
///
/// Statistics are additive: the right child of a split is always computed as
/// `total - left`.
pub(crate) trait Criterion {
    type Stats: Clone;

    fn empty(&self) -> Self::Stats;

    fn push(&self, stats: &mut Self::Stats, sample: usize);

    fn subtract(&self, total: &Self::Stats, part: &Self::Stats) -> Self::Stats;

    fn weight(&self, stats: &Self::Stats) -> f64;

    fn impurity(&self, stats: &Self::Stats) -> f64;

    fn node_stats(&self, samples: &[usize]) -> Self::Stats {
        let mut stats = self.empty();
        for &i in samples {
            self.push(&mut stats, i);
        }
        stats
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct MseStats {
    pub weight: f64,
    pub sum: f64,
    pub sum_sq: f64,
}

impl MseStats {
    pub fn mean(&self) -> f64 {
        if self.weight > 0.0 {
            self.sum / self.weight
        } else {
            0.0
        }
    }
}

/// Weighted variance of a real-valued target.
pub(crate) struct MseCriterion<'a> {
    pub target: ArrayView1<'a, f64>,
    pub weights: &'a [f64],
}

impl Criterion for MseCriterion<'_> {
    type Stats = MseStats;

    fn empty(&self) -> MseStats {
        MseStats::default()
    }

    fn push(&self, stats: &mut MseStats, sample: usize) {
        let w = self.weights[sample];
        let y = self.target[sample];
        stats.weight += w;
        stats.sum += w * y;
        stats.sum_sq += w * y * y;
    }

    fn subtract(&self, total: &MseStats, part: &MseStats) -> MseStats {
        MseStats {
            weight: total.weight - part.weight,
            sum: total.sum - part.sum,
            sum_sq: total.sum_sq - part.sum_sq,
        }
    }

    fn weight(&self, stats: &MseStats) -> f64 {
        stats.weight
    }

    fn impurity(&self, stats: &MseStats) -> f64 {
        if stats.weight <= 0.0 {
            return 0.0;
        }
        let mean = stats.sum / stats.weight;
        (stats.sum_sq / stats.weight - mean * mean).max(0.0)
    }
}

/// Weighted class histogram of a node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClassHistogram {
    pub counts: Vec<f64>,
    pub total: f64,
}

/// Weighted Gini impurity of class indices in `0..n_classes`.
pub(crate) struct GiniCriterion<'a> {
    pub classes: &'a [usize],
    pub weights: &'a [f64],
    pub n_classes: usize,
}

impl Criterion for GiniCriterion<'_> {
    type Stats = ClassHistogram;

    fn empty(&self) -> ClassHistogram {
        ClassHistogram {
            counts: vec![0.0; self.n_classes],
            total: 0.0,
        }
    }

    fn push(&self, stats: &mut ClassHistogram, sample: usize) {
        let w = self.weights[sample];
        stats.counts[self.classes[sample]] += w;
        stats.total += w;
    }

    fn subtract(&self, total: &ClassHistogram, part: &ClassHistogram) -> ClassHistogram {
        ClassHistogram {
            counts: total
                .counts
                .iter()
                .zip(&part.counts)
                .map(|(t, p)| t - p)
                .collect(),
            total: total.total - part.total,
        }
    }

    fn weight(&self, stats: &ClassHistogram) -> f64 {
        stats.total
    }

    fn impurity(&self, stats: &ClassHistogram) -> f64 {
        if stats.total <= 0.0 {
            return 0.0;
        }
        let sq: f64 = stats
            .counts
            .iter()
            .map(|&c| {
                let p = c / stats.total;
                p * p
            })
            .sum();
        (1.0 - sq).max(0.0)
    }
}
