//! Hyperparameters for the boosted classifier and its regression trees.

use crate::error::ParamError;

/// Structural constraints handed to the tree learner on every fit.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    /// Minimum number of samples a node needs before it may be split.
    pub min_samples_split: usize,
    /// Minimum number of samples on each side of a split.
    pub min_samples_leaf: usize,
    /// Minimum fraction of the total sample weight each leaf must hold.
    pub min_weight_fraction_leaf: f64,
    /// Maximum depth of the tree (`None` = unlimited).
    pub max_depth: Option<usize>,
    /// A split is taken only if it lowers weighted impurity by at least this much.
    pub min_impurity_decrease: f64,
    /// Nodes with impurity at or below this threshold become leaves.
    pub min_impurity_split: Option<f64>,
    /// Grow best-first with at most this many leaves.
    pub max_leaf_nodes: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            min_samples_split: 2,
            min_samples_leaf: 1,
            min_weight_fraction_leaf: 0.0,
            max_depth: Some(3),
            min_impurity_decrease: 0.0,
            min_impurity_split: None,
            max_leaf_nodes: None,
        }
    }
}

impl TreeParams {
    /// Validate the constraints.
    ///
    /// # Errors
    ///
    /// Returns the first constraint that is out of range.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.min_samples_split < 2 {
            return Err(ParamError::InvalidMinSamplesSplit(self.min_samples_split));
        }
        if self.min_samples_leaf == 0 {
            return Err(ParamError::InvalidMinSamplesLeaf(self.min_samples_leaf));
        }
        if !(0.0..=0.5).contains(&self.min_weight_fraction_leaf) {
            return Err(ParamError::InvalidMinWeightFractionLeaf(
                self.min_weight_fraction_leaf,
            ));
        }
        if !(self.min_impurity_decrease >= 0.0) {
            return Err(ParamError::InvalidMinImpurityDecrease(
                self.min_impurity_decrease,
            ));
        }
        if let Some(split) = self.min_impurity_split {
            if !(split >= 0.0) {
                return Err(ParamError::InvalidMinImpuritySplit(split));
            }
        }
        if let Some(leaves) = self.max_leaf_nodes {
            if leaves < 2 {
                return Err(ParamError::InvalidMaxLeafNodes(leaves));
            }
        }
        Ok(())
    }
}

/// Parameters of the boosting loop.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostParams {
    /// Shrinkage applied to every leaf correction.
    pub learning_rate: f64,
    /// Number of boosting rounds; each round fits one tree per class.
    pub n_estimators: usize,
    /// Fit the per-class trees of a round on the rayon pool.
    pub parallel: bool,
    /// Constraints forwarded verbatim to the tree learner.
    pub tree: TreeParams,
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            n_estimators: 100,
            parallel: true,
            tree: TreeParams::default(),
        }
    }
}

impl BoostParams {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.tree.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.tree.min_samples_split = min_samples_split;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.tree.min_samples_leaf = min_samples_leaf;
        self
    }

    pub fn with_min_weight_fraction_leaf(mut self, fraction: f64) -> Self {
        self.tree.min_weight_fraction_leaf = fraction;
        self
    }

    pub fn with_min_impurity_decrease(mut self, decrease: f64) -> Self {
        self.tree.min_impurity_decrease = decrease;
        self
    }

    pub fn with_min_impurity_split(mut self, threshold: Option<f64>) -> Self {
        self.tree.min_impurity_split = threshold;
        self
    }

    pub fn with_max_leaf_nodes(mut self, max_leaf_nodes: Option<usize>) -> Self {
        self.tree.max_leaf_nodes = max_leaf_nodes;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate the boosting parameters and the tree constraints.
    ///
    /// # Errors
    ///
    /// Returns the first parameter that is out of range.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ParamError::InvalidLearningRate(self.learning_rate));
        }
        if self.n_estimators == 0 {
            return Err(ParamError::ZeroEstimators);
        }
        self.tree.validate()
    }
}
