//! Error types shared by the boosting model and the tree learners.

/// Hyperparameter validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// Learning rate must be a finite value > 0.
    #[error("learning_rate must be finite and > 0, got {0}")]
    InvalidLearningRate(f64),

    /// At least one boosting round is required.
    #[error("n_estimators must be > 0")]
    ZeroEstimators,

    #[error("min_samples_split must be >= 2, got {0}")]
    InvalidMinSamplesSplit(usize),

    #[error("min_samples_leaf must be >= 1, got {0}")]
    InvalidMinSamplesLeaf(usize),

    /// The leaf weight fraction must lie in [0, 0.5].
    #[error("min_weight_fraction_leaf must be in [0, 0.5], got {0}")]
    InvalidMinWeightFractionLeaf(f64),

    #[error("min_impurity_decrease must be >= 0, got {0}")]
    InvalidMinImpurityDecrease(f64),

    #[error("min_impurity_split must be >= 0, got {0}")]
    InvalidMinImpuritySplit(f64),

    #[error("max_leaf_nodes must be >= 2, got {0}")]
    InvalidMaxLeafNodes(usize),
}

/// Errors raised while fitting or applying a model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoostError {
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamError),

    /// Classification needs at least two distinct labels.
    #[error("expected at least 2 distinct classes, got {0}")]
    TooFewClasses(usize),

    #[error("cannot fit on an empty dataset")]
    EmptyDataset,

    #[error("x has {rows} rows but {what} has {len} entries")]
    LengthMismatch {
        rows: usize,
        what: &'static str,
        len: usize,
    },

    #[error("model was fit with {expected} features but input has {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("input must be a feature vector or a matrix, got {0} dimensions")]
    BadDimensionality(usize),

    #[error("model has not been fit")]
    NotFitted,

    /// A tree routed a sample to a leaf that has no correction value.
    #[error("tree at round {round}, class {class} has no value for leaf {leaf}")]
    MissingLeafValue {
        round: usize,
        class: usize,
        leaf: usize,
    },

    /// A tree's `apply` returned a different number of leaves than rows.
    #[error("tree at round {round}, class {class} routed {got} of {expected} samples")]
    LeafCountMismatch {
        round: usize,
        class: usize,
        expected: usize,
        got: usize,
    },

    /// The baseline returned a matrix that is not (n_classes x n_samples).
    #[error("baseline scores have shape {got:?}, expected {expected:?}")]
    BaselineShape {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("sample weights must be finite, non-negative and not all zero")]
    InvalidSampleWeight,
}

pub type Result<T> = std::result::Result<T, BoostError>;
