pub mod ensemble;
pub mod error;
pub mod evaluation;
pub mod gbm;
pub mod labels;
pub mod learners;
pub mod loss;
pub mod params;
pub mod score_matrix;
pub mod tree;

// Re-export commonly used types at crate root
pub use error::{BoostError, ParamError, Result};
pub use gbm::{BaselineFn, GradientBoostingClassifier, zero_baseline};
pub use learners::{FittedTree, RegressionTreeLearner, TreeLearner};
pub use params::{BoostParams, TreeParams};
pub use tree::{ClassificationTree, RegressionTree};
