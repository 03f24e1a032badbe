use crate::ensemble::{Ensemble, EnsembleEntry, LeafGroups, LeafValueMap};
use crate::error::{BoostError, Result};
use crate::labels::{LabelEncoder, argmax};
use crate::learners::{RegressionTreeLearner, TreeLearner};
use crate::loss::{multinomial_deviance, newton_leaf_value, pseudo_residuals, softmax_axis0};
use crate::params::BoostParams;
use crate::score_matrix::{ScoreMatrix, add_to_row};
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Dimension, Ix1, Ix2};
use rayon::prelude::*;
use tracing::{debug, info, trace};

/// Produces the initial (K x N) raw scores for a feature matrix.
///
/// Any other shape is rejected with [`BoostError::BaselineShape`].
pub type BaselineFn = fn(&ArrayView2<f64>, usize) -> Array2<f64>;

/// Default baseline: every class starts at a raw score of zero, whatever `x` is.
pub fn zero_baseline(x: &ArrayView2<f64>, n_classes: usize) -> Array2<f64> {
    Array2::zeros((n_classes, x.nrows()))
}

#[derive(Debug)]
struct Trained<L> {
    labels: LabelEncoder<L>,
    n_features: usize,
    ensemble: Ensemble,
    train_deviance: Vec<f64>,
}

/// Result of fitting one class's tree within a round.
struct ClassFit {
    entry: EnsembleEntry,
    leaves: Vec<usize>,
}

/// Multi-class gradient boosting under the multinomial deviance.
///
/// Every round fits one regression tree per class to the pseudo-residuals
/// `1{y == k} - p_k`, replaces each leaf's value with a single Newton step
/// and adds the shrunken correction to that class's raw score. Prediction
/// sums the corrections of every tree and returns the arg-max label.
#[derive(Debug)]
pub struct GradientBoostingClassifier<L, B = RegressionTreeLearner> {
    params: BoostParams,
    learner: B,
    baseline: BaselineFn,
    state: Option<Trained<L>>,
}

impl<L> GradientBoostingClassifier<L, RegressionTreeLearner>
where
    L: Ord + Clone + Send + Sync,
{
    pub fn new(params: BoostParams) -> Self {
        Self::with_learner(params, RegressionTreeLearner)
    }
}

impl<L> Default for GradientBoostingClassifier<L, RegressionTreeLearner>
where
    L: Ord + Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new(BoostParams::default())
    }
}

impl<L, B> GradientBoostingClassifier<L, B>
where
    L: Ord + Clone + Send + Sync,
    B: TreeLearner + Sync,
{
    pub fn with_learner(params: BoostParams, learner: B) -> Self {
        Self {
            params,
            learner,
            baseline: zero_baseline,
            state: None,
        }
    }

    /// Replace the initial-score strategy used by both fit and predict.
    pub fn with_baseline(mut self, baseline: BaselineFn) -> Self {
        self.baseline = baseline;
        self
    }

    /// Train on `x` (N x F) and labels `y` (length N).
    ///
    /// On error any previously fitted model is kept as it was.
    ///
    /// # Errors
    ///
    /// Fails on invalid parameters, empty input, mismatched lengths, fewer
    /// than two distinct labels, a baseline of the wrong shape, or a tree
    /// that does not route every row to one of its own leaves.
    pub fn fit<Sx, Sy>(&mut self, x: &ArrayBase<Sx, Ix2>, y: &ArrayBase<Sy, Ix1>) -> Result<()>
    where
        Sx: Data<Elem = f64>,
        Sy: Data<Elem = L>,
    {
        self.params.validate()?;
        let x = x.view();
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(BoostError::EmptyDataset);
        }
        if y.len() != n_samples {
            return Err(BoostError::LengthMismatch {
                rows: n_samples,
                what: "y",
                len: y.len(),
            });
        }

        let (labels, y_idx) = LabelEncoder::fit_multiclass(y)?;
        let n_classes = labels.n_classes();
        let n_estimators = self.params.n_estimators;
        info!(
            n_samples,
            n_features,
            n_classes,
            n_estimators,
            "fitting gradient boosting classifier"
        );

        let mut scores = ScoreMatrix::new(self.initial_scores(&x, n_classes)?);
        let mut ensemble = Ensemble::with_capacity(n_classes, n_estimators);
        let mut train_deviance = Vec::with_capacity(n_estimators);

        for round in 0..n_estimators {
            let probs = scores.softmax();

            let fits: Vec<ClassFit> = if self.params.parallel {
                (0..n_classes)
                    .into_par_iter()
                    .map(|class| self.fit_class(&x, &probs, &y_idx, round, class))
                    .collect::<Result<_>>()?
            } else {
                (0..n_classes)
                    .map(|class| self.fit_class(&x, &probs, &y_idx, round, class))
                    .collect::<Result<_>>()?
            };

            let mut entries = Vec::with_capacity(n_classes);
            for (class, fit) in fits.into_iter().enumerate() {
                scores
                    .add_leaf_values(class, &fit.leaves, &fit.entry.leaf_values)
                    .map_err(|leaf| BoostError::MissingLeafValue { round, class, leaf })?;
                entries.push(fit.entry);
            }
            ensemble.push_round(entries);

            let deviance = multinomial_deviance(&scores.view(), &y_idx);
            debug!(round, deviance, "finished boosting round");
            train_deviance.push(deviance);
        }

        info!(
            n_trees = ensemble.len(),
            final_deviance = train_deviance.last().copied().unwrap_or(f64::NAN),
            "finished gradient boosting fit"
        );

        self.state = Some(Trained {
            labels,
            n_features,
            ensemble,
            train_deviance,
        });
        Ok(())
    }

    /// Fit class `class`'s tree against the round's frozen probabilities.
    fn fit_class(
        &self,
        x: &ArrayView2<f64>,
        probs: &Array2<f64>,
        y_idx: &[usize],
        round: usize,
        class: usize,
    ) -> Result<ClassFit> {
        let n_classes = probs.nrows();
        let residuals = pseudo_residuals(&probs.view(), y_idx, class);
        let tree = self
            .learner
            .fit(x, &residuals.view(), &self.params.tree)?;

        let leaves = tree.apply(x).to_vec();
        if leaves.len() != x.nrows() {
            return Err(BoostError::LeafCountMismatch {
                round,
                class,
                expected: x.nrows(),
                got: leaves.len(),
            });
        }
        let n_nodes = tree.n_nodes();
        if let Some(&leaf) = leaves.iter().find(|&&leaf| leaf >= n_nodes) {
            return Err(BoostError::MissingLeafValue { round, class, leaf });
        }

        let groups = LeafGroups::new(&leaves, n_nodes);
        let learning_rate = self.params.learning_rate;
        let leaf_values = LeafValueMap::from_groups(&groups, n_nodes, |samples| {
            newton_leaf_value(&residuals.view(), samples, n_classes, learning_rate)
        });
        trace!(round, class, n_leaves = tree.n_leaves(), "fitted class tree");

        Ok(ClassFit {
            entry: EnsembleEntry { tree, leaf_values },
            leaves,
        })
    }

    /// Baseline scores for `x`, checked to be (n_classes x n_samples).
    fn initial_scores(&self, x: &ArrayView2<f64>, n_classes: usize) -> Result<Array2<f64>> {
        let scores = (self.baseline)(x, n_classes);
        let expected = (n_classes, x.nrows());
        if scores.dim() != expected {
            return Err(BoostError::BaselineShape {
                expected,
                got: scores.dim(),
            });
        }
        Ok(scores)
    }

    fn trained(&self) -> Result<&Trained<L>> {
        self.state.as_ref().ok_or(BoostError::NotFitted)
    }

    /// View `x` as an (N x F) matrix, promoting a single feature vector to 1 x F.
    fn as_matrix<'a, S, D>(&self, x: &'a ArrayBase<S, D>) -> Result<ArrayView2<'a, f64>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let n_features = self.trained()?.n_features;
        let matrix = match x.ndim() {
            1 => x
                .view()
                .into_dimensionality::<Ix1>()
                .map_err(|_| BoostError::BadDimensionality(1))?
                .insert_axis(Axis(0)),
            2 => x
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|_| BoostError::BadDimensionality(2))?,
            ndim => return Err(BoostError::BadDimensionality(ndim)),
        };
        if matrix.ncols() != n_features {
            return Err(BoostError::FeatureMismatch {
                expected: n_features,
                got: matrix.ncols(),
            });
        }
        Ok(matrix)
    }

    /// Replay the ensemble over `x`, calling `after_round` with the running
    /// (K x N) scores after every round.
    fn replay<F>(&self, x: &ArrayView2<f64>, mut after_round: F) -> Result<Array2<f64>>
    where
        F: FnMut(&Array2<f64>),
    {
        let trained = self.trained()?;
        let mut scores = self.initial_scores(x, trained.ensemble.n_classes())?;
        for (round, entries) in trained.ensemble.rounds().enumerate() {
            for (class, entry) in entries.iter().enumerate() {
                let leaves = entry.tree.apply(x);
                if leaves.len() != x.nrows() {
                    return Err(BoostError::LeafCountMismatch {
                        round,
                        class,
                        expected: x.nrows(),
                        got: leaves.len(),
                    });
                }
                add_to_row(scores.row_mut(class), leaves.iter().copied(), &entry.leaf_values)
                    .map_err(|leaf| BoostError::MissingLeafValue { round, class, leaf })?;
            }
            after_round(&scores);
        }
        Ok(scores)
    }

    /// Raw accumulated scores, shape (n_classes, n_samples).
    ///
    /// # Errors
    ///
    /// Fails if the model is not fitted or `x` has the wrong shape.
    pub fn decision_function<S, D>(&self, x: &ArrayBase<S, D>) -> Result<Array2<f64>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let x = self.as_matrix(x)?;
        self.replay(&x, |_| {})
    }

    /// Softmax class probabilities, shape (n_samples, n_classes), columns in
    /// [`classes`](Self::classes) order.
    ///
    /// # Errors
    ///
    /// Fails if the model is not fitted or `x` has the wrong shape.
    pub fn predict_proba<S, D>(&self, x: &ArrayBase<S, D>) -> Result<Array2<f64>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let scores = self.decision_function(x)?;
        Ok(softmax_axis0(&scores.view()).reversed_axes())
    }

    /// Predicted label per sample; ties go to the lowest class index.
    ///
    /// `x` may be a single feature vector of length F or an (N x F) matrix.
    ///
    /// # Errors
    ///
    /// Fails if the model is not fitted or `x` has the wrong shape.
    pub fn predict<S, D>(&self, x: &ArrayBase<S, D>) -> Result<Array1<L>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let scores = self.decision_function(x)?;
        Ok(self.trained()?.labels.decode(&argmax_columns(&scores)))
    }

    /// Predicted labels after each boosting round.
    ///
    /// # Errors
    ///
    /// Fails if the model is not fitted or `x` has the wrong shape.
    pub fn staged_predict<S, D>(&self, x: &ArrayBase<S, D>) -> Result<Vec<Array1<L>>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let x = self.as_matrix(x)?;
        let labels = &self.trained()?.labels;
        let mut stages = Vec::new();
        self.replay(&x, |scores| {
            stages.push(labels.decode(&argmax_columns(scores)));
        })?;
        Ok(stages)
    }

    pub fn params(&self) -> &BoostParams {
        &self.params
    }

    pub fn learner(&self) -> &B {
        &self.learner
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Distinct training labels in class-index order.
    pub fn classes(&self) -> Option<&[L]> {
        self.state.as_ref().map(|s| s.labels.classes())
    }

    pub fn n_classes(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.labels.n_classes())
    }

    pub fn n_features(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.n_features)
    }

    pub fn ensemble(&self) -> Option<&Ensemble> {
        self.state.as_ref().map(|s| &s.ensemble)
    }

    /// Mean multinomial deviance on the training set after each round.
    pub fn train_deviance(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.train_deviance.as_slice())
    }
}

fn argmax_columns(scores: &Array2<f64>) -> Vec<usize> {
    scores
        .axis_iter(Axis(1))
        .map(|column| argmax(column.iter().copied()))
        .collect()
}
