use rand::{seq::index, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::data::{
    dataset::Dataset,
    features::{FeatureMatrix, RealNumber},
    labels::{ClassCounts, ClassLabel},
};
use crate::error::ModelError;
use crate::forests::params::ForestParams;
use crate::trees::{classifier::DecisionTreeClassifier, params::TreeClassifierParams};

/// Rows and feature columns one ensemble member was trained on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapSample {
    /// Row indices drawn with replacement, as many as the training set has rows.
    pub rows: Vec<usize>,
    /// Feature column indices, without repeats, in column order.
    pub features: Vec<usize>,
}

impl BootstrapSample {
    /// Draws the rows first, then the feature subset.
    pub fn draw<R: Rng>(
        n_samples: usize,
        n_features: usize,
        max_features: usize,
        rng: &mut R,
    ) -> Self {
        let rows = (0..n_samples)
            .map(|_| rng.gen_range(0..n_samples))
            .collect();
        let mut features = index::sample(rng, n_features, max_features).into_vec();
        features.sort_unstable();

        Self { rows, features }
    }
}

/// Random forest classifier.
///
/// Every tree is fitted on its own bootstrap sample and its own random subset
/// of feature columns, chosen once per tree. Predictions are combined by
/// majority vote; a tie goes to the class predicted first when scanning the
/// trees in training order.
#[derive(Clone, Debug)]
pub struct RandomForestClassifier<XT: RealNumber, YT: ClassLabel> {
    trees: Vec<DecisionTreeClassifier<XT, YT>>,
    samples: Vec<BootstrapSample>,
    forest_params: ForestParams,
    tree_params: TreeClassifierParams,
}

impl<XT: RealNumber, YT: ClassLabel> Default for RandomForestClassifier<XT, YT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<XT: RealNumber, YT: ClassLabel> RandomForestClassifier<XT, YT> {
    /// Ten trees of unbounded depth using information gain, splitting down to
    /// two samples, each seeing `floor(sqrt(n_features))` features.
    pub fn new() -> Self {
        let mut tree_params = TreeClassifierParams::new();
        tree_params.base_params.min_samples_split = 2;
        tree_params.base_params.max_depth = None;

        Self {
            trees: Vec::new(),
            samples: Vec::new(),
            forest_params: ForestParams::new(),
            tree_params,
        }
    }

    /// Creates a forest with custom parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] if `n_estimators` or `max_features`
    /// is 0, `max_depth` is 0, `min_samples_split` is below 2 or the criterion
    /// name is unknown.
    pub fn with_params(
        n_estimators: usize,
        max_features: Option<usize>,
        max_depth: Option<u16>,
        min_samples_split: u16,
        criterion: &str,
    ) -> Result<Self, ModelError> {
        let mut forest = Self::new();

        forest.set_n_estimators(n_estimators)?;
        forest.set_max_features(max_features)?;
        forest.set_max_depth(max_depth)?;
        forest.set_min_samples_split(min_samples_split)?;
        forest.set_criterion(criterion)?;
        Ok(forest)
    }

    pub fn set_n_estimators(&mut self, n_estimators: usize) -> Result<(), ModelError> {
        self.forest_params.set_n_estimators(n_estimators)
    }

    pub fn set_max_features(&mut self, max_features: Option<usize>) -> Result<(), ModelError> {
        self.forest_params.set_max_features(max_features)
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) -> Result<(), ModelError> {
        self.tree_params.set_max_depth(max_depth)
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<(), ModelError> {
        self.tree_params.set_min_samples_split(min_samples_split)
    }

    pub fn set_criterion(&mut self, criterion: &str) -> Result<(), ModelError> {
        self.tree_params.set_criterion(criterion)
    }

    /// Seed of the random source used by [`RandomForestClassifier::fit`].
    pub fn set_seed(&mut self, seed: u64) {
        self.forest_params.set_seed(seed);
    }

    pub fn n_estimators(&self) -> usize {
        self.forest_params.n_estimators()
    }

    pub fn max_features(&self) -> Option<usize> {
        self.forest_params.max_features()
    }

    pub fn seed(&self) -> u64 {
        self.forest_params.seed()
    }

    pub fn tree_params(&self) -> &TreeClassifierParams {
        &self.tree_params
    }

    /// Fitted trees in training order; empty before the first fit.
    pub fn trees(&self) -> &[DecisionTreeClassifier<XT, YT>] {
        &self.trees
    }

    /// Bootstrap sample of every fitted tree, aligned with [`RandomForestClassifier::trees`].
    pub fn samples(&self) -> &[BootstrapSample] {
        &self.samples
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Fits the forest with a ChaCha8 generator seeded from the configured seed.
    ///
    /// The same seed and dataset always produce the same forest.
    pub fn fit(&mut self, dataset: &Dataset<XT, YT>) -> Result<(), ModelError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed());
        self.fit_with_rng(dataset, &mut rng)
    }

    /// Fits the forest, drawing one seed per tree from `rng`.
    ///
    /// Trees are trained in parallel; each tree keeps its position in the
    /// ensemble regardless of which finishes first. A failed fit leaves any
    /// previously fitted forest in place.
    ///
    /// # Errors
    ///
    /// * [`ModelError::Configuration`] if `n_estimators` is 0 or `max_features`
    ///   exceeds the number of feature columns.
    /// * [`ModelError::DimensionMismatch`] if the row and label counts differ.
    /// * [`ModelError::InvalidInput`] if the dataset is empty or holds a missing or non-finite value.
    #[instrument(skip_all, fields(n_samples = dataset.nrows(), n_trees = self.n_estimators()))]
    pub fn fit_with_rng<R: Rng>(
        &mut self,
        dataset: &Dataset<XT, YT>,
        rng: &mut R,
    ) -> Result<(), ModelError> {
        let n_estimators = self.n_estimators();
        if n_estimators == 0 {
            return Err(ModelError::Configuration(
                "The number of trees must be greater than 0.".into(),
            ));
        }

        dataset.validate()?;
        if !dataset.is_not_empty() {
            return Err(ModelError::InvalidInput(
                "cannot fit a forest on an empty dataset".into(),
            ));
        }

        let n_samples = dataset.nrows();
        let n_features = dataset.x.ncols();
        let max_features = self.forest_params.resolve_max_features(n_features)?;

        info!(
            n_trees = n_estimators,
            n_samples,
            n_features,
            max_features,
            criterion = %self.tree_params.criterion(),
            "training random forest"
        );

        let seeds = (0..n_estimators)
            .map(|_| rng.gen::<u64>())
            .collect::<Vec<_>>();

        let tree_params = &self.tree_params;
        let members: Result<Vec<_>, ModelError> = seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut tree_rng = ChaCha8Rng::seed_from_u64(tree_seed);
                let sample =
                    BootstrapSample::draw(n_samples, n_features, max_features, &mut tree_rng);
                let subset = dataset
                    .samples(&sample.rows)
                    .select_features(&sample.features);

                let mut tree = DecisionTreeClassifier::from_params(tree_params.clone());
                tree.fit(&subset)?;
                Ok((tree, sample))
            })
            .collect();

        let (trees, samples): (Vec<_>, Vec<_>) = members?.into_iter().unzip();

        debug!(
            n_trees_trained = trees.len(),
            total_leaves = trees
                .iter()
                .filter_map(DecisionTreeClassifier::n_leaves)
                .sum::<usize>(),
            "tree training complete"
        );

        self.trees = trees;
        self.samples = samples;
        Ok(())
    }

    /// Predicts one label per row by majority vote over all trees.
    ///
    /// # Errors
    ///
    /// * [`ModelError::NotFitted`] if the forest wasn't fitted yet.
    /// * [`ModelError::InvalidInput`] if a value is missing or non-finite.
    /// * [`ModelError::MissingFeature`] if a column used by a member tree is absent.
    pub fn predict(&self, features: &FeatureMatrix<XT>) -> Result<Vec<YT>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        features.validate()?;

        let tree_predictions = self
            .trees
            .par_iter()
            .map(|tree| tree.predict_validated(features))
            .collect::<Result<Vec<_>, _>>()?;

        let predictions = (0..features.nrows())
            .map(|row| {
                let votes = ClassCounts::from_labels(
                    tree_predictions.iter().map(|predictions| &predictions[row]),
                );
                votes
                    .majority()
                    .cloned()
                    .expect("a fitted forest casts at least one vote per row")
            })
            .collect();
        Ok(predictions)
    }
}
