//! Decision Tree Classifier
use std::io::Write;

use tracing::{debug, instrument};

use super::{
    criterion::Criterion,
    node::{GrowContext, TreeNode},
    params::TreeClassifierParams,
};
use crate::data::{
    dataset::Dataset,
    features::{FeatureMatrix, RealNumber},
    labels::{ClassCounts, ClassLabel},
};
use crate::error::ModelError;

/// Decision Tree Classifier
///
/// A binary tree grown greedily by exhaustive threshold search over every
/// feature column. Splits test `feature <= threshold` and refer to features
/// by name, so prediction inputs only need to contain the columns the tree
/// actually splits on.
#[derive(Clone, Debug)]
pub struct DecisionTreeClassifier<XT: RealNumber, YT: ClassLabel> {
    root: Option<Box<TreeNode<XT, YT>>>,
    feature_names: Vec<String>,
    tree_params: TreeClassifierParams,
}

impl<XT: RealNumber, YT: ClassLabel> Default for DecisionTreeClassifier<XT, YT> {
    /// Creates a new instance of the decision tree classifier with default parameters.
    fn default() -> Self {
        Self::new()
    }
}

impl<XT: RealNumber, YT: ClassLabel> DecisionTreeClassifier<XT, YT> {
    /// Creates a new instance of the decision tree classifier with default parameters:
    /// information gain, a maximum depth of 20 and at least 5 samples per split.
    pub fn new() -> Self {
        Self::from_params(TreeClassifierParams::new())
    }

    /// Creates an unfitted tree from already validated parameters.
    pub fn from_params(tree_params: TreeClassifierParams) -> Self {
        Self {
            root: None,
            feature_names: Vec::new(),
            tree_params,
        }
    }

    /// Creates a new instance of the decision tree classifier with custom parameters.
    ///
    /// # Arguments
    ///
    /// * `criterion` - Name of the impurity criterion, `information` or `gini`.
    /// * `max_depth` - The maximum depth of the tree, `None` for unbounded.
    /// * `min_samples_split` - The minimum number of samples required to split an internal node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] if the criterion is unknown, the
    /// maximum depth is 0 or the minimum number of samples to split is less than 2.
    pub fn with_params(
        criterion: &str,
        max_depth: Option<u16>,
        min_samples_split: u16,
    ) -> Result<Self, ModelError> {
        let mut tree = Self::new();

        tree.set_criterion(criterion)?;
        tree.set_max_depth(max_depth)?;
        tree.set_min_samples_split(min_samples_split)?;
        Ok(tree)
    }

    /// Sets the impurity criterion by name.
    pub fn set_criterion(&mut self, criterion: &str) -> Result<(), ModelError> {
        self.tree_params.set_criterion(criterion)
    }

    /// Sets the maximum depth of the tree.
    pub fn set_max_depth(&mut self, max_depth: Option<u16>) -> Result<(), ModelError> {
        self.tree_params.set_max_depth(max_depth)
    }

    /// Sets the minimum number of samples required to split an internal node.
    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<(), ModelError> {
        self.tree_params.set_min_samples_split(min_samples_split)
    }

    pub fn criterion(&self) -> Criterion {
        self.tree_params.criterion()
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.tree_params.max_depth()
    }

    pub fn min_samples_split(&self) -> u16 {
        self.tree_params.min_samples_split()
    }

    pub fn params(&self) -> &TreeClassifierParams {
        &self.tree_params
    }

    /// Root of the fitted tree, `None` before the first successful fit.
    pub fn root(&self) -> Option<&TreeNode<XT, YT>> {
        self.root.as_deref()
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Feature columns the tree was fitted on.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Depth of the deepest leaf of the fitted tree.
    pub fn depth(&self) -> Option<usize> {
        self.root().map(TreeNode::max_leaf_depth)
    }

    pub fn n_leaves(&self) -> Option<usize> {
        self.root().map(TreeNode::n_leaves)
    }

    /// Builds the decision tree from a dataset.
    ///
    /// A successful fit replaces any previously fitted tree; a failed one
    /// leaves it untouched.
    ///
    /// # Errors
    ///
    /// * [`ModelError::DimensionMismatch`] if the row and label counts differ.
    /// * [`ModelError::InvalidInput`] if the dataset is empty or holds a missing or non-finite value.
    #[instrument(skip_all, fields(n_samples = dataset.nrows(), n_features = dataset.x.ncols()))]
    pub fn fit(&mut self, dataset: &Dataset<XT, YT>) -> Result<(), ModelError> {
        dataset.validate()?;
        if !dataset.is_not_empty() {
            return Err(ModelError::InvalidInput(
                "cannot fit a tree on an empty dataset".into(),
            ));
        }

        let (x, y) = dataset.into_parts();
        let (classes, class_ids) = ClassCounts::encode(y);
        let ctx = GrowContext {
            x,
            classes: classes.classes(),
            class_ids: &class_ids,
            criterion: self.criterion(),
            min_samples_split: usize::from(self.min_samples_split()),
            max_depth: self.max_depth().map(usize::from),
        };

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let root = TreeNode::grow(&ctx, &indices, 0);

        debug!(
            n_classes = classes.n_classes(),
            n_leaves = root.n_leaves(),
            depth = root.max_leaf_depth(),
            "decision tree built"
        );

        self.root = Some(Box::new(root));
        self.feature_names = x.columns().to_vec();
        Ok(())
    }

    /// Predicts the labels for new data, one per row, in row order.
    ///
    /// Columns are matched by name; extra columns are ignored.
    ///
    /// # Errors
    ///
    /// * [`ModelError::NotFitted`] if the tree wasn't built yet.
    /// * [`ModelError::InvalidInput`] if a value is missing or non-finite.
    /// * [`ModelError::MissingFeature`] if a column used by a split is absent.
    pub fn predict(&self, features: &FeatureMatrix<XT>) -> Result<Vec<YT>, ModelError> {
        self.root.as_ref().ok_or(ModelError::NotFitted)?;
        features.validate()?;
        self.predict_validated(features)
    }

    /// [`DecisionTreeClassifier::predict`] for a matrix the caller already validated.
    pub(crate) fn predict_validated(
        &self,
        features: &FeatureMatrix<XT>,
    ) -> Result<Vec<YT>, ModelError> {
        let root = self.root.as_ref().ok_or(ModelError::NotFitted)?;

        (0..features.nrows())
            .map(|i| root.predict_row(&features.row(i)).cloned())
            .collect()
    }

    /// Writes an indented rendering of the split conditions down to the leaf
    /// predictions. Intended for diagnostics.
    ///
    /// # Errors
    ///
    /// * [`ModelError::NotFitted`] if the tree wasn't built yet.
    /// * [`ModelError::Io`] if the sink fails.
    pub fn print_tree<W: Write>(&self, sink: &mut W) -> Result<(), ModelError> {
        let root = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        write!(sink, "{root}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    fn markers() -> Dataset<f64, &'static str> {
        let x = FeatureMatrix::from_rows(
            names(&["m1", "m2"]),
            &[vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]],
        )
        .unwrap();
        Dataset::new(x, vec!["c", "c", "nc", "nc"])
    }

    #[test]
    fn test_fit_and_predict_markers() {
        let dataset = markers();
        let mut tree = DecisionTreeClassifier::with_params("information", Some(10), 2).unwrap();
        tree.fit(&dataset).unwrap();

        let root = tree.root().unwrap();
        assert!(matches!(
            root,
            TreeNode::Internal { feature, threshold, .. } if feature == "m1" && *threshold == 0.5
        ));
        assert_eq!(tree.n_leaves(), Some(2));
        assert_eq!(tree.depth(), Some(1));
        assert_eq!(tree.predict(&dataset.x).unwrap(), vec!["c", "c", "nc", "nc"]);
    }

    #[test]
    fn test_single_class_gives_single_leaf() {
        let x = FeatureMatrix::from_rows(
            names(&["a", "b"]),
            &[vec![0.0, 9.0], vec![3.0, -1.0], vec![7.0, 2.0]],
        )
        .unwrap();
        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&Dataset::new(x, vec![4u8, 4, 4])).unwrap();

        assert!(tree.root().unwrap().is_leaf());
        let unseen = FeatureMatrix::from_rows(
            names(&["a", "b"]),
            &[vec![100.0, -100.0], vec![-5.0, 0.5]],
        )
        .unwrap();
        assert_eq!(tree.predict(&unseen).unwrap(), vec![4, 4]);
    }

    #[test]
    fn test_predict_before_fit() {
        let tree: DecisionTreeClassifier<f64, &str> = DecisionTreeClassifier::new();
        assert!(matches!(
            tree.predict(&markers().x),
            Err(ModelError::NotFitted)
        ));
        assert!(matches!(
            tree.print_tree(&mut Vec::<u8>::new()),
            Err(ModelError::NotFitted)
        ));
    }

    #[test]
    fn test_fit_dimension_mismatch() {
        let mut dataset = markers();
        dataset.y.push("c");
        let mut tree = DecisionTreeClassifier::new();
        assert!(matches!(
            tree.fit(&dataset),
            Err(ModelError::DimensionMismatch { rows: 4, labels: 5 })
        ));
        assert!(!tree.is_fitted());
    }

    #[test]
    fn test_failed_refit_keeps_previous_tree() {
        let mut tree = DecisionTreeClassifier::with_params("gini", None, 2).unwrap();
        tree.fit(&markers()).unwrap();
        let before = tree.root().cloned();

        let mut broken = markers();
        broken.y.pop();
        assert!(tree.fit(&broken).is_err());
        assert_eq!(tree.root().cloned(), before);
    }

    #[test]
    fn test_refit_replaces_tree() {
        let mut tree = DecisionTreeClassifier::with_params("gini", None, 2).unwrap();
        tree.fit(&markers()).unwrap();

        let mut flipped = markers();
        flipped.y = vec!["nc", "nc", "c", "c"];
        tree.fit(&flipped).unwrap();
        assert_eq!(tree.predict(&flipped.x).unwrap(), vec!["nc", "nc", "c", "c"]);
    }

    #[test]
    fn test_fit_rejects_missing_values() {
        let x = FeatureMatrix::from_rows(names(&["a"]), &[vec![1.0], vec![f64::NAN]]).unwrap();
        let mut tree = DecisionTreeClassifier::new();
        assert!(matches!(
            tree.fit(&Dataset::new(x, vec![0, 1])),
            Err(ModelError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_fit_rejects_empty_dataset() {
        let x = FeatureMatrix::<f64>::from_rows(names(&["a"]), &[]).unwrap();
        let mut tree: DecisionTreeClassifier<f64, u8> = DecisionTreeClassifier::new();
        assert!(matches!(
            tree.fit(&Dataset::new(x, vec![])),
            Err(ModelError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_predict_missing_feature() {
        let mut tree = DecisionTreeClassifier::with_params("information", Some(10), 2).unwrap();
        tree.fit(&markers()).unwrap();

        let only_m2 = FeatureMatrix::from_rows(names(&["m2"]), &[vec![1.0]]).unwrap();
        assert!(matches!(
            tree.predict(&only_m2),
            Err(ModelError::MissingFeature { feature }) if feature == "m1"
        ));
    }

    #[test]
    fn test_predict_ignores_column_order_and_extra_columns() {
        let mut tree = DecisionTreeClassifier::with_params("information", Some(10), 2).unwrap();
        tree.fit(&markers()).unwrap();

        let shuffled = FeatureMatrix::from_rows(
            names(&["extra", "m2", "m1"]),
            &[vec![5.0, 0.0, 1.0], vec![5.0, 1.0, 0.0]],
        )
        .unwrap();
        assert_eq!(tree.predict(&shuffled).unwrap(), vec!["c", "nc"]);
    }

    #[test]
    fn test_memorizes_distinct_rows() {
        let rows: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64 * 0.5]).collect();
        let labels = vec![0, 1, 1, 0, 2, 2, 2, 0, 1, 0, 0, 2];
        let x = FeatureMatrix::from_rows(names(&["t"]), &rows).unwrap();
        let dataset = Dataset::new(x, labels.clone());

        for criterion in ["information", "gini"] {
            let mut tree = DecisionTreeClassifier::with_params(criterion, None, 2).unwrap();
            tree.fit(&dataset).unwrap();
            assert_eq!(tree.predict(&dataset.x).unwrap(), labels);
        }
    }

    #[test]
    fn test_unbounded_depth_grows_without_recursion() {
        // Alternating labels over distinct values peel off one row per level.
        let n_rows = 3000;
        let rows: Vec<Vec<f64>> = (0..n_rows).map(|i| vec![i as f64]).collect();
        let labels: Vec<u8> = (0..n_rows).map(|i| (i % 2) as u8).collect();
        let x = FeatureMatrix::from_rows(names(&["t"]), &rows).unwrap();
        let dataset = Dataset::new(x, labels.clone());

        let mut tree = DecisionTreeClassifier::with_params("gini", None, 2).unwrap();
        tree.fit(&dataset).unwrap();

        assert_eq!(tree.n_leaves(), Some(n_rows));
        assert_eq!(tree.depth(), Some(n_rows - 1));
        assert_eq!(tree.predict(&dataset.x).unwrap(), labels);
    }

    #[test]
    fn test_with_params_rejects_unknown_criterion() {
        let result: Result<DecisionTreeClassifier<f64, u8>, _> =
            DecisionTreeClassifier::with_params("chaos", None, 2);
        assert!(matches!(result, Err(ModelError::Configuration(_))));
    }

    #[test]
    fn test_print_tree() {
        let mut tree = DecisionTreeClassifier::with_params("information", Some(10), 2).unwrap();
        tree.fit(&markers()).unwrap();

        let mut out = Vec::new();
        tree.print_tree(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "m1 <= 0.5 (gain 1.000000)\n  left: nc\n  right: c\n"
        );
    }
}
