/// Errors returned by the tree and forest classifiers.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// An unknown criterion name, a non-positive tree count, or any other
    /// hyperparameter combination that cannot be trained.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Returned when the number of feature rows differs from the number of labels.
    #[error("dataset has {rows} rows but {labels} labels")]
    DimensionMismatch {
        /// Number of feature rows.
        rows: usize,
        /// Number of labels.
        labels: usize,
    },

    /// Returned when predicting or printing before a successful fit.
    #[error("model has not been fitted yet")]
    NotFitted,

    /// Returned when a prediction row lacks a feature used by a learned split.
    #[error("input is missing feature '{feature}' required by a learned split")]
    MissingFeature {
        /// Name of the missing feature column.
        feature: String,
    },

    /// Returned for malformed tables and for missing or non-finite values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Returned when writing a tree rendering to its sink fails.
    #[error("failed to write tree rendering")]
    Io(#[from] std::io::Error),
}
