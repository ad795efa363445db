use crate::error::ModelError;

#[derive(Clone, Debug, PartialEq)]
pub struct ForestParams {
    n_estimators: usize,
    max_features: Option<usize>,
    seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestParams {
    pub fn new() -> Self {
        Self {
            n_estimators: 10,
            max_features: None,
            seed: 42,
        }
    }

    pub fn set_n_estimators(&mut self, n_estimators: usize) -> Result<(), ModelError> {
        if n_estimators < 1 {
            return Err(ModelError::Configuration(
                "The number of trees must be greater than 0.".into(),
            ));
        }
        self.n_estimators = n_estimators;
        Ok(())
    }

    /// `None` resolves to `floor(sqrt(n_features))` at fit time.
    pub fn set_max_features(&mut self, max_features: Option<usize>) -> Result<(), ModelError> {
        if max_features.is_some_and(|count| count < 1) {
            return Err(ModelError::Configuration(
                "The number of features per tree must be greater than 0.".into(),
            ));
        }
        self.max_features = max_features;
        Ok(())
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of feature columns each tree is trained on.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] when more features are requested
    /// than the dataset has.
    pub fn resolve_max_features(&self, n_features: usize) -> Result<usize, ModelError> {
        match self.max_features {
            None => Ok((n_features as f64).sqrt().floor() as usize),
            Some(count) if count > n_features => Err(ModelError::Configuration(format!(
                "max_features is {count} but the dataset has only {n_features} features"
            ))),
            Some(count) => Ok(count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_n_estimators_must_be_positive() {
        let mut params = ForestParams::new();
        assert!(matches!(
            params.set_n_estimators(0),
            Err(ModelError::Configuration(_))
        ));
        assert_eq!(params.n_estimators(), 10);
        params.set_n_estimators(3).unwrap();
        assert_eq!(params.n_estimators(), 3);
    }

    #[test]
    fn test_max_features_must_be_positive() {
        let mut params = ForestParams::new();
        assert!(params.set_max_features(Some(0)).is_err());
        assert!(params.set_max_features(Some(2)).is_ok());
    }

    #[test]
    fn test_resolve_max_features_defaults_to_floor_sqrt() {
        let params = ForestParams::new();
        assert_eq!(params.resolve_max_features(1).unwrap(), 1);
        assert_eq!(params.resolve_max_features(8).unwrap(), 2);
        assert_eq!(params.resolve_max_features(9).unwrap(), 3);
        assert_eq!(params.resolve_max_features(0).unwrap(), 0);
    }

    #[test]
    fn test_resolve_max_features_rejects_too_many() {
        let mut params = ForestParams::new();
        params.set_max_features(Some(5)).unwrap();
        assert_eq!(params.resolve_max_features(5).unwrap(), 5);
        assert!(matches!(
            params.resolve_max_features(4),
            Err(ModelError::Configuration(_))
        ));
    }
}
