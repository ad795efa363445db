use crate::error::ModelError;
use crate::trees::criterion::Criterion;

#[derive(Clone, Debug, PartialEq)]
pub struct TreeParams {
    pub min_samples_split: u16,
    pub max_depth: Option<u16>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            min_samples_split: 5,
            max_depth: Some(20),
        }
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<(), ModelError> {
        if min_samples_split < 2 {
            return Err(ModelError::Configuration(
                "The minimum number of samples to split must be greater than 1.".into(),
            ));
        }
        self.min_samples_split = min_samples_split;
        Ok(())
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) -> Result<(), ModelError> {
        if max_depth.is_some_and(|depth| depth < 1) {
            return Err(ModelError::Configuration(
                "The maximum depth must be greater than 0.".into(),
            ));
        }
        self.max_depth = max_depth;
        Ok(())
    }

    pub fn min_samples_split(&self) -> u16 {
        self.min_samples_split
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.max_depth
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeClassifierParams {
    pub base_params: TreeParams,
    pub criterion: Criterion,
}

impl Default for TreeClassifierParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeClassifierParams {
    pub fn new() -> Self {
        Self {
            base_params: TreeParams::new(),
            criterion: Criterion::Information,
        }
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<(), ModelError> {
        self.base_params.set_min_samples_split(min_samples_split)
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) -> Result<(), ModelError> {
        self.base_params.set_max_depth(max_depth)
    }

    /// Selects the criterion by name: `information` (or `entropy`) or `gini`.
    pub fn set_criterion(&mut self, criterion: &str) -> Result<(), ModelError> {
        self.criterion = criterion.parse()?;
        Ok(())
    }

    pub fn min_samples_split(&self) -> u16 {
        self.base_params.min_samples_split
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.base_params.max_depth
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }
}
