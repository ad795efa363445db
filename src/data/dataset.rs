use std::fmt::{self, Debug, Formatter};

use crate::data::features::{FeatureMatrix, RealNumber};
use crate::data::labels::ClassLabel;
use crate::error::ModelError;

/// Training data: a table of named numeric features and one class label per row.
pub struct Dataset<XT: RealNumber, YT: ClassLabel> {
    pub x: FeatureMatrix<XT>,
    pub y: Vec<YT>,
}

impl<XT: RealNumber, YT: ClassLabel> Debug for Dataset<XT, YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    columns: {:?},\n    x: [\n", self.x.columns())?;

        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{:?}, ", self.x.value(i, j))?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ],\n    y: [")?;
        for label in &self.y {
            write!(f, "{:?}, ", label)?;
        }
        write!(f, "]\n}}")
    }
}

impl<XT: RealNumber, YT: ClassLabel> Clone for Dataset<XT, YT> {
    fn clone(&self) -> Self {
        Self::new(self.x.clone(), self.y.clone())
    }
}

impl<XT: RealNumber, YT: ClassLabel> Dataset<XT, YT> {
    pub fn new(x: FeatureMatrix<XT>, y: Vec<YT>) -> Self {
        Self { x, y }
    }

    pub fn into_parts(&self) -> (&FeatureMatrix<XT>, &[YT]) {
        (&self.x, &self.y)
    }

    pub fn is_not_empty(&self) -> bool {
        !(self.x.nrows() == 0 || self.y.is_empty())
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    /// Checks the invariants every fit relies on.
    ///
    /// # Errors
    ///
    /// * [`ModelError::DimensionMismatch`] if the row and label counts differ.
    /// * [`ModelError::InvalidInput`] if a feature value is missing or non-finite.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.x.nrows() != self.y.len() {
            return Err(ModelError::DimensionMismatch {
                rows: self.x.nrows(),
                labels: self.y.len(),
            });
        }
        self.x.validate()
    }

    /// Copies the given rows and their labels. Indices may repeat, so this
    /// also materializes bootstrap samples.
    pub fn samples(&self, indices: &[usize]) -> Self {
        let y = indices.iter().map(|&index| self.y[index].clone()).collect();
        Self::new(self.x.select_rows(indices), y)
    }

    /// Keeps only the given feature columns.
    pub fn select_features(&self, indices: &[usize]) -> Self {
        Self::new(self.x.select_columns(indices), self.y.clone())
    }
}
