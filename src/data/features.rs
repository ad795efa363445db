use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug, Display, Formatter};

use nalgebra::DMatrix;
use num_traits::{Float, FromPrimitive};

use crate::error::ModelError;

/// Numeric feature value. Implemented for `f32` and `f64`.
pub trait RealNumber: Float + FromPrimitive + Debug + Display + Send + Sync + 'static {}
impl<T> RealNumber for T where T: Float + FromPrimitive + Debug + Display + Send + Sync + 'static {}

/// Dense table of named numeric feature columns.
///
/// Values are stored in an `nalgebra` matrix with one row per sample and one
/// column per feature. Column names are unique and keep their order, which is
/// the order the split search scans features in.
#[derive(Clone, PartialEq)]
pub struct FeatureMatrix<XT: RealNumber> {
    columns: Vec<String>,
    lookup: HashMap<String, usize>,
    values: DMatrix<XT>,
}

/// Borrowed view of a single row of a [`FeatureMatrix`], addressed by column name.
#[derive(Clone, Copy)]
pub struct FeatureRow<'a, XT: RealNumber> {
    matrix: &'a FeatureMatrix<XT>,
    index: usize,
}

impl<XT: RealNumber> FeatureRow<'_, XT> {
    /// Returns the value of the named feature, or `None` if the table has no such column.
    pub fn get(&self, feature: &str) -> Option<XT> {
        self.matrix
            .column_index(feature)
            .map(|column| self.matrix.values[(self.index, column)])
    }

    /// Position of the row inside its table.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<XT: RealNumber> Debug for FeatureMatrix<XT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureMatrix {{\n    columns: {:?},\n    values: [\n", self.columns)?;

        for i in 0..self.values.nrows() {
            write!(f, "        [")?;
            for j in 0..self.values.ncols() {
                write!(f, "{:?}, ", self.values[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ]\n}}")
    }
}

impl<XT: RealNumber> FeatureMatrix<XT> {
    /// Creates a table from column names and a row-per-sample matrix.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] if the number of names differs from
    /// the matrix width or if a name appears twice.
    pub fn new(columns: Vec<String>, values: DMatrix<XT>) -> Result<Self, ModelError> {
        if columns.len() != values.ncols() {
            return Err(ModelError::InvalidInput(format!(
                "{} column names given for {} value columns",
                columns.len(),
                values.ncols()
            )));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = columns.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(ModelError::InvalidInput(format!(
                "duplicate column '{duplicate}'"
            )));
        }

        let lookup = columns
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();

        Ok(Self {
            columns,
            lookup,
            values,
        })
    }

    /// Creates a table from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] if any row has a different length
    /// than `columns`, or if a column name repeats.
    pub fn from_rows(columns: Vec<String>, rows: &[Vec<XT>]) -> Result<Self, ModelError> {
        let width = columns.len();
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(ModelError::InvalidInput(format!(
                "row {index} has {} values, expected {width}",
                row.len()
            )));
        }

        let values = DMatrix::from_fn(rows.len(), width, |i, j| rows[i][j]);
        Self::new(columns, values)
    }

    /// Creates a table from records mapping feature names to values.
    ///
    /// Only the listed `columns` are read, in that order; extra keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] if a record has no value for one of the columns.
    pub fn from_records(
        columns: Vec<String>,
        records: &[HashMap<String, XT>],
    ) -> Result<Self, ModelError> {
        let rows = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                columns
                    .iter()
                    .map(|name| {
                        record.get(name).copied().ok_or_else(|| {
                            ModelError::InvalidInput(format!(
                                "row {index} is missing a value for '{name}'"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_rows(columns, &rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &DMatrix<XT> {
        &self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Value at `(row, column)`. Panics if either index is out of range.
    pub fn value(&self, row: usize, column: usize) -> XT {
        self.values[(row, column)]
    }

    /// Returns a named view of row `index`. Panics if the row does not exist.
    pub fn row(&self, index: usize) -> FeatureRow<'_, XT> {
        assert!(index < self.nrows(), "row {index} out of range");
        FeatureRow {
            matrix: self,
            index,
        }
    }

    /// Checks that every value is finite. `NaN` stands for a missing value.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] naming the first offending row and column.
    pub fn validate(&self) -> Result<(), ModelError> {
        for i in 0..self.nrows() {
            for j in 0..self.ncols() {
                if !self.values[(i, j)].is_finite() {
                    return Err(ModelError::InvalidInput(format!(
                        "missing or non-finite value at row {i}, column '{}'",
                        self.columns[j]
                    )));
                }
            }
        }
        Ok(())
    }

    /// Copies the given rows, in the given order. Indices may repeat.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            lookup: self.lookup.clone(),
            values: self.values.select_rows(indices),
        }
    }

    /// Copies the given columns, in the given order, keeping their names.
    /// Indices must be unique.
    pub fn select_columns(&self, indices: &[usize]) -> Self {
        let columns: Vec<String> = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let lookup = columns
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();

        Self {
            columns,
            lookup,
            values: self.values.select_columns(indices),
        }
    }
}
