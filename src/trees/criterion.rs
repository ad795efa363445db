//! Impurity criteria used to score candidate splits.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::data::labels::{ClassCounts, ClassLabel};
use crate::error::ModelError;

/// Impurity measure driving the split search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Criterion {
    /// Shannon entropy in bits, scored by information gain.
    #[default]
    Information,
    /// Gini index `1 - Σ p_i²`, scored by Gini gain.
    Gini,
}

impl Criterion {
    /// Impurity of a node given its per-class counts.
    ///
    /// Zero counts contribute nothing. An empty node has impurity 0.
    pub fn impurity(&self, counts: &[usize]) -> f64 {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;

        match self {
            Criterion::Information => counts
                .iter()
                .filter(|&&count| count > 0)
                .map(|&count| {
                    let p = count as f64 / total;
                    -p * p.log2()
                })
                .sum(),
            Criterion::Gini => {
                1.0 - counts
                    .iter()
                    .map(|&count| {
                        let p = count as f64 / total;
                        p * p
                    })
                    .sum::<f64>()
            }
        }
    }

    /// Impurity decrease from splitting `parent` into `left` and `right`,
    /// each child weighted by its share of the parent's samples.
    ///
    /// The Gini gain of a split with an empty side is 0.
    pub fn gain(&self, parent: &[usize], left: &[usize], right: &[usize]) -> f64 {
        let n: usize = parent.iter().sum();
        let n_left: usize = left.iter().sum();
        let n_right: usize = right.iter().sum();

        if n == 0 {
            return 0.0;
        }
        if *self == Criterion::Gini && (n_left == 0 || n_right == 0) {
            return 0.0;
        }

        let weight_left = n_left as f64 / n as f64;
        let weight_right = n_right as f64 / n as f64;

        self.impurity(parent)
            - weight_left * self.impurity(left)
            - weight_right * self.impurity(right)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Information => "information",
            Criterion::Gini => "gini",
        }
    }
}

impl FromStr for Criterion {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "information" | "entropy" => Ok(Criterion::Information),
            "gini" => Ok(Criterion::Gini),
            other => Err(ModelError::Configuration(format!(
                "unknown criterion '{other}', expected 'information' or 'gini'"
            ))),
        }
    }
}

impl Display for Criterion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn counts_of<YT: ClassLabel>(labels: &[YT]) -> Vec<usize> {
    ClassCounts::from_labels(labels).counts().to_vec()
}

/// Shannon entropy of a label sequence, in bits.
///
/// Only meaningful for non-empty input; an empty slice yields 0.
pub fn entropy<YT: ClassLabel>(labels: &[YT]) -> f64 {
    Criterion::Information.impurity(&counts_of(labels))
}

/// Entropy of `parent` minus the size-weighted entropies of `left` and `right`.
pub fn information_gain<YT: ClassLabel>(parent: &[YT], left: &[YT], right: &[YT]) -> f64 {
    Criterion::Information.gain(&counts_of(parent), &counts_of(left), &counts_of(right))
}

/// Gini index `1 - Σ p_i²` of a label sequence.
pub fn gini<YT: ClassLabel>(labels: &[YT]) -> f64 {
    Criterion::Gini.impurity(&counts_of(labels))
}

/// Gini of `parent` minus the size-weighted Gini of `left` and `right`;
/// 0 when either side is empty.
pub fn gini_gain<YT: ClassLabel>(parent: &[YT], left: &[YT], right: &[YT]) -> f64 {
    Criterion::Gini.gain(&counts_of(parent), &counts_of(left), &counts_of(right))
}
