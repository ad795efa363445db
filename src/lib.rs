//! # Rusty-grove
//!
//! `rusty-grove` provides a binary decision tree classifier and a random forest
//! classifier built on top of it. Trees split numeric features on thresholds
//! chosen by information gain or Gini gain; forests bag trees over bootstrap
//! samples and random feature subsets and combine them by majority vote.
//!
//! ## Getting Started
//!
//! To use `rusty-grove`, add the following to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! rusty-grove = "*"
//! ```
//!
//! ## Example Usage
//!
//! As a quick example, here's how you can fit a decision tree on a small dataset:
//!
//! ```rust
//!
//! use rusty_grove::data::dataset::Dataset;
//! use rusty_grove::data::features::FeatureMatrix;
//! use rusty_grove::trees::classifier::DecisionTreeClassifier;
//!
//! let x = FeatureMatrix::from_rows(
//!     vec!["m1".to_string(), "m2".to_string()],
//!     &[vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]],
//! )
//! .unwrap();
//! let dataset = Dataset::new(x, vec!["c", "c", "nc", "nc"]);
//!
//! let mut tree = DecisionTreeClassifier::with_params("information", Some(10), 2).unwrap();
//! tree.fit(&dataset).unwrap();
//!
//! let predictions = tree.predict(&dataset.x).unwrap();
//! assert_eq!(predictions, vec!["c", "c", "nc", "nc"]);
//! ```

/// Dataset and feature table utilities
pub mod data;
/// Error type shared by all models
pub mod error;
/// Random Forests
pub mod forests;
/// Decision trees
pub mod trees;

pub use error::ModelError;
