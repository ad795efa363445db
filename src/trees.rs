/// Decision tree classifier
pub mod classifier;
/// Entropy and Gini impurity criteria
pub mod criterion;
/// Tree nodes and the greedy split search
pub mod node;
/// Tree hyperparameters
pub mod params;
