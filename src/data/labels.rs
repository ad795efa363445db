use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Class value of a classification target. Implemented for any hashable,
/// printable type such as `&str`, `String` or the integer types.
pub trait ClassLabel: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}
impl<T> ClassLabel for T where T: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}

/// Frequency table of class labels.
///
/// Classes are enumerated in the order they are first seen, and that order
/// is what breaks ties: [`ClassCounts::majority`] returns the earliest class
/// among those sharing the highest count.
#[derive(Clone, Debug)]
pub struct ClassCounts<YT: ClassLabel> {
    classes: Vec<YT>,
    counts: Vec<usize>,
    index: HashMap<YT, usize>,
}

impl<YT: ClassLabel> Default for ClassCounts<YT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<YT: ClassLabel> ClassCounts<YT> {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            counts: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a YT>,
    {
        let mut counts = Self::new();
        for label in labels {
            counts.add(label);
        }
        counts
    }

    /// Counts every label and returns the table together with the class index
    /// of each label, in input order.
    pub fn encode(labels: &[YT]) -> (Self, Vec<usize>) {
        let mut counts = Self::new();
        let ids = labels.iter().map(|label| counts.add(label)).collect();
        (counts, ids)
    }

    /// Records one occurrence of `label` and returns its class index.
    pub fn add(&mut self, label: &YT) -> usize {
        let class = match self.index.get(label) {
            Some(&class) => class,
            None => {
                let class = self.classes.len();
                self.index.insert(label.clone(), class);
                self.classes.push(label.clone());
                self.counts.push(0);
                class
            }
        };
        self.counts[class] += 1;
        class
    }

    pub fn class_index(&self, label: &YT) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Classes in first-seen order.
    pub fn classes(&self) -> &[YT] {
        &self.classes
    }

    /// Counts aligned with [`ClassCounts::classes`].
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Most frequent class. Ties go to the class seen first.
    pub fn majority(&self) -> Option<&YT> {
        majority_index(&self.counts).map(|class| &self.classes[class])
    }
}

/// Index of the largest count; the lowest index wins ties.
pub(crate) fn majority_index(counts: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (class, &count) in counts.iter().enumerate() {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((class, count));
        }
    }
    best.map(|(class, _)| class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_keep_first_seen_order() {
        let counts = ClassCounts::from_labels(&["b", "a", "b", "c"]);
        assert_eq!(counts.classes(), &["b", "a", "c"]);
        assert_eq!(counts.counts(), &[2, 1, 1]);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_majority() {
        let counts = ClassCounts::from_labels(&[1, 2, 2, 3]);
        assert_eq!(counts.majority(), Some(&2));
    }

    #[test]
    fn test_majority_tie_goes_to_first_seen() {
        let counts = ClassCounts::from_labels(&["nc", "c", "c", "nc"]);
        assert_eq!(counts.majority(), Some(&"nc"));

        let counts = ClassCounts::from_labels(&["c", "nc", "nc", "c"]);
        assert_eq!(counts.majority(), Some(&"c"));
    }

    #[test]
    fn test_majority_of_nothing() {
        let counts: ClassCounts<u8> = ClassCounts::new();
        assert!(counts.is_empty());
        assert_eq!(counts.majority(), None);
    }

    #[test]
    fn test_encode() {
        let labels = vec!["x".to_string(), "y".to_string(), "x".to_string()];
        let (counts, ids) = ClassCounts::encode(&labels);
        assert_eq!(ids, vec![0, 1, 0]);
        assert_eq!(counts.class_index(&"y".to_string()), Some(1));
        assert_eq!(counts.n_classes(), 2);
    }

    #[test]
    fn test_majority_index() {
        assert_eq!(majority_index(&[1, 3, 3, 0]), Some(1));
        assert_eq!(majority_index(&[]), None);
    }
}
