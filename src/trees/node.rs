use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use crate::data::features::{FeatureMatrix, FeatureRow, RealNumber};
use crate::data::labels::{majority_index, ClassLabel};
use crate::error::ModelError;
use crate::trees::criterion::Criterion;

/// Decision tree node
///
/// Every internal node owns exactly two children. Depth counts edges from
/// the root, which sits at depth 0.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode<XT: RealNumber, YT: ClassLabel> {
    Leaf {
        prediction: YT,
        depth: usize,
    },
    Internal {
        feature: String,
        threshold: XT,
        gain: f64,
        depth: usize,
        left: Box<TreeNode<XT, YT>>,
        right: Box<TreeNode<XT, YT>>,
    },
}

/// Read-only state shared by every node while a tree is grown.
pub(crate) struct GrowContext<'a, XT: RealNumber, YT: ClassLabel> {
    pub x: &'a FeatureMatrix<XT>,
    /// Class enumeration, in first-seen order.
    pub classes: &'a [YT],
    /// Class index of every row of `x`.
    pub class_ids: &'a [usize],
    pub criterion: Criterion,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
}

/// Gains at or below this are rounding noise from subtracting impurities.
const MIN_GAIN: f64 = 1e-12;

struct SplitCandidate<XT> {
    feature: usize,
    threshold: XT,
    gain: f64,
}

enum NodePlan<XT> {
    Leaf(usize),
    Split(SplitCandidate<XT>),
}

/// Pending work while growing a tree without recursion.
enum GrowStep<XT> {
    Visit(Vec<usize>, usize),
    Join {
        feature: usize,
        threshold: XT,
        gain: f64,
        depth: usize,
    },
}

impl<XT: RealNumber, YT: ClassLabel> TreeNode<XT, YT> {
    /// Grows the subtree for the rows in `indices`, which must not be empty.
    ///
    /// Stops with a leaf when the rows are pure, too few to split, at the
    /// depth limit, without features, or when no split has positive gain.
    ///
    /// Pending nodes live on an explicit stack, so an unbounded depth cannot
    /// exhaust the call stack. Children are visited left first; a `Join`
    /// pops both finished children off `built` once they are complete.
    pub(crate) fn grow(ctx: &GrowContext<'_, XT, YT>, indices: &[usize], depth: usize) -> Self {
        let mut steps = vec![GrowStep::Visit(indices.to_vec(), depth)];
        let mut built: Vec<Self> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                GrowStep::Visit(rows, depth) => match Self::plan(ctx, &rows, depth) {
                    NodePlan::Leaf(class) => {
                        built.push(Self::leaf(ctx.classes[class].clone(), depth));
                    }
                    NodePlan::Split(split) => {
                        let (left, right): (Vec<usize>, Vec<usize>) = rows
                            .iter()
                            .partition(|&&row| ctx.x.value(row, split.feature) <= split.threshold);
                        steps.push(GrowStep::Join {
                            feature: split.feature,
                            threshold: split.threshold,
                            gain: split.gain,
                            depth,
                        });
                        steps.push(GrowStep::Visit(right, depth + 1));
                        steps.push(GrowStep::Visit(left, depth + 1));
                    }
                },
                GrowStep::Join {
                    feature,
                    threshold,
                    gain,
                    depth,
                } => {
                    let right = built.pop().expect("right subtree is built before its parent");
                    let left = built.pop().expect("left subtree is built before its parent");
                    built.push(Self::Internal {
                        feature: ctx.x.columns()[feature].clone(),
                        threshold,
                        gain,
                        depth,
                        left: Box::new(left),
                        right: Box::new(right),
                    });
                }
            }
        }

        built.pop().expect("growing always yields a root")
    }

    /// Applies the stopping rules in order, then searches for a split.
    fn plan(ctx: &GrowContext<'_, XT, YT>, indices: &[usize], depth: usize) -> NodePlan<XT> {
        let mut counts = vec![0usize; ctx.classes.len()];
        for &row in indices {
            counts[ctx.class_ids[row]] += 1;
        }

        let first = ctx.class_ids[indices[0]];
        if indices.iter().all(|&row| ctx.class_ids[row] == first) {
            return NodePlan::Leaf(first);
        }

        let majority = NodePlan::Leaf(majority_index(&counts).unwrap_or(first));
        if indices.len() < ctx.min_samples_split {
            return majority;
        }
        if ctx.max_depth.is_some_and(|max_depth| depth >= max_depth) {
            return majority;
        }
        if ctx.x.ncols() == 0 {
            return majority;
        }

        match Self::best_split(ctx, indices, &counts) {
            Some(split) if split.gain > MIN_GAIN => NodePlan::Split(split),
            _ => majority,
        }
    }

    /// Exhaustive search over every feature and every midpoint between
    /// consecutive distinct values.
    ///
    /// Features are scanned in column order and thresholds in ascending order;
    /// a candidate replaces the current best only on strictly greater gain.
    fn best_split(
        ctx: &GrowContext<'_, XT, YT>,
        indices: &[usize],
        parent_counts: &[usize],
    ) -> Option<SplitCandidate<XT>> {
        let two = XT::one() + XT::one();
        let mut best: Option<SplitCandidate<XT>> = None;
        let mut pairs: Vec<(XT, usize)> = Vec::with_capacity(indices.len());

        for feature in 0..ctx.x.ncols() {
            pairs.clear();
            pairs.extend(
                indices
                    .iter()
                    .map(|&row| (ctx.x.value(row, feature), ctx.class_ids[row])),
            );
            pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

            // Rows left of the scan position go left, the rest go right.
            let mut left = vec![0usize; parent_counts.len()];
            let mut right = parent_counts.to_vec();

            for i in 0..pairs.len().saturating_sub(1) {
                let (value, class) = pairs[i];
                left[class] += 1;
                right[class] -= 1;

                let next = pairs[i + 1].0;
                if next <= value {
                    continue;
                }

                // The midpoint can round onto `next` for adjacent floats.
                let mut threshold = (value + next) / two;
                if !(threshold >= value && threshold < next) {
                    threshold = value;
                }

                let gain = ctx.criterion.gain(parent_counts, &left, &right);
                if best.as_ref().map_or(true, |best| gain > best.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }
        best
    }

    fn leaf(prediction: YT, depth: usize) -> Self {
        Self::Leaf { prediction, depth }
    }

    /// Routes a row from this node down to a leaf: `value <= threshold` goes
    /// left, anything greater goes right.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingFeature`] if the row has no column for a
    /// feature tested on the way.
    pub fn predict_row(&self, row: &FeatureRow<'_, XT>) -> Result<&YT, ModelError> {
        let mut node = self;
        loop {
            match node {
                Self::Leaf { prediction, .. } => return Ok(prediction),
                Self::Internal {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = row.get(feature).ok_or_else(|| ModelError::MissingFeature {
                        feature: feature.clone(),
                    })?;
                    node = if value <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { depth, .. } | Self::Internal { depth, .. } => *depth,
        }
    }

    /// Impurity gain of the split; `None` for leaves.
    pub fn gain(&self) -> Option<f64> {
        match self {
            Self::Leaf { .. } => None,
            Self::Internal { gain, .. } => Some(*gain),
        }
    }

    pub fn prediction(&self) -> Option<&YT> {
        match self {
            Self::Leaf { prediction, .. } => Some(prediction),
            Self::Internal { .. } => None,
        }
    }

    pub fn n_leaves(&self) -> usize {
        let mut n_leaves = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Self::Leaf { .. } => n_leaves += 1,
                Self::Internal { left, right, .. } => {
                    stack.push(right.as_ref());
                    stack.push(left.as_ref());
                }
            }
        }
        n_leaves
    }

    /// Depth of the deepest leaf below this node.
    pub fn max_leaf_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Self::Leaf { depth, .. } => deepest = deepest.max(*depth),
                Self::Internal { left, right, .. } => {
                    stack.push(right.as_ref());
                    stack.push(left.as_ref());
                }
            }
        }
        deepest
    }

    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Each entry carries the branch label its line starts with.
        let mut stack: Vec<(Option<(usize, &str)>, &Self)> = vec![(None, self)];
        while let Some((branch, node)) = stack.pop() {
            if let Some((indent, label)) = branch {
                write!(f, "{:indent$}{label}: ", "")?;
            }
            match node {
                Self::Leaf { prediction, .. } => writeln!(f, "{prediction}")?,
                Self::Internal {
                    feature,
                    threshold,
                    gain,
                    depth,
                    left,
                    right,
                } => {
                    writeln!(f, "{feature} <= {threshold} (gain {gain:.6})")?;
                    let indent = 2 * (depth + 1);
                    stack.push((Some((indent, "right")), right.as_ref()));
                    stack.push((Some((indent, "left")), left.as_ref()));
                }
            }
        }
        Ok(())
    }
}

impl<XT: RealNumber, YT: ClassLabel> Display for TreeNode<XT, YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}
