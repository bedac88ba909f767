use rand_chacha::ChaCha8Rng;

use crate::RfError;
use crate::split::{SplitCriterion, find_best_split};

/// Stopping and sampling parameters for growing one tree.
///
/// Built by the forest trainer from a validated [`RandomForestConfig`]
/// (`crate::RandomForestConfig`), so no further validation happens here.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: usize,
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<TreeNode>` with children referenced by arena
/// index rather than pointers.
#[derive(Debug, Clone)]
pub(crate) enum TreeNode {
    /// An interior split node.
    Branch {
        /// Feature column used for the split.
        feature: usize,
        /// Threshold value: samples with feature <= threshold go left.
        threshold: f64,
        /// Arena index of the left child.
        left: usize,
        /// Arena index of the right child.
        right: usize,
    },
    /// A terminal leaf carrying the majority-class prediction.
    Leaf {
        /// Predicted class (majority class of the leaf's samples).
        class: usize,
    },
}

/// A fitted CART decision tree.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Predict the class label for a single sample.
    ///
    /// Traverses from the root (index 0): at each `Branch`, goes left when
    /// `sample[feature] <= threshold`, right otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { class } => return Ok(*class),
                TreeNode::Branch {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if sample[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Return the total number of nodes (branches and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// Grow a decision tree on pre-validated column-major data.
///
/// `columns[feature_idx][sample_idx]`, `labels[sample_idx]`. The caller
/// guarantees consistent dimensions, finite values, and a non-empty index set.
pub(crate) fn grow(
    columns: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
    params: &TreeParams,
    rng: &mut ChaCha8Rng,
) -> DecisionTree {
    let sample_indices: Vec<usize> = (0..labels.len()).collect();
    let mut arena: Vec<TreeNode> = Vec::new();
    grow_node(columns, labels, &sample_indices, n_classes, params, 0, rng, &mut arena);
    DecisionTree {
        nodes: arena,
        n_features: columns.len(),
    }
}

/// Recursively build the arena, returning the index of the node created.
#[allow(clippy::too_many_arguments)]
fn grow_node(
    columns: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    params: &TreeParams,
    depth: usize,
    rng: &mut ChaCha8Rng,
    arena: &mut Vec<TreeNode>,
) -> usize {
    let n_samples = sample_indices.len();

    let mut class_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        class_counts[labels[si]] += 1;
    }

    // First-max wins on ties so the prediction is stable.
    let majority = {
        let mut best_class = 0usize;
        let mut best_count = 0usize;
        for (class, &count) in class_counts.iter().enumerate() {
            if count > best_count {
                best_class = class;
                best_count = count;
            }
        }
        best_class
    };

    let mut make_leaf = |arena: &mut Vec<TreeNode>| -> usize {
        let idx = arena.len();
        arena.push(TreeNode::Leaf { class: majority });
        idx
    };

    // Stopping conditions: depth limit, too few samples, pure node.
    let depth_exceeded = params.max_depth.is_some_and(|max_d| depth >= max_d);
    let too_few = n_samples < params.min_samples_split;
    let pure = class_counts.iter().filter(|&&c| c > 0).count() <= 1;
    if depth_exceeded || too_few || pure {
        return make_leaf(arena);
    }

    let split = match find_best_split(
        columns,
        labels,
        sample_indices,
        n_classes,
        params.criterion,
        params.max_features,
        params.min_samples_leaf,
        rng,
    ) {
        Some(s) => s,
        None => return make_leaf(arena),
    };

    // Arena pattern: reserve the index with a placeholder, recurse into the
    // children, then overwrite with the branch.
    let node_idx = arena.len();
    arena.push(TreeNode::Leaf { class: majority });

    let left = grow_node(
        columns,
        labels,
        &split.left_indices,
        n_classes,
        params,
        depth + 1,
        rng,
        arena,
    );
    let right = grow_node(
        columns,
        labels,
        &split.right_indices,
        n_classes,
        params,
        depth + 1,
        rng,
        arena,
    );

    arena[node_idx] = TreeNode::Branch {
        feature: split.feature,
        threshold: split.threshold,
        left,
        right,
    };
    node_idx
}
