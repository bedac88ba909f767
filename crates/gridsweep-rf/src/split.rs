use rand::Rng;

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// Returns 0.0 when `n_samples` is zero (pure node).
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> f64 {
        if n_samples == 0 {
            return 0.0;
        }
        let n = n_samples as f64;
        match self {
            SplitCriterion::Gini => {
                let sum_sq: f64 = class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
            SplitCriterion::Entropy => -class_counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }
}

/// The best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct BestSplit {
    /// Zero-based feature column index used for the split.
    pub(crate) feature: usize,
    /// Threshold value: samples with `value <= threshold` go left.
    pub(crate) threshold: f64,
    /// Sample indices going to the left child.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
}

/// Find the best split among a random subset of features.
///
/// For each of up to `max_features` randomly chosen feature columns, sorts
/// the `(value, label)` pairs and scans left-to-right with incremental class
/// count updates, tracking the candidate with the lowest weighted child
/// impurity. Returns `None` when no valid boundary exists (all values
/// identical, or every boundary would violate `min_samples_leaf`).
///
/// `columns` is column-major: `columns[feature_idx][sample_idx]`.
/// `sample_indices` are indices into the inner Vecs.
pub(crate) fn find_best_split(
    columns: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    criterion: SplitCriterion,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<BestSplit> {
    let n_features = columns.len();
    let n_samples = sample_indices.len();
    if n_samples < 2 || n_features == 0 {
        return None;
    }

    // Class counts over the full node, reused as the initial right side.
    let mut node_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        node_counts[labels[si]] += 1;
    }

    // Partial Fisher-Yates: shuffle only the first `take` positions.
    let take = max_features.min(n_features);
    let mut feature_order: Vec<usize> = (0..n_features).collect();
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        feature_order.swap(i, j);
    }

    let mut best_cost = f64::INFINITY;
    let mut best: Option<(usize, f64)> = None;

    for &feat_idx in &feature_order[..take] {
        let column = &columns[feat_idx];
        let mut sorted: Vec<(f64, usize)> = sample_indices
            .iter()
            .map(|&si| (column[si], si))
            .collect();
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = node_counts.clone();

        for i in 0..(n_samples - 1) {
            let (value, si) = sorted[i];
            let class = labels[si];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            // A boundary only exists between two distinct values.
            let next_value = sorted[i + 1].0;
            if value == next_value {
                continue;
            }

            let n_left = i + 1;
            let n_right = n_samples - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            // Weighted child impurity: lower is better.
            let cost = (n_left as f64) * criterion.impurity(&left_counts, n_left)
                + (n_right as f64) * criterion.impurity(&right_counts, n_right);
            if cost < best_cost {
                best_cost = cost;
                best = Some((feat_idx, (value + next_value) / 2.0));
            }
        }
    }

    let (feature, threshold) = best?;

    let column = &columns[feature];
    let mut left_indices = Vec::with_capacity(n_samples / 2);
    let mut right_indices = Vec::with_capacity(n_samples / 2);
    for &si in sample_indices {
        if column[si] <= threshold {
            left_indices.push(si);
        } else {
            right_indices.push(si);
        }
    }

    Some(BestSplit {
        feature,
        threshold,
        left_indices,
        right_indices,
    })
}
