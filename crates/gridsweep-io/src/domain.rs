//! Domain types for gridsweep-io.

/// A loaded training table for classification.
///
/// Produced by [`TrainingTableReader`](crate::TrainingTableReader). Feature
/// rows and encoded labels are stored in parallel vectors —
/// `features[i]` corresponds to `labels[i]`. Labels are contiguous
/// zero-based class indices; `class_names[labels[i]]` is the original
/// label string from the CSV.
#[derive(Debug)]
pub struct TrainingTable {
    feature_names: Vec<String>,
    class_names: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl TrainingTable {
    /// Create a new training table.
    pub(crate) fn new(
        feature_names: Vec<String>,
        class_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<usize>,
    ) -> Self {
        Self {
            feature_names,
            class_names,
            features,
            labels,
        }
    }

    /// Return the feature column names from the CSV header.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the distinct label strings, in class-index order.
    #[must_use]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the encoded class labels, one per row.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Return the number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }
}
