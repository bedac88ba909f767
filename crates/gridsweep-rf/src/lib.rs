//! Random Forest classification for hyperparameter sweeps.
//!
//! Provides a hand-rolled Random Forest classifier with CART decision trees,
//! Gini/Entropy split criteria, parallel training via rayon, and stratified
//! k-fold cross-validation with accuracy scoring.

mod config;
mod cv;
mod error;
mod forest;
mod split;
mod tree;

pub use config::{MaxFeatures, RandomForestConfig};
pub use cv::{CrossValidation, CrossValidationResult};
pub use error::RfError;
pub use forest::RandomForest;
pub use split::SplitCriterion;
pub use tree::DecisionTree;
