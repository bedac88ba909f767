//! Grid-style hyperparameter sweep worker for a random-forest classifier.
//!
//! Reads one training table, enumerates JSON parameter files, evaluates
//! each parameter set with k-fold cross-validation, and appends one
//! result line per set to a shared output file.

pub mod sweep;
