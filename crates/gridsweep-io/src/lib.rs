//! File I/O for the hyperparameter sweep: training-table CSV reading,
//! parameter-file enumeration and parsing, append-only result output,
//! and parameter-grid expansion.

mod domain;
mod error;
mod grid;
mod params;
mod results;
mod table;

pub use domain::TrainingTable;
pub use error::IoError;
pub use grid::{ParamCombo, ParamGrid, ParamRange, write_combos};
pub use params::{ParamSet, list_param_files};
pub use results::ResultAppender;
pub use table::TrainingTableReader;
