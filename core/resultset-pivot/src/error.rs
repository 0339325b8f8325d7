//! FILENAME: core/resultset-pivot/src/error.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two pivot axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// A pivot configuration that cannot be resolved against the query.
/// Raised before any row is read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown field '{field}' on {axis} axis")]
    UnknownField { axis: Axis, field: String },

    #[error("field '{field}' is used more than once")]
    DuplicateField { field: String },

    #[error("measures cannot be placed on both axes")]
    MeasuresOnBothAxes,
}

#[derive(Error, Debug)]
pub enum PivotError {
    #[error("invalid pivot config: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
