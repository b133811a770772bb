//! Error taxonomy for the seed threshold pipeline
//!
//! Only conditions that must abort a run are errors. Missing or undefined
//! numbers inside a table are carried as invalid `Quantity` values instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    /// A numeric cell still contains non-numeric text after normalization
    #[error("Cannot parse '{value}' in column '{column}' as a number")]
    Parse { column: String, value: String },

    /// A required column is missing from an input table
    #[error("Table '{table}' is missing required column '{column}'. Available columns: {available:?}")]
    Schema {
        table: String,
        column: String,
        available: Vec<String>,
    },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Failed to load table {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SeedError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        SeedError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SeedError>;
