//! Utility modules shared by the pipeline stages
//!
//! - Quantity: numbers that are either finite or explicitly invalid
//! - Number parsing: locale-formatted numeric cells
//! - Frame helpers: CSV loading, column validation and table export

pub mod quantity;
pub mod number_parsing;
pub mod frame_helpers;

// Re-export commonly used types
pub use quantity::Quantity;
pub use number_parsing::{parse_locale_column, parse_locale_number};
pub use frame_helpers::{materialize_with_columns, read_csv_str, read_csv_table, require_columns};
