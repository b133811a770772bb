//! DataFrame loading and projection helpers with column validation
//!
//! Provides safe, explicit patterns for reading the input CSV tables so that a
//! missing header surfaces as `SeedError::Schema` before any computation runs.

use crate::error::{Result, SeedError};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Read a CSV file with every column as a string.
///
/// Numeric columns are kept as raw text so that locale-formatted values reach
/// the number parser untouched.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|source| SeedError::Load {
            path: path.to_path_buf(),
            source,
        })
}

/// Read CSV text held in memory, with the same string-only schema as `read_csv_table`
pub fn read_csv_str(text: &str) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()?;
    Ok(df)
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    column_names(df).iter().any(|c| c == name)
}

/// Check that every required column is present
///
/// # Errors
/// `SeedError::Schema` naming the first missing column and listing what the
/// table does have.
pub fn require_columns(df: &DataFrame, required: &[&str], table: &str) -> Result<()> {
    let available = column_names(df);
    for &expected in required {
        if !available.iter().any(|c| c == expected) {
            return Err(SeedError::Schema {
                table: table.to_string(),
                column: expected.to_string(),
                available,
            });
        }
    }
    Ok(())
}

/// Validate and project a table down to exactly the given columns
///
/// # Example
/// ```rust,ignore
/// let df = materialize_with_columns(raw, &["Specie", "Supply_Type"], "stock")?;
/// assert_eq!(df.width(), 2);
/// ```
pub fn materialize_with_columns(df: DataFrame, columns: &[&str], table: &str) -> Result<DataFrame> {
    require_columns(&df, columns, table)?;

    let col_exprs: Vec<Expr> = columns.iter().map(|&name| col(name)).collect();
    let projected = df.lazy().select(&col_exprs).collect()?;
    Ok(projected)
}

/// Borrow a string column as trimmed optional cells; blank cells become `None`
pub fn str_values<'a>(df: &'a DataFrame, name: &str) -> Result<Vec<Option<&'a str>>> {
    let values = df
        .column(name)?
        .str()?
        .into_iter()
        .map(|opt| opt.map(str::trim).filter(|s| !s.is_empty()))
        .collect();
    Ok(values)
}

/// Borrow a string column without trimming, for numeric cells that go to the parser
pub fn raw_values<'a>(df: &'a DataFrame, name: &str) -> Result<Vec<Option<&'a str>>> {
    Ok(df.column(name)?.str()?.into_iter().collect())
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Zstd(None))
        .finish(df)?;
    Ok(())
}
