// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures the engine surfaces to its caller.
///
/// Individual cells or rows that fail to parse are never errors: the cell is
/// kept raw or the row is skipped, per the extraction rules. Header-metrics
/// computation swallows even these variants and degrades to absent values.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The backing workbook file does not exist.
    #[error("workbook not found: {}; check the configured source path", path.display())]
    MissingSource { path: PathBuf },

    /// A caller-supplied date string could not be parsed. Distinct from
    /// `MissingSource` so the boundary can answer 400 instead of 500.
    #[error("malformed date string: {0:?}")]
    MalformedDate(String),

    /// The workbook exists but could not be opened or read.
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
