//! Error taxonomy for the segmentation pipeline.

use thiserror::Error;

/// Errors returned by the segmentation core.
#[derive(Debug, Error)]
pub enum Error {
    /// Input file is missing or unreadable.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Input is not well-formed tabular data.
    #[error("malformed tabular data: {0}")]
    Parse(#[from] polars::error::PolarsError),

    /// A transform was asked for a column the table does not have.
    #[error("column {0:?} not found")]
    MissingColumn(String),

    /// A column has a dtype the operation cannot work with.
    #[error("column {column:?} has unexpected type {dtype}")]
    ColumnType {
        /// Column name.
        column: String,
        /// Observed dtype, rendered for diagnostics.
        dtype: String,
    },

    /// Matrix or table has no rows (or no usable columns).
    #[error("empty input")]
    EmptyInput,

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_rows} rows")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of rows available.
        n_rows: usize,
    },

    /// A feature column still contains nulls when building the matrix.
    #[error("column {column:?} contains missing values; cannot build feature matrix")]
    MissingValues {
        /// Offending column.
        column: String,
    },

    /// Label vector does not line up with the table.
    #[error("label count {labels} does not match row count {rows}")]
    LabelMismatch {
        /// Number of labels supplied.
        labels: usize,
        /// Number of table rows.
        rows: usize,
    },

    /// The k-means solver itself failed.
    #[error("k-means fit failed: {0}")]
    Fit(String),
}

/// Result type used by the segmentation core.
pub type Result<T> = std::result::Result<T, Error>;
