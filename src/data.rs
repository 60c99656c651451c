//! Customer data loading and validation using Polars.

use std::path::Path;

use polars::prelude::*;

use crate::error::{Error, Result};

/// Columns that must be present with a numeric dtype.
pub const REQUIRED_NUMERIC: &[&str] = &[
    "customer_id",
    "age",
    "months_on_book",
    "credit_limit",
    "total_trans_amount",
    "avg_utilization_ratio",
];

/// Columns that must be present with a string dtype.
pub const REQUIRED_CATEGORICAL: &[&str] = &["gender", "education_level", "marital_status"];

/// Load customer records from a delimited file with a header row.
///
/// Column types are inferred by Polars. A missing or unreadable path is an
/// [`Error::Io`]; content that does not parse as tabular data is an
/// [`Error::Parse`].
pub fn load_customer_data(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;

    let df = CsvReader::new(file).has_header(true).finish()?;
    Ok(df)
}

/// Names of the table's numeric columns, in table order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|s| s.dtype().is_numeric())
        .map(|s| s.name().to_string())
        .collect()
}

/// Names of the table's categorical (string) columns, in table order.
pub fn categorical_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|s| s.dtype() == &DataType::String)
        .map(|s| s.name().to_string())
        .collect()
}

/// Outcome of validating a customer table against the required schema.
///
/// Validation failure is a reportable condition, not an error: callers get
/// the full list of problems and decide whether to proceed.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Required columns absent from the table.
    pub missing: Vec<String>,
    /// Columns present with the wrong semantic type.
    pub mistyped: Vec<String>,
}

impl ValidationReport {
    /// True when the table satisfies the required schema.
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.mistyped.is_empty()
    }

    /// Human-readable diagnostics, one line per problem.
    pub fn problems(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .missing
            .iter()
            .map(|c| format!("missing required column: {c}"))
            .collect();
        out.extend(self.mistyped.iter().cloned());
        out
    }
}

/// Check the fixed required-column set and expected semantic types.
pub fn validate_customer_data(df: &DataFrame) -> ValidationReport {
    let mut report = ValidationReport::default();

    for &name in REQUIRED_NUMERIC {
        match df.column(name) {
            Err(_) => report.missing.push(name.to_string()),
            Ok(s) if !s.dtype().is_numeric() => report.mistyped.push(format!(
                "column {name} should be numeric but is {}",
                s.dtype()
            )),
            Ok(_) => {}
        }
    }

    for &name in REQUIRED_CATEGORICAL {
        match df.column(name) {
            Err(_) => report.missing.push(name.to_string()),
            Ok(s) if s.dtype() != &DataType::String => report.mistyped.push(format!(
                "column {name} should be categorical but is {}",
                s.dtype()
            )),
            Ok(_) => {}
        }
    }

    report
}
