//! Feature encoding and scaling for the clustering pipeline.
//!
//! All transforms are pure: they take a table by reference and return a new
//! table. Out-of-vocabulary categorical values encode to null rather than a
//! sentinel, so data-quality problems stay visible downstream.

use std::collections::BTreeSet;

use ndarray::Array2;
use polars::prelude::*;

use crate::error::{Error, Result};

const CUSTOMER_ID: &str = "customer_id";
const GENDER: &str = "gender";
const EDUCATION_LEVEL: &str = "education_level";
const MARITAL_STATUS: &str = "marital_status";

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map_err(|_| Error::MissingColumn(name.to_string()))
}

/// Encode `gender` as 1 for 'M' and 0 for 'F'; anything else becomes null.
///
/// A column that is already numeric is left untouched, so applying the
/// encoding twice never alters previously encoded 0/1 values.
pub fn encode_gender(df: &DataFrame) -> Result<DataFrame> {
    let source = column(df, GENDER)?;
    if source.dtype().is_numeric() {
        return Ok(df.clone());
    }

    let encoded: Vec<Option<i32>> = source
        .str()?
        .into_iter()
        .map(|v| match v {
            Some("M") => Some(1),
            Some("F") => Some(0),
            _ => None,
        })
        .collect();

    let mut out = df.clone();
    out.with_column(Series::new(GENDER, encoded))?;
    Ok(out)
}

/// Encode `education_level` ordinally, Uneducated (0) through Doctorate (5).
///
/// Values outside the six known levels become null. Already-numeric input is
/// returned unchanged, mirroring [`encode_gender`].
pub fn encode_education(df: &DataFrame) -> Result<DataFrame> {
    let source = column(df, EDUCATION_LEVEL)?;
    if source.dtype().is_numeric() {
        return Ok(df.clone());
    }

    let encoded: Vec<Option<i32>> = source
        .str()?
        .into_iter()
        .map(|v| match v {
            Some("Uneducated") => Some(0),
            Some("High School") => Some(1),
            Some("College") => Some(2),
            Some("Graduate") => Some(3),
            Some("Post-Graduate") => Some(4),
            Some("Doctorate") => Some(5),
            _ => None,
        })
        .collect();

    let mut out = df.clone();
    out.with_column(Series::new(EDUCATION_LEVEL, encoded))?;
    Ok(out)
}

/// One-hot schema for a categorical column, computed once and inspectable.
///
/// The category set equals the distinct non-null values observed in the
/// source column for this run, sorted lexicographically, so the generated
/// column set is deterministic for a given input table.
#[derive(Debug, Clone)]
pub struct OneHotMapping {
    /// Column the indicators are derived from.
    pub source: String,
    /// Distinct observed values, sorted.
    pub categories: Vec<String>,
}

impl OneHotMapping {
    /// Enumerate the distinct non-null values of `source` in `df`.
    pub fn infer(df: &DataFrame, source: &str) -> Result<Self> {
        let values = column(df, source)?;
        let categories: BTreeSet<String> = values
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();

        Ok(Self {
            source: source.to_string(),
            categories: categories.into_iter().collect(),
        })
    }

    /// Names of the indicator columns this mapping generates.
    pub fn indicator_columns(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.source, c))
            .collect()
    }

    /// Replace the source column with one 1/0 indicator column per category.
    ///
    /// Rows whose source value is null (or unseen at `infer` time) get 0 in
    /// every indicator.
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let source = column(df, &self.source)?.str()?.clone();
        let mut out = df.drop(&self.source)?;

        for (category, name) in self.categories.iter().zip(self.indicator_columns()) {
            let indicator: Vec<i32> = source
                .into_iter()
                .map(|v| i32::from(v == Some(category.as_str())))
                .collect();
            out.with_column(Series::new(&name, indicator))?;
        }

        Ok(out)
    }
}

/// One-hot encode `marital_status` from the values observed in the table.
pub fn encode_marital_status(df: &DataFrame) -> Result<DataFrame> {
    OneHotMapping::infer(df, MARITAL_STATUS)?.apply(df)
}

/// Fitted standardization parameters, one (mean, std) pair per column.
///
/// Columns fitted with zero variance keep std 0 and are passed through
/// unscaled, both at fit time and on replay.
#[derive(Debug, Clone)]
pub struct ScalerParams {
    /// Columns the scaler was fitted on, in table order.
    pub columns: Vec<String>,
    /// Per-column mean.
    pub means: Vec<f64>,
    /// Per-column population standard deviation (denominator N).
    pub stds: Vec<f64>,
}

impl ScalerParams {
    /// Replay the fitted transform on another table holding the same columns.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();
        for ((name, &mean), &std) in self.columns.iter().zip(&self.means).zip(&self.stds) {
            let values = column(df, name)?.cast(&DataType::Float64)?;
            let scaled: Vec<Option<f64>> = values
                .f64()?
                .into_iter()
                .map(|v| v.map(|x| if std == 0.0 { x } else { (x - mean) / std }))
                .collect();
            out.with_column(Series::new(name, scaled))?;
        }
        Ok(out)
    }
}

/// Standardize every numeric column not named in `exclude` to zero mean and
/// unit variance, using the population standard deviation.
///
/// Nulls are skipped when fitting and stay null in the output. A column with
/// zero variance is left unscaled (its std is recorded as 0 so replay via
/// [`ScalerParams::transform`] behaves identically). If no columns qualify,
/// the table is returned unchanged with no parameters.
pub fn scale(df: &DataFrame, exclude: &[&str]) -> Result<(DataFrame, Option<ScalerParams>)> {
    let targets: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|s| s.dtype().is_numeric() && !exclude.contains(&s.name()))
        .map(|s| s.name().to_string())
        .collect();

    if targets.is_empty() {
        return Ok((df.clone(), None));
    }

    let mut out = df.clone();
    let mut means = Vec::with_capacity(targets.len());
    let mut stds = Vec::with_capacity(targets.len());

    for name in &targets {
        let values = column(df, name)?.cast(&DataType::Float64)?;
        let values = values.f64()?;

        let present: Vec<f64> = values.into_iter().flatten().collect();
        let n = present.len() as f64;
        let mean = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / n
        };
        let std = if present.is_empty() {
            0.0
        } else {
            (present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt()
        };

        let scaled: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.map(|x| if std == 0.0 { x } else { (x - mean) / std }))
            .collect();
        out.with_column(Series::new(name, scaled))?;

        means.push(mean);
        stds.push(std);
    }

    let params = ScalerParams {
        columns: targets,
        means,
        stds,
    };
    Ok((out, Some(params)))
}

/// Full feature preparation: encode gender, education and marital status in
/// that order, then scale the remaining numeric columns.
///
/// The exclusion set for scaling is `customer_id` plus every encoded
/// categorical column, including the `marital_status_*` indicators generated
/// for this table; encoding has to run first so that set is complete.
pub fn prepare_features(df: &DataFrame) -> Result<DataFrame> {
    let df = encode_gender(df)?;
    let df = encode_education(&df)?;

    let mapping = OneHotMapping::infer(&df, MARITAL_STATUS)?;
    let df = mapping.apply(&df)?;

    let mut exclude: Vec<String> = vec![
        CUSTOMER_ID.to_string(),
        GENDER.to_string(),
        EDUCATION_LEVEL.to_string(),
    ];
    exclude.extend(mapping.indicator_columns());
    let exclude: Vec<&str> = exclude.iter().map(String::as_str).collect();

    let (scaled, _) = scale(&df, &exclude)?;
    Ok(scaled)
}

/// Project the table's numeric columns (minus `exclude`) into a dense
/// row-major matrix, aligned by row index with the table.
///
/// Column order follows table order. Any null in a projected column is an
/// [`Error::MissingValues`]; an empty projection is [`Error::EmptyInput`].
pub fn feature_matrix(df: &DataFrame, exclude: &[&str]) -> Result<Array2<f64>> {
    let names: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|s| s.dtype().is_numeric() && !exclude.contains(&s.name()))
        .map(|s| s.name().to_string())
        .collect();

    let n_rows = df.height();
    if n_rows == 0 || names.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut matrix = Array2::zeros((n_rows, names.len()));
    for (j, name) in names.iter().enumerate() {
        let values = column(df, name)?.cast(&DataType::Float64)?;
        for (i, v) in values.f64()?.into_iter().enumerate() {
            matrix[[i, j]] = v.ok_or_else(|| Error::MissingValues {
                column: name.clone(),
            })?;
        }
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> DataFrame {
        df!(
            "customer_id" => &[1i64, 2, 3],
            "gender" => &["M", "F", "M"],
            "education_level" => &["Graduate", "College", "High School"],
            "marital_status" => &["Single", "Married", "Single"],
            "age" => &[30i64, 45, 25],
            "income" => &[50000.0, 60000.0, 45000.0],
        )
        .unwrap()
    }

    fn i32_values(df: &DataFrame, name: &str) -> Vec<Option<i32>> {
        df.column(name).unwrap().i32().unwrap().into_iter().collect()
    }

    fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .unwrap()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_encode_gender() {
        let result = encode_gender(&sample_table()).unwrap();
        assert_eq!(
            i32_values(&result, "gender"),
            vec![Some(1), Some(0), Some(1)]
        );
    }

    #[test]
    fn test_encode_gender_out_of_vocabulary() {
        let df = df!("gender" => &["M", "X", "F"]).unwrap();
        let result = encode_gender(&df).unwrap();
        assert_eq!(i32_values(&result, "gender"), vec![Some(1), None, Some(0)]);
    }

    #[test]
    fn test_encode_gender_idempotent() {
        let once = encode_gender(&sample_table()).unwrap();
        let twice = encode_gender(&once).unwrap();
        assert_eq!(
            i32_values(&once, "gender"),
            i32_values(&twice, "gender")
        );
    }

    #[test]
    fn test_encode_education() {
        let result = encode_education(&sample_table()).unwrap();
        assert_eq!(
            i32_values(&result, "education_level"),
            vec![Some(3), Some(2), Some(1)]
        );
    }

    #[test]
    fn test_encode_education_unknown_level() {
        let df = df!("education_level" => &["Doctorate", "PhD", "Uneducated"]).unwrap();
        let result = encode_education(&df).unwrap();
        assert_eq!(
            i32_values(&result, "education_level"),
            vec![Some(5), None, Some(0)]
        );
    }

    #[test]
    fn test_one_hot_mapping_schema() {
        let df = sample_table();
        let mapping = OneHotMapping::infer(&df, "marital_status").unwrap();
        assert_eq!(mapping.categories, vec!["Married", "Single"]);
        assert_eq!(
            mapping.indicator_columns(),
            vec!["marital_status_Married", "marital_status_Single"]
        );
    }

    #[test]
    fn test_encode_marital_status() {
        let result = encode_marital_status(&sample_table()).unwrap();
        assert!(result.column("marital_status").is_err());
        assert_eq!(
            i32_values(&result, "marital_status_Single"),
            vec![Some(1), Some(0), Some(1)]
        );
        assert_eq!(
            i32_values(&result, "marital_status_Married"),
            vec![Some(0), Some(1), Some(0)]
        );
    }

    #[test]
    fn test_one_hot_rows_sum_to_one() {
        let result = encode_marital_status(&sample_table()).unwrap();
        let single = i32_values(&result, "marital_status_Single");
        let married = i32_values(&result, "marital_status_Married");
        for (s, m) in single.iter().zip(&married) {
            assert_eq!(s.unwrap() + m.unwrap(), 1);
        }
    }

    #[test]
    fn test_scale_mean_zero_std_one() {
        let df = sample_table();
        let (scaled, params) = scale(&df, &["customer_id"]).unwrap();
        let params = params.unwrap();
        assert!(params.columns.contains(&"age".to_string()));

        for name in ["age", "income"] {
            let values = f64_values(&scaled, name);
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std = (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
            assert!(mean.abs() < 1e-10, "{name} mean {mean}");
            assert!((std - 1.0).abs() < 1e-10, "{name} std {std}");
        }
    }

    #[test]
    fn test_scale_zero_variance_left_unscaled() {
        let df = df!("flat" => &[7.0, 7.0, 7.0]).unwrap();
        let (scaled, params) = scale(&df, &[]).unwrap();
        assert_eq!(f64_values(&scaled, "flat"), vec![7.0, 7.0, 7.0]);
        assert_eq!(params.unwrap().stds, vec![0.0]);
    }

    #[test]
    fn test_scale_nothing_qualifies() {
        let df = df!("customer_id" => &[1i64, 2, 3]).unwrap();
        let (scaled, params) = scale(&df, &["customer_id"]).unwrap();
        assert!(params.is_none());
        assert!(scaled.equals(&df));
    }

    #[test]
    fn test_scaler_params_replay() {
        let df = df!("x" => &[1.0, 2.0, 3.0]).unwrap();
        let (fitted, params) = scale(&df, &[]).unwrap();
        let replayed = params.unwrap().transform(&df).unwrap();
        assert_eq!(f64_values(&fitted, "x"), f64_values(&replayed, "x"));
    }

    #[test]
    fn test_prepare_features() {
        let prepared = prepare_features(&sample_table()).unwrap();

        assert_eq!(
            i32_values(&prepared, "gender"),
            vec![Some(1), Some(0), Some(1)]
        );
        assert_eq!(
            i32_values(&prepared, "education_level"),
            vec![Some(3), Some(2), Some(1)]
        );
        assert!(prepared.column("marital_status").is_err());
        assert!(prepared.column("marital_status_Single").is_ok());
        assert!(prepared.column("marital_status_Married").is_ok());

        // customer_id stays raw; age and income are standardized
        assert_eq!(f64_values(&prepared, "customer_id"), vec![1.0, 2.0, 3.0]);
        for name in ["age", "income"] {
            let values = f64_values(&prepared, name);
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std = (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
            assert!(mean.abs() < 1e-10);
            assert!((std - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_feature_matrix_layout() {
        let df = df!(
            "customer_id" => &[1i64, 2],
            "a" => &[1.0, 2.0],
            "b" => &[3.0, 4.0],
        )
        .unwrap();
        let matrix = feature_matrix(&df, &["customer_id"]).unwrap();
        assert_eq!(matrix.shape(), &[2, 2]);
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_eq!(matrix[[1, 1]], 4.0);
    }

    #[test]
    fn test_feature_matrix_rejects_nulls() {
        let df = df!("a" => &[Some(1.0), None]).unwrap();
        let result = feature_matrix(&df, &[]);
        assert!(matches!(result, Err(Error::MissingValues { .. })));
    }

    #[test]
    fn test_feature_matrix_empty() {
        let df = df!("label" => &["a", "b"]).unwrap();
        assert!(matches!(
            feature_matrix(&df, &[]),
            Err(Error::EmptyInput)
        ));
    }
}
