//! Per-cluster descriptive statistics over the original customer table.

use std::collections::BTreeMap;

use ndarray::Array1;
use polars::prelude::*;

use crate::error::{Error, Result};

/// Compute per-cluster statistics for every column of `df`.
///
/// Labels are shifted to 1-based cluster ids. Numeric columns (auto-detected
/// from dtypes) get `<col>_mean`, `<col>_std` (sample std, null when a group
/// has fewer than two non-null values) and `<col>_count` (non-null count).
/// Categorical columns get `<col>_mode`, the most frequent non-null value
/// with ties broken by first appearance in row order; a group with no
/// non-null values gets a null mode. The output has one row per cluster id
/// present in `labels`, ascending, under a leading `cluster` column.
pub fn cluster_statistics(df: &DataFrame, labels: &Array1<usize>) -> Result<DataFrame> {
    if labels.len() != df.height() {
        return Err(Error::LabelMismatch {
            labels: labels.len(),
            rows: df.height(),
        });
    }
    if df.height() == 0 {
        return Err(Error::EmptyInput);
    }

    // 1-based ids, grouped row indices in ascending id order.
    let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (row, &label) in labels.iter().enumerate() {
        groups.entry(label as u32 + 1).or_default().push(row);
    }

    let ids: Vec<u32> = groups.keys().copied().collect();
    let mut columns = vec![Series::new("cluster", ids)];

    for series in df.get_columns() {
        let name = series.name();
        if series.dtype().is_numeric() {
            let values: Vec<Option<f64>> = series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .collect();

            let mut means = Vec::with_capacity(groups.len());
            let mut stds = Vec::with_capacity(groups.len());
            let mut counts = Vec::with_capacity(groups.len());
            for rows in groups.values() {
                let (mean, std, count) = numeric_summary(&values, rows);
                means.push(mean);
                stds.push(std);
                counts.push(count);
            }

            columns.push(Series::new(&format!("{name}_mean"), means));
            columns.push(Series::new(&format!("{name}_std"), stds));
            columns.push(Series::new(&format!("{name}_count"), counts));
        } else if series.dtype() == &DataType::String {
            let values: Vec<Option<&str>> = series.str()?.into_iter().collect();

            let modes: Vec<Option<&str>> = groups
                .values()
                .map(|rows| group_mode(&values, rows))
                .collect();
            columns.push(Series::new(&format!("{name}_mode"), modes));
        }
    }

    Ok(DataFrame::new(columns)?)
}

/// Mean, sample standard deviation and non-null count for one group.
fn numeric_summary(values: &[Option<f64>], rows: &[usize]) -> (Option<f64>, Option<f64>, u32) {
    let present: Vec<f64> = rows.iter().filter_map(|&r| values[r]).collect();
    let count = present.len();
    if count == 0 {
        return (None, None, 0);
    }

    let mean = present.iter().sum::<f64>() / count as f64;
    let std = if count < 2 {
        None
    } else {
        let var = present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        Some(var.sqrt())
    };

    (Some(mean), std, count as u32)
}

/// Most frequent non-null value in a group; ties go to the value seen first.
fn group_mode<'a>(values: &[Option<&'a str>], rows: &[usize]) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for &row in rows {
        if let Some(v) = values[row] {
            match counts.iter_mut().find(|(seen, _)| *seen == v) {
                Some((_, n)) => *n += 1,
                None => counts.push((v, 1)),
            }
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, n) in counts {
        // Strict comparison keeps the first-encountered value on ties.
        if best.map_or(true, |(_, best_n)| n > best_n) {
            best = Some((value, n));
        }
    }
    best.map(|(value, _)| value)
}
