//! Plot generation with Plotters: elbow curve and cluster summaries.
//!
//! These are output collaborators around the core pipeline; they consume a
//! table that already carries the 1-based `CLUSTER` column.

use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;
use polars::prelude::*;

/// Color palette cycled across clusters and categories.
const CLUSTER_COLORS: [RGBColor; 10] = [
    RED,
    BLUE,
    GREEN,
    MAGENTA,
    CYAN,
    RGBColor(255, 165, 0),
    RGBColor(128, 0, 128),
    RGBColor(165, 42, 42),
    RGBColor(0, 128, 128),
    RGBColor(70, 70, 70),
];

fn color_for(index: usize) -> RGBColor {
    CLUSTER_COLORS[index % CLUSTER_COLORS.len()]
}

fn cluster_ids(df: &DataFrame) -> Result<Vec<u32>> {
    let ids = df
        .column("CLUSTER")
        .context("table has no CLUSTER column")?
        .cast(&DataType::UInt32)?
        .u32()?
        .into_no_null_iter()
        .collect();
    Ok(ids)
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let values = df
        .column(name)
        .with_context(|| format!("table has no {name} column"))?
        .cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Plot the inertia curve over k = 1..=inertias.len() for elbow inspection.
pub fn plot_elbow_curve(inertias: &[f64], output_path: &Path) -> Result<()> {
    anyhow::ensure!(!inertias.is_empty(), "no inertia values to plot");

    let max_inertia = inertias
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max)
        .max(1e-9);
    let max_k = inertias.len() as f64;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Inertia vs Number of Clusters", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.5f64..max_k + 0.5, 0f64..max_inertia * 1.05)?;

    chart
        .configure_mesh()
        .x_desc("Number of Clusters (k)")
        .y_desc("Inertia")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(LineSeries::new(
        inertias
            .iter()
            .enumerate()
            .map(|(i, &v)| ((i + 1) as f64, v)),
        &BLUE,
    ))?;
    chart.draw_series(
        inertias
            .iter()
            .enumerate()
            .map(|(i, &v)| Circle::new(((i + 1) as f64, v), 4, BLUE.filled())),
    )?;

    root.present()?;
    println!("Elbow curve saved to: {}", output_path.display());
    Ok(())
}

/// Bar charts of per-cluster means, one panel per numeric column.
pub fn plot_cluster_distributions(
    df: &DataFrame,
    numeric_cols: &[String],
    output_path: &Path,
) -> Result<()> {
    anyhow::ensure!(!numeric_cols.is_empty(), "no numeric columns to plot");

    let ids = cluster_ids(df)?;
    let mut clusters: Vec<u32> = ids.clone();
    clusters.sort_unstable();
    clusters.dedup();

    let rows = (numeric_cols.len() + 1) / 2;
    let root =
        BitMapBackend::new(output_path, (1200, (400 * rows) as u32)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((rows, 2));

    for (area, name) in areas.iter().zip(numeric_cols) {
        let values = f64_column(df, name)?;

        // Per-cluster mean of the raw (unscaled) column.
        let means: Vec<(u32, f64)> = clusters
            .iter()
            .map(|&c| {
                let group: Vec<f64> = ids
                    .iter()
                    .zip(&values)
                    .filter(|(&id, _)| id == c)
                    .filter_map(|(_, v)| *v)
                    .collect();
                let mean = if group.is_empty() {
                    0.0
                } else {
                    group.iter().sum::<f64>() / group.len() as f64
                };
                (c, mean)
            })
            .collect();

        let y_max = means.iter().map(|(_, m)| *m).fold(f64::NEG_INFINITY, f64::max);
        let y_min = means.iter().map(|(_, m)| *m).fold(f64::INFINITY, f64::min);
        let y_top = if y_max > 0.0 { y_max * 1.1 } else { 0.0 };
        let y_bottom = if y_min < 0.0 { y_min * 1.1 } else { 0.0 };
        let max_cluster = *clusters.last().unwrap_or(&1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption(format!("Average {name} per Cluster"), ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..max_cluster + 1.0, y_bottom..y_top.max(1e-9))?;

        chart
            .configure_mesh()
            .x_desc("Cluster")
            .axis_desc_style(("sans-serif", 12))
            .draw()?;

        for (i, (c, mean)) in means.iter().enumerate() {
            let x = *c as f64;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.35, 0.0), (x + 0.35, *mean)],
                color_for(i).mix(0.6).filled(),
            )))?;
        }
    }

    root.present()?;
    println!("Cluster distributions saved to: {}", output_path.display());
    Ok(())
}

/// Scatter panels of feature pairs, points colored by cluster.
pub fn plot_cluster_relationships(df: &DataFrame, output_path: &Path) -> Result<()> {
    const PAIRS: [(&str, &str); 4] = [
        ("age", "months_on_book"),
        ("age", "credit_limit"),
        ("credit_limit", "avg_utilization_ratio"),
        ("total_trans_amount", "credit_limit"),
    ];

    let ids = cluster_ids(df)?;

    let root = BitMapBackend::new(output_path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((2, 2));

    for (area, (x_name, y_name)) in areas.iter().zip(PAIRS) {
        let xs = f64_column(df, x_name)?;
        let ys = f64_column(df, y_name)?;

        let points: Vec<(f64, f64, u32)> = xs
            .iter()
            .zip(&ys)
            .zip(&ids)
            .filter_map(|((x, y), &id)| Some(((*x)?, (*y)?, id)))
            .collect();
        anyhow::ensure!(!points.is_empty(), "no points for {x_name} vs {y_name}");

        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for (x, y, _) in &points {
            x_min = x_min.min(*x);
            x_max = x_max.max(*x);
            y_min = y_min.min(*y);
            y_max = y_max.max(*y);
        }
        let x_pad = ((x_max - x_min) * 0.05).max(1e-9);
        let y_pad = ((y_max - y_min) * 0.05).max(1e-9);

        let mut chart = ChartBuilder::on(area)
            .caption(format!("{x_name} vs {y_name}"), ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min - x_pad..x_max + x_pad, y_min - y_pad..y_max + y_pad)?;

        chart
            .configure_mesh()
            .x_desc(x_name)
            .y_desc(y_name)
            .axis_desc_style(("sans-serif", 12))
            .draw()?;

        chart.draw_series(points.iter().map(|(x, y, id)| {
            Circle::new((*x, *y), 3, color_for((*id as usize).saturating_sub(1)).mix(0.5).filled())
        }))?;
    }

    root.present()?;
    println!("Cluster relationships saved to: {}", output_path.display());
    Ok(())
}

/// Stacked bars of per-cluster category shares, one panel per column.
pub fn plot_categorical_distributions(
    df: &DataFrame,
    cat_cols: &[String],
    output_path: &Path,
) -> Result<()> {
    anyhow::ensure!(!cat_cols.is_empty(), "no categorical columns to plot");

    let ids = cluster_ids(df)?;
    let mut clusters: Vec<u32> = ids.clone();
    clusters.sort_unstable();
    clusters.dedup();

    let root =
        BitMapBackend::new(output_path, ((600 * cat_cols.len()) as u32, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((1, cat_cols.len()));

    for (area, name) in areas.iter().zip(cat_cols) {
        let values: Vec<Option<String>> = df
            .column(name)
            .with_context(|| format!("table has no {name} column"))?
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();

        let mut categories: Vec<String> = values.iter().flatten().cloned().collect();
        categories.sort();
        categories.dedup();

        let max_cluster = *clusters.last().unwrap_or(&1) as f64;
        let mut chart = ChartBuilder::on(area)
            .caption(format!("{name} share per Cluster"), ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..max_cluster + 1.0, 0f64..1.4f64)?;

        chart
            .configure_mesh()
            .x_desc("Cluster")
            .y_desc("Share")
            .axis_desc_style(("sans-serif", 12))
            .draw()?;

        // Legend entries, one zero-area rectangle per category.
        for (ci, category) in categories.iter().enumerate() {
            let color = color_for(ci);
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(0.0, 0.0), (0.0, 0.0)],
                    color.filled(),
                )))?
                .label(category.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y), (x + 10, y + 10)], color.filled())
                });
        }

        for &c in &clusters {
            let group: Vec<&str> = ids
                .iter()
                .zip(&values)
                .filter(|(&id, _)| id == c)
                .filter_map(|(_, v)| v.as_deref())
                .collect();
            if group.is_empty() {
                continue;
            }

            let x = c as f64;
            let mut bottom = 0.0;
            for (ci, category) in categories.iter().enumerate() {
                let share = group.iter().filter(|v| **v == category.as_str()).count() as f64
                    / group.len() as f64;
                if share == 0.0 {
                    continue;
                }
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x - 0.4, bottom), (x + 0.4, bottom + share)],
                    color_for(ci).mix(0.6).filled(),
                )))?;
                bottom += share;
            }
        }

        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    println!(
        "Categorical distributions saved to: {}",
        output_path.display()
    );
    Ok(())
}
