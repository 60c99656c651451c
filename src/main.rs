//! cardseg CLI: orchestrates loading, feature preparation, the k sweep,
//! clustering and the output artifacts.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use polars::prelude::*;

use cardseg::{
    cluster, cluster_sizes, cluster_statistics, data, feature_matrix, load_customer_data,
    prepare_features, sweep, validate_customer_data, viz, Args,
};

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        println!("cardseg - Credit-Card Customer Segmentation");
        println!("===========================================\n");
    }

    run_pipeline(&args)
}

fn run_pipeline(args: &Args) -> Result<()> {
    let start_time = Instant::now();
    let config = args.kmeans_config();

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("cannot create output directory {}", args.output_dir.display())
    })?;

    // Step 1: load and validate
    if args.verbose {
        println!("Step 1: Loading data from {}", args.data_path.display());
    }
    let df = load_customer_data(&args.data_path)?;

    let report = validate_customer_data(&df);
    if !report.is_valid() {
        for problem in report.problems() {
            eprintln!("validation: {problem}");
        }
        bail!("input data failed validation");
    }
    println!("✓ Data loaded: {} customers", df.height());

    // Step 2: feature preparation
    if args.verbose {
        println!("\nStep 2: Encoding and scaling features");
    }
    let prepared = prepare_features(&df)?;
    let matrix = feature_matrix(&prepared, &["customer_id"])?;
    if args.verbose {
        println!("  Feature matrix: {:?}", matrix.shape());
    }

    // Step 3: inertia sweep for the elbow curve
    if args.verbose {
        println!("\nStep 3: Sweeping k = 1..={}", args.max_k);
    }
    let inertias = sweep(&matrix, args.max_k, &config)?;
    viz::plot_elbow_curve(&inertias, &args.output_dir.join("elbow_curve.png"))?;

    // Step 4: final clustering
    if args.verbose {
        println!("\nStep 4: Clustering with k = {}", args.n_clusters);
    }
    let (labels, summary) = cluster(&matrix, args.n_clusters, &config)?;
    println!("✓ Model fitted, inertia: {:.2}", summary.inertia);

    let sizes = cluster_sizes(&labels, summary.n_clusters);
    for (i, &size) in sizes.iter().enumerate() {
        let percentage = (size as f64 / df.height() as f64) * 100.0;
        println!("Cluster {}: {} customers ({:.1}%)", i + 1, size, percentage);
    }

    // Step 5: join 1-based labels onto the original table
    let mut clustered = df.clone();
    let ids: Vec<u32> = labels.iter().map(|&l| l as u32 + 1).collect();
    clustered.with_column(Series::new("CLUSTER", ids))?;

    // Step 6: plots over the raw columns
    if args.verbose {
        println!("\nStep 5: Generating visualizations");
    }
    let numeric_cols: Vec<String> = data::numeric_columns(&df)
        .into_iter()
        .filter(|c| c != "customer_id")
        .collect();
    let cat_cols = data::categorical_columns(&df);

    viz::plot_cluster_distributions(
        &clustered,
        &numeric_cols,
        &args.output_dir.join("cluster_distributions.png"),
    )?;
    viz::plot_cluster_relationships(
        &clustered,
        &args.output_dir.join("cluster_relationships.png"),
    )?;
    viz::plot_categorical_distributions(
        &clustered,
        &cat_cols,
        &args.output_dir.join("categorical_distributions.png"),
    )?;

    // Step 7: CSV dumps
    let mut stats = cluster_statistics(&df, &labels)?;
    write_csv(&mut stats, &args.output_dir.join("cluster_statistics.csv"))?;
    write_csv(&mut clustered, &args.output_dir.join("clustered_data.csv"))?;

    println!(
        "\n✓ Analysis complete in {:.2}s, results saved to {}",
        start_time.elapsed().as_secs_f64(),
        args.output_dir.display()
    );
    Ok(())
}

fn write_csv(df: &mut DataFrame, path: &std::path::Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("cannot write {}", path.display()))?;
    println!("Saved: {}", path.display());
    Ok(())
}
