//! Command-line interface definitions and argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::model::KMeansConfig;

/// Credit-card customer segmentation using K-Means clustering
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file with customer records
    pub data_path: PathBuf,

    /// Number of clusters for the final K-Means model
    #[arg(short = 'k', long, default_value_t = 8)]
    pub n_clusters: usize,

    /// Directory for plots and CSV outputs
    #[arg(short, long, default_value = "outputs")]
    pub output_dir: PathBuf,

    /// Largest cluster count tried for the elbow curve
    #[arg(long, default_value_t = 15)]
    pub max_k: usize,

    /// RNG seed for reproducible centroid initialization
    #[arg(long, default_value_t = crate::model::DEFAULT_SEED)]
    pub seed: u64,

    /// Maximum iterations for K-Means convergence
    #[arg(long, default_value_t = 300)]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value_t = 1e-4)]
    pub tolerance: f64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Solver configuration derived from the parsed arguments.
    pub fn kmeans_config(&self) -> KMeansConfig {
        KMeansConfig {
            seed: self.seed,
            max_iters: self.max_iters,
            tolerance: self.tolerance,
        }
    }
}
