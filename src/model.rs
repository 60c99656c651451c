//! K-Means fitting: the per-k inertia sweep and the final clustering run.

use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::error::{Error, Result};

/// Seed used when callers do not pick one, matching the reference analysis.
pub const DEFAULT_SEED: u64 = 42;

/// K-Means solver configuration with an explicit seed.
///
/// The seed is threaded through every fit rather than relying on a
/// process-wide RNG, so repeated runs and tests are deterministic.
#[derive(Debug, Clone, Copy)]
pub struct KMeansConfig {
    /// RNG seed for centroid initialization.
    pub seed: u64,
    /// Maximum Lloyd iterations per fit.
    pub max_iters: u64,
    /// Convergence tolerance on centroid movement.
    pub tolerance: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            max_iters: 300,
            tolerance: 1e-4,
        }
    }
}

/// Summary of one fitted K-Means model.
#[derive(Debug, Clone)]
pub struct KMeansSummary {
    /// Number of clusters fitted.
    pub n_clusters: usize,
    /// Centroid coordinates, shape (n_clusters, n_features).
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares for the training data.
    pub inertia: f64,
}

/// Fit K-Means for every k in 1..=max_k and return the inertia per k.
///
/// Index i of the result corresponds to k = i + 1. Each k gets a fresh RNG
/// seeded from `config.seed`, so the sweep is reproducible and the per-k
/// fits are independent. The selector does not pick k; it only supplies the
/// curve for an elbow inspection.
pub fn sweep(matrix: &Array2<f64>, max_k: usize, config: &KMeansConfig) -> Result<Vec<f64>> {
    if matrix.nrows() == 0 {
        return Err(Error::EmptyInput);
    }
    if max_k < 1 || max_k > matrix.nrows() {
        return Err(Error::InvalidClusterCount {
            requested: max_k,
            n_rows: matrix.nrows(),
        });
    }

    let mut inertias = Vec::with_capacity(max_k);
    for k in 1..=max_k {
        let (_, summary) = fit_once(matrix, k, config)?;
        inertias.push(summary.inertia);
    }
    Ok(inertias)
}

/// Fit one K-Means model at `k` and assign every row to a cluster.
///
/// Returns 0-based labels aligned with the matrix rows and a summary with
/// the centroids and final inertia.
pub fn cluster(
    matrix: &Array2<f64>,
    k: usize,
    config: &KMeansConfig,
) -> Result<(Array1<usize>, KMeansSummary)> {
    if matrix.nrows() == 0 {
        return Err(Error::EmptyInput);
    }
    if k < 1 || k > matrix.nrows() {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_rows: matrix.nrows(),
        });
    }

    fit_once(matrix, k, config)
}

/// Number of rows assigned to each cluster, indexed by 0-based label.
pub fn cluster_sizes(labels: &Array1<usize>, n_clusters: usize) -> Vec<usize> {
    let mut sizes = vec![0; n_clusters];
    for &label in labels.iter() {
        if label < n_clusters {
            sizes[label] += 1;
        }
    }
    sizes
}

fn fit_once(
    matrix: &Array2<f64>,
    k: usize,
    config: &KMeansConfig,
) -> Result<(Array1<usize>, KMeansSummary)> {
    let rng = Xoshiro256Plus::seed_from_u64(config.seed);

    let n_samples = matrix.nrows();
    let targets: Array1<usize> = Array1::zeros(n_samples);
    let dataset = Dataset::new(matrix.clone(), targets);

    let model = KMeans::params_with(k, rng, L2Dist)
        .max_n_iterations(config.max_iters)
        .tolerance(config.tolerance)
        .fit(&dataset)
        .map_err(|e| Error::Fit(e.to_string()))?;

    let labels = model.predict(&dataset);
    let centroids = model.centroids().clone();
    let inertia = compute_inertia(matrix, &labels, &centroids);

    Ok((
        labels,
        KMeansSummary {
            n_clusters: k,
            centroids,
            inertia,
        },
    ))
}

/// Within-cluster sum of squared distances to the assigned centroids.
fn compute_inertia(matrix: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    let mut inertia = 0.0;

    for (i, &label) in labels.iter().enumerate() {
        if label < centroids.nrows() {
            let point = matrix.row(i);
            let centroid = centroids.row(label);
            inertia += point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>();
        }
    }

    inertia
}
