//! cardseg: unsupervised segmentation of credit-card customers.
//!
//! The pipeline loads a tabular customer file, encodes categorical columns,
//! standardizes numeric columns, sweeps cluster counts for an elbow curve,
//! fits K-Means at a chosen k and computes per-cluster statistics. Each
//! transform takes a table by reference and returns a new one; nothing is
//! mutated in place.

pub mod cli;
pub mod data;
pub mod error;
pub mod features;
pub mod model;
pub mod stats;
pub mod viz;

pub use cli::Args;
pub use data::{load_customer_data, validate_customer_data, ValidationReport};
pub use error::{Error, Result};
pub use features::{
    encode_education, encode_gender, encode_marital_status, feature_matrix, prepare_features,
    scale, OneHotMapping, ScalerParams,
};
pub use model::{cluster, cluster_sizes, sweep, KMeansConfig, KMeansSummary};
pub use stats::cluster_statistics;
