use crate::algorithm::{kmeans_best_of, predict_labels};
use crate::config::SegmentationConfig;
use crate::error::{Result, SegmentationError};
use ndarray::{Array2, ArrayView2};
use serde::Serialize;
use tracing::instrument;

/// Record index -> cluster id in `[0, k)`, one entry per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    k: usize,
}

impl ClusterAssignment {
    /// Build an assignment, checking every label is below `k`.
    pub fn new(labels: Vec<usize>, k: usize) -> Result<Self> {
        if let Some((index, &label)) = labels.iter().enumerate().find(|(_, &l)| l >= k) {
            return Err(SegmentationError::InvalidAssignment { index, label, k });
        }
        Ok(Self { labels, k })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of clusters, including ones with no members.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.labels.get(index).copied()
    }

    /// Member count per cluster id.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Record indices assigned to `cluster_id`, ascending.
    pub fn members(&self, cluster_id: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == cluster_id)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Output of a clustering run
#[derive(Debug, Clone, Serialize)]
pub struct KMeansFit {
    pub assignment: ClusterAssignment,
    /// Shape (k, n_features); row `c` is the centroid of cluster `c`.
    pub centroids: Array2<f64>,
    pub inertia: f64,
    pub n_iterations: usize,
    pub converged: bool,
}

/// Partition `matrix` into `k` clusters with the default iteration cap and
/// restart count.
///
/// Identical `(matrix, k, seed)` always yields identical output.
///
/// # Errors
///
/// - [`SegmentationError::InsufficientData`] if `k >= n`
/// - [`SegmentationError::InvalidK`] if `k < 2`
/// - [`SegmentationError::EmptyInput`] if the matrix has no rows
pub fn cluster(matrix: &ArrayView2<f64>, k: usize, seed: u64) -> Result<KMeansFit> {
    cluster_with(matrix, k, &SegmentationConfig::default().with_seed(seed))
}

/// [`cluster`] using the seed, iteration cap and restart count of `config`.
#[instrument(
    level = "debug",
    skip(matrix, config),
    fields(n_samples = matrix.nrows(), seed = config.seed)
)]
pub fn cluster_with(
    matrix: &ArrayView2<f64>,
    k: usize,
    config: &SegmentationConfig,
) -> Result<KMeansFit> {
    let result = kmeans_best_of(matrix, k, config.seed, config.max_iters, config.n_init)?;
    Ok(KMeansFit {
        assignment: ClusterAssignment::new(result.labels, k)?,
        centroids: result.centroids,
        inertia: result.inertia,
        n_iterations: result.n_iterations,
        converged: result.converged,
    })
}

/// A k-means model that can be trained once and used to label new rows.
///
/// # Example
///
/// ```
/// use segmentation_rs::KMeans;
/// use ndarray::array;
///
/// let data = array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
///
/// let mut kmeans = KMeans::new(2);
/// let assignment = kmeans.fit_predict(&data.view()).unwrap();
/// assert_eq!(assignment.get(0), assignment.get(1));
/// assert_ne!(assignment.get(0), assignment.get(2));
/// ```
pub struct KMeans {
    k: usize,

    config: SegmentationConfig,

    /// Number of features (dimensions), set by the first training call
    d: usize,

    /// Trained state (None if not yet fitted)
    fit: Option<KMeansFit>,
}

impl KMeans {
    /// Create a model for `k` clusters with default settings.
    pub fn new(k: usize) -> Self {
        Self::with_config(k, SegmentationConfig::default())
    }

    /// Create a model for `k` clusters using the seed, iteration cap and
    /// restart count of `config`.
    pub fn with_config(k: usize, config: SegmentationConfig) -> Self {
        Self {
            k,
            config,
            d: 0,
            fit: None,
        }
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the maximum number of iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.config.max_iters = max_iters;
        self
    }

    /// Set the number of restarts
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.config.n_init = n_init;
        self
    }

    /// Train the model on the given data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `k` is not in `[2, n_samples - 1]`
    /// - Data dimensions don't match a previous training call
    pub fn train(&mut self, data: &ArrayView2<f64>) -> Result<()> {
        let n_features = data.ncols();

        // Dimensions are fixed by the first successful call
        if self.d != 0 && n_features != self.d {
            return Err(SegmentationError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        self.fit = Some(cluster_with(data, self.k, &self.config)?);
        self.d = n_features;
        Ok(())
    }

    /// Equivalent to [`KMeans::train`], returning `&mut Self` for chaining.
    pub fn fit(&mut self, data: &ArrayView2<f64>) -> Result<&mut Self> {
        self.train(data)?;
        Ok(self)
    }

    /// Assign each row of `data` to its nearest trained centroid.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model has not been fitted yet
    /// - Data dimensions don't match the training data
    pub fn predict(&self, data: &ArrayView2<f64>) -> Result<ClusterAssignment> {
        let fit = self.fit.as_ref().ok_or(SegmentationError::NotFitted)?;

        let n_features = data.ncols();
        if n_features != self.d {
            return Err(SegmentationError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        let labels = predict_labels(data, &fit.centroids.view());
        ClusterAssignment::new(labels, self.k)
    }

    /// Train and return the training assignment in one call.
    pub fn fit_predict(&mut self, data: &ArrayView2<f64>) -> Result<ClusterAssignment> {
        self.train(data)?;
        let fit = self.fit.as_ref().ok_or(SegmentationError::NotFitted)?;
        Ok(fit.assignment.clone())
    }

    /// Trained centroids, `None` before training.
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.fit.as_ref().map(|fit| &fit.centroids)
    }

    /// Full result of the last training call.
    pub fn last_fit(&self) -> Option<&KMeansFit> {
        self.fit.as_ref()
    }

    /// Get the number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Get the number of features (dimensions).
    pub fn d(&self) -> usize {
        self.d
    }

    /// Get the configuration.
    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }
}
