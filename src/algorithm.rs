use crate::distance::{find_nearest_centroids, nearest_centroid, squared_euclidean};
use crate::error::{Result, SegmentationError};
use ndarray::{Array2, ArrayView2};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

/// Result of a single Lloyd run
pub struct LloydResult {
    pub centroids: Array2<f64>,
    pub labels: Vec<usize>,
    /// Sum of squared distances from each row to its centroid
    pub inertia: f64,
    pub n_iterations: usize,
    pub converged: bool,
}

/// Check `2 <= k <= n - 1` and that there is something to cluster
pub fn validate_k(n_samples: usize, k: usize) -> Result<()> {
    if n_samples == 0 {
        return Err(SegmentationError::EmptyInput);
    }
    if k < 2 {
        return Err(SegmentationError::InvalidK(format!(
            "k must be at least 2, got {}",
            k
        )));
    }
    if k >= n_samples {
        return Err(SegmentationError::InsufficientData { n_samples, k });
    }
    Ok(())
}

/// Run `n_init` seeded restarts and keep the lowest-inertia result
///
/// Restart `r` seeds its RNG with `seed + r`. The first restart wins ties, so
/// the outcome depends only on `(data, k, seed, max_iters, n_init)`.
pub fn kmeans_best_of(
    data: &ArrayView2<f64>,
    k: usize,
    seed: u64,
    max_iters: usize,
    n_init: usize,
) -> Result<LloydResult> {
    validate_k(data.nrows(), k)?;

    let mut best: Option<(usize, LloydResult)> = None;
    for restart in 0..n_init.max(1) {
        let run_seed = seed.wrapping_add(restart as u64);
        let result = kmeans_lloyd(data, k, run_seed, max_iters)?;

        let better = match &best {
            Some((_, current)) => result.inertia < current.inertia,
            None => true,
        };
        if better {
            best = Some((restart, result));
        }
    }

    let (restart, result) = best.ok_or(SegmentationError::EmptyInput)?;
    debug!(
        k,
        restart,
        inertia = result.inertia,
        iterations = result.n_iterations,
        converged = result.converged,
        "selected k-means restart"
    );
    Ok(result)
}

/// Lloyd's algorithm from a k-means++ initialization
pub fn kmeans_lloyd(
    data: &ArrayView2<f64>,
    k: usize,
    seed: u64,
    max_iters: usize,
) -> Result<LloydResult> {
    validate_k(data.nrows(), k)?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centroids = initialize_centroids(data, k, &mut rng);
    Ok(lloyd_from(data, centroids, max_iters))
}

/// Lloyd iterations starting from the given centroids
///
/// Each iteration assigns every row to its nearest centroid (ties to the
/// lowest index), then moves each centroid to the mean of its members. A
/// centroid that loses all members stays where it was. Stops when no
/// assignment changes or after `max_iters` iterations.
pub fn lloyd_from(
    data: &ArrayView2<f64>,
    mut centroids: Array2<f64>,
    max_iters: usize,
) -> LloydResult {
    let k = centroids.nrows();
    let n_features = data.ncols();

    let mut labels: Vec<usize> = Vec::new();
    let mut n_iterations = 0;
    let mut converged = false;

    for iteration in 0..max_iters.max(1) {
        n_iterations = iteration + 1;

        let (new_labels, _) = find_nearest_centroids(data, &centroids.view());
        let changed = labels.is_empty()
            || labels
                .iter()
                .zip(new_labels.iter())
                .any(|(old, new)| old != new);
        labels = new_labels;

        let mut cluster_sums: Array2<f64> = Array2::zeros((k, n_features));
        let mut cluster_counts = vec![0usize; k];
        for (i, &label) in labels.iter().enumerate() {
            cluster_counts[label] += 1;
            let mut sum = cluster_sums.row_mut(label);
            sum += &data.row(i);
        }

        for (cluster_idx, &count) in cluster_counts.iter().enumerate() {
            if count > 0 {
                let mean = &cluster_sums.row(cluster_idx) / count as f64;
                centroids.row_mut(cluster_idx).assign(&mean);
            }
        }

        trace!(iteration = iteration + 1, changed, "lloyd iteration");

        if !changed {
            converged = true;
            break;
        }
    }

    // Measured against the final centroids, not the ones used for assignment
    let inertia = labels
        .iter()
        .enumerate()
        .map(|(i, &label)| squared_euclidean(&data.row(i), &centroids.row(label)))
        .sum();

    LloydResult {
        centroids,
        labels,
        inertia,
        n_iterations,
        converged,
    }
}

/// k-means++ seeding: first centroid uniform, each next one sampled with
/// probability proportional to its squared distance from the nearest chosen
/// centroid. When every remaining point coincides with a chosen centroid the
/// next unchosen row index is taken.
pub fn initialize_centroids(
    data: &ArrayView2<f64>,
    k: usize,
    rng: &mut ChaCha8Rng,
) -> Array2<f64> {
    let n_samples = data.nrows();
    let n_features = data.ncols();

    let mut centroids = Array2::zeros((k, n_features));
    let mut chosen: Vec<usize> = Vec::with_capacity(k);

    let first = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&data.row(first));
    chosen.push(first);

    let mut min_dists: Vec<f64> = (0..n_samples)
        .map(|i| squared_euclidean(&data.row(i), &data.row(first)))
        .collect();

    for c in 1..k {
        let total: f64 = min_dists.iter().sum();

        let next = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut pick = None;
            for (i, &d) in min_dists.iter().enumerate() {
                cumulative += d;
                if d > 0.0 && cumulative > target {
                    pick = Some(i);
                    break;
                }
            }
            // Rounding can leave `target` just past the running sum
            pick.or_else(|| min_dists.iter().rposition(|&d| d > 0.0))
        } else {
            None
        };
        let next = next
            .or_else(|| (0..n_samples).find(|i| !chosen.contains(i)))
            .unwrap_or(0);

        centroids.row_mut(c).assign(&data.row(next));
        chosen.push(next);

        let added = centroids.row(c);
        for (i, d) in min_dists.iter_mut().enumerate() {
            let candidate = squared_euclidean(&data.row(i), &added);
            if candidate < *d {
                *d = candidate;
            }
        }
    }

    centroids
}

/// Assign rows to the nearest of the given centroids
pub fn predict_labels(data: &ArrayView2<f64>, centroids: &ArrayView2<f64>) -> Vec<usize> {
    (0..data.nrows())
        .map(|i| nearest_centroid(&data.row(i), centroids).0)
        .collect()
}
