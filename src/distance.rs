use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Squared Euclidean distance between two equal-length vectors
#[inline]
pub fn squared_euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Euclidean distance between two equal-length vectors
#[inline]
pub fn euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Find the nearest centroid for each data point
///
/// Distances are computed directly rather than through the
/// `||x||^2 + ||c||^2 - 2*x.c` expansion so that exact ties stay exact.
/// Ties go to the lowest centroid index.
///
/// # Returns
/// * `labels` - Cluster assignment for each row of `data`
/// * `distances` - Squared distance from each row to its assigned centroid
pub fn find_nearest_centroids(
    data: &ArrayView2<f64>,
    centroids: &ArrayView2<f64>,
) -> (Vec<usize>, Vec<f64>) {
    (0..data.nrows())
        .into_par_iter()
        .map(|i| nearest_centroid(&data.row(i), centroids))
        .unzip()
}

/// Index and squared distance of the centroid closest to `point`
#[inline]
pub fn nearest_centroid(point: &ArrayView1<f64>, centroids: &ArrayView2<f64>) -> (usize, f64) {
    let mut best_label = 0;
    let mut best_dist = f64::INFINITY;

    for (j, centroid) in centroids.outer_iter().enumerate() {
        let dist = squared_euclidean(point, &centroid);
        // Strict comparison keeps the first (lowest) index on ties
        if dist < best_dist {
            best_dist = dist;
            best_label = j;
        }
    }

    (best_label, best_dist)
}
