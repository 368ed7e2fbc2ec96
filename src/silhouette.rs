//! Silhouette coefficient for a hard partition.
//!
//! For a point `i` in cluster `C`:
//!
//! ```text
//! a(i) = mean distance from i to the other members of C   (0 for a singleton)
//! b(i) = min over non-empty D != C of mean distance from i to members of D
//! s(i) = (b(i) - a(i)) / max(a(i), b(i))
//! ```
//!
//! `s(i)` is 0 when no other non-empty cluster exists, and when `a(i)` and
//! `b(i)` are both 0. The overall score is the mean of `s(i)` over all points,
//! so it always lies in `[-1, 1]`.
//!
//! Time is O(n² · d). Distances are computed per point on demand; nothing is
//! cached across calls.

use crate::distance::euclidean;
use crate::error::{Result, SegmentationError};
use crate::kmeans::ClusterAssignment;
use ndarray::ArrayView2;
use rayon::prelude::*;

/// Mean silhouette over all rows of `matrix`.
///
/// # Errors
///
/// - [`SegmentationError::EmptyInput`] if the matrix has no rows
/// - [`SegmentationError::InvalidDimensions`] if the assignment length differs
///   from the row count
pub fn score(matrix: &ArrayView2<f64>, assignment: &ClusterAssignment) -> Result<f64> {
    let samples = sample_scores(matrix, assignment)?;
    // Sequential sum keeps the result independent of thread scheduling
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    Ok(mean.clamp(-1.0, 1.0))
}

/// Per-point silhouette values, in row order.
pub fn sample_scores(
    matrix: &ArrayView2<f64>,
    assignment: &ClusterAssignment,
) -> Result<Vec<f64>> {
    let n = matrix.nrows();
    if n == 0 {
        return Err(SegmentationError::EmptyInput);
    }
    if assignment.len() != n {
        return Err(SegmentationError::InvalidDimensions(format!(
            "assignment covers {} records, matrix has {} rows",
            assignment.len(),
            n
        )));
    }

    let k = assignment.k();
    let sizes = assignment.cluster_sizes();
    let labels = assignment.labels();

    let scores = (0..n)
        .into_par_iter()
        .map(|i| {
            let own = labels[i];
            let point = matrix.row(i);

            let mut sums = vec![0.0f64; k];
            for (j, &label) in labels.iter().enumerate() {
                if j != i {
                    sums[label] += euclidean(&point, &matrix.row(j));
                }
            }

            let a = if sizes[own] > 1 {
                sums[own] / (sizes[own] - 1) as f64
            } else {
                0.0
            };

            let b = (0..k)
                .filter(|&c| c != own && sizes[c] > 0)
                .map(|c| sums[c] / sizes[c] as f64)
                .reduce(f64::min);

            match b {
                Some(b) => point_silhouette(a, b),
                None => 0.0,
            }
        })
        .collect();

    Ok(scores)
}

#[inline]
fn point_silhouette(a: f64, b: f64) -> f64 {
    let denom = a.max(b);
    if denom > 0.0 {
        ((b - a) / denom).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_well_separated_pairs() {
        let data = array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
        let assignment = ClusterAssignment::new(vec![0, 0, 1, 1], 2).unwrap();

        let s = score(&data.view(), &assignment).unwrap();
        assert!(s > 0.9, "expected a high silhouette, got {}", s);
    }

    #[test]
    fn test_known_value() {
        // Points on a line: 0, 1 | 4
        let data = array![[0.0], [1.0], [4.0]];
        let assignment = ClusterAssignment::new(vec![0, 0, 1], 2).unwrap();

        let samples = sample_scores(&data.view(), &assignment).unwrap();
        // i=0: a=1, b=4 -> 0.75; i=1: a=1, b=3 -> 2/3; i=2 singleton: a=0 -> 1
        assert_relative_eq!(samples[0], 0.75);
        assert_relative_eq!(samples[1], 2.0 / 3.0);
        assert_relative_eq!(samples[2], 1.0);
        assert_relative_eq!(
            score(&data.view(), &assignment).unwrap(),
            (0.75 + 2.0 / 3.0 + 1.0) / 3.0
        );
    }

    #[test]
    fn test_single_cluster_scores_zero() {
        let data = array![[0.0, 0.0], [1.0, 1.0], [2.0, 0.5]];
        let assignment = ClusterAssignment::new(vec![1, 1, 1], 3).unwrap();

        let samples = sample_scores(&data.view(), &assignment).unwrap();
        assert!(samples.iter().all(|&s| s == 0.0));
        assert_eq!(score(&data.view(), &assignment).unwrap(), 0.0);
    }

    #[test]
    fn test_coincident_points_score_zero() {
        let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let assignment = ClusterAssignment::new(vec![0, 0, 1, 1], 2).unwrap();

        assert_eq!(score(&data.view(), &assignment).unwrap(), 0.0);
    }

    #[test]
    fn test_bad_partition_is_negative() {
        let data = array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
        let assignment = ClusterAssignment::new(vec![0, 1, 0, 1], 2).unwrap();

        let s = score(&data.view(), &assignment).unwrap();
        assert!(s < 0.0);
        assert!(s >= -1.0);
    }

    #[test]
    fn test_length_mismatch() {
        let data = array![[0.0, 0.0], [1.0, 1.0]];
        let assignment = ClusterAssignment::new(vec![0, 1, 1], 2).unwrap();

        assert!(matches!(
            score(&data.view(), &assignment),
            Err(SegmentationError::InvalidDimensions(_))
        ));
    }
}
