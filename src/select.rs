use crate::config::SegmentationConfig;
use crate::error::Result;
use crate::kmeans::cluster_with;
use crate::normalize::normalize;
use crate::record::Record;
use crate::silhouette::score;
use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// k reported when no candidate could be scored
pub const FALLBACK_K: usize = 2;

/// Silhouette score recorded for one candidate cluster count
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KScore {
    pub k: usize,
    pub score: f64,
}

/// Outcome of a cluster-count scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KSelection {
    /// Candidate with the highest score; [`FALLBACK_K`] when `scores` is empty
    pub optimal_k: usize,
    /// Scores in ascending k order
    pub scores: Vec<KScore>,
}

impl KSelection {
    /// False for the fallback result, which carries no analysis
    pub fn is_valid(&self) -> bool {
        !self.scores.is_empty()
    }

    pub fn best_score(&self) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.k == self.optimal_k)
            .map(|s| s.score)
    }
}

/// Normalize `records` and scan k = 2..=min(max_k, n - 1) with default settings.
pub fn select_optimal_k(records: &[Record], max_k: usize) -> Result<KSelection> {
    select_optimal_k_with(records, &SegmentationConfig::default().with_max_k(max_k))
}

/// Normalize `records` and scan cluster counts using `config`.
///
/// # Errors
///
/// Only normalization errors propagate; clustering failures end the scan.
#[instrument(
    level = "info",
    skip(records, config),
    fields(n_records = records.len(), max_k = config.max_k)
)]
pub fn select_optimal_k_with(
    records: &[Record],
    config: &SegmentationConfig,
) -> Result<KSelection> {
    let normalized = normalize(records, &config.excluded())?;
    let selection = scan_k(&normalized.matrix.view(), config);

    if selection.is_valid() {
        info!(
            optimal_k = selection.optimal_k,
            candidates = selection.scores.len(),
            "selected cluster count"
        );
    } else {
        warn!(
            fallback_k = FALLBACK_K,
            "no cluster count could be scored, reporting fallback"
        );
    }
    Ok(selection)
}

/// Score every candidate k on an already-normalized matrix and pick the best.
///
/// Candidates are tried in ascending order; the first one that fails ends the
/// scan and keeps the scores collected so far. The highest score wins and the
/// smallest k wins ties. Parallel evaluation produces the same result as the
/// sequential path.
pub fn scan_k(matrix: &ArrayView2<f64>, config: &SegmentationConfig) -> KSelection {
    let n_samples = matrix.nrows();
    let upper = config.max_k.min(n_samples.saturating_sub(1));
    let candidates: Vec<usize> = (FALLBACK_K..=upper).collect();

    let evaluate = |k: usize| -> Result<f64> {
        let fit = cluster_with(matrix, k, config)?;
        score(matrix, &fit.assignment)
    };

    let outcomes: Vec<(usize, Result<f64>)> = if config.parallel {
        candidates.par_iter().map(|&k| (k, evaluate(k))).collect()
    } else {
        let mut outcomes = Vec::with_capacity(candidates.len());
        for &k in &candidates {
            let outcome = evaluate(k);
            let failed = outcome.is_err();
            outcomes.push((k, outcome));
            if failed {
                break;
            }
        }
        outcomes
    };

    let mut scores = Vec::with_capacity(outcomes.len());
    for (k, outcome) in outcomes {
        match outcome {
            Ok(value) => {
                debug!(k, score = value, "scored candidate");
                scores.push(KScore { k, score: value });
            }
            Err(e) if e.is_insufficient_data() => {
                debug!(k, "not enough records for candidate, ending scan");
                break;
            }
            Err(e) => {
                warn!(k, error = %e, "candidate failed, ending scan");
                break;
            }
        }
    }

    let optimal_k = best_k(&scores).unwrap_or(FALLBACK_K);
    KSelection { optimal_k, scores }
}

/// First k holding the strictly highest score.
fn best_k(scores: &[KScore]) -> Option<usize> {
    let mut best: Option<KScore> = None;
    for candidate in scores {
        match best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(*candidate),
        }
    }
    best.map(|s| s.k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ks(pairs: &[(usize, f64)]) -> Vec<KScore> {
        pairs.iter().map(|&(k, score)| KScore { k, score }).collect()
    }

    #[test]
    fn test_best_k_first_max_wins() {
        assert_eq!(best_k(&ks(&[(2, 0.4), (3, 0.7), (4, 0.7)])), Some(3));
        assert_eq!(best_k(&ks(&[(2, 0.5), (3, 0.2)])), Some(2));
        assert_eq!(best_k(&[]), None);
    }

    #[test]
    fn test_scan_too_few_rows_falls_back() {
        let data = array![[0.0, 0.0], [1.0, 1.0]];
        let selection = scan_k(&data.view(), &SegmentationConfig::default());

        assert_eq!(selection.optimal_k, FALLBACK_K);
        assert!(selection.scores.is_empty());
        assert!(!selection.is_valid());
        assert_eq!(selection.best_score(), None);
    }

    #[test]
    fn test_scan_range_bounded_by_rows() {
        let data = array![[0.0, 0.0], [0.1, 0.0], [1.0, 1.0], [0.9, 1.0], [0.5, 0.0]];
        let selection = scan_k(&data.view(), &SegmentationConfig::default());

        let tried: Vec<usize> = selection.scores.iter().map(|s| s.k).collect();
        assert_eq!(tried, vec![2, 3, 4]);
        assert!((2..=4).contains(&selection.optimal_k));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let data = array![
            [0.0, 0.0],
            [0.05, 0.1],
            [0.5, 0.5],
            [0.55, 0.45],
            [1.0, 0.0],
            [0.95, 0.1],
            [0.2, 0.9],
            [0.3, 0.8]
        ];
        let sequential = scan_k(
            &data.view(),
            &SegmentationConfig::default().with_parallel(false),
        );
        let parallel = scan_k(
            &data.view(),
            &SegmentationConfig::default().with_parallel(true),
        );
        assert_eq!(sequential, parallel);
    }
}
