use crate::config::SegmentationConfig;
use crate::error::Result;
use crate::kmeans::{cluster_with, ClusterAssignment};
use crate::normalize::{normalize, FeatureSet};
use crate::record::{FieldValue, Record};
use crate::silhouette::score;
use crate::summary::{summarize, ClusterSummary};
use ndarray::Array2;
use serde::Serialize;
use tracing::{info, instrument};

/// Everything produced by one analysis at a fixed k
#[derive(Debug, Clone, Serialize)]
pub struct ClusterAnalysisResult {
    pub k: usize,
    /// Features used for clustering, in matrix column order
    pub features: FeatureSet,
    pub assignment: ClusterAssignment,
    /// Shape (k, n_features), in normalized feature space
    pub centroids: Array2<f64>,
    pub silhouette_score: f64,
    /// One entry per cluster id, ascending
    pub summaries: Vec<ClusterSummary>,
}

/// An input record, all of its fields included, with the cluster it landed in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRecord {
    pub id: String,
    /// The record's fields as given, in their original order
    pub fields: Vec<(String, FieldValue)>,
    pub cluster_id: usize,
    pub cluster_name: String,
}

impl ClusterAnalysisResult {
    /// Pair each input record with its cluster id and persona name, in input order.
    ///
    /// `records` must be the slice the result was computed from.
    pub fn labeled_records(&self, records: &[Record]) -> Vec<LabeledRecord> {
        records
            .iter()
            .zip(self.assignment.labels())
            .map(|(record, &cluster_id)| LabeledRecord {
                id: record.id.clone(),
                fields: record.fields.clone(),
                cluster_id,
                cluster_name: self
                    .summaries
                    .get(cluster_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
            })
            .collect()
    }

    pub fn summary(&self, cluster_id: usize) -> Option<&ClusterSummary> {
        self.summaries.get(cluster_id)
    }
}

/// Normalize, cluster into `k` groups, score and summarize with default settings.
///
/// # Example
///
/// ```
/// use segmentation_rs::{analyze, Record};
///
/// let records: Vec<Record> = (0..6)
///     .map(|i| {
///         let offset = if i < 3 { 0.0 } else { 100.0 };
///         Record::new(format!("c{i}"))
///             .with_field("spend", offset + i as f64)
///             .with_field("visits", offset + 2.0 * i as f64)
///     })
///     .collect();
///
/// let result = analyze(&records, 2).unwrap();
/// assert_eq!(result.summaries.len(), 2);
/// assert_eq!(result.summaries.iter().map(|s| s.count).sum::<usize>(), 6);
/// ```
///
/// # Errors
///
/// - [`crate::SegmentationError::FeatureShortage`] if fewer than 2 numeric features exist
/// - [`crate::SegmentationError::InsufficientData`] if `k >= records.len()`
pub fn analyze(records: &[Record], k: usize) -> Result<ClusterAnalysisResult> {
    analyze_with(records, k, &SegmentationConfig::default())
}

/// [`analyze`] with explicit settings.
#[instrument(level = "info", skip(records, config), fields(n_records = records.len()))]
pub fn analyze_with(
    records: &[Record],
    k: usize,
    config: &SegmentationConfig,
) -> Result<ClusterAnalysisResult> {
    config.validate()?;

    let normalized = normalize(records, &config.excluded())?;
    let matrix = normalized.matrix.view();

    let fit = cluster_with(&matrix, k, config)?;
    let silhouette_score = score(&matrix, &fit.assignment)?;
    let summaries = summarize(records, &normalized.features, &fit.assignment)?;

    info!(
        k,
        n_features = normalized.features.len(),
        silhouette = silhouette_score,
        iterations = fit.n_iterations,
        "analysis complete"
    );

    Ok(ClusterAnalysisResult {
        k,
        features: normalized.features,
        assignment: fit.assignment,
        centroids: fit.centroids,
        silhouette_score,
        summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegmentationError;

    fn blobs() -> Vec<Record> {
        let centers = [(10.0, 1.0), (90.0, 1.5), (50.0, 9.0)];
        let mut records = Vec::new();
        for (c, &(x, y)) in centers.iter().enumerate() {
            for j in 0..4 {
                let jitter = j as f64 * 0.1;
                records.push(
                    Record::new(format!("c{}-{}", c, j))
                        .with_field("customer_id", format!("c{}-{}", c, j))
                        .with_field("spend", x + jitter)
                        .with_field("visits", y + jitter / 10.0)
                        .with_field("tier", "standard"),
                );
            }
        }
        records
    }

    #[test]
    fn test_analyze_three_blobs() {
        let records = blobs();
        let result = analyze(&records, 3).unwrap();

        assert_eq!(result.k, 3);
        assert_eq!(result.features.names(), &["spend", "visits"]);
        assert_eq!(result.centroids.dim(), (3, 2));
        assert!(result.silhouette_score > 0.9);

        for blob in 0..3 {
            let label = result.assignment.get(blob * 4).unwrap();
            for j in 1..4 {
                assert_eq!(result.assignment.get(blob * 4 + j), Some(label));
            }
            assert_eq!(result.summaries[label].count, 4);
        }
    }

    #[test]
    fn test_labeled_records_follow_input_order() {
        let records = blobs();
        let result = analyze(&records, 3).unwrap();
        let labeled = result.labeled_records(&records);

        assert_eq!(labeled.len(), records.len());
        for (row, (entry, record)) in labeled.iter().zip(&records).enumerate() {
            assert_eq!(entry.id, record.id);
            assert_eq!(entry.fields, record.fields);
            assert_eq!(Some(entry.cluster_id), result.assignment.get(row));
            assert_eq!(entry.cluster_name, result.summaries[entry.cluster_id].name);
        }
    }

    #[test]
    fn test_labeled_records_export_keeps_text_fields() {
        let records = blobs();
        let result = analyze(&records, 3).unwrap();
        let labeled = result.labeled_records(&records);

        let json = serde_json::to_value(&labeled[0]).unwrap();
        assert_eq!(json["id"], "c0-0");
        assert_eq!(json["cluster_id"], result.assignment.get(0).unwrap());
        let fields = json["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[3], serde_json::json!(["tier", "standard"]));
    }

    #[test]
    fn test_analyze_rejects_k_equal_to_n() {
        let records: Vec<Record> = blobs().into_iter().take(3).collect();
        assert!(matches!(
            analyze(&records, 3),
            Err(SegmentationError::InsufficientData { n_samples: 3, k: 3 })
        ));
    }

    #[test]
    fn test_analyze_feature_shortage() {
        let records = vec![
            Record::new("a").with_field("spend", 1.0).with_field("tier", "x"),
            Record::new("b").with_field("spend", 2.0).with_field("tier", "y"),
            Record::new("c").with_field("spend", 3.0).with_field("tier", "z"),
        ];
        assert!(matches!(
            analyze(&records, 2),
            Err(SegmentationError::FeatureShortage { found: 1 })
        ));
    }
}
