use crate::error::{Result, SegmentationError};
use crate::kmeans::ClusterAssignment;
use crate::normalize::FeatureSet;
use crate::record::Record;
use serde::Serialize;

/// Smallest catalog that keeps every supported k visually distinct.
pub const MIN_CATALOG_LEN: usize = 8;

/// Persona names, indexed by `cluster_id % len`.
pub const PERSONA_NAMES: [&str; 8] = [
    "High-Value Customers",
    "Budget-Conscious",
    "Frequent Buyers",
    "Occasional Shoppers",
    "Premium Seekers",
    "Deal Hunters",
    "Loyal Customers",
    "New Customers",
];

/// Persona colors, indexed by `cluster_id % len`.
pub const PERSONA_COLORS: [&str; 8] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4", "#f97316", "#84cc16",
];

/// Read-only display metadata for cluster ids.
#[derive(Debug, Clone, Copy)]
pub struct PersonaCatalog {
    names: &'static [&'static str],
    colors: &'static [&'static str],
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self {
            names: &PERSONA_NAMES,
            colors: &PERSONA_COLORS,
        }
    }
}

impl PersonaCatalog {
    /// Catalog over custom tables, each holding at least [`MIN_CATALOG_LEN`] entries.
    pub fn new(names: &'static [&'static str], colors: &'static [&'static str]) -> Result<Self> {
        if names.len() < MIN_CATALOG_LEN || colors.len() < MIN_CATALOG_LEN {
            return Err(SegmentationError::Config(format!(
                "persona catalogs need at least {} entries, got {} names and {} colors",
                MIN_CATALOG_LEN,
                names.len(),
                colors.len()
            )));
        }
        Ok(Self { names, colors })
    }

    pub fn name(&self, cluster_id: usize) -> &'static str {
        self.names[cluster_id % self.names.len()]
    }

    pub fn color(&self, cluster_id: usize) -> &'static str {
        self.colors[cluster_id % self.colors.len()]
    }
}

/// Descriptive statistics for one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster_id: usize,
    pub name: String,
    pub color: String,
    pub count: usize,
    /// Share of all records, in percent
    pub percentage: f64,
    /// Feature name and mean of its original value among members, in
    /// feature-set order. All zeros for an empty cluster.
    pub means: Vec<(String, f64)>,
}

impl ClusterSummary {
    pub fn mean(&self, feature: &str) -> Option<f64> {
        self.means
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, value)| *value)
    }
}

/// Build one summary per cluster id `0..k` using the default persona catalog.
pub fn summarize(
    records: &[Record],
    features: &FeatureSet,
    assignment: &ClusterAssignment,
) -> Result<Vec<ClusterSummary>> {
    summarize_with(records, features, assignment, &PersonaCatalog::default())
}

/// Build one summary per cluster id `0..k`.
///
/// Means use the original record values, reading missing or non-numeric
/// values as 0. Every id appears exactly once, empty clusters included.
pub fn summarize_with(
    records: &[Record],
    features: &FeatureSet,
    assignment: &ClusterAssignment,
    catalog: &PersonaCatalog,
) -> Result<Vec<ClusterSummary>> {
    if assignment.len() != records.len() {
        return Err(SegmentationError::InvalidDimensions(format!(
            "assignment covers {} records, {} were given",
            assignment.len(),
            records.len()
        )));
    }

    let k = assignment.k();
    let n_features = features.len();
    let mut counts = vec![0usize; k];
    let mut sums = vec![vec![0.0f64; n_features]; k];

    for (record, &label) in records.iter().zip(assignment.labels()) {
        counts[label] += 1;
        for (sum, name) in sums[label].iter_mut().zip(features.iter()) {
            *sum += record.coerced(name);
        }
    }

    let total = records.len();
    let summaries = (0..k)
        .map(|cluster_id| {
            let count = counts[cluster_id];
            let means = features
                .iter()
                .zip(&sums[cluster_id])
                .map(|(name, &sum)| {
                    let mean = if count > 0 { sum / count as f64 } else { 0.0 };
                    (name.to_string(), mean)
                })
                .collect();
            let percentage = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };

            ClusterSummary {
                cluster_id,
                name: catalog.name(cluster_id).to_string(),
                color: catalog.color(cluster_id).to_string(),
                count,
                percentage,
                means,
            }
        })
        .collect();

    Ok(summaries)
}
