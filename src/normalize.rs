use crate::error::{Result, SegmentationError};
use crate::record::Record;
use ndarray::Array2;
use serde::Serialize;
use tracing::debug;

/// Ordered feature names; position `j` names column `j` of the feature matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSet {
    names: Vec<String>,
}

impl FeatureSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Output of [`normalize`]: the feature names and the min-max scaled matrix.
#[derive(Debug, Clone)]
pub struct NormalizedFeatures {
    pub features: FeatureSet,
    /// Shape (n_records, n_features), every entry in [0, 1].
    pub matrix: Array2<f64>,
}

/// Select the numeric features of `records` and rescale each to [0, 1].
///
/// A field is a feature when it is not excluded and its value on the *first*
/// record is a finite number; later records cannot add features. Values that
/// are missing or non-numeric on an included feature count as 0. A feature
/// whose minimum equals its maximum normalizes to 0 on every row.
///
/// The record identifier is never a feature.
///
/// # Errors
///
/// - [`SegmentationError::EmptyInput`] if `records` is empty
/// - [`SegmentationError::FeatureShortage`] if fewer than 2 features qualify
pub fn normalize(records: &[Record], excluded: &[&str]) -> Result<NormalizedFeatures> {
    let first = records.first().ok_or(SegmentationError::EmptyInput)?;

    let mut names: Vec<String> = Vec::new();
    for (name, value) in &first.fields {
        if excluded.contains(&name.as_str()) || names.contains(name) {
            continue;
        }
        if value.as_number().is_some() {
            names.push(name.clone());
        }
    }

    if names.len() < 2 {
        return Err(SegmentationError::FeatureShortage { found: names.len() });
    }

    let n_samples = records.len();
    let n_features = names.len();
    let mut matrix = Array2::zeros((n_samples, n_features));

    for (i, record) in records.iter().enumerate() {
        for (j, name) in names.iter().enumerate() {
            matrix[[i, j]] = record.coerced(name);
        }
    }

    for (j, mut column) in matrix.columns_mut().into_iter().enumerate() {
        let min = column.iter().copied().fold(f64::INFINITY, f64::min);
        let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        if range == 0.0 {
            debug!(feature = %names[j], value = min, "constant feature normalized to 0");
            column.fill(0.0);
        } else if range.is_finite() {
            column.mapv_inplace(|v| ((v - min) / range).clamp(0.0, 1.0));
        } else {
            // Span exceeds f64::MAX; halving keeps every difference finite
            let half_range = max / 2.0 - min / 2.0;
            column.mapv_inplace(|v| ((v / 2.0 - min / 2.0) / half_range).clamp(0.0, 1.0));
        }
    }

    debug!(n_samples, n_features, "normalized feature matrix");

    Ok(NormalizedFeatures {
        features: FeatureSet::new(names),
        matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn customer(id: &str, spend: f64, visits: f64) -> Record {
        Record::new(id)
            .with_field("customer_id", id)
            .with_field("spend", spend)
            .with_field("visits", visits)
    }

    #[test]
    fn test_min_max_scaling() {
        let records = vec![
            customer("a", 100.0, 1.0),
            customer("b", 200.0, 3.0),
            customer("c", 300.0, 5.0),
        ];
        let out = normalize(&records, &["customer_id"]).unwrap();

        assert_eq!(out.features.names(), &["spend", "visits"]);
        assert_eq!(out.matrix.dim(), (3, 2));
        assert_relative_eq!(out.matrix[[0, 0]], 0.0);
        assert_relative_eq!(out.matrix[[1, 0]], 0.5, epsilon = 1e-12);
        assert_relative_eq!(out.matrix[[2, 1]], 1.0);
    }

    #[test]
    fn test_constant_feature_is_zero() {
        let records: Vec<Record> = (0..4)
            .map(|i| {
                Record::new(format!("r{i}"))
                    .with_field("constant", 5.0)
                    .with_field("x", i as f64)
            })
            .collect();
        let out = normalize(&records, &[]).unwrap();

        for row in 0..4 {
            assert_eq!(out.matrix[[row, 0]], 0.0);
        }
    }

    #[test]
    fn test_span_beyond_f64_max_stays_in_unit_range() {
        let xs = [-1e308, 0.0, 1e308, 5e307];
        let records: Vec<Record> = xs
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                Record::new(format!("r{i}"))
                    .with_field("x", x)
                    .with_field("y", i as f64)
            })
            .collect();
        let out = normalize(&records, &[]).unwrap();

        assert!(out.matrix.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_relative_eq!(out.matrix[[0, 0]], 0.0);
        assert_relative_eq!(out.matrix[[1, 0]], 0.5, epsilon = 1e-12);
        assert_relative_eq!(out.matrix[[2, 0]], 1.0);
        assert_relative_eq!(out.matrix[[3, 0]], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_first_record_decides_features() {
        let records = vec![
            Record::new("a")
                .with_field("x", 1.0)
                .with_field("y", 2.0)
                .with_field("tier", "gold"),
            Record::new("b")
                .with_field("x", 3.0)
                .with_field("y", "n/a")
                .with_field("tier", 9.0),
        ];
        let out = normalize(&records, &[]).unwrap();

        assert_eq!(out.features.names(), &["x", "y"]);
        // "n/a" coerces to 0, below the first record's 2.0
        assert_relative_eq!(out.matrix[[0, 1]], 1.0);
        assert_relative_eq!(out.matrix[[1, 1]], 0.0);
    }

    #[test]
    fn test_feature_shortage() {
        let records = vec![Record::new("a").with_field("x", 1.0).with_field("name", "bob")];
        let result = normalize(&records, &[]);
        assert!(matches!(
            result,
            Err(SegmentationError::FeatureShortage { found: 1 })
        ));
    }

    #[test]
    fn test_excluded_fields_are_skipped() {
        let records = vec![customer("a", 1.0, 2.0), customer("b", 2.0, 3.0)];
        let result = normalize(&records, &["customer_id", "visits"]);
        assert!(matches!(
            result,
            Err(SegmentationError::FeatureShortage { found: 1 })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            normalize(&[], &[]),
            Err(SegmentationError::EmptyInput)
        ));
    }
}
