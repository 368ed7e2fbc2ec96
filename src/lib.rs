//! # segmentation-rs
//!
//! Customer segmentation: partition labeled numeric records into a small
//! number of internally similar groups, score the partition, and describe
//! each group.
//!
//! ## Pipeline
//!
//! - **Normalization**: numeric features are picked from the first record and
//!   min-max scaled to `[0, 1]` ([`normalize`])
//! - **K-means**: k-means++ seeding, Lloyd iterations, seeded restarts
//!   ([`cluster`], [`KMeans`])
//! - **Silhouette**: mean silhouette coefficient of a partition ([`score`])
//! - **Cluster-count search**: best silhouette over `k = 2..=max_k`
//!   ([`select_optimal_k`])
//! - **Summaries**: per-cluster counts, original-value means and persona
//!   name/color ([`summarize`])
//!
//! Every step is a deterministic, pure function of its inputs. The library
//! logs through `tracing` and never installs a subscriber.
//!
//! ## Example
//!
//! ```rust
//! use segmentation_rs::{analyze, sample_customers, select_optimal_k};
//!
//! let records = sample_customers(60, 42).unwrap();
//!
//! let selection = select_optimal_k(&records, 6).unwrap();
//! assert!((2..=6).contains(&selection.optimal_k));
//!
//! let result = analyze(&records, selection.optimal_k).unwrap();
//! assert_eq!(result.summaries.len(), selection.optimal_k);
//! assert!((-1.0..=1.0).contains(&result.silhouette_score));
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust
//! use segmentation_rs::{analyze_with, sample_customers, SegmentationConfig};
//!
//! let records = sample_customers(40, 1).unwrap();
//!
//! let config = SegmentationConfig::new(5)
//!     .with_seed(7)
//!     .with_n_init(4)
//!     .with_excluded_fields(["customer_id", "days_since_last_purchase"]);
//!
//! let result = analyze_with(&records, 3, &config).unwrap();
//! assert_eq!(result.features.len(), 4);
//! ```

mod algorithm;
mod analysis;
mod config;
mod distance;
mod error;
mod kmeans;
mod normalize;
mod record;
mod sample;
mod select;
mod silhouette;
mod summary;

pub use analysis::{analyze, analyze_with, ClusterAnalysisResult, LabeledRecord};
pub use config::SegmentationConfig;
pub use error::{Result, SegmentationError};
pub use kmeans::{cluster, cluster_with, ClusterAssignment, KMeans, KMeansFit};
pub use normalize::{normalize, FeatureSet, NormalizedFeatures};
pub use record::{FieldValue, Record};
pub use sample::{sample_customers, SAMPLE_FEATURES};
pub use select::{scan_k, select_optimal_k, select_optimal_k_with, KScore, KSelection, FALLBACK_K};
pub use silhouette::{sample_scores, score};
pub use summary::{
    summarize, summarize_with, ClusterSummary, PersonaCatalog, MIN_CATALOG_LEN, PERSONA_COLORS,
    PERSONA_NAMES,
};
