use crate::error::{Result, SegmentationError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a segmentation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Inclusive upper bound for the cluster-count scan
    pub max_k: usize,

    /// Root seed for k-means++ initialization. Restart `r` uses `seed + r`.
    pub seed: u64,

    /// Maximum number of Lloyd iterations per restart
    pub max_iters: usize,

    /// Number of seeded restarts per clustering; the lowest-inertia run wins
    pub n_init: usize,

    /// Field names never used as features (the record id is always excluded)
    pub excluded_fields: Vec<String>,

    /// Evaluate k candidates of the scan on the rayon pool
    pub parallel: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_k: 8,
            seed: 42,
            max_iters: 100,
            n_init: 10,
            excluded_fields: vec!["id".to_string(), "customer_id".to_string()],
            parallel: true,
        }
    }
}

impl SegmentationConfig {
    /// Create a new configuration with the specified scan bound
    pub fn new(max_k: usize) -> Self {
        Self {
            max_k,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| SegmentationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            SegmentationError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }

    /// Reject settings that would make clustering meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_iters == 0 {
            return Err(SegmentationError::Config(
                "max_iters must be greater than 0".to_string(),
            ));
        }
        if self.n_init == 0 {
            return Err(SegmentationError::Config(
                "n_init must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Excluded field names as borrowed strings
    pub fn excluded(&self) -> Vec<&str> {
        self.excluded_fields.iter().map(String::as_str).collect()
    }

    /// Set the inclusive upper bound of the k scan
    pub fn with_max_k(mut self, max_k: usize) -> Self {
        self.max_k = max_k;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the maximum number of iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the number of restarts
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Replace the excluded field names
    pub fn with_excluded_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Toggle parallel evaluation of k candidates
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
