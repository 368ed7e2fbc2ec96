//! Seeded synthetic customer dataset, for demos and benchmarks.

use crate::error::{Result, SegmentationError};
use crate::record::Record;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Normal, Poisson};

/// Feature names carried by every sample customer, in field order.
pub const SAMPLE_FEATURES: [&str; 5] = [
    "annual_spending",
    "purchase_frequency",
    "avg_order_value",
    "customer_lifetime_value",
    "days_since_last_purchase",
];

/// Generate `n` customers with ids `CUST001`, `CUST002`, ...
///
/// Each customer also carries its id as a `customer_id` text field. The same
/// `(n, seed)` always produces the same records.
pub fn sample_customers(n: usize, seed: u64) -> Result<Vec<Record>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let spending = Normal::new(15_000.0_f64, 5_000.0).map_err(distribution_error)?;
    let purchases = Poisson::new(30.0_f64).map_err(distribution_error)?;
    let order_value = Normal::new(250.0_f64, 75.0).map_err(distribution_error)?;
    let lifetime = Normal::new(25_000.0_f64, 8_000.0).map_err(distribution_error)?;
    let recency = Exp::new(1.0_f64 / 15.0).map_err(distribution_error)?;

    let records = (1..=n)
        .map(|i| {
            let id = format!("CUST{:03}", i);
            let frequency: f64 = purchases.sample(&mut rng);
            Record::new(id.clone())
                .with_field("customer_id", id)
                .with_field(
                    "annual_spending",
                    spending.sample(&mut rng).clamp(1_000.0, 50_000.0),
                )
                .with_field("purchase_frequency", frequency.clamp(1.0, 100.0))
                .with_field(
                    "avg_order_value",
                    order_value.sample(&mut rng).clamp(50.0, 500.0),
                )
                .with_field(
                    "customer_lifetime_value",
                    lifetime.sample(&mut rng).clamp(2_000.0, 80_000.0),
                )
                .with_field(
                    "days_since_last_purchase",
                    recency.sample(&mut rng).clamp(1.0, 365.0),
                )
        })
        .collect();
    Ok(records)
}

fn distribution_error(e: impl std::fmt::Display) -> SegmentationError {
    SegmentationError::Config(format!("invalid sample distribution: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_shape_and_ranges() {
        let records = sample_customers(200, 42).unwrap();
        assert_eq!(records.len(), 200);
        assert_eq!(records[0].id, "CUST001");
        assert_eq!(records[199].id, "CUST200");

        for record in &records {
            for name in SAMPLE_FEATURES {
                assert!(record.numeric(name).is_some(), "missing {}", name);
            }
            let spend = record.numeric("annual_spending").unwrap();
            assert!((1_000.0..=50_000.0).contains(&spend));
            let freq = record.numeric("purchase_frequency").unwrap();
            assert!((1.0..=100.0).contains(&freq));
            assert_eq!(freq.fract(), 0.0);
            let recency = record.numeric("days_since_last_purchase").unwrap();
            assert!((1.0..=365.0).contains(&recency));
            let order = record.numeric("avg_order_value").unwrap();
            assert!((50.0..=500.0).contains(&order));
            let lifetime = record.numeric("customer_lifetime_value").unwrap();
            assert!((2_000.0..=80_000.0).contains(&lifetime));
        }
    }

    #[test]
    fn test_continuous_features_vary() {
        let records = sample_customers(100, 1).unwrap();
        for name in ["annual_spending", "avg_order_value", "customer_lifetime_value"] {
            let first = records[0].numeric(name).unwrap();
            assert!(
                records.iter().any(|r| r.numeric(name) != Some(first)),
                "{} is constant",
                name
            );
        }
    }

    #[test]
    fn test_sample_is_reproducible() {
        let a = sample_customers(50, 7).unwrap();
        let b = sample_customers(50, 7).unwrap();
        let c = sample_customers(50, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
