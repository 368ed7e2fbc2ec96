//! Basic example demonstrating segmentation-rs usage
//!
//! Run with: cargo run --example basic --release

use segmentation_rs::{analyze_with, sample_customers, select_optimal_k_with, SegmentationConfig};

fn main() {
    println!("=== segmentation-rs example ===\n");

    let n_customers = 200;
    println!("Generating {} sample customers...", n_customers);
    let records = sample_customers(n_customers, 42).expect("Sample generation failed");

    let config = SegmentationConfig::new(8).with_seed(42);

    // Scan k = 2..=8 and keep the best silhouette
    let selection = select_optimal_k_with(&records, &config).expect("Selection failed");

    println!("Silhouette score by number of clusters:");
    for entry in &selection.scores {
        let marker = if entry.k == selection.optimal_k {
            "  <- optimal"
        } else {
            ""
        };
        println!("  k = {}: {:.4}{}", entry.k, entry.score, marker);
    }
    println!();

    let result =
        analyze_with(&records, selection.optimal_k, &config).expect("Analysis failed");

    println!(
        "Clustered {} customers into {} segments (silhouette {:.3})\n",
        records.len(),
        result.k,
        result.silhouette_score
    );

    println!("Customer personas:");
    for summary in &result.summaries {
        println!(
            "  [{}] {} ({} customers - {:.1}%)",
            summary.color, summary.name, summary.count, summary.percentage
        );
        for (feature, mean) in &summary.means {
            println!("      {}: {:.2}", feature.replace('_', " "), mean);
        }
    }
    println!();

    // Show first few assignments
    println!("First 10 customer assignments:");
    for labeled in result.labeled_records(&records).iter().take(10) {
        println!(
            "  {} -> cluster {} ({})",
            labeled.id, labeled.cluster_id, labeled.cluster_name
        );
    }

    println!("\n=== Done! ===");
}
