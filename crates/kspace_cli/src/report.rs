//! Fixed-width metric tables for terminal output.

use kspace_core::VariantMetrics;

const RULE_WIDTH: usize = 60;

/// Print the per-variant quality metrics for one dataset.
pub fn print_metrics_table(prefix: &str, metrics: &[VariantMetrics<f32>]) {
    println!();
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Dataset: {}", prefix);
    println!("{}", "=".repeat(RULE_WIDTH));
    println!(
        "{:<20} {:<12} {:<12} {:<12}",
        "Version", "Sharpness", "Noise", "Error"
    );
    println!("{}", "-".repeat(56));

    for m in metrics {
        println!(
            "{:<20} {:<12.4} {:<12.4} {:<12.4}",
            m.variant.label(),
            m.sharpness,
            m.noise,
            m.error
        );
    }
}
