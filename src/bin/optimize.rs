//! Inventory job: reorder policy and stock risk per product.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use stockcast::config::PipelineConfig;
use stockcast::inventory::PolicyConfig;
use stockcast::pipeline::run_inventory;
use stockcast::telemetry;

#[derive(Parser)]
#[command(name = "stockcast-optimize")]
#[command(about = "Compute safety stock, reorder point and EOQ per product", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Master table CSV
    #[arg(long)]
    master: Option<PathBuf>,

    /// Product reference CSV
    #[arg(long)]
    products: Option<PathBuf>,

    /// Supplier reference CSV
    #[arg(long)]
    suppliers: Option<PathBuf>,

    /// Recommendation output CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// One-sided service level, e.g. 0.95; overrides the configured z-score
    #[arg(long)]
    service_level: Option<f64>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.json_logs {
        telemetry::init_json();
    } else {
        telemetry::init();
    }

    let mut config = PipelineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.master {
        config.paths.master_table = path;
    }
    if let Some(path) = cli.products {
        config.paths.products = path;
    }
    if let Some(path) = cli.suppliers {
        config.paths.suppliers = path;
    }
    if let Some(path) = cli.output {
        config.paths.recommendations_output = path;
    }
    if let Some(level) = cli.service_level {
        let derived = PolicyConfig::from_service_level(level).context("invalid service level")?;
        config.inventory.policy.service_level_z = derived.service_level_z;
    }
    config.validate().context("invalid configuration")?;

    let report = run_inventory(&config).context("inventory job failed")?;

    println!("Recommendations: {}", report.recommendations);
    for (status, count) in &report.status_counts {
        println!("  {status}: {count}");
    }
    if !report.excluded.is_empty() {
        println!("Excluded products: {}", report.excluded.len());
        for reason in &report.excluded {
            println!("  {reason}");
        }
    }
    println!(
        "Written to {}",
        config.paths.recommendations_output.display()
    );
    Ok(())
}
