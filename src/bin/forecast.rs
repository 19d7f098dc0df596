//! Forecast job: daily revenue forecast from the master table.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use stockcast::config::PipelineConfig;
use stockcast::pipeline::run_forecast;
use stockcast::telemetry;

#[derive(Parser)]
#[command(name = "stockcast-forecast")]
#[command(about = "Forecast daily revenue with additive Holt-Winters", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Master table CSV
    #[arg(long)]
    input: Option<PathBuf>,

    /// Forecast output CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Days to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Add prediction bounds at this coverage, e.g. 0.95
    #[arg(long)]
    interval: Option<f64>,

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
    if let Some(input) = cli.input {
        config.paths.master_table = input;
    }
    if let Some(output) = cli.output {
        config.paths.forecast_output = output;
    }
    if let Some(horizon) = cli.horizon {
        config.forecast.horizon = horizon;
    }
    if cli.interval.is_some() {
        config.forecast.interval_level = cli.interval;
    }
    config.validate().context("invalid configuration")?;

    let report = run_forecast(&config).context("forecast job failed")?;

    if let Some(eval) = &report.evaluation {
        match eval.mape {
            Some(mape) => println!("Hold-out MAPE: {:.2}%", mape * 100.0),
            None => println!("Hold-out MAPE: undefined (no non-zero actuals)"),
        }
        println!("Hold-out RMSE: {:.2}", eval.rmse);
    }
    println!(
        "Forecast of {} days written to {}",
        report.forecast.horizon(),
        config.paths.forecast_output.display()
    );
    Ok(())
}
