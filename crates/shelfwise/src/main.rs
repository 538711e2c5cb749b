use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use shelfwise_agents::{Optimization, Outcome};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shelfwise", about = "Retail inventory and pricing optimizer")]
struct Cli {
    /// Path to configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "config/shelfwise.toml")]
    config: PathBuf,

    /// Product to optimize
    #[arg(short, long, default_value_t = 1)]
    product: u64,

    /// Print the records as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = shelfwise::load_config(&cli.config)?;
    let orchestrator =
        shelfwise::build_orchestrator(&config).context("Failed to build orchestrator")?;

    let cancel = CancellationToken::new();
    tokio::spawn(shelfwise::cancel_on_signal(
        tokio::signal::ctrl_c(),
        cancel.clone(),
    ));

    match orchestrator
        .optimize_until_cancelled(cli.product, &cancel)
        .await
    {
        Outcome::Completed(optimization) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&optimization)?);
            } else {
                print_summary(&optimization);
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Failed(failure) => {
            eprintln!("Optimization failed at {}: {}", failure.step, failure.diagnostic);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_summary(optimization: &Optimization) {
    let Optimization {
        product_id,
        forecast,
        pricing,
        purchase,
    } = optimization;

    println!("Product {product_id}");
    println!(
        "  Forecast: demand {} (confidence {}), stock level {}, signals {:?}",
        forecast.predicted_demand(),
        forecast.confidence(),
        forecast.suggested_stock_level(),
        forecast.market_signals(),
    );
    println!(
        "  Pricing:  {} ({:?}, margin {}, range {}-{})",
        pricing.suggested_price(),
        pricing.strategy(),
        pricing.margin(),
        pricing.min_price(),
        pricing.max_price(),
    );
    println!(
        "  Purchase: {} x {} from {} = {}, delivery {}, priority {}",
        purchase.quantity(),
        purchase.unit_cost(),
        purchase.supplier_id(),
        purchase.total_cost(),
        purchase.expected_delivery().format("%Y-%m-%d"),
        purchase.priority(),
    );
}
