//! SwapForm Simulator
//!
//! Runs the swap form controller against JSON fixtures and a scripted set of
//! user events, logging everything the presentation layer would render.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swapform_form::{CurrencySlot, FormConfig, LoggingPresenter, SimulatedExecutor, SwapFormController};
use swapform_pricing::{JsonFilePriceFeed, JsonFileWalletSource, PriceRepository};

/// SwapForm Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "swapform-sim")]
#[command(about = "Drive the swap form against price and wallet fixtures")]
struct Args {
    /// Price feed JSON (array of {currency, date, price})
    #[arg(long, default_value = "simulator/fixtures/prices.json")]
    prices: PathBuf,

    /// Wallet JSON ({success, data: {holdings}})
    #[arg(long, default_value = "simulator/fixtures/wallet.json")]
    wallet: PathBuf,

    /// Currency to send
    #[arg(long)]
    from: Option<String>,

    /// Currency to receive
    #[arg(long)]
    to: Option<String>,

    /// Amount to send, as typed
    #[arg(long)]
    amount: Option<String>,

    /// Send the full wallet balance instead of --amount
    #[arg(long)]
    max: bool,

    /// Submit the swap after quoting
    #[arg(long)]
    submit: bool,

    /// Emit JSON logs
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    if args.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting SwapForm Simulator");

    let config = FormConfig::from_env();
    if let Err(e) = config.validate() {
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let prices = Arc::new(PriceRepository::new(Arc::new(JsonFilePriceFeed::new(
        &args.prices,
    ))));
    let wallet = Arc::new(JsonFileWalletSource::new(&args.wallet));
    let executor = Arc::new(SimulatedExecutor::new(config.submit_latency));

    let controller =
        SwapFormController::start(config, prices.clone(), wallet, executor, Arc::new(LoggingPresenter))
            .await;

    if let Some(e) = controller.load_error() {
        warn!(error = %e, "Continuing with an empty form");
    }

    for currency in controller.source_currencies().iter() {
        info!(
            currency = %currency.currency(),
            balance = %currency.wallet_amount(),
            usd_value = %currency.wallet_value(),
            "Wallet currency"
        );
    }

    if let Some(from) = &args.from {
        if let Err(e) = controller.select_currency(CurrencySlot::Input, from.as_str()) {
            warn!(error = %e, "Input currency rejected");
        }
    }
    if let Some(to) = &args.to {
        if let Err(e) = controller.select_currency(CurrencySlot::Output, to.as_str()) {
            warn!(error = %e, "Output currency rejected");
        }
    }

    if args.max {
        if let Err(e) = controller.set_max_amount() {
            warn!(error = %e, "MAX unavailable");
        }
    } else if let Some(amount) = &args.amount {
        if let Err(e) = controller.set_amount_text(amount) {
            warn!(error = %e, "Amount rejected");
        }
    }

    let quote = controller.quote();
    info!(
        input = %quote.input_amount,
        output = %quote.output_amount,
        valid = quote.valid,
        "Final quote"
    );

    if args.submit {
        match controller.submit().await {
            Ok(receipt) => info!(swap_id = %receipt.id, "{}", receipt.summary()),
            Err(e) => warn!(error = %e, "Swap not submitted"),
        }
    }

    let stats = prices.stats();
    info!(
        fetches = stats.fetches_started,
        cache_hits = stats.cache_hits,
        joined = stats.joined_waiters,
        "Simulation complete"
    );

    Ok(())
}
