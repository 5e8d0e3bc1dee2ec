mod engine;
mod errors;
mod market;
mod reporting;
mod shield;
mod signals;
mod simulation;
mod types;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::engine::ShieldEngine;
use crate::market::binance_book_ticker::BinanceBookTicker;
use crate::market::market_source::BookSource;
use crate::reporting::reporter::Reporter;
use crate::simulation::quote_simulator::QuoteSimulator;
use crate::types::book_snapshot::BookSnapshot;
use crate::types::instrument::Instrument;
use crate::types::policy_grid::PolicyGrid;

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Instrument whose policy grid is evaluated, e.g. BTCUSDT.
    #[arg(default_value = "BTCUSDT")]
    pub symbol: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("shieldgrid=info".parse()?)
                .add_directive("tokio_tungstenite=warn".parse()?),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let instrument = Instrument::new(&args.symbol)?;
    let (grid, settings) = PolicyGrid::from_config(&instrument)?;

    info!(
        %instrument,
        half_lives = ?grid.half_lives(),
        policies = grid.len(),
        ?settings,
        "loaded policy grid"
    );

    let engine = ShieldEngine::new(&grid, &settings)?;

    let (snapshot_sender, snapshot_receiver) = mpsc::channel::<BookSnapshot>(10_000);

    tokio::spawn({
        let instrument = instrument.clone();
        let book_source = BinanceBookTicker::default();
        async move {
            loop {
                if let Err(error) = book_source
                    .subscribe(&instrument, snapshot_sender.clone())
                    .await
                {
                    error!("BinanceBookTicker stopped with error: {error:?}");
                }

                if snapshot_sender.is_closed() {
                    break;
                }

                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    });

    let simulator = QuoteSimulator::new(
        engine.policies(),
        engine.subscribe_market(),
        engine.subscribe_signal(),
        &settings,
    );
    tokio::spawn(simulator.run());

    let reporter = Reporter::new(
        instrument.clone(),
        engine.policies(),
        settings.report_interval(),
    );
    tokio::spawn(reporter.run());

    tokio::select! {
        _ = engine.run(snapshot_receiver) => {
            warn!("book feed ended");
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutting down");
        }
    }

    Ok(())
}
