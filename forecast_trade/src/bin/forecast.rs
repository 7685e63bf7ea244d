//! Command-line front end for the forecast engine.
//!
//! Analyzes a list of symbols and prints one status line per symbol, or the
//! full results as JSON.

use anyhow::Context;
use clap::Parser;
use forecast_trade::config::{horizon_preset, DEFAULT_HORIZON};
use forecast_trade::engine::DEFAULT_PROJECTION_TAIL;
use forecast_trade::utils::generate_test_history;
use forecast_trade::{
    CsvProvider, EngineConfig, ForecastEngine, InMemoryProvider, MarketDataProvider,
    SymbolOutcome,
};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "Forecast prices and trading signals for a list of symbols")]
struct Cli {
    /// Symbols to analyze
    #[arg(required = true)]
    symbols: Vec<String>,

    /// Directory with one <SYMBOL>.csv file per symbol
    #[arg(short, long, conflicts_with = "synthetic")]
    data_dir: Option<PathBuf>,

    /// Use generated price series instead of files
    #[arg(long)]
    synthetic: bool,

    /// Horizon in trading rows, or a preset such as "1 month"
    #[arg(long, default_value_t = DEFAULT_HORIZON, value_parser = parse_horizon)]
    horizon: usize,

    /// Forest seed, overriding the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn parse_horizon(raw: &str) -> Result<usize, String> {
    if let Some(rows) = horizon_preset(raw) {
        return Ok(rows);
    }
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("horizon must be positive".to_string()),
        Ok(rows) => Ok(rows),
        Err(_) => Err(format!("'{}' is neither a number nor a preset", raw)),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    if cli.synthetic {
        let mut provider = InMemoryProvider::new();
        for (i, symbol) in cli.symbols.iter().enumerate() {
            let history = generate_test_history(1250, 20.0 + 5.0 * i as f64, 0.015, i as u64)?;
            provider.insert_history(symbol, history);
        }
        run(ForecastEngine::new(provider, config)?, &cli)
    } else {
        let dir = cli
            .data_dir
            .clone()
            .context("either --data-dir or --synthetic is required")?;
        run(ForecastEngine::new(CsvProvider::new(dir), config)?, &cli)
    }
}

fn run<P: MarketDataProvider>(engine: ForecastEngine<P>, cli: &Cli) -> anyhow::Result<()> {
    let outcomes = engine.analyze_batch(&cli.symbols, cli.horizon);

    if cli.json {
        print_json(&outcomes)?;
    } else {
        print_table(&outcomes, cli.horizon);
    }

    Ok(())
}

fn print_table(outcomes: &[SymbolOutcome], horizon: usize) {
    let target_header = format!("TARGET ({}d)", horizon);
    println!(
        "{:<10} | {:<8} | {:<22} | {:<8} | {:<6} | STATUS",
        "TICKER", "PRICE", target_header, "VAR %", "P/B"
    );
    println!("{}", "-".repeat(90));

    for outcome in outcomes {
        match &outcome.outcome {
            Ok(res) => {
                let target = format!(
                    "{:.2} ({:.2}-{:.2})",
                    res.target_price, res.interval.low, res.interval.high
                );
                println!(
                    "{:<10} | {:>8.2} | {:<22} | {:>7.1}% | {:>6.2} | {}",
                    outcome.symbol,
                    res.current_price,
                    target,
                    res.variation_pct(),
                    res.price_to_book,
                    res.signal.recommendation
                );
                println!(" > {} (RSI {:.0})\n", res.signal.rationale, res.rsi);
            }
            Err(err) => {
                println!("{:<10} | no forecast available: {}\n", outcome.symbol, err);
            }
        }
    }
}

fn print_json(outcomes: &[SymbolOutcome]) -> anyhow::Result<()> {
    let entries: Vec<_> = outcomes
        .iter()
        .map(|outcome| match &outcome.outcome {
            Ok(res) => json!({
                "symbol": outcome.symbol,
                "available": true,
                "result": res.as_ref(),
                "projection": res.projection(DEFAULT_PROJECTION_TAIL),
            }),
            Err(err) => json!({
                "symbol": outcome.symbol,
                "available": false,
                "error": err.to_string(),
            }),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
