use forecast_trade::config::HORIZON_PRESETS;
use forecast_trade::utils::generate_test_history;
use forecast_trade::{EngineConfig, ForecastEngine, Fundamentals, InMemoryProvider};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Forecast Trade: Basic Forecasting Example");
    println!("=========================================\n");

    // Create sample data
    println!("Creating sample data...");
    let provider = InMemoryProvider::new()
        .with_history("TREND", generate_test_history(1000, 20.0, 0.012, 1)?)
        .with_history("CHOPPY", generate_test_history(1000, 45.0, 0.025, 2)?)
        .with_fundamentals("TREND", Fundamentals::with_price_to_book(0.85));

    let engine = ForecastEngine::new(provider, EngineConfig::default())?;

    for (label, horizon) in HORIZON_PRESETS {
        println!("\nHorizon: {} ({} rows)", label, horizon);
        for outcome in engine.analyze_batch(&["TREND", "CHOPPY"], horizon) {
            match outcome.result() {
                Some(res) => println!(
                    "{:<8} {:>8.2} -> {:>8.2} [{:.2}, {:.2}] {:>6.1}%  {}",
                    outcome.symbol,
                    res.current_price,
                    res.target_price,
                    res.interval.low,
                    res.interval.high,
                    res.variation_pct(),
                    res.signal.recommendation
                ),
                None => println!("{:<8} unavailable", outcome.symbol),
            }
        }
    }

    // The cache holds the last successful result per symbol
    println!("\nCached symbols: {:?}", engine.cached_symbols());
    if let Some(res) = engine.get_cached("TREND") {
        println!(
            "TREND as of {}: {} ({})",
            res.as_of, res.signal.recommendation, res.signal.rationale
        );
    }

    Ok(())
}
