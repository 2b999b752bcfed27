use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use london_edge::analysis::{
    run_backtest, threshold_sweep, touch_win_rates, winner_convergence, ConvergencePoint,
    TOUCH_THRESHOLDS,
};
use london_edge::config::Config;
use london_edge::dataset;
use london_edge::report::AnalysisReport;
use london_edge::simulation::BankrollSimulator;

fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // Optional data dir override from the CLI
    let args: Vec<String> = std::env::args().collect();
    let data_dir = args.get(1).cloned().unwrap_or_else(|| cfg.data_dir.clone());

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║      LONDON TEMPERATURE MARKETS — EDGE ANALYZER          ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Entry:      {:.0}%                                       ║", cfg.entry_threshold * 100.0);
    println!("║  Stop:       {:.0}%                                       ║", cfg.stop_threshold * 100.0);
    println!("║  Bet:        {:.0}% of bankroll                           ║", cfg.bet_fraction * 100.0);
    println!("║  Simulation: {} paths x {} trades                  ║", cfg.n_paths, cfg.n_trades);
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let markets = dataset::load_markets(Path::new(&data_dir))?;
    if markets.is_empty() {
        println!("No historical market data found in {data_dir}.");
        println!("Expected one JSON file per market (date, title, buckets).");
        return Ok(());
    }

    let resolved_count = markets.iter().filter(|m| m.winner().is_some()).count();

    let backtest = run_backtest(&markets, &cfg.thresholds())?;
    let sweep = threshold_sweep(&markets, &TOUCH_THRESHOLDS, cfg.stop_threshold)?;
    let touch_rates = touch_win_rates(&markets, &TOUCH_THRESHOLDS);
    let convergence = winner_convergence(&markets);

    // The simulator consumes the backtest's empirical distribution; with
    // no qualifying trades there is nothing to parameterize it with.
    let simulation = match backtest.probabilities() {
        Ok(probs) => Some(BankrollSimulator::new(cfg.simulation()).simulate(&probs, &backtest.payouts())?),
        Err(e) => {
            warn!("skipping simulation: {e}");
            None
        }
    };

    let report = AnalysisReport {
        generated_at: Utc::now(),
        market_count: markets.len(),
        resolved_count,
        summaries: dataset::summarize(&markets),
        backtest,
        sweep,
        touch_rates,
        convergence_points: convergence.len(),
        simulation,
    };
    report.print_summary();

    let csv_file = format!("data/convergence_{}.csv", report.generated_at.format("%Y%m%d"));
    std::fs::create_dir_all("data")?;
    save_convergence_csv(&convergence, &csv_file)?;
    println!("\nConvergence points saved to: {csv_file}");

    Ok(())
}

fn save_convergence_csv(points: &[ConvergencePoint], path: &str) -> Result<()> {
    use std::io::Write;

    let mut f = std::fs::File::create(path)?;
    writeln!(f, "date,hours_before_close,price")?;
    for point in points {
        writeln!(
            f,
            "{},{:.4},{:.4}",
            point.date, point.hours_before_close, point.price
        )?;
    }

    Ok(())
}
