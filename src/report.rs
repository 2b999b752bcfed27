use chrono::{DateTime, Utc};

use crate::analysis::{BacktestResult, TouchRate};
use crate::dataset::MarketSummary;
use crate::simulation::SimulationResult;

/// Everything the analyzer binary prints or saves, assembled from the
/// core outputs. Holds no decision logic of its own.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub market_count: usize,
    pub resolved_count: usize,
    pub summaries: Vec<MarketSummary>,
    pub backtest: BacktestResult,
    pub sweep: Vec<BacktestResult>,
    pub touch_rates: Vec<TouchRate>,
    pub convergence_points: usize,
    pub simulation: Option<SimulationResult>,
}

impl AnalysisReport {
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(70));
        println!("  TEMPERATURE MARKET EDGE REPORT");
        println!("{}", "=".repeat(70));
        println!(
            "  Markets:     {} loaded / {} resolved",
            self.market_count, self.resolved_count
        );
        println!("  Convergence: {} winner price points", self.convergence_points);
        println!();

        println!("  BACKTEST (path-dependent)");
        println!("  ───────────────────────────────────");
        println!(
            "  Entry:       {:.0}%  |  Stop: {}",
            self.backtest.params.entry_threshold * 100.0,
            if self.backtest.params.stop_enabled() {
                format!("{:.0}%", self.backtest.params.stop_threshold * 100.0)
            } else {
                "disabled".to_string()
            }
        );
        println!("  {}", backtest_line(&self.backtest));
        println!();

        if !self.sweep.is_empty() {
            println!("  ENTRY THRESHOLD SWEEP");
            println!("  ───────────────────────────────────");
            for row in &self.sweep {
                println!(
                    "  {:>4.0}%: {}",
                    row.params.entry_threshold * 100.0,
                    backtest_line(row)
                );
            }
            println!();
        }

        if !self.touch_rates.is_empty() {
            println!("  TOUCH RATES (cross-sectional, no stop, order-blind)");
            println!("  ───────────────────────────────────");
            for row in &self.touch_rates {
                println!(
                    "  {:>4.0}%: {:>3}/{:<3} buckets | WR {:>5.1}% | EV ${:+.4}",
                    row.threshold * 100.0,
                    row.wins,
                    row.touched,
                    row.win_rate * 100.0,
                    row.expected_value
                );
            }
            println!();
        }

        match &self.simulation {
            Some(sim) => {
                println!(
                    "  MONTE CARLO ({} paths x {} trades)",
                    sim.n_paths, sim.n_trades
                );
                println!("  ───────────────────────────────────");
                println!("  Median:      ${:.0}", sim.median);
                println!("  Mean:        ${:.0}", sim.mean);
                println!("  Min/Max:     ${:.0} / ${:.0}", sim.min, sim.max);
                println!("  P(profit):   {:.1}%", sim.prob_profit * 100.0);
                println!("  P(double):   {:.1}%", sim.prob_double * 100.0);
                println!("  P(ruin):     {:.2}%", sim.prob_ruin * 100.0);
            }
            None => {
                println!("  MONTE CARLO: skipped (insufficient backtest data)");
            }
        }

        if !self.summaries.is_empty() {
            println!();
            println!("  MARKETS");
            println!("  ───────────────────────────────────");
            for row in &self.summaries {
                println!(
                    "  {} | {:>6} | {:.0}%-{:.0}% | {} buckets",
                    row.date,
                    row.winner,
                    row.min_price * 100.0,
                    row.max_price * 100.0,
                    row.bucket_count
                );
            }
        }

        println!("{}", "=".repeat(70));
    }
}

fn backtest_line(result: &BacktestResult) -> String {
    match result.win_rate() {
        Ok(win_rate) => {
            // expected_value shares the same non-zero total.
            let ev = result.expected_value().unwrap_or(0.0);
            format!(
                "{} trades | W {} / S {} / L {} | WR {:.1}% | EV ${:+.4}",
                result.total(),
                result.counts.wins,
                result.counts.stopped_losses,
                result.counts.full_losses,
                win_rate * 100.0,
                ev
            )
        }
        Err(_) => "insufficient data (no qualifying trades)".to_string(),
    }
}
