use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::models::{MarketRecord, OutcomeProbs, ThresholdParams, TradeOutcome, TradePayouts};

use super::classifier::classify_bucket;

/// Tally of entered trades by outcome. `NoEntry` never lands here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub wins: usize,
    pub stopped_losses: usize,
    pub full_losses: usize,
}

impl OutcomeCounts {
    pub fn total(&self) -> usize {
        self.wins + self.stopped_losses + self.full_losses
    }

    fn record(&mut self, outcome: TradeOutcome) {
        match outcome {
            TradeOutcome::Win => self.wins += 1,
            TradeOutcome::StoppedOut => self.stopped_losses += 1,
            TradeOutcome::LossAtResolution => self.full_losses += 1,
            TradeOutcome::NoEntry => {}
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            wins: self.wins + other.wins,
            stopped_losses: self.stopped_losses + other.stopped_losses,
            full_losses: self.full_losses + other.full_losses,
        }
    }
}

/// Aggregate outcome of one (entry, stop) configuration across the whole
/// dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub params: ThresholdParams,
    pub counts: OutcomeCounts,
}

impl BacktestResult {
    pub fn total(&self) -> usize {
        self.counts.total()
    }

    pub fn win_rate(&self) -> Result<f64, AnalysisError> {
        let total = self.total();
        if total == 0 {
            return Err(AnalysisError::InsufficientData);
        }
        Ok(self.counts.wins as f64 / total as f64)
    }

    /// Empirical outcome distribution, the simulator's input.
    pub fn probabilities(&self) -> Result<OutcomeProbs, AnalysisError> {
        let total = self.total();
        if total == 0 {
            return Err(AnalysisError::InsufficientData);
        }
        let total = total as f64;
        Ok(OutcomeProbs::new(
            self.counts.wins as f64 / total,
            self.counts.stopped_losses as f64 / total,
            self.counts.full_losses as f64 / total,
        ))
    }

    pub fn payouts(&self) -> TradePayouts {
        TradePayouts::from_params(&self.params)
    }

    pub fn expected_value(&self) -> Result<f64, AnalysisError> {
        Ok(self.probabilities()?.expected_value(&self.payouts()))
    }
}

/// Run the outcome classifier over every (market, bucket) pair and sum the
/// results. Markets without a resolved winner are skipped, as are thin
/// series and buckets that never reach the entry threshold.
///
/// Markets are processed in parallel; partial counts merge by summation,
/// so repeat runs over an unchanged dataset are identical.
pub fn run_backtest(
    markets: &[MarketRecord],
    params: &ThresholdParams,
) -> Result<BacktestResult, AnalysisError> {
    params.validate()?;

    let counts = markets
        .par_iter()
        .map(|market| {
            let mut counts = OutcomeCounts::default();
            let winner = match market.winner() {
                Some(w) => w,
                None => return counts,
            };
            for (label, series) in &market.buckets {
                if let Some(outcome) = classify_bucket(series, label.as_str() == winner, params) {
                    counts.record(outcome);
                }
            }
            counts
        })
        .reduce(OutcomeCounts::default, OutcomeCounts::merge);

    Ok(BacktestResult {
        params: *params,
        counts,
    })
}

/// Independent backtests across several entry thresholds with a common
/// stop, for a threshold-sensitivity table.
pub fn threshold_sweep(
    markets: &[MarketRecord],
    entry_thresholds: &[f64],
    stop_threshold: f64,
) -> Result<Vec<BacktestResult>, AnalysisError> {
    entry_thresholds
        .iter()
        .map(|&entry| run_backtest(markets, &ThresholdParams::new(entry, stop_threshold)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{make_market, make_series, pad_series};

    fn sample_markets() -> Vec<MarketRecord> {
        vec![
            // Winner enters at 0.96 and holds: Win.
            make_market(
                "2025-01-01",
                &[
                    ("11C", pad_series(&[(0, 0.80), (1, 0.96)], 0.99), true),
                    ("12C", pad_series(&[(0, 0.20)], 0.05), false),
                ],
            ),
            // Winner dips below the stop after entry: StoppedOut.
            make_market(
                "2025-01-02",
                &[
                    ("10C", pad_series(&[(0, 0.96), (1, 0.40)], 0.99), true),
                    ("11C", pad_series(&[(0, 0.30)], 0.10), false),
                ],
            ),
            // A loser touches the entry and holds above the stop:
            // LossAtResolution; the winner never reaches entry: NoEntry.
            make_market(
                "2025-01-03",
                &[
                    ("12C", pad_series(&[(0, 0.97)], 0.60), false),
                    ("13C", pad_series(&[(0, 0.55)], 0.80), true),
                ],
            ),
        ]
    }

    #[test]
    fn counts_add_up_and_win_rate_in_range() {
        let markets = sample_markets();
        let result = run_backtest(&markets, &ThresholdParams::new(0.95, 0.50)).unwrap();
        assert_eq!(result.counts.wins, 1);
        assert_eq!(result.counts.stopped_losses, 1);
        assert_eq!(result.counts.full_losses, 1);
        assert_eq!(result.total(), 3);
        let wr = result.win_rate().unwrap();
        assert!((0.0..=1.0).contains(&wr));
        assert!((wr - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn markets_without_winner_are_skipped() {
        let markets = vec![make_market(
            "2025-01-04",
            &[("11C", pad_series(&[(0, 0.99)], 0.99), false)],
        )];
        let result = run_backtest(&markets, &ThresholdParams::new(0.95, 0.0)).unwrap();
        assert_eq!(result.total(), 0);
        assert_eq!(result.win_rate(), Err(AnalysisError::InsufficientData));
        assert_eq!(result.expected_value(), Err(AnalysisError::InsufficientData));
    }

    #[test]
    fn thin_series_contribute_nothing() {
        let markets = vec![make_market(
            "2025-01-05",
            &[
                ("11C", make_series(&[(0, 0.99); 9]), true),
                ("12C", make_series(&[(0, 0.99); 9]), false),
            ],
        )];
        let result = run_backtest(&markets, &ThresholdParams::new(0.95, 0.0)).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn no_entry_series_contribute_nothing() {
        let markets = vec![make_market(
            "2025-01-06",
            &[("11C", pad_series(&[(0, 0.50)], 0.80), true)],
        )];
        let result = run_backtest(&markets, &ThresholdParams::new(0.95, 0.0)).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn rerun_on_unchanged_dataset_is_identical() {
        let markets = sample_markets();
        let params = ThresholdParams::new(0.95, 0.50);
        let first = run_backtest(&markets, &params).unwrap();
        let second = run_backtest(&markets, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_params_rejected_before_computation() {
        let markets = sample_markets();
        assert!(matches!(
            run_backtest(&markets, &ThresholdParams::new(0.90, 0.95)),
            Err(AnalysisError::InvalidParameter(_))
        ));
        assert!(matches!(
            run_backtest(&markets, &ThresholdParams::new(1.5, 0.0)),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }

    #[test]
    fn probabilities_sum_to_one() {
        let markets = sample_markets();
        let result = run_backtest(&markets, &ThresholdParams::new(0.95, 0.50)).unwrap();
        let probs = result.probabilities().unwrap();
        assert!(probs.validate().is_ok());
    }

    #[test]
    fn expected_value_uses_empirical_fractions() {
        let markets = sample_markets();
        let result = run_backtest(&markets, &ThresholdParams::new(0.95, 0.50)).unwrap();
        // One of each outcome: EV = (0.05 - 0.45 - 0.95) / 3 per unit.
        let expected = (0.05 - 0.45 - 0.95) / 3.0;
        assert!((result.expected_value().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn sweep_returns_one_result_per_threshold() {
        let markets = sample_markets();
        let sweep = threshold_sweep(&markets, &[0.90, 0.95, 0.98], 0.50).unwrap();
        assert_eq!(sweep.len(), 3);
        assert!((sweep[1].params.entry_threshold - 0.95).abs() < 1e-12);
        // Sweep rows match standalone runs: no state leaks across runs.
        let standalone = run_backtest(&markets, &ThresholdParams::new(0.95, 0.50)).unwrap();
        assert_eq!(sweep[1], standalone);
    }
}
