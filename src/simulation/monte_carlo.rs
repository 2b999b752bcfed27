use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::AnalysisError;
use crate::models::{OutcomeProbs, TradePayouts};

/// Terminal bankrolls below this fraction of the initial count as ruin.
const RUIN_FRACTION: f64 = 0.1;

/// Configuration for a bankroll simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of independent simulated paths.
    pub n_paths: usize,
    /// Sequential trades per path.
    pub n_trades: usize,
    pub initial_bankroll: f64,
    /// Fraction of the current bankroll staked on each trade; the bet is
    /// recomputed every trade (compounding, not fixed-unit).
    pub bet_fraction: f64,
    /// Number of full per-trade trajectories retained for visualization.
    /// Sampling never affects the statistics, which cover all paths.
    pub sample_paths: usize,
    /// Optional seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_paths: 5_000,
            n_trades: 100,
            initial_bankroll: 1_000.0,
            bet_fraction: 0.20,
            sample_paths: 50,
            seed: None,
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn new(n_paths: usize, n_trades: usize, initial_bankroll: f64) -> Self {
        Self {
            n_paths,
            n_trades,
            initial_bankroll,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_bet_fraction(mut self, bet_fraction: f64) -> Self {
        self.bet_fraction = bet_fraction;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_sample_paths(mut self, sample_paths: usize) -> Self {
        self.sample_paths = sample_paths;
        self
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        if self.n_paths == 0 || self.n_trades == 0 {
            return Err(AnalysisError::InvalidParameter(
                "path and trade counts must be positive".to_string(),
            ));
        }
        if !(self.bet_fraction > 0.0 && self.bet_fraction < 1.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "bet fraction {} must be in (0, 1)",
                self.bet_fraction
            )));
        }
        if self.initial_bankroll <= 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "initial bankroll {} must be positive",
                self.initial_bankroll
            )));
        }
        Ok(())
    }
}

struct PathOutcome {
    terminal: f64,
    trajectory: Option<Vec<f64>>,
}

/// Monte Carlo simulator of compounding fixed-fraction bankroll paths
/// under an empirical three-way outcome distribution.
pub struct BankrollSimulator {
    config: SimulationConfig,
}

impl BankrollSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate all paths and aggregate. With a fixed seed the terminal
    /// bankroll sequence is identical across runs and thread schedules.
    pub fn simulate(
        &self,
        probs: &OutcomeProbs,
        payouts: &TradePayouts,
    ) -> Result<SimulationResult, AnalysisError> {
        self.config.validate()?;
        probs.validate()?;
        let outcomes = self.run_paths(probs, payouts, self.master_seed(), None);
        Ok(SimulationResult::from_outcomes(&self.config, outcomes))
    }

    /// Like [`simulate`](Self::simulate), but checks `cancel` as paths are
    /// dispatched; when the flag is raised mid-run the partial results are
    /// discarded and `Ok(None)` is returned.
    pub fn simulate_cancellable(
        &self,
        probs: &OutcomeProbs,
        payouts: &TradePayouts,
        cancel: &AtomicBool,
    ) -> Result<Option<SimulationResult>, AnalysisError> {
        self.config.validate()?;
        probs.validate()?;
        let outcomes = self.run_paths(probs, payouts, self.master_seed(), Some(cancel));
        if cancel.load(Ordering::Relaxed) {
            return Ok(None);
        }
        Ok(Some(SimulationResult::from_outcomes(&self.config, outcomes)))
    }

    fn master_seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(rand::random)
    }

    fn run_paths(
        &self,
        probs: &OutcomeProbs,
        payouts: &TradePayouts,
        master_seed: u64,
        cancel: Option<&AtomicBool>,
    ) -> Vec<PathOutcome> {
        (0..self.config.n_paths)
            .into_par_iter()
            .map(|i| {
                if let Some(flag) = cancel {
                    if flag.load(Ordering::Relaxed) {
                        // Caller discards everything once the flag is set.
                        return PathOutcome {
                            terminal: self.config.initial_bankroll,
                            trajectory: None,
                        };
                    }
                }
                // Each path draws from its own stream keyed off the master
                // seed, so results do not depend on worker scheduling.
                let mut rng = ChaCha8Rng::seed_from_u64(master_seed.wrapping_add(i as u64));
                let path = self.simulate_path(probs, payouts, &mut rng);
                PathOutcome {
                    terminal: *path.last().unwrap_or(&self.config.initial_bankroll),
                    trajectory: (i < self.config.sample_paths).then_some(path),
                }
            })
            .collect()
    }

    /// One path: the bankroll after each trade, starting at the initial
    /// value. Ruin is absorbing; the path ends early at zero.
    fn simulate_path(
        &self,
        probs: &OutcomeProbs,
        payouts: &TradePayouts,
        rng: &mut ChaCha8Rng,
    ) -> Vec<f64> {
        let mut bankroll = self.config.initial_bankroll;
        let mut path = Vec::with_capacity(self.config.n_trades + 1);
        path.push(bankroll);

        for _ in 0..self.config.n_trades {
            let bet = bankroll * self.config.bet_fraction;
            let draw = rng.gen::<f64>();

            if draw < probs.p_win {
                bankroll += bet * payouts.profit_on_win;
            } else if draw < probs.p_win + probs.p_stopped {
                bankroll -= bet * payouts.loss_on_stop;
            } else {
                bankroll -= bet * payouts.loss_on_full;
            }

            bankroll = bankroll.max(0.0);
            path.push(bankroll);
            if bankroll <= 0.0 {
                break;
            }
        }

        path
    }
}

/// Distribution of terminal bankrolls plus a bounded sample of full
/// trajectories for charting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub terminal_bankrolls: Vec<f64>,
    pub sampled_paths: Vec<Vec<f64>>,
    pub median: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Fraction of paths ending above the initial bankroll.
    pub prob_profit: f64,
    /// Fraction of paths ending at or above twice the initial bankroll.
    pub prob_double: f64,
    /// Fraction of paths ending below 10% of the initial bankroll.
    pub prob_ruin: f64,
    pub n_paths: usize,
    pub n_trades: usize,
}

impl SimulationResult {
    fn from_outcomes(config: &SimulationConfig, outcomes: Vec<PathOutcome>) -> Self {
        let mut terminals = Vec::with_capacity(outcomes.len());
        let mut sampled = Vec::new();
        for outcome in outcomes {
            terminals.push(outcome.terminal);
            if let Some(path) = outcome.trajectory {
                sampled.push(path);
            }
        }

        let n = terminals.len() as f64;
        let initial = config.initial_bankroll;

        let mut sorted = terminals.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = if sorted.len() % 2 == 1 {
            sorted[sorted.len() / 2]
        } else {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
        };

        let mean = terminals.iter().sum::<f64>() / n;
        let prob_profit = terminals.iter().filter(|&&t| t > initial).count() as f64 / n;
        let prob_double = terminals.iter().filter(|&&t| t >= initial * 2.0).count() as f64 / n;
        let prob_ruin =
            terminals.iter().filter(|&&t| t < initial * RUIN_FRACTION).count() as f64 / n;

        Self {
            median,
            mean,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            prob_profit,
            prob_double,
            prob_ruin,
            n_paths: config.n_paths,
            n_trades: config.n_trades,
            terminal_bankrolls: terminals,
            sampled_paths: sampled,
        }
    }
}
