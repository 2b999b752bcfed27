use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AnalysisError;

/// Result of evaluating one bucket series against an entry/stop
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeOutcome {
    /// The entry threshold was never reached; the trade is never taken
    /// and contributes nothing downstream.
    NoEntry,
    Win,
    StoppedOut,
    LossAtResolution,
}

impl fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeOutcome::NoEntry => write!(f, "no_entry"),
            TradeOutcome::Win => write!(f, "win"),
            TradeOutcome::StoppedOut => write!(f, "stopped_out"),
            TradeOutcome::LossAtResolution => write!(f, "loss_at_resolution"),
        }
    }
}

/// Entry/stop configuration for one backtest run.
///
/// A `stop_threshold` of 0.0 disables the stop check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdParams {
    pub entry_threshold: f64,
    pub stop_threshold: f64,
}

impl ThresholdParams {
    pub fn new(entry_threshold: f64, stop_threshold: f64) -> Self {
        Self {
            entry_threshold,
            stop_threshold,
        }
    }

    pub fn without_stop(entry_threshold: f64) -> Self {
        Self::new(entry_threshold, 0.0)
    }

    pub fn stop_enabled(&self) -> bool {
        self.stop_threshold > 0.0
    }

    /// Rejects out-of-range thresholds before any computation begins.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.entry_threshold > 0.0 && self.entry_threshold <= 1.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "entry threshold {} must be in (0, 1]",
                self.entry_threshold
            )));
        }
        if !(0.0..1.0).contains(&self.stop_threshold) {
            return Err(AnalysisError::InvalidParameter(format!(
                "stop threshold {} must be in [0, 1)",
                self.stop_threshold
            )));
        }
        if self.stop_enabled() && self.stop_threshold >= self.entry_threshold {
            return Err(AnalysisError::InvalidParameter(format!(
                "stop threshold {} must be below entry threshold {}",
                self.stop_threshold, self.entry_threshold
            )));
        }
        Ok(())
    }
}

/// Per-unit payout magnitudes implied by a threshold pair: a bet priced
/// at the entry threshold pays 1 on win, loses the entry-to-stop gap on a
/// stop-out, and loses the full entry price at resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradePayouts {
    pub profit_on_win: f64,
    pub loss_on_stop: f64,
    pub loss_on_full: f64,
}

impl TradePayouts {
    pub fn from_params(params: &ThresholdParams) -> Self {
        let entry = params.entry_threshold;
        Self {
            profit_on_win: 1.0 - entry,
            loss_on_stop: if params.stop_enabled() {
                entry - params.stop_threshold
            } else {
                entry
            },
            loss_on_full: entry,
        }
    }
}

/// Empirical outcome distribution of a trade, as fractions summing to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbs {
    pub p_win: f64,
    pub p_stopped: f64,
    pub p_full: f64,
}

impl OutcomeProbs {
    pub fn new(p_win: f64, p_stopped: f64, p_full: f64) -> Self {
        Self {
            p_win,
            p_stopped,
            p_full,
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (name, p) in [
            ("p_win", self.p_win),
            ("p_stopped", self.p_stopped),
            ("p_full", self.p_full),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(AnalysisError::InvalidParameter(format!(
                    "{name} {p} must be in [0, 1]"
                )));
            }
        }
        let sum = self.p_win + self.p_stopped + self.p_full;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(AnalysisError::InvalidParameter(format!(
                "outcome probabilities sum to {sum}, expected 1"
            )));
        }
        Ok(())
    }

    /// Average profit/loss per unit staked under this distribution.
    pub fn expected_value(&self, payouts: &TradePayouts) -> f64 {
        self.p_win * payouts.profit_on_win
            - self.p_stopped * payouts.loss_on_stop
            - self.p_full * payouts.loss_on_full
    }
}
