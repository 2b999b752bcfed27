pub mod backtest;
pub mod classifier;
pub mod convergence;

pub use backtest::{run_backtest, threshold_sweep, BacktestResult, OutcomeCounts};
pub use convergence::{
    touch_win_rates, winner_convergence, ConvergencePoint, TouchRate, TOUCH_THRESHOLDS,
};
