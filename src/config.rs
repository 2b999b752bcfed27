use serde::{Deserialize, Serialize};

use crate::models::ThresholdParams;
use crate::simulation::SimulationConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Data
    pub data_dir: String,

    // Strategy thresholds
    pub entry_threshold: f64,
    pub stop_threshold: f64,

    // Simulation
    pub bet_fraction: f64,
    pub n_trades: usize,
    pub n_paths: usize,
    pub initial_bankroll: f64,
    pub seed: Option<u64>,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            data_dir: env("MARKET_DATA_DIR", "data/historical_prices"),
            entry_threshold: env("ENTRY_THRESHOLD", "0.97").parse().unwrap_or(0.97),
            stop_threshold: env("STOP_THRESHOLD", "0.50").parse().unwrap_or(0.50),
            bet_fraction: env("BET_FRACTION", "0.20").parse().unwrap_or(0.20),
            n_trades: env("SIM_TRADES", "100").parse().unwrap_or(100),
            n_paths: env("SIM_PATHS", "5000").parse().unwrap_or(5000),
            initial_bankroll: env("INITIAL_BANKROLL", "1000").parse().unwrap_or(1000.0),
            seed: std::env::var("SIM_SEED").ok().and_then(|s| s.parse().ok()),
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }

    pub fn thresholds(&self) -> ThresholdParams {
        ThresholdParams::new(self.entry_threshold, self.stop_threshold)
    }

    pub fn simulation(&self) -> SimulationConfig {
        let config = SimulationConfig::new(self.n_paths, self.n_trades, self.initial_bankroll)
            .with_bet_fraction(self.bet_fraction);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}
