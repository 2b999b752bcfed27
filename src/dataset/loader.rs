use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::models::MarketRecord;

/// Load every `*.json` market file under `data_dir`, in filename order.
///
/// Files that fail to read or parse are skipped with a warning rather than
/// aborting the load; markets whose buckets hold no price points at all
/// are dropped. An empty or missing set of usable files yields an empty
/// collection — downstream analyses report insufficient data instead.
pub fn load_markets(data_dir: &Path) -> Result<Vec<MarketRecord>> {
    let entries = std::fs::read_dir(data_dir)
        .with_context(|| format!("reading market data dir {}", data_dir.display()))?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();
    paths.sort();

    let mut markets = Vec::new();
    for path in paths {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let market: MarketRecord = match serde_json::from_str(&content) {
            Ok(market) => market,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if market.total_points() == 0 {
            warn!("skipping {}: no price history", path.display());
            continue;
        }
        markets.push(market);
    }

    info!(
        "loaded {} markets from {}",
        markets.len(),
        data_dir.display()
    );
    Ok(markets)
}

/// Per-market digest of the winning bucket's price range.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSummary {
    pub date: String,
    pub winner: String,
    pub min_price: f64,
    pub max_price: f64,
    pub bucket_count: usize,
}

/// One summary row per resolved market with a non-empty winner history.
pub fn summarize(markets: &[MarketRecord]) -> Vec<MarketSummary> {
    let mut rows = Vec::new();
    for market in markets {
        let winner = match market.winner() {
            Some(w) => w,
            None => continue,
        };
        let series = match market.buckets.get(winner) {
            Some(s) if !s.is_empty() => s,
            _ => continue,
        };
        let prices = series.history.iter().map(|p| p.p);
        rows.push(MarketSummary {
            date: market.date.clone(),
            winner: winner.to_string(),
            min_price: prices.clone().fold(f64::INFINITY, f64::min),
            max_price: prices.fold(f64::NEG_INFINITY, f64::max),
            bucket_count: market.buckets.len(),
        });
    }
    rows
}
