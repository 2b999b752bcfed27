use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum number of price points for a series to count as real signal.
/// Thinner series are skipped by threshold analyses entirely.
pub const MIN_HISTORY_POINTS: usize = 10;

/// One tick of a bucket's implied-probability history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp, seconds.
    pub t: i64,
    /// Market-implied probability in [0, 1].
    pub p: f64,
}

/// Price history of one candidate outcome within a market.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketSeries {
    #[serde(default)]
    pub history: Vec<PricePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_to: Option<String>,
}

impl BucketSeries {
    pub fn new(history: Vec<PricePoint>) -> Self {
        Self {
            history,
            resolved_to: None,
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn is_winner(&self) -> bool {
        matches!(self.resolved_to.as_deref(), Some("YES"))
    }

    pub fn has_min_history(&self) -> bool {
        self.history.len() >= MIN_HISTORY_POINTS
    }

    /// History sorted by timestamp. The sort is stable, so points sharing
    /// a timestamp keep their ingestion order; no deduplication.
    pub fn sorted_history(&self) -> Vec<PricePoint> {
        let mut points = self.history.clone();
        points.sort_by_key(|p| p.t);
        points
    }
}

/// One resolved (or still-open) market: a calendar date, a title, and the
/// price history of every temperature bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRecord {
    pub date: String,
    pub title: String,
    pub buckets: BTreeMap<String, BucketSeries>,
}

impl MarketRecord {
    /// Label of the bucket that resolved YES, if the market has one.
    /// Markets without a winner are excluded from every analysis that
    /// needs a known outcome.
    pub fn winner(&self) -> Option<&str> {
        self.buckets
            .iter()
            .find(|(_, bucket)| bucket.is_winner())
            .map(|(label, _)| label.as_str())
    }

    pub fn total_points(&self) -> usize {
        self.buckets.values().map(|b| b.history.len()).sum()
    }
}
