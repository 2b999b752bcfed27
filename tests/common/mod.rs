use std::collections::BTreeMap;

use london_edge::models::{BucketSeries, MarketRecord, PricePoint};

/// Build a bucket series from (t, p) pairs, in the given order.
pub fn make_series(points: &[(i64, f64)]) -> BucketSeries {
    BucketSeries::new(
        points
            .iter()
            .map(|&(t, p)| PricePoint { t, p })
            .collect(),
    )
}

/// Series of n hourly points ramping linearly from `start` to `end`.
pub fn make_ramp(n: usize, start: f64, end: f64) -> BucketSeries {
    let points: Vec<PricePoint> = (0..n)
        .map(|i| PricePoint {
            t: i as i64 * 3600,
            p: start + (end - start) * i as f64 / (n - 1).max(1) as f64,
        })
        .collect();
    BucketSeries::new(points)
}

/// One market from (label, series, is_winner) triples.
pub fn make_market(date: &str, buckets: &[(&str, BucketSeries, bool)]) -> MarketRecord {
    let buckets: BTreeMap<String, BucketSeries> = buckets
        .iter()
        .map(|(label, series, is_winner)| {
            let mut series = series.clone();
            series.resolved_to = is_winner.then(|| "YES".to_string());
            (label.to_string(), series)
        })
        .collect();

    MarketRecord {
        date: date.to_string(),
        title: format!("Highest temperature in London on {date}?"),
        buckets,
    }
}
