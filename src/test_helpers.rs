use std::collections::BTreeMap;

use crate::models::{BucketSeries, MarketRecord, PricePoint, MIN_HISTORY_POINTS};

/// Build a bucket series from (t, p) pairs, in the given order.
pub fn make_series(points: &[(i64, f64)]) -> BucketSeries {
    BucketSeries::new(
        points
            .iter()
            .map(|&(t, p)| PricePoint { t, p })
            .collect(),
    )
}

/// Build a series from the given leading points, padded with `fill`-priced
/// points at later hourly timestamps until the minimum-history gate is
/// cleared.
pub fn pad_series(points: &[(i64, f64)], fill: f64) -> BucketSeries {
    let mut all: Vec<PricePoint> = points.iter().map(|&(t, p)| PricePoint { t, p }).collect();
    let last_t = all.iter().map(|p| p.t).max().unwrap_or(0);
    let mut t = last_t;
    while all.len() < MIN_HISTORY_POINTS {
        t += 3600;
        all.push(PricePoint { t, p: fill });
    }
    BucketSeries::new(all)
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
