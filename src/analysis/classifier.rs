use crate::models::{BucketSeries, PricePoint, ThresholdParams, TradeOutcome};

/// Index of the first point whose price is at or above the entry
/// threshold, scanning in time-ascending order. Entry is inclusive.
pub fn entry_index(points: &[PricePoint], entry_threshold: f64) -> Option<usize> {
    points.iter().position(|p| p.p >= entry_threshold)
}

/// Classify one bucket series against an entry/stop configuration.
///
/// Returns `None` for series below the minimum-history gate: thin
/// histories are skipped outright rather than counted as `NoEntry`.
/// Input order does not matter; the history is sorted by timestamp before
/// scanning.
pub fn classify_bucket(
    series: &BucketSeries,
    is_winner: bool,
    params: &ThresholdParams,
) -> Option<TradeOutcome> {
    if !series.has_min_history() {
        return None;
    }

    let points = series.sorted_history();
    let idx = match entry_index(&points, params.entry_threshold) {
        Some(idx) => idx,
        None => return Some(TradeOutcome::NoEntry),
    };

    // The stop check is strict `<` on the post-entry minimum and runs
    // before the resolution outcome: a stopped position stays closed even
    // if the price later recovers.
    if params.stop_enabled() {
        let min_after_entry = points[idx..]
            .iter()
            .map(|p| p.p)
            .fold(f64::INFINITY, f64::min);
        if min_after_entry < params.stop_threshold {
            return Some(TradeOutcome::StoppedOut);
        }
    }

    Some(if is_winner {
        TradeOutcome::Win
    } else {
        TradeOutcome::LossAtResolution
    })
}
