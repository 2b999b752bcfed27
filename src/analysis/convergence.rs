use serde::{Deserialize, Serialize};

use crate::models::MarketRecord;

/// Entry thresholds reported in the cross-sectional touch table.
pub const TOUCH_THRESHOLDS: [f64; 5] = [0.90, 0.92, 0.95, 0.97, 0.98];

/// One tick of an eventual winner's history, keyed by time remaining
/// until the market's final observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    pub date: String,
    pub hours_before_close: f64,
    pub price: f64,
}

/// Price trajectory of each market's eventual winner as a function of
/// hours remaining, pooled across all markets with a known winner.
pub fn winner_convergence(markets: &[MarketRecord]) -> Vec<ConvergencePoint> {
    let mut points = Vec::new();
    for market in markets {
        let winner = match market.winner() {
            Some(w) => w,
            None => continue,
        };
        let series = match market.buckets.get(winner) {
            Some(s) if !s.is_empty() => s,
            _ => continue,
        };
        let history = series.sorted_history();
        let last_ts = history[history.len() - 1].t;
        for p in &history {
            points.push(ConvergencePoint {
                date: market.date.clone(),
                hours_before_close: (last_ts - p.t) as f64 / 3600.0,
                price: p.p,
            });
        }
    }
    points
}

/// One row of the cross-sectional win-rate-by-threshold table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchRate {
    pub threshold: f64,
    pub touched: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub expected_value: f64,
}

/// For each threshold: of all buckets (winners and losers alike, thin
/// series excluded) that ever touched it, the fraction that resolved as
/// the winner. Thresholds no bucket touched produce no row.
///
/// This ignores crossing order and stop-losses, so it is not comparable
/// to the path-dependent backtest and is reported separately.
pub fn touch_win_rates(markets: &[MarketRecord], thresholds: &[f64]) -> Vec<TouchRate> {
    thresholds
        .iter()
        .filter_map(|&threshold| {
            let mut touched = 0usize;
            let mut wins = 0usize;
            for market in markets {
                let winner = match market.winner() {
                    Some(w) => w,
                    None => continue,
                };
                for (label, series) in &market.buckets {
                    if !series.has_min_history() {
                        continue;
                    }
                    if series.history.iter().any(|p| p.p >= threshold) {
                        touched += 1;
                        if label.as_str() == winner {
                            wins += 1;
                        }
                    }
                }
            }
            if touched == 0 {
                return None;
            }
            let win_rate = wins as f64 / touched as f64;
            Some(TouchRate {
                threshold,
                touched,
                wins,
                win_rate,
                expected_value: win_rate * (1.0 - threshold) - (1.0 - win_rate) * threshold,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{make_market, make_series, pad_series};

    #[test]
    fn convergence_hours_count_back_from_last_tick() {
        let markets = vec![make_market(
            "2025-02-01",
            &[(
                "11C",
                make_series(&[(7200, 0.90), (0, 0.50), (3600, 0.70)]),
                true,
            )],
        )];
        let points = winner_convergence(&markets);
        assert_eq!(points.len(), 3);
        // Sorted: t=0 is 2h before close, t=3600 is 1h, t=7200 is 0h.
        assert!((points[0].hours_before_close - 2.0).abs() < 1e-12);
        assert!((points[0].price - 0.50).abs() < 1e-12);
        assert!((points[2].hours_before_close - 0.0).abs() < 1e-12);
        assert_eq!(points[0].date, "2025-02-01");
    }

    #[test]
    fn convergence_skips_unresolved_markets() {
        let markets = vec![make_market(
            "2025-02-02",
            &[("11C", make_series(&[(0, 0.9)]), false)],
        )];
        assert!(winner_convergence(&markets).is_empty());
    }

    #[test]
    fn touch_table_counts_losers_that_touched() {
        let markets = vec![
            make_market(
                "2025-02-03",
                &[
                    ("10C", pad_series(&[(0, 0.96)], 0.99), true),
                    ("11C", pad_series(&[(0, 0.92)], 0.10), false),
                ],
            ),
            make_market(
                "2025-02-04",
                &[("12C", pad_series(&[(0, 0.97)], 0.99), true)],
            ),
        ];
        let rows = touch_win_rates(&markets, &[0.90, 0.95]);
        assert_eq!(rows.len(), 2);
        // At 0.90 all three buckets touched, two were winners.
        assert_eq!(rows[0].touched, 3);
        assert_eq!(rows[0].wins, 2);
        // At 0.95 the 0.92-peak loser drops out.
        assert_eq!(rows[1].touched, 2);
        assert_eq!(rows[1].wins, 2);
        assert!((rows[1].win_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn touch_table_skips_untouched_thresholds() {
        let markets = vec![make_market(
            "2025-02-05",
            &[("11C", pad_series(&[(0, 0.80)], 0.85), true)],
        )];
        let rows = touch_win_rates(&markets, &[0.90, 0.98]);
        assert!(rows.is_empty());
    }

    #[test]
    fn touch_table_excludes_thin_series() {
        let markets = vec![make_market(
            "2025-02-06",
            &[("11C", make_series(&[(0, 0.99); 9]), true)],
        )];
        assert!(touch_win_rates(&markets, &[0.90]).is_empty());
    }

    #[test]
    fn touch_expected_value_formula() {
        let markets = vec![
            make_market(
                "2025-02-07",
                &[("10C", pad_series(&[(0, 0.95)], 0.99), true)],
            ),
            make_market(
                "2025-02-08",
                &[("11C", pad_series(&[(0, 0.95)], 0.10), false)],
            ),
        ];
        let rows = touch_win_rates(&markets, &[0.95]);
        // Win rate 0.5: EV = 0.5*0.05 - 0.5*0.95.
        assert!((rows[0].expected_value - (0.5 * 0.05 - 0.5 * 0.95)).abs() < 1e-12);
    }
}
