// Points consistency: mean and spread over the horizon window.

use serde::Serialize;

use super::horizon_start;
use crate::player::{Gameweek, PlayerId};
use crate::snapshot::LiveHistory;

/// Penalty applied to the standard deviation when no usable k is given.
pub const DEFAULT_CONSISTENCY_K: f64 = 0.63;

/// Mean and standard deviation for a set of values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Compute mean and population standard deviation for a slice of values.
///
/// Returns zeros for an empty slice.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    PoolStats {
        mean,
        stdev: variance.max(0.0).sqrt(),
    }
}

/// Points mean/stdev for `player` over the trailing horizon, counting only
/// gameweeks in which the player appears in the live stats.
pub fn points_spread(history: &LiveHistory, player: PlayerId, as_of: Gameweek, horizon: u32) -> PoolStats {
    let points: Vec<f64> = history
        .window(horizon_start(as_of, horizon), as_of)
        .filter_map(|(_, live)| live.get(&player))
        .map(|s| s.total_points as f64)
        .collect();
    compute_pool_stats(&points)
}

/// Resolve the user-supplied k: zero, non-finite or missing values fall
/// back to [`DEFAULT_CONSISTENCY_K`].
pub fn resolve_k(k: Option<f64>) -> f64 {
    match k {
        Some(k) if k.is_finite() && k != 0.0 => k,
        _ => DEFAULT_CONSISTENCY_K,
    }
}

/// `mean - k * stdev`.
pub fn consistency_score(spread: &PoolStats, k: f64) -> f64 {
    let score = spread.mean - k * spread.stdev;
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{GameweekLive, LiveStats};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn history(rows: &[(Gameweek, i64)]) -> LiveHistory {
        let mut h = LiveHistory::new();
        for &(gw, total_points) in rows {
            let mut live = GameweekLive::new();
            live.insert(
                7,
                LiveStats {
                    minutes: 90,
                    total_points,
                    expected_goals: 0.0,
                },
            );
            h.insert(gw, live);
        }
        h
    }

    #[test]
    fn pool_stats_population_stdev() {
        let stats = compute_pool_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(approx_eq(stats.mean, 5.0, 1e-9));
        assert!(approx_eq(stats.stdev, 2.0, 1e-9));
        assert_eq!(compute_pool_stats(&[]), PoolStats::default());
    }

    #[test]
    fn absent_gameweeks_are_excluded() {
        // Played GW2 and GW4 only, scoring 6 both times; GW1, GW3 and GW5
        // exist for other players but not this one.
        let mut h = history(&[(2, 6), (4, 6)]);
        for gw in [1, 3, 5] {
            h.insert(gw, GameweekLive::new());
        }
        let spread = points_spread(&h, 7, 5, 5);
        assert!(approx_eq(spread.mean, 6.0, 1e-9));
        assert!(approx_eq(spread.stdev, 0.0, 1e-9));
    }

    #[test]
    fn spread_respects_horizon() {
        let h = history(&[(1, 20), (2, 2), (3, 4)]);
        let spread = points_spread(&h, 7, 3, 2);
        assert!(approx_eq(spread.mean, 3.0, 1e-9));
        assert!(approx_eq(spread.stdev, 1.0, 1e-9));
        assert!(approx_eq(consistency_score(&spread, 0.63), 3.0 - 0.63, 1e-9));
    }

    #[test]
    fn never_played_scores_zero() {
        let h = history(&[(1, 5)]);
        let spread = points_spread(&h, 99, 1, 5);
        assert_eq!(spread, PoolStats::default());
        assert_eq!(consistency_score(&spread, 0.63), 0.0);
    }

    #[test]
    fn k_defaults() {
        assert_eq!(resolve_k(None), DEFAULT_CONSISTENCY_K);
        assert_eq!(resolve_k(Some(0.0)), DEFAULT_CONSISTENCY_K);
        assert_eq!(resolve_k(Some(f64::NAN)), DEFAULT_CONSISTENCY_K);
        assert_eq!(resolve_k(Some(1.5)), 1.5);
    }
}
