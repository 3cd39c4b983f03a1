// Rolling form over the horizon window.

use serde::Serialize;

use super::horizon_start;
use crate::player::{Gameweek, PlayerId};
use crate::snapshot::LiveHistory;

/// Points and minutes over the trailing horizon, averaged per gameweek.
///
/// Averages divide by the horizon length rather than by appearances, so a
/// missed gameweek counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlayerForm {
    pub points: i64,
    pub minutes: i64,
    pub points_per_gw: f64,
    pub minutes_per_gw: f64,
    /// Share of the available minutes played, capped at 1.
    pub minutes_pct: f64,
    /// `1 - minutes_pct`.
    pub risk_score: f64,
}

pub fn player_form(history: &LiveHistory, player: PlayerId, as_of: Gameweek, horizon: u32) -> PlayerForm {
    if horizon == 0 {
        return PlayerForm::default();
    }
    let (points, minutes) = history
        .window(horizon_start(as_of, horizon), as_of)
        .filter_map(|(_, live)| live.get(&player))
        .fold((0i64, 0i64), |(p, m), s| (p + s.total_points, m + s.minutes));

    let h = horizon as f64;
    let minutes_pct = (minutes as f64 / (h * 90.0)).clamp(0.0, 1.0);
    PlayerForm {
        points,
        minutes,
        points_per_gw: points as f64 / h,
        minutes_per_gw: minutes as f64 / h,
        minutes_pct,
        risk_score: 1.0 - minutes_pct,
    }
}
