// Risk-filtered waiver targets: unowned players ranked by minutes-adjusted
// form.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::analysis::form::{player_form, PlayerForm};
use crate::player::{Gameweek, PlayerId, PlayerInfo};
use crate::snapshot::{Bootstrap, LiveHistory};

/// Maximum number of targets returned.
pub const MAX_TARGETS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    /// Parse a risk level name. Unknown names fall back to medium.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "med" | "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            _ => RiskLevel::Medium,
        }
    }

    /// Highest tolerated risk score (share of minutes missed).
    pub fn threshold(&self) -> f64 {
        match self {
            RiskLevel::Low => 0.3,
            RiskLevel::Medium => 0.6,
            RiskLevel::High => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaiverTarget {
    pub element: PlayerId,
    pub name: String,
    pub team: String,
    pub position_type: u32,
    pub minutes: i64,
    pub points: i64,
    pub points_per_gw: f64,
    pub risk_score: f64,
    pub score: f64,
}

/// Unowned players whose risk is within `risk`, scored by
/// `points_per_gw * minutes_pct`, best first.
pub fn waiver_targets(
    bootstrap: &Bootstrap,
    owned: &BTreeSet<PlayerId>,
    history: &LiveHistory,
    as_of: Gameweek,
    horizon: u32,
    risk: RiskLevel,
) -> Vec<WaiverTarget> {
    let threshold = risk.threshold();
    let mut targets: Vec<WaiverTarget> = bootstrap
        .players
        .iter()
        .filter(|p| !owned.contains(&p.id))
        .filter_map(|p| {
            let form = player_form(history, p.id, as_of, horizon);
            (form.risk_score <= threshold).then(|| target(bootstrap, p, &form))
        })
        .collect();

    targets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.element.cmp(&b.element))
    });
    targets.truncate(MAX_TARGETS);
    targets
}

fn target(bootstrap: &Bootstrap, p: &PlayerInfo, form: &PlayerForm) -> WaiverTarget {
    WaiverTarget {
        element: p.id,
        name: p.name.clone(),
        team: bootstrap.team_short(p.team_id).to_string(),
        position_type: p.position.element_type(),
        minutes: form.minutes,
        points: form.points,
        points_per_gw: form.points_per_gw,
        risk_score: form.risk_score,
        score: form.points_per_gw * form.minutes_pct,
    }
}
