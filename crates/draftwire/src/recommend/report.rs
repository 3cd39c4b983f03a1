// Serializable report shapes returned to callers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::availability::{Availability, AvailabilityFilter};
use crate::analysis::fixtures::{FixtureContext, RankedFixture};
use crate::player::{EntryId, Gameweek, PlayerId};
use crate::valuation::scoring::ScoreComponents;
use crate::valuation::targets::{RiskLevel, WaiverTarget};

pub const SCORING_FORMULA: &str = "weighted_score = w_fix*fixture_norm + w_form*form_norm + \
     w_total*total_norm + w_xg*xg_norm (each norm is min-max across the candidate pool)";

/// Fixed explanatory notes, with the configured minutes thresholds filled in.
pub fn report_notes(filter: &AvailabilityFilter) -> Vec<String> {
    vec![
        "Uses unrostered pool only, status=available (status 'a').".to_string(),
        if filter.last3_required == 3 {
            format!(
                "Eligibility: 60+ mins in each of last 3 GWs OR 60+ mins in at least {} GWs this season.",
                filter.season_required
            )
        } else {
            format!(
                "Eligibility: 60+ mins in at least {} of last 3 GWs OR 60+ mins in at least {} GWs this season.",
                filter.last3_required, filter.season_required
            )
        },
        "Fixture score uses opponent points conceded by position, split home/away, \
         blended season and recent horizon."
            .to_string(),
    ]
}

// ---------------------------------------------------------------------------
// Waiver report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropRecommendation {
    pub element: PlayerId,
    pub name: String,
    pub team: String,
    pub position_type: u32,
    pub score: ScoreComponents,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddRecommendation {
    pub element: PlayerId,
    pub name: String,
    pub team: String,
    pub position_type: u32,
    /// First fixture in the target gameweek.
    pub fixture: FixtureContext,
    /// Every target-gameweek fixture when the team plays more than once.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub double_gameweek: Vec<FixtureContext>,
    pub availability: Availability,
    pub score: ScoreComponents,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub previous_owners: Vec<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub previous_owner_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_drop: Option<DropRecommendation>,
    pub reasons: Vec<String>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaiverReport {
    pub league_id: u32,
    pub entry_id: EntryId,
    pub as_of_gw: Gameweek,
    pub target_gw: Gameweek,
    pub horizon: u32,
    pub weight_fixtures: f64,
    pub weight_form: f64,
    pub weight_total_points: f64,
    pub weight_xg: f64,
    pub fixture_season_weight: f64,
    pub fixture_recent_weight: f64,
    pub scoring_formula: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_position: Option<u32>,
    pub target_type: String,
    pub consistency_k: f64,
    pub filters: AvailabilityFilter,
    pub top_adds: Vec<AddRecommendation>,
    pub drop_candidates: Vec<DropRecommendation>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub drop_candidates_by_position: BTreeMap<String, Vec<DropRecommendation>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Side reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetsReport {
    pub league_id: u32,
    pub as_of_gw: Gameweek,
    pub horizon: u32,
    pub risk_level: RiskLevel,
    pub targets: Vec<WaiverTarget>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FixtureReport {
    pub as_of_gw: Gameweek,
    pub target_gw: Gameweek,
    pub horizon: u32,
    pub fixture_season_weight: f64,
    pub fixture_recent_weight: f64,
    pub positions: BTreeMap<&'static str, Vec<RankedFixture>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_carry_thresholds() {
        let notes = report_notes(&AvailabilityFilter::default());
        assert_eq!(notes.len(), 3);
        assert_eq!(
            notes[1],
            "Eligibility: 60+ mins in each of last 3 GWs OR 60+ mins in at least 10 GWs this season."
        );
        let loose = report_notes(&AvailabilityFilter {
            last3_required: 2,
            season_required: 8,
        });
        assert!(loose[1].contains("at least 2 of last 3 GWs"));
        assert!(SCORING_FORMULA.starts_with("weighted_score = w_fix*fixture_norm"));
        assert!(SCORING_FORMULA.contains("w_total*total_norm + w_xg*xg_norm (each norm"));
    }
}
