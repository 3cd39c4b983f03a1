// Drop selection per position and add recommendation assembly.

use std::collections::{BTreeMap, BTreeSet};

use crate::player::{EntryId, PlayerId, Position, TeamId};
use crate::snapshot::LeagueDetails;
use crate::valuation::scoring::ScoredCandidate;

use super::report::{AddRecommendation, DropRecommendation};

pub const DROP_REASON: &str = "Lowest weighted score at position";

const NO_DROPPABLE_PLAYERS: &str =
    "All players are undroppable. Make someone droppable if you want recommendations.";
const GK_DROP_SUPPRESSED: &str = "No better GK add available; GK drops omitted.";

fn team_short(teams: &BTreeMap<TeamId, String>, team: TeamId) -> String {
    teams.get(&team).cloned().unwrap_or_default()
}

fn drop_recommendation(c: &ScoredCandidate, teams: &BTreeMap<TeamId, String>) -> DropRecommendation {
    let p = &c.signal.player;
    DropRecommendation {
        element: p.id,
        name: p.name.clone(),
        team: team_short(teams, p.team_id),
        position_type: p.position.element_type(),
        score: c.score,
        reason: DROP_REASON.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Drop plan
// ---------------------------------------------------------------------------

/// At most one drop pick per position, plus the warnings produced while
/// choosing them.
#[derive(Debug, Clone, Default)]
pub struct DropPlan {
    picks: BTreeMap<Position, DropRecommendation>,
    pub warnings: Vec<String>,
}

impl DropPlan {
    /// Choose the weakest droppable roster player at every position.
    ///
    /// `roster` must be scored on the candidate pool's scale. A goalkeeper
    /// pick survives only when some goalkeeper in `adds` outscores it.
    /// Position warnings are limited to `target` when one is set.
    pub fn build(
        roster: &[ScoredCandidate],
        undroppable: &BTreeSet<PlayerId>,
        adds: &[ScoredCandidate],
        target: Option<Position>,
        teams: &BTreeMap<TeamId, String>,
    ) -> Self {
        let mut plan = Self::default();
        let mut total_droppable = 0usize;
        let warn_for = |pos: Position| target.is_none() || target == Some(pos);

        for pos in Position::ALL {
            let mut droppable: Vec<&ScoredCandidate> = roster
                .iter()
                .filter(|c| c.signal.player.position == pos && !undroppable.contains(&c.id()))
                .collect();

            if droppable.is_empty() {
                if warn_for(pos) {
                    plan.warnings.push(format!(
                        "All {} are undroppable. Make someone droppable if you want recommendations for this position.",
                        pos.plural()
                    ));
                }
                continue;
            }
            total_droppable += droppable.len();

            droppable.sort_by(|a, b| {
                a.weighted_score()
                    .total_cmp(&b.weighted_score())
                    .then_with(|| a.id().cmp(&b.id()))
            });
            let pick = droppable[0];

            if pos == Position::Goalkeeper {
                let best_add = adds
                    .iter()
                    .filter(|a| a.signal.player.position == pos)
                    .map(ScoredCandidate::weighted_score)
                    .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))));
                if !best_add.is_some_and(|best| best > pick.weighted_score()) {
                    if warn_for(pos) {
                        plan.warnings.push(GK_DROP_SUPPRESSED.to_string());
                    }
                    continue;
                }
            }

            plan.picks.insert(pos, drop_recommendation(pick, teams));
        }

        if total_droppable == 0 {
            plan.warnings.push(NO_DROPPABLE_PLAYERS.to_string());
        }
        plan
    }

    /// Picks in position order (GK, DEF, MID, FWD).
    pub fn flattened(&self) -> Vec<DropRecommendation> {
        self.picks.values().cloned().collect()
    }

    /// Picks keyed by position label.
    pub fn by_position(&self) -> BTreeMap<String, Vec<DropRecommendation>> {
        self.picks
            .iter()
            .map(|(pos, d)| (pos.label().to_string(), vec![d.clone()]))
            .collect()
    }

    /// The drop to pair with an add at `position`, if the add strictly
    /// outscores it.
    pub fn suggested_drop(&self, position: Position, add_score: f64) -> Option<DropRecommendation> {
        self.picks
            .get(&position)
            .filter(|d| add_score > d.score.weighted_score)
            .cloned()
    }
}

// ---------------------------------------------------------------------------
// Adds
// ---------------------------------------------------------------------------

/// Short human-readable reasons for recommending an add.
pub fn add_reasons(c: &ScoredCandidate) -> Vec<String> {
    let opponents = c
        .signal
        .fixtures
        .iter()
        .map(|f| format!("{} ({})", f.opponent_short, f.venue.label()))
        .collect::<Vec<_>>()
        .join(" + ");
    vec![
        format!("fixture score {:.2} vs {}", c.score.fixtures_raw, opponents),
        format!("form {:.2} pts/GW", c.score.form_raw),
        format!("season points {:.0}", c.score.total_raw),
        format!("xG {:.2}", c.score.xg_raw),
    ]
}

/// Names of every entry that has ever held `player`, non-empty and sorted.
pub fn previous_owner_names(
    ever: &BTreeMap<PlayerId, BTreeSet<EntryId>>,
    details: &LeagueDetails,
    player: PlayerId,
) -> Vec<String> {
    let mut names: Vec<String> = ever
        .get(&player)
        .into_iter()
        .flatten()
        .filter_map(|entry| details.entry_name(*entry))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

/// Build the add recommendation for one ranked candidate. Returns `None`
/// for a candidate with no target-gameweek fixture.
pub fn add_recommendation(
    c: &ScoredCandidate,
    plan: &DropPlan,
    previous_owners: Vec<String>,
    teams: &BTreeMap<TeamId, String>,
) -> Option<AddRecommendation> {
    let p = &c.signal.player;
    let fixture = c.signal.fixtures.first()?.clone();
    let double_gameweek = if c.signal.fixtures.len() > 1 {
        c.signal.fixtures.clone()
    } else {
        Vec::new()
    };
    Some(AddRecommendation {
        element: p.id,
        name: p.name.clone(),
        team: team_short(teams, p.team_id),
        position_type: p.position.element_type(),
        fixture,
        double_gameweek,
        availability: c.signal.availability,
        score: c.score,
        previous_owner_count: previous_owners.len(),
        previous_owners,
        suggested_drop: plan.suggested_drop(p.position, c.weighted_score()),
        reasons: add_reasons(c),
    })
}
