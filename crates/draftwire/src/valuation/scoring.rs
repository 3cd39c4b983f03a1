// Weighted scoring and ranking of add candidates and rostered players.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::normalize::{RawSignals, SignalBounds};
use crate::analysis::availability::{self, Availability, AvailabilityTable};
use crate::analysis::consistency::{self, PoolStats};
use crate::analysis::fixtures::{FixtureContext, FixtureIndex, FixtureModel, FixtureScore};
use crate::analysis::form::{self, PlayerForm};
use crate::analysis::horizon_start;
use crate::player::{Gameweek, PlayerId, PlayerInfo};
use crate::snapshot::LiveHistory;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// Relative weight of each signal in the final score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub fixtures: f64,
    pub form: f64,
    pub total_points: f64,
    pub xg: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            fixtures: 0.35,
            form: 0.25,
            total_points: 0.25,
            xg: 0.15,
        }
    }
}

impl ScoringWeights {
    fn sum(&self) -> f64 {
        self.fixtures + self.form + self.total_points + self.xg
    }

    /// Weights rescaled to sum to 1.
    ///
    /// Negative and non-finite weights count as 0. If nothing is left, the
    /// defaults are used.
    pub fn normalized(&self) -> Self {
        let clamp = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let mut w = Self {
            fixtures: clamp(self.fixtures),
            form: clamp(self.form),
            total_points: clamp(self.total_points),
            xg: clamp(self.xg),
        };
        if w.sum() <= 0.0 {
            w = Self::default();
        }
        let sum = w.sum();
        Self {
            fixtures: w.fixtures / sum,
            form: w.form / sum,
            total_points: w.total_points / sum,
            xg: w.xg / sum,
        }
    }

    /// Dot product with normalized signals.
    pub fn apply(&self, norm: &RawSignals) -> f64 {
        self.fixtures * norm.fixtures
            + self.form * norm.form
            + self.total_points * norm.total_points
            + self.xg * norm.xg
    }
}

// ---------------------------------------------------------------------------
// Ranking mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    #[default]
    Overall,
    NextFixture,
    Consistency,
}

impl RankingMode {
    /// Parse a mode name. Anything unrecognised is [`RankingMode::Overall`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "next_fixture" => RankingMode::NextFixture,
            "consistency" => RankingMode::Consistency,
            _ => RankingMode::Overall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMode::Overall => "overall",
            RankingMode::NextFixture => "next_fixture",
            RankingMode::Consistency => "consistency",
        }
    }
}

// ---------------------------------------------------------------------------
// Player signals
// ---------------------------------------------------------------------------

/// Everything measured about one player for one call.
#[derive(Debug, Clone)]
pub struct PlayerSignal {
    pub player: PlayerInfo,
    /// Fixtures in the target gameweek; empty on a blank gameweek.
    pub fixtures: Vec<FixtureContext>,
    pub fixture_score: FixtureScore,
    pub form: PlayerForm,
    pub xg_per_90: f64,
    pub spread: PoolStats,
    pub consistency_score: f64,
    pub availability: Availability,
}

impl PlayerSignal {
    pub fn raw(&self) -> RawSignals {
        RawSignals {
            fixtures: self.fixture_score.blended,
            form: self.form.points_per_gw,
            total_points: self.player.total_points as f64,
            xg: self.xg_per_90,
        }
    }
}

/// Inputs shared by every signal computed in one call.
pub struct SignalSource<'a> {
    pub history: &'a LiveHistory,
    pub model: &'a FixtureModel,
    pub fixtures: &'a FixtureIndex,
    pub availability: &'a AvailabilityTable,
    pub as_of: Gameweek,
    pub horizon: u32,
    pub consistency_k: f64,
}

impl SignalSource<'_> {
    pub fn signal(&self, player: &PlayerInfo) -> PlayerSignal {
        let fixtures = self.fixtures.for_team(player.team_id).to_vec();
        let fixture_score = self.model.score_all(&fixtures, player.position);
        let spread = consistency::points_spread(self.history, player.id, self.as_of, self.horizon);
        PlayerSignal {
            player: player.clone(),
            fixture_score,
            fixtures,
            form: form::player_form(self.history, player.id, self.as_of, self.horizon),
            xg_per_90: availability::xg_per_90(
                self.history,
                player.id,
                horizon_start(self.as_of, self.horizon),
                self.as_of,
            ),
            consistency_score: consistency::consistency_score(&spread, self.consistency_k),
            spread,
            availability: self.availability.get(player.id),
        }
    }
}

// ---------------------------------------------------------------------------
// Scored candidates
// ---------------------------------------------------------------------------

/// Raw and normalized signals plus the weighted score, as reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreComponents {
    pub fixtures_raw: f64,
    pub fixtures_season: f64,
    pub fixtures_recent: f64,
    pub form_raw: f64,
    pub total_raw: f64,
    pub xg_raw: f64,
    pub avg_points: f64,
    pub stddev_points: f64,
    pub consistency_score: f64,
    pub fixtures_norm: f64,
    pub form_norm: f64,
    pub total_norm: f64,
    pub xg_norm: f64,
    pub weighted_score: f64,
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub signal: PlayerSignal,
    pub score: ScoreComponents,
}

impl ScoredCandidate {
    fn new(signal: PlayerSignal, bounds: &SignalBounds, weights: &ScoringWeights) -> Self {
        let raw = signal.raw();
        let norm = bounds.normalize(&raw);
        let weighted = weights.apply(&norm);
        let score = ScoreComponents {
            fixtures_raw: raw.fixtures,
            fixtures_season: signal.fixture_score.season,
            fixtures_recent: signal.fixture_score.recent,
            form_raw: raw.form,
            total_raw: raw.total_points,
            xg_raw: raw.xg,
            avg_points: signal.spread.mean,
            stddev_points: signal.spread.stdev,
            consistency_score: signal.consistency_score,
            fixtures_norm: norm.fixtures,
            form_norm: norm.form,
            total_norm: norm.total_points,
            xg_norm: norm.xg,
            weighted_score: if weighted.is_finite() { weighted } else { 0.0 },
        };
        Self { signal, score }
    }

    pub fn id(&self) -> PlayerId {
        self.signal.player.id
    }

    pub fn weighted_score(&self) -> f64 {
        self.score.weighted_score
    }
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Score the candidate pool. Bounds come from the pool itself and are
/// returned for scoring rostered players on the same scale.
pub fn score_candidates(
    signals: Vec<PlayerSignal>,
    weights: &ScoringWeights,
) -> (Vec<ScoredCandidate>, SignalBounds) {
    let raws: Vec<RawSignals> = signals.iter().map(PlayerSignal::raw).collect();
    let bounds = SignalBounds::from_pool(&raws);
    let scored = signals
        .into_iter()
        .map(|s| ScoredCandidate::new(s, &bounds, weights))
        .collect();
    (scored, bounds)
}

/// Sort candidates best first for `mode`. Player id breaks remaining ties.
pub fn rank_candidates(candidates: &mut [ScoredCandidate], mode: RankingMode) {
    candidates.sort_by(|a, b| {
        let primary = match mode {
            RankingMode::Overall => Ordering::Equal,
            RankingMode::NextFixture => desc(a.score.fixtures_raw, b.score.fixtures_raw),
            RankingMode::Consistency => desc(a.score.consistency_score, b.score.consistency_score),
        };
        primary
            .then_with(|| desc(a.weighted_score(), b.weighted_score()))
            .then_with(|| a.id().cmp(&b.id()))
    });
}

/// Score rostered players against the candidate pool's bounds, weakest
/// first.
pub fn score_roster(
    signals: Vec<PlayerSignal>,
    bounds: &SignalBounds,
    weights: &ScoringWeights,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = signals
        .into_iter()
        .map(|s| ScoredCandidate::new(s, bounds, weights))
        .collect();
    scored.sort_by(|a, b| {
        desc(b.weighted_score(), a.weighted_score()).then_with(|| a.id().cmp(&b.id()))
    });
    scored
}
