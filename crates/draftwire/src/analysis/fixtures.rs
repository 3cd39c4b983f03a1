// Fixture difficulty model.
//
// An opponent's difficulty for position P at a venue is the average number of
// points players at P have scored against it at that venue. Two tables are
// built, one over the whole season and one over the trailing horizon, and
// blended with horizon-dependent weights.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::horizon_start;
use crate::player::{Gameweek, PlayerInfo, Position, TeamId};
use crate::snapshot::{Bootstrap, Fixture, LiveHistory};

// ---------------------------------------------------------------------------
// Venue & fixture context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn label(&self) -> &'static str {
        match self {
            Venue::Home => "home",
            Venue::Away => "away",
        }
    }

    fn other(&self) -> Venue {
        match self {
            Venue::Home => Venue::Away,
            Venue::Away => Venue::Home,
        }
    }
}

/// One fixture seen from one team's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureContext {
    pub fixture_id: u32,
    pub event: Gameweek,
    pub team_id: TeamId,
    pub team_short: String,
    pub opponent_id: TeamId,
    pub opponent_short: String,
    pub venue: Venue,
}

/// Team -> every fixture context for that team in one gameweek. Double
/// gameweeks keep both entries.
#[derive(Debug, Clone, Default)]
pub struct FixtureIndex {
    by_team: BTreeMap<TeamId, Vec<FixtureContext>>,
}

impl FixtureIndex {
    pub fn build(fixtures: &[Fixture], teams: &BTreeMap<TeamId, String>) -> Self {
        let short = |team: TeamId| teams.get(&team).cloned().unwrap_or_default();
        let mut by_team: BTreeMap<TeamId, Vec<FixtureContext>> = BTreeMap::new();
        for f in fixtures {
            by_team.entry(f.team_h).or_default().push(FixtureContext {
                fixture_id: f.id,
                event: f.event,
                team_id: f.team_h,
                team_short: short(f.team_h),
                opponent_id: f.team_a,
                opponent_short: short(f.team_a),
                venue: Venue::Home,
            });
            by_team.entry(f.team_a).or_default().push(FixtureContext {
                fixture_id: f.id,
                event: f.event,
                team_id: f.team_a,
                team_short: short(f.team_a),
                opponent_id: f.team_h,
                opponent_short: short(f.team_h),
                venue: Venue::Away,
            });
        }
        Self { by_team }
    }

    /// Fixtures for `team`; empty for a blank gameweek.
    pub fn for_team(&self, team: TeamId) -> &[FixtureContext] {
        self.by_team.get(&team).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_fixture(&self, team: TeamId) -> bool {
        !self.for_team(team).is_empty()
    }

    pub fn contexts(&self) -> impl Iterator<Item = &FixtureContext> {
        self.by_team.values().flatten()
    }
}

// ---------------------------------------------------------------------------
// Points conceded
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct AvgStat {
    sum: f64,
    count: u32,
}

impl AvgStat {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }
}

/// Points conceded per (team, venue, position), averaged over the fixtures
/// in a gameweek range.
#[derive(Debug, Clone, Default)]
pub struct ConcededTable {
    buckets: HashMap<(TeamId, Venue, Position), AvgStat>,
}

impl ConcededTable {
    /// Accumulate gameweeks `start..=end`. Only players present in a
    /// gameweek's live stats contribute to their team's totals.
    pub fn build(
        players: &[PlayerInfo],
        fixtures: &BTreeMap<Gameweek, Vec<Fixture>>,
        history: &LiveHistory,
        start: Gameweek,
        end: Gameweek,
    ) -> Self {
        let roster: HashMap<_, _> = players.iter().map(|p| (p.id, (p.team_id, p.position))).collect();
        let mut table = Self::default();

        for (gw, live) in history.window(start, end) {
            let mut team_points: HashMap<(TeamId, Position), i64> = HashMap::new();
            for (id, stats) in live {
                let Some(&(team, position)) = roster.get(id) else {
                    continue;
                };
                if team == 0 {
                    continue;
                }
                *team_points.entry((team, position)).or_default() += stats.total_points;
            }

            let Some(gw_fixtures) = fixtures.get(&gw) else {
                continue;
            };
            for f in gw_fixtures {
                for position in Position::ALL {
                    // The home side concedes what the away side scored, and
                    // vice versa.
                    if let Some(&pts) = team_points.get(&(f.team_a, position)) {
                        table.add(f.team_h, Venue::Home, position, pts as f64);
                    }
                    if let Some(&pts) = team_points.get(&(f.team_h, position)) {
                        table.add(f.team_a, Venue::Away, position, pts as f64);
                    }
                }
            }
        }
        table
    }

    fn add(&mut self, team: TeamId, venue: Venue, position: Position, points: f64) {
        self.buckets.entry((team, venue, position)).or_default().add(points);
    }

    /// Average points conceded by `opponent` to `position` at `venue`.
    ///
    /// Falls back to the opponent's average across both venues, then to 0.
    pub fn difficulty(&self, opponent: TeamId, venue: Venue, position: Position) -> f64 {
        if opponent == 0 {
            return 0.0;
        }
        let same = self.bucket(opponent, venue, position);
        if same.count > 0 {
            return same.sum / same.count as f64;
        }
        let other = self.bucket(opponent, venue.other(), position);
        if other.count == 0 {
            return 0.0;
        }
        other.sum / other.count as f64
    }

    fn bucket(&self, team: TeamId, venue: Venue, position: Position) -> AvgStat {
        self.buckets
            .get(&(team, venue, position))
            .copied()
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Blending
// ---------------------------------------------------------------------------

/// (season, recent) blend weights for a horizon length.
pub fn horizon_weights(horizon: u32) -> (f64, f64) {
    match horizon {
        h if h >= 20 => (0.40, 0.60),
        h if h >= 10 => (0.50, 0.50),
        _ => (0.55, 0.45),
    }
}

/// Season, recent and blended difficulty for one or more fixtures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FixtureScore {
    pub season: f64,
    pub recent: f64,
    pub blended: f64,
}

/// Season and recent conceded tables plus their blend weights.
#[derive(Debug, Clone)]
pub struct FixtureModel {
    season: ConcededTable,
    recent: ConcededTable,
    pub season_weight: f64,
    pub recent_weight: f64,
}

impl FixtureModel {
    pub fn build(bootstrap: &Bootstrap, history: &LiveHistory, as_of: Gameweek, horizon: u32) -> Self {
        let (season_weight, recent_weight) = horizon_weights(horizon);
        let season = ConcededTable::build(&bootstrap.players, &bootstrap.fixtures, history, 1, as_of);
        let recent = ConcededTable::build(
            &bootstrap.players,
            &bootstrap.fixtures,
            history,
            horizon_start(as_of, horizon),
            as_of,
        );
        Self {
            season,
            recent,
            season_weight,
            recent_weight,
        }
    }

    /// Score a single fixture for a player at `position`.
    pub fn score(&self, ctx: &FixtureContext, position: Position) -> FixtureScore {
        let season = self.season.difficulty(ctx.opponent_id, ctx.venue, position);
        let recent = self.recent.difficulty(ctx.opponent_id, ctx.venue, position);
        let blended = self.season_weight * season + self.recent_weight * recent;
        FixtureScore {
            season,
            recent,
            blended: if blended.is_finite() { blended } else { 0.0 },
        }
    }

    /// Sum of [`score`](Self::score) over every fixture in a gameweek. A
    /// blank gameweek scores zero.
    pub fn score_all(&self, contexts: &[FixtureContext], position: Position) -> FixtureScore {
        contexts.iter().fold(FixtureScore::default(), |acc, ctx| {
            let s = self.score(ctx, position);
            FixtureScore {
                season: acc.season + s.season,
                recent: acc.recent + s.recent,
                blended: acc.blended + s.blended,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Fixture ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RankedFixture {
    pub rank: usize,
    #[serde(flatten)]
    pub fixture: FixtureContext,
    #[serde(flatten)]
    pub score: FixtureScore,
}

/// Rank every fixture context in `index` for `position`, easiest first.
/// Ties go to team short name, then opponent short name.
pub fn rank_fixtures(
    model: &FixtureModel,
    index: &FixtureIndex,
    position: Position,
    limit: Option<usize>,
) -> Vec<RankedFixture> {
    let mut scored: Vec<(FixtureContext, FixtureScore)> = index
        .contexts()
        .map(|ctx| (ctx.clone(), model.score(ctx, position)))
        .collect();

    scored.sort_by(|(a_ctx, a), (b_ctx, b)| {
        b.blended
            .partial_cmp(&a.blended)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a_ctx.team_short.cmp(&b_ctx.team_short))
            .then_with(|| a_ctx.opponent_short.cmp(&b_ctx.opponent_short))
    });

    let take = limit.filter(|n| *n > 0).unwrap_or(scored.len());
    scored
        .into_iter()
        .take(take)
        .enumerate()
        .map(|(i, (fixture, score))| RankedFixture {
            rank: i + 1,
            fixture,
            score,
        })
        .collect()
}

/// Ranked fixtures for every position.
pub fn rank_fixtures_by_position(
    model: &FixtureModel,
    index: &FixtureIndex,
    limit: Option<usize>,
) -> BTreeMap<&'static str, Vec<RankedFixture>> {
    Position::ALL
        .into_iter()
        .map(|pos| (pos.label(), rank_fixtures(model, index, pos, limit)))
        .collect()
}
