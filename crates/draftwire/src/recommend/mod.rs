// Recommendation pipeline: snapshot loading, ownership replay, scoring and
// report assembly for one call.

pub mod assembler;
pub mod report;
pub mod request;

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Context;
use tracing::{info, warn};

use crate::analysis::availability::AvailabilityTable;
use crate::analysis::fixtures::{
    rank_fixtures, rank_fixtures_by_position, FixtureIndex, FixtureModel, RankedFixture,
};
use crate::config::Config;
use crate::ledger::{ever_owners, ownership_as_of, roster_gameweek};
use crate::player::{EntryId, Gameweek, PlayerId, Position};
use crate::snapshot::bootstrap::{load_bootstrap, load_game_meta};
use crate::snapshot::{Bootstrap, LeagueSnapshot, LiveHistory, SnapshotStore};
use crate::valuation::candidates::{candidate_pool, PoolCriteria};
use crate::valuation::scoring::{rank_candidates, score_candidates, score_roster, SignalSource};
use crate::valuation::targets::{waiver_targets, RiskLevel};

use assembler::{add_recommendation, previous_owner_names, DropPlan};
use report::{report_notes, FixtureReport, TargetsReport, WaiverReport, SCORING_FORMULA};
use request::{ResolvedParams, WaiverRequest};

/// Everything read from the snapshot tree for one waiver call.
#[derive(Debug, Clone)]
pub struct ReportInputs {
    pub bootstrap: Bootstrap,
    pub league: LeagueSnapshot,
    pub history: LiveHistory,
    pub as_of: Gameweek,
    pub target: Gameweek,
}

/// Load snapshots and build the waiver report for `request`.
pub fn build_report(
    store: &SnapshotStore,
    config: &Config,
    request: &WaiverRequest,
) -> anyhow::Result<WaiverReport> {
    let league_id = request.league_id()?;
    if !request.has_entry() {
        return Err(request::RequestError::MissingEntry.into());
    }
    let params = request.resolve(config);

    let meta = load_game_meta(store).context("failed to load game metadata")?;
    let (as_of, target) = meta.resolve_gameweeks(request.gw);
    info!("waiver report: league {} as of GW{} targeting GW{}", league_id, as_of, target);

    let league = LeagueSnapshot::load(store, league_id)
        .with_context(|| format!("failed to load league {league_id}"))?;
    let entry_id = request.resolve_entry(&league.details)?;
    let bootstrap = load_bootstrap(store).context("failed to load bootstrap")?;
    let history = load_history(store, meta.finished_through())?;

    let inputs = ReportInputs {
        bootstrap,
        league,
        history,
        as_of,
        target,
    };
    Ok(assemble_report(&inputs, entry_id, &params))
}

/// Live stats for every finished gameweek. Before the first one finishes
/// the history is empty rather than an error.
fn load_history(store: &SnapshotStore, through: Gameweek) -> anyhow::Result<LiveHistory> {
    if through == 0 {
        info!("no finished gameweek yet; scoring without live stats");
        return Ok(LiveHistory::new());
    }
    LiveHistory::load(store, through).with_context(|| format!("failed to load live stats through GW{through}"))
}

/// Build the report from already-loaded inputs.
pub fn assemble_report(inputs: &ReportInputs, entry_id: EntryId, params: &ResolvedParams) -> WaiverReport {
    let ReportInputs {
        bootstrap,
        league,
        history,
        as_of,
        target,
    } = inputs;
    let (as_of, target) = (*as_of, *target);

    let ownership = ownership_as_of(
        &league.squads,
        &league.transactions,
        &league.trades,
        roster_gameweek(as_of, target),
    );
    let owned = ownership.owned_players();
    let roster: BTreeSet<PlayerId> = match ownership.roster(entry_id) {
        Some(roster) => roster.clone(),
        None => {
            warn!("entry {} has no roster in league {}", entry_id, league.league_id);
            BTreeSet::new()
        }
    };

    let fixtures = FixtureIndex::build(bootstrap.fixtures_for(target), &bootstrap.teams);
    let model = FixtureModel::build(bootstrap, history, as_of, params.horizon);
    let availability = AvailabilityTable::build(history, as_of);
    let source = SignalSource {
        history,
        model: &model,
        fixtures: &fixtures,
        availability: &availability,
        as_of,
        horizon: params.horizon,
        consistency_k: params.consistency_k,
    };

    let criteria = PoolCriteria {
        filter: params.filter,
        target_position: params.target_position,
    };
    let signals = candidate_pool(&bootstrap.players, &owned, &availability, &fixtures, &criteria)
        .into_iter()
        .map(|p| source.signal(p))
        .collect();
    let (mut adds, bounds) = score_candidates(signals, &params.weights);
    let pool_size = adds.len();
    rank_candidates(&mut adds, params.ranking);
    adds.truncate(params.limit);

    let players = bootstrap.players_by_id();
    let roster_signals = roster
        .iter()
        .filter_map(|id| match players.get(id) {
            Some(p) => Some(source.signal(p)),
            None => {
                warn!("rostered player {} missing from bootstrap", id);
                None
            }
        })
        .collect();
    let roster_scored = score_roster(roster_signals, &bounds, &params.weights);

    let plan = DropPlan::build(
        &roster_scored,
        &params.undroppable,
        &adds,
        params.target_position,
        &bootstrap.teams,
    );

    let ever = ever_owners(&league.squads, &league.transactions, &league.trades);
    let top_adds = adds
        .iter()
        .filter_map(|c| {
            let owners = previous_owner_names(&ever, &league.details, c.id());
            add_recommendation(c, &plan, owners, &bootstrap.teams)
        })
        .collect::<Vec<_>>();

    info!(
        "waiver report: {} candidates, {} adds, {} drops, {} warnings",
        pool_size,
        top_adds.len(),
        plan.flattened().len(),
        plan.warnings.len()
    );

    WaiverReport {
        league_id: league.league_id,
        entry_id,
        as_of_gw: as_of,
        target_gw: target,
        horizon: params.horizon,
        weight_fixtures: params.weights.fixtures,
        weight_form: params.weights.form,
        weight_total_points: params.weights.total_points,
        weight_xg: params.weights.xg,
        fixture_season_weight: model.season_weight,
        fixture_recent_weight: model.recent_weight,
        scoring_formula: SCORING_FORMULA.to_string(),
        target_position: params.target_position.map(|p| p.element_type()),
        target_type: params.ranking.as_str().to_string(),
        consistency_k: params.consistency_k,
        filters: params.filter,
        top_adds,
        drop_candidates: plan.flattened(),
        drop_candidates_by_position: plan.by_position(),
        warnings: plan.warnings.clone(),
        notes: report_notes(&params.filter),
    }
}

// ---------------------------------------------------------------------------
// Side reports
// ---------------------------------------------------------------------------

/// Risk-filtered unowned players for a league, as of the last complete
/// gameweek (or `gw` when given).
pub fn build_targets(
    store: &SnapshotStore,
    config: &Config,
    league_id: u32,
    risk: RiskLevel,
    gw: Option<Gameweek>,
) -> anyhow::Result<TargetsReport> {
    let meta = load_game_meta(store).context("failed to load game metadata")?;
    let through = gw.filter(|g| *g > 0).unwrap_or_else(|| meta.finished_through());
    let as_of = through.max(1);
    let horizon = config.pool.horizon;

    let league = LeagueSnapshot::load(store, league_id)
        .with_context(|| format!("failed to load league {league_id}"))?;
    let bootstrap = load_bootstrap(store).context("failed to load bootstrap")?;
    let history = load_history(store, through)?;

    let owned = ownership_as_of(&league.squads, &league.transactions, &league.trades, as_of).owned_players();
    let targets = waiver_targets(&bootstrap, &owned, &history, as_of, horizon, risk);
    info!("waiver targets: league {} GW{} risk {:?}: {} players", league_id, as_of, risk, targets.len());

    Ok(TargetsReport {
        league_id,
        as_of_gw: as_of,
        horizon,
        risk_level: risk,
        targets,
    })
}

/// Fixture difficulty ranking for the target gameweek, for one position or
/// all of them.
pub fn build_fixture_report(
    store: &SnapshotStore,
    config: &Config,
    gw: Option<Gameweek>,
    position: Option<Position>,
    limit: Option<usize>,
) -> anyhow::Result<FixtureReport> {
    let meta = load_game_meta(store).context("failed to load game metadata")?;
    let (as_of, target) = meta.resolve_gameweeks(gw);
    let horizon = config.pool.horizon;

    let bootstrap = load_bootstrap(store).context("failed to load bootstrap")?;
    let history = load_history(store, meta.finished_through())?;

    let index = FixtureIndex::build(bootstrap.fixtures_for(target), &bootstrap.teams);
    let model = FixtureModel::build(&bootstrap, &history, as_of, horizon);
    let positions: BTreeMap<&'static str, Vec<RankedFixture>> = match position {
        Some(pos) => [(pos.label(), rank_fixtures(&model, &index, pos, limit))]
            .into_iter()
            .collect(),
        None => rank_fixtures_by_position(&model, &index, limit),
    };

    Ok(FixtureReport {
        as_of_gw: as_of,
        target_gw: target,
        horizon,
        fixture_season_weight: model.season_weight,
        fixture_recent_weight: model.recent_weight,
        positions,
    })
}
