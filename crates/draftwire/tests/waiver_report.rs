// Integration tests for the waiver assistant.
//
// These tests run the full pipeline against a small snapshot tree under
// tests/fixtures/league_small: four teams, two entries, three played
// gameweeks, a double gameweek for ARS in GW4 and a blank for CHE.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use draftwire::config::{Config, DataPaths, PoolConfig, ScoringConfig};
use draftwire::ledger::{ever_owners, ownership_as_of, roster_gameweek};
use draftwire::player::{PlayerId, Position};
use draftwire::recommend::request::{RequestError, WaiverRequest};
use draftwire::recommend::{self, ReportInputs};
use draftwire::snapshot::bootstrap::{load_bootstrap, load_game_meta};
use draftwire::snapshot::{LeagueSnapshot, LiveHistory, SnapshotStore};
use draftwire::valuation::scoring::ScoringWeights;
use draftwire::valuation::targets::RiskLevel;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the crate root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures/league_small";

const LEAGUE: u32 = 42;
const ADA: u32 = 11;
const XHAKA: u32 = 12;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn inline_config(snapshot_root: &str) -> Config {
    Config {
        scoring: ScoringConfig {
            weights: ScoringWeights::default(),
            consistency_k: 0.63,
        },
        pool: PoolConfig {
            horizon: 5,
            limit: 5,
            minutes_60_last3_required: 3,
            minutes_60_season_required: 10,
        },
        data: DataPaths {
            snapshot_root: snapshot_root.into(),
        },
    }
}

fn store() -> SnapshotStore {
    SnapshotStore::new(FIXTURES)
}

fn ada_request() -> WaiverRequest {
    WaiverRequest {
        league_id: Some(LEAGUE),
        entry_name: Some("ada lovelace".into()),
        ..WaiverRequest::default()
    }
}

fn load_inputs() -> ReportInputs {
    let store = store();
    let (as_of, target) = load_game_meta(&store).unwrap().resolve_gameweeks(None);
    ReportInputs {
        bootstrap: load_bootstrap(&store).unwrap(),
        league: LeagueSnapshot::load(&store, LEAGUE).unwrap(),
        history: LiveHistory::load(&store, as_of).unwrap(),
        as_of,
        target,
    }
}

fn copy_tree(from: &Path, to: &Path) {
    std::fs::create_dir_all(to).unwrap();
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let dest = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_tree(&entry.path(), &dest);
        } else {
            std::fs::copy(entry.path(), &dest).unwrap();
        }
    }
}

fn ids<'a>(elements: impl IntoIterator<Item = &'a PlayerId>) -> BTreeSet<PlayerId> {
    elements.into_iter().copied().collect()
}

// ===========================================================================
// Ledger replay against the snapshot tree
// ===========================================================================

#[test]
fn ownership_replays_transactions_and_processed_trades() {
    let league = LeagueSnapshot::load(&store(), LEAGUE).unwrap();

    let gw1 = ownership_as_of(&league.squads, &league.transactions, &league.trades, 1);
    assert_eq!(gw1.roster(ADA), Some(&ids(&[1, 2, 7, 10, 12])));
    assert_eq!(gw1.roster(XHAKA), Some(&ids(&[3, 5, 8, 13])));

    // GW2 waiver swaps Nunez for Hojlund; the GW3 trade swaps Van Dijk for
    // Saka. The rejected claim and the pending trade change nothing.
    let gw3 = ownership_as_of(&league.squads, &league.transactions, &league.trades, 3);
    assert_eq!(gw3.roster(ADA), Some(&ids(&[1, 2, 3, 7, 16])));
    assert_eq!(gw3.roster(XHAKA), Some(&ids(&[5, 8, 10, 13])));
    assert_eq!(gw3.owner_of(4), None);

    // The GW5 free-agent pickup is outside a GW4 replay.
    let gw4 = ownership_as_of(
        &league.squads,
        &league.transactions,
        &league.trades,
        roster_gameweek(3, 5),
    );
    assert!(!gw4.owns(XHAKA, 18));
    let gw5 = ownership_as_of(&league.squads, &league.transactions, &league.trades, 5);
    assert!(gw5.owns(XHAKA, 18));
}

#[test]
fn ever_owners_ignore_rejected_claims() {
    let league = LeagueSnapshot::load(&store(), LEAGUE).unwrap();
    let ever = ever_owners(&league.squads, &league.transactions, &league.trades);
    assert_eq!(ever.get(&12), Some(&ids(&[ADA])));
    assert_eq!(ever.get(&3), Some(&ids(&[ADA, XHAKA])));
    assert_eq!(ever.get(&4), None);
    // The pending trade's goalkeeper swap never happened.
    assert_eq!(ever.get(&5), Some(&ids(&[XHAKA])));
}

// ===========================================================================
// Waiver report
// ===========================================================================

#[test]
fn end_to_end_report_shape() {
    let config = inline_config(FIXTURES);
    let report = recommend::build_report(&store(), &config, &ada_request()).unwrap();

    assert_eq!(report.league_id, LEAGUE);
    assert_eq!(report.entry_id, ADA);
    assert_eq!(report.as_of_gw, 3);
    assert_eq!(report.target_gw, 4);
    assert_eq!(report.horizon, 5);
    assert_eq!(report.target_type, "overall");
    assert_eq!(report.target_position, None);
    assert!(approx_eq(report.fixture_season_weight, 0.55, 1e-12));
    assert!(approx_eq(report.fixture_recent_weight, 0.45, 1e-12));
    assert!(approx_eq(
        report.weight_fixtures + report.weight_form + report.weight_total_points + report.weight_xg,
        1.0,
        1e-9
    ));
    assert_eq!(report.notes.len(), 3);

    // Eligible pool: Havertz, Alisson, Nunez, Dalot, Fernandes, Odegaard.
    // Colwill has a blank GW4, Salah is injured, Garnacho never reaches 60
    // minutes. The pool is truncated to the default limit of 5.
    assert_eq!(report.top_adds.len(), 5);
    let eligible = ids(&[4, 9, 12, 14, 15, 17]);
    for add in &report.top_adds {
        assert!(eligible.contains(&add.element), "unexpected add {}", add.element);
        assert!(add.score.weighted_score.is_finite());
        assert!((0.0..=1.0 + 1e-9).contains(&add.score.weighted_score));
        assert_eq!(add.reasons.len(), 4);
    }
    for pair in report.top_adds.windows(2) {
        assert!(pair[0].score.weighted_score >= pair[1].score.weighted_score);
    }

    // Drops never pair with an add that does not beat them.
    for add in &report.top_adds {
        if let Some(drop) = &add.suggested_drop {
            assert_eq!(drop.position_type, add.position_type);
            assert!(add.score.weighted_score > drop.score.weighted_score);
            assert_eq!(drop.reason, "Lowest weighted score at position");
        }
    }
    let roster = ids(&[1, 2, 3, 7, 16]);
    assert!(report.drop_candidates.iter().all(|d| roster.contains(&d.element)));

    // A goalkeeper drop and the suppression warning are mutually exclusive.
    let gk_dropped = report.drop_candidates.iter().any(|d| d.position_type == 1);
    let gk_warned = report
        .warnings
        .iter()
        .any(|w| w == "No better GK add available; GK drops omitted.");
    assert!(gk_dropped != gk_warned);
}

#[test]
fn report_serializes_expected_fields() {
    let config = inline_config(FIXTURES);
    let report = recommend::build_report(&store(), &config, &ada_request()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["filters"]["minutes_60_last3_required"], 3);
    assert_eq!(json["filters"]["minutes_60_season_required"], 10);
    assert!(json.get("target_position").is_none());
    assert!(json["scoring_formula"]
        .as_str()
        .unwrap()
        .starts_with("weighted_score = w_fix*fixture_norm"));
    let first = &json["top_adds"][0];
    for key in ["element", "name", "team", "position_type", "fixture", "availability", "score", "reasons"] {
        assert!(first.get(key).is_some(), "missing {key}");
    }
    let venue = first["fixture"]["venue"].as_str().unwrap();
    assert!(venue == "HOME" || venue == "AWAY");
    assert!(first["score"]["weighted_score"].is_number());
}

#[test]
fn double_gameweek_keeps_both_fixtures() {
    let config = inline_config(FIXTURES);
    let request = WaiverRequest {
        limit: Some(10),
        ..ada_request()
    };
    let report = recommend::build_report(&store(), &config, &request).unwrap();
    assert_eq!(report.top_adds.len(), 6);

    let havertz = report.top_adds.iter().find(|a| a.element == 4).unwrap();
    assert_eq!(havertz.team, "ARS");
    assert_eq!(havertz.fixture.fixture_id, 401);
    assert_eq!(havertz.fixture.opponent_short, "MUN");
    assert_eq!(havertz.double_gameweek.len(), 2);
    assert_eq!(havertz.double_gameweek[1].fixture_id, 402);
    assert_eq!(havertz.double_gameweek[1].opponent_short, "LIV");
    assert!(havertz.reasons[0].ends_with("vs MUN (home) + LIV (away)"));
    assert!(havertz.previous_owners.is_empty());

    // Summed difficulty of both ARS fixtures for a forward.
    let fixtures = recommend::build_fixture_report(&store(), &config, None, Some(Position::Forward), None).unwrap();
    let ars_total: f64 = fixtures.positions["FWD"]
        .iter()
        .filter(|f| f.fixture.team_short == "ARS")
        .map(|f| f.score.blended)
        .sum();
    assert!(approx_eq(havertz.score.fixtures_raw, ars_total, 1e-9));

    let dalot = report.top_adds.iter().find(|a| a.element == 14).unwrap();
    assert!(dalot.double_gameweek.is_empty());

    // Nunez was dropped by Ada in GW2.
    let nunez = report.top_adds.iter().find(|a| a.element == 12).unwrap();
    assert_eq!(nunez.previous_owners, vec!["Ada Lovelace".to_string()]);
    assert_eq!(nunez.previous_owner_count, 1);
}

#[test]
fn explicit_target_gameweek_changes_fixtures() {
    let config = inline_config(FIXTURES);
    let request = WaiverRequest {
        gw: Some(5),
        limit: Some(10),
        ..ada_request()
    };
    let report = recommend::build_report(&store(), &config, &request).unwrap();
    assert_eq!(report.as_of_gw, 3);
    assert_eq!(report.target_gw, 5);
    // CHE play in GW5, so Colwill becomes eligible.
    assert!(report.top_adds.iter().any(|a| a.element == 6));
    assert!(report.top_adds.iter().all(|a| a.double_gameweek.is_empty()));
}

#[test]
fn goalkeeper_only_request_suppresses_unmotivated_gk_drop() {
    let config = inline_config(FIXTURES);
    let request = WaiverRequest {
        target_position: Some(1),
        ..ada_request()
    };
    let report = recommend::build_report(&store(), &config, &request).unwrap();

    assert_eq!(report.target_position, Some(1));
    assert_eq!(report.top_adds.len(), 1);
    let alisson = &report.top_adds[0];
    assert_eq!(alisson.element, 9);
    // A pool of one has flat bounds, so everything scores 0 and the GK add
    // cannot beat Raya.
    assert_eq!(alisson.score.weighted_score, 0.0);
    assert!(alisson.suggested_drop.is_none());
    assert!(report.drop_candidates.iter().all(|d| d.position_type != 1));
    assert_eq!(
        report.warnings,
        vec!["No better GK add available; GK drops omitted.".to_string()]
    );
}

#[test]
fn fully_protected_roster_warns_everywhere() {
    let config = inline_config(FIXTURES);
    let request = WaiverRequest {
        undroppable_ids: vec![1, 2, 3, 7, 16],
        ..ada_request()
    };
    let report = recommend::build_report(&store(), &config, &request).unwrap();

    assert!(report.drop_candidates.is_empty());
    assert!(report.drop_candidates_by_position.is_empty());
    assert!(report.top_adds.iter().all(|a| a.suggested_drop.is_none()));
    assert_eq!(report.warnings.len(), 5);
    assert_eq!(
        report.warnings[0],
        "All goalkeepers are undroppable. Make someone droppable if you want recommendations for this position."
    );
    assert_eq!(
        report.warnings[4],
        "All players are undroppable. Make someone droppable if you want recommendations."
    );

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("drop_candidates_by_position").is_none());
}

#[test]
fn ranking_modes_order_by_their_primary_signal() {
    let config = inline_config(FIXTURES);

    let consistency = WaiverRequest {
        target_type: Some("consistency".into()),
        limit: Some(10),
        ..ada_request()
    };
    let report = recommend::build_report(&store(), &config, &consistency).unwrap();
    assert_eq!(report.target_type, "consistency");
    for pair in report.top_adds.windows(2) {
        assert!(pair[0].score.consistency_score >= pair[1].score.consistency_score);
    }

    let next = WaiverRequest {
        target_type: Some("next_fixture".into()),
        limit: Some(10),
        ..ada_request()
    };
    let report = recommend::build_report(&store(), &config, &next).unwrap();
    for pair in report.top_adds.windows(2) {
        assert!(pair[0].score.fixtures_raw >= pair[1].score.fixtures_raw);
    }
}

#[test]
fn empty_pool_produces_finite_scores() {
    let mut inputs = load_inputs();
    for p in &mut inputs.bootstrap.players {
        p.status = "u".into();
    }
    let params = ada_request().resolve(&inline_config(FIXTURES));
    let report = recommend::assemble_report(&inputs, ADA, &params);

    assert!(report.top_adds.is_empty());
    assert!(!report.drop_candidates.is_empty());
    for drop in &report.drop_candidates {
        assert_eq!(drop.score.weighted_score, 0.0);
        assert!(drop.score.fixtures_norm.is_finite());
    }
    serde_json::to_string(&report).unwrap();
}

// ===========================================================================
// Request errors
// ===========================================================================

#[test]
fn entry_lookup_errors() {
    let config = inline_config(FIXTURES);

    let unknown = WaiverRequest {
        league_id: Some(LEAGUE),
        entry_name: Some("Nobody Here".into()),
        ..WaiverRequest::default()
    };
    let err = recommend::build_report(&store(), &config, &unknown).unwrap_err();
    assert_eq!(
        err.downcast_ref::<RequestError>(),
        Some(&RequestError::UnknownEntryName {
            name: "Nobody Here".into()
        })
    );
    assert_eq!(err.to_string(), "entry not found for name: Nobody Here");

    let missing = WaiverRequest {
        league_id: Some(LEAGUE),
        ..WaiverRequest::default()
    };
    let err = recommend::build_report(&store(), &config, &missing).unwrap_err();
    assert_eq!(err.downcast_ref::<RequestError>(), Some(&RequestError::MissingEntry));

    let no_league = WaiverRequest {
        entry_id: Some(ADA),
        ..WaiverRequest::default()
    };
    let err = recommend::build_report(&store(), &config, &no_league).unwrap_err();
    assert_eq!(err.downcast_ref::<RequestError>(), Some(&RequestError::MissingLeagueId));

    // First and last name resolve the same entry as the full name.
    let by_parts = WaiverRequest {
        league_id: Some(LEAGUE),
        first: Some("Xhaka".into()),
        last: Some("Laka".into()),
        ..WaiverRequest::default()
    };
    let report = recommend::build_report(&store(), &config, &by_parts).unwrap();
    assert_eq!(report.entry_id, XHAKA);
}

#[test]
fn missing_live_file_fails_the_call() {
    let tmp: PathBuf = std::env::temp_dir().join("draftwire_missing_live");
    let _ = std::fs::remove_dir_all(&tmp);
    copy_tree(Path::new(FIXTURES), &tmp);
    std::fs::remove_file(tmp.join("gw/2/live.json")).unwrap();

    let root = tmp.to_string_lossy().to_string();
    let config = inline_config(&root);
    let err = recommend::build_report(&SnapshotStore::new(&tmp), &config, &ada_request()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("failed to load live stats through GW3"), "{message}");
    assert!(message.contains("live.json"), "{message}");

    let _ = std::fs::remove_dir_all(&tmp);
}

#[test]
fn preseason_report_runs_without_live_stats() {
    let tmp: PathBuf = std::env::temp_dir().join("draftwire_preseason");
    let _ = std::fs::remove_dir_all(&tmp);
    copy_tree(Path::new(FIXTURES), &tmp);
    std::fs::remove_dir_all(tmp.join("gw")).unwrap();
    std::fs::write(
        tmp.join("game/game.json"),
        r#"{"current_event": 1, "current_event_finished": false, "next_event": 1}"#,
    )
    .unwrap();

    let root = tmp.to_string_lossy().to_string();
    let config = inline_config(&root);
    let report = recommend::build_report(&SnapshotStore::new(&tmp), &config, &ada_request()).unwrap();
    assert_eq!(report.as_of_gw, 1);
    assert_eq!(report.target_gw, 1);
    // Nobody has logged minutes, so nobody passes the availability filter.
    assert!(report.top_adds.is_empty());
    assert_eq!(report.drop_candidates.len(), 3);
    assert!(report.drop_candidates.iter().all(|d| d.position_type != 1));
    assert!(report.drop_candidates.iter().all(|d| d.score.weighted_score.is_finite()));

    let fixtures = recommend::build_fixture_report(&SnapshotStore::new(&tmp), &config, None, None, None).unwrap();
    assert_eq!(fixtures.target_gw, 1);

    let _ = std::fs::remove_dir_all(&tmp);
}

// ===========================================================================
// Side reports
// ===========================================================================

#[test]
fn waiver_targets_exclude_owned_players() {
    let config = inline_config(FIXTURES);
    let high = recommend::build_targets(&store(), &config, LEAGUE, RiskLevel::High, None).unwrap();
    let medium = recommend::build_targets(&store(), &config, LEAGUE, RiskLevel::Medium, None).unwrap();
    let low = recommend::build_targets(&store(), &config, LEAGUE, RiskLevel::Low, None).unwrap();

    assert_eq!(high.as_of_gw, 3);
    let owned = ids(&[1, 2, 3, 5, 7, 8, 10, 13, 16]);
    assert!(high.targets.iter().all(|t| !owned.contains(&t.element)));
    assert_eq!(high.targets.len(), 9);
    assert!(low.targets.len() <= medium.targets.len());
    assert!(medium.targets.len() <= high.targets.len());
    for pair in high.targets.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn fixture_report_covers_every_position() {
    let config = inline_config(FIXTURES);
    let report = recommend::build_fixture_report(&store(), &config, None, None, None).unwrap();
    assert_eq!(report.target_gw, 4);
    assert_eq!(report.positions.len(), 4);
    // Two GW4 fixtures, seen from both sides.
    for ranked in report.positions.values() {
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].rank, 1);
        assert!(ranked.iter().all(|f| f.fixture.team_short != "CHE"));
    }
}
