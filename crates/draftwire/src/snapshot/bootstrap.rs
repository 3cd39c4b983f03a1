// Bootstrap metadata (players, teams, fixtures) and game meta.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{lenient_i64, SnapshotError, SnapshotStore};
use crate::player::{Gameweek, PlayerId, PlayerInfo, Position, TeamId};

const BOOTSTRAP_PATH: &str = "bootstrap/bootstrap-static.json";
const GAME_PATH: &str = "game/game.json";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A scheduled match between two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    pub event: Gameweek,
    pub team_h: TeamId,
    pub team_a: TeamId,
}

/// Everything read from the bootstrap file.
#[derive(Debug, Clone, Default)]
pub struct Bootstrap {
    pub players: Vec<PlayerInfo>,
    /// Team id -> short name ("ARS", "MCI", ...).
    pub teams: BTreeMap<TeamId, String>,
    /// Gameweek -> fixtures in that gameweek. A team may appear more than
    /// once in a gameweek (double gameweeks).
    pub fixtures: BTreeMap<Gameweek, Vec<Fixture>>,
}

impl Bootstrap {
    pub fn team_short(&self, team: TeamId) -> &str {
        self.teams.get(&team).map(String::as_str).unwrap_or("")
    }

    pub fn fixtures_for(&self, gw: Gameweek) -> &[Fixture] {
        self.fixtures.get(&gw).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Index players by id.
    pub fn players_by_id(&self) -> HashMap<PlayerId, &PlayerInfo> {
        self.players.iter().map(|p| (p.id, p)).collect()
    }
}

/// Current season progress as reported upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GameMeta {
    #[serde(default)]
    pub current_event: Gameweek,
    #[serde(default)]
    pub current_event_finished: bool,
    #[serde(default)]
    pub next_event: Gameweek,
}

impl GameMeta {
    /// Resolve the (as-of, target) gameweek pair.
    ///
    /// The as-of gameweek is the last one with complete stats: the current
    /// event if finished, otherwise the one before it (never below 1). An
    /// explicit `target` wins; otherwise the next event, falling back to
    /// current + 1.
    pub fn resolve_gameweeks(&self, target: Option<Gameweek>) -> (Gameweek, Gameweek) {
        let as_of = self.finished_through().max(1);

        let target = match target.filter(|gw| *gw > 0) {
            Some(gw) => gw,
            None if self.next_event > 0 => self.next_event,
            None => self.current_event + 1,
        };
        (as_of, target)
    }

    /// Last gameweek whose stats are complete; 0 before any has finished.
    pub fn finished_through(&self) -> Gameweek {
        if self.current_event_finished {
            self.current_event
        } else {
            self.current_event.saturating_sub(1)
        }
    }
}

// ---------------------------------------------------------------------------
// Raw serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawBootstrap {
    #[serde(default)]
    elements: Vec<RawElement>,
    #[serde(default)]
    teams: Vec<RawTeam>,
    #[serde(default)]
    fixtures: HashMap<String, Vec<RawFixture>>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    id: PlayerId,
    #[serde(default)]
    web_name: String,
    #[serde(default)]
    team: TeamId,
    #[serde(default)]
    element_type: u32,
    #[serde(default)]
    status: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    total_points: i64,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    id: TeamId,
    #[serde(default)]
    short_name: String,
}

#[derive(Debug, Deserialize)]
struct RawFixture {
    id: u32,
    #[serde(default)]
    team_h: TeamId,
    #[serde(default)]
    team_a: TeamId,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

fn bootstrap_from_raw(raw: RawBootstrap) -> Bootstrap {
    let teams: BTreeMap<TeamId, String> = raw
        .teams
        .into_iter()
        .map(|t| (t.id, t.short_name.trim().to_string()))
        .collect();

    let mut players = Vec::with_capacity(raw.elements.len());
    for e in raw.elements {
        let Some(position) = Position::from_element_type(e.element_type) else {
            warn!(
                "skipping element {} '{}': unknown element_type {}",
                e.id, e.web_name, e.element_type
            );
            continue;
        };
        players.push(PlayerInfo {
            id: e.id,
            name: e.web_name.trim().to_string(),
            team_id: e.team,
            position,
            status: e.status.trim().to_string(),
            total_points: e.total_points,
        });
    }
    players.sort_by_key(|p| p.id);

    let mut fixtures: BTreeMap<Gameweek, Vec<Fixture>> = BTreeMap::new();
    for (key, list) in raw.fixtures {
        let Ok(gw) = key.trim().parse::<Gameweek>() else {
            warn!("skipping fixtures under non-numeric gameweek key '{}'", key);
            continue;
        };
        let bucket = fixtures.entry(gw).or_default();
        for f in list {
            if f.team_h == 0 || f.team_a == 0 {
                warn!("skipping fixture {} in GW{}: missing team", f.id, gw);
                continue;
            }
            bucket.push(Fixture {
                id: f.id,
                event: gw,
                team_h: f.team_h,
                team_a: f.team_a,
            });
        }
        bucket.sort_by_key(|f| f.id);
    }

    Bootstrap {
        players,
        teams,
        fixtures,
    }
}

// ---------------------------------------------------------------------------
// Public loaders
// ---------------------------------------------------------------------------

/// Parse bootstrap JSON text. Exposed for tests and for callers that already
/// hold the payload in memory.
pub fn parse_bootstrap(text: &str) -> Result<Bootstrap, serde_json::Error> {
    let raw: RawBootstrap = serde_json::from_str(text)?;
    Ok(bootstrap_from_raw(raw))
}

pub fn load_bootstrap(store: &SnapshotStore) -> Result<Bootstrap, SnapshotError> {
    let raw: RawBootstrap = store.read_json(BOOTSTRAP_PATH)?;
    let bootstrap = bootstrap_from_raw(raw);
    debug!(
        "loaded bootstrap: {} players, {} teams, {} fixture gameweeks",
        bootstrap.players.len(),
        bootstrap.teams.len(),
        bootstrap.fixtures.len()
    );
    Ok(bootstrap)
}

pub fn load_game_meta(store: &SnapshotStore) -> Result<GameMeta, SnapshotError> {
    store.read_json(GAME_PATH)
}
