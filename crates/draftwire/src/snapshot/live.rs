// Per-gameweek live stats.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use tracing::{debug, warn};

use super::{lenient_f64, lenient_i64, SnapshotError, SnapshotStore};
use crate::player::{Gameweek, PlayerId};

/// One player's stats for one gameweek.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct LiveStats {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub minutes: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub total_points: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub expected_goals: f64,
}

/// Stats for every player present in one gameweek's live file. A player
/// missing from the map did not appear in that gameweek.
pub type GameweekLive = HashMap<PlayerId, LiveStats>;

#[derive(Debug, Deserialize)]
struct RawLive {
    #[serde(default)]
    elements: HashMap<String, RawLiveElement>,
}

#[derive(Debug, Deserialize)]
struct RawLiveElement {
    #[serde(default)]
    stats: LiveStats,
}

fn live_from_raw(gw: Gameweek, raw: RawLive) -> GameweekLive {
    let mut out = GameweekLive::with_capacity(raw.elements.len());
    for (key, element) in raw.elements {
        match key.trim().parse::<PlayerId>() {
            Ok(id) => {
                out.insert(id, element.stats);
            }
            Err(_) => warn!("GW{gw}: skipping live element with non-numeric id '{key}'"),
        }
    }
    out
}

pub fn parse_live(gw: Gameweek, text: &str) -> Result<GameweekLive, serde_json::Error> {
    let raw: RawLive = serde_json::from_str(text)?;
    Ok(live_from_raw(gw, raw))
}

pub fn load_gameweek_live(store: &SnapshotStore, gw: Gameweek) -> Result<GameweekLive, SnapshotError> {
    let raw: RawLive = store.read_json(&format!("gw/{gw}/live.json"))?;
    Ok(live_from_raw(gw, raw))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Live stats for a run of gameweeks, loaded once per call.
#[derive(Debug, Clone, Default)]
pub struct LiveHistory {
    gameweeks: BTreeMap<Gameweek, GameweekLive>,
}

impl LiveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load gameweeks `1..=as_of`. Any missing or malformed file fails the
    /// whole load.
    pub fn load(store: &SnapshotStore, as_of: Gameweek) -> Result<Self, SnapshotError> {
        let mut history = Self::new();
        for gw in 1..=as_of {
            history.insert(gw, load_gameweek_live(store, gw)?);
        }
        debug!("loaded live stats for {} gameweeks", history.len());
        Ok(history)
    }

    pub fn insert(&mut self, gw: Gameweek, live: GameweekLive) {
        self.gameweeks.insert(gw, live);
    }

    pub fn get(&self, gw: Gameweek) -> Option<&GameweekLive> {
        self.gameweeks.get(&gw)
    }

    /// Stats for `player` in `gw`, if they appeared.
    pub fn stats(&self, gw: Gameweek, player: PlayerId) -> Option<&LiveStats> {
        self.gameweeks.get(&gw).and_then(|live| live.get(&player))
    }

    /// Loaded gameweeks within `start..=end`, ascending.
    pub fn window(&self, start: Gameweek, end: Gameweek) -> impl Iterator<Item = (Gameweek, &GameweekLive)> {
        self.gameweeks
            .range(start..)
            .take_while(move |(gw, _)| **gw <= end)
            .map(|(gw, live)| (*gw, live))
    }

    pub fn len(&self) -> usize {
        self.gameweeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gameweeks.is_empty()
    }
}
