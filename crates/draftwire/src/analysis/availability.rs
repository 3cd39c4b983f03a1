// Availability (60-minute appearances) and xG rate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::player::{Gameweek, PlayerId};
use crate::snapshot::LiveHistory;

/// Minutes needed for an appearance to count towards availability.
pub const FULL_APPEARANCE_MINUTES: i64 = 60;

/// Gameweeks counted as "recent" for the last-3 availability check.
const RECENT_GAMEWEEKS: u32 = 3;

/// Count of 60+ minute appearances for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub minutes_60_last3: u32,
    pub minutes_60_season: u32,
}

/// Minimum appearance counts an add candidate must meet (either one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityFilter {
    #[serde(rename = "minutes_60_last3_required")]
    pub last3_required: u32,
    #[serde(rename = "minutes_60_season_required")]
    pub season_required: u32,
}

impl Default for AvailabilityFilter {
    fn default() -> Self {
        Self {
            last3_required: 3,
            season_required: 10,
        }
    }
}

impl AvailabilityFilter {
    pub fn allows(&self, availability: &Availability) -> bool {
        availability.minutes_60_last3 >= self.last3_required
            || availability.minutes_60_season >= self.season_required
    }
}

/// Availability for every player seen in gameweeks `1..=as_of`.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityTable {
    counts: HashMap<PlayerId, Availability>,
}

impl AvailabilityTable {
    pub fn build(history: &LiveHistory, as_of: Gameweek) -> Self {
        let recent_from = (as_of + 1).saturating_sub(RECENT_GAMEWEEKS);
        let mut counts: HashMap<PlayerId, Availability> = HashMap::new();
        for (gw, live) in history.window(1, as_of) {
            for (id, stats) in live {
                if stats.minutes < FULL_APPEARANCE_MINUTES {
                    continue;
                }
                let entry = counts.entry(*id).or_default();
                entry.minutes_60_season += 1;
                if gw >= recent_from {
                    entry.minutes_60_last3 += 1;
                }
            }
        }
        Self { counts }
    }

    /// Counts for `player`; zeros if they never played 60 minutes.
    pub fn get(&self, player: PlayerId) -> Availability {
        self.counts.get(&player).copied().unwrap_or_default()
    }
}

/// Expected goals per 90 minutes over gameweeks `start..=end`. Zero when the
/// player logged no minutes in the window.
pub fn xg_per_90(history: &LiveHistory, player: PlayerId, start: Gameweek, end: Gameweek) -> f64 {
    let (xg, minutes) = history
        .window(start, end)
        .filter_map(|(_, live)| live.get(&player))
        .fold((0.0, 0i64), |(xg, minutes), s| (xg + s.expected_goals, minutes + s.minutes));
    if minutes <= 0 {
        return 0.0;
    }
    let rate = xg / minutes as f64 * 90.0;
    if rate.is_finite() {
        rate
    } else {
        0.0
    }
}
