// Player identity, position buckets, and bootstrap metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type PlayerId = u32;
pub type EntryId = u32;
pub type TeamId = u32;
pub type Gameweek = u32;

/// Status code the upstream API uses for a fit, selectable player.
pub const STATUS_AVAILABLE: &str = "a";

/// The four FPL position buckets (`element_type` 1..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    /// All positions in display order.
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Map an upstream `element_type` to a position. Anything outside 1..=4
    /// (including 0, used for unassigned elements) yields `None`.
    pub fn from_element_type(element_type: u32) -> Option<Self> {
        match element_type {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    /// Inverse of [`Position::from_element_type`].
    pub fn element_type(&self) -> u32 {
        match self {
            Position::Goalkeeper => 1,
            Position::Defender => 2,
            Position::Midfielder => 3,
            Position::Forward => 4,
        }
    }

    /// Short label used as the report key ("GK", "DEF", "MID", "FWD").
    pub fn label(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Plural noun for warning messages.
    pub fn plural(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "goalkeepers",
            Position::Defender => "defenders",
            Position::Midfielder => "midfielders",
            Position::Forward => "forwards",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Bootstrap metadata for a single player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub team_id: TeamId,
    pub position: Position,
    pub status: String,
    pub total_points: i64,
}

impl PlayerInfo {
    pub fn is_available(&self) -> bool {
        self.status == STATUS_AVAILABLE
    }
}
