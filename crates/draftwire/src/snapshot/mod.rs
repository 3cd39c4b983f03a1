// Snapshot loaders: read the cached upstream JSON files for one call.
//
// Layout under the snapshot root:
//   game/game.json
//   bootstrap/bootstrap-static.json
//   gw/<n>/live.json
//   league/<id>/{details,draft_choices,transactions,trades}.json

pub mod bootstrap;
pub mod league;
pub mod live;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use bootstrap::{Bootstrap, Fixture, GameMeta};
pub use league::{LeagueDetails, LeagueEntry, LeagueSnapshot};
pub use live::{GameweekLive, LiveHistory, LiveStats};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Read-only view over a snapshot directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deserialize the JSON file at `rel` (relative to the root).
    pub fn read_json<T: DeserializeOwned>(&self, rel: &str) -> Result<T, SnapshotError> {
        let path = self.root.join(rel);
        let text = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SnapshotError::NotFound { path: path.clone() }
            } else {
                SnapshotError::Io {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;
        serde_json::from_str(&text).map_err(|e| SnapshotError::Parse { path, source: e })
    }
}

// ---------------------------------------------------------------------------
// Lenient number decoding
// ---------------------------------------------------------------------------

/// Upstream stats mix JSON numbers and numeric strings ("0.35"). Anything
/// unparseable decodes as 0.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if parsed.is_finite() { parsed } else { 0.0 })
}

/// Integer flavour of [`lenient_f64`]; fractional values are rounded.
pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_f64(deserializer).map(|v| v.round() as i64)
}
