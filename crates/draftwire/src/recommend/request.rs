// Waiver recommendation request and its resolution against config.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::analysis::availability::AvailabilityFilter;
use crate::analysis::consistency;
use crate::config::Config;
use crate::player::{EntryId, Gameweek, PlayerId, Position};
use crate::snapshot::LeagueDetails;
use crate::valuation::scoring::{RankingMode, ScoringWeights};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("league_id is required")]
    MissingLeagueId,

    #[error("entry_id or entry_name is required")]
    MissingEntry,

    #[error("entry not found for name: {name}")]
    UnknownEntryName { name: String },
}

/// One call's inputs. Everything but the league and entry is optional and
/// falls back to config. Ids and counts that are negative, zero, or not
/// numbers read as absent instead of failing the request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaiverRequest {
    #[serde(deserialize_with = "positive_u32")]
    pub league_id: Option<u32>,
    #[serde(deserialize_with = "positive_u32")]
    pub entry_id: Option<EntryId>,
    pub entry_name: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
    /// Target gameweek; 0 or absent means the next gameweek.
    #[serde(deserialize_with = "positive_u32")]
    pub gw: Option<Gameweek>,
    #[serde(deserialize_with = "positive_u32")]
    pub horizon: Option<u32>,
    pub weight_fixtures: Option<f64>,
    pub weight_form: Option<f64>,
    pub weight_total_points: Option<f64>,
    pub weight_xg: Option<f64>,
    #[serde(deserialize_with = "positive_usize")]
    pub limit: Option<usize>,
    #[serde(deserialize_with = "positive_ids")]
    pub undroppable_ids: Vec<PlayerId>,
    /// Element type 1-4; anything else means no position filter.
    #[serde(deserialize_with = "positive_u32")]
    pub target_position: Option<u32>,
    pub target_type: Option<String>,
    pub consistency_k: Option<f64>,
}

// ---------------------------------------------------------------------------
// Lenient request decoding
// ---------------------------------------------------------------------------

/// A strictly positive integer from a JSON number or numeric string.
fn positive_int(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    n.filter(|n| *n > 0)
}

fn positive_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(positive_int(&value).and_then(|n| u32::try_from(n).ok()))
}

fn positive_usize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(positive_int(&value).and_then(|n| usize::try_from(n).ok()))
}

/// Keeps the valid ids of a list; `null` or a non-list is an empty list.
fn positive_ids<'de, D>(deserializer: D) -> Result<Vec<PlayerId>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .filter_map(positive_int)
            .filter_map(|n| PlayerId::try_from(n).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(ids)
}

/// Request merged with config defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    pub horizon: u32,
    pub limit: usize,
    /// Already normalized to sum to 1.
    pub weights: ScoringWeights,
    pub consistency_k: f64,
    pub target_position: Option<Position>,
    pub ranking: RankingMode,
    pub undroppable: BTreeSet<PlayerId>,
    pub filter: AvailabilityFilter,
}

impl WaiverRequest {
    pub fn league_id(&self) -> Result<u32, RequestError> {
        self.league_id
            .filter(|id| *id > 0)
            .ok_or(RequestError::MissingLeagueId)
    }

    /// Name to look up when no entry id is given: `entry_name`, else
    /// `first` and `last` joined by a space.
    fn entry_name_query(&self) -> Option<String> {
        let name = match &self.entry_name {
            Some(name) => name.trim().to_string(),
            None => {
                let first = self.first.as_deref().unwrap_or("").trim();
                let last = self.last.as_deref().unwrap_or("").trim();
                format!("{first} {last}").trim().to_string()
            }
        };
        (!name.is_empty()).then_some(name)
    }

    /// Resolve the requesting entry, by id or by case-insensitive name.
    pub fn resolve_entry(&self, details: &LeagueDetails) -> Result<EntryId, RequestError> {
        if let Some(id) = self.entry_id.filter(|id| *id > 0) {
            return Ok(id);
        }
        let name = self.entry_name_query().ok_or(RequestError::MissingEntry)?;
        details
            .find_entry_by_name(&name)
            .ok_or(RequestError::UnknownEntryName { name })
    }

    /// Whether the caller supplied an entry identifier in any form.
    pub fn has_entry(&self) -> bool {
        self.entry_id.is_some_and(|id| id > 0) || self.entry_name_query().is_some()
    }

    pub fn resolve(&self, config: &Config) -> ResolvedParams {
        let horizon = self
            .horizon
            .filter(|h| *h > 0)
            .unwrap_or(config.pool.horizon);
        let limit = self.limit.filter(|n| *n > 0).unwrap_or(config.pool.limit);

        // Any explicit weight replaces the whole config set; unspecified
        // ones count as 0.
        let explicit = [
            self.weight_fixtures,
            self.weight_form,
            self.weight_total_points,
            self.weight_xg,
        ];
        let weights = if explicit.iter().any(Option::is_some) {
            ScoringWeights {
                fixtures: self.weight_fixtures.unwrap_or(0.0),
                form: self.weight_form.unwrap_or(0.0),
                total_points: self.weight_total_points.unwrap_or(0.0),
                xg: self.weight_xg.unwrap_or(0.0),
            }
        } else {
            config.scoring.weights
        };

        let consistency_k = consistency::resolve_k(
            self.consistency_k
                .filter(|k| k.is_finite() && *k != 0.0)
                .or(Some(config.scoring.consistency_k)),
        );

        ResolvedParams {
            horizon,
            limit,
            weights: weights.normalized(),
            consistency_k,
            target_position: self.target_position.and_then(Position::from_element_type),
            ranking: RankingMode::parse(self.target_type.as_deref().unwrap_or("")),
            undroppable: self.undroppable_ids.iter().copied().filter(|id| *id > 0).collect(),
            filter: config.pool.availability_filter(),
        }
    }
}
