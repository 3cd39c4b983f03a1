// League snapshots: details, draft choices, transactions and trades.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{SnapshotError, SnapshotStore};
use crate::ledger::{Squad, Trade, TradeItem, TradeState, TransactionKind, WaiverTransaction};
use crate::player::{EntryId, Gameweek, PlayerId};

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueEntry {
    pub entry_id: EntryId,
    #[serde(default)]
    pub entry_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LeagueDetails {
    #[serde(default)]
    pub league_entries: Vec<LeagueEntry>,
}

impl LeagueDetails {
    /// Case-insensitive lookup of an entry by its name.
    pub fn find_entry_by_name(&self, name: &str) -> Option<EntryId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.league_entries
            .iter()
            .find(|e| e.entry_name.trim().eq_ignore_ascii_case(name))
            .map(|e| e.entry_id)
    }

    pub fn entry_name(&self, entry: EntryId) -> Option<&str> {
        self.league_entries
            .iter()
            .find(|e| e.entry_id == entry)
            .map(|e| e.entry_name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Raw serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawDraftChoices {
    #[serde(default)]
    choices: Vec<RawChoice>,
}

#[derive(Debug, Deserialize)]
struct RawChoice {
    #[serde(default)]
    entry: EntryId,
    #[serde(default)]
    element: PlayerId,
    #[serde(default)]
    index: u32,
}

#[derive(Debug, Deserialize)]
struct RawTransactions {
    #[serde(default)]
    transactions: Vec<RawTransaction>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    id: u64,
    #[serde(default)]
    entry: EntryId,
    #[serde(default)]
    element_in: Option<PlayerId>,
    #[serde(default)]
    element_out: Option<PlayerId>,
    #[serde(default)]
    event: Gameweek,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    result: String,
    #[serde(default)]
    added: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTrades {
    #[serde(default)]
    trades: Vec<RawTrade>,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    id: u64,
    #[serde(default)]
    offered_entry: EntryId,
    #[serde(default)]
    received_entry: EntryId,
    #[serde(default)]
    event: Gameweek,
    #[serde(default)]
    state: String,
    #[serde(default)]
    response_time: Option<String>,
    #[serde(default)]
    tradeitem_set: Vec<RawTradeItem>,
}

#[derive(Debug, Deserialize)]
struct RawTradeItem {
    #[serde(default)]
    element_in: Option<PlayerId>,
    #[serde(default)]
    element_out: Option<PlayerId>,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Upstream marks a missing side with null or 0.
fn nonzero(id: Option<PlayerId>) -> Option<PlayerId> {
    id.filter(|id| *id != 0)
}

/// Parse an upstream timestamp. RFC 3339 first, then a bare
/// `YYYY-MM-DDTHH:MM:SS[.frac]` taken as UTC. Unparseable values are dropped.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn squads_from_choices(mut choices: Vec<RawChoice>) -> Vec<Squad> {
    choices.sort_by_key(|c| c.index);
    let mut by_entry: BTreeMap<EntryId, Vec<PlayerId>> = BTreeMap::new();
    for choice in choices {
        if choice.entry == 0 || choice.element == 0 {
            warn!("skipping draft choice #{}: missing entry or element", choice.index);
            continue;
        }
        by_entry.entry(choice.entry).or_default().push(choice.element);
    }
    by_entry
        .into_iter()
        .map(|(entry_id, player_ids)| Squad {
            entry_id,
            player_ids,
        })
        .collect()
}

fn transaction_from_raw(raw: RawTransaction) -> WaiverTransaction {
    let timestamp = parse_timestamp(raw.added.as_deref());
    if timestamp.is_none() && raw.added.as_deref().is_some_and(|s| !s.trim().is_empty()) {
        warn!("transaction {}: unparseable timestamp {:?}", raw.id, raw.added);
    }
    WaiverTransaction {
        id: raw.id,
        entry: raw.entry,
        element_in: nonzero(raw.element_in),
        element_out: nonzero(raw.element_out),
        event: raw.event,
        kind: TransactionKind::from_code(&raw.kind),
        approved: raw.result.trim() == "a",
        timestamp,
    }
}

fn trade_from_raw(raw: RawTrade) -> Trade {
    let timestamp = parse_timestamp(raw.response_time.as_deref());
    Trade {
        id: raw.id,
        offered_entry: raw.offered_entry,
        received_entry: raw.received_entry,
        event: raw.event,
        state: TradeState::from_code(&raw.state),
        timestamp,
        items: raw
            .tradeitem_set
            .into_iter()
            .map(|item| TradeItem {
                element_out: nonzero(item.element_out),
                element_in: nonzero(item.element_in),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Public loaders
// ---------------------------------------------------------------------------

/// Everything the ledger needs for one league.
#[derive(Debug, Clone, Default)]
pub struct LeagueSnapshot {
    pub league_id: u32,
    pub details: LeagueDetails,
    pub squads: Vec<Squad>,
    pub transactions: Vec<WaiverTransaction>,
    pub trades: Vec<Trade>,
}

impl LeagueSnapshot {
    pub fn load(store: &SnapshotStore, league_id: u32) -> Result<Self, SnapshotError> {
        let base = format!("league/{league_id}");
        let details: LeagueDetails = store.read_json(&format!("{base}/details.json"))?;
        let choices: RawDraftChoices = store.read_json(&format!("{base}/draft_choices.json"))?;
        let transactions: RawTransactions = store.read_json(&format!("{base}/transactions.json"))?;
        let trades: RawTrades = store.read_json(&format!("{base}/trades.json"))?;

        let snapshot = Self {
            league_id,
            details,
            squads: squads_from_choices(choices.choices),
            transactions: transactions
                .transactions
                .into_iter()
                .map(transaction_from_raw)
                .collect(),
            trades: trades.trades.into_iter().map(trade_from_raw).collect(),
        };
        debug!(
            "league {}: {} entries, {} squads, {} transactions, {} trades",
            league_id,
            snapshot.details.league_entries.len(),
            snapshot.squads.len(),
            snapshot.transactions.len(),
            snapshot.trades.len()
        );
        Ok(snapshot)
    }
}
