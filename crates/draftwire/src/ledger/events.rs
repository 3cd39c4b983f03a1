// Roster-changing events: waiver/free-agent transactions and trades.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ownership::OwnershipMap;
use crate::player::{EntryId, Gameweek, PlayerId};

/// Draft-day allocation for one entry. The t=0 base state of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    pub entry_id: EntryId,
    pub player_ids: Vec<PlayerId>,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Waiver,
    FreeAgent,
    /// Any other upstream kind. Never replayed.
    Other,
}

impl TransactionKind {
    /// Parse the upstream single-letter kind code ("w" / "f").
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "w" => TransactionKind::Waiver,
            "f" => TransactionKind::FreeAgent,
            _ => TransactionKind::Other,
        }
    }
}

/// A waiver claim or free-agent pickup by a single entry. Either side may be
/// absent (add-only or drop-only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverTransaction {
    pub id: u64,
    pub entry: EntryId,
    pub element_in: Option<PlayerId>,
    pub element_out: Option<PlayerId>,
    pub event: Gameweek,
    pub kind: TransactionKind,
    pub approved: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

impl WaiverTransaction {
    /// Whether this transaction changes ownership as of `gw`.
    pub fn applies_at(&self, gw: Gameweek) -> bool {
        self.event <= gw
            && self.approved
            && matches!(self.kind, TransactionKind::Waiver | TransactionKind::FreeAgent)
    }

    fn apply(&self, ownership: &mut OwnershipMap) {
        ownership.touch(self.entry);
        if let Some(out) = self.element_out {
            ownership.remove(self.entry, out);
        }
        if let Some(incoming) = self.element_in {
            ownership.add(self.entry, incoming);
        }
    }
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeState {
    Pending,
    Processed,
    Rejected,
}

impl TradeState {
    /// Parse the upstream state code. Only "p" means the swap went through;
    /// offered/accepted trades are still pending, the rest were refused.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "p" => TradeState::Processed,
            "r" | "i" | "w" | "v" | "x" => TradeState::Rejected,
            _ => TradeState::Pending,
        }
    }
}

/// One leg of a trade, recorded from the offering entry's perspective:
/// `element_out` leaves the offering entry, `element_in` arrives at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeItem {
    pub element_out: Option<PlayerId>,
    pub element_in: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub offered_entry: EntryId,
    pub received_entry: EntryId,
    pub event: Gameweek,
    pub state: TradeState,
    pub timestamp: Option<DateTime<Utc>>,
    pub items: Vec<TradeItem>,
}

impl Trade {
    /// Whether this trade changes ownership as of `gw`.
    pub fn applies_at(&self, gw: Gameweek) -> bool {
        self.event <= gw && self.state == TradeState::Processed
    }

    fn apply(&self, ownership: &mut OwnershipMap) {
        ownership.touch(self.offered_entry);
        ownership.touch(self.received_entry);
        for item in &self.items {
            if let Some(out) = item.element_out {
                ownership.remove(self.offered_entry, out);
                ownership.add(self.received_entry, out);
            }
            if let Some(incoming) = item.element_in {
                ownership.remove(self.received_entry, incoming);
                ownership.add(self.offered_entry, incoming);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Combined event stream
// ---------------------------------------------------------------------------

/// A single roster-changing event, borrowed from the loaded snapshots.
///
/// Both kinds live in one list that is sorted once, so the cross-kind tie
/// break is part of the ordering rather than an artifact of merge order.
#[derive(Debug, Clone, Copy)]
pub enum RosterEvent<'a> {
    Transaction(&'a WaiverTransaction),
    Trade(&'a Trade),
}

impl RosterEvent<'_> {
    pub fn event(&self) -> Gameweek {
        match self {
            RosterEvent::Transaction(tx) => tx.event,
            RosterEvent::Trade(tr) => tr.event,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            RosterEvent::Transaction(tx) => tx.timestamp,
            RosterEvent::Trade(tr) => tr.timestamp,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            RosterEvent::Transaction(tx) => tx.id,
            RosterEvent::Trade(tr) => tr.id,
        }
    }

    /// Transactions sort before trades on an exact tie.
    fn kind_rank(&self) -> u8 {
        match self {
            RosterEvent::Transaction(_) => 0,
            RosterEvent::Trade(_) => 1,
        }
    }

    /// Total replay order: event, timestamp, id, kind. A missing timestamp
    /// sorts before any recorded one.
    pub fn replay_order(&self, other: &Self) -> Ordering {
        self.event()
            .cmp(&other.event())
            .then_with(|| self.timestamp().cmp(&other.timestamp()))
            .then_with(|| self.id().cmp(&other.id()))
            .then_with(|| self.kind_rank().cmp(&other.kind_rank()))
    }

    /// Apply this event to the ownership map.
    pub fn apply(&self, ownership: &mut OwnershipMap) {
        match self {
            RosterEvent::Transaction(tx) => tx.apply(ownership),
            RosterEvent::Trade(tr) => tr.apply(ownership),
        }
    }
}
