// Deterministic replay of roster events on top of draft-day squads.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::events::{RosterEvent, Squad, Trade, TradeState, WaiverTransaction};
use super::ownership::OwnershipMap;
use crate::player::{EntryId, Gameweek, PlayerId};

/// Reconstruct who owns whom as of gameweek `gw`.
///
/// Steps:
/// 1. Seed the map from `squads`.
/// 2. Keep approved waiver/free-agent transactions and processed trades with
///    `event <= gw`.
/// 3. Sort the combined list by (event, timestamp, id, transaction-first).
/// 4. Apply each event in order.
///
/// Unmatched removals and duplicate adds are silently idempotent. The result
/// does not depend on the order of the input slices.
pub fn ownership_as_of(
    squads: &[Squad],
    transactions: &[WaiverTransaction],
    trades: &[Trade],
    gw: Gameweek,
) -> OwnershipMap {
    let mut ownership = OwnershipMap::from_squads(squads);

    let mut events: Vec<RosterEvent<'_>> = transactions
        .iter()
        .filter(|tx| tx.applies_at(gw))
        .map(RosterEvent::Transaction)
        .chain(
            trades
                .iter()
                .filter(|tr| tr.applies_at(gw))
                .map(RosterEvent::Trade),
        )
        .collect();

    events.sort_by(|a, b| a.replay_order(b));

    for event in &events {
        event.apply(&mut ownership);
    }

    debug!(
        "replayed {} roster events onto {} squads as of GW{}",
        events.len(),
        squads.len(),
        gw
    );

    ownership
}

/// Every entry that has ever held each player: draft squads, either side of
/// an approved transaction, and either side of a processed trade leg.
pub fn ever_owners(
    squads: &[Squad],
    transactions: &[WaiverTransaction],
    trades: &[Trade],
) -> BTreeMap<PlayerId, BTreeSet<EntryId>> {
    let mut ever: BTreeMap<PlayerId, BTreeSet<EntryId>> = BTreeMap::new();
    let mut record = |player: PlayerId, entry: EntryId| {
        ever.entry(player).or_default().insert(entry);
    };

    for squad in squads {
        for &player in &squad.player_ids {
            record(player, squad.entry_id);
        }
    }

    for tx in transactions.iter().filter(|tx| tx.approved) {
        for player in tx.element_in.into_iter().chain(tx.element_out) {
            record(player, tx.entry);
        }
    }

    for tr in trades.iter().filter(|tr| tr.state == TradeState::Processed) {
        for item in &tr.items {
            for player in item.element_in.into_iter().chain(item.element_out) {
                record(player, tr.offered_entry);
                record(player, tr.received_entry);
            }
        }
    }

    ever
}

/// Gameweek at which to replay ownership for a waiver call targeting
/// `target`: waivers already processed for the round before the target are
/// included even when the stats snapshot lags behind.
pub fn roster_gameweek(as_of: Gameweek, target: Gameweek) -> Gameweek {
    as_of.max(target.saturating_sub(1)).max(1)
}
