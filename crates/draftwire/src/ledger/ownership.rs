// Entry -> player set mapping, valid as of a single gameweek.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::events::Squad;
use crate::player::{EntryId, PlayerId};

/// Which entry owns which players. Never persisted; rebuilt per query.
///
/// Each player is expected to appear in at most one entry's set, but this is
/// a property of clean input data rather than something the map enforces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnershipMap {
    entries: BTreeMap<EntryId, BTreeSet<PlayerId>>,
}

impl OwnershipMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the map from draft-day squads.
    pub fn from_squads(squads: &[Squad]) -> Self {
        let mut map = Self::new();
        for squad in squads {
            let roster = map.entries.entry(squad.entry_id).or_default();
            roster.extend(squad.player_ids.iter().copied());
        }
        map
    }

    /// Add a player to an entry's roster. Idempotent.
    pub fn add(&mut self, entry: EntryId, player: PlayerId) {
        self.entries.entry(entry).or_default().insert(player);
    }

    /// Remove a player from an entry's roster. No-op if absent.
    pub fn remove(&mut self, entry: EntryId, player: PlayerId) {
        if let Some(roster) = self.entries.get_mut(&entry) {
            roster.remove(&player);
        }
    }

    /// Make sure an entry exists even when it ends up with no players.
    pub(crate) fn touch(&mut self, entry: EntryId) {
        self.entries.entry(entry).or_default();
    }

    pub fn roster(&self, entry: EntryId) -> Option<&BTreeSet<PlayerId>> {
        self.entries.get(&entry)
    }

    pub fn owns(&self, entry: EntryId, player: PlayerId) -> bool {
        self.entries
            .get(&entry)
            .is_some_and(|roster| roster.contains(&player))
    }

    /// Entry that currently holds `player`, if any.
    pub fn owner_of(&self, player: PlayerId) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|(_, roster)| roster.contains(&player))
            .map(|(entry, _)| *entry)
    }

    /// Every player held by any entry.
    pub fn owned_players(&self) -> BTreeSet<PlayerId> {
        self.entries.values().flatten().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squad(entry_id: EntryId, player_ids: &[PlayerId]) -> Squad {
        Squad {
            entry_id,
            player_ids: player_ids.to_vec(),
        }
    }

    #[test]
    fn empty_squads_give_empty_map() {
        let map = OwnershipMap::from_squads(&[]);
        assert!(map.is_empty());
        assert!(map.owned_players().is_empty());
    }

    #[test]
    fn seeds_each_entry_from_its_squad() {
        let map = OwnershipMap::from_squads(&[squad(1, &[10, 20]), squad(2, &[30, 40])]);
        assert!(map.owns(1, 10));
        assert!(map.owns(1, 20));
        assert!(!map.owns(1, 30));
        assert!(map.owns(2, 30));
        assert_eq!(map.owner_of(40), Some(2));
        assert_eq!(map.owner_of(99), None);
        assert_eq!(map.owned_players().len(), 4);
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let mut map = OwnershipMap::from_squads(&[squad(1, &[10])]);
        map.add(1, 10);
        map.add(1, 11);
        map.remove(1, 99);
        map.remove(7, 10);
        assert_eq!(map.roster(1).map(|r| r.len()), Some(2));
        assert!(map.roster(7).is_none());
    }
}
