// Candidate classifier: splits the player universe into the free-agent pool
// eligible for add recommendations and everything else.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::analysis::availability::{AvailabilityFilter, AvailabilityTable};
use crate::analysis::fixtures::FixtureIndex;
use crate::player::{PlayerId, PlayerInfo, Position};

/// Why a player was left out of the candidate pool. Checked in declaration
/// order; the first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Exclusion {
    PositionMismatch,
    Unavailable,
    Owned,
    InsufficientMinutes,
    NoFixture,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PoolCriteria {
    pub filter: AvailabilityFilter,
    pub target_position: Option<Position>,
}

pub fn classify(
    player: &PlayerInfo,
    owned: &BTreeSet<PlayerId>,
    availability: &AvailabilityTable,
    fixtures: &FixtureIndex,
    criteria: &PoolCriteria,
) -> Result<(), Exclusion> {
    if criteria.target_position.is_some_and(|pos| pos != player.position) {
        return Err(Exclusion::PositionMismatch);
    }
    if !player.is_available() {
        return Err(Exclusion::Unavailable);
    }
    if owned.contains(&player.id) {
        return Err(Exclusion::Owned);
    }
    if !criteria.filter.allows(&availability.get(player.id)) {
        return Err(Exclusion::InsufficientMinutes);
    }
    if !fixtures.has_fixture(player.team_id) {
        return Err(Exclusion::NoFixture);
    }
    Ok(())
}

/// Players eligible to be recommended as adds.
pub fn candidate_pool<'a>(
    players: &'a [PlayerInfo],
    owned: &BTreeSet<PlayerId>,
    availability: &AvailabilityTable,
    fixtures: &FixtureIndex,
    criteria: &PoolCriteria,
) -> Vec<&'a PlayerInfo> {
    let mut excluded: BTreeMap<Exclusion, usize> = BTreeMap::new();
    let pool: Vec<&PlayerInfo> = players
        .iter()
        .filter(|p| match classify(p, owned, availability, fixtures, criteria) {
            Ok(()) => true,
            Err(reason) => {
                *excluded.entry(reason).or_default() += 1;
                false
            }
        })
        .collect();
    debug!("candidate pool: {} eligible, excluded {:?}", pool.len(), excluded);
    pool
}
