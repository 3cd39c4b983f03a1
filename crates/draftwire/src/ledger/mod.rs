// Ownership ledger: draft-day squads plus replayed roster events.

pub mod events;
pub mod ownership;
pub mod replay;

pub use events::{RosterEvent, Squad, Trade, TradeItem, TradeState, TransactionKind, WaiverTransaction};
pub use ownership::OwnershipMap;
pub use replay::{ever_owners, ownership_as_of, roster_gameweek};
