// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod analysis;
pub mod config;
pub mod ledger;
pub mod player;
pub mod recommend;
pub mod snapshot;
pub mod valuation;
