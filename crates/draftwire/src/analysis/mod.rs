// Per-player analytics over live stats: fixture difficulty, availability,
// consistency and form.

pub mod availability;
pub mod consistency;
pub mod fixtures;
pub mod form;

use crate::player::Gameweek;

/// First gameweek of the trailing `horizon` window ending at `as_of`,
/// never below 1.
pub fn horizon_start(as_of: Gameweek, horizon: u32) -> Gameweek {
    (as_of + 1).saturating_sub(horizon).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_start_clamps_to_first_gameweek() {
        assert_eq!(horizon_start(10, 5), 6);
        assert_eq!(horizon_start(10, 1), 10);
        assert_eq!(horizon_start(3, 5), 1);
        assert_eq!(horizon_start(5, 5), 1);
    }
}
