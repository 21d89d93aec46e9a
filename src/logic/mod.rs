//! Tournament business logic: setup, round rotation, standings.

mod rotation;
mod setup;
mod standings;

pub use rotation::{
    partition_by_court, reflow, resolve_court_outcome, rotate_players, submit_round, CourtOutcome,
    InvalidWinnerSelection, RoundSummary, SkippedCourt,
};
pub use setup::{import_roster, seed_courts, start_tournament};
pub use standings::finish_tournament;
