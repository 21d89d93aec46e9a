//! Queen's court ladder tournament: library with models and rotation logic.

pub mod logic;
pub mod models;

pub use logic::{
    finish_tournament, import_roster, partition_by_court, reflow, resolve_court_outcome,
    rotate_players, seed_courts, start_tournament, submit_round, CourtOutcome,
    InvalidWinnerSelection, RoundSummary, SkippedCourt,
};
pub use models::{
    Player, Tournament, TournamentError, TournamentId, TournamentState, WinningPairs,
    DEFAULT_TOTAL_COURTS, PLAYERS_PER_COURT, QUEEN_TIE,
};
