//! Data structures for the ladder tournament: players and tournament state.

mod player;
mod tournament;

pub use player::{names_match, Player};
pub use tournament::{
    Tournament, TournamentError, TournamentId, TournamentState, WinningPairs, DEFAULT_TOTAL_COURTS,
    PLAYERS_PER_COURT, QUEEN_TIE,
};
