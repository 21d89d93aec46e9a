//! End of tournament: crown the queen and close the tournament.

use crate::models::{Tournament, TournamentError, TournamentState};

/// Crown the queen and mark the tournament completed (tournament must be in progress).
/// If no queen qualifies the tournament stays in progress.
pub fn finish_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::InProgress {
        return Err(TournamentError::InvalidState);
    }
    tournament.crown_queen()?;
    tournament.state = TournamentState::Completed;
    Ok(())
}
