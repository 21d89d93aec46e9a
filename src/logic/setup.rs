//! Setup phase: roster import, court seeding, and starting the tournament.

use crate::models::{Player, Tournament, TournamentError, TournamentState, PLAYERS_PER_COURT};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;

/// One roster line. Only `name` is required; `court` and `position` together pin a seat.
#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    #[serde(default)]
    court: Option<usize>,
    #[serde(default)]
    position: Option<u8>,
    #[serde(default)]
    wins: Option<u32>,
}

/// Add players from a CSV roster (header row required: `name[,court,position,wins]`).
/// Returns the number of players added. All or nothing: any invalid row leaves the roster unchanged.
pub fn import_roster<R: Read>(tournament: &mut Tournament, reader: R) -> Result<usize, TournamentError> {
    if tournament.state != TournamentState::Setup {
        return Err(TournamentError::InvalidState);
    }
    let mut staged = tournament.clone();
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut added = 0;
    for row in csv_reader.deserialize::<RosterRow>() {
        let row = row.map_err(|e| TournamentError::Roster(e.to_string()))?;
        let mut player = Player::new(row.name);
        if let (Some(court), Some(position)) = (row.court, row.position) {
            player.court = court;
            player.position = position;
        }
        player.wins = row.wins.unwrap_or(0);
        staged.add_seated_player(player)?;
        added += 1;
    }
    *tournament = staged;
    log::info!("Imported {} player(s) into tournament {}", added, tournament.id);
    Ok(added)
}

/// Shuffle players and deal them onto courts in fours: court `i / 4`, position `i % 4 + 1`.
pub fn seed_courts<R: Rng + ?Sized>(tournament: &mut Tournament, rng: &mut R) {
    tournament.players.shuffle(rng);
    for (i, p) in tournament.players.iter_mut().enumerate() {
        p.court = i / PLAYERS_PER_COURT;
        p.position = (i % PLAYERS_PER_COURT) as u8 + 1;
    }
}

/// True when every player already sits on a distinct, valid seat.
fn has_external_seating(tournament: &Tournament) -> bool {
    let mut seats = HashSet::new();
    tournament.players.iter().all(|p| {
        p.court < tournament.total_courts
            && (1..=PLAYERS_PER_COURT as u8).contains(&p.position)
            && seats.insert((p.court, p.position))
    })
}

/// Start the tournament: needs one full court. Seeds courts randomly unless the roster
/// already carries a complete seating; state becomes InProgress at round 1.
pub fn start_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::Setup {
        return Err(TournamentError::InvalidState);
    }
    if tournament.players.len() < PLAYERS_PER_COURT {
        return Err(TournamentError::NotEnoughPlayersToStart {
            required: PLAYERS_PER_COURT,
        });
    }
    if has_external_seating(tournament) {
        log::info!("Tournament {}: keeping supplied seating", tournament.id);
    } else {
        seed_courts(tournament, &mut rand::thread_rng());
    }
    tournament.round_number = 1;
    tournament.queen_name = None;
    tournament.state = TournamentState::InProgress;
    log::info!(
        "Tournament {} started with {} players on {} court(s)",
        tournament.id,
        tournament.players.len(),
        tournament.courts_in_play().len()
    );
    Ok(())
}
