//! Tournament, TournamentState and TournamentError.

use crate::models::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Seats on every court.
pub const PLAYERS_PER_COURT: usize = 4;

/// Courts in the reference configuration (32 players).
pub const DEFAULT_TOTAL_COURTS: usize = 8;

/// Value of `queen_name` when more than one court-0 player qualifies.
pub const QUEEN_TIE: &str = "Tie";

/// Winner selection for one round: court index -> names of the two winners.
pub type WinningPairs = HashMap<usize, Vec<String>>;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Tournament is not in a state that allows this action.
    InvalidState,
    /// Player name is empty after trimming.
    EmptyPlayerName,
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// No player with this name.
    PlayerNotFound(String),
    /// Every seat on every court is taken.
    TournamentFull { capacity: usize },
    /// Need at least one full court to start.
    NotEnoughPlayersToStart { required: usize },
    /// Nobody on court 0 holds the tournament's best win count.
    NoQualifyingQueen,
    /// Roster CSV could not be read.
    Roster(String),
    /// Snapshot JSON could not be read or written.
    Snapshot(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::EmptyPlayerName => write!(f, "Player name must not be empty"),
            TournamentError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            TournamentError::PlayerNotFound(name) => write!(f, "Player not found: {}", name),
            TournamentError::TournamentFull { capacity } => {
                write!(f, "All {} seats are taken", capacity)
            }
            TournamentError::NotEnoughPlayersToStart { required } => {
                write!(f, "Need at least {} players to start", required)
            }
            TournamentError::NoQualifyingQueen => {
                write!(f, "No player on the Queen's court has the most wins")
            }
            TournamentError::Roster(msg) => write!(f, "Invalid roster: {}", msg),
            TournamentError::Snapshot(msg) => write!(f, "Invalid tournament snapshot: {}", msg),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament (the persistence key).
pub type TournamentId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Adding players; courts not seeded yet.
    #[default]
    Setup,
    /// Rounds are being played.
    InProgress,
    /// Queen crowned; no more rounds.
    Completed,
}

fn default_total_courts() -> usize {
    DEFAULT_TOTAL_COURTS
}

/// A snapshot without a state field is a tournament already under way.
fn default_restored_state() -> TournamentState {
    TournamentState::InProgress
}

fn default_round_number() -> u32 {
    1
}

/// Full tournament state. Serializes to
/// `{players: [{name, court, position, wins}], roundNumber, queenName, ...}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    #[serde(default = "Uuid::new_v4")]
    pub id: TournamentId,
    /// Players in reflow order; not semantically ordered otherwise.
    pub players: Vec<Player>,
    /// Starts at 1, advanced once per rotation; stops at `u32::MAX`.
    #[serde(default = "default_round_number")]
    pub round_number: u32,
    /// Set by [`Tournament::crown_queen`]; [`QUEEN_TIE`] on a tie.
    #[serde(default)]
    pub queen_name: Option<String>,
    #[serde(default = "default_total_courts")]
    pub total_courts: usize,
    #[serde(default = "default_restored_state")]
    pub state: TournamentState,
}

impl Tournament {
    /// Create a new tournament in Setup state with no players.
    pub fn new(total_courts: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            players: Vec::new(),
            round_number: 1,
            queen_name: None,
            total_courts: total_courts.max(1),
            state: TournamentState::Setup,
        }
    }

    /// Create a tournament around players that already carry their court/position
    /// assignment. The tournament is in progress at round 1.
    pub fn with_players(players: Vec<Player>, total_courts: usize) -> Self {
        Self {
            players,
            state: TournamentState::InProgress,
            ..Self::new(total_courts)
        }
    }

    /// Restore a tournament from its JSON snapshot. The court count must be at least one
    /// and its seat total must fit in `usize`.
    pub fn from_json(json: &str) -> Result<Self, TournamentError> {
        let tournament: Self =
            serde_json::from_str(json).map_err(|e| TournamentError::Snapshot(e.to_string()))?;
        if tournament.total_courts == 0 {
            return Err(TournamentError::Snapshot("totalCourts must be at least 1".to_string()));
        }
        if tournament.total_courts.checked_mul(PLAYERS_PER_COURT).is_none() {
            return Err(TournamentError::Snapshot(format!(
                "totalCourts {} is too large",
                tournament.total_courts
            )));
        }
        Ok(tournament)
    }

    /// Serialize the tournament snapshot to JSON.
    pub fn to_json(&self) -> Result<String, TournamentError> {
        serde_json::to_string(self).map_err(|e| TournamentError::Snapshot(e.to_string()))
    }

    /// Seats available across all courts.
    pub fn capacity(&self) -> usize {
        self.total_courts.saturating_mul(PLAYERS_PER_COURT)
    }

    /// Look up a player by name (case-insensitive).
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.is_named(name))
    }

    /// Players on one court, ordered by position.
    pub fn court_players(&self, court: usize) -> Vec<&Player> {
        let mut on_court: Vec<&Player> = self.players.iter().filter(|p| p.court == court).collect();
        on_court.sort_by_key(|p| p.position);
        on_court
    }

    /// Distinct courts that currently have at least one player, ascending.
    pub fn courts_in_play(&self) -> Vec<usize> {
        self.players
            .iter()
            .map(|p| p.court)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Add a player (only valid in Setup). Names must be unique (case-insensitive).
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<(), TournamentError> {
        self.add_seated_player(Player::new(name))
    }

    /// Add a player keeping whatever seat and wins the record carries (Setup only).
    pub fn add_seated_player(&mut self, mut player: Player) -> Result<(), TournamentError> {
        if self.state != TournamentState::Setup {
            return Err(TournamentError::InvalidState);
        }
        let name_trimmed = player.name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::EmptyPlayerName);
        }
        if self.player(name_trimmed).is_some() {
            return Err(TournamentError::DuplicatePlayerName);
        }
        if self.players.len() >= self.capacity() {
            return Err(TournamentError::TournamentFull {
                capacity: self.capacity(),
            });
        }
        player.name = name_trimmed.to_string();
        self.players.push(player);
        Ok(())
    }

    /// Remove a player by name (only valid in Setup).
    pub fn remove_player(&mut self, name: &str) -> Result<(), TournamentError> {
        if self.state != TournamentState::Setup {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.is_named(name))
            .ok_or_else(|| TournamentError::PlayerNotFound(name.to_string()))?;
        self.players.remove(idx);
        Ok(())
    }

    /// Players ranked by wins (descending), ties broken by name (ascending).
    /// Pure read; call again to restart.
    pub fn leaderboard(&self) -> impl Iterator<Item = &Player> + '_ {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.name.cmp(&b.name)));
        ranked.into_iter()
    }

    /// Crown the queen: the court-0 player holding the tournament's highest win count.
    ///
    /// The threshold is the maximum over *all* players, so when the leader is not on
    /// court 0 nobody qualifies and [`TournamentError::NoQualifyingQueen`] is returned
    /// with `queen_name` left untouched. More than one qualifier crowns [`QUEEN_TIE`].
    pub fn crown_queen(&mut self) -> Result<&str, TournamentError> {
        let best = self
            .players
            .iter()
            .map(|p| p.wins)
            .max()
            .ok_or(TournamentError::NoQualifyingQueen)?;
        let candidates: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| p.court == 0 && p.wins == best)
            .collect();
        let queen = match candidates.as_slice() {
            [] => return Err(TournamentError::NoQualifyingQueen),
            [only] => only.name.clone(),
            _ => QUEEN_TIE.to_string(),
        };
        log::info!("Crowned queen: {} ({} wins)", queen, best);
        Ok(self.queen_name.insert(queen).as_str())
    }
}
