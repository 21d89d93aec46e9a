//! Player data structure.

use serde::{Deserialize, Serialize};

/// A player in the tournament. `name` is the identity (matched case-insensitively).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Court the player currently occupies (0 = Queen's court).
    pub court: usize,
    /// Seat on the court, 1..=4.
    pub position: u8,
    /// Cumulative wins across all rounds; never decreases, stops at `u32::MAX`.
    pub wins: u32,
}

impl Player {
    /// Create a new unseated player with the given name. Other fields start at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a player already seated on a court (e.g. from external seeding).
    pub fn seated(name: impl Into<String>, court: usize, position: u8) -> Self {
        Self {
            name: name.into(),
            court,
            position,
            wins: 0,
        }
    }

    /// Record a win for this player (saturates at `u32::MAX`).
    pub fn add_win(&mut self) {
        self.wins = self.wins.saturating_add(1);
    }

    /// Case-insensitive name match.
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }
}

/// Compare two player names ignoring case (Unicode-aware, no trimming).
pub fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
