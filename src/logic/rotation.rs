//! Round rotation: promote winners, demote losers, reflow everyone into fresh courts.
//!
//! The pipeline runs on a working copy of the players:
//! 1. [`partition_by_court`] groups player indices by their current court.
//! 2. [`resolve_court_outcome`] decides, per court, who won and where each player goes.
//! 3. [`reflow`] re-deals the whole population into courts of four and splits partners.
//!
//! Only the final list is written back to the tournament, together with the round advance.

use crate::models::{
    names_match, Player, Tournament, TournamentError, TournamentState, WinningPairs,
    PLAYERS_PER_COURT,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Why a court's winner logic was skipped this round. Never fatal: the court's
/// players keep their court and still take part in the reflow.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InvalidWinnerSelection {
    /// No winners were supplied for the court.
    NoSelection,
    /// The court does not hold exactly four players.
    NotFull { occupants: usize },
    /// The selection did not name exactly two players.
    WrongWinnerCount { named: usize },
    /// The names did not resolve to exactly two of the court's occupants.
    UnresolvedWinners { matched: usize },
    /// Court index lies past the configured courts (overflow group).
    OutOfRange { total_courts: usize },
}

impl std::fmt::Display for InvalidWinnerSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidWinnerSelection::NoSelection => write!(f, "no winners selected"),
            InvalidWinnerSelection::NotFull { occupants } => {
                write!(f, "court has {} players, needs {}", occupants, PLAYERS_PER_COURT)
            }
            InvalidWinnerSelection::WrongWinnerCount { named } => {
                write!(f, "{} winners named, need 2", named)
            }
            InvalidWinnerSelection::UnresolvedWinners { matched } => {
                write!(f, "only {} named winners play on this court", matched)
            }
            InvalidWinnerSelection::OutOfRange { total_courts } => {
                write!(f, "court is beyond the {} configured courts", total_courts)
            }
        }
    }
}

/// Result of the winner logic for one court. Indices refer to the occupant slice
/// passed to [`resolve_court_outcome`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CourtOutcome {
    Resolved {
        winners: [usize; 2],
        losers: [usize; 2],
        /// Court the winners move to (one up, court 0 stays).
        winner_court: usize,
        /// Court the losers move to (one down, bottom court stays).
        loser_court: usize,
    },
    Skipped(InvalidWinnerSelection),
}

/// A court whose winner logic did not run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct SkippedCourt {
    pub court: usize,
    #[serde(flatten)]
    pub reason: InvalidWinnerSelection,
}

/// What one call to [`rotate_players`] did.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RoundSummary {
    /// The round that was just played.
    pub round: u32,
    /// Courts whose winners were promoted and losers demoted.
    pub resolved: Vec<usize>,
    /// Courts left as they were before the reflow.
    pub skipped: Vec<SkippedCourt>,
    /// Trailing court left short by the reflow (player count not a multiple of four).
    pub partial_court: Option<usize>,
}

/// Group player indices by court, ascending court order. Indices within a court
/// keep the order of `players`.
pub fn partition_by_court(players: &[Player]) -> BTreeMap<usize, Vec<usize>> {
    let mut courts: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, p) in players.iter().enumerate() {
        courts.entry(p.court).or_default().push(idx);
    }
    courts
}

/// Decide a single court's result from its occupants and the names selected as winners.
///
/// Winner logic runs only on a full court inside the configured range, with exactly two
/// names that match (case-insensitively) exactly two occupants.
pub fn resolve_court_outcome(
    court: usize,
    occupants: &[&Player],
    selection: Option<&[String]>,
    total_courts: usize,
) -> CourtOutcome {
    use InvalidWinnerSelection::*;

    if court >= total_courts {
        return CourtOutcome::Skipped(OutOfRange { total_courts });
    }
    if occupants.len() != PLAYERS_PER_COURT {
        return CourtOutcome::Skipped(NotFull {
            occupants: occupants.len(),
        });
    }
    let names = match selection {
        Some(names) => names,
        None => return CourtOutcome::Skipped(NoSelection),
    };
    if names.len() != 2 {
        return CourtOutcome::Skipped(WrongWinnerCount { named: names.len() });
    }

    let (won, lost): (Vec<usize>, Vec<usize>) = (0..occupants.len())
        .partition(|&i| names.iter().any(|n| names_match(&occupants[i].name, n)));
    match (won.as_slice(), lost.as_slice()) {
        (&[w1, w2], &[l1, l2]) => CourtOutcome::Resolved {
            winners: [w1, w2],
            losers: [l1, l2],
            winner_court: court.saturating_sub(1),
            loser_court: (court + 1).min(total_courts - 1),
        },
        _ => CourtOutcome::Skipped(UnresolvedWinners { matched: won.len() }),
    }
}

/// Re-deal players into courts of four.
///
/// Players are stably sorted by court, then dealt in order: the i-th group of four
/// becomes court i. Each full group `[a, b, c, d]` is seated `a=1, c=2, b=3, d=4` so
/// pairs that arrived together are split up. A short trailing group is seated in order.
/// The returned list keeps the dealt order.
pub fn reflow(mut players: Vec<Player>) -> Vec<Player> {
    players.sort_by_key(|p| p.court);
    for (court, group) in players.chunks_mut(PLAYERS_PER_COURT).enumerate() {
        let full = group.len() == PLAYERS_PER_COURT;
        for (idx, p) in group.iter_mut().enumerate() {
            p.court = court;
            p.position = match (full, idx) {
                (true, 1) => 3,
                (true, 2) => 2,
                _ => idx as u8 + 1,
            };
        }
    }
    players
}

/// Play out a round: apply the selected winners, reflow all players, advance the round.
///
/// Never fails. Courts whose selection cannot be applied are reported in the summary
/// and logged; the round still advances.
pub fn rotate_players(tournament: &mut Tournament, winning_pairs: &WinningPairs) -> RoundSummary {
    let round = tournament.round_number;
    let total_courts = tournament.total_courts;
    let mut working = tournament.players.clone();
    let mut summary = RoundSummary {
        round,
        ..RoundSummary::default()
    };

    for (court, members) in partition_by_court(&working) {
        let occupants: Vec<&Player> = members.iter().map(|&i| &working[i]).collect();
        let selection = winning_pairs.get(&court).map(Vec::as_slice);
        match resolve_court_outcome(court, &occupants, selection, total_courts) {
            CourtOutcome::Resolved {
                winners,
                losers,
                winner_court,
                loser_court,
            } => {
                for w in winners {
                    let p = &mut working[members[w]];
                    p.add_win();
                    p.court = winner_court;
                }
                for l in losers {
                    working[members[l]].court = loser_court;
                }
                summary.resolved.push(court);
            }
            CourtOutcome::Skipped(reason) => {
                if selection.is_some() {
                    log::warn!("Round {}: court {} skipped: {}", round, court, reason);
                }
                summary.skipped.push(SkippedCourt { court, reason });
            }
        }
    }

    // Selections naming courts with no players.
    for court in winning_pairs.keys() {
        if !summary.resolved.contains(court) && !summary.skipped.iter().any(|s| s.court == *court) {
            log::warn!("Round {}: winners given for empty court {}", round, court);
        }
    }

    let reflowed = reflow(working);
    if reflowed.len() % PLAYERS_PER_COURT != 0 {
        let short = reflowed.len() / PLAYERS_PER_COURT;
        log::warn!(
            "Round {}: {} players leave court {} short; it sits out winner logic next round",
            round,
            reflowed.len() % PLAYERS_PER_COURT,
            short
        );
        summary.partial_court = Some(short);
    }

    tournament.players = reflowed;
    tournament.round_number = tournament.round_number.saturating_add(1);

    log::info!(
        "End of round {}: {} court(s) resolved, {} skipped",
        round,
        summary.resolved.len(),
        summary.skipped.len()
    );
    for p in &tournament.players {
        log::debug!(
            "Player: {}, Court: {}, Wins: {}, Pos: {}",
            p.name,
            p.court,
            p.wins,
            p.position
        );
    }
    summary
}

/// Submit a round's winners (tournament must be in progress).
pub fn submit_round(
    tournament: &mut Tournament,
    winning_pairs: &WinningPairs,
) -> Result<RoundSummary, TournamentError> {
    if tournament.state != TournamentState::InProgress {
        return Err(TournamentError::InvalidState);
    }
    Ok(rotate_players(tournament, winning_pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn court_of(names: &[&str], court: usize) -> Vec<Player> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Player::seated(*n, court, i as u8 + 1))
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn partition_keeps_list_order_within_court() {
        let mut players = court_of(&["A", "B"], 1);
        players.extend(court_of(&["C", "D"], 0));
        players.push(Player::seated("E", 1, 3));
        let groups = partition_by_court(&players);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(groups[&0], vec![2, 3]);
        assert_eq!(groups[&1], vec![0, 1, 4]);
    }

    #[test]
    fn resolve_promotes_and_demotes() {
        let players = court_of(&["A", "B", "C", "D"], 3);
        let occupants: Vec<&Player> = players.iter().collect();
        let outcome = resolve_court_outcome(3, &occupants, Some(&names(&["d", "B"])[..]), 8);
        assert_eq!(
            outcome,
            CourtOutcome::Resolved {
                winners: [1, 3],
                losers: [0, 2],
                winner_court: 2,
                loser_court: 4,
            }
        );
    }

    #[test]
    fn resolve_clamps_at_top_and_bottom() {
        let players = court_of(&["A", "B", "C", "D"], 0);
        let occupants: Vec<&Player> = players.iter().collect();
        let top = resolve_court_outcome(0, &occupants, Some(&names(&["A", "B"])[..]), 8);
        assert!(matches!(
            top,
            CourtOutcome::Resolved {
                winner_court: 0,
                loser_court: 1,
                ..
            }
        ));
        let bottom = resolve_court_outcome(7, &occupants, Some(&names(&["A", "B"])[..]), 8);
        assert!(matches!(
            bottom,
            CourtOutcome::Resolved {
                winner_court: 6,
                loser_court: 7,
                ..
            }
        ));
    }

    #[test]
    fn resolve_skips_invalid_selections() {
        use InvalidWinnerSelection::*;
        let players = court_of(&["A", "B", "C", "D"], 1);
        let occupants: Vec<&Player> = players.iter().collect();

        let cases = [
            (None, NoSelection),
            (Some(names(&["A"])), WrongWinnerCount { named: 1 }),
            (Some(names(&["A", "B", "C"])), WrongWinnerCount { named: 3 }),
            (Some(names(&["A", "Zed"])), UnresolvedWinners { matched: 1 }),
            (Some(names(&["A", "a"])), UnresolvedWinners { matched: 1 }),
        ];
        for (selection, reason) in cases {
            assert_eq!(
                resolve_court_outcome(1, &occupants, selection.as_deref(), 8),
                CourtOutcome::Skipped(reason)
            );
        }
        assert_eq!(
            resolve_court_outcome(1, &occupants[..3], Some(&names(&["A", "B"])[..]), 8),
            CourtOutcome::Skipped(NotFull { occupants: 3 })
        );
        assert_eq!(
            resolve_court_outcome(2, &occupants, Some(&names(&["A", "B"])[..]), 2),
            CourtOutcome::Skipped(OutOfRange { total_courts: 2 })
        );
    }

    #[test]
    fn reflow_splits_partners() {
        let players = court_of(&["A", "B", "C", "D"], 0);
        let out = reflow(players);
        let seats: Vec<(&str, u8)> = out.iter().map(|p| (p.name.as_str(), p.position)).collect();
        assert_eq!(seats, vec![("A", 1), ("B", 3), ("C", 2), ("D", 4)]);
    }

    #[test]
    fn reflow_is_stable_by_court() {
        let mut players = court_of(&["A", "B"], 2);
        players.extend(court_of(&["C", "D", "E", "F"], 0));
        players.extend(court_of(&["G", "H"], 2));
        let out = reflow(players);
        let order: Vec<(&str, usize)> = out.iter().map(|p| (p.name.as_str(), p.court)).collect();
        assert_eq!(
            order,
            vec![
                ("C", 0),
                ("D", 0),
                ("E", 0),
                ("F", 0),
                ("A", 1),
                ("B", 1),
                ("G", 1),
                ("H", 1)
            ]
        );
    }

    #[test]
    fn reflow_seats_short_trailing_group_in_order() {
        let mut players = court_of(&["A", "B", "C", "D"], 0);
        players.extend(court_of(&["E", "F"], 1));
        let out = reflow(players);
        let tail: Vec<(&str, usize, u8)> = out[4..]
            .iter()
            .map(|p| (p.name.as_str(), p.court, p.position))
            .collect();
        assert_eq!(tail, vec![("E", 1, 1), ("F", 1, 2)]);
    }

    #[test]
    fn round_number_stops_at_max() {
        let mut t = Tournament::with_players(court_of(&["A", "B", "C", "D"], 0), 1);
        t.round_number = u32::MAX;
        let summary = rotate_players(&mut t, &WinningPairs::new());
        assert_eq!(summary.round, u32::MAX);
        assert_eq!(t.round_number, u32::MAX);
    }

    #[test]
    fn submit_round_requires_in_progress() {
        let mut t = Tournament::new(1);
        assert_eq!(
            submit_round(&mut t, &WinningPairs::new()),
            Err(TournamentError::InvalidState)
        );
        assert_eq!(t.round_number, 1);
    }
}
