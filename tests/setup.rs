//! Integration tests for setup: roster import, seeding, starting.

use court_queen::{
    import_roster, seed_courts, start_tournament, submit_round, Tournament, TournamentError,
    TournamentState, WinningPairs,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashSet};

fn tournament_with_names(n: usize, total_courts: usize) -> Tournament {
    let mut t = Tournament::new(total_courts);
    for i in 0..n {
        t.add_player(format!("P{}", i + 1)).unwrap();
    }
    t
}

#[test]
fn import_roster_adds_players() {
    let mut t = Tournament::new(2);
    let csv = "name\nAlice\n Beth \nCathy\nDiana\n";
    assert_eq!(import_roster(&mut t, csv.as_bytes()).unwrap(), 4);
    let names: Vec<&str> = t.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Beth", "Cathy", "Diana"]);
}

#[test]
fn import_roster_keeps_supplied_seats_and_wins() {
    let mut t = Tournament::new(1);
    let csv = "name,court,position,wins\nA,0,4,2\nB,0,3,0\nC,0,2,1\nD,0,1,\n";
    import_roster(&mut t, csv.as_bytes()).unwrap();
    start_tournament(&mut t).unwrap();
    let seats: Vec<(&str, u8, u32)> = t
        .court_players(0)
        .iter()
        .map(|p| (p.name.as_str(), p.position, p.wins))
        .collect();
    assert_eq!(seats, vec![("D", 1, 0), ("C", 2, 1), ("B", 3, 0), ("A", 4, 2)]);
}

#[test]
fn import_roster_rejects_duplicates_and_bad_rows() {
    let mut t = Tournament::new(2);
    let dup = "name\nAlice\nALICE\n";
    assert_eq!(
        import_roster(&mut t, dup.as_bytes()),
        Err(TournamentError::DuplicatePlayerName)
    );
    assert!(t.players.is_empty());

    let bad = "name,court,position\nBeth,x,1\n";
    assert!(matches!(
        import_roster(&mut t, bad.as_bytes()),
        Err(TournamentError::Roster(_))
    ));
}

#[test]
fn failed_import_leaves_roster_unchanged() {
    let mut t = Tournament::new(2);
    let csv = "name,court,position\nAlice,0,1\nBeth,0,2\nCathy,x,3\n";
    assert!(matches!(
        import_roster(&mut t, csv.as_bytes()),
        Err(TournamentError::Roster(_))
    ));
    assert!(t.players.is_empty());

    t.add_player("Dora").unwrap();
    let dup = "name\nEve\ndora\n";
    assert_eq!(
        import_roster(&mut t, dup.as_bytes()),
        Err(TournamentError::DuplicatePlayerName)
    );
    let names: Vec<&str> = t.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Dora"]);
}

#[test]
fn seed_courts_deals_fours() {
    let mut t = tournament_with_names(10, 3);
    seed_courts(&mut t, &mut StdRng::seed_from_u64(7));
    let mut sizes: BTreeMap<usize, usize> = BTreeMap::new();
    let mut seats = HashSet::new();
    for p in &t.players {
        *sizes.entry(p.court).or_insert(0) += 1;
        assert!(seats.insert((p.court, p.position)));
    }
    assert_eq!(sizes, BTreeMap::from([(0, 4), (1, 4), (2, 2)]));
}

#[test]
fn start_requires_a_full_court() {
    let mut t = tournament_with_names(3, 2);
    assert_eq!(
        start_tournament(&mut t),
        Err(TournamentError::NotEnoughPlayersToStart { required: 4 })
    );
    assert_eq!(t.state, TournamentState::Setup);
}

#[test]
fn start_seeds_and_allows_rounds() {
    let mut t = tournament_with_names(8, 2);
    assert_eq!(
        submit_round(&mut t, &WinningPairs::new()),
        Err(TournamentError::InvalidState)
    );

    start_tournament(&mut t).unwrap();
    assert_eq!(t.state, TournamentState::InProgress);
    assert_eq!(t.round_number, 1);
    assert_eq!(t.courts_in_play(), vec![0, 1]);
    assert_eq!(start_tournament(&mut t), Err(TournamentError::InvalidState));

    let on_court: Vec<String> = t.court_players(1).iter().map(|p| p.name.clone()).collect();
    let mut winning_pairs = WinningPairs::new();
    winning_pairs.insert(1, vec![on_court[0].clone(), on_court[3].clone()]);
    let summary = submit_round(&mut t, &winning_pairs).unwrap();
    assert_eq!(summary.resolved, vec![1]);
    assert_eq!(t.round_number, 2);
    assert_eq!(t.player(&on_court[0]).unwrap().wins, 1);
    assert_eq!(t.player(&on_court[3]).unwrap().wins, 1);
}
