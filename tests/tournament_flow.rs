//! Integration tests for the tournament flow against the in-memory store:
//! registration, seeding, start/resume, results, restart and export.

use bracket_tournament_web::{
    bracket_view, export_attendees, insert_seed, move_attendee, register_players,
    restart_tournament, seed_players, start_tournament, submit_result, Attendee, BracketError,
    MatchQueue, Matchup, MemoryStore, NewPlayer, Outcome, QueueError, Store, StoreError,
    Submission, TournamentError, TournamentId, TournamentRecord,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

fn new_player(name: &str) -> NewPlayer {
    NewPlayer {
        name: name.to_string(),
        handle: name.to_lowercase(),
    }
}

fn setup(size: usize, names: &[&str]) -> (MemoryStore, TournamentId, Vec<Attendee>) {
    let store = MemoryStore::new();
    let t = store
        .create_tournament(TournamentRecord::new("Friday Cup", size))
        .unwrap();
    let players: Vec<NewPlayer> = names.iter().map(|n| new_player(n)).collect();
    let attendees = register_players(&store, t.id, &players, false).unwrap();
    (store, t.id, attendees)
}

fn seats_by_name(store: &MemoryStore, tid: TournamentId) -> HashMap<String, Option<usize>> {
    store
        .attendees(tid, false)
        .unwrap()
        .into_iter()
        .map(|a| (a.player.name.clone(), a.current_seat))
        .collect()
}

fn capture() -> (
    impl Fn(Matchup) + Send + Sync + 'static,
    mpsc::UnboundedReceiver<Matchup>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        move |m| {
            let _ = tx.send(m);
        },
        rx,
    )
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Matchup>) -> Matchup {
    timeout(WAIT, rx.recv()).await.unwrap().unwrap()
}

fn p1_id(m: &Matchup) -> u64 {
    m.p1.entrant.as_ref().unwrap().id()
}

#[tokio::test]
async fn seeded_tournament_shrinks_and_runs_to_a_champion() {
    let (store, tid, attendees) = setup(8, &["Ann", "Bob", "Cid", "Dee"]);
    let queue = MatchQueue::new();
    let (_shutdown_tx, shutdown) = watch::channel(false);

    let order: Vec<_> = attendees.iter().map(|a| a.player.id).collect();
    let seeded = seed_players(&store, &queue, tid, &order).unwrap();
    assert_eq!(seeded.len(), 4);
    let seats = seats_by_name(&store, tid);
    assert_eq!(seats["Ann"], Some(1));
    assert_eq!(seats["Bob"], Some(15));

    let (on_ready, mut rx) = capture();
    let report = start_tournament(&store, &queue, tid, shutdown, on_ready).unwrap();
    assert!(!report.resumed);
    assert!(report.reseeded);
    assert_eq!(report.tournament.size, 4);
    assert_eq!(report.planned, 3);
    assert!(report.tournament.is_started());

    // Seed order survives the resize: 1 v 4 and 3 v 2.
    let seats = seats_by_name(&store, tid);
    assert_eq!(
        (seats["Ann"], seats["Dee"], seats["Cid"], seats["Bob"]),
        (Some(1), Some(3), Some(5), Some(7))
    );

    let m1 = next(&mut rx).await;
    assert_eq!(m1.names(), ("Ann", "Dee"));
    let first = submit_result(&store, &queue, tid, p1_id(&m1), Some(m1.number)).unwrap();
    assert!(matches!(first, Submission::Advanced(_)));
    assert_eq!(seats_by_name(&store, tid)["Ann"], Some(2));

    let m2 = next(&mut rx).await;
    assert_eq!(m2.names(), ("Cid", "Bob"));
    submit_result(&store, &queue, tid, p1_id(&m2), None).unwrap();

    let m3 = next(&mut rx).await;
    assert_eq!(m3.names(), ("Ann", "Cid"));
    match submit_result(&store, &queue, tid, p1_id(&m3), None).unwrap() {
        Submission::Champion(result) => {
            assert_eq!(result.winner.name(), "Ann");
            assert_eq!(result.winner_to, 4);
        }
        other => panic!("expected champion, got {other:?}"),
    }
    assert!(timeout(WAIT, report.driver).await.unwrap().unwrap().is_ok());

    let history = store.current_history(tid).unwrap();
    let ann = history.iter().find(|h| h.attendee.name() == "Ann").unwrap();
    assert_eq!(ann.attendee.current_seat, Some(4));
    let won: Vec<(usize, Outcome)> = ann.histories.iter().map(|h| (h.seat, h.outcome)).collect();
    assert_eq!(won, vec![(1, Outcome::Won), (2, Outcome::Won)]);

    let view = bracket_view(&store, &queue, tid).unwrap();
    assert!(!view.running);
    assert_eq!(view.winner.as_deref(), Some("Ann"));
    assert_eq!(view.rounds.len(), 3);
}

#[tokio::test]
async fn started_tournament_resumes_from_recorded_results() {
    let (store, tid, _) = setup(4, &["Ann", "Bob", "Cid", "Dee"]);
    let (_shutdown_tx, shutdown) = watch::channel(false);

    let queue = MatchQueue::new();
    let (on_ready, mut rx) = capture();
    start_tournament(&store, &queue, tid, shutdown.clone(), on_ready).unwrap();
    let m1 = next(&mut rx).await;
    let winner = p1_id(&m1);
    submit_result(&store, &queue, tid, winner, None).unwrap();

    // A fresh queue (e.g. after a process restart) picks up where the store left off.
    let fresh = MatchQueue::new();
    let (on_ready, mut rx) = capture();
    let report = start_tournament(&store, &fresh, tid, shutdown, on_ready).unwrap();
    assert!(report.resumed);
    assert!(!report.reseeded);
    assert_eq!(report.planned, 2);

    let m2 = next(&mut rx).await;
    assert_eq!(m2.seats(), [5, 7]);
    submit_result(&store, &fresh, tid, p1_id(&m2), None).unwrap();
    let m3 = next(&mut rx).await;
    assert_eq!(m3.seats(), [2, 6]);
    assert_eq!(p1_id(&m3), winner);
}

#[tokio::test]
async fn restart_restores_starting_seats() {
    let (store, tid, _) = setup(4, &["Ann", "Bob", "Cid", "Dee"]);
    let queue = MatchQueue::new();
    let (_shutdown_tx, shutdown) = watch::channel(false);

    // Nobody seeded: everyone is placed at random.
    let (on_ready, mut rx) = capture();
    let report = start_tournament(&store, &queue, tid, shutdown.clone(), on_ready).unwrap();
    assert!(report.reseeded);
    let starting = seats_by_name(&store, tid);
    assert!(starting.values().all(Option::is_some));

    let m1 = next(&mut rx).await;
    submit_result(&store, &queue, tid, p1_id(&m1), None).unwrap();
    assert_ne!(seats_by_name(&store, tid), starting);

    let t = restart_tournament(&store, &queue, tid).unwrap();
    assert!(!t.is_started());
    assert!(!queue.is_running(tid));
    assert_eq!(seats_by_name(&store, tid), starting);
    assert!(store
        .current_history(tid)
        .unwrap()
        .iter()
        .all(|h| h.histories.is_empty()));
    // The cancelled run drops its callback; at most the already presented match is buffered.
    while timeout(WAIT, rx.recv()).await.unwrap().is_some() {}

    // Starting again keeps the seats and plays from the first match.
    let (on_ready, mut rx) = capture();
    let report = start_tournament(&store, &queue, tid, shutdown, on_ready).unwrap();
    assert!(!report.resumed && !report.reseeded);
    assert_eq!(next(&mut rx).await.seats(), [1, 3]);
}

#[tokio::test]
async fn seeding_is_closed_once_started() {
    let (store, tid, attendees) = setup(4, &["Ann", "Bob"]);
    let queue = MatchQueue::new();
    let (_shutdown_tx, shutdown) = watch::channel(false);

    let (on_ready, _rx) = capture();
    let report = start_tournament(&store, &queue, tid, shutdown, on_ready).unwrap();
    assert_eq!(report.tournament.size, 2);

    let order: Vec<_> = attendees.iter().map(|a| a.player.id).collect();
    assert!(matches!(
        seed_players(&store, &queue, tid, &order),
        Err(TournamentError::AlreadyRunning)
    ));
    assert!(matches!(
        register_players(&store, tid, &[new_player("Late")], false),
        Err(TournamentError::AlreadyRunning)
    ));
}

#[test]
fn seed_list_with_a_repeated_player_is_rejected() {
    let (store, tid, attendees) = setup(4, &["Ann", "Bob", "Cid"]);
    let queue = MatchQueue::new();
    let id = |name: &str| attendees.iter().find(|a| a.name() == name).unwrap().player.id;

    let order = [id("Ann"), id("Bob"), id("Ann"), id("Cid")];
    assert!(matches!(
        seed_players(&store, &queue, tid, &order),
        Err(TournamentError::DuplicateSeed(pid)) if pid == id("Ann")
    ));
    assert!(seats_by_name(&store, tid).values().all(Option::is_none));

    seed_players(&store, &queue, tid, &[id("Ann"), id("Bob"), id("Cid")]).unwrap();
    assert_eq!(seats_by_name(&store, tid)["Ann"], Some(1));
}

#[tokio::test]
async fn start_needs_two_entrants() {
    let (store, tid, _) = setup(4, &[]);
    let queue = MatchQueue::new();
    let (_shutdown_tx, shutdown) = watch::channel(false);
    let (on_ready, _rx) = capture();
    assert!(matches!(
        start_tournament(&store, &queue, tid, shutdown.clone(), on_ready),
        Err(TournamentError::NotEnoughSeeds { required: 2 })
    ));

    register_players(&store, tid, &[new_player("Solo")], false).unwrap();
    let (on_ready, _rx) = capture();
    assert!(matches!(
        start_tournament(&store, &queue, tid, shutdown, on_ready),
        Err(TournamentError::NotEnoughSeeds { required: 2 })
    ));
    assert!(!store.tournament(tid).unwrap().is_started());
}

#[test]
fn manual_seed_insert_displaces_later_seeds() {
    let (store, tid, attendees) = setup(4, &["Ann", "Bob", "Cid", "Dee"]);
    let queue = MatchQueue::new();
    let id = |name: &str| attendees.iter().find(|a| a.name() == name).unwrap().id;

    insert_seed(&store, &queue, tid, id("Ann"), 1).unwrap();
    insert_seed(&store, &queue, tid, id("Bob"), 1).unwrap();
    insert_seed(&store, &queue, tid, id("Cid"), 2).unwrap();
    insert_seed(&store, &queue, tid, id("Dee"), 4).unwrap();
    let seats = seats_by_name(&store, tid);
    assert_eq!(
        (seats["Bob"], seats["Cid"], seats["Ann"], seats["Dee"]),
        (Some(1), Some(3), Some(5), Some(7))
    );

    // Re-inserting a seated attendee frees its old seat first.
    insert_seed(&store, &queue, tid, id("Dee"), 1).unwrap();
    let seats = seats_by_name(&store, tid);
    assert_eq!(
        (seats["Dee"], seats["Bob"], seats["Cid"], seats["Ann"]),
        (Some(1), Some(3), Some(5), Some(7))
    );

    assert!(matches!(
        insert_seed(&store, &queue, tid, id("Ann"), 5),
        Err(TournamentError::Bracket(BracketError::OutOfBounds { slot: 5, len: 4 }))
    ));
}

#[test]
fn registration_rules() {
    let (store, tid, added) = setup(2, &["Ann", "Bob"]);
    assert_eq!(added.len(), 2);

    // Admin re-registration is a no-op, self re-registration is reported.
    assert!(register_players(&store, tid, &[new_player("Ann")], false)
        .unwrap()
        .is_empty());
    assert!(matches!(
        register_players(&store, tid, &[new_player("Ann")], true),
        Err(TournamentError::Store(StoreError::AlreadyRegistered))
    ));
    assert!(matches!(
        register_players(&store, tid, &[new_player("Cid")], false),
        Err(TournamentError::Store(StoreError::TournamentFull(2)))
    ));
}

#[test]
fn export_lists_attendees_as_csv() {
    let (store, tid, attendees) = setup(4, &["Ann", "Bob"]);
    let queue = MatchQueue::new();

    assert!(matches!(
        export_attendees(&store, tid, true),
        Err(TournamentError::NoRecords)
    ));

    insert_seed(&store, &queue, tid, attendees[0].id, 2).unwrap();
    let all = String::from_utf8(export_attendees(&store, tid, false).unwrap()).unwrap();
    assert_eq!(all, "name,handle,current_seat\nAnn,ann,3\nBob,bob,\n");

    let seeded = String::from_utf8(export_attendees(&store, tid, true).unwrap()).unwrap();
    assert_eq!(seeded, "name,handle,current_seat\nAnn,ann,3\n");
}

#[tokio::test]
async fn move_records_the_seat_only_for_a_running_bracket() {
    let (store, tid, attendees) = setup(4, &["Ann", "Bob", "Cid", "Dee"]);
    let queue = MatchQueue::new();
    let ann = attendees.iter().find(|a| a.name() == "Ann").unwrap().id;

    // No running queue: nothing is written.
    let before = seats_by_name(&store, tid);
    assert!(matches!(
        move_attendee(&store, &queue, tid, ann, 2),
        Err(TournamentError::Queue(QueueError::NotRegistered(_)))
    ));
    assert_eq!(seats_by_name(&store, tid), before);

    let (_shutdown_tx, shutdown) = watch::channel(false);
    let (on_ready, mut rx) = capture();
    start_tournament(&store, &queue, tid, shutdown, on_ready).unwrap();
    next(&mut rx).await;

    assert!(move_attendee(&store, &queue, tid, ann, 99).is_err());
    assert_ne!(seats_by_name(&store, tid)["Ann"], Some(99));

    move_attendee(&store, &queue, tid, ann, 4).unwrap();
    assert_eq!(seats_by_name(&store, tid)["Ann"], Some(4));
    let at_root = queue
        .with_bracket(tid, |bt| bt.search(4).unwrap().payload.clone())
        .unwrap()
        .unwrap();
    assert_eq!(at_root.id(), ann);
}
