//! Seeding before start: a full ordered seed list, or one attendee inserted at a slot.

use crate::bracket::{seeds, BracketTree, Strategy};
use crate::logic::{MatchQueue, TournamentError};
use crate::models::{Attendee, AttendeeId, PlayerId, TournamentId, TournamentRecord};
use crate::store::{Store, StoreError, StoreTx};
use log::info;
use std::collections::HashSet;

fn ensure_not_started<S: Store + ?Sized>(
    store: &S,
    queue: &MatchQueue,
    tournament_id: TournamentId,
) -> Result<TournamentRecord, TournamentError> {
    let tournament = store.tournament(tournament_id)?;
    if tournament.is_started() || queue.is_running(tournament_id) {
        return Err(TournamentError::AlreadyRunning);
    }
    Ok(tournament)
}

/// Replace all starting seats with `players` arranged best-against-worst, best first.
/// Players beyond the bracket's capacity are left unseated. Each player may appear once.
pub fn seed_players<S: Store + ?Sized>(
    store: &S,
    queue: &MatchQueue,
    tournament_id: TournamentId,
    players: &[PlayerId],
) -> Result<Vec<Attendee>, TournamentError> {
    let tournament = ensure_not_started(store, queue, tournament_id)?;
    let mut listed = HashSet::with_capacity(players.len());
    if let Some(&dup) = players.iter().find(|&&pid| !listed.insert(pid)) {
        return Err(TournamentError::DuplicateSeed(dup));
    }
    let attendees = store.attendees(tournament_id, false)?;

    let ordered = players
        .iter()
        .map(|pid| {
            attendees
                .iter()
                .find(|a| a.player.id == *pid)
                .cloned()
                .ok_or(StoreError::NotRegistered(*pid))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut tree = BracketTree::<Attendee>::from_size(tournament.size)?;
    let capacity = tree.starting_seats().len();
    let arranged = seeds::arrange(ordered, Strategy::BestAgainstWorst, capacity)?;

    let mut tx = StoreTx::new();
    tx.reset_seats(tournament_id);
    for (index, attendee) in arranged.into_iter().enumerate() {
        if let Some(attendee) = attendee {
            let id = attendee.id;
            let seat = tree.seed(index + 1, attendee)?.seat;
            tx.set_starting_seat(id, seat);
        }
    }
    store.commit(tx)?;
    info!(
        "Seeded {} players into tournament {}",
        players.len().min(capacity),
        tournament_id
    );

    Ok(store.attendees(tournament_id, true)?)
}

/// Put one attendee at the 1-based starting `slot`. An occupied slot pushes its occupant and
/// everyone after it one slot later; fails with `BracketFull` if the last slot is taken.
pub fn insert_seed<S: Store + ?Sized>(
    store: &S,
    queue: &MatchQueue,
    tournament_id: TournamentId,
    attendee_id: AttendeeId,
    slot: usize,
) -> Result<Vec<Attendee>, TournamentError> {
    let tournament = ensure_not_started(store, queue, tournament_id)?;
    let attendees = store.attendees(tournament_id, false)?;
    let target = attendees
        .iter()
        .find(|a| a.id == attendee_id)
        .cloned()
        .ok_or(StoreError::AttendeeNotFound(attendee_id))?;

    let mut tree = BracketTree::<AttendeeId>::from_size(tournament.size)?;
    for attendee in attendees.iter().filter(|a| a.id != attendee_id) {
        if let Some(seat) = attendee.starting_seat {
            tree.put(seat, attendee.id)?;
        }
    }
    tree.seed(slot, target.id)?;

    let mut tx = StoreTx::new();
    tx.reset_seats(tournament_id);
    for &seat in tree.starting_seats() {
        if let Some(id) = tree.search(seat)?.payload {
            tx.set_starting_seat(id, seat);
        }
    }
    store.commit(tx)?;
    info!(
        "Inserted {} at slot {} of tournament {}",
        target.name(),
        slot,
        tournament_id
    );

    Ok(store.attendees(tournament_id, true)?)
}
