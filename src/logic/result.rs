//! Result submission: the in-memory advancement and the history/seat writes happen together.

use crate::bracket::Seat;
use crate::logic::{MatchQueue, QueueError, TournamentError};
use crate::models::{AttendeeId, Entrant, MatchResult, Outcome, TournamentId};
use crate::store::{Store, StoreError, StoreTx};
use log::info;
use serde::Serialize;

/// Outcome of a submitted result.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Submission {
    /// The winner moved up; the next match will be presented.
    Advanced(MatchResult),
    /// The winner took the final: the tournament is over.
    Champion(MatchResult),
}

impl Submission {
    pub fn result(&self) -> &MatchResult {
        match self {
            Submission::Advanced(r) | Submission::Champion(r) => r,
        }
    }
}

fn persist_writes(result: &MatchResult) -> StoreTx {
    let mut tx = StoreTx::new();
    tx.insert_history(result.winner.id(), Outcome::Won, result.winner_seat);
    if let (Some(loser), Some(seat)) = (&result.loser, result.loser_seat) {
        tx.insert_history(loser.id(), Outcome::Lost, seat);
    }
    tx.set_current_seat(result.winner.id(), result.winner_to);
    tx
}

/// Declare `winner` the winner of the open match. With `match_number`, the submission is
/// rejected as stale unless that match is still the open one.
pub fn submit_result<S: Store + ?Sized>(
    store: &S,
    queue: &MatchQueue,
    tournament_id: TournamentId,
    winner: AttendeeId,
    match_number: Option<usize>,
) -> Result<Submission, TournamentError> {
    let persist = |result: &MatchResult| store.commit(persist_writes(result));
    let outcome = match match_number {
        Some(number) => queue.result_for(tournament_id, number, winner, persist),
        None => queue.result_with(tournament_id, winner, persist),
    };

    match outcome {
        Ok(result) => {
            info!(
                "{} advances to seat {} in tournament {}",
                result.winner.name(),
                result.winner_to,
                tournament_id
            );
            Ok(Submission::Advanced(result))
        }
        Err(QueueError::TournamentWinnerFound(result)) => Ok(Submission::Champion(*result)),
        Err(e) => Err(e.into()),
    }
}

/// Administrative override: place an attendee at `to` in the running bracket with its result
/// cleared, and record `to` as its current seat.
pub fn move_attendee<S: Store + ?Sized>(
    store: &S,
    queue: &MatchQueue,
    tournament_id: TournamentId,
    attendee_id: AttendeeId,
    to: Seat,
) -> Result<(), TournamentError> {
    let attendee = store
        .attendees(tournament_id, false)?
        .into_iter()
        .find(|a| a.id == attendee_id)
        .ok_or(StoreError::AttendeeNotFound(attendee_id))?;

    queue.move_with(tournament_id, Entrant::seeded(attendee), to, || {
        let mut tx = StoreTx::new();
        tx.set_current_seat(attendee_id, to);
        store.commit(tx)
    })?;
    info!("Moved attendee {} to seat {} in tournament {}", attendee_id, to, tournament_id);
    Ok(())
}
