//! Restart: back to the starting seats with no results, queue cleared.

use crate::logic::{MatchQueue, QueueError, TournamentError};
use crate::models::{TournamentId, TournamentRecord};
use crate::store::{Store, StoreTx};
use log::info;

pub fn restart_tournament<S: Store + ?Sized>(
    store: &S,
    queue: &MatchQueue,
    tournament_id: TournamentId,
) -> Result<TournamentRecord, TournamentError> {
    store.tournament(tournament_id)?;

    let mut tx = StoreTx::new();
    tx.reset_to_starting_seats(tournament_id)
        .clear_history(tournament_id)
        .clear_started(tournament_id);
    store.commit(tx)?;

    match queue.cancel(tournament_id) {
        Ok(()) | Err(QueueError::NotRegistered(_)) => {}
        Err(e) => return Err(e.into()),
    }
    info!("Tournament {} restarted", tournament_id);
    Ok(store.tournament(tournament_id)?)
}
