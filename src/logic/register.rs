//! Registration: players are found (or created) by handle and attached to the tournament.

use crate::logic::TournamentError;
use crate::models::{Attendee, TournamentId};
use crate::store::{Store, StoreError};
use log::info;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub handle: String,
}

/// Register `players`, returning the attendees that were newly added.
///
/// Re-registering a player is a no-op, except for a self-registration where it is reported
/// as `AlreadyRegistered`. Registration closes once the tournament has started.
pub fn register_players<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    players: &[NewPlayer],
    self_register: bool,
) -> Result<Vec<Attendee>, TournamentError> {
    if store.tournament(tournament_id)?.is_started() {
        return Err(TournamentError::AlreadyRunning);
    }

    let mut added = Vec::with_capacity(players.len());
    for p in players {
        let player = store.upsert_player(p.name.trim(), p.handle.trim())?;
        match store.register(tournament_id, player.id)? {
            Some(attendee) => added.push(attendee),
            None if self_register => return Err(StoreError::AlreadyRegistered.into()),
            None => {}
        }
    }
    info!(
        "Registered {} new players to tournament {}",
        added.len(),
        tournament_id
    );
    Ok(added)
}
