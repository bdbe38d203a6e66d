//! Player and Attendee data structures.

use crate::bracket::Seat;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (shared across tournaments).
pub type PlayerId = Uuid;

/// Row id of a player's registration in one tournament.
pub type AttendeeId = u64;

/// A person who can enter tournaments.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// External chat handle, unique per player.
    pub handle: String,
}

impl Player {
    pub fn new(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            handle: handle.into(),
        }
    }
}

/// A player's registration in one tournament, with where they sit in its bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: AttendeeId,
    pub tournament_id: TournamentId,
    pub player: Player,
    /// Seat assigned by seeding; restored on restart.
    pub starting_seat: Option<Seat>,
    /// Seat the attendee occupies now (moves up as they win).
    pub current_seat: Option<Seat>,
}

impl Attendee {
    /// Unseated attendee.
    pub fn new(id: AttendeeId, tournament_id: TournamentId, player: Player) -> Self {
        Self {
            id,
            tournament_id,
            player,
            starting_seat: None,
            current_seat: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.player.name
    }

    pub fn is_seated(&self) -> bool {
        self.current_seat.is_some()
    }
}
