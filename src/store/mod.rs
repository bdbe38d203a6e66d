//! Persistence seam: the read/write operations the bracket runner needs from a store,
//! and a write batch that is committed atomically.

mod memory;

pub use memory::MemoryStore;

use crate::bracket::Seat;
use crate::models::{
    Attendee, AttendeeHistory, AttendeeId, Outcome, Player, PlayerId, TournamentId,
    TournamentRecord,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),
    #[error("attendee {0} not found")]
    AttendeeNotFound(AttendeeId),
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("player {0} is not registered to this tournament")]
    NotRegistered(PlayerId),
    #[error("you are already registered to this tournament")]
    AlreadyRegistered,
    #[error("tournament is full ({0} players)")]
    TournamentFull(usize),
    #[error("store lock poisoned")]
    Lock,
}

/// One staged write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Write {
    /// Sets both the starting and the current seat.
    SetStartingSeat { attendee: AttendeeId, seat: Seat },
    SetCurrentSeat { attendee: AttendeeId, seat: Seat },
    InsertHistory {
        attendee: AttendeeId,
        outcome: Outcome,
        seat: Seat,
    },
    /// Unseat every attendee of the tournament.
    ResetSeats { tournament: TournamentId },
    /// Current seat back to starting seat for every attendee.
    ResetToStartingSeats { tournament: TournamentId },
    ClearHistory { tournament: TournamentId },
    /// Keeps an existing start time.
    MarkStarted {
        tournament: TournamentId,
        at: DateTime<Utc>,
    },
    ClearStarted { tournament: TournamentId },
    SetSize { tournament: TournamentId, size: usize },
}

/// Write batch; nothing is applied until [`Store::commit`].
#[derive(Clone, Debug, Default)]
pub struct StoreTx {
    writes: Vec<Write>,
}

impl StoreTx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn set_starting_seat(&mut self, attendee: AttendeeId, seat: Seat) -> &mut Self {
        self.writes.push(Write::SetStartingSeat { attendee, seat });
        self
    }

    pub fn set_current_seat(&mut self, attendee: AttendeeId, seat: Seat) -> &mut Self {
        self.writes.push(Write::SetCurrentSeat { attendee, seat });
        self
    }

    pub fn insert_history(&mut self, attendee: AttendeeId, outcome: Outcome, seat: Seat) -> &mut Self {
        self.writes.push(Write::InsertHistory {
            attendee,
            outcome,
            seat,
        });
        self
    }

    pub fn reset_seats(&mut self, tournament: TournamentId) -> &mut Self {
        self.writes.push(Write::ResetSeats { tournament });
        self
    }

    pub fn reset_to_starting_seats(&mut self, tournament: TournamentId) -> &mut Self {
        self.writes.push(Write::ResetToStartingSeats { tournament });
        self
    }

    pub fn clear_history(&mut self, tournament: TournamentId) -> &mut Self {
        self.writes.push(Write::ClearHistory { tournament });
        self
    }

    pub fn mark_started(&mut self, tournament: TournamentId, at: DateTime<Utc>) -> &mut Self {
        self.writes.push(Write::MarkStarted { tournament, at });
        self
    }

    pub fn clear_started(&mut self, tournament: TournamentId) -> &mut Self {
        self.writes.push(Write::ClearStarted { tournament });
        self
    }

    pub fn set_size(&mut self, tournament: TournamentId, size: usize) -> &mut Self {
        self.writes.push(Write::SetSize { tournament, size });
        self
    }
}

/// Everything the bracket runner reads from or writes to persistent storage.
pub trait Store: Send + Sync {
    fn create_tournament(&self, record: TournamentRecord) -> Result<TournamentRecord, StoreError>;

    fn tournament(&self, id: TournamentId) -> Result<TournamentRecord, StoreError>;

    fn list_tournaments(&self) -> Result<Vec<TournamentRecord>, StoreError>;

    /// Find a player by handle, creating it when unknown.
    fn upsert_player(&self, name: &str, handle: &str) -> Result<Player, StoreError>;

    /// Register a player; `None` when they already were.
    fn register(&self, tournament: TournamentId, player: PlayerId) -> Result<Option<Attendee>, StoreError>;

    /// Attendees ordered by registration; `seeded_only` keeps those with a current seat.
    fn attendees(&self, tournament: TournamentId, seeded_only: bool) -> Result<Vec<Attendee>, StoreError>;

    /// Seated attendees with their match-history rows.
    fn current_history(&self, tournament: TournamentId) -> Result<Vec<AttendeeHistory>, StoreError>;

    /// Apply every write or none.
    fn commit(&self, tx: StoreTx) -> Result<(), StoreError>;
}
