//! In-memory store: tables behind one `RwLock`, so a commit is atomic with respect to readers.

use crate::bracket::Seat;
use crate::models::{
    Attendee, AttendeeHistory, AttendeeId, History, Player, PlayerId, TournamentId,
    TournamentRecord,
};
use crate::store::{Store, StoreError, StoreTx, Write};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Debug)]
struct AttendeeRow {
    tournament_id: TournamentId,
    player_id: PlayerId,
    starting_seat: Option<Seat>,
    current_seat: Option<Seat>,
}

#[derive(Debug, Default)]
struct Tables {
    tournaments: HashMap<TournamentId, TournamentRecord>,
    players: HashMap<PlayerId, Player>,
    attendees: BTreeMap<AttendeeId, AttendeeRow>,
    histories: Vec<History>,
    next_attendee: AttendeeId,
    next_history: u64,
}

impl Tables {
    fn attendee(&self, id: AttendeeId) -> Result<Attendee, StoreError> {
        let row = self
            .attendees
            .get(&id)
            .ok_or(StoreError::AttendeeNotFound(id))?;
        let player = self
            .players
            .get(&row.player_id)
            .cloned()
            .ok_or(StoreError::PlayerNotFound(row.player_id))?;
        Ok(Attendee {
            id,
            tournament_id: row.tournament_id,
            player,
            starting_seat: row.starting_seat,
            current_seat: row.current_seat,
        })
    }

    fn tournament_attendees(&self, tournament: TournamentId) -> impl Iterator<Item = (&AttendeeId, &AttendeeRow)> + '_ {
        self.attendees
            .iter()
            .filter(move |(_, row)| row.tournament_id == tournament)
    }

    fn check(&self, write: &Write) -> Result<(), StoreError> {
        match write {
            Write::SetStartingSeat { attendee, .. }
            | Write::SetCurrentSeat { attendee, .. }
            | Write::InsertHistory { attendee, .. } => {
                if !self.attendees.contains_key(attendee) {
                    return Err(StoreError::AttendeeNotFound(*attendee));
                }
            }
            Write::ResetSeats { tournament }
            | Write::ResetToStartingSeats { tournament }
            | Write::ClearHistory { tournament }
            | Write::MarkStarted { tournament, .. }
            | Write::ClearStarted { tournament }
            | Write::SetSize { tournament, .. } => {
                if !self.tournaments.contains_key(tournament) {
                    return Err(StoreError::TournamentNotFound(*tournament));
                }
            }
        }
        Ok(())
    }

    /// Only called after `check` passed for every write of the batch.
    fn apply(&mut self, write: Write) {
        match write {
            Write::SetStartingSeat { attendee, seat } => {
                if let Some(row) = self.attendees.get_mut(&attendee) {
                    row.starting_seat = Some(seat);
                    row.current_seat = Some(seat);
                }
            }
            Write::SetCurrentSeat { attendee, seat } => {
                if let Some(row) = self.attendees.get_mut(&attendee) {
                    row.current_seat = Some(seat);
                }
            }
            Write::InsertHistory {
                attendee,
                outcome,
                seat,
            } => {
                self.next_history += 1;
                self.histories.push(History {
                    id: self.next_history,
                    attendee_id: attendee,
                    outcome,
                    seat,
                    created_at: Utc::now(),
                });
            }
            Write::ResetSeats { tournament } => {
                for row in self.attendees.values_mut().filter(|r| r.tournament_id == tournament) {
                    row.starting_seat = None;
                    row.current_seat = None;
                }
            }
            Write::ResetToStartingSeats { tournament } => {
                for row in self.attendees.values_mut().filter(|r| r.tournament_id == tournament) {
                    row.current_seat = row.starting_seat;
                }
            }
            Write::ClearHistory { tournament } => {
                let attendees = &self.attendees;
                self.histories.retain(|h| {
                    attendees
                        .get(&h.attendee_id)
                        .map_or(true, |row| row.tournament_id != tournament)
                });
            }
            Write::MarkStarted { tournament, at } => {
                if let Some(t) = self.tournaments.get_mut(&tournament) {
                    t.starting_at.get_or_insert(at);
                }
            }
            Write::ClearStarted { tournament } => {
                if let Some(t) = self.tournaments.get_mut(&tournament) {
                    t.starting_at = None;
                }
            }
            Write::SetSize { tournament, size } => {
                if let Some(t) = self.tournaments.get_mut(&tournament) {
                    t.size = size;
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Lock)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::Lock)
    }
}

impl Store for MemoryStore {
    fn create_tournament(&self, record: TournamentRecord) -> Result<TournamentRecord, StoreError> {
        let mut tables = self.write()?;
        tables.tournaments.insert(record.id, record.clone());
        Ok(record)
    }

    fn tournament(&self, id: TournamentId) -> Result<TournamentRecord, StoreError> {
        self.read()?
            .tournaments
            .get(&id)
            .cloned()
            .ok_or(StoreError::TournamentNotFound(id))
    }

    fn list_tournaments(&self) -> Result<Vec<TournamentRecord>, StoreError> {
        let mut list: Vec<_> = self.read()?.tournaments.values().cloned().collect();
        list.sort_by_key(|t| t.created_at);
        Ok(list)
    }

    fn upsert_player(&self, name: &str, handle: &str) -> Result<Player, StoreError> {
        let mut tables = self.write()?;
        if let Some(existing) = tables.players.values().find(|p| p.handle == handle) {
            return Ok(existing.clone());
        }
        let player = Player::new(name, handle);
        tables.players.insert(player.id, player.clone());
        Ok(player)
    }

    fn register(&self, tournament: TournamentId, player: PlayerId) -> Result<Option<Attendee>, StoreError> {
        let mut tables = self.write()?;
        let size = tables
            .tournaments
            .get(&tournament)
            .map(|t| t.size)
            .ok_or(StoreError::TournamentNotFound(tournament))?;
        if !tables.players.contains_key(&player) {
            return Err(StoreError::PlayerNotFound(player));
        }
        let mut count = 0;
        for (_, row) in tables.tournament_attendees(tournament) {
            if row.player_id == player {
                return Ok(None);
            }
            count += 1;
        }
        if count >= size {
            return Err(StoreError::TournamentFull(size));
        }

        tables.next_attendee += 1;
        let id = tables.next_attendee;
        tables.attendees.insert(
            id,
            AttendeeRow {
                tournament_id: tournament,
                player_id: player,
                starting_seat: None,
                current_seat: None,
            },
        );
        tables.attendee(id).map(Some)
    }

    fn attendees(&self, tournament: TournamentId, seeded_only: bool) -> Result<Vec<Attendee>, StoreError> {
        let tables = self.read()?;
        if !tables.tournaments.contains_key(&tournament) {
            return Err(StoreError::TournamentNotFound(tournament));
        }
        tables
            .tournament_attendees(tournament)
            .filter(|(_, row)| !seeded_only || row.current_seat.is_some())
            .map(|(&id, _)| tables.attendee(id))
            .collect()
    }

    fn current_history(&self, tournament: TournamentId) -> Result<Vec<AttendeeHistory>, StoreError> {
        let tables = self.read()?;
        if !tables.tournaments.contains_key(&tournament) {
            return Err(StoreError::TournamentNotFound(tournament));
        }
        tables
            .tournament_attendees(tournament)
            .filter(|(_, row)| row.current_seat.is_some())
            .map(|(&id, _)| {
                Ok(AttendeeHistory {
                    attendee: tables.attendee(id)?,
                    histories: tables
                        .histories
                        .iter()
                        .filter(|h| h.attendee_id == id)
                        .cloned()
                        .collect(),
                })
            })
            .collect()
    }

    fn commit(&self, tx: StoreTx) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        for write in tx.writes() {
            tables.check(write)?;
        }
        for write in tx.writes {
            tables.apply(write);
        }
        Ok(())
    }
}
