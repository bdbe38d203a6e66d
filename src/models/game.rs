//! Entrant payloads, matchups presented to players, results and match history.

use crate::bracket::Seat;
use crate::models::player::{Attendee, AttendeeId};
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one match for one attendee.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Pending,
    Won,
    Lost,
}

/// What sits on a bracket node: an attendee plus the outcome at that seat.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub attendee: Attendee,
    pub outcome: Outcome,
    /// Already played from this seat (restored from history).
    pub completed: bool,
}

impl Entrant {
    /// Fresh occupant: no result yet.
    pub fn seeded(attendee: Attendee) -> Self {
        Self {
            attendee,
            outcome: Outcome::Pending,
            completed: false,
        }
    }

    pub fn played(attendee: Attendee, outcome: Outcome) -> Self {
        Self {
            attendee,
            outcome,
            completed: true,
        }
    }

    pub fn id(&self) -> AttendeeId {
        self.attendee.id
    }

    pub fn name(&self) -> &str {
        self.attendee.name()
    }
}

/// Pairing computed before the queue starts; participants are re-read at presentation time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlannedMatch {
    pub round: usize,
    pub seats: [Seat; 2],
}

/// One side of a presented match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchSlot {
    pub seat: Seat,
    /// None for an empty branch (bye).
    pub entrant: Option<Entrant>,
}

/// A match handed to the presentation layer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub tournament_id: TournamentId,
    pub round: usize,
    /// 1-based order of presentation within this run.
    pub number: usize,
    pub p1: MatchSlot,
    pub p2: MatchSlot,
}

impl Matchup {
    pub fn seats(&self) -> [Seat; 2] {
        [self.p1.seat, self.p2.seat]
    }

    pub fn is_bye(&self) -> bool {
        self.p1.entrant.is_none() || self.p2.entrant.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.p1.entrant.is_none() && self.p2.entrant.is_none()
    }

    /// Display name per side, "N/A" for an empty one.
    pub fn names(&self) -> (&str, &str) {
        fn name(slot: &MatchSlot) -> &str {
            slot.entrant.as_ref().map_or("N/A", Entrant::name)
        }
        (name(&self.p1), name(&self.p2))
    }
}

/// Resolution of the open match: who won, who lost, where the winner goes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub tournament_id: TournamentId,
    pub round: usize,
    /// Presentation number of the match this resolves.
    pub number: usize,
    pub winner: Entrant,
    /// Seat the winner played from.
    pub winner_seat: Seat,
    pub loser: Option<Entrant>,
    pub loser_seat: Option<Seat>,
    pub winner_to: Seat,
    /// The winner moved into the root: the tournament is decided.
    pub decided: bool,
}

/// One match-history row.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub id: u64,
    pub attendee_id: AttendeeId,
    pub outcome: Outcome,
    pub seat: Seat,
    pub created_at: DateTime<Utc>,
}

/// An attendee together with every seat they already played from.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AttendeeHistory {
    pub attendee: Attendee,
    pub histories: Vec<History>,
}
