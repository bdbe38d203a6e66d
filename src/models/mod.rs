//! Data structures for the bracket runner: players, attendees, entrants, matches, history.

mod game;
mod player;
mod tournament;

pub use game::{AttendeeHistory, Entrant, History, MatchResult, MatchSlot, Matchup, Outcome, PlannedMatch};
pub use player::{Attendee, AttendeeId, Player, PlayerId};
pub use tournament::{TournamentId, TournamentRecord};
