//! Single-elimination bracket runner: bracket tree, match queue and tournament logic.

pub mod board;
pub mod bracket;
pub mod config;
pub mod logic;
pub mod models;
pub mod permit;
pub mod store;

pub use board::{Announcement, BoardEntry, MatchBoard};
pub use bracket::{BracketError, BracketTree, MatchTemplate, Node, Seat, Strategy};
pub use config::{Config, ConfigError};
pub use logic::{
    bracket_view, export_attendees, insert_seed, load_bracket, move_attendee, register_players,
    restart_tournament, seed_players, start_tournament, submit_result, BracketView, MatchQueue,
    NewPlayer, QueueError, StartReport, Submission, TournamentError,
};
pub use models::{
    Attendee, AttendeeHistory, AttendeeId, Entrant, History, MatchResult, MatchSlot, Matchup,
    Outcome, PlannedMatch, Player, PlayerId, TournamentId, TournamentRecord,
};
pub use permit::{AdminKeyPermit, Permit, PermitError};
pub use store::{MemoryStore, Store, StoreError, StoreTx};
