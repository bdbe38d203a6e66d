//! Tournament business logic: registration, seeding, start/resume, results, restart, export.

mod export;
pub mod queue;
mod register;
mod restart;
mod result;
mod seed;
mod start;
mod view;

pub use export::export_attendees;
pub use queue::{MatchQueue, QueueError};
pub use register::{register_players, NewPlayer};
pub use restart::restart_tournament;
pub use result::{move_attendee, submit_result, Submission};
pub use seed::{insert_seed, seed_players};
pub use start::{hydrate, plan_matches, resolve_bracket_size, start_tournament, StartReport};
pub use view::{bracket_view, load_bracket, BracketView, RoundView, SeatView};

use crate::bracket::BracketError;
use crate::models::PlayerId;
use crate::store::StoreError;
use thiserror::Error;

/// Errors from tournament operations.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("not enough seeded players to start, need at least {required}")]
    NotEnoughSeeds { required: usize },
    #[error("too many players for the largest bracket ({max})")]
    TooManyEntrants { max: usize },
    #[error("tournament is already running")]
    AlreadyRunning,
    #[error("player {0} is listed more than once in the seed list")]
    DuplicateSeed(PlayerId),
    #[error("no records found")]
    NoRecords,
    #[error(transparent)]
    Bracket(#[from] BracketError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}
