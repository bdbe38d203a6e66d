//! Errors raised by bracket construction, lookup, seeding and advancement.

use crate::bracket::Seat;
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BracketError {
    /// Player count was zero.
    #[error("bracket size must be greater than 0")]
    InvalidSize,
    /// No match template is registered for this exact size.
    #[error("no match template for a bracket of {0} players")]
    TemplateNotFound(usize),
    /// Seed slot (1-based) outside the starting seats.
    #[error("seed slot {slot} is out of bounds (1..={len})")]
    OutOfBounds { slot: usize, len: usize },
    #[error("seat {0} does not exist in this bracket")]
    SeatNotFound(Seat),
    /// Seat has no outgoing template entry (the root, or a seat outside the tree).
    #[error("seat {0} does not advance anywhere")]
    NoTemplateEntry(Seat),
    #[error("bracket winner has not been determined yet")]
    NotDetermined,
    #[error("cannot seed an empty list")]
    EmptyPayload,
    /// Inserting would push the occupant of the last starting seat out of the bracket.
    #[error("every starting seat after slot {0} is taken, nothing can be displaced")]
    BracketFull(usize),
    #[error("no nodes recorded for round {0}")]
    NoNodesInRound(usize),
}
