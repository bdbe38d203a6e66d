//! Single-elimination bracket: seat tree, static match templates, seeding strategies.

mod error;
mod node;
pub mod seeds;
pub mod templates;
mod tree;

pub use error::BracketError;
pub use node::Node;
pub use seeds::Strategy;
pub use templates::MatchTemplate;
pub use tree::BracketTree;

/// Position of a node in the bracket tree (1..=node count).
pub type Seat = usize;
