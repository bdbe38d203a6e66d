//! Tournament record as kept by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub id: TournamentId,
    pub name: String,
    pub description: Option<String>,
    /// Bracket size (player cap); always a size with a match template.
    pub size: usize,
    /// Set on first start; a started tournament resumes instead of reseeding.
    pub starting_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TournamentRecord {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            size,
            starting_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_started(&self) -> bool {
        self.starting_at.is_some()
    }
}
