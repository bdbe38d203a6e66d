//! Presentation board: what the match queue announced per tournament, readable by clients.

use crate::models::{MatchResult, Matchup, TournamentId};
use log::info;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// One announcement line, e.g. "Match 3 (round 2): Ann vs N/A".
#[derive(Clone, Debug, Serialize)]
pub struct Announcement {
    pub number: usize,
    pub round: usize,
    pub text: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct BoardEntry {
    /// Match waiting for a result.
    pub current: Option<Matchup>,
    pub log: Vec<Announcement>,
    pub champion: Option<MatchResult>,
}

#[derive(Clone, Default)]
pub struct MatchBoard {
    entries: Arc<RwLock<HashMap<TournamentId, BoardEntry>>>,
}

impl MatchBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly presented match. Used as the match queue's ready callback.
    pub fn announce(&self, matchup: Matchup) {
        let (p1, p2) = matchup.names();
        let text = format!(
            "Match {} (round {}): {} vs {}",
            matchup.number, matchup.round, p1, p2
        );
        info!("Tournament {}: {}", matchup.tournament_id, text);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(matchup.tournament_id).or_default();
        entry.log.push(Announcement {
            number: matchup.number,
            round: matchup.round,
            text,
        });
        entry.current = Some(matchup);
    }

    /// The open match got its result.
    pub fn resolve(&self, tournament_id: TournamentId, number: usize) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get_mut(&tournament_id) {
            if entry.current.as_ref().is_some_and(|m| m.number == number) {
                entry.current = None;
            }
        }
    }

    pub fn crown(&self, result: MatchResult) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(result.tournament_id).or_default();
        entry.current = None;
        entry.log.push(Announcement {
            number: entry.log.len() + 1,
            round: result.round,
            text: format!("{} wins the tournament", result.winner.name()),
        });
        entry.champion = Some(result);
    }

    pub fn clear(&self, tournament_id: TournamentId) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&tournament_id);
    }

    pub fn current(&self, tournament_id: TournamentId) -> Option<BoardEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&tournament_id).cloned()
    }
}
