//! Read-only bracket snapshots for display.

use crate::bracket::{BracketTree, Seat};
use crate::logic::{hydrate, MatchQueue, TournamentError};
use crate::models::{AttendeeId, Entrant, Matchup, Outcome, TournamentId};
use crate::store::Store;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct SeatView {
    pub seat: Seat,
    pub attendee_id: Option<AttendeeId>,
    pub name: Option<String>,
    pub outcome: Outcome,
    pub completed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoundView {
    pub round: usize,
    pub seats: Vec<SeatView>,
}

/// Every round of the bracket (leaves first) plus the winner once decided.
#[derive(Clone, Debug, Serialize)]
pub struct BracketView {
    pub tournament_id: TournamentId,
    pub size: usize,
    pub running: bool,
    pub open_match: Option<Matchup>,
    pub rounds: Vec<RoundView>,
    pub winner: Option<String>,
    /// Seat layout, one node per line.
    pub text: String,
}

impl BracketView {
    fn from_tree(tournament_id: TournamentId, tree: &BracketTree<Entrant>) -> Self {
        let rounds = tree
            .seat_round_pos()
            .iter()
            .map(|(&round, seats)| RoundView {
                round,
                seats: seats
                    .iter()
                    .map(|&seat| {
                        let entrant = tree.search(seat).ok().and_then(|n| n.payload.as_ref());
                        SeatView {
                            seat,
                            attendee_id: entrant.map(Entrant::id),
                            name: entrant.map(|e| e.name().to_string()),
                            outcome: entrant.map(|e| e.outcome).unwrap_or_default(),
                            completed: entrant.is_some_and(|e| e.completed),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            tournament_id,
            size: tree.size(),
            running: false,
            open_match: None,
            rounds,
            winner: tree
                .winner()
                .ok()
                .and_then(|n| n.payload.as_ref())
                .map(|e| e.name().to_string()),
            text: tree.to_string(),
        }
    }
}

/// Rebuild a tournament's bracket from stored seats and history.
pub fn load_bracket<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<BracketTree<Entrant>, TournamentError> {
    let tournament = store.tournament(tournament_id)?;
    let mut tree = BracketTree::from_size(tournament.size)?;
    hydrate(&mut tree, &store.current_history(tournament_id)?)?;
    Ok(tree)
}

/// Snapshot of the live bracket when the tournament is running, else of the stored one.
pub fn bracket_view<S: Store + ?Sized>(
    store: &S,
    queue: &MatchQueue,
    tournament_id: TournamentId,
) -> Result<BracketView, TournamentError> {
    if let Some(mut view) = queue.with_bracket(tournament_id, |tree| BracketView::from_tree(tournament_id, tree)) {
        view.running = true;
        view.open_match = queue.open_match(tournament_id);
        return Ok(view);
    }
    let tree = load_bracket(store, tournament_id)?;
    Ok(BracketView::from_tree(tournament_id, &tree))
}
