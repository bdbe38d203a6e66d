//! Start (or resume) a tournament: resolve the bracket size, reseed when needed, rebuild the
//! bracket from stored seats and history, plan the matches and hand them to the match queue.

use crate::bracket::templates::{self, SUPPORTED_SIZES};
use crate::bracket::{seeds, BracketError, BracketTree, Seat, Strategy};
use crate::logic::{MatchQueue, QueueError, TournamentError};
use crate::models::{Attendee, AttendeeHistory, Entrant, Matchup, PlannedMatch, TournamentId, TournamentRecord};
use crate::store::{Store, StoreTx};
use chrono::Utc;
use log::info;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What `start_tournament` did.
#[derive(Debug, Serialize)]
pub struct StartReport {
    pub tournament: TournamentRecord,
    /// The tournament had already started; the run picks up from recorded results.
    pub resumed: bool,
    /// Starting seats were (re)assigned before starting.
    pub reseeded: bool,
    /// Matches handed to the queue.
    pub planned: usize,
    #[serde(skip)]
    pub driver: JoinHandle<Result<(), QueueError>>,
}

/// Smallest supported bracket size holding `entrants`, and whether it differs from `configured`
/// (a different size invalidates the current starting seats).
pub fn resolve_bracket_size(configured: usize, entrants: usize) -> Result<(usize, bool), TournamentError> {
    if entrants < templates::TOP_2 {
        return Err(TournamentError::NotEnoughSeeds {
            required: templates::TOP_2,
        });
    }
    let size = templates::smallest_fitting(entrants).ok_or(TournamentError::TooManyEntrants {
        max: SUPPORTED_SIZES[SUPPORTED_SIZES.len() - 1],
    })?;
    Ok((size, size != configured))
}

/// Place stored attendees into `tree`: each at its current seat (not yet played), then at every
/// seat it already played from, with the recorded outcome.
pub fn hydrate(tree: &mut BracketTree<Entrant>, history: &[AttendeeHistory]) -> Result<(), BracketError> {
    for entry in history {
        if let Some(seat) = entry.attendee.current_seat {
            tree.put(seat, Entrant::seeded(entry.attendee.clone()))?;
        }
        for row in &entry.histories {
            tree.put(row.seat, Entrant::played(entry.attendee.clone(), row.outcome))?;
        }
    }
    Ok(())
}

/// Pairings round by round, left to right. A pair where either side already played is skipped.
pub fn plan_matches(tree: &BracketTree<Entrant>) -> Result<Vec<PlannedMatch>, BracketError> {
    let mut planned = Vec::new();
    for round in 1..=tree.rounds() {
        let nodes = tree.nodes_in_round(round)?;
        for pair in nodes.chunks_exact(2) {
            let completed = pair
                .iter()
                .any(|node| node.payload.as_ref().is_some_and(|e| e.completed));
            if completed {
                continue;
            }
            planned.push(PlannedMatch {
                round,
                seats: [pair[0].seat, pair[1].seat],
            });
        }
    }
    Ok(planned)
}

/// Seed rank (0 = best) of the occupant of `seat`, assuming best-against-worst placement in a
/// bracket of `capacity` starting seats.
fn seed_rank(seat: Seat, capacity: usize) -> usize {
    let ranks: Vec<usize> = (0..capacity).collect();
    let slot = seat.saturating_sub(1) / 2;
    seeds::arrange(ranks, Strategy::BestAgainstWorst, capacity)
        .ok()
        .and_then(|arranged| arranged.get(slot).copied().flatten())
        .unwrap_or(usize::MAX)
}

/// Assign starting seats for `attendees` (already in seed order) in `tree`.
fn reseed(
    tx: &mut StoreTx,
    tournament_id: TournamentId,
    tree: &BracketTree<Entrant>,
    attendees: Vec<Attendee>,
    strategy: Strategy,
) -> Result<(), BracketError> {
    let arranged = seeds::arrange(attendees, strategy, tree.starting_seats().len())?;
    tx.reset_seats(tournament_id);
    for (seat, attendee) in tree.starting_seats().iter().zip(arranged) {
        if let Some(attendee) = attendee {
            tx.set_starting_seat(attendee.id, *seat);
        }
    }
    Ok(())
}

/// Start the tournament's match queue. A tournament that was started before resumes from
/// its recorded results instead of being reseeded.
///
/// When nobody is seated every attendee is seeded at random; when the seated attendees fit a
/// smaller bracket the tournament shrinks to it and is reseeded best-against-worst.
pub fn start_tournament<S, F>(
    store: &S,
    queue: &MatchQueue,
    tournament_id: TournamentId,
    shutdown: watch::Receiver<bool>,
    on_match_ready: F,
) -> Result<StartReport, TournamentError>
where
    S: Store + ?Sized,
    F: Fn(Matchup) + Send + Sync + 'static,
{
    let mut tournament = store.tournament(tournament_id)?;
    let resumed = tournament.is_started();
    let mut reseeded = false;

    if !resumed {
        let attendees = store.attendees(tournament_id, false)?;
        if attendees.is_empty() {
            return Err(TournamentError::NotEnoughSeeds {
                required: templates::TOP_2,
            });
        }
        let mut seated: Vec<Attendee> = attendees.iter().filter(|a| a.is_seated()).cloned().collect();
        let randomize = seated.is_empty();

        let (size, resized) = if randomize {
            resolve_bracket_size(tournament.size, attendees.len())?
        } else {
            resolve_bracket_size(tournament.size, seated.len())?
        };

        let mut tx = StoreTx::new();
        if resized {
            info!(
                "Resizing tournament {} bracket from {} to {}",
                tournament_id, tournament.size, size
            );
            tx.set_size(tournament_id, size);
        }
        if randomize || resized {
            let tree = BracketTree::<Entrant>::from_size(size)?;
            let (entrants, strategy) = if randomize {
                (attendees, Strategy::Random)
            } else {
                let capacity = BracketTree::<Entrant>::from_size(tournament.size)
                    .map(|t| t.starting_seats().len())
                    .unwrap_or(size);
                seated.sort_by_key(|a| a.starting_seat.map_or(usize::MAX, |s| seed_rank(s, capacity)));
                (seated, Strategy::BestAgainstWorst)
            };
            reseed(&mut tx, tournament_id, &tree, entrants, strategy)?;
            reseeded = true;
        }
        tx.mark_started(tournament_id, Utc::now());
        store.commit(tx)?;
        tournament = store.tournament(tournament_id)?;
    }

    let mut tree = BracketTree::from_size(tournament.size)?;
    hydrate(&mut tree, &store.current_history(tournament_id)?)?;
    let matches = plan_matches(&tree)?;
    let planned = matches.len();

    info!(
        "{} tournament {} ({} players, {} matches planned)",
        if resumed { "Resuming" } else { "Starting" },
        tournament_id,
        tournament.size,
        planned
    );
    let driver = queue.start(tournament_id, tree, matches, shutdown, on_match_ready);

    Ok(StartReport {
        tournament,
        resumed,
        reseeded,
        planned,
        driver,
    })
}
