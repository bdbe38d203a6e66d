//! Match queue: one driver task per running tournament presents matches one at a time and
//! waits for each result before presenting the next.
//!
//! Each tournament gets a `Session` owning its bracket, the in-flight slot (at most one open
//! match) and a cancellation signal. `result` runs on the caller's thread, never blocks, and
//! wakes the driver after draining the slot. Starting a tournament that is already running
//! cancels the previous driver first, so the latest start wins.

use crate::bracket::{BracketError, BracketTree, Seat};
use crate::models::{
    AttendeeId, Entrant, MatchResult, MatchSlot, Matchup, Outcome, PlannedMatch, TournamentId,
};
use crate::store::StoreError;
use log::{debug, info, warn};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("tournament {0} has no running match queue")]
    NotRegistered(TournamentId),
    #[error("no match is waiting for a result")]
    EmptyQueue,
    #[error("tournament already completed")]
    AlreadyCompleted,
    #[error("attendee {0} is not part of the open match")]
    UnknownWinner(AttendeeId),
    #[error("seats {0:?} do not form a match in this bracket")]
    MatchNotInTemplate([Seat; 2]),
    /// The open match changed between preview and submission.
    #[error("the open match changed, submit the result again")]
    Stale,
    /// Not a failure: the winner moved into the root and the tournament is over.
    #[error("tournament winner found: {}", .0.winner.name())]
    TournamentWinnerFound(Box<MatchResult>),
    #[error("match queue was cancelled")]
    Cancelled,
    #[error(transparent)]
    Bracket(#[from] BracketError),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

struct SessionState {
    bracket: BracketTree<Entrant>,
    /// Presented matches awaiting a result; the driver keeps this at length <= 1.
    in_flight: VecDeque<Matchup>,
    /// Planned matches not yet resolved (or skipped).
    remaining: usize,
    presented: usize,
}

struct Session {
    state: Mutex<SessionState>,
    drained: Notify,
    cancel: watch::Sender<bool>,
}

impl Session {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Flips the signal under the state lock, so it never lands while a match is being announced.
    fn cancel(&self) {
        let _state = self.lock();
        self.cancel.send_replace(true);
    }
}

/// Resolves once `signal` flips to true; never resolves if its sender is gone without flipping.
async fn cancelled(signal: &mut watch::Receiver<bool>) {
    let flipped = signal.wait_for(|&c| c).await.is_ok();
    if !flipped {
        std::future::pending::<()>().await;
    }
}

/// Per-tournament match coordinator. Cheap to clone; clones share all sessions.
#[derive(Clone, Default)]
pub struct MatchQueue {
    sessions: Arc<Mutex<HashMap<TournamentId, Arc<Session>>>>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<TournamentId, Arc<Session>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session(&self, tournament_id: TournamentId) -> Result<Arc<Session>, QueueError> {
        self.sessions()
            .get(&tournament_id)
            .cloned()
            .ok_or(QueueError::NotRegistered(tournament_id))
    }

    /// Remove `session` only if it is still the one registered (a restart may have replaced it).
    fn unregister(&self, tournament_id: TournamentId, session: &Arc<Session>) {
        let mut sessions = self.sessions();
        if sessions
            .get(&tournament_id)
            .is_some_and(|current| Arc::ptr_eq(current, session))
        {
            sessions.remove(&tournament_id);
        }
    }

    pub fn is_running(&self, tournament_id: TournamentId) -> bool {
        self.sessions().contains_key(&tournament_id)
    }

    /// Start presenting `matches` in order. A run already registered for this tournament is
    /// cancelled first. `shutdown` stops every driver when the application exits.
    ///
    /// The returned handle yields `Ok` once every match has a result (or was skipped),
    /// `Err(QueueError::Cancelled)` when the run was cancelled, restarted or shut down.
    /// `on_match_ready` runs while the session is locked and must not call back into the queue.
    /// Must be called from within a tokio runtime.
    pub fn start<F>(
        &self,
        tournament_id: TournamentId,
        bracket: BracketTree<Entrant>,
        matches: Vec<PlannedMatch>,
        shutdown: watch::Receiver<bool>,
        on_match_ready: F,
    ) -> JoinHandle<Result<(), QueueError>>
    where
        F: Fn(Matchup) + Send + Sync + 'static,
    {
        let (cancel, cancel_rx) = watch::channel(false);
        let session = Arc::new(Session {
            state: Mutex::new(SessionState {
                bracket,
                in_flight: VecDeque::with_capacity(1),
                remaining: matches.len(),
                presented: 0,
            }),
            drained: Notify::new(),
            cancel,
        });

        if let Some(previous) = self
            .sessions()
            .insert(tournament_id, Arc::clone(&session))
        {
            previous.cancel();
            info!("Restarting match queue for tournament {}", tournament_id);
        }
        info!(
            "Match queue started for tournament {} with {} matches",
            tournament_id,
            matches.len()
        );

        let queue = self.clone();
        tokio::spawn(async move {
            queue
                .drive(tournament_id, session, matches, cancel_rx, shutdown, on_match_ready)
                .await
        })
    }

    async fn drive<F>(
        self,
        tournament_id: TournamentId,
        session: Arc<Session>,
        matches: Vec<PlannedMatch>,
        mut cancel: watch::Receiver<bool>,
        mut shutdown: watch::Receiver<bool>,
        on_match_ready: F,
    ) -> Result<(), QueueError>
    where
        F: Fn(Matchup) + Send + Sync + 'static,
    {
        for planned in matches {
            // Block while a match is still open.
            loop {
                if session.is_cancelled() || *shutdown.borrow() {
                    debug!("Match queue for tournament {} cancelled", tournament_id);
                    return Err(QueueError::Cancelled);
                }
                let drained = session.drained.notified();
                if session.lock().in_flight.is_empty() {
                    break;
                }
                tokio::select! {
                    _ = drained => {}
                    _ = cancelled(&mut cancel) => {}
                    _ = cancelled(&mut shutdown) => {}
                }
            }

            let mut state = session.lock();
            if session.is_cancelled() {
                return Err(QueueError::Cancelled);
            }
            // Seats are re-read now: earlier results may have filled them since planning.
            let matchup = match resolve(tournament_id, &state.bracket, planned) {
                Ok(m) => m,
                Err(e) => {
                    warn!(
                        "Match queue for tournament {} stopped at seats {:?}: {}",
                        tournament_id, planned.seats, e
                    );
                    return Err(e.into());
                }
            };
            if matchup.is_empty() {
                debug!(
                    "Skipping empty match at seats {:?} in tournament {}",
                    planned.seats, tournament_id
                );
                state.remaining = state.remaining.saturating_sub(1);
                continue;
            }
            state.presented += 1;
            let matchup = Matchup {
                number: state.presented,
                ..matchup
            };
            state.in_flight.push_back(matchup.clone());
            debug!(
                "Presenting match {} (round {}) of tournament {}",
                matchup.number, matchup.round, tournament_id
            );
            // Announced under the lock: a cancel either stops this match or waits for it.
            on_match_ready(matchup);
            drop(state);
        }

        // Everything presented; wait until every result is in.
        loop {
            let drained = session.drained.notified();
            if session.lock().remaining == 0 {
                break;
            }
            if session.is_cancelled() || *shutdown.borrow() {
                return Err(QueueError::Cancelled);
            }
            tokio::select! {
                _ = drained => {}
                _ = cancelled(&mut cancel) => {}
                _ = cancelled(&mut shutdown) => {}
            }
        }
        self.unregister(tournament_id, &session);
        info!("Match queue for tournament {} completed", tournament_id);
        Ok(())
    }

    /// Resolve the open match with `winner` and advance the bracket.
    pub fn result(&self, tournament_id: TournamentId, winner: AttendeeId) -> Result<MatchResult, QueueError> {
        self.result_with(tournament_id, winner, |_| Ok(()))
    }

    /// Like [`MatchQueue::result`], calling `persist` with the resolved result before anything
    /// changes in memory. If `persist` fails the open match and the bracket stay untouched.
    ///
    /// When the winner reaches the root the session is torn down and
    /// `QueueError::TournamentWinnerFound` carries the final result.
    pub fn result_with<F>(
        &self,
        tournament_id: TournamentId,
        winner: AttendeeId,
        persist: F,
    ) -> Result<MatchResult, QueueError>
    where
        F: FnOnce(&MatchResult) -> Result<(), StoreError>,
    {
        self.settle(tournament_id, None, winner, persist)
    }

    /// Like [`MatchQueue::result_with`], but only if the open match is still match `number`.
    pub fn result_for<F>(
        &self,
        tournament_id: TournamentId,
        number: usize,
        winner: AttendeeId,
        persist: F,
    ) -> Result<MatchResult, QueueError>
    where
        F: FnOnce(&MatchResult) -> Result<(), StoreError>,
    {
        self.settle(tournament_id, Some(number), winner, persist)
    }

    fn settle<F>(
        &self,
        tournament_id: TournamentId,
        expected: Option<usize>,
        winner: AttendeeId,
        persist: F,
    ) -> Result<MatchResult, QueueError>
    where
        F: FnOnce(&MatchResult) -> Result<(), StoreError>,
    {
        let session = self.session(tournament_id)?;
        let mut state = session.lock();
        if state.remaining == 0 {
            return Err(QueueError::AlreadyCompleted);
        }
        let open = state.in_flight.front().ok_or(QueueError::EmptyQueue)?;
        if expected.is_some_and(|number| number != open.number) {
            return Err(QueueError::Stale);
        }
        let result = resolve_result(tournament_id, &state.bracket, open, winner)?;

        persist(&result)?;

        state.in_flight.pop_front();
        move_into(&mut state.bracket, result.winner.clone(), result.winner_to)?;

        if result.decided {
            state.remaining = 0;
            drop(state);
            self.unregister(tournament_id, &session);
            session.cancel();
            info!(
                "Tournament {} won by {}",
                tournament_id,
                result.winner.name()
            );
            return Err(QueueError::TournamentWinnerFound(Box::new(result)));
        }

        state.remaining = state.remaining.saturating_sub(1);
        drop(state);
        session.drained.notify_one();
        Ok(result)
    }

    /// Result the open match would produce for `winner`, without changing anything.
    pub fn preview(&self, tournament_id: TournamentId, winner: AttendeeId) -> Result<MatchResult, QueueError> {
        let session = self.session(tournament_id)?;
        let state = session.lock();
        let open = state.in_flight.front().ok_or(QueueError::EmptyQueue)?;
        resolve_result(tournament_id, &state.bracket, open, winner)
    }

    /// Place `entrant` at seat `to` with its result cleared. Used for advancement and for
    /// manual overrides.
    pub fn move_entrant(&self, tournament_id: TournamentId, entrant: Entrant, to: Seat) -> Result<(), QueueError> {
        self.move_with(tournament_id, entrant, to, || Ok(()))
    }

    /// Like [`MatchQueue::move_entrant`], calling `persist` once the seat is known to exist and
    /// before the bracket changes. If `persist` fails the bracket stays untouched.
    pub fn move_with<F>(
        &self,
        tournament_id: TournamentId,
        entrant: Entrant,
        to: Seat,
        persist: F,
    ) -> Result<(), QueueError>
    where
        F: FnOnce() -> Result<(), StoreError>,
    {
        let session = self.session(tournament_id)?;
        let mut state = session.lock();
        state.bracket.search(to)?;
        persist()?;
        move_into(&mut state.bracket, entrant, to)?;
        Ok(())
    }

    /// Cancel the driver and forget the tournament's state.
    pub fn cancel(&self, tournament_id: TournamentId) -> Result<(), QueueError> {
        let session = self
            .sessions()
            .remove(&tournament_id)
            .ok_or(QueueError::NotRegistered(tournament_id))?;
        session.cancel();
        info!("Match queue for tournament {} cleared", tournament_id);
        Ok(())
    }

    /// The match currently waiting for a result.
    pub fn open_match(&self, tournament_id: TournamentId) -> Option<Matchup> {
        let session = self.session(tournament_id).ok()?;
        let state = session.lock();
        state.in_flight.front().cloned()
    }

    /// Number of presented matches awaiting a result (0 or 1).
    pub fn in_flight(&self, tournament_id: TournamentId) -> Option<usize> {
        let session = self.session(tournament_id).ok()?;
        let len = session.lock().in_flight.len();
        Some(len)
    }

    /// Read access to a running tournament's bracket.
    pub fn with_bracket<R>(
        &self,
        tournament_id: TournamentId,
        f: impl FnOnce(&BracketTree<Entrant>) -> R,
    ) -> Option<R> {
        let session = self.session(tournament_id).ok()?;
        let state = session.lock();
        Some(f(&state.bracket))
    }
}

fn resolve(
    tournament_id: TournamentId,
    bracket: &BracketTree<Entrant>,
    planned: PlannedMatch,
) -> Result<Matchup, BracketError> {
    let [a, b] = planned.seats;
    let slot = |seat: Seat| -> Result<MatchSlot, BracketError> {
        Ok(MatchSlot {
            seat,
            entrant: bracket.search(seat)?.payload.clone(),
        })
    };
    Ok(Matchup {
        tournament_id,
        round: planned.round,
        number: 0,
        p1: slot(a)?,
        p2: slot(b)?,
    })
}

fn resolve_result(
    tournament_id: TournamentId,
    bracket: &BracketTree<Entrant>,
    open: &Matchup,
    winner: AttendeeId,
) -> Result<MatchResult, QueueError> {
    let [a, b] = open.seats();
    let template = bracket
        .matches()
        .iter()
        .find(|m| m.is_pair(a, b))
        .ok_or(QueueError::MatchNotInTemplate([a, b]))?;

    let occupant = |seat: Seat| -> Result<Option<Entrant>, QueueError> {
        Ok(bracket.search(seat)?.payload.clone())
    };
    let (first, second) = (occupant(a)?, occupant(b)?);

    let (winner_entrant, winner_seat, loser, loser_seat) = match (first, second) {
        (Some(w), other) if w.id() == winner => (w, a, other, b),
        (other, Some(w)) if w.id() == winner => (w, b, other, a),
        _ => return Err(QueueError::UnknownWinner(winner)),
    };

    Ok(MatchResult {
        tournament_id,
        round: open.round,
        number: open.number,
        winner: Entrant {
            outcome: Outcome::Won,
            ..winner_entrant
        },
        winner_seat,
        loser_seat: loser.as_ref().map(|_| loser_seat),
        loser: loser.map(|l| Entrant {
            outcome: Outcome::Lost,
            ..l
        }),
        winner_to: template.winner_to,
        decided: template.winner_to == bracket.root_seat(),
    })
}

fn move_into(bracket: &mut BracketTree<Entrant>, entrant: Entrant, to: Seat) -> Result<(), BracketError> {
    let mut attendee = entrant.attendee;
    attendee.current_seat = Some(to);
    bracket.put(to, Entrant::seeded(attendee))?;
    Ok(())
}
