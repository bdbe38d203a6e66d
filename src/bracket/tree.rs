//! Bracket tree: built by midpoint bisection of the seat range, so leaves are the odd seats
//! (starting seats) and even seats are the advancement nodes up to the root.

use crate::bracket::templates::{self, MatchTemplate};
use crate::bracket::{BracketError, Node, Seat};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

#[derive(Clone, Debug)]
pub struct BracketTree<P> {
    root: Node<P>,
    size: usize,
    rounds: usize,
    matches: &'static [MatchTemplate],
    starting_seats: Vec<Seat>,
    /// Round (leaves = 1, root = rounds + 1) -> seats at that depth, breadth-first order.
    seat_round_pos: BTreeMap<usize, Vec<Seat>>,
    node_count: usize,
}

/// Number of halving steps until a single player is left.
pub(crate) fn calculate_rounds(players: usize) -> usize {
    let mut players = players;
    let mut rounds = 0;
    while players > 1 {
        rounds += 1;
        players = (players + 1) / 2;
    }
    rounds
}

/// Node for the inclusive seat range `start..=end`: its midpoint, with each half bisected again.
fn bisect<P>(start: Seat, end: Seat) -> Option<Box<Node<P>>> {
    if start > end {
        return None;
    }
    let mid = (start + end) / 2;
    let mut node = Node::new(mid);
    node.left = bisect(start, mid - 1);
    node.right = bisect(mid + 1, end);
    Some(Box::new(node))
}

impl<P> BracketTree<P> {
    /// Build an empty bracket for `size` players. Only sizes with a match template are accepted.
    pub fn from_size(size: usize) -> Result<Self, BracketError> {
        if size == 0 {
            return Err(BracketError::InvalidSize);
        }
        let matches = templates::with_template(size)?;

        let rounds = calculate_rounds(size);
        let node_count = (1usize << (rounds + 1)) - 1;
        let root = *bisect(1, node_count).ok_or(BracketError::InvalidSize)?;

        // Breadth-first, left before right, root at round `rounds + 1`.
        let mut seat_round_pos: BTreeMap<usize, Vec<Seat>> = BTreeMap::new();
        {
            let mut queue = VecDeque::from([(&root, rounds + 1)]);
            while let Some((node, round)) = queue.pop_front() {
                seat_round_pos.entry(round).or_default().push(node.seat);
                if let Some(left) = node.left() {
                    queue.push_back((left, round - 1));
                }
                if let Some(right) = node.right() {
                    queue.push_back((right, round - 1));
                }
            }
        }
        let starting_seats = seat_round_pos.get(&1).cloned().unwrap_or_default();

        Ok(Self {
            root,
            size,
            rounds,
            matches,
            starting_seats,
            seat_round_pos,
            node_count,
        })
    }

    /// Players this bracket was built for.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Total number of seats in the tree.
    pub fn len(&self) -> usize {
        self.node_count
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    pub fn root_seat(&self) -> Seat {
        self.root.seat
    }

    pub fn matches(&self) -> &'static [MatchTemplate] {
        self.matches
    }

    /// Leaf seats, ascending.
    pub fn starting_seats(&self) -> &[Seat] {
        &self.starting_seats
    }

    pub fn seat_round_pos(&self) -> &BTreeMap<usize, Vec<Seat>> {
        &self.seat_round_pos
    }

    pub fn search(&self, seat: Seat) -> Result<&Node<P>, BracketError> {
        self.root.find(seat).ok_or(BracketError::SeatNotFound(seat))
    }

    pub fn search_mut(&mut self, seat: Seat) -> Result<&mut Node<P>, BracketError> {
        self.root.find_mut(seat).ok_or(BracketError::SeatNotFound(seat))
    }

    /// Overwrite whoever sits at `seat`.
    pub fn put(&mut self, seat: Seat, payload: P) -> Result<&Node<P>, BracketError> {
        let node = self.search_mut(seat)?;
        node.payload = Some(payload);
        Ok(&*node)
    }

    /// Clear `seat`, returning its previous occupant.
    pub fn take(&mut self, seat: Seat) -> Result<Option<P>, BracketError> {
        Ok(self.search_mut(seat)?.payload.take())
    }

    /// Place `payload` into the 1-based `slot`-th starting seat.
    ///
    /// An occupied slot is not overwritten: every occupant from `slot` onwards moves one
    /// starting seat later and the new payload takes `slot`. Fails with `BracketFull` when the
    /// last starting seat is occupied, since shifting would drop its occupant.
    pub fn seed(&mut self, slot: usize, payload: P) -> Result<&Node<P>, BracketError> {
        let len = self.starting_seats.len();
        if slot == 0 || slot > len {
            return Err(BracketError::OutOfBounds { slot, len });
        }
        let seat = self.starting_seats[slot - 1];

        if self.search(seat)?.payload.is_some() {
            let last = self.starting_seats[len - 1];
            if self.search(last)?.payload.is_some() {
                return Err(BracketError::BracketFull(slot));
            }
            for index in (slot..len).rev() {
                let prev = self.starting_seats[index - 1];
                let curr = self.starting_seats[index];
                let moved = self.search_mut(prev)?.payload.take();
                self.search_mut(curr)?.payload = moved;
            }
        }

        self.put(seat, payload)
    }

    /// The root node, once somebody has been advanced into it.
    pub fn winner(&self) -> Result<&Node<P>, BracketError> {
        if self.root.payload.is_some() {
            Ok(&self.root)
        } else {
            Err(BracketError::NotDetermined)
        }
    }

    /// Nodes at one depth (leaves = round 1), in breadth-first order.
    pub fn nodes_in_round(&self, round: usize) -> Result<Vec<&Node<P>>, BracketError> {
        let seats = self
            .seat_round_pos
            .get(&round)
            .ok_or(BracketError::NoNodesInRound(round))?;
        seats.iter().map(|&seat| self.search(seat)).collect()
    }

    /// Template entry whose seat pair contains `seat`.
    pub fn template_for(&self, seat: Seat) -> Result<&'static MatchTemplate, BracketError> {
        self.matches
            .iter()
            .find(|m| m.contains(seat))
            .ok_or(BracketError::NoTemplateEntry(seat))
    }
}

impl<P: Clone> BracketTree<P> {
    /// Copy the occupant of `seat` into the seat its match feeds, returning the destination.
    pub fn match_winner(&mut self, seat: Seat) -> Result<&Node<P>, BracketError> {
        let payload = self.search(seat)?.payload.clone();
        let winner_to = self.template_for(seat)?.winner_to;
        let to = self.search_mut(winner_to)?;
        to.payload = payload;
        Ok(&*to)
    }
}

impl<P> fmt::Display for BracketTree<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write_tree(f, 0, 'M')
    }
}
