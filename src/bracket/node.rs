//! Tree node: a seat with an optional occupant.

use crate::bracket::Seat;
use std::cmp::Ordering;
use std::fmt;

/// One position in the bracket. Children are owned; the payload is whoever currently sits here.
#[derive(Clone, Debug)]
pub struct Node<P> {
    pub seat: Seat,
    pub payload: Option<P>,
    pub(crate) left: Option<Box<Node<P>>>,
    pub(crate) right: Option<Box<Node<P>>>,
}

impl<P> Node<P> {
    pub(crate) fn new(seat: Seat) -> Self {
        Self {
            seat,
            payload: None,
            left: None,
            right: None,
        }
    }

    pub fn left(&self) -> Option<&Node<P>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node<P>> {
        self.right.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Walks towards `seat`. Bisection keeps smaller seats on the left and larger on the right.
    pub(crate) fn find(&self, seat: Seat) -> Option<&Node<P>> {
        match seat.cmp(&self.seat) {
            Ordering::Equal => Some(self),
            Ordering::Less => self.left.as_deref()?.find(seat),
            Ordering::Greater => self.right.as_deref()?.find(seat),
        }
    }

    pub(crate) fn find_mut(&mut self, seat: Seat) -> Option<&mut Node<P>> {
        match seat.cmp(&self.seat) {
            Ordering::Equal => Some(self),
            Ordering::Less => self.left.as_deref_mut()?.find_mut(seat),
            Ordering::Greater => self.right.as_deref_mut()?.find_mut(seat),
        }
    }

    pub(crate) fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize, side: char) -> fmt::Result {
        writeln!(f, "{:indent$}{}:{}", "", side, self.seat, indent = indent)?;
        if let Some(left) = self.left() {
            left.write_tree(f, indent + 2, 'L')?;
        }
        if let Some(right) = self.right() {
            right.write_tree(f, indent + 2, 'R')?;
        }
        Ok(())
    }
}
