//! Static advancement tables: for every supported bracket size, which two seats meet
//! and which seat the winner moves to.

use crate::bracket::{BracketError, Seat};
use serde::Serialize;

/// One match in the advancement graph.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct MatchTemplate {
    pub seats: [Seat; 2],
    pub winner_to: Seat,
}

impl MatchTemplate {
    const fn new(a: Seat, b: Seat, winner_to: Seat) -> Self {
        Self {
            seats: [a, b],
            winner_to,
        }
    }

    pub fn contains(&self, seat: Seat) -> bool {
        self.seats.contains(&seat)
    }

    /// Order-independent comparison against a pair of seats.
    pub fn is_pair(&self, a: Seat, b: Seat) -> bool {
        let mut ours = self.seats;
        ours.sort_unstable();
        let mut theirs = [a, b];
        theirs.sort_unstable();
        ours == theirs
    }
}

pub const TOP_2: usize = 2;
pub const TOP_4: usize = 4;
pub const TOP_8: usize = 8;
pub const TOP_16: usize = 16;
pub const TOP_32: usize = 32;

/// Bracket sizes with a registered template, ascending.
pub const SUPPORTED_SIZES: [usize; 5] = [TOP_2, TOP_4, TOP_8, TOP_16, TOP_32];

static TOP_2_MATCHES: [MatchTemplate; 1] = [
    // Final
    MatchTemplate::new(1, 3, 2),
];

static TOP_4_MATCHES: [MatchTemplate; 3] = [
    // Semifinals
    MatchTemplate::new(1, 3, 2),
    MatchTemplate::new(5, 7, 6),
    // Final
    MatchTemplate::new(2, 6, 4),
];

static TOP_8_MATCHES: [MatchTemplate; 7] = [
    // Quarters
    MatchTemplate::new(1, 3, 2),
    MatchTemplate::new(5, 7, 6),
    MatchTemplate::new(9, 11, 10),
    MatchTemplate::new(13, 15, 14),
    // Semifinals
    MatchTemplate::new(2, 6, 4),
    MatchTemplate::new(10, 14, 12),
    // Final
    MatchTemplate::new(4, 12, 8),
];

static TOP_16_MATCHES: [MatchTemplate; 15] = [
    MatchTemplate::new(1, 3, 2),
    MatchTemplate::new(5, 7, 6),
    MatchTemplate::new(9, 11, 10),
    MatchTemplate::new(13, 15, 14),
    MatchTemplate::new(17, 19, 18),
    MatchTemplate::new(21, 23, 22),
    MatchTemplate::new(25, 27, 26),
    MatchTemplate::new(29, 31, 30),
    // Quarters
    MatchTemplate::new(2, 6, 4),
    MatchTemplate::new(10, 14, 12),
    MatchTemplate::new(18, 22, 20),
    MatchTemplate::new(26, 30, 28),
    // Semifinals
    MatchTemplate::new(4, 12, 8),
    MatchTemplate::new(20, 28, 24),
    // Final
    MatchTemplate::new(8, 24, 16),
];

static TOP_32_MATCHES: [MatchTemplate; 31] = [
    // Top 32
    MatchTemplate::new(1, 3, 2),
    MatchTemplate::new(5, 7, 6),
    MatchTemplate::new(9, 11, 10),
    MatchTemplate::new(13, 15, 14),
    MatchTemplate::new(17, 19, 18),
    MatchTemplate::new(21, 23, 22),
    MatchTemplate::new(25, 27, 26),
    MatchTemplate::new(29, 31, 30),
    MatchTemplate::new(33, 35, 34),
    MatchTemplate::new(37, 39, 38),
    MatchTemplate::new(41, 43, 42),
    MatchTemplate::new(45, 47, 46),
    MatchTemplate::new(49, 51, 50),
    MatchTemplate::new(53, 55, 54),
    MatchTemplate::new(57, 59, 58),
    MatchTemplate::new(61, 63, 62),
    // Top 16
    MatchTemplate::new(2, 6, 4),
    MatchTemplate::new(10, 14, 12),
    MatchTemplate::new(18, 22, 20),
    MatchTemplate::new(26, 30, 28),
    MatchTemplate::new(34, 38, 36),
    MatchTemplate::new(42, 46, 44),
    MatchTemplate::new(50, 54, 52),
    MatchTemplate::new(58, 62, 60),
    // Quarters
    MatchTemplate::new(4, 12, 8),
    MatchTemplate::new(20, 28, 24),
    MatchTemplate::new(36, 44, 40),
    MatchTemplate::new(52, 60, 56),
    // Semifinals
    MatchTemplate::new(8, 24, 16),
    MatchTemplate::new(40, 56, 48),
    // Final
    MatchTemplate::new(16, 48, 32),
];

/// Template for an exact bracket size.
pub fn with_template(size: usize) -> Result<&'static [MatchTemplate], BracketError> {
    match size {
        TOP_2 => Ok(&TOP_2_MATCHES[..]),
        TOP_4 => Ok(&TOP_4_MATCHES[..]),
        TOP_8 => Ok(&TOP_8_MATCHES[..]),
        TOP_16 => Ok(&TOP_16_MATCHES[..]),
        TOP_32 => Ok(&TOP_32_MATCHES[..]),
        _ => Err(BracketError::TemplateNotFound(size)),
    }
}

/// Smallest supported size that fits `entrants`, if any.
pub fn smallest_fitting(entrants: usize) -> Option<usize> {
    SUPPORTED_SIZES.iter().copied().find(|&size| size >= entrants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_size_has_size_minus_one_matches() {
        for size in SUPPORTED_SIZES {
            assert_eq!(with_template(size).unwrap().len(), size - 1);
        }
    }

    #[test]
    fn unsupported_sizes_are_rejected() {
        assert_eq!(with_template(6), Err(BracketError::TemplateNotFound(6)));
        assert_eq!(with_template(64), Err(BracketError::TemplateNotFound(64)));
    }

    #[test]
    fn every_internal_seat_is_fed_exactly_once() {
        for size in SUPPORTED_SIZES {
            let matches = with_template(size).unwrap();
            let mut targets: Vec<Seat> = matches.iter().map(|m| m.winner_to).collect();
            targets.sort_unstable();
            let expected: Vec<Seat> = (1..size).map(|i| i * 2).collect();
            assert_eq!(targets, expected, "size {size}");
        }
    }

    #[test]
    fn pair_comparison_ignores_order() {
        let m = with_template(TOP_8).unwrap()[4];
        assert!(m.is_pair(6, 2));
        assert!(m.is_pair(2, 6));
        assert!(!m.is_pair(2, 10));
    }

    #[test]
    fn smallest_fitting_rounds_up() {
        assert_eq!(smallest_fitting(2), Some(2));
        assert_eq!(smallest_fitting(5), Some(8));
        assert_eq!(smallest_fitting(17), Some(32));
        assert_eq!(smallest_fitting(33), None);
    }
}
