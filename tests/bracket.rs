//! Integration tests for the bracket tree: construction, seeding with displacement, advancement.

use bracket_tournament_web::bracket::templates::SUPPORTED_SIZES;
use bracket_tournament_web::{BracketError, BracketTree, Seat};

/// Seat whose children are exactly `a` and `b`, if any.
fn parent_of(bt: &BracketTree<u32>, a: Seat, b: Seat) -> Option<Seat> {
    (1..=bt.len()).find(|&seat| {
        let node = bt.search(seat).unwrap();
        match (node.left(), node.right()) {
            (Some(l), Some(r)) => (l.seat == a && r.seat == b) || (l.seat == b && r.seat == a),
            _ => false,
        }
    })
}

#[test]
fn node_counts_and_root_per_size() {
    for (size, nodes, root) in [(2, 3, 2), (4, 7, 4), (8, 15, 8), (16, 31, 16), (32, 63, 32)] {
        let bt = BracketTree::<u32>::from_size(size).unwrap();
        assert_eq!(bt.len(), nodes, "size {size}");
        assert_eq!(bt.root_seat(), root, "size {size}");
        assert_eq!(bt.starting_seats().len(), size);
    }
}

#[test]
fn starting_seats_are_the_odd_seats() {
    let bt = BracketTree::<u32>::from_size(8).unwrap();
    assert_eq!(bt.starting_seats(), &[1, 3, 5, 7, 9, 11, 13, 15]);

    let bt = BracketTree::<u32>::from_size(16).unwrap();
    let odd: Vec<Seat> = (1..=31).step_by(2).collect();
    assert_eq!(bt.starting_seats(), odd.as_slice());
}

#[test]
fn seeding_an_occupied_slot_shifts_later_seeds() {
    let mut bt = BracketTree::from_size(4).unwrap();
    bt.seed(1, 10).unwrap();
    bt.seed(1, 20).unwrap();
    bt.seed(1, 30).unwrap();

    let at = |bt: &BracketTree<u32>, seat| bt.search(seat).unwrap().payload;
    assert_eq!(at(&bt, 1), Some(30));
    assert_eq!(at(&bt, 3), Some(20));
    assert_eq!(at(&bt, 5), Some(10));
    assert_eq!(at(&bt, 7), None);

    // An empty slot is assigned directly.
    bt.seed(4, 40).unwrap();
    assert_eq!(at(&bt, 7), Some(40));
}

#[test]
fn seeding_never_drops_an_occupant() {
    let mut bt = BracketTree::from_size(4).unwrap();
    for slot in 1..=4 {
        bt.seed(slot, slot as u32).unwrap();
    }
    assert!(matches!(bt.seed(2, 99), Err(BracketError::BracketFull(2))));
    let seated: Vec<Option<u32>> = bt
        .starting_seats()
        .iter()
        .map(|&s| bt.search(s).unwrap().payload)
        .collect();
    assert_eq!(seated, vec![Some(1), Some(2), Some(3), Some(4)]);
}

#[test]
fn seed_slot_is_one_based_and_range_checked() {
    let mut bt = BracketTree::from_size(4).unwrap();
    assert!(matches!(
        bt.seed(0, 1u32),
        Err(BracketError::OutOfBounds { slot: 0, len: 4 })
    ));
    assert!(matches!(
        bt.seed(5, 1u32),
        Err(BracketError::OutOfBounds { slot: 5, len: 4 })
    ));
    assert_eq!(bt.seed(4, 1u32).unwrap().seat, 7);
}

#[test]
fn match_winner_chain_reaches_the_root() {
    let mut bt = BracketTree::from_size(8).unwrap();
    assert!(matches!(bt.winner(), Err(BracketError::NotDetermined)));

    bt.put(9, 7u32).unwrap();
    let mut seat = 9;
    for _ in 0..bt.rounds() {
        seat = bt.match_winner(seat).unwrap().seat;
    }
    assert_eq!(seat, bt.root_seat());
    assert_eq!(bt.winner().unwrap().payload, Some(7));
}

#[test]
fn templates_agree_with_tree_parents() {
    for size in SUPPORTED_SIZES {
        let bt = BracketTree::<u32>::from_size(size).unwrap();
        assert_eq!(bt.matches().len(), size - 1);
        for m in bt.matches() {
            let [a, b] = m.seats;
            assert_eq!(
                parent_of(&bt, a, b),
                Some(m.winner_to),
                "size {size}: {a} vs {b}"
            );
        }
    }
}

#[test]
fn nodes_in_round_follow_breadth_first_order() {
    let bt = BracketTree::<u32>::from_size(4).unwrap();
    let seats: Vec<Seat> = bt.nodes_in_round(2).unwrap().iter().map(|n| n.seat).collect();
    assert_eq!(seats, vec![2, 6]);
    assert_eq!(bt.nodes_in_round(3).unwrap()[0].seat, 4);
    assert!(matches!(
        bt.nodes_in_round(4),
        Err(BracketError::NoNodesInRound(4))
    ));
}

#[test]
fn renders_as_indented_tree() {
    let bt = BracketTree::<u32>::from_size(4).unwrap();
    assert_eq!(
        bt.to_string(),
        "M:4\n  L:2\n    L:1\n    R:3\n  R:6\n    L:5\n    R:7\n"
    );
}
