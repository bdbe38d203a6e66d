//! Seeding strategies: reorder (and pad) a participant list before it is placed into the
//! bracket's starting seats. Output index `i` belongs in `starting_seats()[i]`.

use crate::bracket::BracketError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Random,
    /// Seed 1 meets the lowest seed, seed 2 the next lowest, and so on.
    #[default]
    BestAgainstWorst,
    /// Input order is kept as-is (first is best, last is worst).
    SimilarSkill,
}

/// Arrange `payload` for a bracket with `capacity` starting seats, using the thread RNG.
pub fn arrange<T>(
    payload: Vec<T>,
    strategy: Strategy,
    capacity: usize,
) -> Result<Vec<Option<T>>, BracketError> {
    arrange_with_rng(payload, strategy, capacity, &mut rand::thread_rng())
}

/// Like [`arrange`] with a caller-supplied RNG. Extra entries beyond `capacity` are dropped
/// before reordering; missing ones are padded with `None`.
pub fn arrange_with_rng<T, R: Rng + ?Sized>(
    payload: Vec<T>,
    strategy: Strategy,
    capacity: usize,
    rng: &mut R,
) -> Result<Vec<Option<T>>, BracketError> {
    if payload.is_empty() {
        return Err(BracketError::EmptyPayload);
    }
    if capacity == 0 {
        return Err(BracketError::InvalidSize);
    }

    let mut seeds: Vec<Option<T>> = payload.into_iter().take(capacity).map(Some).collect();
    seeds.resize_with(capacity, || None);

    match strategy {
        Strategy::Random => seeds.shuffle(rng),
        Strategy::BestAgainstWorst => best_against_worst(&mut seeds),
        Strategy::SimilarSkill => {}
    }
    Ok(seeds)
}

fn best_against_worst<T>(seeds: &mut [T]) {
    let len = seeds.len();
    for i in (1..len / 2).step_by(2) {
        seeds.swap(i, len - i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn numbered(n: i32) -> Vec<i32> {
        (1..=n).collect()
    }

    fn flatten(seeds: Vec<Option<i32>>) -> Vec<i32> {
        seeds.into_iter().map(|s| s.unwrap_or(-1)).collect()
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert_eq!(
            arrange(Vec::<i32>::new(), Strategy::Random, 8),
            Err(BracketError::EmptyPayload)
        );
    }

    #[test]
    fn best_against_worst_eight() {
        let seeded = arrange(numbered(8), Strategy::BestAgainstWorst, 8).unwrap();
        assert_eq!(flatten(seeded), vec![1, 8, 3, 6, 5, 4, 7, 2]);
    }

    #[test]
    fn best_against_worst_sixteen() {
        let seeded = arrange(numbered(16), Strategy::BestAgainstWorst, 16).unwrap();
        assert_eq!(
            flatten(seeded),
            vec![1, 16, 3, 14, 5, 12, 7, 10, 9, 8, 11, 6, 13, 4, 15, 2]
        );
    }

    #[test]
    fn best_against_worst_pads_missing_seeds() {
        let seeded = arrange(numbered(7), Strategy::BestAgainstWorst, 8).unwrap();
        assert_eq!(flatten(seeded), vec![1, -1, 3, 6, 5, 4, 7, 2]);

        let seeded = arrange(numbered(12), Strategy::BestAgainstWorst, 16).unwrap();
        assert_eq!(
            flatten(seeded),
            vec![1, -1, 3, -1, 5, 12, 7, 10, 9, 8, 11, 6, -1, 4, -1, 2]
        );
    }

    #[test]
    fn best_against_worst_thirty_two() {
        let seeded = arrange(numbered(32), Strategy::BestAgainstWorst, 32).unwrap();
        assert_eq!(
            flatten(seeded),
            vec![
                1, 32, 3, 30, 5, 28, 7, 26, 9, 24, 11, 22, 13, 20, 15, 18, 17, 16, 19, 14, 21, 12,
                23, 10, 25, 8, 27, 6, 29, 4, 31, 2
            ]
        );
    }

    #[test]
    fn overflow_is_truncated_to_capacity() {
        let seeded = arrange(numbered(10), Strategy::SimilarSkill, 8).unwrap();
        assert_eq!(flatten(seeded), numbered(8));
    }

    #[test]
    fn random_is_a_permutation_of_padded_input() {
        let mut rng = StdRng::seed_from_u64(7);
        let seeded = arrange_with_rng(numbered(6), Strategy::Random, 8, &mut rng).unwrap();
        assert_eq!(seeded.len(), 8);
        assert_eq!(seeded.iter().filter(|s| s.is_none()).count(), 2);
        let mut present: Vec<i32> = seeded.into_iter().flatten().collect();
        present.sort_unstable();
        assert_eq!(present, numbered(6));
    }

    #[test]
    fn similar_skill_keeps_order() {
        let seeded = arrange(numbered(3), Strategy::SimilarSkill, 4).unwrap();
        assert_eq!(flatten(seeded), vec![1, 2, 3, -1]);
    }
}
