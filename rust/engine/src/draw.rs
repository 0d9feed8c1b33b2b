use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::rules::{NUMBER_MAX, ROW_LEN};

/// Source of every random outcome in a game: bingo rows and the roulette
/// winning index. Owns a ChaCha20 RNG so test runs can be reproduced from
/// a seed.
#[derive(Debug)]
pub struct Drum {
    rng: ChaCha20Rng,
}

impl Drum {
    /// Seeded drum for reproducible draws; unseeded draws from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_rng(&mut rand::rng()),
        };
        Self { rng }
    }

    /// One bingo row: [`ROW_LEN`] distinct numbers drawn uniformly without
    /// replacement from `1..=`[`NUMBER_MAX`].
    pub fn bingo_row(&mut self) -> Vec<u8> {
        index::sample(&mut self.rng, NUMBER_MAX as usize, ROW_LEN)
            .iter()
            .map(|i| (i + 1) as u8)
            .collect()
    }

    /// `count` independent rows; numbers may repeat across rows but never
    /// within one.
    pub fn bingo_rows(&mut self, count: usize) -> Vec<Vec<u8>> {
        (0..count).map(|_| self.bingo_row()).collect()
    }

    /// The roulette winner: a uniform index in `1..=participants`.
    ///
    /// `participants` must be at least 1; the caller verifies the declared
    /// count against the roster before drawing.
    pub fn roulette_index(&mut self, participants: usize) -> usize {
        self.rng.random_range(1..=participants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn rows_hold_distinct_in_range_numbers() {
        let mut drum = Drum::new(Some(42));
        for _ in 0..200 {
            let row = drum.bingo_row();
            assert_eq!(row.len(), ROW_LEN);
            let unique: BTreeSet<u8> = row.iter().copied().collect();
            assert_eq!(unique.len(), ROW_LEN);
            assert!(row.iter().all(|&n| (1..=NUMBER_MAX).contains(&n)));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_draws() {
        let mut a = Drum::new(Some(7));
        let mut b = Drum::new(Some(7));
        assert_eq!(a.bingo_rows(2), b.bingo_rows(2));
        assert_eq!(a.roulette_index(30), b.roulette_index(30));
    }

    #[test]
    fn two_rows_in_one_call_are_independent_draws() {
        // Across enough draws some pair of rows must share a number, which
        // a without-replacement scheme spanning both rows would forbid.
        let mut drum = Drum::new(Some(3));
        let mut overlap_seen = false;
        for _ in 0..100 {
            let rows = drum.bingo_rows(2);
            let first: BTreeSet<u8> = rows[0].iter().copied().collect();
            if rows[1].iter().any(|n| first.contains(n)) {
                overlap_seen = true;
                break;
            }
        }
        assert!(overlap_seen);
    }

    #[test]
    fn roulette_index_stays_in_bounds() {
        let mut drum = Drum::new(Some(11));
        for participants in 1..=20 {
            for _ in 0..50 {
                let index = drum.roulette_index(participants);
                assert!((1..=participants).contains(&index));
            }
        }
    }
}
