//! Addition rounds
//!
//! a + b with sums up to 20, answered from four number buttons. Distractors
//! are near-misses so guessing by magnitude doesn't work.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// One addition question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionRound {
    pub a: u8,
    pub b: u8,
    /// Answer buttons, shuffled; exactly one equals the sum
    pub options: [u8; 4],
}

impl AdditionRound {
    pub fn generate(rng: &mut Pcg32, prev: Option<(u8, u8)>) -> Self {
        let (a, b) = loop {
            let a = rng.random_range(1..=10u8);
            let b = rng.random_range(1..=10u8);
            if Some((a, b)) != prev && Some((b, a)) != prev {
                break (a, b);
            }
        };
        let sum = a + b;

        let mut options = [sum, 0, 0, 0];
        for slot in 1..4 {
            options[slot] = loop {
                let delta = rng.random_range(1..=3u8);
                let candidate = if rng.random_bool(0.5) {
                    sum.saturating_add(delta).min(20)
                } else {
                    sum.saturating_sub(delta).max(2)
                };
                if !options[..slot].contains(&candidate) {
                    break candidate;
                }
            };
        }
        options.shuffle(rng);

        Self { a, b, options }
    }

    pub fn sum(&self) -> u8 {
        self.a + self.b
    }

    pub fn answer(&self, n: u8) -> bool {
        n == self.sum()
    }

    /// Unordered pair, so 3+5 and 5+3 count as one variant
    pub fn variant_key(&self) -> String {
        format!("add-{}-{}", self.a.min(self.b), self.a.max(self.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_sums_stay_in_range() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..500 {
            let round = AdditionRound::generate(&mut rng, None);
            assert!((1..=10).contains(&round.a));
            assert!((1..=10).contains(&round.b));
            assert!(round.sum() <= 20);
            assert!(round.sum() >= 2);
        }
    }

    #[test]
    fn test_options_distinct_and_contain_sum() {
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..500 {
            let round = AdditionRound::generate(&mut rng, None);
            assert!(round.options.contains(&round.sum()));
            for i in 0..4 {
                for j in i + 1..4 {
                    assert_ne!(round.options[i], round.options[j]);
                }
                assert!((2..=20).contains(&round.options[i]));
            }
        }
    }

    #[test]
    fn test_prev_pair_not_repeated_either_order() {
        let mut rng = Pcg32::seed_from_u64(13);
        let mut prev = None;
        for _ in 0..200 {
            let round = AdditionRound::generate(&mut rng, prev);
            if let Some((pa, pb)) = prev {
                assert!((round.a, round.b) != (pa, pb));
                assert!((round.a, round.b) != (pb, pa));
            }
            prev = Some((round.a, round.b));
        }
    }

    #[test]
    fn test_variant_key_is_unordered() {
        let r1 = AdditionRound {
            a: 3,
            b: 5,
            options: [8, 7, 9, 6],
        };
        let r2 = AdditionRound {
            a: 5,
            b: 3,
            options: [8, 7, 9, 6],
        };
        assert_eq!(r1.variant_key(), r2.variant_key());
    }
}
