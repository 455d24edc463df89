//! Counting rounds
//!
//! A handful of critters scatter across the board; the child picks how many
//! there are from three number buttons.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Sprites the board can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Critter {
    Ladybug,
    Frog,
    Star,
    Fish,
    Balloon,
    Apple,
}

impl Critter {
    pub const ALL: [Critter; 6] = [
        Critter::Ladybug,
        Critter::Frog,
        Critter::Star,
        Critter::Fish,
        Critter::Balloon,
        Critter::Apple,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            Critter::Ladybug => "\u{1F41E}",
            Critter::Frog => "\u{1F438}",
            Critter::Star => "\u{2B50}",
            Critter::Fish => "\u{1F420}",
            Critter::Balloon => "\u{1F388}",
            Critter::Apple => "\u{1F34E}",
        }
    }

    /// Plural noun for narration prompts
    pub fn plural(&self) -> &'static str {
        match self {
            Critter::Ladybug => "ladybugs",
            Critter::Frog => "frogs",
            Critter::Star => "stars",
            Critter::Fish => "fish",
            Critter::Balloon => "balloons",
            Critter::Apple => "apples",
        }
    }
}

/// One counting question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountingRound {
    pub target: u8,
    pub critter: Critter,
    /// Answer buttons, shuffled; exactly one equals `target`
    pub options: [u8; 3],
    /// Sprite centers in board coordinates
    pub positions: Vec<Vec2>,
}

impl CountingRound {
    /// Generate a round, avoiding a repeat of the previous target
    pub fn generate(rng: &mut Pcg32, prev_target: Option<u8>) -> Self {
        let target = loop {
            let t = rng.random_range(1..=10u8);
            if Some(t) != prev_target {
                break t;
            }
        };
        let critter = Critter::ALL[rng.random_range(0..Critter::ALL.len())];

        let mut options = [target, 0, 0];
        for slot in 1..3 {
            options[slot] = loop {
                let d = rng.random_range(1..=10u8);
                if !options[..slot].contains(&d) {
                    break d;
                }
            };
        }
        options.shuffle(rng);

        Self {
            target,
            critter,
            options,
            positions: scatter(rng, target as usize),
        }
    }

    pub fn answer(&self, n: u8) -> bool {
        n == self.target
    }

    pub fn variant_key(&self) -> String {
        format!("count-{}", self.target)
    }
}

/// Sprite layout region (inside the board, above the answer row)
const SLOT_COLS: usize = 5;
const SLOT_ORIGIN: Vec2 = Vec2::new(112.0, 150.0);
const SLOT_STEP: Vec2 = Vec2::new(104.0, 120.0);
const SLOT_JITTER: f32 = 18.0;

/// Scatter `count` sprites over jittered grid slots so no two ever overlap
pub fn scatter(rng: &mut Pcg32, count: usize) -> Vec<Vec2> {
    let mut slots: Vec<usize> = (0..SLOT_COLS * 2).collect();
    slots.shuffle(rng);
    slots
        .into_iter()
        .take(count)
        .map(|slot| {
            let col = (slot % SLOT_COLS) as f32;
            let row = (slot / SLOT_COLS) as f32;
            let jx = rng.random_range(-SLOT_JITTER..=SLOT_JITTER);
            let jy = rng.random_range(-SLOT_JITTER..=SLOT_JITTER);
            SLOT_ORIGIN + Vec2::new(col * SLOT_STEP.x + jx, row * SLOT_STEP.y + jy)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_round_has_target_among_distinct_options() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let round = CountingRound::generate(&mut rng, None);
            assert!((1..=10).contains(&round.target));
            assert!(round.options.contains(&round.target));
            assert_ne!(round.options[0], round.options[1]);
            assert_ne!(round.options[0], round.options[2]);
            assert_ne!(round.options[1], round.options[2]);
            assert_eq!(round.positions.len(), round.target as usize);
        }
    }

    #[test]
    fn test_no_repeat_target() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut prev = None;
        for _ in 0..100 {
            let round = CountingRound::generate(&mut rng, prev);
            assert_ne!(Some(round.target), prev);
            prev = Some(round.target);
        }
    }

    #[test]
    fn test_scatter_keeps_sprites_apart() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..50 {
            let positions = scatter(&mut rng, 10);
            for (i, a) in positions.iter().enumerate() {
                for b in positions.iter().skip(i + 1) {
                    // Slots are 104 px apart with ±18 px jitter, so centers
                    // can never come closer than one sprite width
                    assert!((*a - *b).length() >= 104.0 - 2.0 * SLOT_JITTER - 0.001);
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = CountingRound::generate(&mut Pcg32::seed_from_u64(42), None);
        let b = CountingRound::generate(&mut Pcg32::seed_from_u64(42), None);
        assert_eq!(a.target, b.target);
        assert_eq!(a.options, b.options);
        assert_eq!(a.positions, b.positions);
    }
}
