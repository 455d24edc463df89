//! Dice rounds
//!
//! Dice tumble across the board as quarter-turn rolls; orientation is a 3x3
//! integer rotation matrix composed per roll, and the face that ends up on
//! top is what the child counts. Standard western dice: 1 opposite 6,
//! 2 opposite 5, 3 opposite 4.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// A quarter-turn tumble direction (world axes, +y = north)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Roll {
    North,
    South,
    East,
    West,
}

impl Roll {
    pub const ALL: [Roll; 4] = [Roll::North, Roll::South, Roll::East, Roll::West];

    pub fn opposite(&self) -> Roll {
        match self {
            Roll::North => Roll::South,
            Roll::South => Roll::North,
            Roll::East => Roll::West,
            Roll::West => Roll::East,
        }
    }

    /// Rotation matrix applied to the die's local-to-world map
    fn matrix(&self) -> [[i8; 3]; 3] {
        match self {
            // About the x axis: top rolls toward +y
            Roll::North => [[1, 0, 0], [0, 0, 1], [0, -1, 0]],
            Roll::South => [[1, 0, 0], [0, 0, -1], [0, 1, 0]],
            // About the y axis: top rolls toward +x
            Roll::East => [[0, 0, 1], [0, 1, 0], [-1, 0, 0]],
            Roll::West => [[0, 0, -1], [0, 1, 0], [1, 0, 0]],
        }
    }
}

fn mat_mul(a: [[i8; 3]; 3], b: [[i8; 3]; 3]) -> [[i8; 3]; 3] {
    let mut out = [[0i8; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[r][k] * b[k][c]).sum();
        }
    }
    out
}

/// Die orientation as a local-to-world rotation. Identity shows 1 on top,
/// 2 facing north, 3 facing east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieOrientation([[i8; 3]; 3]);

/// Faces along the local +x/+y/+z axes and their opposites
const AXIS_FACES: [(u8, u8); 3] = [(3, 4), (2, 5), (1, 6)];

impl DieOrientation {
    pub const IDENTITY: Self = Self([[1, 0, 0], [0, 1, 0], [0, 0, 1]]);

    /// Apply one quarter-turn tumble
    #[must_use]
    pub fn rolled(&self, roll: Roll) -> Self {
        Self(mat_mul(roll.matrix(), self.0))
    }

    /// The face currently pointing up (world +z)
    pub fn top_face(&self) -> u8 {
        self.face_along(2, 1)
    }

    /// The face against the table
    pub fn bottom_face(&self) -> u8 {
        self.face_along(2, -1)
    }

    /// The face pointing north, for drawing the visible side
    pub fn north_face(&self) -> u8 {
        self.face_along(1, 1)
    }

    fn face_along(&self, world_axis: usize, sign: i8) -> u8 {
        for (i, &(pos, neg)) in AXIS_FACES.iter().enumerate() {
            match self.0[world_axis][i] {
                s if s == sign => return pos,
                s if s == -sign => return neg,
                _ => {}
            }
        }
        // Unreachable for a valid rotation matrix
        1
    }

    pub fn determinant(&self) -> i8 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Proper rotation: every row is a signed unit axis and det = +1
    pub fn is_rotation(&self) -> bool {
        for row in &self.0 {
            if row.iter().map(|v| v * v).sum::<i8>() != 1 {
                return false;
            }
        }
        self.determinant() == 1
    }
}

impl Default for DieOrientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Random tumble with no immediate backtracking (east-then-west reads as
/// jitter on screen)
pub fn tumble_plan(rng: &mut Pcg32, steps: usize) -> Vec<Roll> {
    let mut plan = Vec::with_capacity(steps);
    let mut prev: Option<Roll> = None;
    for _ in 0..steps {
        let roll = loop {
            let r = Roll::ALL[rng.random_range(0..4)];
            if prev.map(|p| p.opposite()) != Some(r) {
                break r;
            }
        };
        plan.push(roll);
        prev = Some(roll);
    }
    plan
}

/// One die's tumble and where it ends up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TumbledDie {
    pub plan: Vec<Roll>,
    pub orientation: DieOrientation,
}

impl TumbledDie {
    pub fn generate(rng: &mut Pcg32) -> Self {
        let plan = tumble_plan(rng, rng.random_range(4..=8));
        let orientation = plan
            .iter()
            .fold(DieOrientation::IDENTITY, |o, &r| o.rolled(r));
        Self { plan, orientation }
    }
}

/// One pip-counting question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipRound {
    pub dice: Vec<TumbledDie>,
    /// Answer buttons, shuffled; exactly one equals the pip total
    pub options: [u8; 3],
}

impl PipRound {
    pub fn generate(rng: &mut Pcg32, dice_count: usize) -> Self {
        let dice: Vec<TumbledDie> = (0..dice_count.clamp(1, 3))
            .map(|_| TumbledDie::generate(rng))
            .collect();
        let total: u8 = dice.iter().map(|d| d.orientation.top_face()).sum();
        let lo = dice.len() as u8;
        let hi = 6 * dice.len() as u8;

        let mut options = [total, 0, 0];
        for slot in 1..3 {
            options[slot] = loop {
                let delta = rng.random_range(1..=3u8);
                let candidate = if rng.random_bool(0.5) {
                    total.saturating_add(delta).min(hi)
                } else {
                    total.saturating_sub(delta).max(lo)
                };
                if !options[..slot].contains(&candidate) {
                    break candidate;
                }
            };
        }
        options.shuffle(rng);

        Self { dice, options }
    }

    pub fn total(&self) -> u8 {
        self.dice.iter().map(|d| d.orientation.top_face()).sum()
    }

    pub fn answer(&self, n: u8) -> bool {
        n == self.total()
    }

    pub fn variant_key(&self) -> String {
        format!("pips-{}", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_identity_faces() {
        let o = DieOrientation::IDENTITY;
        assert_eq!(o.top_face(), 1);
        assert_eq!(o.bottom_face(), 6);
        assert_eq!(o.north_face(), 2);
    }

    #[test]
    fn test_single_rolls() {
        let o = DieOrientation::IDENTITY;
        // Rolling north tips the top away to the north, bringing the south
        // face (5) up
        assert_eq!(o.rolled(Roll::North).top_face(), 5);
        assert_eq!(o.rolled(Roll::South).top_face(), 2);
        assert_eq!(o.rolled(Roll::East).top_face(), 4);
        assert_eq!(o.rolled(Roll::West).top_face(), 3);
    }

    #[test]
    fn test_four_turns_restore() {
        for roll in Roll::ALL {
            let mut o = DieOrientation::IDENTITY;
            for _ in 0..4 {
                o = o.rolled(roll);
            }
            assert_eq!(o, DieOrientation::IDENTITY, "{roll:?}");
        }
    }

    #[test]
    fn test_roll_then_opposite_restores() {
        let mut rng = Pcg32::seed_from_u64(17);
        let die = TumbledDie::generate(&mut rng);
        for roll in Roll::ALL {
            let back = die.orientation.rolled(roll).rolled(roll.opposite());
            assert_eq!(back, die.orientation);
        }
    }

    #[test]
    fn test_pip_round_options() {
        let mut rng = Pcg32::seed_from_u64(23);
        for count in 1..=3usize {
            for _ in 0..100 {
                let round = PipRound::generate(&mut rng, count);
                assert_eq!(round.dice.len(), count);
                let total = round.total();
                assert!((count as u8..=6 * count as u8).contains(&total));
                assert!(round.options.contains(&total));
                assert_ne!(round.options[0], round.options[1]);
                assert_ne!(round.options[0], round.options[2]);
                assert_ne!(round.options[1], round.options[2]);
            }
        }
    }

    #[test]
    fn test_tumble_plan_never_backtracks() {
        let mut rng = Pcg32::seed_from_u64(31);
        for _ in 0..100 {
            let plan = tumble_plan(&mut rng, 8);
            for pair in plan.windows(2) {
                assert_ne!(pair[1], pair[0].opposite());
            }
        }
    }

    proptest! {
        /// Any roll sequence keeps the orientation a proper rotation with
        /// opposite faces summing to 7.
        #[test]
        fn prop_rolls_preserve_rotation_invariants(
            rolls in prop::collection::vec(0..4usize, 0..40)
        ) {
            let mut o = DieOrientation::IDENTITY;
            for idx in rolls {
                o = o.rolled(Roll::ALL[idx]);
                prop_assert!(o.is_rotation());
                prop_assert_eq!(o.top_face() + o.bottom_face(), 7);
                prop_assert!((1..=6).contains(&o.top_face()));
            }
        }
    }
}
