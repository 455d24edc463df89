//! Balance scale puzzles
//!
//! A two-pan beam scale. One pan starts loaded; the child drags weights from
//! a tray until both sides match and the beam settles level. The beam is
//! integrated with explicit Euler at the fixed timestep.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which pan of the scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pan {
    Left,
    Right,
}

/// The pivoting beam
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Beam {
    /// Current tilt (radians, positive = right pan down)
    pub angle: f32,
    pub angular_vel: f32,
}

impl Default for Beam {
    fn default() -> Self {
        Self {
            angle: 0.0,
            angular_vel: 0.0,
        }
    }
}

impl Beam {
    /// Tilt the beam wants to rest at for the given pan weights
    pub fn target_angle(left_w: u32, right_w: u32) -> f32 {
        let diff = right_w as f32 - left_w as f32;
        (diff * TILT_PER_UNIT).clamp(-MAX_TILT, MAX_TILT)
    }

    /// One explicit Euler step toward the target tilt
    pub fn step(&mut self, dt: f32, left_w: u32, right_w: u32) {
        let target = Self::target_angle(left_w, right_w);
        let acc = (target - self.angle) * BEAM_STIFFNESS - self.angular_vel * BEAM_DAMPING;
        self.angular_vel += acc * dt;
        self.angle += self.angular_vel * dt;
    }

    /// Beam has come to rest at its target tilt
    pub fn settled(&self, left_w: u32, right_w: u32) -> bool {
        let target = Self::target_angle(left_w, right_w);
        (self.angle - target).abs() < SETTLE_EPSILON
            && self.angular_vel.abs() < SETTLE_VEL_EPSILON
    }
}

/// One balance puzzle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancePuzzle {
    /// Weights sitting on each pan (values 1..=5, plus the fixed load)
    pub left: Vec<u8>,
    pub right: Vec<u8>,
    /// Weights still in the tray
    pub tray: Vec<u8>,
    pub beam: Beam,
    /// The preloaded weight the child must match
    pub target: u8,
    placed_any: bool,
}

impl BalancePuzzle {
    /// Generate a puzzle: a fixed load on the left pan and a tray holding at
    /// least one exact solution subset plus a couple of extras.
    pub fn generate(rng: &mut Pcg32) -> Self {
        let target = rng.random_range(5..=9u8);
        // Split the target into two tray weights no heavier than 5
        let lo = target.saturating_sub(5).max(1);
        let hi = 5.min(target - 1);
        let first = rng.random_range(lo..=hi);
        let second = target - first;

        let mut tray = vec![first, second];
        for _ in 0..rng.random_range(1..=3u8) {
            tray.push(rng.random_range(1..=5u8));
        }
        tray.shuffle(rng);

        Self {
            left: vec![target],
            right: Vec::new(),
            tray,
            beam: Beam::default(),
            target,
            placed_any: false,
        }
    }

    pub fn pan_weight(&self, pan: Pan) -> u32 {
        let weights = match pan {
            Pan::Left => &self.left,
            Pan::Right => &self.right,
        };
        weights.iter().map(|&w| w as u32).sum()
    }

    /// Move a tray weight onto a pan. Returns the weight value, or None if
    /// the index is stale or the puzzle is already solved.
    pub fn place(&mut self, tray_idx: usize, pan: Pan) -> Option<u8> {
        if self.solved() || tray_idx >= self.tray.len() {
            return None;
        }
        let w = self.tray.remove(tray_idx);
        match pan {
            Pan::Left => self.left.push(w),
            Pan::Right => self.right.push(w),
        }
        self.placed_any = true;
        Some(w)
    }

    /// Take a placed weight back to the tray. The fixed load (index 0 on the
    /// left pan) cannot be removed.
    pub fn take_back(&mut self, pan: Pan, idx: usize) -> Option<u8> {
        if self.solved() {
            return None;
        }
        let weights = match pan {
            Pan::Left => &mut self.left,
            Pan::Right => &mut self.right,
        };
        if pan == Pan::Left && idx == 0 {
            return None;
        }
        if idx >= weights.len() {
            return None;
        }
        let w = weights.remove(idx);
        self.tray.push(w);
        Some(w)
    }

    /// Pans match and the child has placed something
    pub fn is_level(&self) -> bool {
        self.placed_any && self.pan_weight(Pan::Left) == self.pan_weight(Pan::Right)
    }

    /// Level and the beam has physically come to rest
    pub fn solved(&self) -> bool {
        self.is_level()
            && self
                .beam
                .settled(self.pan_weight(Pan::Left), self.pan_weight(Pan::Right))
    }

    /// No way forward: tray exhausted but the pans don't match
    pub fn stuck(&self) -> bool {
        self.tray.is_empty() && !self.is_level()
    }

    pub fn step(&mut self, dt: f32) {
        let (l, r) = (self.pan_weight(Pan::Left), self.pan_weight(Pan::Right));
        self.beam.step(dt, l, r);
    }

    /// Total weight across pans and tray, for conservation checks
    pub fn total_weight(&self) -> u32 {
        self.pan_weight(Pan::Left)
            + self.pan_weight(Pan::Right)
            + self.tray.iter().map(|&w| w as u32).sum::<u32>()
    }

    pub fn variant_key(&self) -> String {
        format!("balance-{}", self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn settle(beam: &mut Beam, left: u32, right: u32) -> u32 {
        let mut ticks = 0;
        while !beam.settled(left, right) {
            beam.step(TICK_DT, left, right);
            ticks += 1;
            assert!(ticks < 60 * 30, "beam failed to settle");
        }
        ticks
    }

    #[test]
    fn test_beam_settles_level_when_equal() {
        let mut beam = Beam {
            angle: MAX_TILT,
            angular_vel: 0.0,
        };
        settle(&mut beam, 7, 7);
        assert!(beam.angle.abs() < SETTLE_EPSILON);
    }

    #[test]
    fn test_beam_tilts_toward_heavier_pan() {
        let mut beam = Beam::default();
        settle(&mut beam, 3, 8);
        assert!(beam.angle > 0.0, "right-heavy beam should tilt positive");

        let mut beam = Beam::default();
        settle(&mut beam, 8, 3);
        assert!(beam.angle < 0.0);
    }

    #[test]
    fn test_tilt_is_clamped() {
        assert_eq!(Beam::target_angle(0, 100), MAX_TILT);
        assert_eq!(Beam::target_angle(100, 0), -MAX_TILT);
    }

    #[test]
    fn test_generated_puzzle_is_solvable_with_two_weights() {
        let mut rng = Pcg32::seed_from_u64(21);
        for _ in 0..200 {
            let puzzle = BalancePuzzle::generate(&mut rng);
            assert!((5..=9).contains(&puzzle.target));
            assert!((3..=5).contains(&puzzle.tray.len()));
            assert!(puzzle.tray.iter().all(|&w| (1..=5).contains(&w)));
            // Some pair in the tray sums to the target
            let tray = &puzzle.tray;
            let solvable = (0..tray.len()).any(|i| {
                (0..tray.len())
                    .any(|j| i != j && tray[i] as u32 + tray[j] as u32 == puzzle.target as u32)
            });
            assert!(solvable, "tray {tray:?} cannot match {}", puzzle.target);
        }
    }

    #[test]
    fn test_weight_conservation() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut puzzle = BalancePuzzle::generate(&mut rng);
        let total = puzzle.total_weight();

        let w = puzzle.place(0, Pan::Right).unwrap();
        assert_eq!(puzzle.total_weight(), total);
        assert_eq!(*puzzle.right.last().unwrap(), w);

        puzzle.take_back(Pan::Right, 0).unwrap();
        assert_eq!(puzzle.total_weight(), total);
    }

    #[test]
    fn test_fixed_load_cannot_be_removed() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut puzzle = BalancePuzzle::generate(&mut rng);
        assert!(puzzle.take_back(Pan::Left, 0).is_none());
    }

    #[test]
    fn test_solve_flow() {
        let mut puzzle = BalancePuzzle {
            left: vec![7],
            right: Vec::new(),
            tray: vec![3, 4, 2],
            beam: Beam::default(),
            target: 7,
            placed_any: false,
        };
        // Nothing placed yet, so the board can't count as level
        assert!(!puzzle.is_level());

        puzzle.place(0, Pan::Right); // 3
        puzzle.place(0, Pan::Right); // 4
        assert!(puzzle.is_level());
        for _ in 0..60 * 10 {
            puzzle.step(TICK_DT);
        }
        assert!(puzzle.solved());
        // Further placements are ignored once solved
        assert!(puzzle.place(0, Pan::Right).is_none());
    }

    #[test]
    fn test_stuck_detection() {
        let mut puzzle = BalancePuzzle {
            left: vec![7],
            right: Vec::new(),
            tray: vec![2],
            beam: Beam::default(),
            target: 7,
            placed_any: false,
        };
        puzzle.place(0, Pan::Right);
        assert!(puzzle.stuck());
        // Taking the weight back un-sticks the board
        puzzle.take_back(Pan::Right, 0).unwrap();
        assert!(!puzzle.stuck());
    }
}
