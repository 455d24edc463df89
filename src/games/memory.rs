//! Memory pairs
//!
//! A grid of face-down number cards; the child flips two at a time looking
//! for matching values. Mismatched pairs flip back after a short delay
//! (driven by the controller's tick counter).

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Card face state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Down,
    Up,
    Matched,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: u32,
    pub value: u8,
    pub face: Face,
}

/// Result of flipping a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// First card of the pair turned up
    FirstUp,
    /// Second card matched the first
    Matched(u32, u32),
    /// Second card didn't match; flip both back after the delay
    Mismatched(u32, u32),
    /// Flip ignored (card already up/matched, or two cards showing)
    Ignored,
}

/// The pair board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryBoard {
    pub cards: Vec<Card>,
    /// Total mismatched guesses this board
    pub mismatches: u32,
}

impl MemoryBoard {
    /// Deal `pairs` value pairs, shuffled with seeded Fisher-Yates
    pub fn generate(rng: &mut Pcg32, pairs: usize) -> Self {
        let mut values: Vec<u8> = (1..=pairs as u8).flat_map(|v| [v, v]).collect();
        for i in (1..values.len()).rev() {
            let j = rng.random_range(0..=i);
            values.swap(i, j);
        }
        let cards = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Card {
                id: i as u32,
                value,
                face: Face::Down,
            })
            .collect();
        Self {
            cards,
            mismatches: 0,
        }
    }

    fn card(&self, id: u32) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    fn card_mut(&mut self, id: u32) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    /// Ids of cards currently face-up but not yet matched
    pub fn face_up(&self) -> Vec<u32> {
        self.cards
            .iter()
            .filter(|c| c.face == Face::Up)
            .map(|c| c.id)
            .collect()
    }

    pub fn flip(&mut self, id: u32) -> FlipOutcome {
        let up = self.face_up();
        if up.len() >= 2 || up.contains(&id) {
            return FlipOutcome::Ignored;
        }
        match self.card(id).map(|c| c.face) {
            Some(Face::Down) => {}
            _ => return FlipOutcome::Ignored,
        }

        if let Some(card) = self.card_mut(id) {
            card.face = Face::Up;
        }

        let Some(&first) = up.first() else {
            return FlipOutcome::FirstUp;
        };

        let a = self.card(first).map(|c| c.value);
        let b = self.card(id).map(|c| c.value);
        if a == b {
            for cid in [first, id] {
                if let Some(card) = self.card_mut(cid) {
                    card.face = Face::Matched;
                }
            }
            FlipOutcome::Matched(first, id)
        } else {
            self.mismatches += 1;
            FlipOutcome::Mismatched(first, id)
        }
    }

    /// Flip a mismatched pair back down (called when the delay expires)
    pub fn settle_mismatch(&mut self, a: u32, b: u32) {
        for id in [a, b] {
            if let Some(card) = self.card_mut(id) {
                if card.face == Face::Up {
                    card.face = Face::Down;
                }
            }
        }
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.face == Face::Matched).count() / 2
    }

    pub fn solved(&self) -> bool {
        self.cards.iter().all(|c| c.face == Face::Matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn find_pair(board: &MemoryBoard, value: u8) -> (u32, u32) {
        let ids: Vec<u32> = board
            .cards
            .iter()
            .filter(|c| c.value == value)
            .map(|c| c.id)
            .collect();
        (ids[0], ids[1])
    }

    #[test]
    fn test_deal_has_exact_pairs() {
        let mut rng = Pcg32::seed_from_u64(1);
        let board = MemoryBoard::generate(&mut rng, 5);
        assert_eq!(board.cards.len(), 10);
        for v in 1..=5u8 {
            assert_eq!(board.cards.iter().filter(|c| c.value == v).count(), 2);
        }
        assert!(board.cards.iter().all(|c| c.face == Face::Down));
    }

    #[test]
    fn test_match_flow() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut board = MemoryBoard::generate(&mut rng, 3);
        let (a, b) = find_pair(&board, 2);

        assert_eq!(board.flip(a), FlipOutcome::FirstUp);
        assert_eq!(board.flip(b), FlipOutcome::Matched(a, b));
        assert_eq!(board.matched_pairs(), 1);
        assert_eq!(board.mismatches, 0);
        // Matched cards can't be flipped again
        assert_eq!(board.flip(a), FlipOutcome::Ignored);
    }

    #[test]
    fn test_mismatch_flow() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut board = MemoryBoard::generate(&mut rng, 3);
        let (a, _) = find_pair(&board, 1);
        let (b, _) = find_pair(&board, 3);

        assert_eq!(board.flip(a), FlipOutcome::FirstUp);
        // Flipping the same card again does nothing
        assert_eq!(board.flip(a), FlipOutcome::Ignored);
        assert_eq!(board.flip(b), FlipOutcome::Mismatched(a, b));
        assert_eq!(board.mismatches, 1);

        // Third flip while two are showing is ignored
        let (c, _) = find_pair(&board, 2);
        assert_eq!(board.flip(c), FlipOutcome::Ignored);

        board.settle_mismatch(a, b);
        assert!(board.face_up().is_empty());
        // Back down means flippable again
        assert_eq!(board.flip(a), FlipOutcome::FirstUp);
    }

    #[test]
    fn test_solve_whole_board() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut board = MemoryBoard::generate(&mut rng, 4);
        for v in 1..=4u8 {
            let (a, b) = find_pair(&board, v);
            board.flip(a);
            board.flip(b);
        }
        assert!(board.solved());
        assert_eq!(board.matched_pairs(), 4);
    }

    #[test]
    fn test_settle_leaves_matched_cards_alone() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut board = MemoryBoard::generate(&mut rng, 2);
        let (a, b) = find_pair(&board, 1);
        board.flip(a);
        board.flip(b);
        board.settle_mismatch(a, b);
        assert_eq!(board.matched_pairs(), 1);
    }
}
