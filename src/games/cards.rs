//! Card battle ("war")
//!
//! Two cards flip over each round and the child says which side wins. The
//! comparison call is the question; the captured-card piles are the score.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// The child's call for a revealed pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarCall {
    Left,
    Right,
    Tie,
}

/// A revealed pair of cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarRound {
    pub left: u8,
    pub right: u8,
}

impl WarRound {
    pub fn winner(&self) -> WarCall {
        match self.left.cmp(&self.right) {
            std::cmp::Ordering::Greater => WarCall::Left,
            std::cmp::Ordering::Less => WarCall::Right,
            std::cmp::Ordering::Equal => WarCall::Tie,
        }
    }

    /// Variety keys by comparison margin, so mixed margins score variety
    pub fn variant_key(&self) -> String {
        format!("war-margin-{}", self.left.abs_diff(self.right))
    }
}

/// Deck state for one war game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarGame {
    deck: Vec<u8>,
    pub current: Option<WarRound>,
    /// Cards captured by each side (ties go to neither)
    pub captured_left: u32,
    pub captured_right: u32,
    pub rounds_dealt: u32,
}

impl WarGame {
    /// Two suits of 1..=10, shuffled
    pub fn generate(rng: &mut Pcg32) -> Self {
        let mut deck: Vec<u8> = (1..=10u8).flat_map(|v| [v, v]).collect();
        for i in (1..deck.len()).rev() {
            let j = rng.random_range(0..=i);
            deck.swap(i, j);
        }
        Self {
            deck,
            current: None,
            captured_left: 0,
            captured_right: 0,
            rounds_dealt: 0,
        }
    }

    /// Cards left in the deck
    pub fn remaining(&self) -> usize {
        self.deck.len()
    }

    /// Reveal the next pair. None when the deck is exhausted or a pair is
    /// already on the table.
    pub fn deal(&mut self) -> Option<WarRound> {
        if self.current.is_some() || self.deck.len() < 2 {
            return None;
        }
        let left = self.deck.pop()?;
        let right = self.deck.pop()?;
        let round = WarRound { left, right };
        self.current = Some(round);
        self.rounds_dealt += 1;
        Some(round)
    }

    /// Judge the child's call. A correct call clears the table and awards
    /// the pair to the winning side; a wrong call leaves the pair up for
    /// another try.
    pub fn call(&mut self, call: WarCall) -> Option<bool> {
        let round = self.current?;
        let correct = call == round.winner();
        if correct {
            match round.winner() {
                WarCall::Left => self.captured_left += 2,
                WarCall::Right => self.captured_right += 2,
                WarCall::Tie => {}
            }
            self.current = None;
        }
        Some(correct)
    }

    /// Who's ahead on captured cards once the deck runs dry
    pub fn leader(&self) -> Option<WarCall> {
        match self.captured_left.cmp(&self.captured_right) {
            std::cmp::Ordering::Greater => Some(WarCall::Left),
            std::cmp::Ordering::Less => Some(WarCall::Right),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_deck_composition() {
        let mut rng = Pcg32::seed_from_u64(8);
        let game = WarGame::generate(&mut rng);
        assert_eq!(game.remaining(), 20);
        let mut counts = [0u8; 11];
        for &v in &game.deck {
            counts[v as usize] += 1;
        }
        for v in 1..=10 {
            assert_eq!(counts[v], 2);
        }
    }

    #[test]
    fn test_winner_calls() {
        assert_eq!(WarRound { left: 7, right: 3 }.winner(), WarCall::Left);
        assert_eq!(WarRound { left: 2, right: 9 }.winner(), WarCall::Right);
        assert_eq!(WarRound { left: 5, right: 5 }.winner(), WarCall::Tie);
    }

    #[test]
    fn test_correct_call_awards_pair() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut game = WarGame::generate(&mut rng);
        let round = game.deal().unwrap();
        // Can't deal on top of a live pair
        assert!(game.deal().is_none());

        let correct = game.call(round.winner()).unwrap();
        assert!(correct);
        assert!(game.current.is_none());
        match round.winner() {
            WarCall::Left => assert_eq!(game.captured_left, 2),
            WarCall::Right => assert_eq!(game.captured_right, 2),
            WarCall::Tie => {
                assert_eq!(game.captured_left, 0);
                assert_eq!(game.captured_right, 0);
            }
        }
    }

    #[test]
    fn test_wrong_call_keeps_pair_up() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut game = WarGame::generate(&mut rng);
        let round = game.deal().unwrap();
        let wrong = match round.winner() {
            WarCall::Left => WarCall::Right,
            _ => WarCall::Left,
        };
        assert_eq!(game.call(wrong), Some(false));
        assert_eq!(game.current, Some(round));
        // Recover with the right call
        assert_eq!(game.call(round.winner()), Some(true));
    }

    #[test]
    fn test_game_plays_out_whole_deck() {
        let mut rng = Pcg32::seed_from_u64(30);
        let mut game = WarGame::generate(&mut rng);
        let mut ties = 0u32;
        while let Some(round) = game.deal() {
            if round.winner() == WarCall::Tie {
                ties += 2;
            }
            assert_eq!(game.call(round.winner()), Some(true));
        }
        assert!(game.remaining() < 2);
        assert_eq!(game.rounds_dealt, 10);
        // Every non-tied card ends up captured
        assert_eq!(game.captured_left + game.captured_right + ties, 20);
        // Calling with nothing on the table does nothing
        assert_eq!(game.call(WarCall::Left), None);
    }
}
