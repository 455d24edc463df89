//! Shared round state machine and session scoring
//!
//! Every game runs the same outer sequence: show the question, wait for
//! input, flash feedback, advance. The phase machine and the four-axis
//! session score live here so game modules only supply rounds.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::stats::ScoreSummary;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Question is being presented (narration, board build)
    Prompt,
    /// Waiting for the child's answer
    Await,
    /// Feedback flash after an answer
    Feedback { correct: bool, ticks_left: u32 },
    /// Session finished
    Done,
}

/// What the controller should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    None,
    /// Correct-feedback window expired, generate the next round
    AdvanceRound,
    /// Miss-feedback window expired, same question again
    RetryRound,
    /// All rounds played
    SessionDone,
}

/// Per-session tallies behind the accuracy/resilience/speed/variety axes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionScore {
    rounds: u32,
    first_try: u32,
    missed_rounds: u32,
    recovered: u32,
    fast_rounds: u32,
    variants: BTreeSet<String>,
}

impl SessionScore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note the variant key of a presented question
    pub fn record_variant(&mut self, key: &str) {
        let _ = self.variants.insert(key.to_string());
    }

    /// A round was answered correctly after `misses` wrong tries,
    /// taking `ticks` of thinking time
    pub fn complete_round(&mut self, ticks: u32, misses: u32) {
        self.rounds += 1;
        if misses == 0 {
            self.first_try += 1;
        } else {
            self.missed_rounds += 1;
            self.recovered += 1;
        }
        if ticks <= PAR_TICKS {
            self.fast_rounds += 1;
        }
    }

    /// A round was abandoned (player quit mid-question)
    pub fn abandon_round(&mut self, misses: u32) {
        if misses > 0 {
            self.missed_rounds += 1;
        }
    }

    /// Completed rounds so far
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn summary(&self) -> ScoreSummary {
        if self.rounds == 0 {
            return ScoreSummary::default();
        }
        let resilience = if self.missed_rounds == 0 {
            100
        } else {
            ScoreSummary::percent(self.recovered, self.missed_rounds)
        };
        ScoreSummary {
            accuracy: ScoreSummary::percent(self.first_try, self.rounds),
            resilience,
            speed: ScoreSummary::percent(self.fast_rounds, self.rounds),
            variety: ScoreSummary::percent(
                self.variants.len().min(VARIETY_TARGET) as u32,
                VARIETY_TARGET as u32,
            ),
        }
    }
}

/// Phase machine for option-answer games (counting, addition, dice, cards)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub phase: RoundPhase,
    /// 0-based index of the current round
    pub round_index: u32,
    pub score: SessionScore,
    round_ticks: u32,
    round_misses: u32,
}

impl Default for Quiz {
    fn default() -> Self {
        Self::new()
    }
}

impl Quiz {
    pub fn new() -> Self {
        Self {
            phase: RoundPhase::Prompt,
            round_index: 0,
            score: SessionScore::new(),
            round_ticks: 0,
            round_misses: 0,
        }
    }

    /// Enter a fresh round with the given variant key
    pub fn begin_round(&mut self, variant_key: &str) {
        self.phase = RoundPhase::Prompt;
        self.round_ticks = 0;
        self.round_misses = 0;
        self.score.record_variant(variant_key);
    }

    /// The board is on screen, start accepting answers
    pub fn prompt_shown(&mut self) {
        if self.phase == RoundPhase::Prompt {
            self.phase = RoundPhase::Await;
        }
    }

    /// Record an answer. Returns false if the quiz wasn't waiting for one
    /// (answers during the feedback flash are dropped).
    pub fn answer(&mut self, correct: bool) -> bool {
        if self.phase != RoundPhase::Await {
            return false;
        }
        let ticks_left = if correct {
            FEEDBACK_TICKS
        } else {
            self.round_misses += 1;
            RETRY_FEEDBACK_TICKS
        };
        self.phase = RoundPhase::Feedback {
            correct,
            ticks_left,
        };
        true
    }

    /// Advance one fixed timestep
    pub fn tick(&mut self) -> TickEvent {
        match self.phase {
            RoundPhase::Await => {
                self.round_ticks += 1;
                TickEvent::None
            }
            RoundPhase::Feedback {
                correct,
                ticks_left,
            } => {
                if ticks_left > 1 {
                    self.phase = RoundPhase::Feedback {
                        correct,
                        ticks_left: ticks_left - 1,
                    };
                    return TickEvent::None;
                }
                if correct {
                    self.score
                        .complete_round(self.round_ticks, self.round_misses);
                    self.round_index += 1;
                    if self.round_index >= ROUNDS_PER_SESSION {
                        self.phase = RoundPhase::Done;
                        TickEvent::SessionDone
                    } else {
                        self.phase = RoundPhase::Prompt;
                        TickEvent::AdvanceRound
                    }
                } else {
                    self.phase = RoundPhase::Await;
                    TickEvent::RetryRound
                }
            }
            RoundPhase::Prompt | RoundPhase::Done => TickEvent::None,
        }
    }

    /// Misses recorded in the current round
    pub fn misses(&self) -> u32 {
        self.round_misses
    }

    pub fn is_done(&self) -> bool {
        self.phase == RoundPhase::Done
    }

    pub fn summary(&self) -> ScoreSummary {
        self.score.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_feedback(quiz: &mut Quiz) -> TickEvent {
        loop {
            match quiz.tick() {
                TickEvent::None => continue,
                other => return other,
            }
        }
    }

    #[test]
    fn test_phase_sequence() {
        let mut quiz = Quiz::new();
        quiz.begin_round("a");
        assert_eq!(quiz.phase, RoundPhase::Prompt);
        // Answers before the prompt is shown are dropped
        assert!(!quiz.answer(true));
        quiz.prompt_shown();
        assert_eq!(quiz.phase, RoundPhase::Await);
        assert!(quiz.answer(true));
        // Double answers during feedback are dropped
        assert!(!quiz.answer(true));
        assert_eq!(run_feedback(&mut quiz), TickEvent::AdvanceRound);
        assert_eq!(quiz.round_index, 1);
    }

    #[test]
    fn test_miss_returns_to_await() {
        let mut quiz = Quiz::new();
        quiz.begin_round("a");
        quiz.prompt_shown();
        assert!(quiz.answer(false));
        assert_eq!(run_feedback(&mut quiz), TickEvent::RetryRound);
        assert_eq!(quiz.phase, RoundPhase::Await);
        assert_eq!(quiz.misses(), 1);
        // Recover
        assert!(quiz.answer(true));
        assert_eq!(run_feedback(&mut quiz), TickEvent::AdvanceRound);
    }

    #[test]
    fn test_session_completes() {
        let mut quiz = Quiz::new();
        for i in 0..ROUNDS_PER_SESSION {
            quiz.begin_round(&format!("v{i}"));
            quiz.prompt_shown();
            assert!(quiz.answer(true));
            let event = run_feedback(&mut quiz);
            if i + 1 == ROUNDS_PER_SESSION {
                assert_eq!(event, TickEvent::SessionDone);
            } else {
                assert_eq!(event, TickEvent::AdvanceRound);
            }
        }
        assert!(quiz.is_done());
        // Ticking a finished session is a no-op
        assert_eq!(quiz.tick(), TickEvent::None);

        let summary = quiz.summary();
        assert_eq!(summary.accuracy, 100);
        assert_eq!(summary.resilience, 100);
        assert_eq!(summary.speed, 100);
    }

    #[test]
    fn test_resilience_counts_recoveries() {
        let mut score = SessionScore::new();
        // Two rounds missed then recovered, one clean
        score.complete_round(100, 2);
        score.complete_round(100, 1);
        score.complete_round(100, 0);
        let s = score.summary();
        assert_eq!(s.accuracy, 33);
        assert_eq!(s.resilience, 100);
    }

    #[test]
    fn test_speed_par() {
        let mut score = SessionScore::new();
        score.complete_round(PAR_TICKS, 0);
        score.complete_round(PAR_TICKS + 1, 0);
        assert_eq!(score.summary().speed, 50);
    }

    #[test]
    fn test_variety_caps_at_target() {
        let mut score = SessionScore::new();
        for i in 0..VARIETY_TARGET + 3 {
            score.record_variant(&format!("v{i}"));
        }
        score.complete_round(10, 0);
        assert_eq!(score.summary().variety, 100);
    }

    #[test]
    fn test_empty_session_is_all_zero() {
        let score = SessionScore::new();
        let s = score.summary();
        assert_eq!((s.accuracy, s.resilience, s.speed, s.variety), (0, 0, 0, 0));
    }
}
