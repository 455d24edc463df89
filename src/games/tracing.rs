//! Number tracing
//!
//! Each digit is an ordered list of waypoint polylines (one stroke for most
//! digits, two for 4 and 7) in a 100x140 template box. The child's pointer
//! advances the trace one waypoint at a time; samples far from the next
//! waypoint are ignored, so progress is strictly monotone and can't skip.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TRACE_TOLERANCE;

/// Template box the waypoints live in
pub const TEMPLATE_WIDTH: f32 = 100.0;
pub const TEMPLATE_HEIGHT: f32 = 140.0;

type Stroke = &'static [(f32, f32)];

const DIGIT_0: &[Stroke] = &[&[
    (50.0, 20.0),
    (29.0, 35.0),
    (20.0, 70.0),
    (29.0, 105.0),
    (50.0, 120.0),
    (71.0, 105.0),
    (80.0, 70.0),
    (71.0, 35.0),
    (50.0, 20.0),
]];

const DIGIT_1: &[Stroke] = &[&[(35.0, 35.0), (55.0, 20.0), (55.0, 70.0), (55.0, 120.0)]];

const DIGIT_2: &[Stroke] = &[&[
    (28.0, 40.0),
    (40.0, 22.0),
    (60.0, 20.0),
    (74.0, 34.0),
    (72.0, 52.0),
    (55.0, 75.0),
    (35.0, 98.0),
    (25.0, 120.0),
    (50.0, 120.0),
    (75.0, 120.0),
]];

const DIGIT_3: &[Stroke] = &[&[
    (28.0, 32.0),
    (45.0, 20.0),
    (65.0, 25.0),
    (70.0, 42.0),
    (55.0, 62.0),
    (64.0, 76.0),
    (72.0, 92.0),
    (65.0, 112.0),
    (45.0, 122.0),
    (28.0, 110.0),
]];

const DIGIT_4: &[Stroke] = &[
    &[(62.0, 20.0), (45.0, 52.0), (28.0, 88.0), (78.0, 88.0)],
    &[(62.0, 45.0), (62.0, 82.0), (62.0, 120.0)],
];

const DIGIT_5: &[Stroke] = &[&[
    (72.0, 20.0),
    (32.0, 20.0),
    (30.0, 55.0),
    (45.0, 50.0),
    (65.0, 58.0),
    (72.0, 80.0),
    (65.0, 105.0),
    (45.0, 120.0),
    (28.0, 108.0),
]];

const DIGIT_6: &[Stroke] = &[&[
    (68.0, 22.0),
    (48.0, 32.0),
    (32.0, 55.0),
    (26.0, 82.0),
    (32.0, 105.0),
    (48.0, 118.0),
    (64.0, 112.0),
    (70.0, 94.0),
    (62.0, 78.0),
    (45.0, 74.0),
    (30.0, 84.0),
]];

const DIGIT_7: &[Stroke] = &[
    &[(25.0, 22.0), (50.0, 22.0), (75.0, 22.0)],
    &[(75.0, 22.0), (58.0, 55.0), (45.0, 88.0), (35.0, 120.0)],
];

const DIGIT_8: &[Stroke] = &[&[
    (50.0, 20.0),
    (31.0, 32.0),
    (34.0, 55.0),
    (50.0, 64.0),
    (30.0, 82.0),
    (31.0, 108.0),
    (50.0, 120.0),
    (69.0, 108.0),
    (70.0, 82.0),
    (50.0, 64.0),
    (66.0, 55.0),
    (69.0, 32.0),
    (50.0, 20.0),
]];

const DIGIT_9: &[Stroke] = &[&[
    (72.0, 38.0),
    (58.0, 22.0),
    (38.0, 24.0),
    (28.0, 42.0),
    (32.0, 60.0),
    (50.0, 68.0),
    (68.0, 60.0),
    (72.0, 42.0),
    (70.0, 80.0),
    (66.0, 102.0),
    (58.0, 120.0),
]];

/// Stroke templates for a digit 0-9
pub fn digit_strokes(digit: u8) -> &'static [Stroke] {
    match digit {
        0 => DIGIT_0,
        1 => DIGIT_1,
        2 => DIGIT_2,
        3 => DIGIT_3,
        4 => DIGIT_4,
        5 => DIGIT_5,
        6 => DIGIT_6,
        7 => DIGIT_7,
        8 => DIGIT_8,
        _ => DIGIT_9,
    }
}

/// Live trace state for one digit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceProgress {
    pub digit: u8,
    /// Current stroke (== stroke count when finished)
    stroke: usize,
    /// Next waypoint to hit in the current stroke
    waypoint: usize,
    waypoints_hit: usize,
    pen_down: bool,
    /// Pen must lift between strokes
    needs_lift: bool,
}

impl TraceProgress {
    pub fn new(digit: u8) -> Self {
        Self {
            digit: digit.min(9),
            stroke: 0,
            waypoint: 0,
            waypoints_hit: 0,
            pen_down: false,
            needs_lift: false,
        }
    }

    fn strokes(&self) -> &'static [Stroke] {
        digit_strokes(self.digit)
    }

    /// The waypoint the pen should head for next
    pub fn next_waypoint(&self) -> Option<Vec2> {
        let strokes = self.strokes();
        let stroke = strokes.get(self.stroke)?;
        let (x, y) = *stroke.get(self.waypoint)?;
        Some(Vec2::new(x, y))
    }

    /// Index of the stroke in progress, for highlighting
    pub fn current_stroke(&self) -> usize {
        self.stroke
    }

    /// Next waypoint index within the current stroke
    pub fn waypoint_index(&self) -> usize {
        self.waypoint
    }

    pub fn finished(&self) -> bool {
        self.stroke >= self.strokes().len()
    }

    /// Fraction of all waypoints hit, 0.0..=1.0
    pub fn completion(&self) -> f32 {
        let total: usize = self.strokes().iter().map(|s| s.len()).sum();
        if total == 0 {
            return 1.0;
        }
        self.waypoints_hit as f32 / total as f32
    }

    pub fn pen_down(&mut self, pos: Vec2) -> u32 {
        self.pen_down = true;
        self.try_advance(pos)
    }

    /// Feed a pointer sample; returns how many waypoints it consumed
    pub fn pen_move(&mut self, pos: Vec2) -> u32 {
        if !self.pen_down {
            return 0;
        }
        self.try_advance(pos)
    }

    pub fn pen_up(&mut self) {
        self.pen_down = false;
        self.needs_lift = false;
    }

    fn try_advance(&mut self, pos: Vec2) -> u32 {
        if self.needs_lift {
            return 0;
        }
        let mut advanced = 0;
        while let Some(next) = self.next_waypoint() {
            if pos.distance(next) > TRACE_TOLERANCE {
                break;
            }
            self.waypoint += 1;
            self.waypoints_hit += 1;
            advanced += 1;
            if self.waypoint >= self.strokes()[self.stroke].len() {
                self.stroke += 1;
                self.waypoint = 0;
                if !self.finished() {
                    self.needs_lift = true;
                }
                break;
            }
        }
        advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_stroke(trace: &mut TraceProgress, stroke: Stroke) {
        trace.pen_down(Vec2::new(stroke[0].0, stroke[0].1));
        for &(x, y) in stroke {
            trace.pen_move(Vec2::new(x, y));
        }
        trace.pen_up();
    }

    #[test]
    fn test_templates_are_well_formed() {
        for digit in 0..=9u8 {
            let strokes = digit_strokes(digit);
            assert!(!strokes.is_empty());
            for stroke in strokes {
                assert!(stroke.len() >= 3);
                for &(x, y) in *stroke {
                    assert!((0.0..=TEMPLATE_WIDTH).contains(&x), "digit {digit}");
                    assert!((0.0..=TEMPLATE_HEIGHT).contains(&y), "digit {digit}");
                }
                // Waypoints are spaced wider than the tolerance so a single
                // touch can't swallow a whole stroke
                for pair in stroke.windows(2) {
                    let a = Vec2::new(pair[0].0, pair[0].1);
                    let b = Vec2::new(pair[1].0, pair[1].1);
                    assert!(a.distance(b) > TRACE_TOLERANCE, "digit {digit}");
                }
            }
        }
    }

    #[test]
    fn test_two_stroke_digits() {
        assert_eq!(digit_strokes(4).len(), 2);
        assert_eq!(digit_strokes(7).len(), 2);
        for d in [0, 1, 2, 3, 5, 6, 8, 9] {
            assert_eq!(digit_strokes(d).len(), 1, "digit {d}");
        }
    }

    #[test]
    fn test_full_trace_completes() {
        for digit in 0..=9u8 {
            let mut trace = TraceProgress::new(digit);
            for stroke in digit_strokes(digit) {
                walk_stroke(&mut trace, stroke);
            }
            assert!(trace.finished(), "digit {digit}");
            assert!((trace.completion() - 1.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_far_samples_are_ignored() {
        let mut trace = TraceProgress::new(1);
        trace.pen_down(Vec2::new(0.0, 0.0));
        assert_eq!(trace.pen_move(Vec2::new(99.0, 139.0)), 0);
        assert_eq!(trace.completion(), 0.0);
    }

    #[test]
    fn test_waypoints_cannot_be_skipped() {
        let mut trace = TraceProgress::new(1);
        // Jump straight to the last waypoint: nothing happens
        trace.pen_down(Vec2::new(55.0, 120.0));
        assert_eq!(trace.completion(), 0.0);
        // Hit the first two, then the trace accepts the rest in order
        trace.pen_move(Vec2::new(35.0, 35.0));
        trace.pen_move(Vec2::new(55.0, 20.0));
        trace.pen_move(Vec2::new(55.0, 70.0));
        trace.pen_move(Vec2::new(55.0, 120.0));
        assert!(trace.finished());
    }

    #[test]
    fn test_second_stroke_requires_pen_lift() {
        let mut trace = TraceProgress::new(7);
        let strokes = digit_strokes(7);
        // Finish the top bar without lifting
        trace.pen_down(Vec2::new(strokes[0][0].0, strokes[0][0].1));
        for &(x, y) in strokes[0] {
            trace.pen_move(Vec2::new(x, y));
        }
        assert_eq!(trace.current_stroke(), 1);
        // Still down: the diagonal won't start
        assert_eq!(trace.pen_move(Vec2::new(75.0, 22.0)), 0);
        trace.pen_up();
        walk_stroke(&mut trace, strokes[1]);
        assert!(trace.finished());
    }

    #[test]
    fn test_pen_up_pauses_progress() {
        let mut trace = TraceProgress::new(1);
        trace.pen_down(Vec2::new(35.0, 35.0));
        trace.pen_up();
        assert_eq!(trace.pen_move(Vec2::new(55.0, 20.0)), 0);
    }
}
