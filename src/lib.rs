//! Mathlings - browser math mini-games for young learners
//!
//! Core modules:
//! - `games`: Deterministic game logic (rounds, beam physics, scoring)
//! - `stats`: Best-score book with daily expiry
//! - `settings`: Player preferences
//! - `narrate`: Speech narration and procedural sound effects
//! - `celebrate`: Rainbow/bear celebration overlays
//! - `render`: DOM/SVG board construction (wasm only)

pub mod celebrate;
pub mod games;
pub mod narrate;
#[cfg(target_arch = "wasm32")]
pub mod render;
pub mod settings;
pub mod stats;

pub use settings::Settings;
pub use stats::{GameId, ScoreSummary, StatsBook};

/// Game configuration constants
pub mod consts {
    /// Fixed logic timestep (60 Hz)
    pub const TICK_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death after a
    /// background tab resumes
    pub const MAX_SUBSTEPS: u32 = 6;

    /// Rounds in one play session
    pub const ROUNDS_PER_SESSION: u32 = 5;
    /// Par time per round for the speed score (12 s at 60 Hz)
    pub const PAR_TICKS: u32 = 720;
    /// Distinct question variants that count as full variety (one per
    /// round, so a fully varied session scores 100)
    pub const VARIETY_TARGET: usize = 5;

    /// Correct-answer feedback flash duration (ticks)
    pub const FEEDBACK_TICKS: u32 = 54;
    /// Try-again feedback flash duration (ticks)
    pub const RETRY_FEEDBACK_TICKS: u32 = 36;

    /// Game board dimensions in CSS pixels
    pub const BOARD_WIDTH: f32 = 640.0;
    pub const BOARD_HEIGHT: f32 = 480.0;

    /// Balance beam: tilt per unit of weight difference (radians)
    pub const TILT_PER_UNIT: f32 = 0.06;
    /// Balance beam: maximum tilt either way (radians)
    pub const MAX_TILT: f32 = 0.35;
    /// Balance beam: spring toward the target tilt
    pub const BEAM_STIFFNESS: f32 = 40.0;
    /// Balance beam: angular velocity damping (overdamped against the
    /// stiffness above, so the beam cannot oscillate forever)
    pub const BEAM_DAMPING: f32 = 14.0;
    /// Beam is settled when within this of the target angle
    pub const SETTLE_EPSILON: f32 = 0.01;
    /// ...and spinning slower than this (radians/s)
    pub const SETTLE_VEL_EPSILON: f32 = 0.02;

    /// Trace tolerance around each waypoint, in template units
    pub const TRACE_TOLERANCE: f32 = 14.0;

    /// Pairs on a memory board (one session round per pair)
    pub const PAIR_COUNT: usize = 5;
    /// Ticks a mismatched pair stays face-up before flipping back
    pub const MISMATCH_TICKS: u32 = 45;

    /// Celebration overlay duration (ticks)
    pub const CELEBRATION_TICKS: u32 = 150;
    /// Shortened overlay under reduced motion
    pub const CELEBRATION_TICKS_REDUCED: u32 = 45;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic ease-out for overlay and flip animations
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let u = 1.0 - t.clamp(0.0, 1.0);
    1.0 - u * u * u
}

