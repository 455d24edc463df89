//! Deterministic game logic
//!
//! All gameplay lives here. This module must stay pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod addition;
pub mod balance;
pub mod cards;
pub mod counting;
pub mod dice;
pub mod drag;
pub mod memory;
pub mod quiz;
pub mod tracing;

pub use drag::{Aabb, DragSession, DropZone, resolve_drop};
pub use quiz::{Quiz, RoundPhase, SessionScore, TickEvent};
