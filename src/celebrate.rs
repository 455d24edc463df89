//! Celebration overlays
//!
//! The rainbow pops up on round milestones, the bear on a finished session.
//! Timing lives here as plain tick counters; the DOM spawning is wasm-only.

use serde::{Deserialize, Serialize};

/// Which overlay to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CelebrationKind {
    Rainbow,
    Bear,
}

/// A running celebration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Celebration {
    pub kind: CelebrationKind,
    pub ticks_left: u32,
    ticks_total: u32,
}

impl Celebration {
    pub fn new(kind: CelebrationKind, ticks: u32) -> Self {
        Self {
            kind,
            ticks_left: ticks,
            ticks_total: ticks,
        }
    }

    /// Count down one tick; true when the overlay should come down
    pub fn tick(&mut self) -> bool {
        self.ticks_left = self.ticks_left.saturating_sub(1);
        self.ticks_left == 0
    }

    /// Fraction of the overlay's life elapsed, 0.0 at spawn to 1.0 at removal
    pub fn progress(&self) -> f32 {
        if self.ticks_total == 0 {
            return 1.0;
        }
        1.0 - self.ticks_left as f32 / self.ticks_total as f32
    }
}

/// Rainbow band colors, outermost first
pub const RAINBOW_COLORS: [&str; 7] = [
    "#e53935", "#fb8c00", "#fdd835", "#43a047", "#1e88e5", "#3949ab", "#8e24aa",
];

/// Spawn the overlay element for a celebration (WASM only). Returns None if
/// the overlay container is missing.
#[cfg(target_arch = "wasm32")]
pub fn spawn(document: &web_sys::Document, kind: CelebrationKind) -> Option<web_sys::Element> {
    let overlay = document.get_element_by_id("overlay")?;
    let el = match kind {
        CelebrationKind::Rainbow => spawn_rainbow(document)?,
        CelebrationKind::Bear => spawn_bear(document)?,
    };
    overlay.append_child(&el).ok()?;
    let _ = overlay.set_attribute("class", "showing");
    Some(el)
}

/// Remove a spawned overlay element and hide the container (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn remove(document: &web_sys::Document, el: &web_sys::Element) {
    el.remove();
    if let Some(overlay) = document.get_element_by_id("overlay") {
        let _ = overlay.set_attribute("class", "hidden");
    }
}

/// Seven concentric SVG arcs rising from the bottom of the board
#[cfg(target_arch = "wasm32")]
fn spawn_rainbow(document: &web_sys::Document) -> Option<web_sys::Element> {
    const SVG_NS: &str = "http://www.w3.org/2000/svg";

    let svg = document.create_element_ns(Some(SVG_NS), "svg").ok()?;
    svg.set_attribute("class", "rainbow").ok()?;
    svg.set_attribute("viewBox", "0 0 300 160").ok()?;

    for (i, color) in RAINBOW_COLORS.iter().enumerate() {
        let radius = 140.0 - i as f32 * 14.0;
        let path = document.create_element_ns(Some(SVG_NS), "path").ok()?;
        path.set_attribute(
            "d",
            &format!(
                "M {} 160 A {} {} 0 0 1 {} 160",
                150.0 - radius,
                radius,
                radius,
                150.0 + radius
            ),
        )
        .ok()?;
        path.set_attribute("fill", "none").ok()?;
        path.set_attribute("stroke", color).ok()?;
        path.set_attribute("stroke-width", "12").ok()?;
        svg.append_child(&path).ok()?;
    }
    Some(svg)
}

/// The dancing bear
#[cfg(target_arch = "wasm32")]
fn spawn_bear(document: &web_sys::Document) -> Option<web_sys::Element> {
    let el = document.create_element("div").ok()?;
    el.set_attribute("class", "bear").ok()?;
    el.set_text_content(Some("\u{1F43B}"));
    Some(el)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celebration_counts_down() {
        let mut c = Celebration::new(CelebrationKind::Rainbow, 3);
        assert_eq!(c.progress(), 0.0);
        assert!(!c.tick());
        assert!(!c.tick());
        assert!(c.tick());
        assert_eq!(c.progress(), 1.0);
        // Extra ticks stay done instead of wrapping
        assert!(c.tick());
    }

    #[test]
    fn test_rainbow_has_seven_bands() {
        assert_eq!(RAINBOW_COLORS.len(), 7);
    }
}
