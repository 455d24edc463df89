//! HUD: prompt line, round progress, feedback flash

use web_sys::Document;

use super::set_class;
use crate::consts::ROUNDS_PER_SESSION;

/// Set the big prompt line above the board
pub fn set_prompt(doc: &Document, text: &str) {
    if let Some(el) = doc.get_element_by_id("prompt") {
        el.set_text_content(Some(text));
    }
}

/// Smaller helper line under the prompt
pub fn set_subtext(doc: &Document, text: &str) {
    if let Some(el) = doc.get_element_by_id("subtext") {
        el.set_text_content(Some(text));
    }
}

/// Star row showing rounds completed this session
pub fn update_progress(doc: &Document, completed: u32) {
    if let Some(el) = doc.get_element_by_id("progress") {
        let mut stars = String::new();
        for i in 0..ROUNDS_PER_SESSION {
            stars.push(if i < completed { '\u{2B50}' } else { '\u{2606}' });
        }
        el.set_text_content(Some(&stars));
    }
}

/// Show or clear the answer feedback flash
pub fn set_flash(doc: &Document, state: Option<bool>) {
    match state {
        Some(true) => set_class(doc, "feedback", "flash good"),
        Some(false) => set_class(doc, "feedback", "flash bad"),
        None => set_class(doc, "feedback", "hidden"),
    }
}

/// Show or hide the whole HUD strip
pub fn set_visible(doc: &Document, visible: bool) {
    set_class(doc, "hud", if visible { "" } else { "hidden" });
}
