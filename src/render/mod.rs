//! DOM/SVG rendering (wasm only)
//!
//! No framework: boards are built by creating elements, tagging them with
//! `data-*` attributes for input routing, and mutating attributes in place.

pub mod board;
pub mod hud;

use web_sys::{Document, Element};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// The page document, if we're actually in a browser
pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

/// Create an element with a class
pub fn make(doc: &Document, tag: &str, class: &str) -> Option<Element> {
    let el = doc.create_element(tag).ok()?;
    if !class.is_empty() {
        el.set_attribute("class", class).ok()?;
    }
    Some(el)
}

/// Create an SVG-namespaced element
pub fn make_svg(doc: &Document, tag: &str) -> Option<Element> {
    doc.create_element_ns(Some(SVG_NS), tag).ok()
}

/// Drop all children
pub fn clear(el: &Element) {
    el.set_inner_html("");
}

/// Swap an element's class by id
pub fn set_class(doc: &Document, id: &str, class: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        let _ = el.set_attribute("class", class);
    }
}

/// Set text content of the first match for a selector
pub fn set_text(doc: &Document, selector: &str, text: &str) {
    if let Some(el) = doc.query_selector(selector).ok().flatten() {
        el.set_text_content(Some(text));
    }
}

/// Absolute-position style string
pub fn pos_style(x: f32, y: f32) -> String {
    format!("left:{x:.0}px;top:{y:.0}px")
}
