//! Per-game board construction and in-place updates
//!
//! Builders fill the `#board` container; input routing relies on the
//! `data-*` attributes set here (see the click handler in `main.rs`).

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use super::{clear, make, make_svg, pos_style};
use crate::games::balance::{BalancePuzzle, Pan};
use crate::games::cards::WarGame;
use crate::games::counting::CountingRound;
use crate::games::dice::DieOrientation;
use crate::games::drag::{Aabb, DropZone};
use crate::games::memory::{Face, MemoryBoard};
use crate::games::tracing::{TraceProgress, digit_strokes};
use crate::stats::{ScoreSummary, StatsBook};
use glam::Vec2;

/// The board container
pub fn board_el(doc: &Document) -> Option<Element> {
    doc.get_element_by_id("board")
}

/// Shared answer-button row
fn options_row(doc: &Document, board: &Element, options: &[u8]) -> Option<()> {
    let row = make(doc, "div", "options")?;
    for &value in options {
        let btn = make(doc, "button", "option-btn")?;
        btn.set_attribute("data-option", &value.to_string()).ok()?;
        btn.set_text_content(Some(&value.to_string()));
        row.append_child(&btn).ok()?;
    }
    board.append_child(&row).ok()?;
    Some(())
}

// === Menu ===

pub fn build_menu(doc: &Document, stats: &StatsBook, resume: Option<&str>) -> Option<()> {
    use crate::stats::GameId;

    let board = board_el(doc)?;
    clear(&board);

    let grid = make(doc, "div", "menu-grid")?;
    for game in GameId::ALL {
        let highlight = resume == Some(game.key());
        let card = make(
            doc,
            "button",
            if highlight {
                "menu-card resume"
            } else {
                "menu-card"
            },
        )?;
        card.set_attribute("data-game", game.key()).ok()?;

        let icon = make(doc, "div", "menu-icon")?;
        icon.set_text_content(Some(game.emoji()));
        card.append_child(&icon).ok()?;

        let title = make(doc, "div", "menu-title")?;
        title.set_text_content(Some(game.title()));
        card.append_child(&title).ok()?;

        let best = make(doc, "div", "menu-best")?;
        if let Some(record) = stats.best(game) {
            best.set_text_content(Some(&format!(
                "Best today: {}%",
                record.summary.overall()
            )));
        }
        card.append_child(&best).ok()?;

        grid.append_child(&card).ok()?;
    }
    board.append_child(&grid).ok()?;
    Some(())
}

// === Counting ===

pub fn build_counting(doc: &Document, round: &CountingRound) -> Option<()> {
    let board = board_el(doc)?;
    clear(&board);

    let layer = make(doc, "div", "sprites")?;
    for pos in &round.positions {
        let sprite = make(doc, "span", "critter")?;
        sprite.set_attribute("style", &pos_style(pos.x, pos.y)).ok()?;
        sprite.set_text_content(Some(round.critter.emoji()));
        layer.append_child(&sprite).ok()?;
    }
    board.append_child(&layer).ok()?;

    options_row(doc, &board, &round.options)
}

// === Addition ===

pub fn build_addition(doc: &Document, a: u8, b: u8, options: &[u8]) -> Option<()> {
    let board = board_el(doc)?;
    clear(&board);

    let equation = make(doc, "div", "equation")?;
    equation.set_text_content(Some(&format!("{a} + {b} = ?")));
    board.append_child(&equation).ok()?;

    options_row(doc, &board, options)
}

// === Balance ===

/// Scale geometry in board coordinates
pub const BALANCE_PIVOT: Vec2 = Vec2::new(320.0, 80.0);
pub const BALANCE_ARM: f32 = 180.0;
pub const PAN_DROP: f32 = 130.0;
/// Drop targets are deliberately generous for small hands
pub const PAN_ZONE_SIZE: Vec2 = Vec2::new(160.0, 180.0);
pub const TRAY_TOP: f32 = 360.0;
/// Weight block size
pub const WEIGHT_SIZE: Vec2 = Vec2::new(48.0, 40.0);

/// Drop zone ids used by the drag resolver
pub const ZONE_LEFT_PAN: u32 = 0;
pub const ZONE_RIGHT_PAN: u32 = 1;
pub const ZONE_TRAY: u32 = 2;

pub fn balance_zones() -> [DropZone; 3] {
    let left_center = Vec2::new(
        BALANCE_PIVOT.x - BALANCE_ARM,
        BALANCE_PIVOT.y + PAN_DROP,
    );
    let right_center = Vec2::new(
        BALANCE_PIVOT.x + BALANCE_ARM,
        BALANCE_PIVOT.y + PAN_DROP,
    );
    [
        DropZone {
            id: ZONE_LEFT_PAN,
            bounds: Aabb::centered(left_center, PAN_ZONE_SIZE),
        },
        DropZone {
            id: ZONE_RIGHT_PAN,
            bounds: Aabb::centered(right_center, PAN_ZONE_SIZE),
        },
        DropZone {
            id: ZONE_TRAY,
            bounds: Aabb::new(
                Vec2::new(0.0, TRAY_TOP),
                Vec2::new(640.0, 480.0),
            ),
        },
    ]
}

pub fn build_balance(doc: &Document, puzzle: &BalancePuzzle) -> Option<()> {
    let board = board_el(doc)?;
    clear(&board);

    let svg = make_svg(doc, "svg")?;
    svg.set_attribute("class", "scale").ok()?;
    svg.set_attribute("viewBox", "0 0 640 360").ok()?;

    // Post
    let post = make_svg(doc, "rect")?;
    post.set_attribute("x", "312").ok()?;
    post.set_attribute("y", "80").ok()?;
    post.set_attribute("width", "16").ok()?;
    post.set_attribute("height", "240").ok()?;
    post.set_attribute("class", "scale-post").ok()?;
    svg.append_child(&post).ok()?;

    // Beam, rotated around the pivot each frame
    let beam = make_svg(doc, "g")?;
    beam.set_attribute("id", "beam").ok()?;
    let bar = make_svg(doc, "rect")?;
    bar.set_attribute("x", &(BALANCE_PIVOT.x - BALANCE_ARM).to_string())
        .ok()?;
    bar.set_attribute("y", &(BALANCE_PIVOT.y - 6.0).to_string())
        .ok()?;
    bar.set_attribute("width", &(BALANCE_ARM * 2.0).to_string())
        .ok()?;
    bar.set_attribute("height", "12").ok()?;
    bar.set_attribute("rx", "6").ok()?;
    bar.set_attribute("class", "scale-beam").ok()?;
    beam.append_child(&bar).ok()?;
    svg.append_child(&beam).ok()?;

    // Pans ride up and down with the beam ends
    for (id, x) in [
        ("pan-left", BALANCE_PIVOT.x - BALANCE_ARM),
        ("pan-right", BALANCE_PIVOT.x + BALANCE_ARM),
    ] {
        let pan = make_svg(doc, "g")?;
        pan.set_attribute("id", id).ok()?;
        let dish = make_svg(doc, "path")?;
        dish.set_attribute(
            "d",
            &format!(
                "M {} {} A 60 60 0 0 0 {} {} Z",
                x - 60.0,
                BALANCE_PIVOT.y + PAN_DROP - 40.0,
                x + 60.0,
                BALANCE_PIVOT.y + PAN_DROP - 40.0
            ),
        )
        .ok()?;
        dish.set_attribute("class", "scale-pan").ok()?;
        pan.append_child(&dish).ok()?;

        let stack = make_svg(doc, "g")?;
        stack.set_attribute("id", &format!("{id}-stack")).ok()?;
        pan.append_child(&stack).ok()?;
        svg.append_child(&pan).ok()?;
    }

    board.append_child(&svg).ok()?;

    let tray = make(doc, "div", "tray")?;
    tray.set_attribute("id", "tray").ok()?;
    board.append_child(&tray).ok()?;

    let ghost = make(doc, "div", "weight ghost hidden")?;
    ghost.set_attribute("id", "drag-ghost").ok()?;
    board.append_child(&ghost).ok()?;

    let _ = refresh_balance(doc, puzzle);
    Some(())
}

/// Rebuild tray and pan stacks after any placement change
pub fn refresh_balance(doc: &Document, puzzle: &BalancePuzzle) -> Option<()> {
    let tray = doc.get_element_by_id("tray")?;
    clear(&tray);
    for (idx, &w) in puzzle.tray.iter().enumerate() {
        let block = make(doc, "div", "weight")?;
        block.set_attribute("data-tray-idx", &idx.to_string()).ok()?;
        block.set_text_content(Some(&w.to_string()));
        tray.append_child(&block).ok()?;
    }

    for (pan, stack_id) in [(Pan::Left, "pan-left-stack"), (Pan::Right, "pan-right-stack")] {
        let stack = doc.get_element_by_id(stack_id)?;
        clear(&stack);
        let weights = match pan {
            Pan::Left => &puzzle.left,
            Pan::Right => &puzzle.right,
        };
        let x = match pan {
            Pan::Left => BALANCE_PIVOT.x - BALANCE_ARM,
            Pan::Right => BALANCE_PIVOT.x + BALANCE_ARM,
        };
        for (idx, &w) in weights.iter().enumerate() {
            let rect = make_svg(doc, "rect")?;
            let rx = x - WEIGHT_SIZE.x / 2.0 + (idx % 2) as f32 * 8.0 - 4.0;
            let ry = BALANCE_PIVOT.y + PAN_DROP - 44.0 - (idx as f32 + 1.0) * WEIGHT_SIZE.y;
            rect.set_attribute("x", &rx.to_string()).ok()?;
            rect.set_attribute("y", &ry.to_string()).ok()?;
            rect.set_attribute("width", &WEIGHT_SIZE.x.to_string()).ok()?;
            rect.set_attribute("height", &WEIGHT_SIZE.y.to_string()).ok()?;
            rect.set_attribute("rx", "6").ok()?;
            rect.set_attribute("class", "scale-weight").ok()?;
            rect.set_attribute("data-pan", pan_key(pan)).ok()?;
            rect.set_attribute("data-idx", &idx.to_string()).ok()?;
            stack.append_child(&rect).ok()?;

            let label = make_svg(doc, "text")?;
            label.set_attribute("x", &(rx + WEIGHT_SIZE.x / 2.0).to_string()).ok()?;
            label.set_attribute("y", &(ry + WEIGHT_SIZE.y / 2.0 + 6.0).to_string()).ok()?;
            label.set_attribute("class", "scale-weight-label").ok()?;
            label.set_text_content(Some(&w.to_string()));
            stack.append_child(&label).ok()?;
        }
    }
    Some(())
}

pub fn pan_key(pan: Pan) -> &'static str {
    match pan {
        Pan::Left => "left",
        Pan::Right => "right",
    }
}

/// Apply the beam tilt and pan offsets for the current angle
pub fn update_balance_tilt(doc: &Document, angle: f32) {
    let degrees = angle.to_degrees();
    if let Some(beam) = doc.get_element_by_id("beam") {
        let _ = beam.set_attribute(
            "transform",
            &format!(
                "rotate({degrees:.2} {} {})",
                BALANCE_PIVOT.x, BALANCE_PIVOT.y
            ),
        );
    }
    let dy = BALANCE_ARM * angle.sin();
    for (id, offset) in [("pan-left", -dy), ("pan-right", dy)] {
        if let Some(pan) = doc.get_element_by_id(id) {
            let _ = pan.set_attribute("transform", &format!("translate(0 {offset:.2})"));
        }
    }
}

/// Show/move/hide the drag ghost following the pointer
pub fn update_drag_ghost(doc: &Document, ghost: Option<(Vec2, u8)>) {
    let Some(el) = doc.get_element_by_id("drag-ghost") else {
        return;
    };
    match ghost {
        Some((center, value)) => {
            let _ = el.set_attribute("class", "weight ghost");
            let _ = el.set_attribute(
                "style",
                &pos_style(
                    center.x - WEIGHT_SIZE.x / 2.0,
                    center.y - WEIGHT_SIZE.y / 2.0,
                ),
            );
            el.set_text_content(Some(&value.to_string()));
        }
        None => {
            let _ = el.set_attribute("class", "weight ghost hidden");
        }
    }
}

// === Tracing ===

/// Where the 100x140 digit template sits on the board
pub const TRACE_OFFSET: Vec2 = Vec2::new(220.0, 40.0);
pub const TRACE_SCALE: f32 = 2.0;

/// Board coordinates -> template coordinates
pub fn board_to_template(p: Vec2) -> Vec2 {
    (p - TRACE_OFFSET) / TRACE_SCALE
}

pub fn build_tracing(doc: &Document, trace: &TraceProgress) -> Option<()> {
    let board = board_el(doc)?;
    clear(&board);

    let svg = make_svg(doc, "svg")?;
    svg.set_attribute("class", "trace").ok()?;
    svg.set_attribute("viewBox", "0 0 100 140").ok()?;
    svg.set_attribute(
        "style",
        &format!(
            "left:{}px;top:{}px;width:{}px;height:{}px",
            TRACE_OFFSET.x,
            TRACE_OFFSET.y,
            100.0 * TRACE_SCALE,
            140.0 * TRACE_SCALE
        ),
    )
    .ok()?;

    for stroke in digit_strokes(trace.digit) {
        let guide = make_svg(doc, "polyline")?;
        let points: Vec<String> = stroke.iter().map(|(x, y)| format!("{x},{y}")).collect();
        guide.set_attribute("points", &points.join(" ")).ok()?;
        guide.set_attribute("class", "trace-guide").ok()?;
        svg.append_child(&guide).ok()?;

        for &(x, y) in *stroke {
            let wp = make_svg(doc, "circle")?;
            wp.set_attribute("cx", &x.to_string()).ok()?;
            wp.set_attribute("cy", &y.to_string()).ok()?;
            wp.set_attribute("r", "4").ok()?;
            wp.set_attribute("class", "trace-wp").ok()?;
            svg.append_child(&wp).ok()?;
        }
    }

    // The dot marking where to touch next
    let dot = make_svg(doc, "circle")?;
    dot.set_attribute("id", "trace-dot").ok()?;
    dot.set_attribute("r", "7").ok()?;
    dot.set_attribute("class", "trace-dot").ok()?;
    svg.append_child(&dot).ok()?;

    board.append_child(&svg).ok()?;
    update_tracing(doc, trace);
    Some(())
}

/// Move the target dot and tint completed waypoints
pub fn update_tracing(doc: &Document, trace: &TraceProgress) {
    let Some(doc_dot) = doc.get_element_by_id("trace-dot") else {
        return;
    };
    match trace.next_waypoint() {
        Some(wp) => {
            let _ = doc_dot.set_attribute("cx", &wp.x.to_string());
            let _ = doc_dot.set_attribute("cy", &wp.y.to_string());
            let _ = doc_dot.set_attribute("class", "trace-dot");
        }
        None => {
            let _ = doc_dot.set_attribute("class", "trace-dot hidden");
        }
    }

    // Tint waypoints already hit
    if let Ok(list) = doc.query_selector_all("circle[class^=\"trace-wp\"]") {
        let strokes = digit_strokes(trace.digit);
        let mut flat_idx = 0usize;
        for (si, stroke) in strokes.iter().enumerate() {
            for wi in 0..stroke.len() {
                let done = si < trace.current_stroke()
                    || (si == trace.current_stroke() && wi < trace.waypoint_index());
                if let Some(node) = list.item(flat_idx as u32) {
                    if let Ok(el) = node.dyn_into::<Element>() {
                        let _ = el.set_attribute(
                            "class",
                            if done { "trace-wp done" } else { "trace-wp" },
                        );
                    }
                }
                flat_idx += 1;
            }
        }
    }
}

// === Memory ===

pub fn build_memory(doc: &Document, memory: &MemoryBoard) -> Option<()> {
    let board = board_el(doc)?;
    clear(&board);

    let grid = make(doc, "div", "card-grid")?;
    for card in &memory.cards {
        let el = make(doc, "button", "card down")?;
        el.set_attribute("data-card", &card.id.to_string()).ok()?;
        el.set_text_content(Some("?"));
        grid.append_child(&el).ok()?;
    }
    board.append_child(&grid).ok()?;
    Some(())
}

/// Sync card faces to the board state
pub fn update_memory(doc: &Document, memory: &MemoryBoard) {
    for card in &memory.cards {
        let selector = format!("[data-card=\"{}\"]", card.id);
        if let Some(el) = doc.query_selector(&selector).ok().flatten() {
            let (class, text) = match card.face {
                Face::Down => ("card down", "?".to_string()),
                Face::Up => ("card up", card.value.to_string()),
                Face::Matched => ("card matched", card.value.to_string()),
            };
            let _ = el.set_attribute("class", class);
            el.set_text_content(Some(&text));
        }
    }
}

// === War ===

pub fn build_war(doc: &Document) -> Option<()> {
    let board = board_el(doc)?;
    clear(&board);

    let table = make(doc, "div", "war-table")?;

    for (id, call) in [("war-left", "left"), ("war-right", "right")] {
        let slot = make(doc, "button", "war-card")?;
        slot.set_attribute("id", id).ok()?;
        slot.set_attribute("data-call", call).ok()?;
        table.append_child(&slot).ok()?;
    }

    let tie = make(doc, "button", "war-tie")?;
    tie.set_attribute("data-call", "tie").ok()?;
    tie.set_text_content(Some("Same!"));
    table.append_child(&tie).ok()?;

    board.append_child(&table).ok()?;

    let piles = make(doc, "div", "war-piles")?;
    piles.set_attribute("id", "war-piles").ok()?;
    board.append_child(&piles).ok()?;
    Some(())
}

pub fn update_war(doc: &Document, game: &WarGame) {
    let (left, right) = match game.current {
        Some(round) => (round.left.to_string(), round.right.to_string()),
        None => ("\u{1F0A0}".to_string(), "\u{1F0A0}".to_string()),
    };
    super::set_text(doc, "#war-left", &left);
    super::set_text(doc, "#war-right", &right);
    super::set_text(
        doc,
        "#war-piles",
        &format!(
            "\u{1F43B} {} \u{2014} {} \u{1F9D2}",
            game.captured_left, game.captured_right
        ),
    );
}

// === Dice ===

pub fn build_dice(doc: &Document, count: usize, options: &[u8]) -> Option<()> {
    let board = board_el(doc)?;
    clear(&board);

    let row = make(doc, "div", "dice-row")?;
    for i in 0..count {
        let die = make(doc, "span", "die")?;
        die.set_attribute("data-die", &i.to_string()).ok()?;
        row.append_child(&die).ok()?;
    }
    board.append_child(&row).ok()?;

    options_row(doc, &board, options)
}

/// Unicode die face for the current top
pub fn die_glyph(orientation: &DieOrientation) -> char {
    // U+2680 is die face 1
    char::from_u32(0x2680 - 1 + orientation.top_face() as u32).unwrap_or('\u{2680}')
}

pub fn update_die(doc: &Document, idx: usize, orientation: &DieOrientation, tumbling: bool) {
    let selector = format!("[data-die=\"{idx}\"]");
    if let Some(el) = doc.query_selector(&selector).ok().flatten() {
        el.set_text_content(Some(&die_glyph(orientation).to_string()));
        let _ = el.set_attribute("class", if tumbling { "die tumbling" } else { "die" });
    }
}

// === Report ===

pub fn build_report(doc: &Document, summary: &ScoreSummary, new_best: bool) -> Option<()> {
    let board = board_el(doc)?;
    clear(&board);

    let panel = make(doc, "div", "report")?;

    let title = make(doc, "div", "report-title")?;
    title.set_text_content(Some(if new_best {
        "All done - new best today!"
    } else {
        "All done!"
    }));
    panel.append_child(&title).ok()?;

    for (label, value) in [
        ("Accuracy", summary.accuracy),
        ("Resilience", summary.resilience),
        ("Speed", summary.speed),
        ("Variety", summary.variety),
    ] {
        let row = make(doc, "div", "stat-row")?;
        let name = make(doc, "span", "stat-name")?;
        name.set_text_content(Some(label));
        row.append_child(&name).ok()?;

        let bar = make(doc, "div", "stat-bar")?;
        let fill = make(doc, "div", "stat-fill")?;
        fill.set_attribute("style", &format!("width:{value}%")).ok()?;
        bar.append_child(&fill).ok()?;
        row.append_child(&bar).ok()?;

        let pct = make(doc, "span", "stat-pct")?;
        pct.set_text_content(Some(&format!("{value}%")));
        row.append_child(&pct).ok()?;

        panel.append_child(&row).ok()?;
    }

    let overall = make(doc, "div", "report-overall")?;
    overall.set_text_content(Some(&format!("Overall: {}%", summary.overall())));
    panel.append_child(&overall).ok()?;

    let buttons = make(doc, "div", "report-buttons")?;
    for (action, label) in [("again", "Play again"), ("menu", "All games")] {
        let btn = make(doc, "button", "report-btn")?;
        btn.set_attribute("data-action", action).ok()?;
        btn.set_text_content(Some(label));
        buttons.append_child(&btn).ok()?;
    }
    panel.append_child(&buttons).ok()?;

    board.append_child(&panel).ok()?;
    Some(())
}
