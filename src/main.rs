//! Mathlings entry point
//!
//! Wires the game logic to the browser: menu, boards, input listeners, and
//! the fixed-timestep loop. The native binary is a logging stub that plays
//! one scripted session for a smoke check.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, KeyboardEvent, MouseEvent, TouchEvent};

    use mathlings::Settings;
    use mathlings::celebrate::{self, Celebration, CelebrationKind};
    use mathlings::consts::*;
    use mathlings::games::SessionScore;
    use mathlings::games::addition::AdditionRound;
    use mathlings::games::balance::{BalancePuzzle, Pan};
    use mathlings::games::cards::{WarCall, WarGame};
    use mathlings::games::counting::CountingRound;
    use mathlings::games::dice::{DieOrientation, PipRound};
    use mathlings::games::drag::{DragSession, resolve_drop};
    use mathlings::games::memory::{FlipOutcome, MemoryBoard};
    use mathlings::games::quiz::{Quiz, RoundPhase, TickEvent};
    use mathlings::games::tracing::TraceProgress;
    use mathlings::narrate::{Chime, Line, Narrator};
    use mathlings::render::{self, board, hud};
    use mathlings::stats::{GameId, ScoreSummary, StatsBook};
    use mathlings::{ease_out, lerp};

    /// Ticks between quarter-turns while dice tumble
    const TUMBLE_STEP_TICKS: u32 = 8;

    /// SessionStorage key remembering the last game played
    const LAST_GAME_KEY: &str = "mathlings_last_game";

    /// Where a dragged balance weight came from
    #[derive(Debug, Clone, Copy)]
    enum DragSource {
        Tray(usize),
        Pan(Pan, usize),
    }

    struct CountingGame {
        quiz: Quiz,
        round: CountingRound,
    }

    struct AdditionGame {
        quiz: Quiz,
        round: AdditionRound,
    }

    struct DiceGame {
        quiz: Quiz,
        round: PipRound,
        /// Orientation shown per die while the tumble replays
        shown: Vec<DieOrientation>,
        /// Next plan step per die
        steps: Vec<usize>,
        tumble_ticks: u32,
        tumbling: bool,
    }

    struct CardsGame {
        quiz: Quiz,
        game: WarGame,
    }

    struct BalanceGame {
        quiz: Quiz,
        puzzle: BalancePuzzle,
        drag: Option<(DragSession, DragSource, u8)>,
        was_stuck: bool,
    }

    struct TracingGame {
        quiz: Quiz,
        trace: TraceProgress,
    }

    struct MemoryGame {
        score: SessionScore,
        memory: MemoryBoard,
        /// Mismatched pair waiting to flip back (a, b, ticks)
        pending: Option<(u32, u32, u32)>,
        round_ticks: u32,
        misses_since_match: u32,
    }

    enum Controller {
        Counting(CountingGame),
        Addition(AdditionGame),
        Balance(BalanceGame),
        Tracing(TracingGame),
        Memory(MemoryGame),
        Cards(CardsGame),
        Dice(DiceGame),
    }

    enum Screen {
        Menu,
        Playing(GameId),
        Report,
    }

    /// Application state behind the Rc<RefCell>
    struct App {
        settings: Settings,
        stats: StatsBook,
        narrator: Narrator,
        rng: Pcg32,
        screen: Screen,
        controller: Option<Controller>,
        celebration: Option<Celebration>,
        celebration_el: Option<Element>,
        /// Feedback flash countdown for the non-quiz boards
        flash_ticks: u32,
        /// Held tens digit while typing a two-digit answer
        typed_digit: Option<u8>,
        accumulator: f32,
        last_time: f64,
        paused: bool,
    }

    impl App {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let narrator = Narrator::new(&settings);
            Self {
                settings,
                stats: StatsBook::load(),
                narrator,
                rng: Pcg32::seed_from_u64(seed),
                screen: Screen::Menu,
                controller: None,
                celebration: None,
                celebration_el: None,
                flash_ticks: 0,
                typed_digit: None,
                accumulator: 0.0,
                last_time: 0.0,
                paused: false,
            }
        }

        // === Screen transitions ===

        fn show_menu(&mut self) {
            let Some(doc) = render::document() else {
                return;
            };
            self.controller = None;
            self.screen = Screen::Menu;
            self.clear_celebration(&doc);
            hud::set_visible(&doc, false);
            hud::set_flash(&doc, None);
            hud::set_prompt(&doc, "Mathlings");
            hud::set_subtext(&doc, "Pick a game!");
            let _ = board::build_menu(&doc, &self.stats, last_game().as_deref());
        }

        fn start_game(&mut self, game: GameId) {
            let Some(doc) = render::document() else {
                return;
            };
            self.screen = Screen::Playing(game);
            self.clear_celebration(&doc);
            remember_last_game(game.key());
            hud::set_visible(&doc, true);
            hud::update_progress(&doc, 0);
            self.narrator.say(&Line::GamePrompt(game));

            self.controller = Some(match game {
                GameId::Counting => Controller::Counting(CountingGame {
                    quiz: Quiz::new(),
                    round: CountingRound::generate(&mut self.rng, None),
                }),
                GameId::Addition => Controller::Addition(AdditionGame {
                    quiz: Quiz::new(),
                    round: AdditionRound::generate(&mut self.rng, None),
                }),
                GameId::Balance => Controller::Balance(BalanceGame {
                    quiz: Quiz::new(),
                    puzzle: BalancePuzzle::generate(&mut self.rng),
                    drag: None,
                    was_stuck: false,
                }),
                GameId::Tracing => {
                    let digit = self.rng.random_range(0..=9u8);
                    Controller::Tracing(TracingGame {
                        quiz: Quiz::new(),
                        trace: TraceProgress::new(digit),
                    })
                }
                GameId::Memory => Controller::Memory(MemoryGame {
                    score: SessionScore::new(),
                    memory: MemoryBoard::generate(&mut self.rng, PAIR_COUNT),
                    pending: None,
                    round_ticks: 0,
                    misses_since_match: 0,
                }),
                GameId::Cards => Controller::Cards(CardsGame {
                    quiz: Quiz::new(),
                    game: WarGame::generate(&mut self.rng),
                }),
                GameId::Dice => Controller::Dice(self.make_dice_game()),
            });

            self.present_round();
        }

        fn make_dice_game(&mut self) -> DiceGame {
            let round = PipRound::generate(&mut self.rng, 1);
            let count = round.dice.len();
            DiceGame {
                quiz: Quiz::new(),
                round,
                shown: vec![DieOrientation::IDENTITY; count],
                steps: vec![0; count],
                tumble_ticks: 0,
                tumbling: true,
            }
        }

        /// Build the board and narration for the controller's current round
        fn present_round(&mut self) {
            let Some(doc) = render::document() else {
                return;
            };
            hud::set_flash(&doc, None);
            self.typed_digit = None;

            match &mut self.controller {
                Some(Controller::Counting(g)) => {
                    g.quiz.begin_round(&g.round.variant_key());
                    let _ = board::build_counting(&doc, &g.round);
                    hud::set_prompt(&doc, "How many do you see?");
                    hud::set_subtext(&doc, "Tap the right number");
                    self.narrator.say(&Line::HowMany(g.round.critter.plural()));
                    g.quiz.prompt_shown();
                }
                Some(Controller::Addition(g)) => {
                    g.quiz.begin_round(&g.round.variant_key());
                    let _ = board::build_addition(&doc, g.round.a, g.round.b, &g.round.options);
                    hud::set_prompt(&doc, "Add them up!");
                    hud::set_subtext(&doc, "Tap the right number");
                    self.narrator
                        .say(&Line::AdditionQuestion(g.round.a, g.round.b));
                    g.quiz.prompt_shown();
                }
                Some(Controller::Balance(g)) => {
                    g.quiz.begin_round(&g.puzzle.variant_key());
                    let _ = board::build_balance(&doc, &g.puzzle);
                    hud::set_prompt(&doc, "Balance the scale!");
                    hud::set_subtext(&doc, "Drag weights onto the empty pan");
                    self.narrator.say(&Line::BalanceIntro(g.puzzle.target));
                    g.quiz.prompt_shown();
                }
                Some(Controller::Tracing(g)) => {
                    g.quiz.begin_round(&format!("digit-{}", g.trace.digit));
                    let _ = board::build_tracing(&doc, &g.trace);
                    hud::set_prompt(&doc, &format!("Trace the {}", g.trace.digit));
                    hud::set_subtext(&doc, "Follow the dots in order");
                    self.narrator.say(&Line::TraceDigit(g.trace.digit));
                    g.quiz.prompt_shown();
                }
                Some(Controller::Memory(g)) => {
                    let _ = board::build_memory(&doc, &g.memory);
                    hud::set_prompt(&doc, "Find the matching pairs!");
                    hud::set_subtext(&doc, "Flip two cards at a time");
                }
                Some(Controller::Cards(g)) => {
                    if g.game.current.is_none() {
                        let _ = g.game.deal();
                    }
                    if let Some(round) = g.game.current {
                        g.quiz.begin_round(&round.variant_key());
                    }
                    let _ = board::build_war(&doc);
                    board::update_war(&doc, &g.game);
                    hud::set_prompt(&doc, "Which card wins?");
                    hud::set_subtext(&doc, "Tap the bigger card, or Same!");
                    self.narrator.say(&Line::WhichSideWins);
                    g.quiz.prompt_shown();
                }
                Some(Controller::Dice(g)) => {
                    g.quiz.begin_round(&g.round.variant_key());
                    let _ = board::build_dice(&doc, g.round.dice.len(), &g.round.options);
                    for (i, shown) in g.shown.iter().enumerate() {
                        board::update_die(&doc, i, shown, true);
                    }
                    hud::set_prompt(&doc, "Count the pips!");
                    hud::set_subtext(&doc, "Wait for the dice to stop");
                    self.narrator.say(&Line::PipQuestion);
                    // prompt_shown happens when the tumble ends
                }
                None => {}
            }
        }

        // === Input ===

        /// Route a click through the data attributes set by the builders
        fn handle_click(&mut self, target: Element) {
            if let Some(game_key) = closest_attr(&target, "data-game") {
                if let Some(game) = GameId::from_key(&game_key) {
                    self.start_game(game);
                }
                return;
            }
            if let Some(action) = closest_attr(&target, "data-action") {
                match action.as_str() {
                    "again" => {
                        if let Some(game) = self.report_game() {
                            self.start_game(game);
                        }
                    }
                    _ => self.show_menu(),
                }
                return;
            }
            if closest_attr(&target, "data-nav").as_deref() == Some("home") {
                self.narrator.hush();
                self.show_menu();
                return;
            }
            if closest_attr(&target, "data-nav").as_deref() == Some("mute") {
                self.toggle_narration();
                return;
            }
            if let Some(option) = closest_attr(&target, "data-option") {
                if let Ok(n) = option.parse::<u8>() {
                    self.answer_option(n);
                }
                return;
            }
            if let Some(card) = closest_attr(&target, "data-card") {
                if let Ok(id) = card.parse::<u32>() {
                    self.flip_card(id);
                }
                return;
            }
            if let Some(call) = closest_attr(&target, "data-call") {
                let call = match call.as_str() {
                    "left" => WarCall::Left,
                    "right" => WarCall::Right,
                    _ => WarCall::Tie,
                };
                self.make_war_call(call);
            }
        }

        /// An option button for the quiz games
        fn answer_option(&mut self, n: u8) {
            let (accepted, correct, round_index, misses) = match &mut self.controller {
                Some(Controller::Counting(g)) => {
                    let correct = g.round.answer(n);
                    (g.quiz.answer(correct), correct, g.quiz.round_index, g.quiz.misses())
                }
                Some(Controller::Addition(g)) => {
                    let correct = g.round.answer(n);
                    (g.quiz.answer(correct), correct, g.quiz.round_index, g.quiz.misses())
                }
                Some(Controller::Dice(g)) => {
                    let correct = g.round.answer(n);
                    (g.quiz.answer(correct), correct, g.quiz.round_index, g.quiz.misses())
                }
                _ => return,
            };
            if accepted {
                self.show_answer_feedback(correct, round_index, misses);
            }
        }

        /// Answer buttons on the current board, for keyboard input
        fn current_options(&self) -> Option<Vec<u8>> {
            match self.controller.as_ref()? {
                Controller::Counting(g) => Some(g.round.options.to_vec()),
                Controller::Addition(g) => Some(g.round.options.to_vec()),
                Controller::Dice(g) => Some(g.round.options.to_vec()),
                _ => None,
            }
        }

        /// A digit key pressed. Two keystrokes build a two-digit answer
        /// (1 then 4 for 14); a digit that can't start any option on the
        /// board answers on its own.
        fn key_digit(&mut self, digit: u8) {
            let Some(options) = self.current_options() else {
                self.typed_digit = None;
                return;
            };
            if let Some(tens) = self.typed_digit.take() {
                let combined = tens * 10 + digit;
                if options.contains(&combined) {
                    self.answer_option(combined);
                    return;
                }
            }
            if options.iter().any(|&o| o >= 10 && o / 10 == digit) {
                self.typed_digit = Some(digit);
            } else {
                self.answer_option(digit);
            }
        }

        fn flip_card(&mut self, id: u32) {
            let Some(Controller::Memory(g)) = &mut self.controller else {
                return;
            };
            if g.pending.is_some() {
                return;
            }
            let outcome = g.memory.flip(id);
            let Some(doc) = render::document() else {
                return;
            };
            board::update_memory(&doc, &g.memory);

            match outcome {
                FlipOutcome::FirstUp => self.narrator.play(Chime::Pop),
                FlipOutcome::Matched(a, _) => {
                    let value = g
                        .memory
                        .cards
                        .iter()
                        .find(|c| c.id == a)
                        .map(|c| c.value)
                        .unwrap_or(0);
                    g.score.record_variant(&format!("pair-{value}"));
                    g.score
                        .complete_round(g.round_ticks, g.misses_since_match);
                    g.round_ticks = 0;
                    g.misses_since_match = 0;

                    let pairs = g.memory.matched_pairs() as u32;
                    hud::update_progress(&doc, pairs);
                    hud::set_flash(&doc, Some(true));
                    self.flash_ticks = FEEDBACK_TICKS;
                    self.narrator.play(Chime::Correct);
                    self.narrator.say(&Line::Correct(pairs));

                    if g.memory.solved() {
                        let summary = g.score.summary();
                        self.finish_session(summary);
                    }
                }
                FlipOutcome::Mismatched(a, b) => {
                    g.misses_since_match += 1;
                    g.pending = Some((a, b, MISMATCH_TICKS));
                    hud::set_flash(&doc, Some(false));
                    self.flash_ticks = RETRY_FEEDBACK_TICKS;
                    self.narrator.play(Chime::TryAgain);
                }
                FlipOutcome::Ignored => {}
            }
        }

        fn make_war_call(&mut self, call: WarCall) {
            let Some(Controller::Cards(g)) = &mut self.controller else {
                return;
            };
            if g.quiz.phase != RoundPhase::Await {
                return;
            }
            let Some(correct) = g.game.call(call) else {
                return;
            };
            let accepted = g.quiz.answer(correct);
            let (round_index, misses) = (g.quiz.round_index, g.quiz.misses());
            if let Some(doc) = render::document() {
                board::update_war(&doc, &g.game);
            }
            if accepted {
                self.show_answer_feedback(correct, round_index, misses);
            }
        }

        fn show_answer_feedback(&mut self, correct: bool, round_index: u32, misses: u32) {
            let Some(doc) = render::document() else {
                return;
            };
            hud::set_flash(&doc, Some(correct));
            if correct {
                self.narrator.play(Chime::Correct);
                self.narrator.say(&Line::Correct(round_index));
            } else {
                self.narrator.play(Chime::TryAgain);
                self.narrator.say(&Line::TryAgain(misses.saturating_sub(1)));
            }
        }

        // === Pointer (drag + trace) ===

        fn pointer_down(&mut self, pos: Vec2, target: Option<Element>) {
            match &mut self.controller {
                Some(Controller::Balance(g)) => {
                    if g.quiz.phase != RoundPhase::Await {
                        return;
                    }
                    let Some(target) = target else { return };
                    if let Some(idx) = closest_attr(&target, "data-tray-idx") {
                        if let Ok(idx) = idx.parse::<usize>() {
                            if let Some(&value) = g.puzzle.tray.get(idx) {
                                let drag = DragSession::begin(
                                    idx as u32,
                                    pos,
                                    pos,
                                    board::WEIGHT_SIZE,
                                );
                                g.drag = Some((drag, DragSource::Tray(idx), value));
                                self.narrator.play(Chime::Pop);
                            }
                        }
                    } else if let (Some(pan), Some(idx)) = (
                        closest_attr(&target, "data-pan"),
                        closest_attr(&target, "data-idx"),
                    ) {
                        let pan = if pan == "left" { Pan::Left } else { Pan::Right };
                        if let Ok(idx) = idx.parse::<usize>() {
                            // The fixed load stays put
                            if pan == Pan::Left && idx == 0 {
                                return;
                            }
                            let weights = match pan {
                                Pan::Left => &g.puzzle.left,
                                Pan::Right => &g.puzzle.right,
                            };
                            if let Some(&value) = weights.get(idx) {
                                let drag = DragSession::begin(
                                    idx as u32,
                                    pos,
                                    pos,
                                    board::WEIGHT_SIZE,
                                );
                                g.drag = Some((drag, DragSource::Pan(pan, idx), value));
                                self.narrator.play(Chime::Pop);
                            }
                        }
                    }
                }
                Some(Controller::Tracing(g)) => {
                    if g.quiz.phase != RoundPhase::Await {
                        return;
                    }
                    g.trace.pen_down(board::board_to_template(pos));
                    self.after_trace_input();
                }
                _ => {}
            }
        }

        fn pointer_move(&mut self, pos: Vec2) {
            match &mut self.controller {
                Some(Controller::Balance(g)) => {
                    if let Some((drag, _, _)) = &mut g.drag {
                        drag.move_to(pos);
                    }
                }
                Some(Controller::Tracing(g)) => {
                    if g.quiz.phase != RoundPhase::Await {
                        return;
                    }
                    if g.trace.pen_move(board::board_to_template(pos)) > 0 {
                        self.after_trace_input();
                    }
                }
                _ => {}
            }
        }

        fn pointer_up(&mut self, pos: Vec2) {
            match &mut self.controller {
                Some(Controller::Balance(g)) => {
                    let Some((mut drag, source, _)) = g.drag.take() else {
                        return;
                    };
                    drag.move_to(pos);
                    let zone = resolve_drop(&board::balance_zones(), drag.bounds());
                    let moved = match (source, zone) {
                        (DragSource::Tray(idx), Some(board::ZONE_LEFT_PAN)) => {
                            g.puzzle.place(idx, Pan::Left).is_some()
                        }
                        (DragSource::Tray(idx), Some(board::ZONE_RIGHT_PAN)) => {
                            g.puzzle.place(idx, Pan::Right).is_some()
                        }
                        (DragSource::Pan(pan, idx), Some(board::ZONE_TRAY)) => {
                            g.puzzle.take_back(pan, idx).is_some()
                        }
                        _ => false,
                    };
                    let Some(doc) = render::document() else {
                        return;
                    };
                    board::update_drag_ghost(&doc, None);
                    if moved {
                        let _ = board::refresh_balance(&doc, &g.puzzle);
                        self.narrator.play(Chime::Pop);
                    }
                }
                Some(Controller::Tracing(g)) => {
                    g.trace.pen_up();
                }
                _ => {}
            }
        }

        /// Shared post-input work for the tracing board
        fn after_trace_input(&mut self) {
            let Some(Controller::Tracing(g)) = &mut self.controller else {
                return;
            };
            let Some(doc) = render::document() else {
                return;
            };
            board::update_tracing(&doc, &g.trace);
            if g.trace.finished() && g.quiz.answer(true) {
                let (round_index, misses) = (g.quiz.round_index, g.quiz.misses());
                self.show_answer_feedback(true, round_index, misses);
            }
        }

        // === Fixed-timestep update ===

        fn update(&mut self, dt: f32) {
            if self.paused {
                return;
            }
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= TICK_DT && substeps < MAX_SUBSTEPS {
                self.tick();
                self.accumulator -= TICK_DT;
                substeps += 1;
            }
        }

        fn tick(&mut self) {
            // Celebration overlays
            if let Some(celebration) = &mut self.celebration {
                if celebration.tick() {
                    if let Some(doc) = render::document() {
                        self.clear_celebration(&doc);
                    }
                }
            }

            // Non-quiz feedback flash
            if self.flash_ticks > 0 {
                self.flash_ticks -= 1;
                if self.flash_ticks == 0 {
                    if let Some(doc) = render::document() {
                        hud::set_flash(&doc, None);
                    }
                }
            }

            let mut advance = false;
            let mut retry = false;
            let mut finish: Option<ScoreSummary> = None;
            let mut milestone = false;

            match &mut self.controller {
                Some(Controller::Counting(g)) => match g.quiz.tick() {
                    TickEvent::AdvanceRound => {
                        advance = true;
                        milestone = g.quiz.round_index == 3;
                        g.round =
                            CountingRound::generate(&mut self.rng, Some(g.round.target));
                    }
                    TickEvent::RetryRound => retry = true,
                    TickEvent::SessionDone => finish = Some(g.quiz.summary()),
                    TickEvent::None => {}
                },
                Some(Controller::Addition(g)) => match g.quiz.tick() {
                    TickEvent::AdvanceRound => {
                        advance = true;
                        milestone = g.quiz.round_index == 3;
                        g.round = AdditionRound::generate(
                            &mut self.rng,
                            Some((g.round.a, g.round.b)),
                        );
                    }
                    TickEvent::RetryRound => retry = true,
                    TickEvent::SessionDone => finish = Some(g.quiz.summary()),
                    TickEvent::None => {}
                },
                Some(Controller::Balance(g)) => {
                    g.puzzle.step(TICK_DT);

                    if g.quiz.phase == RoundPhase::Await {
                        if g.puzzle.solved() {
                            if g.quiz.answer(true) {
                                self.narrator.play(Chime::Correct);
                                self.narrator.say(&Line::LevelBeam);
                                if let Some(doc) = render::document() {
                                    hud::set_flash(&doc, Some(true));
                                }
                            }
                        } else {
                            let stuck = g.puzzle.stuck();
                            if stuck && !g.was_stuck && g.quiz.answer(false) {
                                self.narrator.play(Chime::TryAgain);
                                self.narrator
                                    .say(&Line::TryAgain(g.quiz.misses().saturating_sub(1)));
                                if let Some(doc) = render::document() {
                                    hud::set_flash(&doc, Some(false));
                                    hud::set_subtext(
                                        &doc,
                                        "Drag a weight back and try another",
                                    );
                                }
                            }
                            g.was_stuck = stuck;
                        }
                    }

                    match g.quiz.tick() {
                        TickEvent::AdvanceRound => {
                            advance = true;
                            milestone = g.quiz.round_index == 3;
                            g.puzzle = BalancePuzzle::generate(&mut self.rng);
                            g.drag = None;
                            g.was_stuck = false;
                        }
                        TickEvent::RetryRound => retry = true,
                        TickEvent::SessionDone => finish = Some(g.quiz.summary()),
                        TickEvent::None => {}
                    }
                }
                Some(Controller::Tracing(g)) => match g.quiz.tick() {
                    TickEvent::AdvanceRound => {
                        advance = true;
                        milestone = g.quiz.round_index == 3;
                        let prev = g.trace.digit;
                        let digit = loop {
                            let d = self.rng.random_range(0..=9u8);
                            if d != prev {
                                break d;
                            }
                        };
                        g.trace = TraceProgress::new(digit);
                    }
                    TickEvent::RetryRound => retry = true,
                    TickEvent::SessionDone => finish = Some(g.quiz.summary()),
                    TickEvent::None => {}
                },
                Some(Controller::Memory(g)) => {
                    if !g.memory.solved() {
                        g.round_ticks += 1;
                    }
                    if let Some((a, b, ticks)) = &mut g.pending {
                        *ticks -= 1;
                        if *ticks == 0 {
                            g.memory.settle_mismatch(*a, *b);
                            g.pending = None;
                            if let Some(doc) = render::document() {
                                board::update_memory(&doc, &g.memory);
                            }
                        }
                    }
                }
                Some(Controller::Cards(g)) => match g.quiz.tick() {
                    TickEvent::AdvanceRound => {
                        advance = true;
                        milestone = g.quiz.round_index == 3;
                        let _ = g.game.deal();
                    }
                    TickEvent::RetryRound => retry = true,
                    TickEvent::SessionDone => {
                        self.narrator.say(&Line::WarWinner(g.game.leader()));
                        finish = Some(g.quiz.summary());
                    }
                    TickEvent::None => {}
                },
                Some(Controller::Dice(g)) => {
                    if g.tumbling {
                        g.tumble_ticks += 1;
                        if g.tumble_ticks >= TUMBLE_STEP_TICKS {
                            g.tumble_ticks = 0;
                            let mut still_tumbling = false;
                            let doc = render::document();
                            for i in 0..g.round.dice.len() {
                                if let Some(&roll) = g.round.dice[i].plan.get(g.steps[i]) {
                                    g.shown[i] = g.shown[i].rolled(roll);
                                    g.steps[i] += 1;
                                    still_tumbling |= g.steps[i] < g.round.dice[i].plan.len();
                                    if let Some(doc) = &doc {
                                        board::update_die(
                                            doc,
                                            i,
                                            &g.shown[i],
                                            g.steps[i] < g.round.dice[i].plan.len(),
                                        );
                                    }
                                }
                            }
                            if !still_tumbling {
                                g.tumbling = false;
                                g.quiz.prompt_shown();
                                if let Some(doc) = &doc {
                                    hud::set_subtext(&doc, "Tap the total!");
                                }
                            }
                        }
                    }
                    match g.quiz.tick() {
                        TickEvent::AdvanceRound => {
                            advance = true;
                            milestone = g.quiz.round_index == 3;
                            // Later rounds roll more dice
                            let count = 1 + (g.quiz.round_index as usize / 2).min(2);
                            g.round = PipRound::generate(&mut self.rng, count);
                            g.shown = vec![DieOrientation::IDENTITY; g.round.dice.len()];
                            g.steps = vec![0; g.round.dice.len()];
                            g.tumble_ticks = 0;
                            g.tumbling = true;
                        }
                        TickEvent::RetryRound => retry = true,
                        TickEvent::SessionDone => finish = Some(g.quiz.summary()),
                        TickEvent::None => {}
                    }
                }
                None => {}
            }

            if advance || retry {
                if let Some(doc) = render::document() {
                    hud::set_flash(&doc, None);
                    if advance {
                        if let Some(rounds) = self.completed_rounds() {
                            hud::update_progress(&doc, rounds);
                        }
                    }
                }
            }
            if advance {
                if milestone {
                    self.celebrate(CelebrationKind::Rainbow);
                }
                self.present_round();
            }
            if let Some(summary) = finish {
                self.finish_session(summary);
            }
        }

        fn completed_rounds(&self) -> Option<u32> {
            Some(match self.controller.as_ref()? {
                Controller::Counting(g) => g.quiz.round_index,
                Controller::Addition(g) => g.quiz.round_index,
                Controller::Balance(g) => g.quiz.round_index,
                Controller::Tracing(g) => g.quiz.round_index,
                Controller::Memory(g) => g.memory.matched_pairs() as u32,
                Controller::Cards(g) => g.quiz.round_index,
                Controller::Dice(g) => g.quiz.round_index,
            })
        }

        /// Per-frame DOM updates that aren't event-driven
        fn render_frame(&mut self) {
            let Some(doc) = render::document() else {
                return;
            };
            if let Some(Controller::Balance(g)) = &self.controller {
                board::update_balance_tilt(&doc, g.puzzle.beam.angle);
                let ghost = g
                    .drag
                    .as_ref()
                    .map(|(drag, _, value)| (drag.item_center(), *value));
                board::update_drag_ghost(&doc, ghost);
            }

            // Pop the celebration overlay in over its first quarter
            if let (Some(c), Some(el)) = (&self.celebration, &self.celebration_el) {
                let scale = lerp(0.6, 1.0, ease_out(c.progress() * 4.0));
                let _ = el.set_attribute("style", &format!("transform:scale({scale:.3})"));
            }
        }

        // === Session end ===

        fn finish_session(&mut self, summary: ScoreSummary) {
            let Screen::Playing(game) = self.screen else {
                return;
            };
            let now = js_sys::Date::now();
            let new_best = self.stats.record(game, summary, now);
            self.stats.save();

            self.screen = Screen::Report;
            self.controller = None;

            self.narrator.play(Chime::Fanfare);
            self.narrator.say(&Line::SessionDone(summary.overall()));
            if new_best {
                self.narrator.say(&Line::NewBest);
            }
            self.celebrate(CelebrationKind::Bear);

            if let Some(doc) = render::document() {
                hud::update_progress(&doc, ROUNDS_PER_SESSION);
                hud::set_prompt(&doc, "Hooray!");
                hud::set_subtext(&doc, "");
                let _ = board::build_report(&doc, &summary, new_best);
            }
            // Remember which game the report belongs to for "Play again"
            remember_last_game(game.key());
        }

        /// The game a visible report panel belongs to
        fn report_game(&self) -> Option<GameId> {
            last_game().and_then(|key| GameId::from_key(&key))
        }

        // === Celebration plumbing ===

        fn celebrate(&mut self, kind: CelebrationKind) {
            let Some(doc) = render::document() else {
                return;
            };
            self.clear_celebration(&doc);
            if self.settings.reduced_motion && kind == CelebrationKind::Rainbow {
                return;
            }
            self.celebration = Some(Celebration::new(
                kind,
                self.settings.effective_celebration_ticks(),
            ));
            self.celebration_el = celebrate::spawn(&doc, kind);
        }

        fn clear_celebration(&mut self, doc: &Document) {
            if let Some(el) = self.celebration_el.take() {
                celebrate::remove(doc, &el);
            }
            self.celebration = None;
        }

        // === Preferences ===

        fn toggle_narration(&mut self) {
            self.settings.narration = !self.settings.narration;
            self.settings.save();
            self.narrator.apply_settings(&self.settings);
            if !self.settings.narration {
                self.narrator.hush();
            }
            if let Some(doc) = render::document() {
                render::set_text(
                    &doc,
                    "[data-nav=\"mute\"]",
                    if self.settings.narration {
                        "\u{1F50A}"
                    } else {
                        "\u{1F507}"
                    },
                );
            }
        }

        fn set_hidden(&mut self, hidden: bool) {
            self.paused = hidden;
            if hidden {
                self.accumulator = 0.0;
                if self.settings.mute_on_blur {
                    self.narrator.set_muted(true);
                }
                log::info!("Paused (tab hidden)");
            } else {
                self.narrator.set_muted(false);
            }
        }
    }

    // === Small DOM helpers ===

    /// Value of `attr` on the closest ancestor that carries it
    fn closest_attr(el: &Element, attr: &str) -> Option<String> {
        let hit = el.closest(&format!("[{attr}]")).ok().flatten()?;
        hit.get_attribute(attr)
    }

    fn remember_last_game(key: &str) {
        if let Some(storage) = web_sys::window()
            .and_then(|w| w.session_storage().ok())
            .flatten()
        {
            let _ = storage.set_item(LAST_GAME_KEY, key);
        }
    }

    fn last_game() -> Option<String> {
        web_sys::window()?
            .session_storage()
            .ok()??
            .get_item(LAST_GAME_KEY)
            .ok()?
    }

    /// Pointer position in board coordinates
    fn board_pos(client_x: f32, client_y: f32) -> Option<Vec2> {
        let doc = render::document()?;
        let rect = doc.get_element_by_id("board")?.get_bounding_client_rect();
        Some(Vec2::new(
            client_x - rect.left() as f32,
            client_y - rect.top() as f32,
        ))
    }

    fn event_target(event: &web_sys::Event) -> Option<Element> {
        event.target()?.dyn_into::<Element>().ok()
    }

    // === Startup ===

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Mathlings starting...");

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed)));
        log::info!("Seeded with {}", seed);

        app.borrow_mut().show_menu();
        app.borrow().narrator.say(&Line::Welcome);

        setup_listeners(app.clone());
        request_animation_frame(app);

        log::info!("Mathlings running!");
    }

    fn setup_listeners(app: Rc<RefCell<App>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Clicks anywhere route through data attributes
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(target) = event_target(&event) {
                    app.borrow_mut().handle_click(target);
                }
            });
            let _ = document
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse drag/trace
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(pos) = board_pos(event.client_x() as f32, event.client_y() as f32) {
                    let target = event_target(&event);
                    app.borrow_mut().pointer_down(pos, target);
                }
            });
            let _ = document
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(pos) = board_pos(event.client_x() as f32, event.client_y() as f32) {
                    app.borrow_mut().pointer_move(pos);
                }
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(pos) = board_pos(event.client_x() as f32, event.client_y() as f32) {
                    app.borrow_mut().pointer_up(pos);
                }
            });
            let _ = document
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch drag/trace
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    if let Some(pos) =
                        board_pos(touch.client_x() as f32, touch.client_y() as f32)
                    {
                        event.prevent_default();
                        let target = event_target(&event);
                        app.borrow_mut().pointer_down(pos, target);
                    }
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    if let Some(pos) =
                        board_pos(touch.client_x() as f32, touch.client_y() as f32)
                    {
                        event.prevent_default();
                        app.borrow_mut().pointer_move(pos);
                    }
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                // changedTouches would be more precise; the last known drag
                // position is good enough for these boards
                let pos = event
                    .changed_touches()
                    .get(0)
                    .and_then(|t| board_pos(t.client_x() as f32, t.client_y() as f32));
                if let Some(pos) = pos {
                    app.borrow_mut().pointer_up(pos);
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: digits answer, Escape home, M mute
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    "Escape" => {
                        a.narrator.hush();
                        a.show_menu();
                    }
                    "m" | "M" => a.toggle_narration(),
                    key => {
                        if let &[c @ b'0'..=b'9'] = key.as_bytes() {
                            a.key_digit(c - b'0');
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Auto-pause when the tab hides or the window blurs
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden =
                    document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                app.borrow_mut().set_hidden(hidden);
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().set_hidden(true);
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().set_hidden(false);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                mathlings::consts::TICK_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render_frame();
        }
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use mathlings::consts::ROUNDS_PER_SESSION;
    use mathlings::games::counting::CountingRound;
    use mathlings::games::quiz::{Quiz, TickEvent};
    use rand::SeedableRng;

    env_logger::init();
    log::info!("Mathlings (native) starting...");
    log::info!("Native mode is a smoke check - run with `trunk serve` for the web version");

    // Play one perfect counting session with a scripted player
    let mut rng = rand_pcg::Pcg32::seed_from_u64(0xBEE5);
    let mut quiz = Quiz::new();
    let mut round = CountingRound::generate(&mut rng, None);
    quiz.begin_round(&round.variant_key());
    quiz.prompt_shown();

    loop {
        assert!(quiz.answer(round.answer(round.target)));
        let event = loop {
            match quiz.tick() {
                TickEvent::None => continue,
                other => break other,
            }
        };
        match event {
            TickEvent::AdvanceRound => {
                round = CountingRound::generate(&mut rng, Some(round.target));
                quiz.begin_round(&round.variant_key());
                quiz.prompt_shown();
            }
            TickEvent::SessionDone => break,
            _ => unreachable!("scripted player never misses"),
        }
    }

    let summary = quiz.summary();
    println!(
        "Scripted session: {} rounds, accuracy {}%, speed {}%, overall {}%",
        ROUNDS_PER_SESSION,
        summary.accuracy,
        summary.speed,
        summary.overall()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
