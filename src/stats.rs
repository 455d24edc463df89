//! Best-score book
//!
//! One record per game, persisted to LocalStorage, expired after 24 hours so
//! every day starts fresh.

use serde::{Deserialize, Serialize};

/// Records older than this are dropped on load (ms)
pub const EXPIRY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// The seven games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameId {
    Counting,
    Addition,
    Balance,
    Tracing,
    Memory,
    Cards,
    Dice,
}

impl GameId {
    pub const ALL: [GameId; 7] = [
        GameId::Counting,
        GameId::Addition,
        GameId::Balance,
        GameId::Tracing,
        GameId::Memory,
        GameId::Cards,
        GameId::Dice,
    ];

    /// Stable key for storage and DOM dataset attributes
    pub fn key(&self) -> &'static str {
        match self {
            GameId::Counting => "counting",
            GameId::Addition => "addition",
            GameId::Balance => "balance",
            GameId::Tracing => "tracing",
            GameId::Memory => "memory",
            GameId::Cards => "cards",
            GameId::Dice => "dice",
        }
    }

    pub fn from_key(key: &str) -> Option<GameId> {
        GameId::ALL.iter().copied().find(|g| g.key() == key)
    }

    /// Menu title
    pub fn title(&self) -> &'static str {
        match self {
            GameId::Counting => "Count the Critters",
            GameId::Addition => "Add It Up",
            GameId::Balance => "Balance the Scale",
            GameId::Tracing => "Trace the Number",
            GameId::Memory => "Match the Pairs",
            GameId::Cards => "Card Battle",
            GameId::Dice => "Count the Pips",
        }
    }

    /// Menu icon
    pub fn emoji(&self) -> &'static str {
        match self {
            GameId::Counting => "\u{1F41E}",
            GameId::Addition => "\u{2795}",
            GameId::Balance => "\u{2696}",
            GameId::Tracing => "\u{270F}",
            GameId::Memory => "\u{1F0CF}",
            GameId::Cards => "\u{1F3B4}",
            GameId::Dice => "\u{1F3B2}",
        }
    }
}

/// Four-axis session result, all percentages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub accuracy: u8,
    pub resilience: u8,
    pub speed: u8,
    pub variety: u8,
}

impl ScoreSummary {
    /// Rounded percentage, saturating at 100
    pub fn percent(num: u32, den: u32) -> u8 {
        if den == 0 {
            return 0;
        }
        (((num as f64 / den as f64) * 100.0).round() as u32).min(100) as u8
    }

    /// Rounded mean of the four axes, the number shown on the menu
    pub fn overall(&self) -> u8 {
        let sum =
            self.accuracy as u32 + self.resilience as u32 + self.speed as u32 + self.variety as u32;
        ((sum as f64 / 4.0).round() as u32).min(100) as u8
    }
}

/// A game's best summary and when it was earned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub game: GameId,
    pub summary: ScoreSummary,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// The score book
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsBook {
    pub records: Vec<GameRecord>,
}

impl StatsBook {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "mathlings_stats";

    pub fn new() -> Self {
        Self::default()
    }

    /// Today's best for a game, if any
    pub fn best(&self, game: GameId) -> Option<&GameRecord> {
        self.records.iter().find(|r| r.game == game)
    }

    /// Store a session result. Keeps the record with the higher overall;
    /// returns true when this summary became the new best.
    pub fn record(&mut self, game: GameId, summary: ScoreSummary, timestamp: f64) -> bool {
        match self.records.iter_mut().find(|r| r.game == game) {
            Some(existing) => {
                if summary.overall() > existing.summary.overall() {
                    existing.summary = summary;
                    existing.timestamp = timestamp;
                    true
                } else {
                    false
                }
            }
            None => {
                self.records.push(GameRecord {
                    game,
                    summary,
                    timestamp,
                });
                true
            }
        }
    }

    /// Drop records past the daily expiry
    pub fn prune(&mut self, now_ms: f64) {
        self.records
            .retain(|r| now_ms - r.timestamp < EXPIRY_MS && r.timestamp <= now_ms);
    }

    /// Load the book from LocalStorage, pruning expired records (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(mut book) = serde_json::from_str::<StatsBook>(&json) {
                    book.prune(js_sys::Date::now());
                    log::info!("Loaded {} score records", book.records.len());
                    return book;
                }
            }
        }

        log::info!("No score book found, starting fresh");
        Self::new()
    }

    /// Save the book to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Score book saved ({} records)", self.records.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(accuracy: u8) -> ScoreSummary {
        ScoreSummary {
            accuracy,
            resilience: accuracy,
            speed: accuracy,
            variety: accuracy,
        }
    }

    #[test]
    fn test_percent_rounds_and_saturates() {
        assert_eq!(ScoreSummary::percent(1, 3), 33);
        assert_eq!(ScoreSummary::percent(2, 3), 67);
        assert_eq!(ScoreSummary::percent(5, 5), 100);
        assert_eq!(ScoreSummary::percent(7, 5), 100);
        assert_eq!(ScoreSummary::percent(0, 0), 0);
    }

    #[test]
    fn test_overall_is_mean() {
        let s = ScoreSummary {
            accuracy: 100,
            resilience: 50,
            speed: 75,
            variety: 25,
        };
        assert_eq!(s.overall(), 63);
    }

    #[test]
    fn test_record_keeps_best() {
        let mut book = StatsBook::new();
        assert!(book.record(GameId::Counting, summary(60), 1000.0));
        // Worse run doesn't replace
        assert!(!book.record(GameId::Counting, summary(40), 2000.0));
        assert_eq!(book.best(GameId::Counting).unwrap().summary.accuracy, 60);
        // Better run does
        assert!(book.record(GameId::Counting, summary(80), 3000.0));
        let best = book.best(GameId::Counting).unwrap();
        assert_eq!(best.summary.accuracy, 80);
        assert_eq!(best.timestamp, 3000.0);
        assert_eq!(book.records.len(), 1);
    }

    #[test]
    fn test_games_tracked_independently() {
        let mut book = StatsBook::new();
        book.record(GameId::Counting, summary(60), 0.0);
        book.record(GameId::Dice, summary(90), 0.0);
        assert_eq!(book.best(GameId::Counting).unwrap().summary.accuracy, 60);
        assert_eq!(book.best(GameId::Dice).unwrap().summary.accuracy, 90);
        assert!(book.best(GameId::Balance).is_none());
    }

    #[test]
    fn test_prune_expires_old_records() {
        let mut book = StatsBook::new();
        book.record(GameId::Counting, summary(60), 0.0);
        book.record(GameId::Dice, summary(90), EXPIRY_MS / 2.0);

        book.prune(EXPIRY_MS + 1.0);
        assert!(book.best(GameId::Counting).is_none());
        assert!(book.best(GameId::Dice).is_some());
    }

    #[test]
    fn test_prune_drops_future_timestamps() {
        // A clock that moved backwards shouldn't resurrect stale entries
        let mut book = StatsBook::new();
        book.record(GameId::Counting, summary(60), 5000.0);
        book.prune(1000.0);
        assert!(book.best(GameId::Counting).is_none());
    }

    #[test]
    fn test_game_id_keys_round_trip() {
        for game in GameId::ALL {
            assert_eq!(GameId::from_key(game.key()), Some(game));
        }
        assert_eq!(GameId::from_key("nope"), None);
    }
}
