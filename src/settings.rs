//! Player preferences
//!
//! Persisted separately from scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{CELEBRATION_TICKS, CELEBRATION_TICKS_REDUCED};

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Spoken narration of prompts and praise
    pub narration: bool,
    /// Speech rate (1.0 = browser default; kids get a slower read)
    pub narration_rate: f32,
    /// Chime volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Minimize overlays and flashes
    pub reduced_motion: bool,
    /// Stop speaking when the tab loses focus
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            narration: true,
            narration_rate: 0.85,
            sfx_volume: 0.8,
            reduced_motion: false,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// Celebration overlay duration respecting reduced motion
    pub fn effective_celebration_ticks(&self) -> u32 {
        if self.reduced_motion {
            CELEBRATION_TICKS_REDUCED
        } else {
            CELEBRATION_TICKS
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "mathlings_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_suit_young_players() {
        let s = Settings::default();
        assert!(s.narration);
        assert!(s.narration_rate < 1.0);
        assert!(!s.reduced_motion);
    }

    #[test]
    fn test_reduced_motion_shortens_celebrations() {
        let mut s = Settings::default();
        let full = s.effective_celebration_ticks();
        s.reduced_motion = true;
        assert!(s.effective_celebration_ticks() < full);
    }
}
