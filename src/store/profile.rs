/// Player profile: high score, the last-run score hand-off, and settings.
///
/// Loaded once from the key-value store at startup and written back on
/// every change. Write failures are logged and otherwise ignored; the
/// in-memory values stay authoritative for the session.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::store::kv::KeyValueStore;

pub const KEY_HIGH_SCORE: &str = "high_score";
pub const KEY_LAST_SCORE: &str = "last_score";
pub const KEY_SETTINGS: &str = "settings";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedLevel {
    Easy,
    Medium,
    Hard,
}

impl SpeedLevel {
    pub fn next(self) -> SpeedLevel {
        match self {
            SpeedLevel::Easy => SpeedLevel::Medium,
            SpeedLevel::Medium => SpeedLevel::Hard,
            SpeedLevel::Hard => SpeedLevel::Easy,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedLevel::Easy => "Easy",
            SpeedLevel::Medium => "Medium",
            SpeedLevel::Hard => "Hard",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridSize {
    Small,
    Normal,
    Large,
}

impl GridSize {
    pub fn next(self) -> GridSize {
        match self {
            GridSize::Small => GridSize::Normal,
            GridSize::Normal => GridSize::Large,
            GridSize::Large => GridSize::Small,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GridSize::Small => "Small",
            GridSize::Normal => "Normal",
            GridSize::Large => "Large",
        }
    }
}

/// Preference bundle, stored as one JSON document.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub sound_enabled: bool,
    pub game_speed: SpeedLevel,
    pub grid_size: GridSize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            sound_enabled: true,
            game_speed: SpeedLevel::Medium,
            grid_size: GridSize::Normal,
        }
    }
}

pub struct Profile {
    store: Box<dyn KeyValueStore>,
    high_score: u32,
    settings: Settings,
}

impl Profile {
    /// Read high score and settings out of `store`. Unparseable values are
    /// treated as absent.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let high_score = store
            .get(KEY_HIGH_SCORE)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(0);
        let settings = match store.get(KEY_SETTINGS) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("ignoring stored settings: {e}");
                Settings::default()
            }),
            None => Settings::default(),
        };
        Profile { store, high_score, settings }
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Raise the high score if `score` beats it. Returns true on a new record.
    pub fn record_score(&mut self, score: u32) -> bool {
        if score <= self.high_score {
            return false;
        }
        self.high_score = score;
        self.persist(KEY_HIGH_SCORE, &score.to_string());
        true
    }

    /// Leave the final score of a run for the submission screen.
    pub fn stage_last_score(&mut self, score: u32) {
        self.persist(KEY_LAST_SCORE, &score.to_string());
    }

    pub fn last_score(&self) -> Option<u32> {
        self.store
            .get(KEY_LAST_SCORE)
            .and_then(|v| v.trim().parse::<u32>().ok())
    }

    pub fn clear_last_score(&mut self) {
        if let Err(e) = self.store.remove(KEY_LAST_SCORE) {
            warn!("could not clear staged score: {e}");
        }
    }

    /// Apply `change` to the settings and persist the result.
    pub fn update_settings(&mut self, change: impl FnOnce(&mut Settings)) {
        change(&mut self.settings);
        match serde_json::to_string(&self.settings) {
            Ok(json) => self.persist(KEY_SETTINGS, &json),
            Err(e) => warn!("could not encode settings: {e}"),
        }
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!("could not persist {key}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryStore;

    #[test]
    fn loads_defaults_from_empty_store() {
        let p = Profile::load(Box::new(MemoryStore::new()));
        assert_eq!(p.high_score(), 0);
        assert_eq!(p.settings(), Settings::default());
        assert_eq!(p.last_score(), None);
    }

    #[test]
    fn reads_existing_values() {
        let mut store = MemoryStore::new();
        store.set(KEY_HIGH_SCORE, "31").unwrap();
        store
            .set(KEY_SETTINGS, r#"{"soundEnabled":false,"gameSpeed":"hard","gridSize":"large"}"#)
            .unwrap();
        let p = Profile::load(Box::new(store));
        assert_eq!(p.high_score(), 31);
        assert!(!p.settings().sound_enabled);
        assert_eq!(p.settings().game_speed, SpeedLevel::Hard);
        assert_eq!(p.settings().grid_size, GridSize::Large);
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let mut store = MemoryStore::new();
        store.set(KEY_SETTINGS, r#"{"gameSpeed":"easy"}"#).unwrap();
        let p = Profile::load(Box::new(store));
        assert_eq!(p.settings().game_speed, SpeedLevel::Easy);
        assert!(p.settings().sound_enabled);
    }

    #[test]
    fn garbage_values_are_ignored() {
        let mut store = MemoryStore::new();
        store.set(KEY_HIGH_SCORE, "lots").unwrap();
        store.set(KEY_SETTINGS, "[").unwrap();
        let p = Profile::load(Box::new(store));
        assert_eq!(p.high_score(), 0);
        assert_eq!(p.settings(), Settings::default());
    }

    #[test]
    fn high_score_only_rises() {
        let mut p = Profile::load(Box::new(MemoryStore::new()));
        assert!(p.record_score(5));
        assert!(!p.record_score(3));
        assert!(!p.record_score(5));
        assert!(p.record_score(9));
        assert_eq!(p.high_score(), 9);
    }

    #[test]
    fn last_score_handoff() {
        let mut p = Profile::load(Box::new(MemoryStore::new()));
        p.stage_last_score(12);
        assert_eq!(p.last_score(), Some(12));
        p.clear_last_score();
        assert_eq!(p.last_score(), None);
    }

    #[test]
    fn settings_cycle_and_persist() {
        let mut p = Profile::load(Box::new(MemoryStore::new()));
        p.update_settings(|s| {
            s.game_speed = s.game_speed.next();
            s.grid_size = s.grid_size.next();
            s.sound_enabled = !s.sound_enabled;
        });
        assert_eq!(p.settings().game_speed, SpeedLevel::Hard);
        assert_eq!(p.settings().grid_size, GridSize::Large);
        assert!(!p.settings().sound_enabled);
        let stored = p.store.get(KEY_SETTINGS).unwrap();
        assert!(stored.contains("\"gameSpeed\":\"hard\""));
    }
}
