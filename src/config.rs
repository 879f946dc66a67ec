/// External configuration loader.
///
/// Reads `config.toml` from an explicit path, the executable's directory,
/// the current directory or the data directory (first hit wins).
/// Missing files or keys fall back to defaults; a file that fails to parse
/// is reported through `ConfigSource::Invalid` and defaults are used.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::profile::{GridSize, SpeedLevel};

const APP_DIR: &str = "snake-arcade";

/// Board side limits. Each cell is two terminal columns wide.
const MIN_GRID: u16 = 4;
const MAX_GRID: u16 = 64;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub grid: GridConfig,
    pub engine: EngineConfig,
    pub gamepad: GamepadConfig,
    pub data_dir: PathBuf,
    pub log_level: String,
    pub leaderboard_size: usize,
}

/// Tick interval tuning, all in milliseconds.
#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub easy_ms: u64,
    pub medium_ms: u64,
    pub hard_ms: u64,
    pub decrement_ms: u64,   // shaved off per food eaten
    pub min_interval_ms: u64, // floor
}

#[derive(Clone, Debug)]
pub struct GridConfig {
    pub small: u16,
    pub normal: u16,
    pub large: u16,
    pub compact: u16,
    pub compact_breakpoint_cols: u16,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub frame_ms: u64,
    pub food_attempts: u32,
    pub restart_guard_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub toggle: Vec<String>,
    pub quit: Vec<String>,
}

/// Where the active configuration came from.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
    Invalid { path: PathBuf, error: String },
}

impl SpeedConfig {
    pub fn initial_interval(&self, level: SpeedLevel) -> Duration {
        let ms = match level {
            SpeedLevel::Easy => self.easy_ms,
            SpeedLevel::Medium => self.medium_ms,
            SpeedLevel::Hard => self.hard_ms,
        };
        Duration::from_millis(ms.max(self.min_interval_ms))
    }

    pub fn decrement(&self) -> Duration {
        Duration::from_millis(self.decrement_ms)
    }

    pub fn floor(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms.max(1))
    }
}

impl GridConfig {
    pub fn standard_size(&self, pref: GridSize) -> u16 {
        match pref {
            GridSize::Small => self.small,
            GridSize::Normal => self.normal,
            GridSize::Large => self.large,
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    engine: TomlEngine,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_easy")]
    easy_ms: u64,
    #[serde(default = "default_medium")]
    medium_ms: u64,
    #[serde(default = "default_hard")]
    hard_ms: u64,
    #[serde(default = "default_decrement")]
    decrement_ms: u64,
    #[serde(default = "default_min_interval")]
    min_interval_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_small")]
    small: u16,
    #[serde(default = "default_normal")]
    normal: u16,
    #[serde(default = "default_large")]
    large: u16,
    #[serde(default = "default_compact")]
    compact: u16,
    #[serde(default = "default_breakpoint")]
    compact_breakpoint_cols: u16,
}

#[derive(Deserialize, Debug)]
struct TomlEngine {
    #[serde(default = "default_frame")]
    frame_ms: u64,
    #[serde(default = "default_food_attempts")]
    food_attempts: u32,
    #[serde(default = "default_restart_guard")]
    restart_guard_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_toggle")]
    toggle: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    data_dir: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_leaderboard_size")]
    leaderboard_size: usize,
}

// ── Defaults ──

fn default_easy() -> u64 { 200 }
fn default_medium() -> u64 { 150 }
fn default_hard() -> u64 { 100 }
fn default_decrement() -> u64 { 2 }
fn default_min_interval() -> u64 { 50 }

fn default_small() -> u16 { 15 }
fn default_normal() -> u16 { 20 }
fn default_large() -> u16 { 25 }
fn default_compact() -> u16 { 15 }
fn default_breakpoint() -> u16 { 64 } // a 20-cell board is 40 cols + border + HUD padding

fn default_frame() -> u64 { 16 }      // ~60 Hz pump
fn default_food_attempts() -> u32 { 64 }
fn default_restart_guard() -> u64 { 100 }

fn default_toggle() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

fn default_log_level() -> String { "info".into() }
fn default_leaderboard_size() -> usize { 10 }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            easy_ms: default_easy(),
            medium_ms: default_medium(),
            hard_ms: default_hard(),
            decrement_ms: default_decrement(),
            min_interval_ms: default_min_interval(),
        }
    }
}

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid {
            small: default_small(),
            normal: default_normal(),
            large: default_large(),
            compact: default_compact(),
            compact_breakpoint_cols: default_breakpoint(),
        }
    }
}

impl Default for TomlEngine {
    fn default() -> Self {
        TomlEngine {
            frame_ms: default_frame(),
            food_attempts: default_food_attempts(),
            restart_guard_ms: default_restart_guard(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { toggle: default_toggle(), quit: default_quit() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            data_dir: String::new(),
            log_level: default_log_level(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl GameConfig {
    /// Load config. `explicit` (from `--config`) is tried first, then the
    /// candidate directories.
    pub fn load(explicit: Option<&Path>) -> (Self, ConfigSource) {
        let mut paths: Vec<PathBuf> = Vec::new();
        if let Some(p) = explicit {
            paths.push(p.to_path_buf());
        }
        paths.extend(candidate_dirs().into_iter().map(|d| d.join("config.toml")));

        for path in paths {
            if !path.is_file() {
                continue;
            }
            return match std::fs::read_to_string(&path) {
                Ok(text) => match Self::parse(&text) {
                    Ok(cfg) => (cfg, ConfigSource::File(path)),
                    Err(e) => (GameConfig::default(), ConfigSource::Invalid { path, error: e.to_string() }),
                },
                Err(e) => (GameConfig::default(), ConfigSource::Invalid { path, error: e.to_string() }),
            };
        }
        (GameConfig::default(), ConfigSource::Defaults)
    }

    /// Parse a TOML document; absent keys take their defaults.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(t: TomlConfig) -> Self {
        let data_dir = if t.general.data_dir.is_empty() {
            default_data_dir()
        } else {
            PathBuf::from(&t.general.data_dir)
        };

        GameConfig {
            speed: SpeedConfig {
                easy_ms: t.speed.easy_ms,
                medium_ms: t.speed.medium_ms,
                hard_ms: t.speed.hard_ms,
                decrement_ms: t.speed.decrement_ms,
                min_interval_ms: t.speed.min_interval_ms,
            },
            grid: GridConfig {
                small: t.grid.small.clamp(MIN_GRID, MAX_GRID),
                normal: t.grid.normal.clamp(MIN_GRID, MAX_GRID),
                large: t.grid.large.clamp(MIN_GRID, MAX_GRID),
                compact: t.grid.compact.clamp(MIN_GRID, MAX_GRID),
                compact_breakpoint_cols: t.grid.compact_breakpoint_cols,
            },
            engine: EngineConfig {
                frame_ms: t.engine.frame_ms.max(1),
                food_attempts: t.engine.food_attempts,
                restart_guard_ms: t.engine.restart_guard_ms,
            },
            gamepad: GamepadConfig {
                toggle: t.gamepad.toggle,
                quit: t.gamepad.quit,
            },
            data_dir,
            log_level: t.general.log_level,
            leaderboard_size: t.general.leaderboard_size.max(1),
        }
    }
}

/// `~/.local/share/snake-arcade`, or the working directory without `$HOME`.
fn default_data_dir() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".local/share").join(APP_DIR),
        Err(_) => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Candidate directories to search: exe dir + CWD + data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    let data = default_data_dir();
    if data.is_dir() && !dirs.iter().any(|d| d == &data) {
        dirs.push(data);
    }

    dirs
}
