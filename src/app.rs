/// Application shell around the engine: which screen is showing, the name
/// entry buffer, the cached leaderboard and transient notices.
///
/// Keys arrive here already decoded; the frame pump lives in `main`.

use std::time::Instant;

use crossterm::event::KeyCode;
use log::{info, warn};

use crate::domain::grid::Direction;
use crate::error::LeaderboardError;
use crate::sim::engine::{Command, Engine};
use crate::sim::event::GameEvent;
use crate::sim::lifecycle::Lifecycle;
use crate::store::leaderboard::{Leaderboard, LeaderboardEntry, MAX_NAME_CHARS};

/// Frames a notice stays on screen (~3 s at the default frame rate).
const NOTICE_FRAMES: u32 = 180;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Game,
    NameEntry,
    Leaderboard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub error: bool,
    ttl: u32,
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];

fn key_direction(code: KeyCode) -> Option<Direction> {
    if KEYS_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else if KEYS_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::Down)
    } else {
        None
    }
}

pub struct App {
    pub engine: Engine,
    leaderboard: Box<dyn Leaderboard>,
    pub screen: Screen,
    pub name_input: String,
    pub notice: Option<Notice>,
    pub top: Vec<LeaderboardEntry>,
    pub top_n: usize,
    pub new_record: bool,
    pub anim_tick: u32,
    pub quit: bool,
}

impl App {
    pub fn new(engine: Engine, leaderboard: Box<dyn Leaderboard>, top_n: usize) -> Self {
        App {
            engine,
            leaderboard,
            screen: Screen::Game,
            name_input: String::new(),
            notice: None,
            top: Vec::new(),
            top_n: top_n.max(1),
            new_record: false,
            anim_tick: 0,
            quit: false,
        }
    }

    /// Staged score of the last finished run, if it is still waiting to
    /// be submitted. Zero scores are never offered.
    pub fn pending_score(&self) -> Option<u32> {
        self.engine.profile().last_score().filter(|&n| n > 0)
    }

    // ── Per-frame ──

    /// Advance one frame. Returns the engine events produced this frame so
    /// the caller can trigger sound cues.
    pub fn frame(&mut self, now: Instant) -> Vec<GameEvent> {
        self.engine.on_tick(now);
        let events = self.engine.drain_events();
        for event in &events {
            match event {
                GameEvent::RunStarted => {
                    self.new_record = false;
                    self.notice = None;
                }
                GameEvent::NewHighScore { score } => {
                    self.new_record = true;
                    self.set_notice(format!("New high score: {score}!"), false);
                }
                _ => {}
            }
        }

        self.anim_tick = self.anim_tick.wrapping_add(1);
        if let Some(n) = &mut self.notice {
            n.ttl = n.ttl.saturating_sub(1);
            if n.ttl == 0 {
                self.notice = None;
            }
        }
        events
    }

    pub fn set_notice(&mut self, text: impl Into<String>, error: bool) {
        self.notice = Some(Notice { text: text.into(), error, ttl: NOTICE_FRAMES });
    }

    // ── Input ──

    pub fn handle_key(&mut self, code: KeyCode, now: Instant) {
        match self.screen {
            Screen::Game => self.game_key(code, now),
            Screen::NameEntry => self.name_entry_key(code),
            Screen::Leaderboard => self.leaderboard_key(code),
        }
    }

    /// Direction from a non-keyboard source (gesture, gamepad).
    pub fn turn(&mut self, dir: Direction, now: Instant) {
        if self.screen == Screen::Game {
            self.engine.handle_command(Command::Turn(dir), now);
        }
    }

    /// Toggle from a non-keyboard source.
    pub fn toggle(&mut self, now: Instant) {
        if self.screen == Screen::Game {
            self.engine.handle_command(Command::Toggle, now);
        }
    }

    fn game_key(&mut self, code: KeyCode, now: Instant) {
        if let Some(dir) = key_direction(code) {
            self.engine.handle_command(Command::Turn(dir), now);
            return;
        }

        let lifecycle = self.engine.lifecycle();
        match code {
            KeyCode::Char(' ') => self.engine.handle_command(Command::Toggle, now),
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Esc => {
                let cmd = if lifecycle == Lifecycle::Paused { Command::Resume } else { Command::Pause };
                self.engine.handle_command(cmd, now);
            }
            KeyCode::Enter => {
                let cmd = if lifecycle == Lifecycle::GameOver { Command::Restart } else { Command::Start };
                self.engine.handle_command(cmd, now);
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit = true,
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.engine.update_settings(|s| s.sound_enabled = !s.sound_enabled);
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                self.engine.update_settings(|s| s.game_speed = s.game_speed.next());
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                self.engine.update_settings(|s| s.grid_size = s.grid_size.next());
            }
            KeyCode::Char('n') | KeyCode::Char('N') if lifecycle == Lifecycle::GameOver => {
                self.open_name_entry();
            }
            KeyCode::Char('l') | KeyCode::Char('L') if lifecycle.between_runs() => {
                self.open_leaderboard();
            }
            _ => {}
        }
    }

    fn name_entry_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.submit_name(),
            KeyCode::Esc => {
                self.screen = Screen::Game;
                self.notice = None;
            }
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => {
                if self.name_input.chars().count() < MAX_NAME_CHARS {
                    self.name_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn leaderboard_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_top(),
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('l') | KeyCode::Char('L') => {
                self.screen = Screen::Game;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit = true,
            _ => {}
        }
    }

    // ── Leaderboard ──

    /// Returns false when there is no staged score to submit.
    pub fn open_name_entry(&mut self) -> bool {
        if self.pending_score().is_none() {
            return false;
        }
        self.name_input.clear();
        self.notice = None;
        self.screen = Screen::NameEntry;
        true
    }

    pub fn open_leaderboard(&mut self) {
        self.refresh_top();
        self.screen = Screen::Leaderboard;
    }

    fn refresh_top(&mut self) {
        match self.leaderboard.list_top(self.top_n) {
            Ok(entries) => self.top = entries,
            Err(e) => {
                warn!("leaderboard unavailable: {e}");
                self.set_notice(format!("Could not load scores: {e}"), true);
            }
        }
    }

    /// Submit the pending score under the typed name. Validation and
    /// storage failures keep the name entry open for another attempt.
    pub fn submit_name(&mut self) {
        let Some(score) = self.pending_score() else {
            self.screen = Screen::Game;
            self.set_notice("No score to submit", true);
            return;
        };
        match self.leaderboard.submit(&self.name_input, score) {
            Ok(entry) => {
                info!("submitted {} points for {}", entry.score, entry.player_name);
                self.engine.profile_mut().clear_last_score();
                self.name_input.clear();
                self.open_leaderboard();
                self.set_notice("Score submitted!", false);
            }
            Err(LeaderboardError::Validation(msg)) => {
                self.set_notice(capitalize(&msg), true);
            }
            Err(e @ LeaderboardError::Storage(_)) => {
                warn!("score submission failed: {e}");
                self.set_notice("Could not save score. Try again.", true);
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
