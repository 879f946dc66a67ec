/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// Each frame:
///   1. compose the whole screen into `front` (pure read of `App`)
///   2. diff against `back` (the previous frame)
///   3. queue terminal commands only for changed cells, flush once
///   4. swap front/back
///
/// The renderer never touches engine state; it can draw at any rate
/// without affecting the tick schedule.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::app::{App, Screen};
use crate::domain::grid::Position;
use crate::sim::lifecycle::Lifecycle;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 8],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool, // occupies 2 terminal columns
    cont: bool, // right half of a wide cell (never printed)
}

impl Cell {
    /// Explicit background for every empty cell, so the terminal's own
    /// default never shows through between rows.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 20, b: 28 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 8],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Differs from every real cell; filling `back` with it forces a full repaint.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell.wide = is_wide(c);
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

/// Emoji used for food and medals render two columns wide.
fn is_wide(c: char) -> bool {
    matches!(c as u32, 0x1F300..=0x1FAFF)
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write `s` at (x, y). Wide glyphs take two columns. Returns the column
    /// after the last glyph written.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            let cell = Cell::from_char(ch, fg, bg);
            let span = if cell.wide { 2 } else { 1 };
            if cx + span > self.width {
                break;
            }
            self.set(cx, y, cell);
            if cell.wide {
                self.set(cx + 1, y, Cell { bg: cell.bg, ..Cell::WIDE_CONT });
            }
            cx += span;
        }
        cx
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Layout & Palette ──

/// Each board cell is two terminal columns, which makes it roughly square.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const BOARD_ROW: usize = 2; // top border
const BOARD_COL: usize = 1; // left border

const HUD_BG: Color = Color::Rgb { r: 24, g: 40, b: 32 };
const BORDER: Color = Color::Rgb { r: 90, g: 110, b: 100 };
const TILE_A: Color = Color::Rgb { r: 30, g: 36, b: 44 };
const TILE_B: Color = Color::Rgb { r: 36, g: 42, b: 52 };
const SNAKE_HEAD: Color = Color::Rgb { r: 140, g: 255, b: 120 };
const SNAKE_BODY: Color = Color::Rgb { r: 40, g: 170, b: 70 };
const OVERLAY_BG: Color = Color::Rgb { r: 12, g: 12, b: 16 };
const TITLE: Color = Color::Rgb { r: 255, g: 220, b: 80 };
const TEXT: Color = Color::Rgb { r: 220, g: 220, b: 220 };
const HINT: Color = Color::Rgb { r: 130, g: 130, b: 140 };
const DANGER: Color = Color::Rgb { r: 255, g: 80, b: 80 };
const NOTICE_OK: Color = Color::Rgb { r: 40, g: 120, b: 60 };
const NOTICE_ERR: Color = Color::Rgb { r: 150, g: 30, b: 30 };

/// Darken a colour for the board behind an overlay.
fn dim(c: Color) -> Color {
    match c {
        Color::Rgb { r, g, b } => Color::Rgb { r: r / 3, g: g / 3, b: b / 3 },
        other => other,
    }
}

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_view: Option<(Screen, Lifecycle)>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_view: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            crossterm::event::EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            crossterm::event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, app: &App) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Screen or lifecycle change → clean repaint.
        let view = (app.screen, app.engine.lifecycle());
        if self.last_view != Some(view) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_view = Some(view);
        }

        self.compose(app);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev {
                        need_move = true;
                    }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, app: &App) {
        self.front.clear();
        let bottom = match app.screen {
            Screen::Game => self.compose_game(app),
            Screen::NameEntry => self.compose_name_entry(app),
            Screen::Leaderboard => self.compose_leaderboard(app),
        };
        self.compose_notice(app, bottom + 1);
    }

    /// Returns the first free row under the board.
    fn compose_game(&mut self, app: &App) -> usize {
        let engine = &app.engine;
        let run = engine.run();
        let lifecycle = engine.lifecycle();
        let settings = engine.settings();

        // ── HUD ──
        let hud = format!(
            " SNAKE   Score: {:<5} Best: {:<5} {:<10} Speed: {:<7} Sound: {}",
            run.score,
            engine.high_score(),
            lifecycle.label(),
            settings.game_speed.label(),
            if settings.sound_enabled { "On" } else { "Off" },
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, TEXT, HUD_BG);

        // ── Board ──
        let dimmed = lifecycle != Lifecycle::Playing;
        let shade = |c: Color| if dimmed { dim(c) } else { c };
        let size = run.grid.size.max(0) as usize;
        let inner_w = size * CELL_W;

        let horiz = "─".repeat(inner_w);
        self.front.put_str(BOARD_COL - 1, BOARD_ROW, &format!("┌{horiz}┐"), shade(BORDER), Color::Reset);
        self.front.put_str(BOARD_COL - 1, BOARD_ROW + 1 + size, &format!("└{horiz}┘"), shade(BORDER), Color::Reset);
        for gy in 0..size {
            let row = BOARD_ROW + 1 + gy;
            self.front.put_str(BOARD_COL - 1, row, "│", shade(BORDER), Color::Reset);
            self.front.put_str(BOARD_COL + inner_w, row, "│", shade(BORDER), Color::Reset);
            for gx in 0..size {
                let tile = if (gx + gy) % 2 == 0 { TILE_A } else { TILE_B };
                let col = BOARD_COL + gx * CELL_W;
                self.front.put_str(col, row, "  ", Color::White, shade(tile));
            }
        }

        let head = run.head();
        for seg in run.snake.segments() {
            let color = if seg == head { SNAKE_HEAD } else { SNAKE_BODY };
            if let Some((col, row)) = cell_origin(seg, size) {
                self.front.put_str(col, row, "██", shade(color), Color::Reset);
            }
        }

        let food = run.food;
        if !run.snake.occupies(food.pos) {
            if let Some((col, row)) = cell_origin(food.pos, size) {
                let tile = if (food.pos.x + food.pos.y) % 2 == 0 { TILE_A } else { TILE_B };
                self.front.put_str(col, row, &food.kind.glyph().to_string(), Color::White, shade(tile));
            }
        }

        // ── Overlay ──
        let overlay: Vec<(String, Color)> = match lifecycle {
            Lifecycle::Playing => Vec::new(),
            Lifecycle::Idle => vec![
                ("Press Space to Start".into(), TITLE),
                (String::new(), TEXT),
                (format!("Grid: {}  Speed: {}", settings.grid_size.label(), settings.game_speed.label()), HINT),
                ("M sound  V speed  G grid  L scores".into(), HINT),
            ],
            Lifecycle::Paused => vec![
                ("Paused".into(), TITLE),
                ("Press Space to continue".into(), TEXT),
            ],
            Lifecycle::GameOver => {
                let mut lines = vec![
                    ("Game Over!".into(), DANGER),
                    (format!("Final Score: {}", run.score), TEXT),
                ];
                if let Some(reason) = app.engine.last_crash() {
                    lines.insert(1, (reason.label().into(), HINT));
                }
                if app.new_record {
                    lines.push(("New High Score!".into(), TITLE));
                }
                lines.push(("Press Space to restart".into(), TEXT));
                lines.push((String::new(), TEXT));
                let hint = if app.pending_score().is_some() {
                    "N submit score  L leaderboard"
                } else {
                    "L leaderboard"
                };
                lines.push((hint.into(), HINT));
                lines
            }
        };
        if !overlay.is_empty() {
            self.compose_overlay(&overlay, size);
        }

        // ── Help ──
        let help_row = BOARD_ROW + size + 3;
        let help = " Arrows/WASD: turn   Space: start/pause   Enter: new game   Q: quit";
        self.front.put_str(0, help_row, help, HINT, Color::Reset);
        help_row
    }

    /// Centre a block of text lines on the board.
    fn compose_overlay(&mut self, lines: &[(String, Color)], size: usize) {
        let inner_w = size * CELL_W;
        let text_w = lines.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let box_w = (text_w + 4).min(inner_w);
        let box_h = (lines.len() + 2).min(size);
        let box_x = BOARD_COL + (inner_w - box_w) / 2;
        let box_y = BOARD_ROW + 1 + (size - box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::from_char(' ', TEXT, OVERLAY_BG));
            }
        }
        for (i, (line, color)) in lines.iter().enumerate().take(box_h.saturating_sub(2)) {
            let shown: String = line.chars().take(box_w).collect();
            let x = box_x + (box_w - shown.chars().count()) / 2;
            self.front.put_str(x, box_y + 1 + i, &shown, *color, OVERLAY_BG);
        }
    }

    fn compose_name_entry(&mut self, app: &App) -> usize {
        let x = 4;
        self.front.put_str(x, 2, "SUBMIT YOUR SCORE", TITLE, Color::Reset);
        self.front.put_str(x, 4, &format!("Score: {}", app.pending_score().unwrap_or(0)), TEXT, Color::Reset);

        let cursor = if (app.anim_tick / 30) % 2 == 0 { "_" } else { " " };
        let end = self.front.put_str(x, 6, "Name: ", TEXT, Color::Reset);
        let end = self.front.put_str(end, 6, &app.name_input, SNAKE_HEAD, Color::Reset);
        self.front.put_str(end, 6, cursor, SNAKE_HEAD, Color::Reset);

        self.front.put_str(x, 8, "1-20 characters", HINT, Color::Reset);
        self.front.put_str(x, 10, "Enter: submit   Esc: cancel", HINT, Color::Reset);
        10
    }

    fn compose_leaderboard(&mut self, app: &App) -> usize {
        let x = 4;
        self.front.put_str(x, 1, &format!("LEADERBOARD  top {}", app.top_n), TITLE, Color::Reset);
        self.front.put_str(x, 3, "Rank  Player                Score   Date", HINT, Color::Reset);

        let mut row = 4;
        if app.top.is_empty() {
            self.front.put_str(x, row, "No scores yet. Be the first!", TEXT, Color::Reset);
            row += 1;
        }
        for (i, entry) in app.top.iter().enumerate() {
            let rank = match MEDALS.get(i) {
                Some(m) => format!("{m}  "),
                None => format!("{:>2}.  ", i + 1),
            };
            let end = self.front.put_str(x, row, &rank, TEXT, Color::Reset);
            let line = format!(
                "{:<20}  {:>5}   {}",
                entry.player_name,
                entry.score,
                entry.timestamp.format("%Y-%m-%d")
            );
            let color = if i < MEDALS.len() { TITLE } else { TEXT };
            self.front.put_str(end, row, &line, color, Color::Reset);
            row += 1;
        }

        row += 1;
        self.front.put_str(x, row, "R: refresh   Esc: back", HINT, Color::Reset);
        row
    }

    fn compose_notice(&mut self, app: &App, row: usize) {
        let Some(notice) = &app.notice else { return };
        let bg = if notice.error { NOTICE_ERR } else { NOTICE_OK };
        let text = format!(" {} ", notice.text);
        self.front.put_str(1, row, &text, Color::White, bg);
    }
}

/// Terminal (col, row) of a board cell's left half.
fn cell_origin(p: Position, size: usize) -> Option<(usize, usize)> {
    if p.x < 0 || p.y < 0 || p.x as usize >= size || p.y as usize >= size {
        return None;
    }
    Some((BOARD_COL + p.x as usize * CELL_W, BOARD_ROW + 1 + p.y as usize))
}
