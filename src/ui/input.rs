/// Terminal input collector.
///
/// Drains every pending crossterm event once per frame and sorts it into:
///   - fresh key presses (edge-triggered; one turn per press)
///   - mouse drag gestures, resolved to a direction on button release
///   - the latest terminal resize
///
/// Release and Repeat events are ignored. A snake turns once per press,
/// so there is no held-key tracking.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::domain::grid::Direction;

/// Shortest drag, in rows, that counts as a gesture. Columns are scaled to
/// rows first (a terminal cell is about twice as tall as it is wide).
const GESTURE_MIN_ROWS: i32 = 2;

pub struct InputState {
    /// Keys pressed during the most recent `drain_events()`.
    fresh_presses: Vec<KeyCode>,

    /// Raw press events, for modifier checks.
    raw_events: Vec<KeyEvent>,

    drag_origin: Option<(u16, u16)>,
    gestures: Vec<Direction>,
    resized: Option<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            drag_origin: None,
            gestures: Vec::with_capacity(2),
            resized: None,
        }
    }

    /// Read all available events without blocking. Call once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.gestures.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    self.fresh_presses.push(key.code);
                    self.raw_events.push(key);
                }
                Ok(Event::Mouse(mouse)) => self.on_mouse(mouse),
                Ok(Event::Resize(cols, rows)) => self.resized = Some((cols, rows)),
                _ => {}
            }
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_origin = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some((x0, y0)) = self.drag_origin.take() {
                    let dx = i32::from(mouse.column) - i32::from(x0);
                    let dy = i32::from(mouse.row) - i32::from(y0);
                    if let Some(dir) = gesture_direction(dx / 2, dy, GESTURE_MIN_ROWS) {
                        self.gestures.push(dir);
                    }
                }
            }
            _ => {}
        }
    }

    /// Keys pressed this frame, in arrival order, so two quick turns inside
    /// one frame still reach the router in sequence.
    pub fn pressed_in_order(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.fresh_presses.iter().copied()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    pub fn gestures(&self) -> &[Direction] {
        &self.gestures
    }

    /// Latest terminal size seen since the last call.
    pub fn take_resize(&mut self) -> Option<(u16, u16)> {
        self.resized.take()
    }
}

/// Resolve a drag vector to its dominant axis. Short drags are ignored;
/// exact diagonals resolve vertically.
pub fn gesture_direction(dx: i32, dy: i32, min: i32) -> Option<Direction> {
    if dx.abs().max(dy.abs()) < min {
        return None;
    }
    let dir = if dx.abs() > dy.abs() {
        if dx > 0 { Direction::Right } else { Direction::Left }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    };
    Some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_axis_wins() {
        assert_eq!(gesture_direction(5, 1, 2), Some(Direction::Right));
        assert_eq!(gesture_direction(-5, 2, 2), Some(Direction::Left));
        assert_eq!(gesture_direction(1, 4, 2), Some(Direction::Down));
        assert_eq!(gesture_direction(-1, -3, 2), Some(Direction::Up));
    }

    #[test]
    fn short_drag_is_a_click() {
        assert_eq!(gesture_direction(1, 1, 2), None);
        assert_eq!(gesture_direction(0, 0, 2), None);
    }

    #[test]
    fn diagonal_resolves_vertically() {
        assert_eq!(gesture_direction(3, 3, 2), Some(Direction::Down));
        assert_eq!(gesture_direction(-3, -3, 2), Some(Direction::Up));
    }
}
