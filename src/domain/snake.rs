/// The snake body: an ordered run of cells, head first.
///
/// Each tick pushes a new head and, unless the snake is growing, pops the
/// tail. That keeps consecutive segments grid-adjacent without any extra
/// bookkeeping.

use std::collections::VecDeque;

use crate::domain::grid::{Direction, Position};

#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// A one-segment snake at `head`.
    pub fn new(head: Position) -> Self {
        let mut body = VecDeque::with_capacity(32);
        body.push_back(head);
        Snake { body }
    }

    /// Build from explicit segments, head first. Returns `None` for an empty slice.
    pub fn from_segments(segments: &[Position]) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        Some(Snake { body: segments.iter().copied().collect() })
    }

    pub fn head(&self) -> Position {
        // Never empty: every constructor seeds at least one segment and
        // `advance` pushes before it pops.
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub fn occupies(&self, p: Position) -> bool {
        self.body.contains(&p)
    }

    /// Where the head would land after one step in `dir`.
    pub fn next_head(&self, dir: Direction) -> Position {
        self.head().step(dir)
    }

    /// Would moving the head into `p` hit the body?
    ///
    /// When the snake is not growing this step, the tail cell is vacated in
    /// the same tick and does not count.
    pub fn hits_body(&self, p: Position, growing: bool) -> bool {
        let checked = if growing || self.body.len() == 1 {
            self.body.len()
        } else {
            self.body.len() - 1
        };
        self.body.iter().take(checked).any(|&s| s == p)
    }

    /// Push a new head; drop the tail unless `grow` is set.
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
    }

    /// True when no cell repeats and every pair of neighbours is adjacent.
    pub fn is_well_formed(&self) -> bool {
        let adjacent = self
            .body
            .iter()
            .zip(self.body.iter().skip(1))
            .all(|(a, b)| a.manhattan(*b) == 1);
        let unique = self
            .body
            .iter()
            .enumerate()
            .all(|(i, a)| !self.body.iter().skip(i + 1).any(|b| b == a));
        adjacent && unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn advance_moves_without_growing() {
        let mut s = Snake::from_segments(&[p(10, 10), p(9, 10), p(8, 10)]).unwrap();
        s.advance(p(11, 10), false);
        assert_eq!(s.len(), 3);
        assert_eq!(s.head(), p(11, 10));
        assert_eq!(s.segments().last().unwrap(), p(9, 10));
        assert!(s.is_well_formed());
    }

    #[test]
    fn advance_grows_by_one() {
        let mut s = Snake::new(p(5, 5));
        s.advance(p(6, 5), true);
        assert_eq!(s.len(), 2);
        assert_eq!(s.segments().last().unwrap(), p(5, 5));
    }

    #[test]
    fn vacating_tail_is_not_a_hit() {
        // A 2×2 loop with the head at (1,1) and the tail at (0,1).
        // Moving left enters the cell the tail is leaving.
        let s = Snake::from_segments(&[p(1, 1), p(1, 0), p(0, 0), p(0, 1)]).unwrap();
        let next = s.next_head(Direction::Left);
        assert_eq!(next, s.segments().last().unwrap());
        assert!(!s.hits_body(next, false));
        // If the snake were growing this step the tail stays and it is a hit.
        assert!(s.hits_body(next, true));
    }

    #[test]
    fn body_cell_is_a_hit() {
        let s = Snake::from_segments(&[p(1, 1), p(1, 0), p(0, 0), p(0, 1), p(0, 2)]).unwrap();
        // (0,1) is mid-body now, not the tail.
        assert!(s.hits_body(p(0, 1), false));
        assert!(!s.hits_body(p(2, 1), false));
    }

    #[test]
    fn empty_segments_rejected() {
        assert!(Snake::from_segments(&[]).is_none());
    }

    #[test]
    fn well_formed_detects_gaps_and_repeats() {
        assert!(!Snake::from_segments(&[p(0, 0), p(2, 0)]).unwrap().is_well_formed());
        assert!(!Snake::from_segments(&[p(0, 0), p(1, 0), p(0, 0)]).unwrap().is_well_formed());
    }
}
