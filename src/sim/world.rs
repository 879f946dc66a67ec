/// RunState: everything that lives for exactly one run.
///
/// Mutated only by `RunState::new` (run initialization) and `step::step`;
/// every other reader gets a shared reference.

use std::time::Duration;

use rand::Rng;

use crate::domain::food::{place_food, Food, FoodKind};
use crate::domain::grid::{Direction, Grid, Position};
use crate::domain::snake::Snake;

/// Per-run tuning, resolved from config and settings at run start.
#[derive(Clone, Copy, Debug)]
pub struct RunParams {
    pub grid: Grid,
    pub initial_interval: Duration,
    pub decrement: Duration,
    pub min_interval: Duration,
    pub food_attempts: u32,
}

#[cfg(test)]
impl RunParams {
    /// Default tuning on a `size × size` board.
    pub fn for_tests(size: u16) -> Self {
        RunParams {
            grid: Grid::new(size),
            initial_interval: Duration::from_millis(150),
            decrement: Duration::from_millis(2),
            min_interval: Duration::from_millis(50),
            food_attempts: 64,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunState {
    pub grid: Grid,
    pub snake: Snake,
    pub food: Food,
    /// Direction used by the most recent tick.
    pub direction: Direction,
    /// Latest accepted input, committed at the start of the next tick.
    pub pending: Option<Direction>,
    pub score: u32,
    pub interval: Duration,
    pub params: RunParams,
    pub ticks: u64,
}

impl RunState {
    /// Fresh run: one-segment snake in the centre heading right, score 0,
    /// interval at its initial value, food somewhere off the snake.
    pub fn new<R: Rng + ?Sized>(params: RunParams, rng: &mut R) -> Self {
        let snake = Snake::new(params.grid.center());
        // A one-cell snake always leaves a free cell on any board of 2+ cells;
        // a degenerate 1×1 board just parks the food under the head.
        let food = place_food(rng, params.grid, &snake, params.food_attempts).unwrap_or(Food {
            pos: params.grid.center(),
            kind: FoodKind::Apple,
        });
        RunState {
            grid: params.grid,
            snake,
            food,
            direction: Direction::Right,
            pending: None,
            score: 0,
            interval: params.initial_interval.max(params.min_interval),
            params,
            ticks: 0,
        }
    }

    /// Accept `dir` into the pending slot unless it reverses the direction
    /// used last tick. Returns whether the input was kept.
    pub fn request_direction(&mut self, dir: Direction) -> bool {
        if dir.is_opposite(self.direction) {
            return false;
        }
        self.pending = Some(dir);
        true
    }

    /// Move the pending direction into effect for the coming tick.
    pub fn commit_direction(&mut self) -> Direction {
        if let Some(dir) = self.pending.take() {
            if !dir.is_opposite(self.direction) {
                self.direction = dir;
            }
        }
        self.direction
    }

    pub fn head(&self) -> Position {
        self.snake.head()
    }
}
