/// Food items and their placement.
///
/// Placement is bounded: a fixed number of uniform random probes, then a
/// row-major scan. A completely full board yields `NoFreeCell` instead of
/// spinning.

use rand::Rng;

use crate::domain::grid::{Grid, Position};
use crate::domain::snake::Snake;
use crate::error::SimulationError;

/// Flavour of a food item. Cosmetic only.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FoodKind {
    Apple,
    Banana,
    Cherry,
    Grape,
    Orange,
    Strawberry,
}

impl FoodKind {
    pub const ALL: [FoodKind; 6] = [
        FoodKind::Apple,
        FoodKind::Banana,
        FoodKind::Cherry,
        FoodKind::Grape,
        FoodKind::Orange,
        FoodKind::Strawberry,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> FoodKind {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn glyph(self) -> char {
        match self {
            FoodKind::Apple => '🍎',
            FoodKind::Banana => '🍌',
            FoodKind::Cherry => '🍒',
            FoodKind::Grape => '🍇',
            FoodKind::Orange => '🍊',
            FoodKind::Strawberry => '🍓',
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Food {
    pub pos: Position,
    pub kind: FoodKind,
}

/// Pick a random free cell for new food.
///
/// Tries `attempts` uniform samples first; if every probe lands on the
/// snake, falls back to the first free cell in row-major order.
pub fn place_food<R: Rng + ?Sized>(
    rng: &mut R,
    grid: Grid,
    snake: &Snake,
    attempts: u32,
) -> Result<Food, SimulationError> {
    let kind = FoodKind::random(rng);

    if snake.len() >= grid.cell_count() {
        return Err(SimulationError::NoFreeCell);
    }

    for _ in 0..attempts {
        let candidate = Position::new(
            rng.random_range(0..grid.size),
            rng.random_range(0..grid.size),
        );
        if !snake.occupies(candidate) {
            return Ok(Food { pos: candidate, kind });
        }
    }

    grid.cells()
        .find(|&c| !snake.occupies(c))
        .map(|pos| Food { pos, kind })
        .ok_or(SimulationError::NoFreeCell)
}
