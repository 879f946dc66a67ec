/// Grid geometry: cell positions, the four headings, and board sizing.
///
/// Coordinates are signed so that a head stepping off the board is still
/// representable; bounds are only enforced by `Grid::contains`.

/// Integer grid-cell coordinate. (0, 0) is the top-left cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The neighbouring cell one step in `dir`.
    pub fn step(self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position { x: self.x + dx, y: self.y + dy }
    }

    /// Manhattan distance, used to assert grid adjacency.
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit vector. Y grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// A square board of `size × size` cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Grid {
    pub size: i32,
}

impl Grid {
    pub fn new(size: u16) -> Self {
        Grid { size: i32::from(size.max(1)) }
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.size && p.y < self.size
    }

    pub fn cell_count(&self) -> usize {
        let side = self.size as usize;
        side * side
    }

    pub fn center(&self) -> Position {
        Position::new(self.size / 2, self.size / 2)
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |y| (0..self.size).map(move |x| Position::new(x, y)))
    }
}

/// Viewport size class, chosen once per run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SizeClass {
    Compact,
    Standard,
}

impl SizeClass {
    /// Narrow viewports get the compact board.
    pub fn for_viewport(viewport_cols: u16, breakpoint_cols: u16) -> SizeClass {
        if viewport_cols < breakpoint_cols {
            SizeClass::Compact
        } else {
            SizeClass::Standard
        }
    }
}
