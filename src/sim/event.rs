/// Events emitted by the engine, in the order they happened.
/// The presentation layer consumes these for sound and notices.

use crate::domain::grid::Position;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CrashReason {
    Wall,
    SelfHit,
    /// No cell left for food. Only reachable by filling the board.
    BoardFull,
}

impl CrashReason {
    pub fn label(self) -> &'static str {
        match self {
            CrashReason::Wall => "Hit the wall",
            CrashReason::SelfHit => "Bit your own tail",
            CrashReason::BoardFull => "Board filled up",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    RunStarted,
    Paused,
    Resumed,
    FoodEaten { at: Position, score: u32 },
    Crashed { reason: CrashReason, score: u32 },
    NewHighScore { score: u32 },
}
