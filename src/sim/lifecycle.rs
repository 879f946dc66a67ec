/// Lifecycle controller: idle → playing ⇄ paused, playing → gameOver → playing.
///
/// The transition table is the whole state machine. Pairs not listed are
/// no-ops and `transition` returns `None` for them.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Lifecycle {
    Idle,
    Playing,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Trigger {
    Start,
    Pause,
    Resume,
    Collision,
    Restart,
}

/// What the engine must do alongside a transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Effect {
    InitRun,
    SuspendTicks,
    ResumeTicks,
    EndRun,
}

impl Lifecycle {
    pub fn transition(self, trigger: Trigger) -> Option<(Lifecycle, Effect)> {
        use Effect::*;
        use Lifecycle::*;
        match (self, trigger) {
            (Idle, Trigger::Start) => Some((Playing, InitRun)),
            (Playing, Trigger::Pause) => Some((Paused, SuspendTicks)),
            (Paused, Trigger::Resume) => Some((Playing, ResumeTicks)),
            (Playing, Trigger::Collision) => Some((GameOver, EndRun)),
            (GameOver, Trigger::Restart) => Some((Playing, InitRun)),
            _ => None,
        }
    }

    /// The trigger a context-sensitive toggle (Space) stands for.
    pub fn toggle_trigger(self) -> Trigger {
        match self {
            Lifecycle::Idle => Trigger::Start,
            Lifecycle::Playing => Trigger::Pause,
            Lifecycle::Paused => Trigger::Resume,
            Lifecycle::GameOver => Trigger::Restart,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lifecycle::Idle => "READY",
            Lifecycle::Playing => "PLAYING",
            Lifecycle::Paused => "PAUSED",
            Lifecycle::GameOver => "GAME OVER",
        }
    }

    /// Settings and menus are only reachable between runs.
    pub fn between_runs(self) -> bool {
        matches!(self, Lifecycle::Idle | Lifecycle::GameOver)
    }
}
