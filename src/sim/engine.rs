/// Game engine: routes commands, drives the tick scheduler and owns the run.
///
/// The host feeds it two things: commands (`handle_command`) as input
/// arrives, and the frame clock (`on_tick`) once per frame. Everything the
/// presentation layer needs to react to comes back through `drain_events`.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::StdRng;

use crate::config::{GameConfig, GridConfig, SpeedConfig};
use crate::domain::grid::{Direction, Grid, SizeClass};
use crate::sim::event::{CrashReason, GameEvent};
use crate::sim::lifecycle::{Effect, Lifecycle, Trigger};
use crate::sim::scheduler::TickScheduler;
use crate::sim::step::{step, StepOutcome};
use crate::sim::world::{RunParams, RunState};
use crate::store::profile::{Profile, Settings};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Turn(Direction),
    /// Space: start, pause, resume or restart depending on the lifecycle.
    Toggle,
    Start,
    Pause,
    Resume,
    Restart,
}

pub struct Engine {
    lifecycle: Lifecycle,
    run: RunState,
    scheduler: TickScheduler,
    speed: SpeedConfig,
    grid: GridConfig,
    food_attempts: u32,
    restart_guard: Duration,
    profile: Profile,
    rng: StdRng,
    viewport_cols: u16,
    guard_until: Option<Instant>,
    last_crash: Option<CrashReason>,
    events: VecDeque<GameEvent>,
}

impl Engine {
    pub fn new(config: &GameConfig, profile: Profile, mut rng: StdRng, viewport_cols: u16) -> Self {
        let params = run_params(&config.speed, &config.grid, config.engine.food_attempts, profile.settings(), viewport_cols);
        let run = RunState::new(params, &mut rng);
        Engine {
            lifecycle: Lifecycle::Idle,
            run,
            scheduler: TickScheduler::new(),
            speed: config.speed.clone(),
            grid: config.grid.clone(),
            food_attempts: config.engine.food_attempts,
            restart_guard: Duration::from_millis(config.engine.restart_guard_ms),
            profile,
            rng,
            viewport_cols,
            guard_until: None,
            last_crash: None,
            events: VecDeque::new(),
        }
    }

    // ── Accessors ──

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn high_score(&self) -> u32 {
        self.profile.high_score()
    }

    pub fn settings(&self) -> Settings {
        self.profile.settings()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    pub fn last_crash(&self) -> Option<CrashReason> {
        self.last_crash
    }

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Viewport width in terminal columns; takes effect at the next run start.
    pub fn set_viewport_cols(&mut self, cols: u16) {
        self.viewport_cols = cols;
    }

    /// Change settings between runs. The idle preview board is rebuilt so a
    /// grid size change shows up immediately.
    pub fn update_settings(&mut self, change: impl FnOnce(&mut Settings)) -> bool {
        if !self.lifecycle.between_runs() {
            return false;
        }
        self.profile.update_settings(change);
        if self.lifecycle == Lifecycle::Idle {
            self.run = RunState::new(self.params(), &mut self.rng);
        }
        true
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    // ── Input Router ──

    pub fn handle_command(&mut self, cmd: Command, now: Instant) {
        let trigger = match cmd {
            Command::Turn(dir) => {
                if self.lifecycle == Lifecycle::Playing && !self.run.request_direction(dir) {
                    debug!("reversal {dir:?} against {:?} discarded", self.run.direction);
                }
                return;
            }
            Command::Toggle => self.lifecycle.toggle_trigger(),
            Command::Start => Trigger::Start,
            Command::Pause => Trigger::Pause,
            Command::Resume => Trigger::Resume,
            Command::Restart => Trigger::Restart,
        };

        let guarded = matches!(cmd, Command::Toggle | Command::Start | Command::Restart);
        if guarded && self.guard_until.is_some_and(|until| now < until) {
            debug!("{cmd:?} dropped inside the restart guard window");
            return;
        }

        self.fire(trigger, now);
    }

    // ── Tick Scheduler ──

    /// Called once per frame. Runs at most one simulation step.
    pub fn on_tick(&mut self, now: Instant) {
        if !self.scheduler.is_running() {
            return;
        }
        if self.lifecycle != Lifecycle::Playing {
            debug!("stale tick while {:?}; stopping scheduler", self.lifecycle);
            self.scheduler.stop();
            return;
        }
        if !self.scheduler.due(now, self.run.interval) {
            return;
        }

        self.run.commit_direction();
        match step(&mut self.run, &mut self.rng) {
            StepOutcome::Moved => {}
            StepOutcome::Ate => self.events.push_back(GameEvent::FoodEaten {
                at: self.run.head(),
                score: self.run.score,
            }),
            StepOutcome::Crashed(reason) => {
                self.last_crash = Some(reason);
                self.events.push_back(GameEvent::Crashed { reason, score: self.run.score });
                self.fire(Trigger::Collision, now);
            }
        }
    }

    // ── Lifecycle ──

    fn fire(&mut self, trigger: Trigger, now: Instant) -> bool {
        let Some((next, effect)) = self.lifecycle.transition(trigger) else {
            debug!("{trigger:?} ignored while {:?}", self.lifecycle);
            return false;
        };
        self.lifecycle = next;

        match effect {
            Effect::InitRun => {
                self.run = RunState::new(self.params(), &mut self.rng);
                self.last_crash = None;
                self.scheduler.stop();
                self.scheduler.start(now);
                // Only a restart arms the guard; a pause right after a fresh
                // start from Idle goes through.
                self.guard_until = (trigger == Trigger::Restart).then(|| now + self.restart_guard);
                info!(
                    "run started: {0}x{0} board, {1} ms tick",
                    self.run.grid.size,
                    self.run.interval.as_millis()
                );
                self.events.push_back(GameEvent::RunStarted);
            }
            Effect::SuspendTicks => {
                self.scheduler.stop();
                self.events.push_back(GameEvent::Paused);
            }
            Effect::ResumeTicks => {
                self.scheduler.start(now);
                self.events.push_back(GameEvent::Resumed);
            }
            Effect::EndRun => {
                self.scheduler.stop();
                let score = self.run.score;
                self.profile.stage_last_score(score);
                if self.profile.record_score(score) {
                    self.events.push_back(GameEvent::NewHighScore { score });
                }
                info!(
                    "game over ({:?}) with {score} points after {} ticks",
                    self.last_crash, self.run.ticks
                );
            }
        }
        true
    }

    fn params(&self) -> RunParams {
        run_params(&self.speed, &self.grid, self.food_attempts, self.profile.settings(), self.viewport_cols)
    }
}

/// Resolve per-run tuning. Board size follows the viewport class: narrow
/// terminals get the compact board, everything else the preferred size.
fn run_params(speed: &SpeedConfig, grid: &GridConfig, food_attempts: u32, settings: Settings, viewport_cols: u16) -> RunParams {
    let size = match SizeClass::for_viewport(viewport_cols, grid.compact_breakpoint_cols) {
        SizeClass::Compact => grid.compact,
        SizeClass::Standard => grid.standard_size(settings.grid_size),
    };
    RunParams {
        grid: Grid::new(size),
        initial_interval: speed.initial_interval(settings.game_speed),
        decrement: speed.decrement(),
        min_interval: speed.floor(),
        food_attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::food::{Food, FoodKind};
    use crate::domain::grid::Position;
    use crate::domain::snake::Snake;
    use crate::store::kv::MemoryStore;
    use crate::store::profile::{GridSize, SpeedLevel};
    use rand::SeedableRng;

    const WIDE: u16 = 120;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn engine() -> Engine {
        engine_with_cols(WIDE)
    }

    fn engine_with_cols(cols: u16) -> Engine {
        let profile = Profile::load(Box::new(MemoryStore::new()));
        Engine::new(&GameConfig::default(), profile, StdRng::seed_from_u64(7), cols)
    }

    fn park_food(e: &mut Engine, pos: Position) {
        e.run.food = Food { pos, kind: FoodKind::Apple };
    }

    fn started(t0: Instant) -> Engine {
        let mut e = engine();
        e.handle_command(Command::Toggle, t0);
        assert_eq!(e.lifecycle(), Lifecycle::Playing);
        park_food(&mut e, Position::new(0, 0));
        e
    }

    #[test]
    fn idle_engine_does_not_tick() {
        let t0 = Instant::now();
        let mut e = engine();
        let head = e.run().head();
        e.on_tick(t0 + ms(10_000));
        assert_eq!(e.run().head(), head);
        assert_eq!(e.lifecycle(), Lifecycle::Idle);
        assert!(!e.is_ticking());
    }

    #[test]
    fn first_tick_moves_right_from_center() {
        let t0 = Instant::now();
        let mut e = started(t0);
        assert_eq!(e.run().head(), Position::new(10, 10));
        e.on_tick(t0 + ms(149));
        assert_eq!(e.run().head(), Position::new(10, 10));
        e.on_tick(t0 + ms(150));
        assert_eq!(e.run().head(), Position::new(11, 10));
        assert_eq!(e.run().snake.len(), 1);
    }

    #[test]
    fn wall_hit_ends_the_run_without_moving() {
        let t0 = Instant::now();
        let mut e = started(t0);
        e.run.snake = Snake::from_segments(&[Position::new(19, 10)]).unwrap();
        e.drain_events();

        e.on_tick(t0 + ms(150));
        assert_eq!(e.lifecycle(), Lifecycle::GameOver);
        assert_eq!(e.run().head(), Position::new(19, 10));
        assert_eq!(e.run().snake.len(), 1);
        assert!(!e.is_ticking());
        assert_eq!(e.last_crash(), Some(CrashReason::Wall));
        assert_eq!(
            e.drain_events(),
            vec![GameEvent::Crashed { reason: CrashReason::Wall, score: 0 }]
        );
        assert_eq!(e.profile().last_score(), Some(0));

        // Later frames change nothing.
        e.on_tick(t0 + ms(10_000));
        assert_eq!(e.run().head(), Position::new(19, 10));
    }

    #[test]
    fn eating_grows_scores_and_speeds_up() {
        let t0 = Instant::now();
        let mut e = started(t0);
        park_food(&mut e, Position::new(11, 10));
        e.drain_events();

        e.on_tick(t0 + ms(150));
        assert_eq!(e.run().score, 1);
        assert_eq!(e.run().snake.len(), 2);
        assert_eq!(e.run().interval, ms(148));
        assert_ne!(e.run().food.pos, Position::new(11, 10));
        assert_eq!(
            e.drain_events(),
            vec![GameEvent::FoodEaten { at: Position::new(11, 10), score: 1 }]
        );

        // The faster interval applies to the very next tick.
        e.on_tick(t0 + ms(150 + 147));
        assert_eq!(e.run().head(), Position::new(11, 10));
        e.on_tick(t0 + ms(150 + 148));
        assert_eq!(e.run().head(), Position::new(12, 10));
    }

    #[test]
    fn crash_records_high_score_and_stages_last_score() {
        let t0 = Instant::now();
        let mut e = started(t0);
        e.run.score = 7;
        e.run.snake = Snake::from_segments(&[Position::new(19, 3)]).unwrap();
        e.drain_events();

        e.on_tick(t0 + ms(150));
        let events = e.drain_events();
        assert_eq!(events.last(), Some(&GameEvent::NewHighScore { score: 7 }));
        assert_eq!(e.high_score(), 7);
        assert_eq!(e.profile().last_score(), Some(7));
    }

    #[test]
    fn turns_apply_on_the_next_tick_and_reversals_are_dropped() {
        let t0 = Instant::now();
        let mut e = started(t0);
        e.handle_command(Command::Turn(Direction::Left), t0 + ms(10));
        e.on_tick(t0 + ms(150));
        assert_eq!(e.run().head(), Position::new(11, 10));

        e.handle_command(Command::Turn(Direction::Down), t0 + ms(160));
        e.on_tick(t0 + ms(300));
        assert_eq!(e.run().head(), Position::new(11, 11));
        assert_eq!(e.run().direction, Direction::Down);
    }

    #[test]
    fn turns_outside_play_are_ignored() {
        let t0 = Instant::now();
        let mut e = engine();
        e.handle_command(Command::Turn(Direction::Up), t0);
        assert_eq!(e.run().pending, None);

        let mut e = started(t0);
        e.handle_command(Command::Pause, t0 + ms(200));
        e.handle_command(Command::Turn(Direction::Up), t0 + ms(210));
        assert_eq!(e.run().pending, None);
    }

    #[test]
    fn pause_suspends_and_resume_reanchors() {
        let t0 = Instant::now();
        let mut e = started(t0);
        e.handle_command(Command::Toggle, t0 + ms(200));
        assert_eq!(e.lifecycle(), Lifecycle::Paused);
        assert!(!e.is_ticking());

        e.on_tick(t0 + ms(5_000));
        assert_eq!(e.run().head(), Position::new(10, 10));

        e.handle_command(Command::Toggle, t0 + ms(6_000));
        assert_eq!(e.lifecycle(), Lifecycle::Playing);
        e.on_tick(t0 + ms(6_100));
        assert_eq!(e.run().head(), Position::new(10, 10));
        e.on_tick(t0 + ms(6_150));
        assert_eq!(e.run().head(), Position::new(11, 10));
        assert_eq!(
            e.drain_events(),
            vec![GameEvent::RunStarted, GameEvent::Paused, GameEvent::Resumed]
        );
    }

    #[test]
    fn duplicate_toggle_after_restart_is_dropped() {
        let t0 = Instant::now();
        let mut e = started(t0);
        e.run.snake = Snake::from_segments(&[Position::new(19, 10)]).unwrap();
        e.on_tick(t0 + ms(150));
        assert_eq!(e.lifecycle(), Lifecycle::GameOver);

        let t1 = t0 + ms(1_000);
        e.handle_command(Command::Toggle, t1);
        e.handle_command(Command::Toggle, t1 + ms(5));
        assert_eq!(e.lifecycle(), Lifecycle::Playing);

        // Outside the window a toggle pauses as usual.
        e.handle_command(Command::Toggle, t1 + ms(100));
        assert_eq!(e.lifecycle(), Lifecycle::Paused);
    }

    #[test]
    fn pause_right_after_first_start_goes_through() {
        let t0 = Instant::now();
        let mut e = engine();
        e.handle_command(Command::Toggle, t0);
        e.handle_command(Command::Toggle, t0 + ms(5));
        assert_eq!(e.lifecycle(), Lifecycle::Paused);
    }

    #[test]
    fn double_restart_yields_one_fresh_run() {
        let t0 = Instant::now();
        let mut e = started(t0);
        e.run.score = 3;
        e.run.snake = Snake::from_segments(&[Position::new(19, 10)]).unwrap();
        e.on_tick(t0 + ms(150));
        assert_eq!(e.lifecycle(), Lifecycle::GameOver);
        e.drain_events();

        let t1 = t0 + ms(1_000);
        e.handle_command(Command::Restart, t1);
        park_food(&mut e, Position::new(0, 0));
        e.handle_command(Command::Restart, t1 + ms(3));
        e.handle_command(Command::Toggle, t1 + ms(4));

        assert_eq!(e.lifecycle(), Lifecycle::Playing);
        assert_eq!(e.run().score, 0);
        assert_eq!(e.run().snake.len(), 1);
        assert_eq!(e.run().head(), Position::new(10, 10));
        assert_eq!(e.run().interval, ms(150));
        assert_eq!(e.run().food.pos, Position::new(0, 0));
        assert_eq!(e.drain_events(), vec![GameEvent::RunStarted]);
    }

    #[test]
    fn stale_tick_stops_scheduler_without_mutation() {
        let t0 = Instant::now();
        let mut e = started(t0);
        // Force the inconsistent pair a late frame could observe.
        e.lifecycle = Lifecycle::Paused;
        e.on_tick(t0 + ms(500));
        assert!(!e.is_ticking());
        assert_eq!(e.run().head(), Position::new(10, 10));
        assert_eq!(e.run().ticks, 0);
    }

    #[test]
    fn noop_commands_leave_state_alone() {
        let t0 = Instant::now();
        let mut e = engine();
        e.handle_command(Command::Pause, t0);
        e.handle_command(Command::Resume, t0);
        e.handle_command(Command::Restart, t0);
        assert_eq!(e.lifecycle(), Lifecycle::Idle);
        assert!(e.drain_events().is_empty());
    }

    #[test]
    fn settings_apply_at_next_run() {
        let t0 = Instant::now();
        let mut e = engine();
        assert!(e.update_settings(|s| {
            s.game_speed = SpeedLevel::Hard;
            s.grid_size = GridSize::Large;
        }));
        assert_eq!(e.run().grid.size, 25);

        e.handle_command(Command::Start, t0);
        assert_eq!(e.run().interval, ms(100));
        assert_eq!(e.run().head(), Position::new(12, 12));
        assert!(!e.update_settings(|s| s.sound_enabled = false));
        assert!(e.settings().sound_enabled);
    }

    #[test]
    fn narrow_viewport_uses_compact_board() {
        let t0 = Instant::now();
        let mut e = engine_with_cols(40);
        e.handle_command(Command::Start, t0);
        assert_eq!(e.run().grid.size, 15);

        // Resizing mid-run waits for the next run.
        e.set_viewport_cols(WIDE);
        assert_eq!(e.run().grid.size, 15);
    }

    #[test]
    fn long_random_session_keeps_invariants() {
        let mut e = engine();
        let mut now = Instant::now();
        let mut dirs = [Direction::Up, Direction::Left, Direction::Down, Direction::Right].iter().cycle();
        e.handle_command(Command::Start, now);

        for frame in 0..20_000u32 {
            now += ms(16);
            if frame % 23 == 0 {
                if let Some(&d) = dirs.next() {
                    e.handle_command(Command::Turn(d), now);
                }
            }
            let before = e.run().score;
            e.on_tick(now);
            let run = e.run();
            assert!(run.score >= before);
            assert!(!run.snake.occupies(run.food.pos) || e.lifecycle() == Lifecycle::GameOver);
            assert!(run.snake.is_well_formed());
            if e.lifecycle() == Lifecycle::GameOver {
                now += ms(500);
                e.handle_command(Command::Toggle, now);
                assert_eq!(e.run().score, 0);
            }
        }
    }
}
