/// One simulation tick.
///
/// Order inside a tick is fixed:
///   1. head target from the (already committed) direction
///   2. wall check          → crash, body untouched
///   3. self check          → crash, body untouched (vacating tail excluded)
///   4. push head
///   5. food → score, speed, respawn, keep tail
///   6. otherwise drop tail
///
/// Terminal side effects (sound, score hand-off, lifecycle) belong to the
/// engine; this module only reports what happened.

use log::warn;
use rand::Rng;

use crate::domain::food::place_food;
use crate::sim::event::CrashReason;
use crate::sim::world::RunState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    Moved,
    Ate,
    Crashed(CrashReason),
}

pub fn step<R: Rng + ?Sized>(run: &mut RunState, rng: &mut R) -> StepOutcome {
    let target = run.snake.next_head(run.direction);

    if !run.grid.contains(target) {
        return StepOutcome::Crashed(CrashReason::Wall);
    }

    let eating = target == run.food.pos;
    if run.snake.hits_body(target, eating) {
        return StepOutcome::Crashed(CrashReason::SelfHit);
    }

    run.snake.advance(target, eating);
    run.ticks += 1;

    if !eating {
        return StepOutcome::Moved;
    }

    run.score += 1;
    run.interval = run
        .interval
        .saturating_sub(run.params.decrement)
        .max(run.params.min_interval);

    match place_food(rng, run.grid, &run.snake, run.params.food_attempts) {
        Ok(food) => {
            run.food = food;
            StepOutcome::Ate
        }
        Err(e) => {
            warn!("food placement failed after {} points: {e}", run.score);
            StepOutcome::Crashed(CrashReason::BoardFull)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::food::{Food, FoodKind};
    use crate::domain::grid::{Direction, Position};
    use crate::domain::snake::Snake;
    use crate::sim::world::RunParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn run_with(segments: &[Position], dir: Direction, food: Position) -> (RunState, StdRng) {
        let mut rng = StdRng::seed_from_u64(99);
        let mut run = RunState::new(RunParams::for_tests(20), &mut rng);
        run.snake = Snake::from_segments(segments).unwrap();
        run.direction = dir;
        run.food = Food { pos: food, kind: FoodKind::Cherry };
        (run, rng)
    }

    #[test]
    fn plain_move_keeps_length_and_score() {
        let (mut run, mut rng) = run_with(&[p(10, 10), p(9, 10), p(8, 10)], Direction::Right, p(3, 3));
        assert_eq!(step(&mut run, &mut rng), StepOutcome::Moved);
        assert_eq!(run.head(), p(11, 10));
        assert_eq!(run.snake.len(), 3);
        assert!(!run.snake.occupies(p(8, 10)));
        assert_eq!(run.score, 0);
        assert_eq!(run.interval, Duration::from_millis(150));
    }

    #[test]
    fn single_segment_move() {
        let (mut run, mut rng) = run_with(&[p(10, 10)], Direction::Right, p(0, 0));
        assert_eq!(step(&mut run, &mut rng), StepOutcome::Moved);
        assert_eq!(run.head(), p(11, 10));
        assert_eq!(run.snake.len(), 1);
    }

    #[test]
    fn wall_crash_leaves_snake_untouched() {
        let (mut run, mut rng) = run_with(&[p(19, 10), p(18, 10)], Direction::Right, p(0, 0));
        let before: Vec<Position> = run.snake.segments().collect();
        assert_eq!(step(&mut run, &mut rng), StepOutcome::Crashed(CrashReason::Wall));
        let after: Vec<Position> = run.snake.segments().collect();
        assert_eq!(before, after);
        assert_eq!(run.ticks, 0);
    }

    #[test]
    fn walls_on_every_side() {
        for (head, dir) in [
            (p(0, 5), Direction::Left),
            (p(5, 0), Direction::Up),
            (p(5, 19), Direction::Down),
            (p(19, 5), Direction::Right),
        ] {
            let (mut run, mut rng) = run_with(&[head], dir, p(10, 10));
            assert_eq!(step(&mut run, &mut rng), StepOutcome::Crashed(CrashReason::Wall));
        }
    }

    #[test]
    fn self_crash_leaves_snake_untouched() {
        // Head at (5,5) heading up into (5,4), which is mid-body.
        let body = [p(5, 5), p(6, 5), p(6, 4), p(5, 4), p(4, 4)];
        let (mut run, mut rng) = run_with(&body, Direction::Up, p(0, 0));
        assert_eq!(step(&mut run, &mut rng), StepOutcome::Crashed(CrashReason::SelfHit));
        let after: Vec<Position> = run.snake.segments().collect();
        assert_eq!(after, body.to_vec());
    }

    #[test]
    fn chasing_own_tail_is_legal() {
        // 2×2 loop; moving left enters the cell the tail vacates this tick.
        let body = [p(1, 1), p(1, 0), p(0, 0), p(0, 1)];
        let (mut run, mut rng) = run_with(&body, Direction::Left, p(10, 10));
        assert_eq!(step(&mut run, &mut rng), StepOutcome::Moved);
        assert_eq!(run.head(), p(0, 1));
        assert_eq!(run.snake.len(), 4);
        assert!(run.snake.is_well_formed());
    }

    #[test]
    fn eating_grows_scores_and_speeds_up() {
        let (mut run, mut rng) = run_with(&[p(10, 10), p(9, 10)], Direction::Right, p(11, 10));
        assert_eq!(step(&mut run, &mut rng), StepOutcome::Ate);
        assert_eq!(run.score, 1);
        assert_eq!(run.snake.len(), 3);
        assert_eq!(run.interval, Duration::from_millis(148));
        assert!(!run.snake.occupies(run.food.pos));
        assert!(run.grid.contains(run.food.pos));
    }

    #[test]
    fn interval_clamps_at_floor() {
        let (mut run, mut rng) = run_with(&[p(10, 10)], Direction::Right, p(11, 10));
        run.interval = Duration::from_millis(51);
        assert_eq!(step(&mut run, &mut rng), StepOutcome::Ate);
        assert_eq!(run.interval, Duration::from_millis(50));

        run.food = Food { pos: p(12, 10), kind: FoodKind::Apple };
        assert_eq!(step(&mut run, &mut rng), StepOutcome::Ate);
        assert_eq!(run.interval, Duration::from_millis(50));
    }

    #[test]
    fn filling_the_board_is_a_forced_crash() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut params = RunParams::for_tests(2);
        params.food_attempts = 4;
        let mut run = RunState::new(params, &mut rng);
        // Three cells of a 2×2 board occupied, food on the fourth.
        run.snake = Snake::from_segments(&[p(1, 1), p(1, 0), p(0, 0)]).unwrap();
        run.direction = Direction::Left;
        run.food = Food { pos: p(0, 1), kind: FoodKind::Grape };
        assert_eq!(step(&mut run, &mut rng), StepOutcome::Crashed(CrashReason::BoardFull));
        assert_eq!(run.score, 1);
        assert_eq!(run.snake.len(), 4);
    }

    #[test]
    fn random_walk_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut run = RunState::new(RunParams::for_tests(12), &mut rng);
        let mut last_score = 0;
        let mut last_interval = run.interval;

        for _ in 0..5_000 {
            // Prefer a direction that keeps the snake alive so runs get long.
            let safe: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|d| !d.is_opposite(run.direction))
                .filter(|d| {
                    let t = run.snake.next_head(*d);
                    run.grid.contains(t) && !run.snake.hits_body(t, t == run.food.pos)
                })
                .collect();
            if let Some(&d) = safe.get(rng.random_range(0..safe.len().max(1))) {
                run.request_direction(d);
            }
            let before = run.head();
            let dir = run.commit_direction();
            match step(&mut run, &mut rng) {
                StepOutcome::Crashed(_) => break,
                outcome => {
                    assert_eq!(run.head(), before.step(dir));
                    assert!(run.snake.is_well_formed());
                    assert!(!run.snake.occupies(run.food.pos));
                    assert!(run.score >= last_score);
                    assert!(run.interval <= last_interval);
                    assert!(run.interval >= run.params.min_interval);
                    if outcome == StepOutcome::Ate {
                        assert_eq!(run.score, last_score + 1);
                    }
                    last_score = run.score;
                    last_interval = run.interval;
                }
            }
        }
    }
}
