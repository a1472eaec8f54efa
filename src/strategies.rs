// Built-in strategies used as self candidates and as opponent models

use std::collections::HashSet;

use parking_lot::Mutex;
use rand::seq::IndexedRandom;

use crate::astar::shortest_path;
use crate::board::{Direction, Point, Snake};
use crate::game_state::GameState;
use crate::movement::{
    best_food, chase_tail, closest_food, closest_kill_tunnel_target, least_bad_move,
    not_immediately_suicidal, not_immediately_suicidal_moves,
};
use crate::strategy::{BranchId, Strategy};

/// Health above which the aggressor hunts instead of eating
const AGGRESSION_HEALTH: i32 = 50;

/// How far the terminator goes to shut a tunnel
const TUNNEL_REACH: u32 = 2;

/// Goes for the nearest food
pub struct Hungry;

impl Strategy for Hungry {
    fn name(&self) -> &str {
        "hungry"
    }

    fn next_move(&self, state: &GameState) -> Direction {
        closest_food(state).unwrap_or_else(|| least_bad_move(state))
    }
}

/// Closes off enemies crawling through a tunnel, otherwise eats
pub struct Terminator;

impl Strategy for Terminator {
    fn name(&self) -> &str {
        "terminator"
    }

    fn next_move(&self, state: &GameState) -> Direction {
        closest_kill_tunnel_target(state, TUNNEL_REACH)
            .or_else(|| closest_food(state))
            .or_else(|| not_immediately_suicidal(state))
            .unwrap_or_else(|| least_bad_move(state))
    }
}

/// Eats only uncontested food, otherwise follows its own tail
pub struct Cautious;

impl Strategy for Cautious {
    fn name(&self) -> &str {
        "cautious"
    }

    fn next_move(&self, state: &GameState) -> Direction {
        best_food(state)
            .or_else(|| chase_tail(state))
            .unwrap_or_else(|| least_bad_move(state))
    }
}

/// Follows its own tail
pub struct TailChaser;

impl Strategy for TailChaser {
    fn name(&self) -> &str {
        "tail-chaser"
    }

    fn next_move(&self, state: &GameState) -> Direction {
        chase_tail(state).unwrap_or_else(|| least_bad_move(state))
    }
}

/// Heads for a free cell next to a target's head while healthy
pub struct Aggressor {
    target: Option<String>,
}

impl Aggressor {
    /// Picks its own target every move
    pub fn new() -> Self {
        Aggressor { target: None }
    }

    /// Always goes after the snake with id `target` while it is alive
    pub fn targeting(target: impl Into<String>) -> Self {
        Aggressor {
            target: Some(target.into()),
        }
    }

    fn pick_target<'a>(&self, state: &'a GameState, me: &Snake) -> Option<&'a Snake> {
        if let Some(id) = &self.target {
            if let Some(fixed) = state.enemies().find(|e| &e.id == id) {
                return Some(fixed);
            }
        }
        let my_head = me.head()?;
        let distance = |s: &Snake| s.head().map(|h| h.manhattan(my_head)).unwrap_or(u32::MAX);

        state
            .enemies()
            .filter(|e| e.len() < me.len())
            .min_by_key(|e| distance(e))
            .or_else(|| state.enemies().min_by_key(|e| e.len()))
    }

    fn cut_off(&self, state: &GameState, me: &Snake, target: &Snake) -> Option<Direction> {
        let my_head = me.head()?;
        let their_head = target.head()?;
        their_head
            .neighbours()
            .iter()
            .copied()
            .filter(|p: &Point| state.is_free(*p))
            .map(|p| shortest_path(my_head, p, state))
            .filter(|p| p.exists())
            .min_by_key(|p| p.len)
            .and_then(|p| p.direction)
    }
}

impl Default for Aggressor {
    fn default() -> Self {
        Aggressor::new()
    }
}

impl Strategy for Aggressor {
    fn name(&self) -> &str {
        "aggressor"
    }

    fn next_move(&self, state: &GameState) -> Direction {
        if let Some(me) = state.me() {
            if me.health > AGGRESSION_HEALTH {
                let hunt = self
                    .pick_target(state, me)
                    .and_then(|target| self.cut_off(state, me, target));
                if let Some(d) = hunt {
                    return d;
                }
            }
        }
        closest_food(state).unwrap_or_else(|| least_bad_move(state))
    }
}

/// Keeps going one way. Inside a branch, once the way is blocked it gives up
/// on it for the rest of that branch and only avoids immediate death.
pub struct OneDirection {
    direction: Direction,
    exhausted: Mutex<HashSet<BranchId>>,
}

impl OneDirection {
    pub fn new(direction: Direction) -> Self {
        OneDirection {
            direction,
            exhausted: Mutex::new(HashSet::new()),
        }
    }

    fn is_open(state: &GameState, direction: Direction) -> bool {
        state
            .me()
            .and_then(|s| s.head())
            .map_or(false, |h| state.is_free(h.step(direction)))
    }

    /// Perpendicular moves first, then back the way it came
    fn detour(&self, state: &GameState) -> Direction {
        let [a, b] = self.direction.perpendicular();
        [a, b, self.direction.opposite()]
            .iter()
            .copied()
            .find(|d| Self::is_open(state, *d))
            .unwrap_or_else(|| least_bad_move(state))
    }
}

impl Strategy for OneDirection {
    fn name(&self) -> &str {
        match self.direction {
            Direction::Up => "one-direction-up",
            Direction::Down => "one-direction-down",
            Direction::Left => "one-direction-left",
            Direction::Right => "one-direction-right",
        }
    }

    fn next_move(&self, state: &GameState) -> Direction {
        if Self::is_open(state, self.direction) {
            self.direction
        } else {
            self.detour(state)
        }
    }

    fn next_move_in_branch(&self, state: &GameState, branch: BranchId) -> Direction {
        if self.exhausted.lock().contains(&branch) {
            return not_immediately_suicidal(state).unwrap_or_else(|| least_bad_move(state));
        }
        if Self::is_open(state, self.direction) {
            return self.direction;
        }
        self.exhausted.lock().insert(branch);
        self.detour(state)
    }
}

/// Any move that does not die right away, chosen uniformly
pub struct RandomSafe;

impl Strategy for RandomSafe {
    fn name(&self) -> &str {
        "random"
    }

    fn next_move(&self, state: &GameState) -> Direction {
        let moves = not_immediately_suicidal_moves(state);
        moves
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or_else(|| least_bad_move(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::World;

    fn state_with(snakes: Vec<Snake>, food: Vec<Point>) -> GameState {
        GameState::new(World {
            id: "strategies".to_string(),
            width: 7,
            height: 7,
            food,
            snakes,
            you: "0".to_string(),
        })
    }

    fn me_at(head: Point) -> Snake {
        Snake::new("0", 100, vec![head, head.step(Direction::Down), head.step(Direction::Down).step(Direction::Down)])
    }

    #[test]
    fn test_hungry_goes_for_food() {
        let state = state_with(vec![me_at(Point::new(3, 3))], vec![Point::new(0, 3)]);
        assert_eq!(Hungry.next_move(&state), Direction::Left);
    }

    #[test]
    fn test_one_direction_remembers_exhausted_branch() {
        // Facing the top wall: up is blocked immediately
        let state = state_with(vec![me_at(Point::new(3, 0))], vec![]);
        let strategy = OneDirection::new(Direction::Up);

        assert_eq!(strategy.next_move_in_branch(&state, 7), Direction::Left);
        assert!(strategy.exhausted.lock().contains(&7));
        assert!(!strategy.exhausted.lock().contains(&8));

        // Open again, but branch 7 has given up on going up
        let open = state_with(vec![me_at(Point::new(3, 3))], vec![]);
        assert_ne!(strategy.next_move_in_branch(&open, 7), Direction::Up);
        assert_eq!(strategy.next_move_in_branch(&open, 8), Direction::Up);
    }

    #[test]
    fn test_aggressor_hunts_smaller_snake_when_healthy() {
        let me = Snake::new(
            "0",
            100,
            vec![Point::new(1, 3), Point::new(1, 4), Point::new(1, 5), Point::new(1, 6)],
        );
        let small = Snake::new("1", 100, vec![Point::new(5, 3), Point::new(6, 3)]);
        let state = state_with(vec![me, small], vec![Point::new(1, 0)]);
        assert_eq!(Aggressor::new().next_move(&state), Direction::Right);
    }

    #[test]
    fn test_aggressor_eats_when_hungry() {
        let mut me = Snake::new(
            "0",
            100,
            vec![Point::new(1, 3), Point::new(1, 4), Point::new(1, 5), Point::new(1, 6)],
        );
        me.health = 20;
        let small = Snake::new("1", 100, vec![Point::new(5, 3), Point::new(6, 3)]);
        let state = state_with(vec![me, small], vec![Point::new(1, 0)]);
        assert_eq!(Aggressor::targeting("1").next_move(&state), Direction::Up);
    }

    #[test]
    fn test_terminator_shuts_tunnel_before_eating() {
        let mut me_parts = vec![Point::new(1, 0)];
        me_parts.extend((1..5).map(|y| Point::new(1, y)));
        let me = Snake::new("0", 100, me_parts);
        let crawler = Snake::new("1", 100, vec![Point::new(0, 3), Point::new(0, 4), Point::new(0, 5)]);
        let state = state_with(vec![me, crawler], vec![Point::new(3, 0)]);

        assert_eq!(Terminator.next_move(&state), Direction::Left);
        assert_eq!(Hungry.next_move(&state), Direction::Right);
    }

    #[test]
    fn test_terminator_eats_without_a_tunnel() {
        let state = state_with(vec![me_at(Point::new(3, 3))], vec![Point::new(6, 3)]);
        assert_eq!(Terminator.next_move(&state), Direction::Right);
    }

    #[test]
    fn test_random_safe_never_picks_a_blocked_move() {
        let state = state_with(vec![me_at(Point::new(0, 0))], vec![]);
        for _ in 0..20 {
            assert_eq!(RandomSafe.next_move(&state), Direction::Right);
        }
    }
}
