// Tick advance: applies one simultaneous move of every listed snake to a world
//
// Order of resolution within a tick:
// 1. heads move forward (unlisted snakes stay put)
// 2. food is eaten or contested
// 3. head-to-head, body, wall and starvation deaths are marked
// 4. dead snakes are removed

use std::collections::HashMap;

use crate::board::{Direction, Point, World};
use crate::simple_profiler::{Category, ProfileGuard};

/// Health rules of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ruleset {
    pub health_on_food: i32,
    pub health_loss_per_turn: i32,
}

impl Default for Ruleset {
    fn default() -> Self {
        Ruleset {
            health_on_food: 100,
            health_loss_per_turn: 1,
        }
    }
}

/// One snake's move for a tick. `snake` indexes `World::snakes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakeMove {
    pub snake: usize,
    pub direction: Direction,
}

impl SnakeMove {
    pub fn new(snake: usize, direction: Direction) -> Self {
        SnakeMove { snake, direction }
    }
}

/// Produces the world one tick after `world` given `moves`.
///
/// The input is left untouched; snake order is preserved apart from the
/// removal of dead snakes.
pub fn apply_moves(world: &World, moves: &[SnakeMove], rules: &Ruleset) -> World {
    let _guard = ProfileGuard::new(Category::ApplyMoves);

    let mut next = world.clone();
    let moved = move_heads_forward(&mut next, moves, rules);
    eat_food_or_die(&mut next, &moved, rules);
    mark_crashers_dead(&mut next);
    next.snakes.retain(|s| !s.dead);
    next
}

fn move_heads_forward(world: &mut World, moves: &[SnakeMove], rules: &Ruleset) -> Vec<bool> {
    let mut moved = vec![false; world.snakes.len()];
    for mv in moves {
        let snake = match world.snakes.get_mut(mv.snake) {
            Some(s) if !s.is_empty() && !moved[mv.snake] => s,
            _ => continue,
        };
        let head = snake.parts[0];
        snake.parts.insert(0, head.step(mv.direction));
        snake.health -= rules.health_loss_per_turn;
        moved[mv.snake] = true;
    }
    moved
}

fn eat_food_or_die(world: &mut World, moved: &[bool], rules: &Ruleset) {
    let mut ate = vec![false; world.snakes.len()];
    let mut remaining_food = Vec::with_capacity(world.food.len());

    for &food in &world.food {
        let contenders: Vec<usize> = world
            .snakes
            .iter()
            .enumerate()
            .filter(|(i, s)| moved[*i] && s.head() == Some(food))
            .map(|(i, _)| i)
            .collect();

        if contenders.is_empty() {
            remaining_food.push(food);
            continue;
        }

        let longest = contenders
            .iter()
            .map(|&i| world.snakes[i].len())
            .max()
            .unwrap_or(0);
        let winners: Vec<usize> = contenders
            .iter()
            .copied()
            .filter(|&i| world.snakes[i].len() == longest)
            .collect();

        if winners.len() == 1 {
            ate[winners[0]] = true;
            for &i in contenders.iter().filter(|&&i| i != winners[0]) {
                world.snakes[i].dead = true;
            }
        } else {
            for &i in &contenders {
                world.snakes[i].dead = true;
            }
            remaining_food.push(food);
        }
    }
    world.food = remaining_food;

    for (i, snake) in world.snakes.iter_mut().enumerate() {
        if !moved[i] {
            continue;
        }
        if ate[i] {
            // The tail stays behind for a tick: the last segment is doubled.
            let n = snake.parts.len();
            if n >= 2 {
                snake.parts[n - 1] = snake.parts[n - 2];
            }
            snake.health = rules.health_on_food;
        } else {
            snake.parts.pop();
        }
    }
}

fn mark_crashers_dead(world: &mut World) {
    let mut heads: HashMap<Point, Vec<usize>> = HashMap::new();
    for (i, snake) in world.snakes.iter().enumerate() {
        if let Some(head) = snake.head() {
            if !snake.dead {
                heads.entry(head).or_default().push(i);
            }
        }
    }

    let bodies: std::collections::HashSet<Point> = world
        .snakes
        .iter()
        .flat_map(|s| s.parts.iter().skip(1).copied())
        .collect();

    let mut dead = vec![false; world.snakes.len()];
    for group in heads.values().filter(|g| g.len() > 1) {
        let longest = group.iter().map(|&i| world.snakes[i].len()).max().unwrap_or(0);
        let survivors = group
            .iter()
            .filter(|&&i| world.snakes[i].len() == longest)
            .count();
        for &i in group {
            if survivors > 1 || world.snakes[i].len() < longest {
                dead[i] = true;
            }
        }
    }

    for (i, snake) in world.snakes.iter().enumerate() {
        let head = match snake.head() {
            Some(h) => h,
            None => {
                dead[i] = true;
                continue;
            }
        };
        if !world.in_bounds(head) || bodies.contains(&head) || snake.health <= 0 {
            dead[i] = true;
        }
    }

    for (snake, is_dead) in world.snakes.iter_mut().zip(dead) {
        if is_dead {
            snake.dead = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Snake;

    fn world(snakes: Vec<Snake>, food: Vec<Point>) -> World {
        World {
            id: "rules".to_string(),
            width: 7,
            height: 7,
            food,
            snakes,
            you: "0".to_string(),
        }
    }

    fn line(id: &str, head: (i32, i32), len: i32) -> Snake {
        // Body trails to the left of the head
        let parts = (0..len).map(|i| Point::new(head.0 - i, head.1)).collect();
        Snake::new(id, 100, parts)
    }

    #[test]
    fn test_plain_move_shifts_head_and_tail() {
        let w = world(vec![line("0", (3, 3), 3)], vec![]);
        let next = apply_moves(&w, &[SnakeMove::new(0, Direction::Right)], &Ruleset::default());

        assert_eq!(
            next.snakes[0].parts,
            vec![Point::new(4, 3), Point::new(3, 3), Point::new(2, 3)]
        );
        assert_eq!(next.snakes[0].health, 99);
        // Input is not modified
        assert_eq!(w.snakes[0].parts[0], Point::new(3, 3));
    }

    #[test]
    fn test_unlisted_snake_is_left_alone() {
        let w = world(vec![line("0", (3, 1), 3), line("1", (3, 5), 3)], vec![]);
        let next = apply_moves(&w, &[SnakeMove::new(0, Direction::Right)], &Ruleset::default());

        assert_eq!(next.snakes[1], w.snakes[1]);
    }

    #[test]
    fn test_eating_doubles_tail_and_restores_health() {
        let mut snake = line("0", (3, 3), 3);
        snake.health = 40;
        let w = world(vec![snake], vec![Point::new(4, 3)]);
        let next = apply_moves(&w, &[SnakeMove::new(0, Direction::Right)], &Ruleset::default());

        assert!(next.food.is_empty());
        assert_eq!(
            next.snakes[0].parts,
            vec![Point::new(4, 3), Point::new(3, 3), Point::new(2, 3), Point::new(2, 3)]
        );
        assert_eq!(next.snakes[0].health, 100);
    }

    #[test]
    fn test_starving_snake_dies() {
        let mut snake = line("0", (3, 3), 3);
        snake.health = 1;
        let w = world(vec![snake], vec![]);
        let next = apply_moves(&w, &[SnakeMove::new(0, Direction::Right)], &Ruleset::default());

        assert!(next.snakes.is_empty());
    }

    #[test]
    fn test_wall_kills() {
        let w = world(vec![line("0", (6, 3), 3)], vec![]);
        let next = apply_moves(&w, &[SnakeMove::new(0, Direction::Right)], &Ruleset::default());

        assert!(next.snakes.is_empty());
    }

    #[test]
    fn test_reversing_into_neck_kills() {
        let w = world(vec![line("0", (3, 3), 3)], vec![]);
        let next = apply_moves(&w, &[SnakeMove::new(0, Direction::Left)], &Ruleset::default());

        assert!(next.snakes.is_empty());
    }
}
