// Time-aware A* over the occupancy grid
//
// A cell may be entered only once its occupant has left by the time the
// path gets there: `turns_until_vacant(cell) < ticks elapsed`. The start
// node counts as tick 1.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::warn;

use crate::board::{Direction, Point};
use crate::game_state::GameState;
use crate::simple_profiler::{Category, ProfileGuard};

/// Extra cost of a first step next to the head of an enemy at least as long as us
pub const VERY_HIGH_COST: u32 = 1000;
/// Node pops before the search gives up
pub const MAX_ITERATIONS: usize = 10_000;

/// Result of a search: number of steps and the first one to take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Path {
    pub len: u32,
    pub direction: Option<Direction>,
}

impl Path {
    pub fn none() -> Self {
        Path {
            len: 0,
            direction: None,
        }
    }

    pub fn exists(&self) -> bool {
        self.direction.is_some()
    }
}

#[derive(Default)]
struct Scratch {
    open: BinaryHeap<Reverse<(u32, u64, usize)>>,
    closed: HashSet<usize>,
    came_from: HashMap<usize, usize>,
    g_score: HashMap<usize, u32>,
    f_score: HashMap<usize, u32>,
    turns: HashMap<usize, u32>,
}

impl Scratch {
    fn clear(&mut self) {
        self.open.clear();
        self.closed.clear();
        self.came_from.clear();
        self.g_score.clear();
        self.f_score.clear();
        self.turns.clear();
    }
}

thread_local! {
    static SCRATCH: RefCell<Scratch> = RefCell::new(Scratch::default());
}

/// Shortest safe path from `start` to `goal` for the state's self snake.
///
/// Returns `Path::none()` when the goal is unreachable, out of bounds, equal
/// to the start, or the search hits `MAX_ITERATIONS`.
pub fn shortest_path(start: Point, goal: Point, state: &GameState) -> Path {
    shortest_path_bounded(start, goal, state, MAX_ITERATIONS)
}

/// `shortest_path` giving up after `max_iterations` node pops
pub fn shortest_path_bounded(
    start: Point,
    goal: Point,
    state: &GameState,
    max_iterations: usize,
) -> Path {
    let _guard = ProfileGuard::new(Category::Pathfinding);

    let world = state.world();
    let (start_idx, goal_idx) = match (world.index_of(start), world.index_of(goal)) {
        (Some(s), Some(g)) if s != g => (s, g),
        _ => return Path::none(),
    };

    let me = state.me();
    let my_len = me.map(|s| s.len()).unwrap_or(0);
    let neck = me
        .filter(|s| s.len() > 1 && s.head() == Some(start))
        .and_then(|s| s.neck());
    let threatening_heads: Vec<Point> = state
        .enemies()
        .filter(|e| e.len() >= my_len)
        .filter_map(|e| e.head())
        .collect();
    let order = state.bias().expansion_order();

    SCRATCH.with(|scratch| {
        let mut s = scratch.borrow_mut();
        s.clear();

        let mut seq = 0u64;
        let h0 = start.manhattan(goal);
        s.g_score.insert(start_idx, 0);
        s.f_score.insert(start_idx, h0);
        s.turns.insert(start_idx, 1);
        s.open.push(Reverse((h0, seq, start_idx)));

        let mut iterations = 0;
        while let Some(Reverse((f, _, current))) = s.open.pop() {
            if s.closed.contains(&current) || s.f_score.get(&current) != Some(&f) {
                continue;
            }
            iterations += 1;
            if iterations > max_iterations {
                warn!(
                    "A* gave up after {} iterations ({} -> {})",
                    max_iterations, start, goal
                );
                return Path::none();
            }
            if current == goal_idx {
                return reconstruct(&s.came_from, state, start_idx, goal_idx);
            }
            s.closed.insert(current);

            let here = world.point_at(current);
            let g = s.g_score[&current];
            let turn = s.turns[&current];

            for dir in order.iter() {
                let next = here.step(*dir);
                let next_idx = match world.index_of(next) {
                    Some(idx) => idx,
                    None => continue,
                };
                if s.closed.contains(&next_idx) {
                    continue;
                }
                if state.turns_until_vacant(next) >= turn {
                    continue;
                }
                if current == start_idx && Some(next) == neck {
                    continue;
                }

                let penalty = if current == start_idx
                    && threatening_heads.iter().any(|h| h.is_adjacent(next))
                {
                    VERY_HIGH_COST
                } else {
                    0
                };
                let tentative = g + 1 + penalty;
                if s.g_score.get(&next_idx).map_or(false, |&old| tentative >= old) {
                    continue;
                }

                let f_next = tentative + next.manhattan(goal);
                s.came_from.insert(next_idx, current);
                s.g_score.insert(next_idx, tentative);
                s.f_score.insert(next_idx, f_next);
                s.turns.insert(next_idx, turn + 1);
                seq += 1;
                s.open.push(Reverse((f_next, seq, next_idx)));
            }
        }
        Path::none()
    })
}

fn reconstruct(
    came_from: &HashMap<usize, usize>,
    state: &GameState,
    start_idx: usize,
    goal_idx: usize,
) -> Path {
    let world = state.world();
    let mut len = 0;
    let mut node = goal_idx;
    let mut first = goal_idx;
    while node != start_idx {
        first = node;
        node = match came_from.get(&node) {
            Some(&prev) => prev,
            None => return Path::none(),
        };
        len += 1;
    }
    Path {
        len,
        direction: Direction::between(world.point_at(start_idx), world.point_at(first)),
    }
}
