// Per-tick game state: a World plus the projections derived from it
//
// The occupancy grid stores, for every cell, how many ticks must pass before
// no snake can still be on it. Pathfinding and safety checks are all phrased
// in terms of this number.

use std::collections::VecDeque;
use std::sync::OnceLock;

use crate::board::{AxisBias, Direction, Point, Snake, World};
use crate::rules::{self, Ruleset, SnakeMove};
use crate::simple_profiler::{Category, ProfileGuard};

#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    vacate: u32,
    occupant: Option<usize>,
}

/// Dense grid of vacate turns, one cell per board cell
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl OccupancyGrid {
    /// Projects every snake onto the grid. Segment `i` of a snake of length
    /// `L` stays occupied for `L - i - 1` more ticks; overlaps keep the max.
    pub fn build(world: &World) -> Self {
        let mut cells = vec![Cell::default(); world.cell_count()];
        for (snake_index, snake) in world.snakes.iter().enumerate() {
            let len = snake.parts.len() as u32;
            for (i, part) in snake.parts.iter().enumerate() {
                let idx = match world.index_of(*part) {
                    Some(idx) => idx,
                    None => continue,
                };
                let turn = len - i as u32 - 1;
                let cell = &mut cells[idx];
                if turn > 0 && turn >= cell.vacate {
                    cell.occupant = Some(snake_index);
                }
                cell.vacate = cell.vacate.max(turn);
            }
        }
        OccupancyGrid {
            width: world.width,
            height: world.height,
            cells,
        }
    }

    fn cell(&self, p: Point) -> Option<&Cell> {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        self.cells.get((p.y * self.width + p.x) as usize)
    }

    /// Ticks until `p` is free. Out-of-bounds cells report 0.
    pub fn turns_until_vacant(&self, p: Point) -> u32 {
        self.cell(p).map(|c| c.vacate).unwrap_or(0)
    }

    /// Index of the snake currently holding `p`
    pub fn occupant(&self, p: Point) -> Option<usize> {
        self.cell(p).and_then(|c| c.occupant)
    }
}

/// Immutable snapshot wrapper. Advancing the game produces a new GameState.
#[derive(Debug)]
pub struct GameState {
    world: World,
    me: Option<usize>,
    enemies: Vec<usize>,
    grid: OccupancyGrid,
    bias: AxisBias,
    perspectives: Vec<OnceLock<GameState>>,
    spaces: [OnceLock<u32>; 4],
}

impl GameState {
    pub fn new(world: World) -> Self {
        Self::with_bias(world, AxisBias::default())
    }

    pub fn with_bias(world: World, bias: AxisBias) -> Self {
        let me = world.snake_index(&world.you);
        let enemies = (0..world.snakes.len())
            .filter(|&i| Some(i) != me)
            .collect();
        let grid = OccupancyGrid::build(&world);
        let perspectives = (0..world.snakes.len()).map(|_| OnceLock::new()).collect();

        GameState {
            world,
            me,
            enemies,
            grid,
            bias,
            perspectives,
            spaces: Default::default(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn bias(&self) -> AxisBias {
        self.bias
    }

    pub fn width(&self) -> i32 {
        self.world.width
    }

    pub fn height(&self) -> i32 {
        self.world.height
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        self.world.in_bounds(p)
    }

    pub fn me(&self) -> Option<&Snake> {
        self.me.map(|i| &self.world.snakes[i])
    }

    pub fn me_index(&self) -> Option<usize> {
        self.me
    }

    pub fn enemy_indices(&self) -> &[usize] {
        &self.enemies
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Snake> + '_ {
        self.enemies.iter().map(move |&i| &self.world.snakes[i])
    }

    pub fn snake(&self, index: usize) -> Option<&Snake> {
        self.world.snakes.get(index)
    }

    /// Self has been eliminated
    pub fn is_loss(&self) -> bool {
        self.me.is_none()
    }

    pub fn turns_until_vacant(&self, p: Point) -> u32 {
        self.grid.turns_until_vacant(p)
    }

    /// In bounds and nothing on it right now
    pub fn is_free(&self, p: Point) -> bool {
        self.in_bounds(p) && self.grid.turns_until_vacant(p) == 0
    }

    pub fn snake_at(&self, p: Point) -> Option<&Snake> {
        self.grid.occupant(p).map(|i| &self.world.snakes[i])
    }

    /// The same world seen by `snake_index`, cached for the life of this state.
    /// The bias of the first request wins.
    pub fn perspective(&self, snake_index: usize, bias: AxisBias) -> &GameState {
        self.perspectives[snake_index].get_or_init(|| {
            let mut world = self.world.clone();
            world.you = self.world.snakes[snake_index].id.clone();
            GameState::with_bias(world, bias)
        })
    }

    /// Number of cells reachable from the cell one step from self's head
    pub fn spaces_in(&self, direction: Direction) -> u32 {
        let slot = match direction {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        };
        *self.spaces[slot].get_or_init(|| match self.me().and_then(|s| s.head()) {
            Some(head) => count_accessible_cells(self, head.step(direction)),
            None => 0,
        })
    }

    /// Advances one tick, keeping this state's bias
    pub fn after_moves(&self, moves: &[SnakeMove], rules: &Ruleset) -> GameState {
        GameState::with_bias(rules::apply_moves(&self.world, moves, rules), self.bias)
    }
}

/// Flood fill from `start` where a cell counts only once it has been vacated
/// by the time the fill reaches it. A cell is marked visited on first
/// dequeue, so a blocked cell stays blocked even if reached later.
pub fn count_accessible_cells(state: &GameState, start: Point) -> u32 {
    let _guard = ProfileGuard::new(Category::FloodFill);

    let world = state.world();
    let mut visited = vec![false; world.cell_count()];
    let mut queue = VecDeque::new();
    queue.push_back((start, 0u32));
    let mut count = 0;

    while let Some((p, depth)) = queue.pop_front() {
        let idx = match world.index_of(p) {
            Some(idx) => idx,
            None => continue,
        };
        if visited[idx] {
            continue;
        }
        visited[idx] = true;

        if depth < state.turns_until_vacant(p) {
            continue;
        }
        count += 1;
        for n in p.neighbours().iter() {
            queue.push_back((*n, depth + 1));
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World {
            id: "gs".to_string(),
            width: 5,
            height: 5,
            food: vec![],
            snakes: vec![
                Snake::new(
                    "0",
                    100,
                    vec![Point::new(2, 2), Point::new(1, 2), Point::new(0, 2)],
                ),
                Snake::new("1", 100, vec![Point::new(4, 0), Point::new(4, 1)]),
            ],
            you: "0".to_string(),
        }
    }

    #[test]
    fn test_vacate_turns_follow_segment_index() {
        let state = GameState::new(world());
        assert_eq!(state.turns_until_vacant(Point::new(2, 2)), 2);
        assert_eq!(state.turns_until_vacant(Point::new(1, 2)), 1);
        assert_eq!(state.turns_until_vacant(Point::new(0, 2)), 0);
        assert_eq!(state.turns_until_vacant(Point::new(4, 0)), 1);
        assert_eq!(state.turns_until_vacant(Point::new(3, 3)), 0);
        assert_eq!(state.turns_until_vacant(Point::new(-1, 3)), 0);
    }

    #[test]
    fn test_doubled_tail_keeps_the_larger_projection() {
        let mut w = world();
        w.snakes[0].parts.push(Point::new(0, 2));
        let state = GameState::new(w);
        assert_eq!(state.turns_until_vacant(Point::new(0, 2)), 1);
        assert_eq!(state.snake_at(Point::new(0, 2)).map(|s| s.id.as_str()), Some("0"));
    }

    #[test]
    fn test_partition_and_perspective() {
        let state = GameState::new(world());
        assert_eq!(state.me().map(|s| s.id.as_str()), Some("0"));
        assert_eq!(state.enemy_indices(), &[1]);

        let view = state.perspective(1, AxisBias::Horizontal);
        assert_eq!(view.me().map(|s| s.id.as_str()), Some("1"));
        assert_eq!(view.enemy_indices(), &[0]);
        assert_eq!(view.bias(), AxisBias::Horizontal);

        // Cached: the second request returns the same object
        let again = state.perspective(1, AxisBias::Vertical);
        assert!(std::ptr::eq(view, again));
    }

    #[test]
    fn test_missing_self_is_a_loss() {
        let mut w = world();
        w.you = "ghost".to_string();
        let state = GameState::new(w);
        assert!(state.is_loss());
        assert_eq!(state.spaces_in(Direction::Up), 0);
    }

    #[test]
    fn test_spaces_into_neck_is_zero() {
        let state = GameState::new(world());
        assert_eq!(state.spaces_in(Direction::Left), 0);
        assert!(state.spaces_in(Direction::Up) > 10);
    }
}
