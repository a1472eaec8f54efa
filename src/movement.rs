// Movement helpers shared by the built-in strategies and the scorer
//
// All helpers look at the board from the state's self snake.

use crate::astar::{shortest_path, Path};
use crate::board::{Direction, Point};
use crate::game_state::{count_accessible_cells, GameState};

/// Order in which fallback moves are tried
pub const FALLBACK_ORDER: [Direction; 4] =
    [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

/// Moves whose destination is on the board and free right now
pub fn not_immediately_suicidal_moves(state: &GameState) -> Vec<Direction> {
    let head = match state.me().and_then(|s| s.head()) {
        Some(h) => h,
        None => return Vec::new(),
    };
    FALLBACK_ORDER
        .iter()
        .copied()
        .filter(|d| state.is_free(head.step(*d)))
        .collect()
}

pub fn not_immediately_suicidal(state: &GameState) -> Option<Direction> {
    not_immediately_suicidal_moves(state).into_iter().next()
}

/// A move that at least stays on the board, for when nothing is safe
pub fn least_bad_move(state: &GameState) -> Direction {
    if let Some(d) = not_immediately_suicidal(state) {
        return d;
    }
    let head = match state.me().and_then(|s| s.head()) {
        Some(h) => h,
        None => return Direction::Up,
    };
    let neck = state.me().and_then(|s| s.neck());
    FALLBACK_ORDER
        .iter()
        .copied()
        .find(|d| {
            let next = head.step(*d);
            state.in_bounds(next) && Some(next) != neck
        })
        .or_else(|| {
            FALLBACK_ORDER
                .iter()
                .copied()
                .find(|d| state.in_bounds(head.step(*d)))
        })
        .unwrap_or(Direction::Up)
}

fn my_head(state: &GameState) -> Option<Point> {
    state.me().and_then(|s| s.head())
}

/// Path to the nearest (by path length) food
pub fn closest_food(state: &GameState) -> Option<Direction> {
    let head = my_head(state)?;
    state
        .world()
        .food
        .iter()
        .map(|&food| shortest_path(head, food, state))
        .filter(Path::exists)
        .min_by_key(|p| p.len)
        .and_then(|p| p.direction)
}

/// Path to the nearest food that no enemy can reach first.
/// On an equal distance the food counts as ours only if we are strictly longer.
pub fn best_food(state: &GameState) -> Option<Direction> {
    let me = state.me()?;
    let head = me.head()?;

    let mut best: Option<Path> = None;
    for &food in &state.world().food {
        let mine = shortest_path(head, food, state);
        if !mine.exists() {
            continue;
        }
        let contested = state.enemy_indices().iter().any(|&i| {
            let enemy = match state.snake(i) {
                Some(e) => e,
                None => return false,
            };
            let enemy_head = match enemy.head() {
                Some(h) => h,
                None => return false,
            };
            let view = state.perspective(i, state.bias());
            let theirs = shortest_path(enemy_head, food, view);
            theirs.exists()
                && (theirs.len < mine.len || (theirs.len == mine.len && enemy.len() >= me.len()))
        });
        if contested {
            continue;
        }
        if best.map_or(true, |b| mine.len < b.len) {
            best = Some(mine);
        }
    }
    best.and_then(|p| p.direction)
}

/// Cells an enemy is forced through from its head: each has exactly one free
/// way on. Empty when the enemy has a choice on its first move.
fn forced_cells(state: &GameState, enemy_head: Point) -> Vec<Point> {
    let mut tunnel = Vec::new();
    let mut cur = enemy_head;
    while tunnel.len() < state.world().cell_count() {
        let neighbours = cur.neighbours();
        let mut exits = neighbours
            .iter()
            .copied()
            .filter(|&p| state.is_free(p) && !tunnel.contains(&p));
        match (exits.next(), exits.next()) {
            (Some(only), None) => {
                tunnel.push(only);
                cur = only;
            }
            _ => break,
        }
    }
    tunnel
}

/// Path to a cell inside an enemy's tunnel that we reach before the enemy
/// does, at most `max_distance` steps away. Blocking any forced cell traps the
/// enemy behind it. Arriving on the same tick only counts when we are longer.
pub fn closest_kill_tunnel_target(state: &GameState, max_distance: u32) -> Option<Direction> {
    let me = state.me()?;
    let head = me.head()?;

    let mut best: Option<Path> = None;
    for enemy in state.enemies() {
        let enemy_head = match enemy.head() {
            Some(h) => h,
            None => continue,
        };
        for (i, &cell) in forced_cells(state, enemy_head).iter().enumerate() {
            let enemy_arrives = i as u32 + 1;
            if head.manhattan(cell) > max_distance {
                continue;
            }
            let path = shortest_path(head, cell, state);
            if !path.exists() || path.len > max_distance {
                continue;
            }
            let first = path.len < enemy_arrives
                || (path.len == enemy_arrives && me.len() > enemy.len());
            if first && best.map_or(true, |b| path.len < b.len) {
                best = Some(path);
            }
        }
    }
    best.and_then(|p| p.direction)
}

/// Path to our own tail
pub fn chase_tail(state: &GameState) -> Option<Direction> {
    let me = state.me()?;
    let (head, tail) = (me.head()?, me.tail()?);
    shortest_path(head, tail, state).direction
}

/// Reachable cells if self moves `direction` now
pub fn count_accessible_cells_after_move(state: &GameState, direction: Direction) -> u32 {
    match my_head(state) {
        Some(head) => count_accessible_cells(state, head.step(direction)),
        None => 0,
    }
}

/// Whether moving `direction` could leave self two steps ahead and one to the
/// side of the head of a strictly longer enemy, where it can be cut off.
///
/// For forward vector `f` and each lateral vector `l` the cell `head + 2f + l`
/// must be free; the threat cells are `head + 2f + 2l` and `head + 3f + l`.
pub fn could_end_up_corner_adjacent_to_bigger_snake(
    state: &GameState,
    direction: Direction,
) -> bool {
    let me = match state.me() {
        Some(me) => me,
        None => return false,
    };
    let head = match me.head() {
        Some(h) => h,
        None => return false,
    };
    let bigger_heads: Vec<Point> = state
        .enemies()
        .filter(|e| e.len() > me.len())
        .filter_map(|e| e.head())
        .collect();
    if bigger_heads.is_empty() {
        return false;
    }

    let f = direction.offset();
    let two_f = f + f;
    direction.perpendicular().iter().any(|side| {
        let l = side.offset();
        let dest = head + two_f + l;
        if !state.is_free(dest) {
            return false;
        }
        let threats = [head + two_f + l + l, head + two_f + f + l];
        threats.iter().any(|t| bigger_heads.contains(t))
    })
}
