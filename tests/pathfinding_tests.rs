// Time-aware A* scenarios on small pictured boards

mod common;

use common::parse_world;
use futures_snake::astar::{shortest_path, shortest_path_bounded, MAX_ITERATIONS};
use futures_snake::board::{Direction, Point, Snake, World};
use futures_snake::game_state::GameState;

fn path_from(rows: &[&str], start: (i32, i32), goal: (i32, i32)) -> (u32, Option<Direction>) {
    let state = GameState::new(parse_world(rows));
    let path = shortest_path(Point::new(start.0, start.1), Point::new(goal.0, goal.1), &state);
    (path.len, path.direction)
}

#[test]
fn test_simple_path_around_own_body() {
    let (len, direction) = path_from(&["> > 0 _", "_ _ _ _", "_ _ _ _"], (2, 0), (3, 1));
    assert_eq!(len, 2);
    assert!(matches!(direction, Some(Direction::Down) | Some(Direction::Right)));
}

#[test]
fn test_waits_for_enemy_body_to_move_away() {
    let (len, direction) = path_from(
        &["> > 0 _", "_ v 1 _", "_ > ^ _", "_ _ _ _"],
        (2, 0),
        (0, 2),
    );
    assert_eq!(len, 6);
    assert_eq!(direction, Some(Direction::Right));
}

#[test]
fn test_steps_onto_tail_that_is_leaving() {
    let (len, direction) = path_from(
        &[
            "_ _ _ _ _ _",
            "_ _ 1 _ _ _",
            "v _ ^ 2 _ _",
            "> 0 ^ ^ _ _",
            "_ _ _ ^ _ _",
            "_ _ _ _ _ _",
        ],
        (1, 3),
        (4, 3),
    );
    assert_eq!(len, 3);
    assert_eq!(direction, Some(Direction::Right));
}

#[test]
fn test_crosses_two_bodies_as_they_shrink() {
    let (len, direction) = path_from(
        &[
            "_ _ _ _ _ _",
            "v _ 1 _ _ _",
            "> 0 ^ 2 _ _",
            "_ _ ^ ^ _ _",
            "_ _ ^ ^ _ _",
            "_ _ _ ^ _ _",
        ],
        (1, 2),
        (4, 3),
    );
    assert_eq!(len, 4);
    assert_eq!(direction, Some(Direction::Down));
}

#[test]
fn test_avoids_first_step_next_to_equal_enemy_head() {
    let (len, direction) = path_from(
        &[
            "_ _ v < _ _",
            "v _ 1 _ _ _",
            "> 0 _ * _ _",
            "_ _ _ _ _ _",
            "_ _ _ _ _ _",
            "_ _ _ _ _ _",
        ],
        (1, 2),
        (3, 2),
    );
    assert_eq!(len, 4);
    assert_eq!(direction, Some(Direction::Down));
}

#[test]
fn test_first_step_is_always_onto_a_free_cell() {
    let state = GameState::new(parse_world(&[
        "> > 0 _",
        "_ v 1 _",
        "_ > ^ _",
        "_ _ _ _",
    ]));
    let start = Point::new(2, 0);
    for x in 0..4 {
        for y in 0..4 {
            let path = shortest_path(start, Point::new(x, y), &state);
            if let Some(direction) = path.direction {
                let first = start.step(direction);
                assert_eq!(state.turns_until_vacant(first), 0, "goal ({}, {})", x, y);
            }
        }
    }
}

#[test]
fn test_goal_equal_to_start_has_no_path() {
    let state = GameState::new(parse_world(&["0 _ _", "^ _ _", "_ _ _"]));
    let path = shortest_path(Point::new(0, 0), Point::new(0, 0), &state);
    assert!(!path.exists());
    assert_eq!(path.len, 0);
}

#[test]
fn test_boxed_in_head_has_no_path() {
    let state = GameState::new(parse_world(&["0 v <", "^ 1 _", "^ _ _"]));
    let path = shortest_path(Point::new(0, 0), Point::new(2, 2), &state);
    assert!(!path.exists());
}

#[test]
fn test_search_stops_at_iteration_cap() {
    let state = GameState::new(World {
        id: "open".to_string(),
        width: 40,
        height: 40,
        food: vec![],
        snakes: vec![Snake::new("0", 100, vec![Point::new(0, 0)])],
        you: "0".to_string(),
    });
    let (start, goal) = (Point::new(0, 0), Point::new(39, 39));

    assert_eq!(shortest_path(start, goal, &state).len, 78);
    assert!(!shortest_path_bounded(start, goal, &state, 20).exists());
}

/// 200x200 board where a 597-long snake coils over the bottom three rows.
/// The bottom-right corner opens up only after a walk of about 600 steps that
/// waits for the coil to shrink, while every open cell above it scores better.
fn sealed_corner_world() -> World {
    let mut parts = vec![Point::new(199, 198), Point::new(198, 198), Point::new(198, 199)];
    parts.extend((0..=197).rev().map(|x| Point::new(x, 199)));
    parts.extend((0..=197).map(|x| Point::new(x, 198)));
    parts.extend((0..=197).rev().map(|x| Point::new(x, 197)));

    World {
        id: "sealed".to_string(),
        width: 200,
        height: 200,
        food: vec![],
        snakes: vec![
            Snake::new("0", 100, vec![Point::new(0, 0), Point::new(0, 1)]),
            Snake::new("1", 100, parts),
        ],
        you: "0".to_string(),
    }
}

#[test]
fn test_goal_beyond_iteration_cap_has_no_path() {
    let world = sealed_corner_world();
    assert!(world.cell_count() > MAX_ITERATIONS);
    let state = GameState::new(world);

    let path = shortest_path(Point::new(0, 0), Point::new(199, 199), &state);
    assert!(!path.exists());
    assert_eq!(path.len, 0);
}
