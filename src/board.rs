// Board snapshot types used by the engine
//
// The engine works in screen coordinates: (0, 0) is the top-left cell and
// `y` grows downward, so `Up` decreases `y`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A cell on the board. Out-of-bounds points are representable on purpose:
/// movement and collision code computes them before checking bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn manhattan(self, other: Point) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    pub fn step(self, direction: Direction) -> Point {
        self + direction.offset()
    }

    pub fn neighbours(self) -> [Point; 4] {
        [
            self.step(Direction::Up),
            self.step(Direction::Down),
            self.step(Direction::Left),
            self.step(Direction::Right),
        ]
    }

    pub fn is_adjacent(self, other: Point) -> bool {
        self.manhattan(other) == 1
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents the four possible movement directions for a snake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Converts direction to string representation for API response
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Unit vector of this direction in screen coordinates
    pub fn offset(self) -> Point {
        match self {
            Direction::Up => Point::new(0, -1),
            Direction::Down => Point::new(0, 1),
            Direction::Left => Point::new(-1, 0),
            Direction::Right => Point::new(1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The two directions at right angles to this one
    pub fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
            Direction::Left | Direction::Right => [Direction::Up, Direction::Down],
        }
    }

    /// Direction of a single step from `from` to `to`, if they are adjacent
    pub fn between(from: Point, to: Point) -> Option<Direction> {
        Direction::all()
            .iter()
            .copied()
            .find(|d| from.step(*d) == to)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tie-break bias: the order in which equally good neighbours are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AxisBias {
    Vertical,
    Horizontal,
}

impl AxisBias {
    pub fn all() -> [AxisBias; 2] {
        [AxisBias::Vertical, AxisBias::Horizontal]
    }

    /// Expansion order used by the pathfinder
    pub fn expansion_order(self) -> [Direction; 4] {
        match self {
            AxisBias::Vertical => [Direction::Up, Direction::Down, Direction::Left, Direction::Right],
            AxisBias::Horizontal => [Direction::Left, Direction::Right, Direction::Up, Direction::Down],
        }
    }
}

impl Default for AxisBias {
    fn default() -> Self {
        AxisBias::Vertical
    }
}

/// One agent on the board, head first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    pub id: String,
    pub health: i32,
    pub parts: Vec<Point>,
    #[serde(default)]
    pub dead: bool,
}

impl Snake {
    pub fn new(id: impl Into<String>, health: i32, parts: Vec<Point>) -> Self {
        Snake {
            id: id.into(),
            health,
            parts,
            dead: false,
        }
    }

    pub fn head(&self) -> Option<Point> {
        self.parts.first().copied()
    }

    pub fn neck(&self) -> Option<Point> {
        self.parts.get(1).copied()
    }

    pub fn tail(&self) -> Option<Point> {
        self.parts.last().copied()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Immutable per-tick board snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    pub id: String,
    pub width: i32,
    pub height: i32,
    pub food: Vec<Point>,
    pub snakes: Vec<Snake>,
    /// Id of the snake the engine plays for
    pub you: String,
}

impl World {
    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) * self.height.max(0)) as usize
    }

    /// Row-major cell index, `None` when out of bounds
    pub fn index_of(&self, p: Point) -> Option<usize> {
        if self.in_bounds(p) {
            Some((p.y * self.width + p.x) as usize)
        } else {
            None
        }
    }

    pub fn point_at(&self, index: usize) -> Point {
        let index = index as i32;
        Point::new(index % self.width, index / self.width)
    }

    pub fn snake_index(&self, id: &str) -> Option<usize> {
        self.snakes.iter().position(|s| s.id == id)
    }

    pub fn snake(&self, id: &str) -> Option<&Snake> {
        self.snakes.iter().find(|s| s.id == id)
    }

    pub fn has_food_at(&self, p: Point) -> bool {
        self.food.contains(&p)
    }
}
