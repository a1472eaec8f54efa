//! Shared test helpers: builds worlds from small ASCII pictures
//!
//! Each string is one row, top row first; spaces are ignored.
//! - `_` empty cell
//! - `*` food
//! - a digit is the head of the snake with that id; snake `0` is self
//! - `<` `>` `^` `v` are body segments pointing toward the segment nearer the head
//!
//! Every snake starts with full health.

#![allow(dead_code)]

use futures_snake::board::{Point, Snake, World};

pub fn parse_world(rows: &[&str]) -> World {
    let grid: Vec<Vec<char>> = rows
        .iter()
        .map(|row| {
            row.chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == 'V' { 'v' } else { c })
                .collect()
        })
        .collect();
    let height = grid.len() as i32;
    let width = grid.first().map_or(0, |r| r.len()) as i32;

    let at = |p: Point| -> Option<char> {
        if p.x < 0 || p.y < 0 || p.y >= height || p.x >= width {
            return None;
        }
        grid[p.y as usize].get(p.x as usize).copied()
    };

    let mut food = Vec::new();
    let mut heads: Vec<(char, Point)> = Vec::new();
    for (y, row) in grid.iter().enumerate() {
        for (x, &c) in row.iter().enumerate() {
            let p = Point::new(x as i32, y as i32);
            if c == '*' {
                food.push(p);
            } else if c.is_ascii_digit() {
                heads.push((c, p));
            }
        }
    }
    heads.sort();

    // (offset from the current segment, arrow that must sit there)
    let followers = [
        (Point::new(1, 0), '<'),
        (Point::new(-1, 0), '>'),
        (Point::new(0, 1), '^'),
        (Point::new(0, -1), 'v'),
    ];

    let snakes = heads
        .into_iter()
        .map(|(id, head)| {
            let mut parts = vec![head];
            let mut current = head;
            loop {
                let next = followers.iter().find_map(|(offset, arrow)| {
                    let q = current + *offset;
                    if at(q) == Some(*arrow) && !parts.contains(&q) {
                        Some(q)
                    } else {
                        None
                    }
                });
                match next {
                    Some(q) => {
                        parts.push(q);
                        current = q;
                    }
                    None => break,
                }
            }
            Snake::new(id.to_string(), 100, parts)
        })
        .collect();

    World {
        id: "test".to_string(),
        width,
        height,
        food,
        snakes,
        you: "0".to_string(),
    }
}

pub fn index_of(world: &World, id: &str) -> usize {
    world
        .snake_index(id)
        .unwrap_or_else(|| panic!("no snake '{}' on the board", id))
}

