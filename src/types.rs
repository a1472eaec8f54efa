// Battlesnake API Types
// See https://docs.battlesnake.com/api
//
// The API puts (0, 0) in the bottom-left corner with `y` growing upward.
// `Board::to_world` flips rows so the engine can work top-down.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::board::{Point, Snake, World};

/// Game metadata including ID, ruleset, and timeout
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Game {
    pub id: String,
    #[serde(default)]
    pub ruleset: HashMap<String, Value>,
    #[serde(default)]
    pub timeout: u32,
}

/// Board state including dimensions, food, snakes, and hazards
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Board {
    pub height: i32,
    pub width: i32,
    pub food: Vec<Coord>,
    pub snakes: Vec<Battlesnake>,
    #[serde(default)]
    pub hazards: Vec<Coord>,
}

/// Snake representation with all state information
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Battlesnake {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub health: i32,
    pub body: Vec<Coord>,
    pub head: Coord,
    pub length: i32,
    #[serde(default)]
    pub latency: String,
    #[serde(default)]
    pub shout: Option<String>,
}

/// 2D coordinate on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    fn to_point(self, height: i32) -> Point {
        Point::new(self.x, height - 1 - self.y)
    }
}

impl Board {
    /// Engine view of this board with `you_id` as the self snake
    pub fn to_world(&self, game_id: &str, you_id: &str) -> World {
        let height = self.height;
        World {
            id: game_id.to_string(),
            width: self.width,
            height,
            food: self.food.iter().map(|c| c.to_point(height)).collect(),
            snakes: self
                .snakes
                .iter()
                .filter(|s| !s.body.is_empty())
                .map(|s| {
                    Snake::new(
                        s.id.clone(),
                        s.health,
                        s.body.iter().map(|c| c.to_point(height)).collect(),
                    )
                })
                .collect(),
            you: you_id.to_string(),
        }
    }
}

/// Complete request body of /start, /move and /end
#[derive(Deserialize, Serialize, Debug)]
pub struct MoveRequest {
    pub game: Game,
    pub turn: i32,
    pub board: Board,
    pub you: Battlesnake,
}

/// Body of the /move reply
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub direction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shout: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;

    fn snake(id: &str, body: &[(i32, i32)]) -> Battlesnake {
        let body: Vec<Coord> = body.iter().map(|&(x, y)| Coord { x, y }).collect();
        Battlesnake {
            id: id.to_string(),
            name: id.to_string(),
            health: 90,
            head: body[0],
            length: body.len() as i32,
            body,
            latency: "0".to_string(),
            shout: None,
        }
    }

    #[test]
    fn test_rows_are_flipped() {
        let board = Board {
            height: 11,
            width: 11,
            food: vec![Coord { x: 0, y: 0 }],
            snakes: vec![snake("me", &[(5, 10), (5, 9)])],
            hazards: vec![],
        };
        let world = board.to_world("g", "me");

        assert_eq!(world.food, vec![Point::new(0, 10)]);
        assert_eq!(world.snakes[0].parts, vec![Point::new(5, 0), Point::new(5, 1)]);
        assert_eq!(world.snakes[0].health, 90);
        assert_eq!(world.you, "me");
    }

    #[test]
    fn test_api_up_matches_engine_up() {
        // API "up" is y + 1; after the flip that is the engine's Up
        let height = 11;
        let api_head = Coord { x: 3, y: 4 };
        let api_up = Coord { x: 3, y: 5 };
        assert_eq!(
            api_head.to_point(height).step(Direction::Up),
            api_up.to_point(height)
        );
    }

    #[test]
    fn test_move_request_parses_minimal_json() {
        let json = r#"{
            "game": {"id": "g1"},
            "turn": 3,
            "board": {"height": 7, "width": 7, "food": [], "snakes": []},
            "you": {"id": "me", "health": 100, "body": [{"x": 1, "y": 1}],
                    "head": {"x": 1, "y": 1}, "length": 1}
        }"#;
        let request: MoveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.turn, 3);
        assert_eq!(request.game.id, "g1");
    }

    #[test]
    fn test_move_response_uses_api_field_names() {
        let response = MoveResponse {
            direction: "left".to_string(),
            shout: None,
        };
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"move":"left"}"#);
    }
}
