// Rocket routes of the Battlesnake API
//
// Each route logs what the request carries for the engine (board size,
// snakes, food) and hands the game to the Bot. /move answers with the chosen
// direction plus a shout naming the strategy that won the futures vote.

use log::debug;
use rocket::http::Status;
use rocket::serde::json::Json;
use serde_json::Value;

use futures_snake::bot::Bot;
use futures_snake::types::{MoveRequest, MoveResponse};

/// GET / endpoint
/// Returns bot metadata and appearance configuration
#[get("/")]
pub fn index(bot: &rocket::State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /start endpoint
#[post("/start", format = "json", data = "<start_req>")]
pub fn start(bot: &rocket::State<Bot>, start_req: Json<MoveRequest>) -> Status {
    debug!(
        "Start of {}: {}x{} board, {} snakes, {}ms timeout",
        start_req.game.id,
        start_req.board.width,
        start_req.board.height,
        start_req.board.snakes.len(),
        start_req.game.timeout
    );
    bot.start(&start_req.game, &start_req.turn, &start_req.board, &start_req.you);

    Status::Ok
}

/// POST /move endpoint
/// Simulates futures for the current board and replies with the best move
#[post("/move", format = "json", data = "<move_req>")]
pub async fn get_move(bot: &rocket::State<Bot>, move_req: Json<MoveRequest>) -> Json<MoveResponse> {
    debug!(
        "Move request {} turn {}: {} snakes, {} food, health {}",
        move_req.game.id,
        move_req.turn,
        move_req.board.snakes.len(),
        move_req.board.food.len(),
        move_req.you.health
    );
    let response = bot
        .get_move(&move_req.game, &move_req.turn, &move_req.board, &move_req.you)
        .await;

    Json(response)
}

/// POST /end endpoint
#[post("/end", format = "json", data = "<end_req>")]
pub fn end(bot: &rocket::State<Bot>, end_req: Json<MoveRequest>) -> Status {
    bot.end(&end_req.game, &end_req.turn, &end_req.board, &end_req.you);

    Status::Ok
}
