// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// The Bot is the API-facing object: it converts requests into engine worlds,
// runs the engine off the async runtime and reports what it chose.
// For more info see docs.battlesnake.com

use log::{error, info};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::{DebugLogger, DecisionRecord};
use crate::engine::{DefaultSelector, Engine};
use crate::game_state::GameState;
use crate::movement::least_bad_move;
use crate::types::{Battlesnake, Board, Game, MoveResponse};

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    engine: Arc<Engine>,
    logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance and warms up its simulation workers
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    ///
    /// # Returns
    /// * `Result<Bot, String>` - Fails only if the worker threads cannot be spawned
    pub fn new(config: Config) -> Result<Self, String> {
        let engine = Engine::new(config.clone())?;
        Ok(Bot {
            config,
            engine: Arc::new(engine),
            logger: DebugLogger::disabled(),
        })
    }

    /// Attaches a decision logger
    pub fn with_logger(mut self, logger: DebugLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "author": "futures-snake",
            "color": "#00DEAD",
            "head": "default",
            "tail": "default",
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!(
            "GAME START {} ({} sleeping workers)",
            game.id,
            self.engine.pool().sleeping_workers()
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32, board: &Board, you: &Battlesnake) {
        let outcome = if board.snakes.iter().any(|s| s.id == you.id) {
            "survived"
        } else {
            "eliminated"
        };
        info!("GAME OVER {}: {} after {} turns", game.id, outcome, turn);
    }

    /// Computes and returns the next move by simulating futures on the worker pool
    /// Corresponds to POST /move endpoint
    ///
    /// # Arguments
    /// * `game` - Current game metadata
    /// * `turn` - Current turn number
    /// * `board` - Current board state
    /// * `you` - Your snake's current state
    ///
    /// # Returns
    /// * `MoveResponse` - The chosen direction and a shout naming the deciding strategy
    pub async fn get_move(
        &self,
        game: &Game,
        turn: &i32,
        board: &Board,
        you: &Battlesnake,
    ) -> MoveResponse {
        let start_time = Instant::now();
        let world = board.to_world(&game.id, &you.id);
        let log_board = if self.logger.is_enabled() {
            Some(world.clone())
        } else {
            None
        };

        let engine = Arc::clone(&self.engine);
        let max_turns = self.config.timing.max_turns;
        let budget = self.config.timing.effective_budget_ms();
        let fallback_world = world.clone();

        // The engine blocks on its workers, keep it off the async executor
        let outcome = tokio::task::spawn_blocking(move || {
            engine.decide_verbose(world, &DefaultSelector, max_turns, budget)
        })
        .await;

        let (chosen_move, preferred_move, strategy, futures) = match outcome {
            Ok(decision) => (
                decision.direction,
                decision.preferred,
                decision.strategy,
                decision.futures.len(),
            ),
            Err(e) => {
                error!("Turn {}: decision task failed: {}", turn, e);
                (least_bad_move(&GameState::new(fallback_world)), None, None, 0)
            }
        };
        let elapsed_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Turn {}: Chose {} via {} (preferred: {:?}, futures: {}, time: {}ms)",
            turn,
            chosen_move.as_str(),
            strategy.as_deref().unwrap_or("fallback"),
            preferred_move,
            futures,
            elapsed_ms
        );

        let shout_line = shout(strategy.as_deref(), futures);
        if let Some(board) = log_board {
            self.logger.log_decision(DecisionRecord {
                turn: *turn,
                chosen_move,
                preferred_move,
                strategy,
                futures,
                elapsed_ms,
                board,
            });
        }

        MoveResponse {
            direction: chosen_move.as_str().to_string(),
            shout: Some(shout_line),
        }
    }

    /// Stops the simulation workers
    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

/// Short shout naming the strategy whose future decided the move
fn shout(strategy: Option<&str>, futures: usize) -> String {
    match strategy {
        Some(name) => format!("{} over {} futures", name, futures),
        None => format!("no safe line in {} futures", futures),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shout_names_the_deciding_strategy() {
        assert_eq!(shout(Some("terminator"), 96), "terminator over 96 futures");
        assert_eq!(shout(None, 0), "no safe line in 0 futures");
    }
}
